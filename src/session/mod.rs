//! Per-session state
//!
//! A session context is created when a chat session starts, handed to the
//! orchestrator on every turn, and cleared when the session ends.

pub mod history;
pub mod window;

pub use history::{HistoryTurn, Role, SessionHistory};
pub use window::{ContextWindow, WindowConfig};

use crate::planner::GoalPlan;
use crate::savings::PaymentPayload;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub started_at: DateTime<Utc>,
    history: SessionHistory,
    last_payment: Option<PaymentPayload>,
    last_plan: Option<GoalPlan>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            history: SessionHistory::new(),
            last_payment: None,
            last_plan: None,
        }
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    /// Index the next user turn will get
    pub fn next_turn_index(&self) -> usize {
        self.history.user_turns()
    }

    /// Record a finished turn
    pub(crate) fn record_turn(&mut self, user_text: &str, reply: &str) {
        self.history.append_user(user_text);
        self.history.append_assistant(reply);
    }

    pub(crate) fn remember_payment(&mut self, payload: PaymentPayload) {
        self.last_payment = Some(payload);
    }

    pub(crate) fn remember_plan(&mut self, plan: GoalPlan) {
        self.last_plan = Some(plan);
    }

    pub fn last_payment(&self) -> Option<&PaymentPayload> {
        self.last_payment.as_ref()
    }

    pub fn last_plan(&self) -> Option<&GoalPlan> {
        self.last_plan.as_ref()
    }

    /// End the session: drop all turns and state and start a fresh session id
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
