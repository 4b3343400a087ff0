//! Session chat history
//!
//! Append-only record of the current session's turns, kept in memory only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a turn's author
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn prompt_label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// A single turn in the session history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryTurn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Approximate token count for prompt budgeting
    pub token_count: usize,
}

impl HistoryTurn {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        let text = text.into();
        let token_count = (text.len() + 3) / 4;

        Self {
            role,
            text,
            timestamp: Utc::now(),
            token_count,
        }
    }
}

/// Ordered `(role, text)` turns; there is no way to edit or remove one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionHistory {
    turns: Vec<HistoryTurn>,
    total_tokens: usize,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: HistoryTurn) {
        self.total_tokens += turn.token_count;
        self.turns.push(turn);
    }

    pub fn append_user(&mut self, text: impl Into<String>) {
        self.append(HistoryTurn::new(Role::User, text));
    }

    pub fn append_assistant(&mut self, text: impl Into<String>) {
        self.append(HistoryTurn::new(Role::Assistant, text));
    }

    pub fn turns(&self) -> &[HistoryTurn] {
        &self.turns
    }

    /// Up to `count` most recent turns, oldest first
    pub fn recent(&self, count: usize) -> &[HistoryTurn] {
        let start = self.turns.len().saturating_sub(count);
        &self.turns[start..]
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn total_tokens(&self) -> usize {
        self.total_tokens
    }

    /// Number of user turns recorded so far
    pub fn user_turns(&self) -> usize {
        self.turns.iter().filter(|t| t.role == Role::User).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_creation() {
        let turn = HistoryTurn::new(Role::User, "정기예금 금리가 궁금해요");
        assert_eq!(turn.role, Role::User);
        assert!(turn.token_count > 0);
    }

    #[test]
    fn test_history_appends_in_order() {
        let mut history = SessionHistory::new();
        history.append_user("안녕하세요");
        history.append_assistant("무엇을 도와드릴까요?");
        history.append_user("결제 추천");

        assert_eq!(history.len(), 3);
        assert_eq!(history.user_turns(), 2);
        assert_eq!(history.turns()[1].role, Role::Assistant);
        assert_eq!(history.turns()[2].text, "결제 추천");
        assert!(history.total_tokens() > 0);
    }

    #[test]
    fn test_recent_returns_tail_oldest_first() {
        let mut history = SessionHistory::new();
        for i in 0..10 {
            history.append_user(format!("질문 {}", i));
        }

        let recent = history.recent(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].text, "질문 7");
        assert_eq!(recent[2].text, "질문 9");
        assert_eq!(history.recent(50).len(), 10);
    }
}
