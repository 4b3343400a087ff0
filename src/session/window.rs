//! Prompt context window
//!
//! Chooses which history turns go into the conversational prompt.

use super::history::{HistoryTurn, SessionHistory};
use tracing::debug;

/// Configuration for the prompt window
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// Number of recent turns to include
    pub max_turns: usize,
    /// Approximate token budget for included turns
    pub max_tokens: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_turns: crate::config::DEFAULT_HISTORY_TURNS,
            max_tokens: 8_000,
        }
    }
}

pub struct ContextWindow {
    config: WindowConfig,
}

impl ContextWindow {
    pub fn new(config: WindowConfig) -> Self {
        Self { config }
    }

    /// Most recent turns that fit both the turn count and token budget,
    /// oldest first
    pub fn select<'a>(&self, history: &'a SessionHistory) -> &'a [HistoryTurn] {
        let recent = history.recent(self.config.max_turns);

        let mut budget = self.config.max_tokens;
        let mut keep = 0;
        for turn in recent.iter().rev() {
            if turn.token_count > budget {
                break;
            }
            budget -= turn.token_count;
            keep += 1;
        }

        let selected = &recent[recent.len() - keep..];
        debug!(
            total_turns = history.len(),
            selected = selected.len(),
            "Prompt window selected"
        );
        selected
    }

    /// `User: ...` / `Assistant: ...` transcript followed by the new message
    pub fn build_prompt(&self, history: &SessionHistory, message: &str) -> String {
        let mut prompt = String::new();
        for turn in self.select(history) {
            prompt.push_str(turn.role.prompt_label());
            prompt.push_str(": ");
            prompt.push_str(&turn.text);
            prompt.push('\n');
        }
        prompt.push_str("User: ");
        prompt.push_str(message);
        prompt.push_str("\nAssistant:");
        prompt
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}
