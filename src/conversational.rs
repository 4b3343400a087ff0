//! General-chat replies
//!
//! Used when a message matches no other route. The delegated mode sends the
//! recent session history along with the message so the model keeps context
//! across turns.

use crate::llm::TextGenerator;
use crate::session::{ContextWindow, SessionHistory};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

pub const FALLBACK_REPLY: &str = "말씀 감사합니다. 자세한 기능은 '/help'를 참고해 주세요.";

/// `reply(history, message) -> string`; never fails.
#[async_trait]
pub trait Conversationalist: Send + Sync {
    async fn reply(&self, history: &SessionHistory, message: &str) -> String;
}

pub struct RuleBasedConversationalist;

#[async_trait]
impl Conversationalist for RuleBasedConversationalist {
    async fn reply(&self, _history: &SessionHistory, _message: &str) -> String {
        FALLBACK_REPLY.to_string()
    }
}

pub struct DelegatedConversationalist {
    generator: Arc<dyn TextGenerator>,
    window: ContextWindow,
}

impl DelegatedConversationalist {
    pub fn new(generator: Arc<dyn TextGenerator>, window: ContextWindow) -> Self {
        Self { generator, window }
    }
}

#[async_trait]
impl Conversationalist for DelegatedConversationalist {
    async fn reply(&self, history: &SessionHistory, message: &str) -> String {
        let prompt = self.window.build_prompt(history, message);

        match self.generator.generate(&prompt).await {
            Ok(answer) => {
                info!(
                    generator = self.generator.name(),
                    history_turns = history.len(),
                    "Conversational reply generated"
                );
                answer.trim().to_string()
            }
            Err(e) => {
                warn!(generator = self.generator.name(), "Conversational call failed: {}", e);
                format!("[대화 오류: {}]", e)
            }
        }
    }
}
