//! Utterance summarization for hand-off context
//!
//! Rule-based mode returns a fixed sentence; delegated mode asks the text
//! model for a short Korean summary and surfaces failures inline.

use crate::llm::TextGenerator;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

pub const FALLBACK_SUMMARY: &str =
    "요약(데모): 핵심 쟁점과 요청사항을 간단히 정리해 상담사에게 전달합니다.";

/// `summarize(text) -> string`; never fails.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> String;
}

pub struct RuleBasedSummarizer;

#[async_trait]
impl Summarizer for RuleBasedSummarizer {
    async fn summarize(&self, _text: &str) -> String {
        FALLBACK_SUMMARY.to_string()
    }
}

pub struct DelegatedSummarizer {
    generator: Arc<dyn TextGenerator>,
}

impl DelegatedSummarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl Summarizer for DelegatedSummarizer {
    async fn summarize(&self, text: &str) -> String {
        let prompt = format!(
            "다음 고객 민원/문의 내용을 상담사가 이해하기 쉽게 3문장 이내 한국어 요약:\n\n{}",
            text
        );

        match self.generator.generate(&prompt).await {
            Ok(summary) => {
                info!(generator = self.generator.name(), "Summary generated");
                limit_sentences(summary.trim(), 3)
            }
            Err(e) => {
                warn!(generator = self.generator.name(), "Summarization failed: {}", e);
                format!("[LLM 오류: {}]", e)
            }
        }
    }
}

/// Keep at most `max` sentences, splitting after `.`, `!`, `?` or `。`
fn limit_sentences(text: &str, max: usize) -> String {
    let mut count = 0;
    for (idx, ch) in text.char_indices() {
        if matches!(ch, '.' | '!' | '?' | '。') {
            let next = text[idx + ch.len_utf8()..].chars().next();
            if next.map_or(true, char::is_whitespace) {
                count += 1;
                if count == max {
                    return text[..idx + ch.len_utf8()].to_string();
                }
            }
        }
    }
    text.to_string()
}
