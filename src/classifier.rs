//! Intent classification and turn routing
//!
//! Two layers:
//! - Coarse routing: picks which behavior handles a whole turn
//!   (help, payment optimization, goal planning, hand-off, general chat)
//! - Intent classification: labels an utterance for hand-off routing, either
//!   by keyword rules or by a delegated model call

use crate::llm::TextGenerator;
use crate::models::{Intent, IntentResult, Route, Urgency};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

//
// ================= Coarse routing =================
//

/// Static keyword lists
const HELP_KEYWORDS: &[&str] = &["도움말"];
const PAYMENT_KEYWORDS: &[&str] = &["결제", "pay", "카드 추천", "추천 카드"];
const GOAL_KEYWORDS: &[&str] = &["목표", "포트폴리오", "플랜"];
const HANDOFF_KEYWORDS: &[&str] = &["요약", "핸드오프", "분류"];

/// Route a message; checks run in fixed precedence and the first hit wins.
pub fn route_message(message: &str) -> Route {
    let text = message.trim().to_lowercase();

    if text.starts_with("/help") || contains_any(&text, HELP_KEYWORDS) {
        Route::Help
    } else if contains_any(&text, PAYMENT_KEYWORDS) {
        Route::PaymentOptimization
    } else if contains_any(&text, GOAL_KEYWORDS) {
        Route::GoalPlanning
    } else if contains_any(&text, HANDOFF_KEYWORDS) {
        Route::Handoff
    } else {
        Route::GeneralChat
    }
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

//
// ================= Intent classification =================
//

/// `classify(text) -> IntentResult`; never fails.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> IntentResult;
}

/// Ordered rule table: first matching keyword set wins
const INTENT_RULES: &[(Intent, &[&str], &str)] = &[
    (Intent::Complaint, &["금리", "민원", "불만", "complaint"], "금리/표기"),
    (Intent::Card, &["카드", "혜택", "card"], "혜택문의"),
    (Intent::Loan, &["대출", "갈아타", "loan", "refinanc"], "대환"),
    (
        Intent::Tax,
        &["연금", "세액", "소득공제", "세제", "pension", "tax"],
        "연금/세제",
    ),
    (
        Intent::CallbackRequest,
        &["전화", "상담", "콜백", "callback", "call me"],
        "콜백",
    ),
];

const OTHER_SUB_INTENT: &str = "일반 문의";

const URGENT_KEYWORDS: &[&str] = &["긴급", "급해", "급합니다", "당장", "urgent", "asap"];

/// Deterministic keyword classifier
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    pub fn classify_text(text: &str) -> IntentResult {
        let lowered = text.to_lowercase();

        let urgency = if contains_any(&lowered, URGENT_KEYWORDS) {
            Urgency::High
        } else {
            Urgency::Normal
        };

        INTENT_RULES
            .iter()
            .find(|(_, keywords, _)| contains_any(&lowered, keywords))
            .map(|(intent, _, sub_intent)| IntentResult::new(*intent, *sub_intent, urgency))
            .unwrap_or_else(|| IntentResult::new(Intent::Other, OTHER_SUB_INTENT, urgency))
    }
}

#[async_trait]
impl IntentClassifier for RuleBasedClassifier {
    async fn classify(&self, text: &str) -> IntentResult {
        Self::classify_text(text)
    }
}

/// Classifier that asks the text model for a JSON verdict
pub struct DelegatedClassifier {
    generator: Arc<dyn TextGenerator>,
}

impl DelegatedClassifier {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl IntentClassifier for DelegatedClassifier {
    async fn classify(&self, text: &str) -> IntentResult {
        let prompt = format!("{}\n\n사용자 발화:\n{}", classification_instruction(), text);

        match self.generator.generate(&prompt).await {
            Ok(reply) => parse_classification(&reply).unwrap_or_else(|cause| {
                warn!(generator = self.generator.name(), "Unparsable classification reply: {}", cause);
                IntentResult::classification_error(cause)
            }),
            Err(e) => {
                warn!(generator = self.generator.name(), "Delegated classification failed: {}", e);
                IntentResult::classification_error(e)
            }
        }
    }
}

/// Fixed-schema instruction listing the allowed values
fn classification_instruction() -> String {
    let intents: Vec<&str> = Intent::ALL.iter().map(|i| i.as_str()).collect();
    format!(
        "JSON으로만 답해. keys=[intent, sub_intent, urgency]. \
         intent in [{}]; urgency in [low, normal, high]",
        intents.join(", ")
    )
}

#[derive(Debug, Deserialize)]
struct RawClassification {
    intent: Option<String>,
    #[serde(default)]
    sub_intent: Option<String>,
    #[serde(default)]
    urgency: Option<String>,
}

/// Parse a model reply, tolerating a ```json fence or prose around the object.
fn parse_classification(reply: &str) -> std::result::Result<IntentResult, String> {
    let body = extract_json_object(reply).ok_or_else(|| "no JSON object in reply".to_string())?;
    let raw: RawClassification = serde_json::from_str(body).map_err(|e| e.to_string())?;

    let intent = raw
        .intent
        .as_deref()
        .map(Intent::from_label)
        .ok_or_else(|| "missing intent".to_string())?;

    debug!(intent = %intent, "Delegated classification parsed");

    Ok(IntentResult::new(
        intent,
        raw.sub_intent.unwrap_or_default(),
        raw.urgency.as_deref().map(Urgency::from_label).unwrap_or_default(),
    ))
}

fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}
