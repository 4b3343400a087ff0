//! Human-agent hand-off payloads
//!
//! Routes a summarized issue to a department queue based on its intent.

use crate::models::{Intent, IntentResult, Urgency};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Schema tag stamped on every payload
pub const HANDOFF_SCHEMA_VERSION: &str = "poc-0.3";

/// Department for intents without a dedicated queue
pub const GENERAL_DEPARTMENT: &str = "종합상담";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffPayload {
    pub target_department: String,
    pub callback_enabled: bool,
    pub priority: u8,
    pub context_summary: String,
    pub recommendation_basis: String,
    pub version: String,
    pub ts: i64,
}

/// Intent → department queue
pub fn department_for(intent: Intent) -> &'static str {
    match intent {
        Intent::Complaint => "고객보호센터",
        Intent::Card => "카드상담센터",
        Intent::Loan => "여신상담센터",
        Intent::Pension | Intent::Tax => "연금·세제상담",
        Intent::CallbackRequest | Intent::Other => GENERAL_DEPARTMENT,
    }
}

/// 2 for high urgency, otherwise 1
pub fn priority_for(urgency: Urgency) -> u8 {
    if urgency == Urgency::High {
        2
    } else {
        1
    }
}

pub struct HandoffBuilder;

impl HandoffBuilder {
    /// Build a payload stamped with the current wall-clock time
    pub fn build(summary: &str, classification: &IntentResult) -> HandoffPayload {
        Self::build_at(summary, classification, Utc::now().timestamp())
    }

    pub fn build_at(summary: &str, classification: &IntentResult, ts: i64) -> HandoffPayload {
        HandoffPayload {
            target_department: department_for(classification.intent).to_string(),
            callback_enabled: true,
            priority: priority_for(classification.urgency),
            context_summary: summary.to_string(),
            recommendation_basis: format!(
                "{}/{}",
                classification.intent, classification.sub_intent
            ),
            version: HANDOFF_SCHEMA_VERSION.to_string(),
            ts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_is_two_only_for_high_urgency() {
        for intent in Intent::ALL {
            for (urgency, expected) in [
                (Urgency::Low, 1),
                (Urgency::Normal, 1),
                (Urgency::High, 2),
            ] {
                let cls = IntentResult::new(intent, "any", urgency);
                assert_eq!(HandoffBuilder::build_at("s", &cls, 0).priority, expected);
            }
        }
    }

    #[test]
    fn test_complaint_routes_to_customer_protection() {
        let cls = IntentResult::new(Intent::Complaint, "금리/표기", Urgency::Normal);
        let payload = HandoffBuilder::build_at("요약", &cls, 1_700_000_000);

        assert_eq!(payload.target_department, "고객보호센터");
        assert!(payload.callback_enabled);
        assert_eq!(payload.recommendation_basis, "complaint/금리/표기");
        assert_eq!(payload.version, HANDOFF_SCHEMA_VERSION);
        assert_eq!(payload.ts, 1_700_000_000);
        assert_eq!(payload.context_summary, "요약");
    }

    #[test]
    fn test_unmapped_intents_fall_back_to_general_department() {
        assert_eq!(department_for(Intent::Other), GENERAL_DEPARTMENT);
        assert_eq!(department_for(Intent::CallbackRequest), GENERAL_DEPARTMENT);
        assert_eq!(department_for(Intent::Pension), department_for(Intent::Tax));
    }

    #[test]
    fn test_payload_has_exact_field_set() {
        let cls = IntentResult::new(Intent::Card, "혜택문의", Urgency::Normal);
        let json = serde_json::to_value(HandoffBuilder::build("s", &cls)).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "callback_enabled",
                "context_summary",
                "priority",
                "recommendation_basis",
                "target_department",
                "ts",
                "version"
            ]
        );
        assert!(json["ts"].as_i64().unwrap() > 0);
    }
}
