//! Text extraction for loosely formatted chat input
//!
//! Pulls `key=value` tokens and best-effort scalars (amounts, month counts,
//! risk tiers) out of free text. A missing pattern never fails: every
//! extractor falls back to a documented default.

use crate::planner::{GoalRequest, RiskTier};
use crate::savings::{sample_rules, RewardRule, UsageLedger};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::warn;

/// Payment amount when the text carries none
pub const DEFAULT_AMOUNT: u64 = 12_000;
/// Month count when the text carries none
pub const DEFAULT_MONTHS: u32 = 8;
/// Goal target when the text carries none
pub const DEFAULT_GOAL_TARGET: u64 = 2_000_000;
pub const DEFAULT_GOAL_LABEL: &str = "여행 자금";
/// Goal targets above this many won (1조) are ignored
pub const MAX_GOAL_TARGET: u64 = 1_000_000_000_000;

const GOAL_KEYWORDS: &[&str] = &["여행", "장비", "학비", "이사", "자동차", "결혼", "기타"];

lazy_static! {
    static ref KEY_VALUE: Regex = Regex::new(r"(\w+)\s*=\s*(\S+)").unwrap();
    // Plain digit runs of 3+, or comma-grouped thousands, optionally followed by a currency word
    static ref PAYMENT_AMOUNT: Regex =
        Regex::new(r"(?i)(\d{1,3}(?:,\d{3})+|\d{3,})\s*(?:원|won|krw)?").unwrap();
    static ref GOAL_AMOUNT: Regex = Regex::new(r"(\d[\d,]*)\s*(억|만|천)?\s*원").unwrap();
    static ref MONTHS: Regex = Regex::new(r"(?i)(\d{1,3})\s*(?:개월|months?\b)").unwrap();
    static ref RISK_LOW: Regex = Regex::new(r"(?i)낮음|\blow\b").unwrap();
    static ref RISK_HIGH: Regex = Regex::new(r"(?i)높음|\bhigh\b").unwrap();
}

/// Everything the extractor can read from one utterance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub fields: HashMap<String, String>,
    pub amount: u64,
    pub months: u32,
    pub risk: RiskTier,
}

/// Run every extractor over `text`
pub fn extract(text: &str) -> Extraction {
    Extraction {
        fields: parse_key_values(text),
        amount: extract_amount(text),
        months: extract_months(text),
        risk: extract_risk(text),
    }
}

/// `merchant=스타커피 amount=12000 mcc=CAFE` → lower-cased keys to raw values.
/// A repeated key keeps its last value.
pub fn parse_key_values(text: &str) -> HashMap<String, String> {
    KEY_VALUE
        .captures_iter(text)
        .map(|caps| (caps[1].to_lowercase(), caps[2].to_string()))
        .collect()
}

/// Text with every `key=value` token removed
fn strip_key_values(text: &str) -> String {
    KEY_VALUE.replace_all(text, " ").into_owned()
}

fn parse_digits(raw: &str) -> Option<u64> {
    raw.replace(',', "").parse().ok()
}

/// First amount in the text, or [`DEFAULT_AMOUNT`]
pub fn extract_amount(text: &str) -> u64 {
    find_amount(text).unwrap_or(DEFAULT_AMOUNT)
}

fn find_amount(text: &str) -> Option<u64> {
    PAYMENT_AMOUNT
        .captures_iter(text)
        .filter_map(|caps| parse_digits(&caps[1]))
        .find(|amount| *amount > 0)
}

/// First `<n>개월` / `<n> months`, or [`DEFAULT_MONTHS`]
pub fn extract_months(text: &str) -> u32 {
    MONTHS
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u32>().ok())
        .find(|months| *months > 0)
        .unwrap_or(DEFAULT_MONTHS)
}

/// Low when a low-risk keyword is present, else high when a high-risk
/// keyword is present, else normal
pub fn extract_risk(text: &str) -> RiskTier {
    if RISK_LOW.is_match(text) {
        RiskTier::Low
    } else if RISK_HIGH.is_match(text) {
        RiskTier::High
    } else {
        RiskTier::Normal
    }
}

/// Goal target in won: `2,000,000원`, `200만원`, `1억 원`; amounts above
/// [`MAX_GOAL_TARGET`] are skipped. Else [`DEFAULT_GOAL_TARGET`]
pub fn extract_goal_target(text: &str) -> u64 {
    GOAL_AMOUNT
        .captures_iter(text)
        .filter_map(|caps| {
            let base = parse_digits(&caps[1])?;
            let multiplier = match caps.get(2).map(|m| m.as_str()) {
                Some("억") => 100_000_000,
                Some("만") => 10_000,
                Some("천") => 1_000,
                _ => 1,
            };
            base.checked_mul(multiplier)
        })
        .find(|amount| (1..=MAX_GOAL_TARGET).contains(amount))
        .unwrap_or(DEFAULT_GOAL_TARGET)
}

/// `"<keyword> 자금"` for the first goal keyword found
pub fn extract_goal_label(text: &str) -> String {
    GOAL_KEYWORDS
        .iter()
        .find(|key| text.contains(*key))
        .map(|key| format!("{} 자금", key))
        .unwrap_or_else(|| DEFAULT_GOAL_LABEL.to_string())
}

//
// ================= Typed requests =================
//

/// Inputs for one savings estimation
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub merchant: String,
    pub mcc: String,
    pub amount: u64,
    pub rules: Vec<RewardRule>,
    pub usage: UsageLedger,
}

impl PaymentRequest {
    /// Explicit `merchant=`, `mcc=`, `amount=`, `rules=`, `usage=` keys win;
    /// the rest is inferred from the prose.
    pub fn from_text(text: &str) -> Self {
        let fields = parse_key_values(text);

        let amount = fields
            .get("amount")
            .and_then(|raw| parse_digits(raw))
            .filter(|amount| *amount > 0)
            .or_else(|| find_amount(&strip_key_values(text)))
            .unwrap_or(DEFAULT_AMOUNT);

        let merchant = fields
            .get("merchant")
            .cloned()
            .unwrap_or_else(|| infer_merchant(text).to_string());

        let mcc = fields
            .get("mcc")
            .map(|m| m.to_uppercase())
            .unwrap_or_else(|| infer_category(text).to_string());

        let rules = parse_json_field(&fields, "rules")
            .filter(|rules: &Vec<RewardRule>| !rules.is_empty())
            .unwrap_or_else(sample_rules);

        let usage = parse_json_field(&fields, "usage").unwrap_or_default();

        Self {
            merchant,
            mcc,
            amount,
            rules,
            usage,
        }
    }
}

fn infer_merchant(text: &str) -> &'static str {
    if text.contains("커피") {
        "스타커피"
    } else if text.contains("시네마") || text.contains("영화") {
        "메가시네마"
    } else {
        "김밥왕"
    }
}

fn infer_category(text: &str) -> &'static str {
    if text.contains("커피") {
        "CAFE"
    } else if text.contains("영화") {
        "CINE"
    } else {
        "FNB"
    }
}

/// Parse a JSON-valued field; malformed input is logged and treated as absent
fn parse_json_field<T: DeserializeOwned>(fields: &HashMap<String, String>, key: &str) -> Option<T> {
    let raw = fields.get(key)?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(field = key, "Malformed structured input, using built-in default: {}", e);
            None
        }
    }
}

impl GoalRequest {
    pub fn from_text(text: &str) -> Self {
        Self {
            label: extract_goal_label(text),
            target: extract_goal_target(text),
            months: extract_months(text),
            risk: extract_risk(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_values_are_case_insensitive() {
        let fields = parse_key_values("결제 Merchant=스타커피 AMOUNT = 12800 mcc=CAFE");
        assert_eq!(fields.get("merchant").map(String::as_str), Some("스타커피"));
        assert_eq!(fields.get("amount").map(String::as_str), Some("12800"));
        assert_eq!(fields.get("mcc").map(String::as_str), Some("CAFE"));
    }

    #[test]
    fn test_extract_collects_every_field() {
        let extraction = extract("mcc=CAFE 4800원 3개월 low");
        assert_eq!(extraction.fields.len(), 1);
        assert_eq!(extraction.amount, 4_800);
        assert_eq!(extraction.months, 3);
        assert_eq!(extraction.risk, RiskTier::Low);

        let empty = extract("");
        assert!(empty.fields.is_empty());
        assert_eq!(empty.amount, DEFAULT_AMOUNT);
        assert_eq!(empty.months, DEFAULT_MONTHS);
        assert_eq!(empty.risk, RiskTier::Normal);
    }

    #[test]
    fn test_amount_extraction_and_default() {
        assert_eq!(extract_amount("스타커피 12800원 결제 예정"), 12_800);
        assert_eq!(extract_amount("12,800원 결제"), 12_800);
        assert_eq!(extract_amount("커피 한 잔 결제"), DEFAULT_AMOUNT);
        assert_eq!(extract_amount("99원"), DEFAULT_AMOUNT);
    }

    #[test]
    fn test_month_extraction_and_default() {
        assert_eq!(extract_months("12개월 동안"), 12);
        assert_eq!(extract_months("over 6 months"), 6);
        assert_eq!(extract_months("반년 정도"), DEFAULT_MONTHS);
        assert_eq!(extract_months("0개월"), DEFAULT_MONTHS);
    }

    #[test]
    fn test_risk_keywords() {
        assert_eq!(extract_risk("위험 낮음으로"), RiskTier::Low);
        assert_eq!(extract_risk("높음 위험"), RiskTier::High);
        assert_eq!(extract_risk("high risk please"), RiskTier::High);
        assert_eq!(extract_risk("follow the plan"), RiskTier::Normal);
        assert_eq!(extract_risk("보통 위험"), RiskTier::Normal);
    }

    #[test]
    fn test_goal_target_units() {
        assert_eq!(extract_goal_target("2,000,000원 모으기"), 2_000_000);
        assert_eq!(extract_goal_target("여행 자금 300만원"), 3_000_000);
        assert_eq!(extract_goal_target("1억 원 목표"), 100_000_000);
        assert_eq!(extract_goal_target("목표 플랜"), DEFAULT_GOAL_TARGET);
    }

    #[test]
    fn test_goal_target_above_limit_is_ignored() {
        assert_eq!(
            extract_goal_target("목표 플랜 18446744073709551615원 1개월"),
            DEFAULT_GOAL_TARGET
        );
        assert_eq!(extract_goal_target("99999999억 원 말고 300만원"), 3_000_000);
        assert_eq!(extract_goal_target("1,000,000,000,000원"), MAX_GOAL_TARGET);
    }

    #[test]
    fn test_goal_request_from_text() {
        let req = GoalRequest::from_text("자동차 자금 1,200,000원 6개월 높음 위험으로 목표 플랜");
        assert_eq!(req.label, "자동차 자금");
        assert_eq!(req.target, 1_200_000);
        assert_eq!(req.months, 6);
        assert_eq!(req.risk, RiskTier::High);

        let defaults = GoalRequest::from_text("목표 플랜 짜줘");
        assert_eq!(defaults.label, DEFAULT_GOAL_LABEL);
        assert_eq!(defaults.months, DEFAULT_MONTHS);
        assert_eq!(defaults.risk, RiskTier::Normal);
    }

    #[test]
    fn test_payment_request_infers_from_prose() {
        let req = PaymentRequest::from_text("스타커피 12800원 결제 예정 추천 카드 적용해줘");
        assert_eq!(req.merchant, "스타커피");
        assert_eq!(req.mcc, "CAFE");
        assert_eq!(req.amount, 12_800);
        assert_eq!(req.rules, sample_rules());
        assert!(req.usage.is_empty());

        let movie = PaymentRequest::from_text("영화 결제");
        assert_eq!(movie.merchant, "메가시네마");
        assert_eq!(movie.mcc, "CINE");
        assert_eq!(movie.amount, DEFAULT_AMOUNT);
    }

    #[test]
    fn test_payment_request_explicit_keys_win() {
        let req = PaymentRequest::from_text(
            r#"결제 merchant=김밥왕 mcc=fnb usage={"Alpha":19800} rules=[{"name":"Alpha","mcc":["FNB"],"rate":0.05,"cap":20000}] amount=8200"#,
        );
        assert_eq!(req.merchant, "김밥왕");
        assert_eq!(req.mcc, "FNB");
        assert_eq!(req.amount, 8_200);
        assert_eq!(req.rules.len(), 1);
        assert_eq!(req.usage.used("Alpha"), 19_800);
    }

    #[test]
    fn test_malformed_rules_fall_back_to_samples() {
        let req = PaymentRequest::from_text("결제 rules=[{broken usage=nope");
        assert_eq!(req.rules, sample_rules());
        assert!(req.usage.is_empty());
    }

    #[test]
    fn test_json_numbers_are_not_mistaken_for_amount() {
        let req = PaymentRequest::from_text(
            r#"결제 rules=[{"name":"A","mcc":["ALL"],"rate":0.1,"cap":50000}] 커피 4800원"#,
        );
        assert_eq!(req.amount, 4_800);
    }
}
