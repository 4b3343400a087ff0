//! Card-payment savings estimation
//!
//! Picks the reward rule that saves the most on one transaction, honouring
//! each rule's eligible categories and the monthly cap left after usage.

use crate::models::group_thousands;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category wildcard matching every transaction
pub const ALL_CATEGORIES: &str = "ALL";

/// Card recommended when no rule beats the current card
pub const NO_BENEFIT_CARD: &str = "현재카드 유지";
const NO_BENEFIT_REASON: &str = "추가 혜택 없음";

fn default_cap() -> u64 {
    99_999_999
}

/// One card's cashback policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardRule {
    pub name: String,
    /// Eligible merchant categories, or [`ALL_CATEGORIES`]
    #[serde(rename = "mcc", alias = "categories", default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub rate: f64,
    /// Monthly reward cap in won
    #[serde(default = "default_cap")]
    pub cap: u64,
}

impl RewardRule {
    pub fn new(name: &str, categories: &[&str], rate: f64, cap: u64) -> Self {
        Self {
            name: name.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            rate,
            cap,
        }
    }

    pub fn applies_to(&self, category: &str) -> bool {
        self.categories
            .iter()
            .any(|c| c == ALL_CATEGORIES || c == category)
    }

    /// Rate clamped into `[0, 1]`
    fn effective_rate(&self) -> f64 {
        if self.rate.is_nan() {
            0.0
        } else {
            self.rate.clamp(0.0, 1.0)
        }
    }
}

/// Built-in demo rule set
pub fn sample_rules() -> Vec<RewardRule> {
    vec![
        RewardRule::new("Alpha Card", &["FNB", "CAFE"], 0.05, 20_000),
        RewardRule::new("Beta Card", &[ALL_CATEGORIES], 0.02, 50_000),
        RewardRule::new("Cinema Max", &["CINE"], 0.10, 15_000),
    ]
}

/// Reward already claimed this month, per rule name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageLedger(BTreeMap<String, u64>);

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, rule_name: &str, used: u64) -> Self {
        self.0.insert(rule_name.to_string(), used);
        self
    }

    pub fn used(&self, rule_name: &str) -> u64 {
        self.0.get(rule_name).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of running the estimator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavingsEstimate {
    pub recommended_card: String,
    pub saved: u64,
    pub reason: String,
}

impl SavingsEstimate {
    fn no_benefit() -> Self {
        Self {
            recommended_card: NO_BENEFIT_CARD.to_string(),
            saved: 0,
            reason: NO_BENEFIT_REASON.to_string(),
        }
    }

    pub fn has_benefit(&self) -> bool {
        self.saved > 0
    }
}

/// Mock payment payload emitted alongside the recommendation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPayload {
    pub merchant: String,
    pub mcc: String,
    pub amount: u64,
    pub recommended_card: String,
    pub expected_saving: u64,
    pub reason: String,
    pub ts: i64,
}

impl PaymentPayload {
    pub fn new(merchant: &str, mcc: &str, amount: u64, estimate: &SavingsEstimate, ts: i64) -> Self {
        Self {
            merchant: merchant.to_string(),
            mcc: mcc.to_string(),
            amount,
            recommended_card: estimate.recommended_card.clone(),
            expected_saving: estimate.saved,
            reason: estimate.reason.clone(),
            ts,
        }
    }
}

/// Stateless estimator; identical inputs always give identical output.
pub struct SavingsEstimator;

impl SavingsEstimator {
    /// Best rule for `amount` spent in `category`.
    ///
    /// Rules are scanned in input order and a later rule replaces the current
    /// best only when it saves strictly more, so the first rule wins ties.
    pub fn estimate(
        amount: u64,
        category: &str,
        rules: &[RewardRule],
        usage: &UsageLedger,
    ) -> SavingsEstimate {
        let mut best = SavingsEstimate::no_benefit();

        for rule in rules.iter().filter(|r| r.applies_to(category)) {
            let rate = rule.effective_rate();
            let remaining = rule.cap.saturating_sub(usage.used(&rule.name));
            let raw = (amount as f64 * rate).floor() as u64;
            let saved = raw.min(remaining);

            if saved > best.saved {
                best = SavingsEstimate {
                    recommended_card: rule.name.clone(),
                    saved,
                    reason: format!(
                        "{} {}% / 잔여한도 {}원",
                        rule.name,
                        (rate * 100.0) as u64,
                        group_thousands(remaining)
                    ),
                };
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_beta() -> Vec<RewardRule> {
        vec![
            RewardRule::new("Alpha Card", &["CAFE", "FNB"], 0.05, 20_000),
            RewardRule::new("Beta Card", &[ALL_CATEGORIES], 0.02, 50_000),
        ]
    }

    #[test]
    fn test_higher_rate_category_rule_wins() {
        let estimate = SavingsEstimator::estimate(4_800, "CAFE", &alpha_beta(), &UsageLedger::new());
        assert_eq!(estimate.recommended_card, "Alpha Card");
        assert_eq!(estimate.saved, 240);
        assert_eq!(estimate.reason, "Alpha Card 5% / 잔여한도 20,000원");
    }

    #[test]
    fn test_exhausted_cap_hands_win_to_wildcard_rule() {
        let usage = UsageLedger::new().with("Alpha Card", 19_800);
        let estimate = SavingsEstimator::estimate(12_800, "CAFE", &alpha_beta(), &usage);
        // Alpha is clamped to its 200 remaining; Beta's 2% gives 256.
        assert_eq!(estimate.recommended_card, "Beta Card");
        assert_eq!(estimate.saved, 256);
    }

    #[test]
    fn test_saved_never_exceeds_rate_or_remaining_cap() {
        let rules = vec![
            RewardRule::new("Tiny Cap", &["CAFE"], 0.5, 1_000),
            RewardRule::new("Low Rate", &[ALL_CATEGORIES], 0.01, 1_000_000),
        ];
        let usage = UsageLedger::new().with("Tiny Cap", 700);

        for amount in [1u64, 99, 1_000, 4_800, 123_457, 10_000_000] {
            let estimate = SavingsEstimator::estimate(amount, "CAFE", &rules, &usage);
            let rule = rules
                .iter()
                .find(|r| r.name == estimate.recommended_card);
            match rule {
                Some(rule) => {
                    let remaining = rule.cap.saturating_sub(usage.used(&rule.name));
                    assert!(estimate.saved <= (amount as f64 * rule.rate).floor() as u64);
                    assert!(estimate.saved <= remaining);
                }
                None => assert_eq!(estimate.saved, 0),
            }
        }
    }

    #[test]
    fn test_usage_above_cap_is_clamped_to_zero_remaining() {
        let rules = vec![RewardRule::new("Alpha Card", &["CAFE"], 0.05, 20_000)];
        let usage = UsageLedger::new().with("Alpha Card", 25_000);
        let estimate = SavingsEstimator::estimate(50_000, "CAFE", &rules, &usage);
        assert_eq!(estimate.recommended_card, NO_BENEFIT_CARD);
        assert_eq!(estimate.saved, 0);
        assert!(!estimate.has_benefit());
    }

    #[test]
    fn test_first_rule_wins_exact_tie() {
        let rules = vec![
            RewardRule::new("First", &["FNB"], 0.03, 10_000),
            RewardRule::new("Second", &[ALL_CATEGORIES], 0.03, 10_000),
        ];
        let estimate = SavingsEstimator::estimate(10_000, "FNB", &rules, &UsageLedger::new());
        assert_eq!(estimate.recommended_card, "First");
        assert_eq!(estimate.saved, 300);
    }

    #[test]
    fn test_no_matching_category_keeps_current_card() {
        let rules = vec![RewardRule::new("Cinema Max", &["CINE"], 0.10, 15_000)];
        let estimate = SavingsEstimator::estimate(8_200, "FNB", &rules, &UsageLedger::new());
        assert_eq!(estimate.recommended_card, NO_BENEFIT_CARD);
        assert_eq!(estimate.reason, "추가 혜택 없음");
    }

    #[test]
    fn test_estimate_is_idempotent() {
        let rules = sample_rules();
        let usage = UsageLedger::new().with("Alpha Card", 5_000);
        let first = SavingsEstimator::estimate(12_800, "CAFE", &rules, &usage);
        let second = SavingsEstimator::estimate(12_800, "CAFE", &rules, &usage);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(rules, sample_rules());
        assert_eq!(usage.used("Alpha Card"), 5_000);
    }

    #[test]
    fn test_rule_json_uses_mcc_key_and_defaults() {
        let rules: Vec<RewardRule> =
            serde_json::from_str(r#"[{"name":"Gamma","mcc":["CAFE"],"rate":0.1}]"#).unwrap();
        assert_eq!(rules[0].categories, vec!["CAFE".to_string()]);
        assert_eq!(rules[0].cap, 99_999_999);

        let usage: UsageLedger = serde_json::from_str(r#"{"Gamma":300}"#).unwrap();
        assert_eq!(usage.used("Gamma"), 300);
        assert_eq!(usage.used("Delta"), 0);
    }

    #[test]
    fn test_out_of_range_rate_is_clamped() {
        let rules = vec![RewardRule::new("Broken", &["CAFE"], 3.0, 1_000_000)];
        let estimate = SavingsEstimator::estimate(1_000, "CAFE", &rules, &UsageLedger::new());
        assert_eq!(estimate.saved, 1_000);
    }
}
