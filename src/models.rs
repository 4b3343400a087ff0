//! Core data models for the financial coach

use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Utterance =================
//

/// One user chat turn. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utterance {
    text: String,
    turn_index: usize,
}

impl Utterance {
    pub fn new(text: impl Into<String>, turn_index: usize) -> Self {
        Self {
            text: text.into(),
            turn_index,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }
}

//
// ================= Intent =================
//

/// Fine-grained intent of an utterance, used for hand-off routing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    Complaint,
    Card,
    Loan,
    Pension,
    Tax,
    CallbackRequest,
    Other,
}

impl Intent {
    pub const ALL: [Intent; 7] = [
        Intent::Complaint,
        Intent::Card,
        Intent::Loan,
        Intent::Pension,
        Intent::Tax,
        Intent::CallbackRequest,
        Intent::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Complaint => "complaint",
            Intent::Card => "card",
            Intent::Loan => "loan",
            Intent::Pension => "pension",
            Intent::Tax => "tax",
            Intent::CallbackRequest => "callback-request",
            Intent::Other => "other",
        }
    }

    /// Korean label as used in model prompts and replies
    pub fn label_ko(&self) -> &'static str {
        match self {
            Intent::Complaint => "민원",
            Intent::Card => "카드",
            Intent::Loan => "대출",
            Intent::Pension => "연금",
            Intent::Tax => "세제",
            Intent::CallbackRequest => "상담요청",
            Intent::Other => "기타",
        }
    }

    /// Accepts either the English tag or the Korean label; anything else is `Other`.
    pub fn from_label(label: &str) -> Intent {
        let trimmed = label.trim();
        let lowered = trimmed.to_lowercase();
        Intent::ALL
            .iter()
            .copied()
            .find(|intent| intent.as_str() == lowered || intent.label_ko() == trimmed)
            .unwrap_or_else(|| match lowered.as_str() {
                "callback" | "callback_request" => Intent::CallbackRequest,
                _ => Intent::Other,
            })
    }
}

//
// ================= Urgency =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::High => "high",
        }
    }

    pub fn label_ko(&self) -> &'static str {
        match self {
            Urgency::Low => "낮음",
            Urgency::Normal => "보통",
            Urgency::High => "높음",
        }
    }

    pub fn from_label(label: &str) -> Urgency {
        match label.trim().to_lowercase().as_str() {
            "low" | "낮음" => Urgency::Low,
            "high" | "높음" => Urgency::High,
            _ => Urgency::Normal,
        }
    }
}

//
// ================= Classification =================
//

/// Classifier output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    pub sub_intent: String,
    pub urgency: Urgency,
}

impl IntentResult {
    pub fn new(intent: Intent, sub_intent: impl Into<String>, urgency: Urgency) -> Self {
        Self {
            intent,
            sub_intent: sub_intent.into(),
            urgency,
        }
    }

    /// Safe default returned when delegated classification fails
    pub fn classification_error(cause: impl fmt::Display) -> Self {
        Self::new(
            Intent::Other,
            format!("classification error: {}", cause),
            Urgency::Normal,
        )
    }
}

//
// ================= Routing =================
//

/// Coarse route chosen for a whole turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Help,
    PaymentOptimization,
    GoalPlanning,
    #[serde(rename = "hand-off")]
    Handoff,
    GeneralChat,
}

//
// ================= Formatting =================
//

/// Digits grouped by thousands, e.g. `12800` → `"12,800"`
pub fn group_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Amount in won for display, e.g. `12800` → `"12,800원"`
pub fn format_won(amount: u64) -> String {
    format!("{}원", group_thousands(amount))
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Route::Help => "help",
            Route::PaymentOptimization => "payment-optimization",
            Route::GoalPlanning => "goal-planning",
            Route::Handoff => "hand-off",
            Route::GeneralChat => "general-chat",
        };
        write!(f, "{}", s)
    }
}
