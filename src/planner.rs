//! Goal-based savings planner
//!
//! Turns a target amount and horizon into a monthly contribution, an asset
//! mix for the chosen risk tier, and a synthetic starting progress value.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Contributions are rounded up to a multiple of this many won
pub const CONTRIBUTION_STEP: u64 = 1_000;

const PROGRESS_MIN: u8 = 5;
const PROGRESS_MAX: u8 = 40;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    #[default]
    Normal,
    High,
}

impl RiskTier {
    /// Unrecognised labels map to `Normal`
    pub fn from_label(label: &str) -> RiskTier {
        match label.trim().to_lowercase().as_str() {
            "low" | "낮음" => RiskTier::Low,
            "high" | "높음" => RiskTier::High,
            _ => RiskTier::Normal,
        }
    }

    pub fn label_ko(&self) -> &'static str {
        match self {
            RiskTier::Low => "낮음",
            RiskTier::Normal => "보통",
            RiskTier::High => "높음",
        }
    }

    pub fn allocation(&self) -> AssetMix {
        match self {
            RiskTier::Low => AssetMix::new(0.7, 0.3, 0.0),
            RiskTier::Normal => AssetMix::new(0.4, 0.4, 0.2),
            RiskTier::High => AssetMix::new(0.2, 0.4, 0.4),
        }
    }
}

/// Three-bucket split; also used for per-bucket annual yields
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetMix {
    pub parking: f64,
    pub savings: f64,
    pub fund: f64,
}

impl AssetMix {
    pub const fn new(parking: f64, savings: f64, fund: f64) -> Self {
        Self {
            parking,
            savings,
            fund,
        }
    }

    pub fn total(&self) -> f64 {
        self.parking + self.savings + self.fund
    }

    /// `(display label, value)` pairs in bucket order
    pub fn buckets(&self) -> [(&'static str, f64); 3] {
        [
            ("파킹형", self.parking),
            ("적금", self.savings),
            ("ETF", self.fund),
        ]
    }
}

/// Assumed annual yields, reported for display only
pub const ASSUMED_YIELDS: AssetMix = AssetMix::new(0.022, 0.035, 0.07);

/// What the user asked to plan for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalRequest {
    pub label: String,
    pub target: u64,
    pub months: u32,
    pub risk: RiskTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalPlan {
    pub goal: String,
    pub target: u64,
    pub months: u32,
    pub monthly: u64,
    pub risk: RiskTier,
    pub mix: AssetMix,
    pub assumed_yields: AssetMix,
    /// Synthetic starting progress in percent
    pub progress: u8,
}

/// One row of the contribution schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub month: u32,
    pub contribution: u64,
    pub cumulative: u64,
}

impl GoalPlan {
    pub fn schedule(&self) -> Vec<ScheduleRow> {
        (1..=self.months)
            .map(|month| ScheduleRow {
                month,
                contribution: self.monthly,
                cumulative: self.monthly.saturating_mul(u64::from(month)),
            })
            .collect()
    }
}

/// `ceil(target / months)` rounded up to the next [`CONTRIBUTION_STEP`],
/// saturating at `u64::MAX`.
pub fn monthly_contribution(target: u64, months: u32) -> u64 {
    let months = u64::from(months.max(1));
    target
        .div_ceil(months * CONTRIBUTION_STEP)
        .saturating_mul(CONTRIBUTION_STEP)
}

pub struct GoalPlanner;

impl GoalPlanner {
    /// Plan with a generator seeded from `seed`, or from the month count when
    /// no seed (or a zero seed) is given.
    pub fn plan(request: &GoalRequest, seed: Option<u64>) -> GoalPlan {
        let seed = seed
            .filter(|s| *s != 0)
            .unwrap_or_else(|| u64::from(request.months.max(1)));
        let mut rng = StdRng::seed_from_u64(seed);
        Self::plan_with_rng(request, &mut rng)
    }

    /// Plan drawing the progress value from the caller's generator
    pub fn plan_with_rng<R: Rng>(request: &GoalRequest, rng: &mut R) -> GoalPlan {
        let months = request.months.max(1);

        GoalPlan {
            goal: request.label.clone(),
            target: request.target,
            months,
            monthly: monthly_contribution(request.target, months),
            risk: request.risk,
            mix: request.risk.allocation(),
            assumed_yields: ASSUMED_YIELDS,
            progress: rng.gen_range(PROGRESS_MIN..=PROGRESS_MAX),
        }
    }
}
