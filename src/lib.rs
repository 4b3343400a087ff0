//! Financial Coach
//!
//! Intent routing and decision rules behind a chat-based financial coaching
//! avatar:
//! - Classifies free-text utterances into routes and intents
//! - Extracts amounts, categories, horizons and risk tiers from loose text
//! - Estimates card-payment savings against reward rules
//! - Plans monthly contributions for a savings goal
//! - Builds hand-off payloads for a human-agent queue
//!
//! TURN LOOP:
//! AWAITING INPUT → ROUTED → REPLY → RENDERED

pub mod agent;
pub mod api;
pub mod classifier;
pub mod config;
pub mod conversational;
pub mod error;
pub mod extractor;
pub mod gemini;
pub mod handoff;
pub mod llm;
pub mod models;
pub mod planner;
pub mod savings;
pub mod session;
pub mod summarizer;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use agent::{Orchestrator, Strategies, TurnReply};
pub use session::SessionContext;
