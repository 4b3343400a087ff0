//! Environment-driven settings
//!
//! The API key is optional: without it every strategy runs rule-based.

use std::env;
use tracing::warn;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_GEMINI_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HISTORY_TURNS: usize = 20;

const PLACEHOLDER_KEYS: &[&str] = &["your_gemini_api_key_here", "mock_key"];

#[derive(Debug, Clone)]
pub struct CoachConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub port: u16,
    /// Most recent history turns included in the conversational prompt
    pub history_turns: usize,
    /// Explicit seed for the goal planner's progress value
    pub progress_seed: Option<u64>,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            port: DEFAULT_PORT,
            history_turns: DEFAULT_HISTORY_TURNS,
            progress_seed: None,
        }
    }
}

impl CoachConfig {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through an arbitrary lookup (used by tests)
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup("GOOGLE_API_KEY")
            .filter(|k| usable_key(k))
            .or_else(|| lookup("GEMINI_API_KEY").filter(|k| usable_key(k)));

        let port = lookup("PORT")
            .or_else(|| lookup("API_PORT"))
            .and_then(|raw| parse_or_warn("PORT", &raw))
            .unwrap_or(defaults.port);

        let history_turns = lookup("COACH_HISTORY_TURNS")
            .and_then(|raw| parse_or_warn("COACH_HISTORY_TURNS", &raw))
            .unwrap_or(defaults.history_turns);

        let progress_seed = lookup("COACH_PROGRESS_SEED")
            .and_then(|raw| parse_or_warn("COACH_PROGRESS_SEED", &raw));

        Self {
            api_key,
            model: lookup("GEMINI_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(defaults.model),
            base_url: lookup("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or(defaults.base_url),
            port,
            history_turns,
            progress_seed,
        }
    }

    pub fn llm_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

fn usable_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && !PLACEHOLDER_KEYS.contains(&key)
}

fn parse_or_warn<T: std::str::FromStr>(name: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable {}={:?}", name, raw);
            None
        }
    }
}
