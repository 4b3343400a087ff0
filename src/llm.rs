//! Optional text-generation capability
//!
//! Delegated strategies talk to a model only through this trait, so the
//! transport can be swapped or scripted.

use crate::Result;
use async_trait::async_trait;

/// `generate(prompt) -> text`; may fail with a transport or auth error.
///
/// Implementations apply no retry and no timeout of their own.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Short name for logs and reply metadata
    fn name(&self) -> &str;
}
