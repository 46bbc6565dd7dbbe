//! Text-generation backend trait.
//!
//! The resolver's third strategy asks an external generative-language
//! service to answer a business question as structured data. The service is
//! reached through this trait so provider crates (e.g. `insightflow-gemini`)
//! can plug in, and tests can substitute a canned backend.

use async_trait::async_trait;

use crate::error::Result;

/// A text-generation backend: one free-text prompt in, one text reply out.
///
/// Implementations map transport failures and non-success statuses to
/// [`Error::ExternalService`](crate::error::Error::ExternalService) and
/// deadline overruns to [`Error::Timeout`](crate::error::Error::Timeout).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a reply for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for std::sync::Arc<T> {
    async fn generate(&self, prompt: &str) -> Result<String> {
        (**self).generate(prompt).await
    }
}
