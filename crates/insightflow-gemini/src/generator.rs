//! Google Gemini text generation backend.
//!
//! [`GeminiGenerator`] implements [`insightflow::generation::TextGenerator`]
//! over the Generative Language API's `generateContent` endpoint. The
//! resolver hands it a prompt and gets back the model's raw reply text;
//! everything downstream (JSON extraction, normalization) stays in the core
//! crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use insightflow_gemini::GeminiGenerator;
//! use insightflow::generation::TextGenerator;
//!
//! # async fn example() -> insightflow::Result<()> {
//! let generator = GeminiGenerator::new()
//!     .with_api_key("your-api-key")
//!     .with_model("gemini-2.0-flash");
//!
//! let reply = generator.generate("Revenue by region, as JSON").await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use insightflow::error::{Error, Result};
use insightflow::generation::TextGenerator;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Gemini generation backend.
///
/// # Configuration
///
/// The API key can be set via:
/// - Constructor: `GeminiGenerator::new().with_api_key("...")`
/// - Environment: `GEMINI_API_KEY`
pub struct GeminiGenerator {
    /// API key for authentication
    api_key: Option<String>,
    /// Model name (e.g., "gemini-2.0-flash")
    model: String,
    /// API base URL, overridable for testing
    api_base: String,
    /// HTTP client
    client: Client,
    /// Per-request timeout
    timeout: Duration,
}

impl GeminiGenerator {
    /// Create a new Gemini generator with default settings.
    ///
    /// Defaults:
    /// - Model: `gemini-2.0-flash`
    /// - Timeout: 30 seconds
    /// - API key: from `GEMINI_API_KEY` environment variable
    #[must_use]
    pub fn new() -> Self {
        Self {
            api_key: std::env::var("GEMINI_API_KEY").ok(),
            model: DEFAULT_MODEL.to_string(),
            api_base: API_BASE.to_string(),
            client: Client::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the API key explicitly.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the model name.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL. Mainly useful for pointing the client at
    /// a local mock server in tests.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the API key, returning an error if not configured.
    fn get_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            Error::validation(
                "GEMINI_API_KEY not set. Set it via environment variable or with_api_key()",
            )
        })
    }

    async fn generate_content(&self, prompt: &str) -> Result<String> {
        let api_key = self.get_api_key()?;
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.api_base, self.model, api_key
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        debug!(model = %self.model, "sending generateContent request");
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout(format!("Gemini API request timed out: {e}"))
                } else {
                    Error::external_service(format!("Gemini API request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::external_service(format!(
                "Gemini API error: {status}: {body}"
            )));
        }

        let reply: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::external_service(format!("Failed to parse Gemini response: {e}")))?;

        reply
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| Error::external_service("Gemini response contained no candidates"))
    }
}

impl Default for GeminiGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_content(prompt).await
    }
}

// Request/Response types for the Generative Language API

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}
