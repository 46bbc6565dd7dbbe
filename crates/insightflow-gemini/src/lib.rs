//! Google Gemini backend for InsightFlow
//!
//! This crate provides a generation backend over Google's Generative
//! Language API. It implements the `TextGenerator` trait from
//! `insightflow::generation`, so a query resolver or analytics session can
//! delegate unresolved queries to a Gemini model.
//!
//! # Example
//!
//! ```no_run
//! use insightflow::history::FileHistoryStore;
//! use insightflow::session::AnalyticsSession;
//! use insightflow_gemini::GeminiGenerator;
//!
//! # async fn example() -> insightflow::Result<()> {
//! let generator = GeminiGenerator::new()
//!     .with_api_key("your-api-key")
//!     .with_model("gemini-2.0-flash");
//!
//! let session = AnalyticsSession::new(generator, FileHistoryStore::in_dir("."));
//! session.load_history().await;
//! let result = session.submit("Compare revenue across regions").await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Authentication
//!
//! The Gemini API requires an API key. Get one from
//! <https://ai.google.dev/> and set it via environment variable:
//!
//! ```bash
//! export GEMINI_API_KEY="your-api-key"
//! ```
//!
//! Or pass it directly with `with_api_key`.

pub mod generator;

pub use generator::GeminiGenerator;
