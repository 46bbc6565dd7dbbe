//! Query-resolution pipeline for generative analytics dashboards
//!
//! InsightFlow turns a free-text analytics question into a structured
//! [`AnalysisResult`](types::AnalysisResult) — either a renderable data
//! series or a list of narrative insights — through a three-stage
//! resolution ladder:
//!
//! 1. **Direct JSON**: the query text itself parses as chart data
//! 2. **Mock lookup**: the query matches a canned analysis
//! 3. **External generation**: a language-model backend answers, and the
//!    reply is normalized into chart data or insight text
//!
//! Around that core, the crate provides a record normalizer
//! ([`normalize`]), an axis classifier ([`axis`]), a metric formatter
//! ([`format`]), a capped persisted query history ([`history`]), and an
//! observable state container ([`state`]). [`session::AnalyticsSession`]
//! ties it all together behind a single `submit(text)` surface.
//!
//! Generation backends implement the [`generation::TextGenerator`] trait;
//! the `insightflow-gemini` crate provides one for Google's Generative
//! Language API.
//!
//! # Example
//!
//! ```no_run
//! use insightflow::history::FileHistoryStore;
//! use insightflow::session::AnalyticsSession;
//! # use insightflow::generation::TextGenerator;
//! # async fn example(backend: impl TextGenerator) -> insightflow::Result<()> {
//! let session = AnalyticsSession::new(backend, FileHistoryStore::in_dir("."));
//! session.load_history().await;
//!
//! let result = session.submit("revenue by product category last quarter").await?;
//! println!("{result:?}");
//! # Ok(())
//! # }
//! ```

pub mod axis;
pub mod error;
pub mod format;
pub mod generation;
pub mod history;
pub mod mock;
pub mod normalize;
pub mod resolver;
pub mod session;
pub mod state;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use session::AnalyticsSession;
pub use types::{AnalysisKind, AnalysisResult, DataPoint, HistoryEntry, Query, Series};
