//! Ordered query-resolution chain.
//!
//! [`QueryResolver`] turns a raw query string into a canonical
//! [`AnalysisResult`] by trying three strategies in a fixed order, first
//! success wins:
//!
//! 1. **Direct JSON** — query text that *is* a JSON payload (starts with
//!    `{` or `[`) is parsed and normalized directly.
//! 2. **Mock lookup** — exact match against the canned analysis table.
//! 3. **External generation** — one call to the [`TextGenerator`] backend,
//!    whose free-text reply is mined for structured data.
//!
//! Strategy failures are data, not exceptions: a parse failure or an empty
//! post-normalization series falls through to the next step. Only the
//! external step can fail the whole resolution, and even then the failure
//! carries user-facing diagnostic insights so the display layer always has
//! content to show.
//!
//! The resolver is a small state machine — `Idle → Resolving → {Resolved,
//! Failed}` — with at most one resolution in flight: a second submission
//! while resolving is rejected rather than raced.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::generation::TextGenerator;
use crate::mock;
use crate::normalize::{normalize_records, Normalized};
use crate::types::{AnalysisResult, DataPoint, Series};

/// Default deadline for the external generation call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Data-type tag used when no better one can be inferred.
const DEFAULT_DATA_TYPE: &str = "value";

/// `name: number` pattern applied per line as the last structured-extraction
/// pass over free-text replies. Integer-valued by convention.
static LINE_PAIR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^:]+):\s*(\d+)").expect("line pair regex is valid"));

/// The three ordered resolution strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStep {
    /// Strict JSON parse of the query text itself
    DirectJson,
    /// Exact match in the canned analysis table
    MockLookup,
    /// One call to the text-generation backend
    ExternalGeneration,
}

/// Outcome of a completed resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A strategy produced a well-formed result.
    Resolved {
        /// The canonical result
        result: AnalysisResult,
        /// Which strategy produced it
        step: ResolutionStep,
    },
    /// The chain was exhausted or the service call failed.
    Failed {
        /// Why the resolution failed
        error: Error,
        /// Text-kind result carrying user-facing diagnostic lines, shown in
        /// the same slot as a successful textual result
        diagnostics: AnalysisResult,
    },
}

/// Resolves raw query strings against the ordered strategy chain.
pub struct QueryResolver<G> {
    generator: G,
    timeout: Duration,
    in_flight: AtomicBool,
}

impl<G: TextGenerator> QueryResolver<G> {
    /// Create a resolver over a generation backend with the default timeout.
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            timeout: DEFAULT_TIMEOUT,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Set the deadline for the external generation call.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether a resolution is currently in flight.
    pub fn is_resolving(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the in-flight slot. Fails while another resolution holds it,
    /// so callers can reject a submission before touching any other state.
    pub(crate) fn try_acquire(&self) -> Result<InFlightPermit<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::validation("a resolution is already in flight"));
        }
        Ok(InFlightPermit(&self.in_flight))
    }

    /// Resolve a query through the strategy chain.
    ///
    /// Canonical order: direct JSON, then mock lookup, then external
    /// generation (earlier variants of this pipeline disagreed; this order
    /// is now the documented contract).
    ///
    /// # Errors
    ///
    /// Returns `Err` only for submission-level rejections: empty query text,
    /// or a resolution already in flight. Strategy and service failures are
    /// reported as [`Resolution::Failed`] with diagnostic insights.
    pub async fn resolve(&self, query: &str) -> Result<Resolution> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("query text is empty"));
        }
        let permit = self.try_acquire()?;
        Ok(self.resolve_acquired(trimmed, &permit).await)
    }

    /// Run the strategy chain under an already-claimed permit.
    pub(crate) async fn resolve_acquired(
        &self,
        trimmed: &str,
        _permit: &InFlightPermit<'_>,
    ) -> Resolution {
        if let Some(result) = try_direct_json(trimmed) {
            debug!(step = ?ResolutionStep::DirectJson, "query resolved from inline JSON");
            return Resolution::Resolved {
                result,
                step: ResolutionStep::DirectJson,
            };
        }

        if let Some(result) = mock::lookup(trimmed) {
            debug!(step = ?ResolutionStep::MockLookup, "query resolved from canned table");
            return Resolution::Resolved {
                result,
                step: ResolutionStep::MockLookup,
            };
        }

        self.resolve_external(trimmed).await
    }

    /// Third strategy: one generation call under an explicit deadline.
    async fn resolve_external(&self, query: &str) -> Resolution {
        let prompt = build_prompt(query);

        let reply = match tokio::time::timeout(self.timeout, self.generator.generate(&prompt)).await
        {
            Err(_elapsed) => {
                let error = Error::timeout(format!(
                    "generation call exceeded {}s deadline",
                    self.timeout.as_secs()
                ));
                warn!(%error, "external generation timed out");
                return failed(error);
            }
            Ok(Err(error)) => {
                warn!(%error, "external generation failed");
                return failed(error);
            }
            Ok(Ok(reply)) => reply,
        };

        match parse_generated_reply(&reply) {
            Some(result) => {
                debug!(step = ?ResolutionStep::ExternalGeneration, kind = ?result.kind,
                       "query resolved from generated reply");
                Resolution::Resolved {
                    result,
                    step: ResolutionStep::ExternalGeneration,
                }
            }
            // Nothing usable anywhere in the payload, not even text lines.
            None => failed(Error::processing(
                "generation service returned an empty reply",
            )),
        }
    }
}

/// Claim over the resolver's in-flight slot; released on drop.
pub(crate) struct InFlightPermit<'a>(&'a AtomicBool);

impl Drop for InFlightPermit<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[allow(clippy::expect_used)]
fn failed(error: Error) -> Resolution {
    let diagnostics = AnalysisResult::text(vec![
        "API request failed. Unable to process query.".to_string(),
        format!("Error details: {error}"),
        "Please try a different query or check your input.".to_string(),
    ])
    .expect("diagnostic insights are non-empty");
    Resolution::Failed { error, diagnostics }
}

/// Fixed prompt template for the generation service, embedding the raw
/// query text.
fn build_prompt(query: &str) -> String {
    format!(
        "Please help me parse the following business query into a structured JSON or clear data format:\n\
         Query: {query}\n\
         \n\
         Requirements:\n\
         - If possible, convert the response into a JSON array of objects\n\
         - Each object should have at least two keys: a name/category key and a numeric value key\n\
         - If JSON is not suitable, provide clear, concise insights\n\
         \n\
         Example formats:\n\
         1. [{{\"category\":\"Product A\", \"value\":100}}, {{\"category\":\"Product B\", \"value\":150}}]\n\
         2. A list of insights about the business query"
    )
}

/// First strategy: the query text itself is a JSON payload.
///
/// Accepts an array of records, or an object carrying a `data` array
/// (optionally with declared `dataType` and `insights`). Parse failures and
/// empty post-normalization series yield `None` so the chain falls through.
fn try_direct_json(trimmed: &str) -> Option<AnalysisResult> {
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    let value: Value = serde_json::from_str(trimmed).ok()?;
    analysis_from_value(&value, "Parsed structured data from query input")
}

/// Build a graph result from a parsed JSON value: either an array of
/// records, or an object with a `data` array plus optional declared
/// `dataType` and `insights`.
fn analysis_from_value(value: &Value, default_insight: &str) -> Option<AnalysisResult> {
    let (records, declared_type, declared_insights) = match value {
        Value::Array(items) => (items, None, None),
        Value::Object(map) => {
            let records = map.get("data")?.as_array()?;
            let declared_type = map.get("dataType").and_then(Value::as_str);
            let declared_insights = map.get("insights").and_then(Value::as_array);
            (records, declared_type, declared_insights)
        }
        _ => return None,
    };

    let Normalized::Points { points, value_key } = normalize_records(records) else {
        return None;
    };

    let data_type = declared_type
        .map(str::to_string)
        .unwrap_or_else(|| {
            if value_key == "value" {
                DEFAULT_DATA_TYPE.to_string()
            } else {
                value_key
            }
        });

    let insights: Vec<String> = declared_insights
        .map(|lines| {
            lines
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|lines: &Vec<String>| !lines.is_empty())
        .unwrap_or_else(|| vec![default_insight.to_string()]);

    AnalysisResult::graph(Series::new(points, data_type), insights).ok()
}

/// Mine a free-text generation reply for structured data.
///
/// Tried in order: a JSON fragment (whole-string array, fenced block, or
/// first balanced `{...}` object), then the `name: number` line pattern,
/// then the reply's non-empty lines as text insights. Returns `None` only
/// for a reply with no usable content at all.
fn parse_generated_reply(reply: &str) -> Option<AnalysisResult> {
    if let Some(fragment) = extract_json_fragment(reply) {
        if let Ok(value) = serde_json::from_str::<Value>(&fragment) {
            if let Some(result) =
                analysis_from_value(&value, "Data parsed successfully from AI response")
            {
                return Some(result);
            }
        }
    }

    if let Some(result) = extract_line_pairs(reply) {
        return Some(result);
    }

    let lines: Vec<String> = reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if lines.is_empty() {
        return None;
    }
    AnalysisResult::text(lines).ok()
}

/// Locate a JSON object/array substring inside free text.
///
/// Markdown code fences are stripped first (models habitually fence their
/// JSON). A whole-string array wins; otherwise the first balanced `{...}`
/// object, string-literal aware.
fn extract_json_fragment(text: &str) -> Option<String> {
    let text = strip_code_fences(text.trim());

    if text.starts_with('[') {
        return Some(text.to_string());
    }

    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..=start + offset].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Strip a surrounding ```/```json fence, if any.
fn strip_code_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Last-ditch structured extraction: one `name: number` pair per line.
fn extract_line_pairs(reply: &str) -> Option<AnalysisResult> {
    let points: Vec<DataPoint> = reply
        .lines()
        .filter_map(|line| {
            let caps = LINE_PAIR_PATTERN.captures(line)?;
            let value = caps.get(2)?.as_str().parse::<f64>().ok()?;
            DataPoint::new(caps.get(1)?.as_str(), value).ok()
        })
        .collect();
    if points.is_empty() {
        return None;
    }
    AnalysisResult::graph(
        Series::new(points, DEFAULT_DATA_TYPE),
        vec!["Data extracted from AI response text".to_string()],
    )
    .ok()
}
