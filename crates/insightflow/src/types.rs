//! Canonical data contract for the resolution pipeline.
//!
//! Every resolution path — direct JSON, the mock table, or the generation
//! service — converges on [`AnalysisResult`]: either a chart-ready
//! [`Series`] with accompanying insights, or text-only insights. The
//! constructors validate the contract so a malformed result can never be
//! handed to the presentation layer.
//!
//! # Invariants
//!
//! - A [`DataPoint`] label is trimmed and non-empty; its value is finite.
//! - `kind == Graph` implies a series with at least one point.
//! - `kind == Text` implies no series and at least one insight line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// A single labeled numeric observation in a chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Display label (trimmed, non-empty)
    pub label: String,
    /// Finite numeric value
    pub value: f64,
}

impl DataPoint {
    /// Create a data point, trimming the label and rejecting empty labels
    /// and non-finite values.
    pub fn new(label: impl Into<String>, value: f64) -> Result<Self> {
        let label = label.into().trim().to_string();
        if label.is_empty() {
            return Err(Error::validation("data point label is empty"));
        }
        if !value.is_finite() {
            return Err(Error::validation(format!(
                "data point '{label}' has non-finite value"
            )));
        }
        Ok(Self { label, value })
    }
}

/// Ordered sequence of data points plus a display-formatting tag.
///
/// `data_type` is a free-form string (e.g. `"revenue"`, `"margin"`,
/// `"count"`) consumed only by the metric formatter — never by computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    /// The chart points, in display order
    pub points: Vec<DataPoint>,
    /// Display-formatting tag for the y-axis
    pub data_type: String,
}

impl Series {
    /// Create a series from points and a data-type tag.
    #[must_use]
    pub fn new(points: Vec<DataPoint>, data_type: impl Into<String>) -> Self {
        Self {
            points,
            data_type: data_type.into(),
        }
    }

    /// Number of points in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Whether a result renders as a chart or as text-only insights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    /// A chart-ready series with optional insights
    Graph,
    /// Text-only findings substituting for a chart
    Text,
}

/// Canonical resolver output.
///
/// Construct via [`AnalysisResult::graph`] or [`AnalysisResult::text`];
/// both enforce the graph/text invariant, so callers never receive a
/// partially-filled result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Chart series, present exactly when `kind == Graph`
    pub series: Option<Series>,
    /// Ordered textual findings
    pub insights: Vec<String>,
    /// Render mode
    pub kind: AnalysisKind,
}

impl AnalysisResult {
    /// Create a graph result. The series must have at least one point.
    pub fn graph(series: Series, insights: Vec<String>) -> Result<Self> {
        if series.is_empty() {
            return Err(Error::validation("graph result requires a non-empty series"));
        }
        Ok(Self {
            series: Some(series),
            insights,
            kind: AnalysisKind::Graph,
        })
    }

    /// Create a text-only result. At least one insight line is required —
    /// the findings substitute for a chart.
    pub fn text(insights: Vec<String>) -> Result<Self> {
        if insights.iter().all(|line| line.trim().is_empty()) {
            return Err(Error::validation(
                "text result requires at least one insight line",
            ));
        }
        Ok(Self {
            series: None,
            insights,
            kind: AnalysisKind::Text,
        })
    }

    /// Check the graph/text invariant on a deserialized result.
    ///
    /// Used when loading persisted history, where entries may predate the
    /// current contract or have been tampered with.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        match self.kind {
            AnalysisKind::Graph => self.series.as_ref().is_some_and(|s| {
                !s.is_empty()
                    && s.points
                        .iter()
                        .all(|p| !p.label.trim().is_empty() && p.value.is_finite())
            }),
            AnalysisKind::Text => self.series.is_none() && !self.insights.is_empty(),
        }
    }
}

/// A submitted query. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// Opaque identifier
    pub id: Uuid,
    /// The raw query text as submitted
    pub text: String,
    /// Submission time
    pub submitted_at: DateTime<Utc>,
}

impl Query {
    /// Create a query stamped with the current time.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// A persisted record pairing a past query with its resolved result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Entry identifier, used for individual deletion
    pub id: Uuid,
    /// The query text that produced this result
    pub query_text: String,
    /// Resolution time
    pub timestamp: DateTime<Utc>,
    /// Snapshot of the resolved (or failed-with-diagnostics) result
    pub result: AnalysisResult,
}

impl HistoryEntry {
    /// Create an entry for a freshly resolved query.
    #[must_use]
    pub fn new(query_text: impl Into<String>, result: AnalysisResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            query_text: query_text.into(),
            timestamp: Utc::now(),
            result,
        }
    }
}
