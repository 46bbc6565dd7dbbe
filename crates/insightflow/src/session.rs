//! Session orchestration: the inbound surface for the presentation layer.
//!
//! [`AnalyticsSession`] wires the resolver, the state container, and the
//! persisted history into the `submit(text)` entry point. The presentation
//! layer calls `submit`, `remove_history`, and `clear_history`, and reads
//! state through [`AnalyticsSession::state`] / [`AnalyticsSession::subscribe`]
//! — nothing else crosses the boundary.
//!
//! Every resolution, successful or failed, is recorded in history with its
//! result snapshot, and every history mutation rewrites the whole persisted
//! list (atomic replace-on-write). Dropping the session drops any in-flight
//! generation request at its single suspension point.

use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::generation::TextGenerator;
use crate::history::{HistoryStore, QueryHistory};
use crate::mock;
use crate::resolver::{QueryResolver, Resolution};
use crate::state::{Action, DashboardState, StateContainer};
use crate::types::{AnalysisResult, HistoryEntry, Query};

/// One user session over the query-resolution pipeline.
pub struct AnalyticsSession<G, S> {
    container: StateContainer,
    history: Mutex<QueryHistory>,
    store: S,
    resolver: QueryResolver<G>,
}

impl<G: TextGenerator, S: HistoryStore> AnalyticsSession<G, S> {
    /// Create a session over a generation backend and a history store.
    pub fn new(generator: G, store: S) -> Self {
        Self {
            container: StateContainer::new(),
            history: Mutex::new(QueryHistory::new()),
            store,
            resolver: QueryResolver::new(generator),
        }
    }

    /// Replace the resolver (e.g. to adjust its timeout).
    #[must_use]
    pub fn with_resolver(mut self, resolver: QueryResolver<G>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Load persisted history into the session. Called once at startup;
    /// malformed persisted data yields empty history, never an error.
    pub async fn load_history(&self) {
        let persisted = self.store.load().await;
        let entries = {
            let mut history = self.history.lock();
            history.load(persisted);
            history.entries().to_vec()
        };
        self.container.dispatch(Action::ReplaceHistory(entries));
    }

    /// Submit a query for resolution.
    ///
    /// Rejected without a state transition when the text is empty or a
    /// resolution is already in flight. Otherwise drives the full cycle:
    /// set query → begin → resolve → commit → record history → persist.
    ///
    /// # Errors
    ///
    /// `Validation` for rejected submissions; the resolution's error for a
    /// failed resolution (diagnostic insights are installed in the state's
    /// result slot); `Persistence` if the snapshot of a *successful*
    /// resolution cannot be written.
    pub async fn submit(&self, text: &str) -> Result<AnalysisResult> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("query text is empty"));
        }
        // Claim the resolver slot before any dispatch, so a losing
        // submission never overwrites the in-flight resolution's query.
        let permit = self.resolver.try_acquire()?;

        let query = Query::new(trimmed);
        debug!(query_id = %query.id, "query submitted");
        self.container.dispatch(Action::SetQuery(query.text.clone()));
        self.container.dispatch(Action::BeginResolve);

        match self.resolver.resolve_acquired(&query.text, &permit).await {
            Resolution::Resolved { result, .. } => {
                self.container.dispatch(Action::CommitResult(result.clone()));
                self.record(&query.text, result.clone()).await?;
                Ok(result)
            }
            Resolution::Failed { error, diagnostics } => {
                self.container.dispatch(Action::CommitError {
                    error: error.clone(),
                    diagnostics: diagnostics.clone(),
                });
                // The resolution error is what the caller must see; a failed
                // history write is logged, not substituted for it.
                if let Err(persist_error) = self.record(&query.text, diagnostics).await {
                    warn!(%persist_error, "history snapshot not persisted after failed resolution");
                }
                Err(error)
            }
        }
    }

    /// Delete one history entry by id; no-op when absent.
    pub async fn remove_history(&self, id: Uuid) -> Result<()> {
        let entries = {
            let mut history = self.history.lock();
            history.remove(id);
            history.entries().to_vec()
        };
        self.persist_and_mirror(entries).await
    }

    /// Delete all history entries.
    pub async fn clear_history(&self) -> Result<()> {
        let entries = {
            let mut history = self.history.lock();
            history.clear();
            history.entries().to_vec()
        };
        self.persist_and_mirror(entries).await
    }

    /// Suggested questions matching a filter, for input autocompletion.
    #[must_use]
    pub fn suggestions(&self, filter: &str) -> Vec<&'static str> {
        mock::suggestions(filter)
    }

    /// Snapshot of the current session state.
    #[must_use]
    pub fn state(&self) -> DashboardState {
        self.container.snapshot()
    }

    /// Register an observer over state transitions.
    pub fn subscribe(&self, subscriber: impl Fn(&DashboardState) + Send + Sync + 'static) {
        self.container.subscribe(subscriber);
    }

    /// Append a resolution snapshot to history and persist the list.
    async fn record(&self, query_text: &str, result: AnalysisResult) -> Result<()> {
        let entries = {
            let mut history = self.history.lock();
            history.append(HistoryEntry::new(query_text, result));
            history.entries().to_vec()
        };
        self.persist_and_mirror(entries).await
    }

    async fn persist_and_mirror(&self, entries: Vec<HistoryEntry>) -> Result<()> {
        self.store.persist(&entries).await?;
        self.container.dispatch(Action::ReplaceHistory(entries));
        Ok(())
    }
}
