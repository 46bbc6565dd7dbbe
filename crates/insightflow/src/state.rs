//! Session state: an explicit single-writer reducer with observers.
//!
//! All mutations flow through named [`Action`]s applied by
//! [`StateContainer::dispatch`] — there is no module-level singleton and no
//! direct external mutation. The presentation layer reads snapshots and
//! registers subscribers; it never writes.
//!
//! The container holds only a *reference copy* of the current result; the
//! authoritative history list lives in the
//! [`QueryHistory`](crate::history::QueryHistory) and is mirrored here via
//! [`Action::ReplaceHistory`].

use parking_lot::{Mutex, RwLock};

use crate::error::Error;
use crate::types::{AnalysisResult, HistoryEntry};

/// Observable session state consumed by the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    /// The query text currently in the input slot
    pub current_query: String,
    /// Whether a resolution is in flight
    pub is_loading: bool,
    /// Last resolution error, if any
    pub error: Option<Error>,
    /// Last resolved result — on failure, the diagnostic text result
    pub result: Option<AnalysisResult>,
    /// Mirror of the history list, newest first
    pub history: Vec<HistoryEntry>,
}

/// Named state transitions.
#[derive(Debug, Clone)]
pub enum Action {
    /// Update the query text; clears any prior error
    SetQuery(String),
    /// Mark a resolution as started; clears any prior error
    BeginResolve,
    /// Record a successful resolution
    CommitResult(AnalysisResult),
    /// Record a failed resolution. `diagnostics` is a text-kind result whose
    /// insight lines explain the failure; it replaces the (stale) current
    /// result so the UI is never left with an error and no content.
    CommitError {
        /// The failure itself
        error: Error,
        /// User-facing explanation, shown in the result slot
        diagnostics: AnalysisResult,
    },
    /// Mirror the authoritative history list
    ReplaceHistory(Vec<HistoryEntry>),
}

/// Apply an action to the state. Pure with respect to everything but the
/// state itself — history persistence is the session's job, not the
/// reducer's.
pub fn reduce(state: &mut DashboardState, action: Action) {
    match action {
        Action::SetQuery(text) => {
            state.current_query = text;
            state.error = None;
        }
        Action::BeginResolve => {
            state.is_loading = true;
            state.error = None;
        }
        Action::CommitResult(result) => {
            state.is_loading = false;
            state.error = None;
            state.result = Some(result);
        }
        Action::CommitError { error, diagnostics } => {
            state.is_loading = false;
            state.error = Some(error);
            state.result = Some(diagnostics);
        }
        Action::ReplaceHistory(history) => {
            state.history = history;
        }
    }
}

type Subscriber = Box<dyn Fn(&DashboardState) + Send + Sync>;

/// Holds the session state and notifies subscribers after every transition.
#[derive(Default)]
pub struct StateContainer {
    state: RwLock<DashboardState>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl StateContainer {
    /// Create a container with default (idle, empty) state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an action and notify all subscribers with the new state.
    pub fn dispatch(&self, action: Action) {
        let snapshot = {
            let mut state = self.state.write();
            reduce(&mut state, action);
            state.clone()
        };
        for subscriber in self.subscribers.lock().iter() {
            subscriber(&snapshot);
        }
    }

    /// Clone of the current state.
    #[must_use]
    pub fn snapshot(&self) -> DashboardState {
        self.state.read().clone()
    }

    /// Register an observer called after every dispatched transition.
    pub fn subscribe(&self, subscriber: impl Fn(&DashboardState) + Send + Sync + 'static) {
        self.subscribers.lock().push(Box::new(subscriber));
    }
}

impl std::fmt::Debug for StateContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateContainer")
            .field("state", &self.state.read())
            .field("subscribers", &self.subscribers.lock().len())
            .finish()
    }
}
