use std::sync::Arc;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::{
    models::{CatalogEntry, Query, QueryScope, ViewState},
    services::{
        pagination::{PageTicket, PaginatedResultAccumulator},
        providers::{CatalogSearchClient, SuggestionGenerator},
        suggestions::SuggestionResolver,
    },
    telemetry::search_span,
};

/// How a search task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The result was merged into the view
    Applied,
    /// The task failed; its loading flag was cleared and the slice left as it was
    Failed,
    /// The search changed while the task was running; nothing was touched
    StaleResultDiscarded,
}

#[derive(Debug, Clone, Copy)]
enum PageKind {
    Initial,
    Next,
}

/// Handles of the two tasks started by a query change
pub struct QueryTasks {
    pub scope: QueryScope,
    pub suggestions: JoinHandle<TaskOutcome>,
    pub initial_page: JoinHandle<TaskOutcome>,
}

impl QueryTasks {
    /// Waits for both tasks. A panicked task counts as failed.
    pub async fn join(self) -> (TaskOutcome, TaskOutcome) {
        let suggestions = self.suggestions.await.unwrap_or(TaskOutcome::Failed);
        let initial_page = self.initial_page.await.unwrap_or(TaskOutcome::Failed);
        (suggestions, initial_page)
    }
}

/// Query-scoped state behind the orchestrator's lock
struct OrchestratorInner {
    scope: Option<QueryScope>,
    accumulator: PaginatedResultAccumulator,
    suggestions: Vec<Option<CatalogEntry>>,
    is_loading_suggestions: bool,
    is_loading_initial_page: bool,
    is_loading_next_page: bool,
}

impl OrchestratorInner {
    fn new() -> Self {
        Self {
            scope: None,
            accumulator: PaginatedResultAccumulator::new(Query::default()),
            suggestions: Vec::new(),
            is_loading_suggestions: false,
            is_loading_initial_page: false,
            is_loading_next_page: false,
        }
    }

    fn is_current(&self, scope: &QueryScope) -> bool {
        self.scope.as_ref() == Some(scope)
    }

    fn snapshot(&self) -> ViewState {
        ViewState {
            query: self.scope.as_ref().map(|s| s.query.clone()),
            suggestions: self.suggestions.clone(),
            catalog_results: self.accumulator.state().clone(),
            is_loading_suggestions: self.is_loading_suggestions,
            is_loading_initial_page: self.is_loading_initial_page,
            is_loading_next_page: self.is_loading_next_page,
        }
    }
}

/// Coordinates the suggestion and catalog pipelines for the active query
///
/// A query change resets the view and starts both pipelines concurrently.
/// Every task is tagged with the [`QueryScope`] it was started for and only
/// touches state if that scope is still the active one when it completes.
/// The lock is never held across network I/O.
///
/// The current [`ViewState`] is published on a watch channel after every
/// change; subscribers only ever read it.
#[derive(Clone)]
pub struct SearchOrchestrator {
    inner: Arc<RwLock<OrchestratorInner>>,
    catalog: Arc<dyn CatalogSearchClient>,
    resolver: SuggestionResolver,
    view_tx: Arc<watch::Sender<ViewState>>,
}

impl SearchOrchestrator {
    pub fn new(
        catalog: Arc<dyn CatalogSearchClient>,
        generator: Arc<dyn SuggestionGenerator>,
    ) -> Self {
        let resolver = SuggestionResolver::new(generator, Arc::clone(&catalog));
        let (view_tx, _) = watch::channel(ViewState::default());

        Self {
            inner: Arc::new(RwLock::new(OrchestratorInner::new())),
            catalog,
            resolver,
            view_tx: Arc::new(view_tx),
        }
    }

    /// Snapshot of the current view
    pub fn view(&self) -> ViewState {
        self.view_tx.borrow().clone()
    }

    /// Receiver notified on every view change
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view_tx.subscribe()
    }

    /// Makes `query` the active search.
    ///
    /// The view is reset before any request goes out. Returns `None` when the
    /// query is already active.
    pub async fn set_query(&self, query: impl Into<Query>) -> Option<QueryTasks> {
        let query = query.into();

        let (scope, ticket) = {
            let mut inner = self.inner.write().await;
            if inner.scope.as_ref().map(|s| &s.query) == Some(&query) {
                tracing::debug!(query = %query, "Query unchanged, keeping current results");
                return None;
            }

            let scope = QueryScope::new(query.clone());
            let (accumulator, ticket) = PaginatedResultAccumulator::start(query);

            inner.scope = Some(scope.clone());
            inner.accumulator = accumulator;
            inner.suggestions = Vec::new();
            inner.is_loading_suggestions = true;
            inner.is_loading_initial_page = true;
            inner.is_loading_next_page = false;
            self.publish(&inner);

            (scope, ticket)
        };

        let span = search_span(&scope);
        span.in_scope(|| tracing::info!("Search started"));

        let suggestions = tokio::spawn(
            self.clone()
                .run_suggestions(scope.clone())
                .instrument(span.clone()),
        );
        let initial_page = tokio::spawn(
            self.clone()
                .run_page_fetch(scope.clone(), ticket, PageKind::Initial)
                .instrument(span),
        );

        Some(QueryTasks {
            scope,
            suggestions,
            initial_page,
        })
    }

    /// Scroll event: fetches the next catalog page if one is allowed.
    ///
    /// Returns `None` without touching the network when there is no active
    /// query, no further page, or a page fetch is already in flight.
    pub async fn load_more(&self) -> Option<JoinHandle<TaskOutcome>> {
        let (scope, ticket) = {
            let mut inner = self.inner.write().await;
            let scope = inner.scope.clone()?;
            let ticket = inner.accumulator.fetch_next()?;
            inner.is_loading_next_page = true;
            self.publish(&inner);
            (scope, ticket)
        };

        let span = search_span(&scope);
        Some(tokio::spawn(
            self.clone()
                .run_page_fetch(scope, ticket, PageKind::Next)
                .instrument(span),
        ))
    }

    async fn run_suggestions(self, scope: QueryScope) -> TaskOutcome {
        let result = self.resolver.resolve(&scope.query).await;

        let mut inner = self.inner.write().await;
        if !inner.is_current(&scope) {
            tracing::debug!("Stale suggestions discarded");
            return TaskOutcome::StaleResultDiscarded;
        }

        inner.is_loading_suggestions = false;
        let outcome = match result {
            Ok(suggestions) => {
                tracing::info!(suggestions = suggestions.len(), "Suggestions ready");
                inner.suggestions = suggestions;
                TaskOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "Suggestion pipeline failed");
                TaskOutcome::Failed
            }
        };
        self.publish(&inner);

        outcome
    }

    async fn run_page_fetch(self, scope: QueryScope, ticket: PageTicket, kind: PageKind) -> TaskOutcome {
        let result = ticket.load(self.catalog.as_ref()).await;

        let mut inner = self.inner.write().await;
        if !inner.is_current(&scope) {
            tracing::debug!(page = ticket.page, "Stale catalog page discarded");
            return TaskOutcome::StaleResultDiscarded;
        }

        match kind {
            PageKind::Initial => inner.is_loading_initial_page = false,
            PageKind::Next => inner.is_loading_next_page = false,
        }
        let outcome = match inner.accumulator.settle(&ticket, result) {
            Ok(()) => {
                tracing::info!(
                    page = ticket.page,
                    merged = inner.accumulator.state().merged_entries.len(),
                    has_more = inner.accumulator.state().has_more,
                    provider = self.catalog.name(),
                    "Catalog page ready"
                );
                TaskOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(page = ticket.page, error = %e, "Catalog page fetch failed");
                TaskOutcome::Failed
            }
        };
        self.publish(&inner);

        outcome
    }

    fn publish(&self, inner: &OrchestratorInner) {
        self.view_tx.send_replace(inner.snapshot());
    }
}
