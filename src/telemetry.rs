use tracing_subscriber::EnvFilter;

use crate::models::QueryScope;

const DEFAULT_FILTER: &str = "reelsearch=info";

/// Installs the global subscriber.
///
/// Honours `RUST_LOG`. Logs go to stderr so they never interleave with the
/// rendered results on stdout.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Span wrapping every task started for one search
///
/// Carries the search id so log lines of concurrent suggestion and page tasks
/// can be correlated, and lines from an abandoned search told apart from the
/// active one.
pub fn search_span(scope: &QueryScope) -> tracing::Span {
    tracing::info_span!(
        "search",
        query = %scope.query,
        search_id = %scope.search_id,
    )
}
