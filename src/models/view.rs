use serde::Serialize;

use super::{CatalogEntry, Query};

/// Paginated catalog results for one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultAccumulatorState {
    pub query: Query,
    /// Entries in page arrival order. Not de-duplicated.
    pub merged_entries: Vec<CatalogEntry>,
    pub next_page: u32,
    pub has_more: bool,
    /// As reported by the most recent successful page
    pub total_results: u64,
}

impl ResultAccumulatorState {
    pub fn fresh(query: Query) -> Self {
        Self {
            query,
            merged_entries: Vec::new(),
            next_page: 1,
            has_more: true,
            total_results: 0,
        }
    }
}

/// Everything the presentation layer sees
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    /// `None` until the first query is set
    pub query: Option<Query>,
    /// Suggestions in recommender order; `None` marks an unresolved candidate
    pub suggestions: Vec<Option<CatalogEntry>>,
    pub catalog_results: ResultAccumulatorState,
    pub is_loading_suggestions: bool,
    pub is_loading_initial_page: bool,
    pub is_loading_next_page: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            query: None,
            suggestions: Vec::new(),
            catalog_results: ResultAccumulatorState::fresh(Query::default()),
            is_loading_suggestions: false,
            is_loading_initial_page: false,
            is_loading_next_page: false,
        }
    }
}

impl ViewState {
    /// Catalog entries to render. People count toward upstream totals but are never shown.
    pub fn visible_results(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.catalog_results
            .merged_entries
            .iter()
            .filter(|entry| entry.media_type.is_displayable())
    }

    pub fn visible_suggestions(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.suggestions.iter().flatten()
    }

    /// True while either first response is outstanding
    pub fn is_loading(&self) -> bool {
        self.is_loading_suggestions || self.is_loading_initial_page
    }

    pub fn has_no_results(&self) -> bool {
        !self.is_loading()
            && self.catalog_results.merged_entries.is_empty()
            && self.suggestions.is_empty()
    }

    pub fn suggestions_heading(&self) -> String {
        format!("AI recommendations for '{}'", self.display_query())
    }

    pub fn results_heading(&self) -> String {
        let noun = if self.catalog_results.total_results > 1 {
            "results"
        } else {
            "result"
        };
        format!("Search {} of '{}'", noun, self.display_query())
    }

    fn display_query(&self) -> &str {
        self.query.as_ref().map(Query::as_str).unwrap_or_default()
    }
}
