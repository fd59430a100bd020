use crate::{
    error::AppResult,
    models::{view::ResultAccumulatorState, CatalogQuery, Query, SearchCategory, SearchPage},
    services::providers::CatalogSearchClient,
};

/// Permission to fetch one catalog page, handed out by the accumulator.
///
/// The accumulator does no I/O itself: the holder loads the ticket against a
/// client and hands the outcome back with [`PaginatedResultAccumulator::settle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
    pub query: Query,
    pub page: u32,
    pub category: SearchCategory,
}

impl PageTicket {
    pub fn request(&self) -> CatalogQuery {
        CatalogQuery {
            query: self.query.clone(),
            page: self.page,
            category: self.category,
        }
    }

    pub async fn load(&self, client: &dyn CatalogSearchClient) -> AppResult<SearchPage> {
        client.search(&self.request()).await
    }
}

/// Infinite-scroll bookkeeping for a single query
///
/// Owns the merged entries and the page cursor. At most one page fetch is
/// outstanding at a time; requests made while one is in flight are dropped.
#[derive(Debug, Clone)]
pub struct PaginatedResultAccumulator {
    state: ResultAccumulatorState,
    category: SearchCategory,
    in_flight: Option<u32>,
}

impl PaginatedResultAccumulator {
    pub fn new(query: Query) -> Self {
        Self {
            state: ResultAccumulatorState::fresh(query),
            category: SearchCategory::Multi,
            in_flight: None,
        }
    }

    /// Fresh accumulator with the page 1 fetch already granted
    pub fn start(query: Query) -> (Self, PageTicket) {
        let ticket = PageTicket {
            query: query.clone(),
            page: 1,
            category: SearchCategory::Multi,
        };
        let accumulator = Self {
            state: ResultAccumulatorState::fresh(query),
            category: SearchCategory::Multi,
            in_flight: Some(1),
        };
        (accumulator, ticket)
    }

    pub fn state(&self) -> &ResultAccumulatorState {
        &self.state
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Requests page 1. Refused once page 1 has loaded or while a fetch is outstanding.
    pub fn fetch_initial(&mut self) -> Option<PageTicket> {
        if self.state.next_page != 1 {
            return None;
        }
        self.begin(1)
    }

    /// Requests the next page while more pages exist and nothing is in flight.
    pub fn fetch_next(&mut self) -> Option<PageTicket> {
        if !self.state.has_more {
            return None;
        }
        self.begin(self.state.next_page)
    }

    fn begin(&mut self, page: u32) -> Option<PageTicket> {
        if self.in_flight.is_some() {
            tracing::trace!(query = %self.state.query, page, "Page fetch already in flight");
            return None;
        }
        self.in_flight = Some(page);
        Some(PageTicket {
            query: self.state.query.clone(),
            page,
            category: self.category,
        })
    }

    /// Applies the outcome of a ticket obtained from this accumulator.
    ///
    /// On failure nothing but the in-flight guard changes and the error is
    /// handed back, so the same page is requested again on the next call.
    /// Tickets that do not match the outstanding fetch are ignored.
    pub fn settle(&mut self, ticket: &PageTicket, outcome: AppResult<SearchPage>) -> AppResult<()> {
        if ticket.query != self.state.query || self.in_flight != Some(ticket.page) {
            tracing::debug!(
                query = %ticket.query,
                page = ticket.page,
                "Ignoring page outcome for a fetch this accumulator did not start"
            );
            return Ok(());
        }
        self.in_flight = None;

        let page = outcome?;
        let next_page = ticket.page + 1;

        if ticket.page == 1 {
            self.state.merged_entries = page.entries;
        } else {
            self.state.merged_entries.extend(page.entries);
        }
        self.state.next_page = next_page;
        self.state.total_results = page.total_results;
        self.state.has_more = self.state.has_more && next_page <= page.total_pages;

        tracing::debug!(
            query = %self.state.query,
            page = ticket.page,
            merged = self.state.merged_entries.len(),
            total_pages = page.total_pages,
            has_more = self.state.has_more,
            "Catalog page merged"
        );

        Ok(())
    }

    /// Loads page 1 through `client` and settles it in one step
    pub async fn load_initial(&mut self, client: &dyn CatalogSearchClient) -> AppResult<bool> {
        match self.fetch_initial() {
            Some(ticket) => {
                let outcome = ticket.load(client).await;
                self.settle(&ticket, outcome).map(|_| true)
            }
            None => Ok(false),
        }
    }

    /// Loads the next page through `client` and settles it in one step
    pub async fn load_next(&mut self, client: &dyn CatalogSearchClient) -> AppResult<bool> {
        match self.fetch_next() {
            Some(ticket) => {
                let outcome = ticket.load(client).await;
                self.settle(&ticket, outcome).map(|_| true)
            }
            None => Ok(false),
        }
    }
}
