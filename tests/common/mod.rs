#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reelsearch::{
    error::{AppError, AppResult},
    models::{CatalogEntry, CatalogQuery, MediaType, Query, SearchCategory, SearchPage, ViewState},
    services::{
        providers::{CatalogSearchClient, SuggestionGenerator},
        suggestions::build_prompt,
        SearchOrchestrator,
    },
};
use tokio::sync::Notify;

pub const PAGE_SIZE: u64 = 20;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

pub fn catalog_key(category: SearchCategory, query: &str, page: u32) -> String {
    format!("{}:{}:{}", category.path(), query, page)
}

/// Catalog fake with per-request gates and failures.
///
/// Multi pages hold 20 entries, every tenth of them a person. Movie lookups
/// return a single movie titled after the query.
#[derive(Default)]
pub struct FakeCatalog {
    calls: Mutex<Vec<CatalogQuery>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    failures: Mutex<HashSet<String>>,
    total_pages: Mutex<HashMap<String, u32>>,
}

impl FakeCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_total_pages(&self, query: &str, total_pages: u32) {
        lock(&self.total_pages).insert(query.to_string(), total_pages);
    }

    /// Holds the next matching request until the returned handle is notified
    pub fn gate(&self, category: SearchCategory, query: &str, page: u32) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        lock(&self.gates).insert(catalog_key(category, query, page), Arc::clone(&notify));
        notify
    }

    /// Makes the next matching request fail
    pub fn fail_once(&self, category: SearchCategory, query: &str, page: u32) {
        lock(&self.failures).insert(catalog_key(category, query, page));
    }

    pub fn calls(&self) -> Vec<CatalogQuery> {
        lock(&self.calls).clone()
    }

    pub fn calls_for(&self, category: SearchCategory, query: &str, page: u32) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.category == category && c.query.as_str() == query && c.page == page)
            .count()
    }

    fn page_for(&self, request: &CatalogQuery) -> SearchPage {
        match request.category {
            SearchCategory::Multi => {
                let total_pages = lock(&self.total_pages)
                    .get(request.query.as_str())
                    .copied()
                    .unwrap_or(3);
                let start = u64::from(request.page - 1) * PAGE_SIZE;
                SearchPage {
                    entries: (start..start + PAGE_SIZE)
                        .map(|id| {
                            let media_type = if id % 10 == 0 {
                                MediaType::Person
                            } else {
                                MediaType::Movie
                            };
                            entry(id, &format!("{} #{}", request.query, id), media_type)
                        })
                        .collect(),
                    page_number: request.page,
                    total_pages,
                    total_results: u64::from(total_pages) * PAGE_SIZE,
                }
            }
            SearchCategory::Movie => SearchPage {
                entries: vec![entry(
                    title_id(request.query.as_str()),
                    request.query.as_str(),
                    MediaType::Movie,
                )],
                page_number: 1,
                total_pages: 1,
                total_results: 1,
            },
        }
    }
}

#[async_trait::async_trait]
impl CatalogSearchClient for FakeCatalog {
    async fn search(&self, request: &CatalogQuery) -> AppResult<SearchPage> {
        lock(&self.calls).push(request.clone());
        let key = catalog_key(request.category, request.query.as_str(), request.page);

        let gate = lock(&self.gates).remove(&key);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if lock(&self.failures).remove(&key) {
            return Err(AppError::Upstream(format!("scripted failure for {}", key)));
        }
        Ok(self.page_for(request))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Generator fake answering per query
#[derive(Default)]
pub struct FakeGenerator {
    responses: Mutex<HashMap<String, Result<String, String>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl FakeGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, query: &str, text: &str) {
        lock(&self.responses).insert(build_prompt(&Query::from(query)), Ok(text.to_string()));
    }

    pub fn fail(&self, query: &str, message: &str) {
        lock(&self.responses).insert(build_prompt(&Query::from(query)), Err(message.to_string()));
    }

    pub fn gate(&self, query: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        lock(&self.gates).insert(build_prompt(&Query::from(query)), Arc::clone(&notify));
        notify
    }
}

#[async_trait::async_trait]
impl SuggestionGenerator for FakeGenerator {
    async fn generate_suggestions(&self, prompt: &str) -> AppResult<String> {
        let gate = lock(&self.gates).remove(prompt);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match lock(&self.responses).get(prompt).cloned() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(AppError::Generator(message)),
            None => Ok(String::new()),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

pub fn entry(id: u64, title: &str, media_type: MediaType) -> CatalogEntry {
    CatalogEntry {
        id,
        title: title.to_string(),
        media_type,
        overview: None,
        poster_path: None,
        release_date: None,
        vote_average: None,
    }
}

/// Stable id for a resolved suggestion title
pub fn title_id(title: &str) -> u64 {
    10_000 + title.bytes().map(u64::from).sum::<u64>()
}

pub fn orchestrator(catalog: &Arc<FakeCatalog>, generator: &Arc<FakeGenerator>) -> SearchOrchestrator {
    SearchOrchestrator::new(
        Arc::clone(catalog) as Arc<dyn CatalogSearchClient>,
        Arc::clone(generator) as Arc<dyn SuggestionGenerator>,
    )
}

/// Waits (bounded) until the published view satisfies `predicate`
pub async fn wait_for_view(
    orchestrator: &SearchOrchestrator,
    predicate: impl FnMut(&ViewState) -> bool,
) -> ViewState {
    let mut rx = orchestrator.subscribe();
    let view = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for view")
        .expect("view channel closed");
    view.clone()
}
