use crate::{
    error::AppResult,
    models::{CatalogEntry, CatalogQuery, Query},
    services::providers::{CatalogSearchClient, SuggestionGenerator},
};
use std::sync::Arc;

const PROMPT_PREFIX: &str =
    "Act as a Movie Recommendation system and suggest some movies for the query : ";
const PROMPT_SUFFIX: &str = ". only give me names of 5 movies, comma separated like the example result given ahead. Example Result: Gadar, Sholay, Don, Golmaal, Koi Mil Gaya";

/// Separator between titles in generated text
pub const CANDIDATE_SEPARATOR: &str = ", ";

/// Builds the recommendation prompt for a query
pub fn build_prompt(query: &Query) -> String {
    format!("{}{}{}", PROMPT_PREFIX, query, PROMPT_SUFFIX)
}

/// Splits generated text into candidate titles, preserving order.
///
/// Blank text gives no candidates.
pub fn parse_candidates(text: &str) -> Vec<String> {
    text.trim()
        .split(CANDIDATE_SEPARATOR)
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turns AI recommendations into catalog entries
///
/// One generator call per query, then one movie lookup per candidate title,
/// all lookups running concurrently. The first hit of each lookup is taken
/// as the resolution.
#[derive(Clone)]
pub struct SuggestionResolver {
    generator: Arc<dyn SuggestionGenerator>,
    catalog: Arc<dyn CatalogSearchClient>,
}

impl SuggestionResolver {
    pub fn new(generator: Arc<dyn SuggestionGenerator>, catalog: Arc<dyn CatalogSearchClient>) -> Self {
        Self { generator, catalog }
    }

    /// Resolves suggestions for `query`.
    ///
    /// The result has one slot per candidate in generator order; `None` marks
    /// a candidate whose lookup failed or found nothing. Only a generator
    /// failure fails the whole call.
    pub async fn resolve(&self, query: &Query) -> AppResult<Vec<Option<CatalogEntry>>> {
        let prompt = build_prompt(query);
        let text = self.generator.generate_suggestions(&prompt).await?;
        let candidates = parse_candidates(&text);

        tracing::info!(
            query = %query,
            candidates = candidates.len(),
            generator = self.generator.name(),
            "Suggestions generated"
        );

        let mut tasks = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let catalog = Arc::clone(&self.catalog);
            let task = tokio::spawn(async move { resolve_candidate(catalog, candidate).await });
            tasks.push(task);
        }

        // Awaited in launch order so slots follow the generator's ordering.
        let mut resolved = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(entry) => resolved.push(entry),
                Err(e) => {
                    tracing::error!(error = %e, "Suggestion lookup task failed");
                    resolved.push(None);
                }
            }
        }

        let unresolved = resolved.iter().filter(|entry| entry.is_none()).count();
        if unresolved > 0 {
            tracing::warn!(
                query = %query,
                resolved = resolved.len() - unresolved,
                unresolved,
                "Partial suggestion resolution"
            );
        }

        Ok(resolved)
    }
}

async fn resolve_candidate(
    catalog: Arc<dyn CatalogSearchClient>,
    candidate: String,
) -> Option<CatalogEntry> {
    let request = CatalogQuery::movie(Query::from(candidate.as_str()), 1);

    match catalog.search(&request).await {
        Ok(page) => {
            let entry = page.entries.into_iter().next();
            if entry.is_none() {
                tracing::debug!(candidate = %candidate, "No catalog match for suggestion");
            }
            entry
        }
        Err(e) => {
            tracing::warn!(candidate = %candidate, error = %e, "Suggestion lookup failed");
            None
        }
    }
}
