/// The Movie Database (TMDB) catalog provider
///
/// Uses the v3 search endpoints with a v4 read access token:
/// - `/search/multi` for the main paginated results (movies, shows, people)
/// - `/search/movie` for resolving AI suggestions to a single film
use crate::{
    error::{AppError, AppResult},
    models::{CatalogQuery, SearchPage, TmdbSearchResponse},
    services::providers::CatalogSearchClient,
};
use reqwest::Client as HttpClient;

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_token: String,
    api_url: String,
    language: String,
}

impl TmdbClient {
    pub fn new(http_client: HttpClient, api_token: String, api_url: String, language: String) -> Self {
        Self {
            http_client,
            api_token,
            api_url,
            language,
        }
    }

    fn search_url(&self, request: &CatalogQuery) -> String {
        format!(
            "{}/search/{}",
            self.api_url.trim_end_matches('/'),
            request.category.path()
        )
    }

    fn validate(request: &CatalogQuery) -> AppResult<()> {
        if request.query.is_blank() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }
        if request.page == 0 {
            return Err(AppError::InvalidInput(
                "Page numbers start at 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl CatalogSearchClient for TmdbClient {
    async fn search(&self, request: &CatalogQuery) -> AppResult<SearchPage> {
        Self::validate(request)?;

        let page = request.page.to_string();
        let response = self
            .http_client
            .get(self.search_url(request))
            .bearer_auth(&self.api_token)
            .query(&[
                ("query", request.query.as_str()),
                ("include_adult", "false"),
                ("language", self.language.as_str()),
                ("page", page.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "TMDB returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        let search_response: TmdbSearchResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                tracing::error!(
                    error = %e,
                    response = %response_text,
                    "Failed to deserialize TMDB response"
                );
                AppError::Upstream(format!("Failed to parse TMDB response: {}", e))
            })?;

        let page = search_response.into_page(request.category);

        tracing::debug!(
            query = %request.query,
            category = request.category.path(),
            page = page.page_number,
            total_pages = page.total_pages,
            results = page.entries.len(),
            provider = "tmdb",
            "Catalog page fetched"
        );

        Ok(page)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
