use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

pub mod user;
pub mod view;

pub use user::{AuthenticatedUser, Credentials, SessionUser};
pub use view::ViewState;

/// The active search term. Opaque to the core; compared by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query(String);

impl Query {
    pub fn new(query: impl Into<String>) -> Self {
        Self(query.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Query {
    fn from(query: &str) -> Self {
        Self(query.to_string())
    }
}

impl From<String> for Query {
    fn from(query: String) -> Self {
        Self(query)
    }
}

/// Identifies one search: a query plus the id minted when it became active.
///
/// Tasks are tagged with the scope they were started for. Two searches for the
/// same text carry different ids, so a late result from an earlier search for
/// that text is still recognised as stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryScope {
    pub query: Query,
    pub search_id: Uuid,
}

impl QueryScope {
    pub fn new(query: Query) -> Self {
        Self {
            query,
            search_id: Uuid::new_v4(),
        }
    }
}

/// Kind of media a catalog entry describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    #[serde(rename = "tv")]
    Show,
    Person,
    #[serde(other)]
    Unknown,
}

impl MediaType {
    pub fn is_displayable(&self) -> bool {
        !matches!(self, MediaType::Person)
    }
}

/// A single entry from the remote catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: u64,
    pub title: String,
    pub media_type: MediaType,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
}

/// One page of catalog search results plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub entries: Vec<CatalogEntry>,
    pub page_number: u32,
    pub total_pages: u32,
    pub total_results: u64,
}

/// Catalog section to search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchCategory {
    /// Movies only
    Movie,
    /// Movies, shows and people
    Multi,
}

impl SearchCategory {
    pub fn path(&self) -> &'static str {
        match self {
            SearchCategory::Movie => "movie",
            SearchCategory::Multi => "multi",
        }
    }

    /// Media type assumed for results that do not state one
    pub fn default_media_type(&self) -> MediaType {
        match self {
            SearchCategory::Movie => MediaType::Movie,
            SearchCategory::Multi => MediaType::Unknown,
        }
    }
}

/// Parameters of a single catalog request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub query: Query,
    pub page: u32,
    pub category: SearchCategory,
}

impl CatalogQuery {
    pub fn multi(query: Query, page: u32) -> Self {
        Self {
            query,
            page,
            category: SearchCategory::Multi,
        }
    }

    pub fn movie(query: Query, page: u32) -> Self {
        Self {
            query,
            page,
            category: SearchCategory::Movie,
        }
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw search response from `/search/{movie,multi}`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResponse {
    pub page: u32,
    #[serde(default)]
    pub results: Vec<TmdbResult>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

/// Raw search hit. Movies carry `title`/`release_date`, shows and people
/// carry `name`/`first_air_date`.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbResult {
    pub id: u64,
    #[serde(default)]
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl TmdbResult {
    pub fn into_entry(self, category: SearchCategory) -> CatalogEntry {
        CatalogEntry {
            id: self.id,
            title: self.title.or(self.name).unwrap_or_default(),
            media_type: self
                .media_type
                .unwrap_or_else(|| category.default_media_type()),
            overview: self.overview.filter(|o| !o.is_empty()),
            poster_path: self.poster_path.or(self.profile_path),
            release_date: self
                .release_date
                .or(self.first_air_date)
                .filter(|d| !d.is_empty()),
            vote_average: self.vote_average,
        }
    }
}

impl TmdbSearchResponse {
    pub fn into_page(self, category: SearchCategory) -> SearchPage {
        SearchPage {
            entries: self
                .results
                .into_iter()
                .map(|r| r.into_entry(category))
                .collect(),
            page_number: self.page,
            total_pages: self.total_pages,
            total_results: self.total_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_display_and_equality() {
        let a = Query::from("golmaal");
        let b = Query::new("golmaal".to_string());
        assert_eq!(a, b);
        assert_eq!(format!("{}", a), "golmaal");
        assert!(Query::from("   ").is_blank());
    }

    #[test]
    fn test_query_scopes_for_same_text_differ() {
        let first = QueryScope::new(Query::from("don"));
        let second = QueryScope::new(Query::from("don"));
        assert_eq!(first.query, second.query);
        assert_ne!(first, second);
    }

    #[test]
    fn test_media_type_deserialization() {
        let parse = |s: &str| serde_json::from_str::<MediaType>(s).unwrap();
        assert_eq!(parse(r#""movie""#), MediaType::Movie);
        assert_eq!(parse(r#""tv""#), MediaType::Show);
        assert_eq!(parse(r#""person""#), MediaType::Person);
        assert_eq!(parse(r#""collection""#), MediaType::Unknown);
    }

    #[test]
    fn test_multi_search_response_to_page() {
        let json = r#"{
            "page": 1,
            "results": [
                {
                    "id": 19666,
                    "media_type": "movie",
                    "title": "Golmaal: Fun Unlimited",
                    "overview": "Four friends",
                    "poster_path": "/a.jpg",
                    "release_date": "2006-07-14",
                    "vote_average": 6.6
                },
                {
                    "id": 1399,
                    "media_type": "tv",
                    "name": "Golmaal Junior",
                    "first_air_date": "2019-02-11"
                },
                {
                    "id": 35742,
                    "media_type": "person",
                    "name": "Rohit Shetty",
                    "profile_path": "/p.jpg"
                }
            ],
            "total_pages": 3,
            "total_results": 57
        }"#;

        let response: TmdbSearchResponse = serde_json::from_str(json).unwrap();
        let page = response.into_page(SearchCategory::Multi);

        assert_eq!(page.page_number, 1);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_results, 57);
        assert_eq!(page.entries.len(), 3);

        assert_eq!(page.entries[0].title, "Golmaal: Fun Unlimited");
        assert_eq!(page.entries[0].release_date.as_deref(), Some("2006-07-14"));

        assert_eq!(page.entries[1].media_type, MediaType::Show);
        assert_eq!(page.entries[1].title, "Golmaal Junior");
        assert_eq!(page.entries[1].release_date.as_deref(), Some("2019-02-11"));

        assert_eq!(page.entries[2].media_type, MediaType::Person);
        assert_eq!(page.entries[2].poster_path.as_deref(), Some("/p.jpg"));
    }

    #[test]
    fn test_movie_search_defaults_media_type() {
        let json = r#"{
            "page": 1,
            "results": [{ "id": 7, "title": "Sholay", "release_date": "" }],
            "total_pages": 1,
            "total_results": 1
        }"#;

        let response: TmdbSearchResponse = serde_json::from_str(json).unwrap();
        let page = response.into_page(SearchCategory::Movie);

        assert_eq!(page.entries[0].media_type, MediaType::Movie);
        assert_eq!(page.entries[0].release_date, None);
    }

    #[test]
    fn test_empty_search_response() {
        let json = r#"{ "page": 1, "results": [], "total_pages": 0, "total_results": 0 }"#;
        let response: TmdbSearchResponse = serde_json::from_str(json).unwrap();
        let page = response.into_page(SearchCategory::Multi);
        assert!(page.entries.is_empty());
        assert_eq!(page.total_pages, 0);
    }
}
