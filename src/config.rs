use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// TMDB v4 read access token, sent as a bearer token
    pub tmdb_api_token: String,

    /// TMDB v3 API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Language passed to catalog searches
    #[serde(default = "default_tmdb_language")]
    pub tmdb_language: String,

    /// Gemini API key
    pub gemini_api_key: String,

    /// Generative Language API base URL
    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,

    /// Model used for suggestions
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Firebase web API key. Sign-in and registration are disabled without it.
    #[serde(default)]
    pub firebase_api_key: Option<String>,

    /// Identity Toolkit API base URL
    #[serde(default = "default_firebase_api_url")]
    pub firebase_api_url: String,

    /// Where the signed-in user is mirrored locally
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,

    /// Per-request timeout applied by the HTTP collaborators
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_language() -> String {
    "en-US".to_string()
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-pro".to_string()
}

fn default_firebase_api_url() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".reelsearch/session.json")
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Builds the HTTP client shared by one collaborator
    pub fn http_client(&self) -> reqwest::Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}
