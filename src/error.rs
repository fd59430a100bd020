/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Suggestion generator error: {0}")]
    Generator(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Message suitable for showing to the user next to a form or result slice
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) | AppError::Auth(msg) => msg.clone(),
            _ => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    /// Drops the request URL, which may carry credentials in its query string
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.without_url())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Session(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
