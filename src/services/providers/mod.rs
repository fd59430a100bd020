//! External collaborators of the search core
//!
//! The catalog, the suggestion generator and the identity provider are remote
//! services reached only through these traits.

use crate::{
    error::AppResult,
    models::{AuthenticatedUser, CatalogQuery, SearchPage},
};

pub mod firebase;
pub mod gemini;
pub mod tmdb;

pub use firebase::FirebaseAuthClient;
pub use gemini::GeminiClient;
pub use tmdb::TmdbClient;

/// Paged search over the remote catalog
///
/// A failed page surfaces to the caller as-is; implementations must not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogSearchClient: Send + Sync {
    /// Fetch one page of results.
    ///
    /// Fails with `Network` on transport errors and `Upstream` on non-2xx or
    /// malformed responses.
    async fn search(&self, request: &CatalogQuery) -> AppResult<SearchPage>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Free-text recommendation service
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SuggestionGenerator: Send + Sync {
    /// Returns the raw generated text for a prompt. A response without text is
    /// an empty string, not an error.
    async fn generate_suggestions(&self, prompt: &str) -> AppResult<String>;

    fn name(&self) -> &'static str;
}

/// Remote account service behind the sign-in form
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<AuthenticatedUser>;

    async fn sign_up(&self, email: &str, password: &str) -> AppResult<AuthenticatedUser>;

    /// Sets the display name of a freshly created account
    async fn update_profile(
        &self,
        user: &AuthenticatedUser,
        display_name: &str,
    ) -> AppResult<AuthenticatedUser>;
}
