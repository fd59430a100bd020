pub mod auth;
pub mod orchestrator;
pub mod pagination;
pub mod providers;
pub mod session;
pub mod suggestions;

pub use auth::{AuthForm, AuthMode};
pub use orchestrator::{QueryTasks, SearchOrchestrator, TaskOutcome};
pub use pagination::{PageTicket, PaginatedResultAccumulator};
pub use session::SessionStore;
pub use suggestions::SuggestionResolver;
