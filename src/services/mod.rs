// Service exports
pub mod assistant;
pub mod auth;
pub mod catalog;
pub mod postgres;

pub use assistant::{AssistantClient, AssistantError, ServiceSuggestions};
pub use auth::{AuthError, Claims, TokenVerifier};
pub use catalog::ServiceCatalog;
pub use postgres::{PostgresClient, PostgresError};
