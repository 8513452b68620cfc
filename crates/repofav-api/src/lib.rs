// HTTP client for the repositories backend
pub mod client;
pub mod error;
pub mod types;

// Re-export common types
pub use client::{RepositoryClient, DEFAULT_BASE_URL};
pub use error::{ApiError, Result};
pub use types::{ApiRepository, SearchResult, ToggleFavoriteRequest};
