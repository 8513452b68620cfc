// Core business logic: the view state, the merge rules and the API seam
pub mod config;
pub mod consolidate;
pub mod controller;
pub mod error;
pub mod models;
pub mod pagination;
pub mod service;
pub mod state;

pub use config::Config;
pub use controller::Controller;
pub use error::Error;
pub use models::{Repository, SearchPage, ViewMode};
pub use pagination::Cursor;
pub use service::{HttpRepositoryService, RepositoryService};
pub use state::{update, Effect, ListingPurpose, Msg, Notice, NoticeId, NoticeKind, RequestId, ViewState};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
