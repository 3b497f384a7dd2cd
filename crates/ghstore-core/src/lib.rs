// Core store logic lives here - everything between the GitHub API and a UI
pub mod config;
pub mod error;
pub mod home;
pub mod matcher;
pub mod models;
pub mod providers;
pub mod query;
pub mod search;
pub mod verify;

pub use config::Config;
pub use error::Error;
pub use search::{CandidateSource, ProgressiveSearch};
pub use verify::{ReleaseSource, ReleaseVerifier};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
