// GitHub REST client used by the store core
pub mod github;
pub mod retry;

// Re-export common types
pub use github::{
    GitHubClient, GitHubError, GitHubOwner, GitHubRepo, Release, ReleaseAsset, SearchResponse,
};
pub use retry::RetryConfig;
