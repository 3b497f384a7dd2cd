// Provider implementations bridging API clients into the search pipeline
pub mod github;

pub use github::GitHubProvider;
