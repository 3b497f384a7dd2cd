use thiserror::Error;

/// All the ways a store operation can go wrong
///
/// Per-candidate verification failures never show up here - the verifier
/// absorbs those and just drops the candidate. What surfaces is a failed
/// search-page fetch, a bad config, or the caller walking away.
#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Search cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
