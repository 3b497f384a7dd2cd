use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform the user wants an installable release for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    All,
    Android,
    Windows,
    Macos,
    Linux,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::All => write!(f, "All"),
            Platform::Android => write!(f, "Android"),
            Platform::Windows => write!(f, "Windows"),
            Platform::Macos => write!(f, "macOS"),
            Platform::Linux => write!(f, "Linux"),
        }
    }
}

/// A repository returned by search, not yet verified to ship installers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoCandidate {
    pub id: u64,
    pub owner: String,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub stars: u32,
    pub language: Option<String>,
    pub topics: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl RepoCandidate {
    pub fn to_summary(&self) -> RepoSummary {
        RepoSummary {
            id: self.id,
            owner: self.owner.clone(),
            name: self.name.clone(),
            full_name: self.full_name.clone(),
            description: self.description.clone(),
            html_url: self.html_url.clone(),
            stars: self.stars,
            language: self.language.clone(),
            topics: self.topics.clone(),
        }
    }
}

/// A candidate whose latest release was confirmed to ship a matching
/// installer - what actually gets shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub id: u64,
    pub owner: String,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub stars: u32,
    pub language: Option<String>,
    pub topics: Vec<String>,
}

/// One page of unverified candidates from the search provider
#[derive(Debug, Clone)]
pub struct CandidatePage {
    pub items: Vec<RepoCandidate>,
    pub total_count: u64,
}

/// Latest-release info needed to decide whether a repo ships installers.
///
/// Draft/prerelease flags ride along for callers that care; verification
/// itself only looks at asset names.
#[derive(Debug, Clone)]
pub struct LatestRelease {
    pub tag_name: String,
    pub draft: bool,
    pub prerelease: bool,
    pub assets: Vec<String>,
}

/// Snapshot emitted while a search call progresses.
///
/// Each emission supersedes the previous one - consumers replace, they do
/// not merge. Within one call the final emission contains every repo an
/// earlier emission contained.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginatedRepos {
    pub repos: Vec<RepoSummary>,
    pub has_more: bool,
    pub next_page_index: u32,
    pub total_count: u64,
}

/// Cache key for a verification result: one repo checked for one platform
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerifyKey {
    pub full_name: String,
    pub platform: Platform,
}

impl VerifyKey {
    pub fn new(full_name: &str, platform: Platform) -> Self {
        Self {
            full_name: full_name.to_string(),
            platform,
        }
    }
}
