use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retry::{is_retryable_status, with_retry, RetryConfig};

const GITHUB_API_BASE: &str = "https://api.github.com";
const ACCEPT_JSON: &str = "application/vnd.github.v3+json";
const ACCEPT_RAW: &str = "application/vnd.github.raw+json";

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    AuthRequired,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl GitHubError {
    /// Errors worth a backoff retry: transport failures, rate limiting, and
    /// server-side trouble. Bad credentials, missing resources, and parse
    /// failures will not get better on a second attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GitHubError::NetworkError(_)
                | GitHubError::RateLimitExceeded
                | GitHubError::ServerError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GitHubError>;

pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
    retry_config: RetryConfig,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Self {
        Self::with_base_url(token, GITHUB_API_BASE.to_string())
    }

    /// For GitHub Enterprise instances
    pub fn with_base_url(token: Option<String>, base_url: String) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("ghstore/0.1.0"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            token,
            base_url,
            retry_config: RetryConfig::default(),
        }
    }

    /// Create client with custom retry configuration
    pub fn with_retry_config(token: Option<String>, retry_config: RetryConfig) -> Self {
        let mut client = Self::new(token);
        client.retry_config = retry_config;
        client
    }

    fn get(&self, url: &str, accept: &'static str) -> reqwest::RequestBuilder {
        let mut request = self.client.get(url).header("Accept", accept);
        if let Some(ref token) = self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        request
    }

    /// One page of the repository search API.
    ///
    /// `total_count` in the response covers the whole result set, not the
    /// page, which is what pagination decisions are made from.
    pub async fn search_repositories(
        &self,
        query: &str,
        per_page: u32,
        page: u32,
    ) -> Result<SearchResponse> {
        let url = format!("{}/search/repositories", self.base_url);

        with_retry(&self.retry_config, GitHubError::is_retryable, || async {
            let response = self
                .get(&url, ACCEPT_JSON)
                .query(&[
                    ("q", query),
                    ("per_page", &per_page.to_string()),
                    ("page", &page.to_string()),
                ])
                .send()
                .await?;

            check_status(response.status(), query)?;

            let parsed: SearchResponse = response.json().await?;
            Ok(parsed)
        })
        .await
    }

    /// Latest (non-draft, non-prerelease per GitHub's definition) release for
    /// a repository, or `None` when the repo has never published one.
    ///
    /// Single attempt, no backoff: callers wrap this in a short timeout, so a
    /// second attempt would never get to run anyway.
    pub async fn latest_release(&self, owner: &str, repo: &str) -> Result<Option<Release>> {
        let url = format!("{}/repos/{}/{}/releases/latest", self.base_url, owner, repo);

        let response = self.get(&url, ACCEPT_JSON).send().await?;

        if response.status() == 404 {
            return Ok(None);
        }
        check_status(response.status(), &format!("{}/{}", owner, repo))?;

        let release: Release = response.json().await?;
        Ok(Some(release))
    }

    /// Single repository by owner/name.
    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<GitHubRepo> {
        let url = format!("{}/repos/{}/{}", self.base_url, owner, repo);

        with_retry(&self.retry_config, GitHubError::is_retryable, || async {
            let response = self.get(&url, ACCEPT_JSON).send().await?;
            check_status(response.status(), &format!("{}/{}", owner, repo))?;

            let parsed: GitHubRepo = response.json().await?;
            Ok(parsed)
        })
        .await
    }

    /// Raw README content for a repository.
    pub async fn get_readme(&self, owner: &str, repo: &str) -> Result<String> {
        let url = format!("{}/repos/{}/{}/readme", self.base_url, owner, repo);

        with_retry(&self.retry_config, GitHubError::is_retryable, || async {
            let response = self.get(&url, ACCEPT_RAW).send().await?;
            check_status(response.status(), &format!("{}/{} README", owner, repo))?;

            let content = response.text().await?;
            Ok(content)
        })
        .await
    }
}

fn check_status(status: reqwest::StatusCode, context: &str) -> Result<()> {
    if status == 404 {
        return Err(GitHubError::NotFound(context.to_string()));
    }
    if status == 401 {
        return Err(GitHubError::AuthRequired);
    }
    // GitHub reports search rate limiting as 403 as well as 429.
    if status == 403 || status == 429 {
        return Err(GitHubError::RateLimitExceeded);
    }
    if !status.is_success() {
        if is_retryable_status(status) {
            return Err(GitHubError::ServerError(format!("Status {}", status)));
        }
        return Err(GitHubError::RequestFailed(format!("Status {}", status)));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<GitHubRepo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub owner: GitHubOwner,
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub fork: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub pushed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub tag_name: String,
    pub name: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    pub body: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub download_count: u64,
    pub browser_download_url: Option<String>,
}
