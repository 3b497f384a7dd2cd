// GitHub provider - adapts the API client to the pipeline's source traits
use async_trait::async_trait;
use ghstore_api::{GitHubClient, GitHubRepo};

use crate::models::{CandidatePage, LatestRelease, RepoCandidate};
use crate::search::CandidateSource;
use crate::verify::ReleaseSource;
use crate::{Error, Result};

/// Wrapper around GitHubClient serving both candidate pages and releases
pub struct GitHubProvider {
    client: GitHubClient,
}

impl GitHubProvider {
    pub fn new(token: Option<String>) -> Self {
        Self {
            client: GitHubClient::new(token),
        }
    }

    pub fn from_client(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CandidateSource for GitHubProvider {
    async fn search_page(&self, query: &str, per_page: u32, page: u32) -> Result<CandidatePage> {
        let response = self
            .client
            .search_repositories(query, per_page, page)
            .await
            .map_err(|e| Error::Api(e.to_string()))?;

        Ok(CandidatePage {
            total_count: response.total_count,
            items: response.items.into_iter().map(github_to_candidate).collect(),
        })
    }
}

#[async_trait]
impl ReleaseSource for GitHubProvider {
    async fn latest_release(&self, owner: &str, name: &str) -> Result<Option<LatestRelease>> {
        let release = self
            .client
            .latest_release(owner, name)
            .await
            .map_err(|e| Error::Api(e.to_string()))?;

        Ok(release.map(|r| LatestRelease {
            tag_name: r.tag_name,
            draft: r.draft,
            prerelease: r.prerelease,
            assets: r.assets.into_iter().map(|a| a.name).collect(),
        }))
    }
}

/// Convert a GitHub API repo to the pipeline's candidate model
fn github_to_candidate(gh: GitHubRepo) -> RepoCandidate {
    RepoCandidate {
        id: gh.id,
        owner: gh.owner.login,
        name: gh.name,
        full_name: gh.full_name,
        description: gh.description,
        html_url: gh.html_url,
        stars: gh.stargazers_count,
        language: gh.language,
        topics: gh.topics,
        updated_at: gh.updated_at,
    }
}
