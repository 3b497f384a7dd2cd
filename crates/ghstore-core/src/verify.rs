// Release verification - the single unit of work behind progressive search
use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use ghstore_cache::{Cached, LruCache, SharedVerifyCache};

use crate::matcher::asset_matches;
use crate::models::{LatestRelease, Platform, RepoCandidate, RepoSummary, VerifyKey};
use crate::Result;

/// Latest-release lookup, abstracted so verification can be tested without
/// the network.
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// `None` means the repository has never published a release.
    async fn latest_release(&self, owner: &str, name: &str) -> Result<Option<LatestRelease>>;
}

/// Checks whether a candidate's latest release ships an installer.
///
/// Consults the shared verification cache first; only a cache miss costs a
/// network round-trip. Outcomes are cached both ways - "has an installer"
/// and "checked, has none" - but timeouts and transport errors are not,
/// since those say nothing about the repo itself.
pub struct ReleaseVerifier {
    releases: Arc<dyn ReleaseSource>,
    cache: SharedVerifyCache<VerifyKey, RepoSummary>,
}

impl ReleaseVerifier {
    pub fn new(releases: Arc<dyn ReleaseSource>, cache_capacity: usize) -> Self {
        Self {
            releases,
            cache: LruCache::shared(cache_capacity),
        }
    }

    /// Share an existing cache, e.g. across several search engines.
    pub fn with_cache(
        releases: Arc<dyn ReleaseSource>,
        cache: SharedVerifyCache<VerifyKey, RepoSummary>,
    ) -> Self {
        Self { releases, cache }
    }

    /// Verify one candidate against one platform within `deadline`.
    ///
    /// Returns the display summary when the latest release ships a matching
    /// asset, `None` otherwise. Lookup errors and timeouts degrade to `None`;
    /// they exclude the candidate, never the batch.
    pub async fn verify(
        &self,
        candidate: &RepoCandidate,
        platform: Platform,
        deadline: Duration,
    ) -> Option<RepoSummary> {
        let key = VerifyKey::new(&candidate.full_name, platform);

        match self.cache.lock().await.get(&key) {
            Some(Cached::Hit(summary)) => return Some(summary),
            Some(Cached::NegativeHit) => return None,
            None => {}
        }

        let lookup = timeout(
            deadline,
            self.releases.latest_release(&candidate.owner, &candidate.name),
        )
        .await;

        match lookup {
            Ok(Ok(release)) => {
                let verdict = release
                    .filter(|r| release_has_installer(r, platform))
                    .map(|_| candidate.to_summary());
                self.cache.lock().await.insert(key, verdict.clone());
                verdict
            }
            Ok(Err(err)) => {
                // Transient: leave uncached so a later search retries.
                debug!("release lookup for {} failed: {}", candidate.full_name, err);
                None
            }
            Err(_) => {
                debug!("release lookup for {} timed out", candidate.full_name);
                None
            }
        }
    }
}

fn release_has_installer(release: &LatestRelease, platform: Platform) -> bool {
    release
        .assets
        .iter()
        .any(|asset| asset_matches(asset, platform))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn candidate(full_name: &str) -> RepoCandidate {
        let (owner, name) = full_name.split_once('/').unwrap();
        RepoCandidate {
            id: 1,
            owner: owner.into(),
            name: name.into(),
            full_name: full_name.into(),
            description: None,
            html_url: format!("https://github.com/{}", full_name),
            stars: 10,
            language: None,
            topics: vec![],
            updated_at: Utc::now(),
        }
    }

    fn release(assets: &[&str]) -> LatestRelease {
        LatestRelease {
            tag_name: "v1.0.0".into(),
            draft: false,
            prerelease: false,
            assets: assets.iter().map(|a| a.to_string()).collect(),
        }
    }

    enum Behavior {
        Release(Vec<String>),
        NoRelease,
        Error,
        Hang,
    }

    struct FakeReleases {
        behavior: Behavior,
        calls: AtomicU32,
    }

    impl FakeReleases {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ReleaseSource for FakeReleases {
        async fn latest_release(&self, _owner: &str, _name: &str) -> Result<Option<LatestRelease>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Release(assets) => Ok(Some(LatestRelease {
                    tag_name: "v1.0.0".into(),
                    draft: false,
                    prerelease: false,
                    assets: assets.clone(),
                })),
                Behavior::NoRelease => Ok(None),
                Behavior::Error => Err(crate::Error::Api("boom".into())),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(None)
                }
            }
        }
    }

    const DEADLINE: Duration = Duration::from_millis(1400);

    #[tokio::test]
    async fn matching_release_verifies_and_caches() {
        let releases = FakeReleases::new(Behavior::Release(vec!["app.apk".into()]));
        let verifier = ReleaseVerifier::new(releases.clone(), 10);
        let repo = candidate("alice/todo");

        let first = verifier.verify(&repo, Platform::Android, DEADLINE).await;
        let second = verifier.verify(&repo, Platform::Android, DEADLINE).await;

        assert_eq!(first.as_ref().map(|s| s.full_name.as_str()), Some("alice/todo"));
        assert_eq!(first, second);
        assert_eq!(releases.calls(), 1, "second call must come from cache");
    }

    #[tokio::test]
    async fn confirmed_negative_is_cached() {
        let releases = FakeReleases::new(Behavior::Release(vec!["source.zip".into()]));
        let verifier = ReleaseVerifier::new(releases.clone(), 10);
        let repo = candidate("bob/lib");

        assert!(verifier.verify(&repo, Platform::Android, DEADLINE).await.is_none());
        assert!(verifier.verify(&repo, Platform::Android, DEADLINE).await.is_none());
        assert_eq!(releases.calls(), 1, "confirmed no-installer must be cached");
    }

    #[tokio::test]
    async fn repo_without_releases_is_cached_negative() {
        let releases = FakeReleases::new(Behavior::NoRelease);
        let verifier = ReleaseVerifier::new(releases.clone(), 10);
        let repo = candidate("carol/docs");

        assert!(verifier.verify(&repo, Platform::All, DEADLINE).await.is_none());
        assert!(verifier.verify(&repo, Platform::All, DEADLINE).await.is_none());
        assert_eq!(releases.calls(), 1);
    }

    #[tokio::test]
    async fn lookup_error_is_not_cached() {
        let releases = FakeReleases::new(Behavior::Error);
        let verifier = ReleaseVerifier::new(releases.clone(), 10);
        let repo = candidate("dave/cli");

        assert!(verifier.verify(&repo, Platform::All, DEADLINE).await.is_none());
        assert!(verifier.verify(&repo, Platform::All, DEADLINE).await.is_none());
        assert_eq!(releases.calls(), 2, "transient failures must retry next time");
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_not_cached() {
        let releases = FakeReleases::new(Behavior::Hang);
        let verifier = ReleaseVerifier::new(releases.clone(), 10);
        let repo = candidate("erin/slow");

        assert!(verifier.verify(&repo, Platform::All, DEADLINE).await.is_none());
        assert!(verifier.verify(&repo, Platform::All, DEADLINE).await.is_none());
        assert_eq!(releases.calls(), 2, "timeouts must not become permanent negatives");
    }

    #[tokio::test]
    async fn platforms_are_cached_independently() {
        let releases = FakeReleases::new(Behavior::Release(vec!["app.apk".into()]));
        let verifier = ReleaseVerifier::new(releases.clone(), 10);
        let repo = candidate("frank/app");

        assert!(verifier.verify(&repo, Platform::Android, DEADLINE).await.is_some());
        assert!(verifier.verify(&repo, Platform::Windows, DEADLINE).await.is_none());
        assert_eq!(releases.calls(), 2, "different platform means a different key");
    }

    #[test]
    fn draft_and_prerelease_are_not_excluded() {
        let mut rel = release(&["app.apk"]);
        rel.draft = true;
        rel.prerelease = true;
        assert!(release_has_installer(&rel, Platform::Android));
    }
}
