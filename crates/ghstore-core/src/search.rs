// Progressive search - verified results stream out while checks still run
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SearchTuning;
use crate::home::{category_query, HomeCategory};
use crate::models::{CandidatePage, PaginatedRepos, Platform, RepoCandidate, RepoSummary};
use crate::query::build_search_query;
use crate::verify::ReleaseVerifier;
use crate::{Error, Result};

/// Paged candidate lookup, abstracted so the orchestrator can be tested
/// without the network.
#[async_trait::async_trait]
pub trait CandidateSource: Send + Sync {
    async fn search_page(&self, query: &str, per_page: u32, page: u32) -> Result<CandidatePage>;
}

/// Drives one search call: fetch candidates, fan out bounded-concurrent
/// release checks, stream verified snapshots to the caller.
///
/// Two modes, matching how a result list is consumed:
/// - page 1 runs *strict* mode: an early emission as soon as a first
///   screenful verifies, then cross-page backfill toward a target count;
/// - later pages run *incremental* mode: one emission with just that page's
///   verified subset, which the caller appends itself.
///
/// Emissions go through an mpsc sender; the caller dropping the receiver is
/// the cancellation signal and surfaces as [`Error::Cancelled`], never as a
/// generic failure.
pub struct ProgressiveSearch {
    source: Arc<dyn CandidateSource>,
    verifier: Arc<ReleaseVerifier>,
    tuning: SearchTuning,
}

struct StrictProgress {
    verified: Vec<RepoSummary>,
    emitted_once: bool,
    start_page: u32,
    total: u64,
}

impl ProgressiveSearch {
    pub fn new(source: Arc<dyn CandidateSource>, verifier: Arc<ReleaseVerifier>) -> Self {
        Self::with_tuning(source, verifier, SearchTuning::default())
    }

    pub fn with_tuning(
        source: Arc<dyn CandidateSource>,
        verifier: Arc<ReleaseVerifier>,
        tuning: SearchTuning,
    ) -> Self {
        Self {
            source,
            verifier,
            tuning,
        }
    }

    /// Run a user search, emitting progressive snapshots on `tx`.
    pub async fn search(
        &self,
        user_query: &str,
        platform: Platform,
        page: u32,
        tx: &mpsc::Sender<PaginatedRepos>,
    ) -> Result<()> {
        let query = build_search_query(user_query, platform);
        self.run(&query, platform, page, tx).await
    }

    /// Run a home-category browse through the same verification pipeline.
    pub async fn browse(
        &self,
        category: HomeCategory,
        platform: Platform,
        page: u32,
        tx: &mpsc::Sender<PaginatedRepos>,
    ) -> Result<()> {
        let query = category_query(category, platform);
        self.run(&query, platform, page, tx).await
    }

    async fn run(
        &self,
        query: &str,
        platform: Platform,
        page: u32,
        tx: &mpsc::Sender<PaginatedRepos>,
    ) -> Result<()> {
        let per_page = self.tuning.per_page;
        info!("searching page {} on {}: {}", page, platform, query);

        let response = self.source.search_page(query, per_page, page).await?;
        let total = response.total_count;
        let base_has_more = (page as u64 * per_page as u64) < total && !response.items.is_empty();
        debug!(
            "page {} fetched: {} candidates of {} total",
            page,
            response.items.len(),
            total
        );

        if page <= 1 {
            self.strict_first_page(response, query, platform, page, tx)
                .await
        } else {
            self.incremental_page(response, platform, page, base_has_more, tx)
                .await
        }
    }

    /// Strict mode: verify the first page, emit early once a screenful is
    /// ready, then backfill further pages until the target count or the
    /// backfill budget runs out.
    async fn strict_first_page(
        &self,
        first_page: CandidatePage,
        query: &str,
        platform: Platform,
        start_page: u32,
        tx: &mpsc::Sender<PaginatedRepos>,
    ) -> Result<()> {
        let t = &self.tuning;
        let mut progress = StrictProgress {
            verified: Vec::new(),
            emitted_once: false,
            start_page,
            total: first_page.total_count,
        };

        let first_batch: Vec<RepoCandidate> = first_page
            .items
            .into_iter()
            .take(t.candidates_per_page)
            .collect();
        self.strict_batch(first_batch, platform, &mut progress, tx)
            .await?;

        let mut last_fetched = start_page;
        let mut has_more = true;
        let mut next_page_index = start_page + 1;
        let mut pages_fetched = 0;

        while progress.verified.len() < t.target_count
            && has_more
            && pages_fetched < t.max_backfill_pages
        {
            let next_page = last_fetched + 1;
            debug!(
                "backfilling page {}: {} of {} verified",
                next_page,
                progress.verified.len(),
                t.target_count
            );
            let response = self.source.search_page(query, t.per_page, next_page).await?;

            if response.items.is_empty() {
                has_more = false;
                next_page_index = next_page;
                break;
            }

            let batch: Vec<RepoCandidate> = response
                .items
                .into_iter()
                .take(t.candidates_per_page)
                .collect();
            self.strict_batch(batch, platform, &mut progress, tx).await?;

            last_fetched = next_page;
            pages_fetched += 1;
            has_more = (last_fetched as u64 * t.per_page as u64) < response.total_count;
            next_page_index = last_fetched + 1;
        }

        // Guarantee one non-empty emission before the final one whenever
        // anything verified at all.
        if !progress.emitted_once && !progress.verified.is_empty() {
            progress.emitted_once = true;
            send_or_cancelled(
                tx,
                PaginatedRepos {
                    repos: progress.verified.clone(),
                    has_more: true,
                    next_page_index: start_page + 1,
                    total_count: progress.total,
                },
            )
            .await?;
        }

        info!(
            "search done: {} verified, has_more={}",
            progress.verified.len(),
            has_more
        );
        send_or_cancelled(
            tx,
            PaginatedRepos {
                repos: progress.verified,
                has_more,
                next_page_index,
                total_count: progress.total,
            },
        )
        .await
    }

    /// Verify one strict-mode batch, collecting results in candidate order.
    ///
    /// Stops early (aborting outstanding checks) once the target count is
    /// reached or the caller goes away.
    async fn strict_batch(
        &self,
        items: Vec<RepoCandidate>,
        platform: Platform,
        progress: &mut StrictProgress,
        tx: &mpsc::Sender<PaginatedRepos>,
    ) -> Result<()> {
        let t = &self.tuning;
        let deadline = Duration::from_millis(t.per_check_timeout_ms);
        let mut handles = self.spawn_checks(items, platform, t.verify_concurrency, deadline);

        let mut outcome = Ok(());
        let mut stop_at = handles.len();

        for i in 0..handles.len() {
            if tx.is_closed() {
                outcome = Err(Error::Cancelled);
                stop_at = i;
                break;
            }

            // Await in submission order: output order stays deterministic
            // no matter which check finishes first.
            let checked = match (&mut handles[i]).await {
                Ok(verdict) => verdict,
                Err(join_err) => {
                    warn!("verification task failed: {}", join_err);
                    None
                }
            };

            let Some(summary) = checked else { continue };
            progress.verified.push(summary);

            if !progress.emitted_once && progress.verified.len() >= t.min_first_emit.max(1) {
                progress.emitted_once = true;
                let snapshot = PaginatedRepos {
                    repos: progress.verified.clone(),
                    has_more: true,
                    next_page_index: progress.start_page + 1,
                    total_count: progress.total,
                };
                if let Err(err) = send_or_cancelled(tx, snapshot).await {
                    outcome = Err(err);
                    stop_at = i + 1;
                    break;
                }
            }

            if progress.verified.len() >= t.target_count {
                stop_at = i + 1;
                break;
            }
        }

        for handle in &handles[stop_at..] {
            handle.abort();
        }
        outcome
    }

    /// Incremental mode: verify a single later page and emit exactly once.
    async fn incremental_page(
        &self,
        page_data: CandidatePage,
        platform: Platform,
        page: u32,
        base_has_more: bool,
        tx: &mpsc::Sender<PaginatedRepos>,
    ) -> Result<()> {
        let total = page_data.total_count;

        if page_data.items.is_empty() {
            return send_or_cancelled(
                tx,
                PaginatedRepos {
                    repos: Vec::new(),
                    has_more: false,
                    next_page_index: page + 1,
                    total_count: total,
                },
            )
            .await;
        }

        let t = &self.tuning;
        let deadline = Duration::from_millis(t.incremental_timeout_ms);
        let mut handles =
            self.spawn_checks(page_data.items, platform, t.incremental_concurrency, deadline);

        let mut verified = Vec::new();
        for i in 0..handles.len() {
            if tx.is_closed() {
                for handle in &handles[i..] {
                    handle.abort();
                }
                return Err(Error::Cancelled);
            }

            match (&mut handles[i]).await {
                Ok(Some(summary)) => verified.push(summary),
                Ok(None) => {}
                Err(join_err) => warn!("verification task failed: {}", join_err),
            }
        }

        info!("page {} verified {} repos", page, verified.len());
        send_or_cancelled(
            tx,
            PaginatedRepos {
                repos: verified,
                has_more: base_has_more,
                next_page_index: page + 1,
                total_count: total,
            },
        )
        .await
    }

    /// Fan out release checks under a fresh semaphore, one task per
    /// candidate, handles returned in submission order.
    fn spawn_checks(
        &self,
        items: Vec<RepoCandidate>,
        platform: Platform,
        concurrency: usize,
        deadline: Duration,
    ) -> Vec<JoinHandle<Option<RepoSummary>>> {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

        items
            .into_iter()
            .map(|candidate| {
                let semaphore = Arc::clone(&semaphore);
                let verifier = Arc::clone(&self.verifier);
                tokio::spawn(async move {
                    // Closed semaphore can only mean the batch was torn down.
                    let _permit = semaphore.acquire_owned().await.ok()?;
                    verifier.verify(&candidate, platform, deadline).await
                })
            })
            .collect()
    }
}

async fn send_or_cancelled(tx: &mpsc::Sender<PaginatedRepos>, snapshot: PaginatedRepos) -> Result<()> {
    tx.send(snapshot).await.map_err(|_| Error::Cancelled)
}
