//! Crawl worker - per-seed fetch, filter and extract logic
//!
//! Each seed is crawled exactly one hop deep:
//! - fetch the seed page
//! - keep the outbound links that look like contact pages on the same origin
//! - fetch those pages without following any further links
//! - extract emails from every page that was fetched
//!
//! A failure anywhere inside a seed stays inside that seed.

use crate::config::CrawlConfig;
use crate::crawler::fetcher::{FetchError, FetchedPage, PageFetcher};
use crate::crawler::link_filter::LinkFilter;
use crate::extract::extract_emails;
use crate::state::{CrawlPhase, PhaseTracker, SeedOutcome};
use crate::url::{host_of, normalize_target, origin_of};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use url::Url;

/// Breadth and concurrency bounds for a crawl
#[derive(Debug, Clone, Copy)]
pub struct CrawlLimits {
    /// Maximum filtered pages fetched beyond the seed page
    pub max_links_per_seed: usize,

    /// Maximum seeds crawled at the same time
    pub max_concurrent_seeds: usize,
}

impl From<&CrawlConfig> for CrawlLimits {
    fn from(config: &CrawlConfig) -> Self {
        Self {
            max_links_per_seed: config.max_links_per_seed,
            max_concurrent_seeds: config.max_concurrent_seeds,
        }
    }
}

/// Result of crawling a single seed
#[derive(Debug, Clone)]
pub struct SeedReport {
    pub seed: String,
    pub outcome: SeedOutcome,
    pub emails: HashSet<String>,
    /// Pages fetched successfully, seed page included
    pub pages_fetched: usize,
    pub pages_failed: usize,
}

impl SeedReport {
    fn failed(seed: &str, outcome: SeedOutcome, pages_failed: usize) -> Self {
        Self {
            seed: seed.to_string(),
            outcome,
            emails: HashSet::new(),
            pages_fetched: 0,
            pages_failed,
        }
    }
}

/// Aggregate over many seeds
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    pub emails: HashSet<String>,
    pub seeds_ok: usize,
    pub seeds_failed: usize,
    pub pages_ok: usize,
    pub pages_failed: usize,
}

impl CrawlSummary {
    /// Merges one seed's report; email union is idempotent
    pub fn absorb(&mut self, report: SeedReport) {
        if report.outcome.is_success() {
            self.seeds_ok += 1;
        } else {
            self.seeds_failed += 1;
        }
        self.pages_ok += report.pages_fetched;
        self.pages_failed += report.pages_failed;
        self.emails.extend(report.emails);
    }
}

/// Crawls seeds through a `PageFetcher`
pub struct CrawlWorker {
    fetcher: Arc<dyn PageFetcher>,
    filter: LinkFilter,
    limits: CrawlLimits,
}

impl CrawlWorker {
    pub fn new(fetcher: Arc<dyn PageFetcher>, filter: LinkFilter, limits: CrawlLimits) -> Self {
        Self {
            fetcher,
            filter,
            limits,
        }
    }

    pub fn from_config(fetcher: Arc<dyn PageFetcher>, config: &CrawlConfig) -> Self {
        Self::new(
            fetcher,
            LinkFilter::from_config(config),
            CrawlLimits::from(config),
        )
    }

    /// Crawls every seed and unions the emails found
    ///
    /// Seeds that normalize to the same target are crawled once. Seeds run
    /// concurrently up to `max_concurrent_seeds`; completion order does not
    /// affect the result.
    pub async fn crawl(&self, seeds: &[String]) -> CrawlSummary {
        let mut unique = HashSet::new();
        let seeds: Vec<String> = seeds
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            // Unparseable seeds are kept as-is so crawl_seed reports them
            .map(|s| normalize_target(s).unwrap_or_else(|_| s.to_string()))
            .filter(|s| unique.insert(s.clone()))
            .collect();

        let start = Instant::now();
        let semaphore = Arc::new(Semaphore::new(self.limits.max_concurrent_seeds.max(1)));

        let reports = join_all(seeds.iter().map(|seed| {
            let semaphore = Arc::clone(&semaphore);
            async move {
                let _permit = semaphore.acquire_owned().await.ok();
                self.crawl_seed(seed).await
            }
        }))
        .await;

        let mut summary = CrawlSummary::default();
        for report in reports {
            summary.absorb(report);
        }

        tracing::info!(
            "Crawled {} seeds in {:?}: {} ok, {} failed, {} emails",
            seeds.len(),
            start.elapsed(),
            summary.seeds_ok,
            summary.seeds_failed,
            summary.emails.len()
        );

        summary
    }

    /// Crawls one seed; never fails, a broken seed yields an empty report
    pub async fn crawl_seed(&self, seed: &str) -> SeedReport {
        let mut tracker = PhaseTracker::new(seed);

        let seed_url = match Url::parse(seed) {
            Ok(url) if origin_of(&url).is_some() => url,
            _ => {
                tracing::warn!("Skipping invalid seed '{}'", seed);
                return SeedReport::failed(seed, SeedOutcome::InvalidSeed, 0);
            }
        };

        tracker.advance(CrawlPhase::FetchSeed);
        let seed_page = match self.fetcher.fetch(&seed_url).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(kind = %e.kind(), "Seed {} unreachable: {}", seed, e);
                tracker.advance(CrawlPhase::Done);
                return SeedReport::failed(seed, SeedOutcome::SeedUnreachable, 1);
            }
        };

        tracker.advance(CrawlPhase::FilterLinks);
        let origins = accepted_origins(&seed_url, &seed_page.final_url);
        let targets = self.filter.select(
            &seed_page.links,
            &origins,
            &[&seed_url, &seed_page.final_url],
            self.limits.max_links_per_seed,
        );
        tracing::debug!(
            "{}: {} of {} links are contact candidates",
            seed,
            targets.len(),
            seed_page.links.len()
        );

        tracker.advance(CrawlPhase::FetchEach);
        let fetched = join_all(targets.iter().map(|url| self.fetcher.fetch(url))).await;

        tracker.advance(CrawlPhase::Extract);
        let report = extract_all(seed, &seed_page, fetched);
        tracker.advance(CrawlPhase::Done);

        tracing::info!(
            "{}: {} emails from {} pages ({} failed)",
            seed,
            report.emails.len(),
            report.pages_fetched,
            report.pages_failed
        );

        report
    }
}

/// Origins a link may have to count as same-origin for this seed
///
/// The final origin after redirects is accepted only when the host did not
/// change (e.g. an http -> https upgrade).
fn accepted_origins(seed_url: &Url, final_url: &Url) -> Vec<String> {
    let mut origins: Vec<String> = origin_of(seed_url).into_iter().collect();

    if let Some(final_origin) = origin_of(final_url) {
        if !origins.contains(&final_origin) && host_of(seed_url) == host_of(final_url) {
            origins.push(final_origin);
        }
    }

    origins
}

fn extract_all(
    seed: &str,
    seed_page: &FetchedPage,
    fetched: Vec<Result<FetchedPage, FetchError>>,
) -> SeedReport {
    let mut emails = extract_emails(&seed_page.content);
    let mut pages_fetched = 1;
    let mut pages_failed = 0;

    for result in fetched {
        match result {
            Ok(page) => {
                pages_fetched += 1;
                emails.extend(extract_emails(&page.content));
            }
            Err(e) => {
                pages_failed += 1;
                tracing::warn!(kind = %e.kind(), "{}: contact page failed: {}", seed, e);
            }
        }
    }

    SeedReport {
        seed: seed.to_string(),
        outcome: SeedOutcome::Completed,
        emails,
        pages_fetched,
        pages_failed,
    }
}
