//! Pipeline orchestrator - search, crawl and persistence handoff
//!
//! One run goes through two stages, each committing before the next starts:
//! - search: pending queries -> site origins -> recorded as scrape targets
//! - crawl: pending targets -> emails -> recorded as email records
//!
//! Both stages run either in-process or remotely through the batch
//! dispatcher, depending on whether a `[dispatch]` section is configured.

use crate::config::Config;
use crate::crawler::{build_http_client, CrawlWorker, HttpPageFetcher, PageFetcher};
use crate::dispatch::{ActionClient, BatchDispatcher, DispatchOutcome};
use crate::extract::normalize_email;
use crate::pipeline::report::PipelineReport;
use crate::search::{collect_origins, DuckDuckGoProvider, SearchExpander, SearchParams, SearchProvider};
use crate::storage::{PendingKind, Persistence, RunStatus};
use crate::{HarvestError, Result};
use reqwest::Client;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Which stages a run executes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stages {
    #[default]
    All,
    SearchOnly,
    CrawlOnly,
}

impl Stages {
    pub fn runs_search(&self) -> bool {
        matches!(self, Self::All | Self::SearchOnly)
    }

    pub fn runs_crawl(&self) -> bool {
        matches!(self, Self::All | Self::CrawlOnly)
    }
}

/// Where the search and crawl work happens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// In this process
    Local,
    /// Through the downstream actions, in batches
    Remote,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Stage implementations for one run
enum Backend {
    Local {
        expander: SearchExpander,
        worker: CrawlWorker,
    },
    Remote {
        actions: ActionClient,
        dispatcher: BatchDispatcher,
    },
}

/// Sequences the search and crawl stages against a persistence collaborator
pub struct Pipeline {
    config: Config,
    config_hash: String,
    stages: Stages,
    force_local: bool,
    fetcher: Option<Arc<dyn PageFetcher>>,
    provider: Option<Arc<dyn SearchProvider>>,
}

impl Pipeline {
    /// Creates a pipeline for a validated configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `config_hash` - Fingerprint stored with every run record
    pub fn new(config: Config, config_hash: impl Into<String>) -> Self {
        Self {
            config,
            config_hash: config_hash.into(),
            stages: Stages::All,
            force_local: false,
            fetcher: None,
            provider: None,
        }
    }

    pub fn with_stages(mut self, stages: Stages) -> Self {
        self.stages = stages;
        self
    }

    /// Runs both stages in-process even if `[dispatch]` is configured
    pub fn force_local(mut self, force: bool) -> Self {
        self.force_local = force;
        self
    }

    /// Replaces the HTTP page fetcher used by the local crawl stage
    pub fn with_fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Replaces the search provider used by the local search stage
    pub fn with_search_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn stages(&self) -> Stages {
        self.stages
    }

    pub fn mode(&self) -> ExecutionMode {
        if self.config.dispatch.is_some() && !self.force_local {
            ExecutionMode::Remote
        } else {
            ExecutionMode::Local
        }
    }

    /// Executes one run
    ///
    /// The HTTP client is built here and dropped when the run returns, on
    /// success and failure alike. The run is recorded as `completed` unless a
    /// fatal error (storage, client construction) ends it, in which case it
    /// is recorded as `failed` with the counters gathered so far. Contained
    /// unit failures never fail the run.
    ///
    /// # Returns
    ///
    /// * `Ok(PipelineReport)` - Counters of the run
    /// * `Err(HarvestError)` - A fatal error ended the run
    pub async fn run(&self, storage: &mut dyn Persistence) -> Result<PipelineReport> {
        let client = build_http_client(&self.config.client).map_err(HarvestError::Client)?;
        let run_id = storage.start_run(&self.config_hash)?;
        let start = Instant::now();

        tracing::info!(
            "Run {} started ({} mode, {:?})",
            run_id,
            self.mode(),
            self.stages
        );

        let mut report = PipelineReport::default();
        let result = self.run_stages(&client, storage, &mut report).await;

        let status = match &result {
            Ok(()) => RunStatus::Completed,
            Err(e) => {
                tracing::error!("Run {} failed: {}", run_id, e);
                RunStatus::Failed
            }
        };

        if let Err(e) = storage.finish_run(run_id, status, &report) {
            tracing::error!("Failed to record the end of run {}: {}", run_id, e);
            result?;
            return Err(e.into());
        }

        result?;
        tracing::info!("Run {} finished in {:?}: {}", run_id, start.elapsed(), report);
        Ok(report)
    }

    async fn run_stages(
        &self,
        client: &Client,
        storage: &mut dyn Persistence,
        report: &mut PipelineReport,
    ) -> Result<()> {
        let backend = self.backend(client)?;

        if self.stages.runs_search() {
            self.search_stage(&backend, storage, report).await?;
        }

        if self.stages.runs_crawl() {
            self.crawl_stage(&backend, storage, report).await?;
        }

        Ok(())
    }

    fn backend(&self, client: &Client) -> Result<Backend> {
        if let (ExecutionMode::Remote, Some(dispatch)) = (self.mode(), &self.config.dispatch) {
            return Ok(Backend::Remote {
                actions: ActionClient::new(client.clone(), dispatch),
                dispatcher: BatchDispatcher::new(dispatch.batch_size),
            });
        }

        let provider: Arc<dyn SearchProvider> = match &self.provider {
            Some(provider) => Arc::clone(provider),
            None => Arc::new(DuckDuckGoProvider::new(
                client.clone(),
                &self.config.search.endpoint,
            )?),
        };

        let fetcher: Arc<dyn PageFetcher> = match &self.fetcher {
            Some(fetcher) => Arc::clone(fetcher),
            None => Arc::new(HttpPageFetcher::new(client.clone())),
        };

        Ok(Backend::Local {
            expander: SearchExpander::new(provider, SearchParams::from(&self.config.search)),
            worker: CrawlWorker::from_config(fetcher, &self.config.crawl),
        })
    }

    async fn search_stage(
        &self,
        backend: &Backend,
        storage: &mut dyn Persistence,
        report: &mut PipelineReport,
    ) -> Result<()> {
        let queries = storage.list_pending_queries()?;
        if queries.is_empty() {
            tracing::info!("No pending queries");
            return Ok(());
        }

        tracing::info!("Search stage: {} pending queries", queries.len());

        let origins = match backend {
            Backend::Local { expander, .. } => {
                let expansion = expander.expand(&queries).await;
                report.queries_ok += expansion.queries_ok;
                report.queries_failed += expansion.queries_failed;
                expansion.origins
            }
            Backend::Remote {
                actions,
                dispatcher,
            } => {
                let outcome = dispatcher
                    .dispatch("search-action", &queries, |batch| actions.search(batch))
                    .await;
                count_batches(report, &outcome);
                collect_origins(&outcome.items)
            }
        };

        report.origins_found += origins.len();
        report.targets_recorded += storage.record_targets(&origins)?;
        storage.clear_pending(PendingKind::Queries)?;

        tracing::info!(
            "Search stage committed: {} origins, {} new targets",
            origins.len(),
            report.targets_recorded
        );
        Ok(())
    }

    async fn crawl_stage(
        &self,
        backend: &Backend,
        storage: &mut dyn Persistence,
        report: &mut PipelineReport,
    ) -> Result<()> {
        let targets = storage.list_pending_targets()?;
        if targets.is_empty() {
            tracing::info!("No pending targets");
            return Ok(());
        }

        tracing::info!("Crawl stage: {} pending targets", targets.len());

        let emails = match backend {
            Backend::Local { worker, .. } => {
                let summary = worker.crawl(&targets).await;
                report.seeds_ok += summary.seeds_ok;
                report.seeds_failed += summary.seeds_failed;
                report.pages_ok += summary.pages_ok;
                report.pages_failed += summary.pages_failed;
                summary.emails
            }
            Backend::Remote {
                actions,
                dispatcher,
            } => {
                let outcome = dispatcher
                    .dispatch("scrape-action", &targets, |batch| actions.scrape(batch))
                    .await;
                count_batches(report, &outcome);
                valid_emails(&outcome.items)
            }
        };

        report.emails_found += emails.len();
        report.emails_recorded += storage.record_emails(&emails)?;
        storage.clear_pending(PendingKind::Targets)?;

        tracing::info!(
            "Crawl stage committed: {} emails, {} new",
            emails.len(),
            report.emails_recorded
        );
        Ok(())
    }
}

fn count_batches(report: &mut PipelineReport, outcome: &DispatchOutcome) {
    report.batches_ok += outcome.succeeded;
    report.batches_failed += outcome.failed;
}

/// Normalizes remote results into a set, dropping anything that is not an address
fn valid_emails(items: &[String]) -> HashSet<String> {
    items
        .iter()
        .filter_map(|item| {
            let email = normalize_email(item);
            if email.is_none() {
                tracing::debug!("Dropping invalid remote result '{}'", item);
            }
            email
        })
        .collect()
}
