//! Pipeline wiring: launch scheduler, worker pool, result router.
//!
//! ```text
//! identifiers -> LaunchScheduler -> N pool tasks -> mpsc -> ResultRouter -> sinks
//! ```
//!
//! Pool tasks pull the next admitted identifier until the scheduler is
//! exhausted. Each task holds a sender clone; once all tasks are joined the
//! channel closes and the router finishes. That close is the completion
//! signal.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::errors::PipelineError;
use crate::models::{Identifier, LookupOutcome, PipelineReport};
use crate::provider::ProviderConfig;
use crate::router::{PriceStatement, ResultRouter};
use crate::scheduler::{LaunchPolicy, LaunchScheduler};
use crate::sink::RecordSink;
use crate::worker::{LookupWorker, RetryPolicy, REQUEST_TIMEOUT};

/// Default number of lookups in flight at once.
pub const DEFAULT_POOL_SIZE: usize = 8;

/// Capacity of the outcome channel.
const OUTCOME_BUFFER: usize = 64;

/// Configuration for one pipeline.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub provider: ProviderConfig,
    pub launch: LaunchPolicy,
    /// Maximum concurrent lookups. Zero is treated as one.
    pub pool_size: usize,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub statement: PriceStatement,
}

impl PipelineConfig {
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            provider,
            launch: LaunchPolicy::default(),
            pool_size: DEFAULT_POOL_SIZE,
            request_timeout: REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
            statement: PriceStatement::default(),
        }
    }

    pub fn with_launch(mut self, launch: LaunchPolicy) -> Self {
        self.launch = launch;
        self
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_statement(mut self, statement: PriceStatement) -> Self {
        self.statement = statement;
        self
    }
}

/// A configured pipeline, reusable across runs.
pub struct PricePipeline {
    worker: Arc<LookupWorker>,
    launch: LaunchPolicy,
    pool_size: usize,
    statement: PriceStatement,
}

impl PricePipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let provider = config.provider.build()?;
        let client = LookupWorker::http_client(config.request_timeout)?;

        Ok(Self {
            worker: Arc::new(LookupWorker::new(client, provider, config.retry)),
            launch: config.launch,
            pool_size: config.pool_size.max(1),
            statement: config.statement,
        })
    }

    /// Resolves every identifier and routes each outcome to exactly one sink.
    ///
    /// Returns once all pool tasks are joined and the router has drained and
    /// flushed. Per-identifier failures never fail the run.
    pub async fn run(
        &self,
        identifiers: Vec<Identifier>,
        success: Box<dyn RecordSink>,
        failure: Box<dyn RecordSink>,
    ) -> Result<PipelineReport, PipelineError> {
        let dispatched = identifiers.len();
        let workers = self.pool_size.min(dispatched).max(1);
        info!(
            "Resolving {} identifiers via {} ({}, {} workers)",
            dispatched,
            self.worker.provider_id(),
            self.launch,
            workers
        );

        let scheduler = Arc::new(LaunchScheduler::new(identifiers, self.launch));
        let (tx, rx) = mpsc::channel::<LookupOutcome>(OUTCOME_BUFFER);

        let router = ResultRouter::new(success, failure, self.statement.clone());
        let router_handle = tokio::spawn(router.run(rx));

        let mut pool = JoinSet::new();
        for _ in 0..workers {
            let scheduler = Arc::clone(&scheduler);
            let worker = Arc::clone(&self.worker);
            let tx = tx.clone();

            pool.spawn(async move {
                while let Some(admission) = scheduler.next().await {
                    let outcome = worker.lookup(&admission.identifier).await;
                    if tx.send(outcome).await.is_err() {
                        warn!(
                            "Result router stopped before outcome for {} was delivered",
                            admission.identifier
                        );
                        break;
                    }
                }
            });
        }
        drop(tx);

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                error!("Lookup task failed: {}", e);
            }
        }

        let totals = router_handle
            .await
            .map_err(|e| PipelineError::Sink(format!("result router failed: {}", e)))?;

        let report = PipelineReport {
            dispatched,
            priced: totals.priced,
            failed: totals.failed,
            write_errors: totals.write_errors,
        };

        if report.is_complete() {
            info!(
                "Finished: {} priced, {} failed of {}",
                report.priced, report.failed, report.dispatched
            );
        } else {
            error!(
                "Incomplete run: {} priced + {} failed != {} dispatched",
                report.priced, report.failed, report.dispatched
            );
        }

        Ok(report)
    }
}
