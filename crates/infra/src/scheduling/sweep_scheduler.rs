//! Cron-driven sweep scheduler.
//!
//! Registers the three sweep jobs (overdue, upcoming advisory, daily
//! reconciliation) against a `tokio-cron-scheduler` instance with explicit
//! lifecycle management: join handles are tracked, cancellation is
//! explicit, and every asynchronous operation is wrapped in a timeout.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use deskline_core::BreachSweeper;
//! use deskline_infra::scheduling::{SweepScheduler, SweepSchedulerConfig};
//!
//! # async fn example(sweeper: Arc<BreachSweeper>) -> Result<(), Box<dyn std::error::Error>> {
//! let mut scheduler = SweepScheduler::new(SweepSchedulerConfig::default(), sweeper).await?;
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Duration as ChronoDuration;
use deskline_core::BreachSweeper;
use deskline_domain::constants::{
    DEFAULT_LOOKAHEAD_MINUTES, DEFAULT_OVERDUE_CRON, DEFAULT_RECONCILE_CRON, DEFAULT_UPCOMING_CRON,
};
use deskline_domain::SweepConfig;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the sweep scheduler.
#[derive(Debug, Clone)]
pub struct SweepSchedulerConfig {
    /// Cron expression for the overdue sweep.
    pub overdue_cron: String,
    /// Cron expression for the upcoming-breach advisory sweep.
    pub upcoming_cron: String,
    /// Cron expression for the daily reconciliation pass.
    pub reconcile_cron: String,
    /// Advisory lookahead window in minutes.
    pub lookahead_minutes: i64,
    /// Timeout applied to a single sweep execution.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for SweepSchedulerConfig {
    fn default() -> Self {
        Self {
            overdue_cron: DEFAULT_OVERDUE_CRON.into(),
            upcoming_cron: DEFAULT_UPCOMING_CRON.into(),
            reconcile_cron: DEFAULT_RECONCILE_CRON.into(),
            lookahead_minutes: DEFAULT_LOOKAHEAD_MINUTES,
            job_timeout: Duration::from_secs(300),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&SweepConfig> for SweepSchedulerConfig {
    fn from(config: &SweepConfig) -> Self {
        Self {
            overdue_cron: config.overdue_cron.clone(),
            upcoming_cron: config.upcoming_cron.clone(),
            reconcile_cron: config.reconcile_cron.clone(),
            lookahead_minutes: config.lookahead_minutes,
            ..Self::default()
        }
    }
}

/// Sweep scheduler with explicit lifecycle management.
pub struct SweepScheduler {
    scheduler: Arc<RwLock<JobScheduler>>,
    config: SweepSchedulerConfig,
    job_ids: Vec<Uuid>,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    sweeper: Arc<BreachSweeper>,
}

impl SweepScheduler {
    /// Create a scheduler and register the three sweep jobs.
    pub async fn new(
        config: SweepSchedulerConfig,
        sweeper: Arc<BreachSweeper>,
    ) -> SchedulerResult<Self> {
        let raw_scheduler = JobScheduler::new()
            .await
            .map_err(|err| SchedulerError::CreationFailed(err.to_string()))?;

        let mut scheduler = Self {
            scheduler: Arc::new(RwLock::new(raw_scheduler)),
            config,
            job_ids: Vec::new(),
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            sweeper,
        };

        scheduler.register_jobs().await?;
        Ok(scheduler)
    }

    /// Start the scheduler, spawning the monitoring task.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler = self.scheduler.clone();
        let start_timeout = self.config.start_timeout;
        let start_result = tokio::time::timeout(start_timeout, async move {
            let guard = scheduler.write().await;
            guard.start().await
        })
        .await
        .map_err(|_| SchedulerError::Timeout { seconds: start_timeout.as_secs() })?;

        start_result.map_err(|err| SchedulerError::StartFailed(err.to_string()))?;

        let cancel = self.cancellation.clone();
        let handle = tokio::spawn(async move {
            Self::monitor_task(cancel).await;
        });

        self.monitor_handle = Some(handle);
        info!(jobs = self.job_ids.len(), "sweep scheduler started");
        Ok(())
    }

    /// Stop the scheduler and wait for the monitor task to finish.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        let scheduler = self.scheduler.clone();
        let stop_timeout = self.config.stop_timeout;
        let stop_result = tokio::time::timeout(stop_timeout, async move {
            let mut guard = scheduler.write().await;
            guard.shutdown().await
        })
        .await
        .map_err(|_| SchedulerError::Timeout { seconds: stop_timeout.as_secs() })?;

        stop_result.map_err(|err| SchedulerError::StopFailed(err.to_string()))?;

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })?
                .map_err(|err| SchedulerError::TaskJoinFailed(err.to_string()))?;
        }

        info!("sweep scheduler stopped");
        Ok(())
    }

    /// Whether the scheduler is currently running.
    pub fn is_running(&self) -> bool {
        self.monitor_handle.is_some()
    }

    async fn register_jobs(&mut self) -> SchedulerResult<()> {
        let overdue = {
            let sweeper = self.sweeper.clone();
            let timeout = self.config.job_timeout;
            Job::new_async(self.config.overdue_cron.as_str(), move |_id, _scheduler| {
                let sweeper = sweeper.clone();
                Box::pin(async move {
                    match tokio::time::timeout(timeout, sweeper.sweep_overdue()).await {
                        Ok(Ok(report)) => {
                            if !report.is_clean() {
                                warn!(
                                    failures = report.failures.len(),
                                    breaches = report.events.len(),
                                    "overdue sweep completed with failures"
                                );
                            }
                        }
                        Ok(Err(err)) => error!(error = %err, "overdue sweep failed"),
                        Err(_) => error!("overdue sweep timed out"),
                    }
                })
            })
        };

        let upcoming = {
            let sweeper = self.sweeper.clone();
            let timeout = self.config.job_timeout;
            let lookahead = self.config.lookahead_minutes;
            Job::new_async(self.config.upcoming_cron.as_str(), move |_id, _scheduler| {
                let sweeper = sweeper.clone();
                Box::pin(async move {
                    let window = ChronoDuration::minutes(lookahead);
                    match tokio::time::timeout(timeout, sweeper.sweep_upcoming(window)).await {
                        Ok(Ok(_)) => {}
                        Ok(Err(err)) => error!(error = %err, "advisory sweep failed"),
                        Err(_) => error!("advisory sweep timed out"),
                    }
                })
            })
        };

        let reconcile = {
            let sweeper = self.sweeper.clone();
            let timeout = self.config.job_timeout;
            Job::new_async(self.config.reconcile_cron.as_str(), move |_id, _scheduler| {
                let sweeper = sweeper.clone();
                Box::pin(async move {
                    match tokio::time::timeout(timeout, sweeper.reconcile()).await {
                        Ok(Ok(report)) => {
                            if !report.is_clean() {
                                warn!(
                                    failures = report.failures.len(),
                                    "reconciliation pass completed with failures"
                                );
                            }
                        }
                        Ok(Err(err)) => error!(error = %err, "reconciliation pass failed"),
                        Err(_) => error!("reconciliation pass timed out"),
                    }
                })
            })
        };

        for job in [overdue, upcoming, reconcile] {
            let job = job.map_err(|err| SchedulerError::JobRegistrationFailed(err.to_string()))?;
            let id = self
                .scheduler
                .write()
                .await
                .add(job)
                .await
                .map_err(|err| SchedulerError::JobRegistrationFailed(err.to_string()))?;
            self.job_ids.push(id);
        }
        Ok(())
    }

    async fn monitor_task(cancel: CancellationToken) {
        cancel.cancelled().await;
        debug!("sweep scheduler monitor task exiting");
    }
}
