//! Lifecycle tests for the sweep scheduler.

mod support;

use std::sync::Arc;

use deskline_core::BreachSweeper;
use deskline_domain::SweepConfig;
use deskline_infra::scheduling::{SchedulerError, SweepScheduler, SweepSchedulerConfig};
use deskline_infra::{LoggingEventSink, SqliteDeadlineRepository, SystemClock};

use support::migrated_db;

async fn scheduler() -> (SweepScheduler, tempfile::TempDir) {
    let (db, guard) = migrated_db();
    let sweeper = Arc::new(BreachSweeper::new(
        Arc::new(SqliteDeadlineRepository::new(db)),
        Arc::new(LoggingEventSink),
        Arc::new(SystemClock),
    ));

    // Far-off cadence so no job fires during the test
    let config = SweepSchedulerConfig {
        overdue_cron: "0 0 3 1 1 *".into(),
        upcoming_cron: "0 10 3 1 1 *".into(),
        reconcile_cron: "0 20 3 1 1 *".into(),
        ..SweepSchedulerConfig::default()
    };
    (SweepScheduler::new(config, sweeper).await.expect("scheduler created"), guard)
}

#[tokio::test]
async fn start_and_stop_cycle() {
    let (mut scheduler, _guard) = scheduler().await;
    assert!(!scheduler.is_running());

    scheduler.start().await.expect("started");
    assert!(scheduler.is_running());

    scheduler.stop().await.expect("stopped");
    assert!(!scheduler.is_running());
}

#[tokio::test]
async fn double_start_is_rejected() {
    let (mut scheduler, _guard) = scheduler().await;
    scheduler.start().await.expect("started");

    let err = scheduler.start().await.expect_err("second start rejected");
    assert!(matches!(err, SchedulerError::AlreadyRunning));

    scheduler.stop().await.expect("stopped");
}

#[tokio::test]
async fn stop_without_start_is_rejected() {
    let (mut scheduler, _guard) = scheduler().await;
    let err = scheduler.stop().await.expect_err("stop rejected");
    assert!(matches!(err, SchedulerError::NotRunning));
}

#[tokio::test]
async fn config_derives_from_sweep_settings() {
    let sweep = SweepConfig {
        overdue_cron: "0 */10 * * * *".into(),
        upcoming_cron: "0 15 * * * *".into(),
        reconcile_cron: "0 45 2 * * *".into(),
        lookahead_minutes: 45,
        enabled: true,
    };
    let config = SweepSchedulerConfig::from(&sweep);

    assert_eq!(config.overdue_cron, "0 */10 * * * *");
    assert_eq!(config.lookahead_minutes, 45);
    // Timeouts keep their defaults
    assert_eq!(config.job_timeout, SweepSchedulerConfig::default().job_timeout);
}
