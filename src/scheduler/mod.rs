//! Periodic audit trigger.
//!
//! The schedule is derived from the immutable `AuditConfig`: sub-daily
//! units repeat from now, daily-and-coarser units aim the first run at the
//! configured hour:minute (today if still ahead, otherwise tomorrow) and
//! repeat from there. A configuration change is handled by cancelling the
//! running handle and starting a fresh one; schedules are never mutated in
//! place.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{interval, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::audit::{AuditError, Auditor};
use crate::config::AuditConfig;

/// Delay until the first run of a fresh schedule.
///
/// For daily, weekly, monthly and yearly cadences the first run lands on
/// the next occurrence of run_hour:run_minute; shorter cadences start
/// immediately.
pub fn first_run_delay(now: DateTime<Utc>, config: &AuditConfig) -> Duration {
    if !config.interval_unit.uses_run_time() {
        return Duration::ZERO;
    }
    // Config validation keeps run_hour/run_minute in range, but the fields
    // are public; an out-of-range value degrades to an immediate first run
    // rather than panicking.
    let Some(today_target) = now
        .date_naive()
        .and_hms_opt(config.run_hour, config.run_minute, 0)
    else {
        return Duration::ZERO;
    };
    let today_target = today_target.and_utc();
    let target = if today_target > now {
        today_target
    } else {
        today_target + chrono::Duration::days(1)
    };
    (target - now).to_std().unwrap_or(Duration::ZERO)
}

/// Handle to a running schedule. Dropping it does not stop the loop; call
/// [`ScheduleHandle::cancel`] (or [`ScheduleHandle::shutdown`] to also wait
/// for the loop to wind down).
pub struct ScheduleHandle {
    token: CancellationToken,
    task: tokio::task::JoinHandle<()>,
}

impl ScheduleHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub async fn shutdown(self) {
        self.token.cancel();
        let _ = self.task.await;
    }
}

pub struct Scheduler;

impl Scheduler {
    /// Spawn the periodic trigger loop for the given configuration.
    pub fn start(auditor: Arc<Auditor>, config: AuditConfig) -> ScheduleHandle {
        let token = CancellationToken::new();
        let loop_token = token.clone();

        let task = tokio::spawn(async move {
            let delay = first_run_delay(Utc::now(), &config);
            info!(
                every = %format!("{} {}", config.interval_value, config.interval_unit),
                first_run_in_secs = delay.as_secs(),
                "audit schedule started"
            );
            tokio::select! {
                _ = loop_token.cancelled() => {
                    info!("audit schedule cancelled before first run");
                    return;
                }
                _ = sleep(delay) => {}
            }

            let period = config.interval_unit.period(config.interval_value);
            let mut ticker = interval(period);
            loop {
                tokio::select! {
                    _ = loop_token.cancelled() => {
                        info!("audit schedule cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        match auditor.run(&config).await {
                            Ok(summary) => info!(
                                broken = summary.broken_links,
                                urls = summary.urls_checked,
                                "scheduled audit finished"
                            ),
                            Err(AuditError::AlreadyRunning) => {
                                // A manual run (or a still-running previous
                                // tick) holds the lock; this tick is skipped.
                                warn!("scheduled audit skipped: a run is already in progress");
                            }
                            Err(err) => error!(%err, "scheduled audit failed"),
                        }
                    }
                }
            }
        });

        ScheduleHandle { token, task }
    }

    /// Replace a running schedule with one built from new settings. Used
    /// whenever a scheduling field of the configuration changes.
    pub fn reschedule(
        auditor: Arc<Auditor>,
        config: AuditConfig,
        previous: ScheduleHandle,
    ) -> ScheduleHandle {
        previous.cancel();
        Self::start(auditor, config)
    }
}
