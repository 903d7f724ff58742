//! Single-running-timer time tracking.
//!
//! At most one log is open at any moment: starting a timer closes whatever
//! was running (on any task) and opens a new log, all in one transaction.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta, Utc};
use db::models::{task::Task, time_log::TimeLog};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TimerError {
    #[error("Task not found: {0}")]
    TaskNotFound(Uuid),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Result of starting a timer: the logs that were closed and the new one.
#[derive(Debug, Clone, Serialize, TS)]
pub struct TimerStart {
    pub stopped: Vec<TimeLog>,
    pub started: TimeLog,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct TodaySummary {
    pub date: NaiveDate,
    pub total_seconds: i64,
    pub running: Option<TimeLog>,
}

/// Whole seconds between `started_at` and `until`, never negative.
pub fn elapsed_seconds(started_at: DateTime<Utc>, until: DateTime<Utc>) -> i64 {
    (until - started_at).num_seconds().max(0)
}

/// Calendar day of `now` on the agency's wall clock.
pub fn local_today(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// UTC instant at which local `day` begins.
pub fn local_day_start(day: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local_midnight = day.and_time(NaiveTime::MIN);
    (local_midnight - TimeDelta::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

/// Seconds tracked on local `day`: closed logs started that day contribute
/// their stored duration, a running log contributes the part of its elapsed
/// time that falls inside the day, even when it was started the day before.
pub fn total_seconds_on(
    logs: &[TimeLog],
    day: NaiveDate,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> i64 {
    let day_start = local_day_start(day, offset);
    let day_end = day_start + TimeDelta::days(1);
    logs.iter()
        .map(|log| match log.ended_at {
            Some(ended_at) if local_today(log.started_at, offset) == day => log
                .duration_seconds
                .unwrap_or_else(|| elapsed_seconds(log.started_at, ended_at)),
            Some(_) => 0,
            None => elapsed_seconds(log.started_at.max(day_start), now.min(day_end)),
        })
        .sum()
}

/// Close every running log and open a new one for `task_id`.
pub async fn start(
    pool: &SqlitePool,
    task_id: Uuid,
    note: Option<&str>,
    now: DateTime<Utc>,
) -> Result<TimerStart, TimerError> {
    let mut tx = pool.begin().await?;

    if !Task::exists(&mut *tx, task_id).await? {
        return Err(TimerError::TaskNotFound(task_id));
    }

    let mut stopped = Vec::new();
    for open in TimeLog::find_open(&mut *tx).await? {
        let duration = elapsed_seconds(open.started_at, now);
        stopped.push(TimeLog::close(&mut *tx, open.id, now, duration).await?);
    }

    let started = TimeLog::open(&mut *tx, task_id, now, note).await?;
    tx.commit().await?;

    info!(
        task_id = %task_id,
        time_log_id = %started.id,
        stopped = stopped.len(),
        "Timer started"
    );
    Ok(TimerStart { stopped, started })
}

/// Close every running log. Returns an empty list when nothing was running.
pub async fn stop(pool: &SqlitePool, now: DateTime<Utc>) -> Result<Vec<TimeLog>, TimerError> {
    let mut tx = pool.begin().await?;
    let mut stopped = Vec::new();
    for open in TimeLog::find_open(&mut *tx).await? {
        let duration = elapsed_seconds(open.started_at, now);
        stopped.push(TimeLog::close(&mut *tx, open.id, now, duration).await?);
    }
    tx.commit().await?;

    if stopped.is_empty() {
        debug!("Stop requested with no running timer");
    } else {
        info!(stopped = stopped.len(), "Timer stopped");
    }
    Ok(stopped)
}

/// Total tracked today (local time) plus the running log, if any.
pub async fn today_summary(
    pool: &SqlitePool,
    offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<TodaySummary, TimerError> {
    let today = local_today(now, offset);
    let logs = TimeLog::find_started_since(pool, local_day_start(today, offset)).await?;
    let total_seconds = total_seconds_on(&logs, today, offset, now);
    let running = logs.into_iter().find(TimeLog::is_open);

    Ok(TodaySummary {
        date: today,
        total_seconds,
        running,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 12, h, m, s).unwrap()
    }

    fn log(started_at: DateTime<Utc>, ended_at: Option<DateTime<Utc>>) -> TimeLog {
        TimeLog {
            id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            started_at,
            ended_at,
            duration_seconds: ended_at.map(|end| elapsed_seconds(started_at, end)),
            note: None,
            created_at: started_at,
        }
    }

    #[test]
    fn test_elapsed_seconds_truncates_and_clamps() {
        let start = at(9, 0, 0);
        assert_eq!(elapsed_seconds(start, at(9, 1, 30)), 90);
        assert_eq!(
            elapsed_seconds(start, start + TimeDelta::milliseconds(1999)),
            1
        );
        assert_eq!(elapsed_seconds(start, at(8, 59, 0)), 0);
    }

    #[test]
    fn test_total_sums_closed_and_running_logs() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let logs = vec![
            log(at(8, 0, 0), Some(at(8, 30, 0))),
            log(at(10, 0, 0), Some(at(10, 0, 45))),
            log(at(11, 0, 0), None),
        ];
        let now = at(11, 10, 0);
        assert_eq!(total_seconds_on(&logs, day, utc, now), 1800 + 45 + 600);
    }

    #[test]
    fn test_total_ignores_other_local_days() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        // UTC-5: 03:00Z on the 12th is still the 11th locally.
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let logs = vec![
            log(at(3, 0, 0), Some(at(3, 20, 0))),
            log(at(6, 0, 0), Some(at(6, 20, 0))),
        ];
        assert_eq!(total_seconds_on(&logs, day, offset, at(12, 0, 0)), 1200);
    }

    #[test]
    fn test_running_log_across_midnight_counts_from_day_start() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let started = Utc.with_ymd_and_hms(2025, 3, 11, 23, 0, 0).unwrap();
        let logs = vec![log(started, None)];
        assert_eq!(total_seconds_on(&logs, today, utc, at(1, 0, 0)), 3600);

        // Yesterday only gets the hour before midnight.
        let yesterday = today.pred_opt().unwrap();
        assert_eq!(total_seconds_on(&logs, yesterday, utc, at(1, 0, 0)), 3600);
    }

    #[test]
    fn test_local_day_start_respects_offset() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        assert_eq!(
            local_day_start(day, plus_two),
            Utc.with_ymd_and_hms(2025, 3, 11, 22, 0, 0).unwrap()
        );
        assert_eq!(local_today(at(23, 0, 0), plus_two), day.succ_opt().unwrap());
    }
}
