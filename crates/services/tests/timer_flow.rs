//! Timer start/stop against a real database.

use chrono::{FixedOffset, TimeZone, Utc};
use db::{
    models::{
        task::{CreateTask, Task},
        time_log::TimeLog,
    },
    test_utils::create_test_pool,
};
use services::services::timer::{self, TimerError};
use uuid::Uuid;

#[tokio::test]
async fn starting_a_timer_closes_the_running_one() {
    let (pool, _dir) = create_test_pool().await;
    let design = Task::create(&pool, &CreateTask::from_title("Design")).await.unwrap();
    let build = Task::create(&pool, &CreateTask::from_title("Build")).await.unwrap();

    let t0 = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();
    let first = timer::start(&pool, design.id, Some("wireframes"), t0).await.unwrap();
    assert!(first.stopped.is_empty());
    assert!(first.started.is_open());
    assert_eq!(first.started.note.as_deref(), Some("wireframes"));

    let t1 = t0 + chrono::Duration::minutes(25);
    let second = timer::start(&pool, build.id, None, t1).await.unwrap();
    assert_eq!(second.stopped.len(), 1);
    let closed = &second.stopped[0];
    assert_eq!(closed.id, first.started.id);
    assert_eq!(closed.ended_at, Some(t1));
    assert_eq!(closed.duration_seconds, Some(25 * 60));

    let open = TimeLog::find_open(&pool).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].task_id, build.id);
}

#[tokio::test]
async fn starting_a_timer_for_missing_task_changes_nothing() {
    let (pool, _dir) = create_test_pool().await;
    let task = Task::create(&pool, &CreateTask::from_title("Copy")).await.unwrap();
    let t0 = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();
    timer::start(&pool, task.id, None, t0).await.unwrap();

    let missing = Uuid::new_v4();
    let err = timer::start(&pool, missing, None, t0 + chrono::Duration::minutes(5))
        .await
        .unwrap_err();
    assert!(matches!(err, TimerError::TaskNotFound(id) if id == missing));

    let open = TimeLog::find_open(&pool).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].task_id, task.id);
}

#[tokio::test]
async fn stop_closes_everything_and_is_idempotent() {
    let (pool, _dir) = create_test_pool().await;
    let task = Task::create(&pool, &CreateTask::from_title("Review")).await.unwrap();
    let t0 = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();
    timer::start(&pool, task.id, None, t0).await.unwrap();

    let stopped = timer::stop(&pool, t0 + chrono::Duration::seconds(90)).await.unwrap();
    assert_eq!(stopped.len(), 1);
    assert_eq!(stopped[0].duration_seconds, Some(90));

    let again = timer::stop(&pool, t0 + chrono::Duration::seconds(120)).await.unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn today_summary_adds_running_elapsed_time() {
    let (pool, _dir) = create_test_pool().await;
    let task = Task::create(&pool, &CreateTask::from_title("Support")).await.unwrap();
    let utc = FixedOffset::east_opt(0).unwrap();

    let yesterday = Utc.with_ymd_and_hms(2025, 3, 11, 15, 0, 0).unwrap();
    timer::start(&pool, task.id, None, yesterday).await.unwrap();
    timer::stop(&pool, yesterday + chrono::Duration::hours(1)).await.unwrap();

    let t0 = Utc.with_ymd_and_hms(2025, 3, 12, 9, 0, 0).unwrap();
    timer::start(&pool, task.id, None, t0).await.unwrap();
    timer::stop(&pool, t0 + chrono::Duration::minutes(30)).await.unwrap();
    let running = timer::start(&pool, task.id, None, t0 + chrono::Duration::hours(1))
        .await
        .unwrap();

    let now = t0 + chrono::Duration::hours(1) + chrono::Duration::minutes(10);
    let summary = timer::today_summary(&pool, utc, now).await.unwrap();
    assert_eq!(summary.total_seconds, 30 * 60 + 10 * 60);
    assert_eq!(summary.running.map(|log| log.id), Some(running.started.id));
}
