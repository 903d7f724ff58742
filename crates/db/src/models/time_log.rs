use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// One stretch of tracked work on a task. `ended_at` is NULL while the
/// timer is running.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct TimeLog {
    pub id: Uuid,
    pub task_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TimeLog {
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    pub async fn find_by_task_id(
        pool: &SqlitePool,
        task_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, TimeLog>(
            "SELECT * FROM time_logs WHERE task_id = $1 ORDER BY started_at DESC",
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, TimeLog>("SELECT * FROM time_logs ORDER BY started_at DESC LIMIT $1")
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, TimeLog>("SELECT * FROM time_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Logs started at or after `since`, plus any log still running.
    pub async fn find_started_since(
        pool: &SqlitePool,
        since: DateTime<Utc>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, TimeLog>(
            r#"SELECT * FROM time_logs
               WHERE started_at >= $1 OR ended_at IS NULL
               ORDER BY started_at ASC"#,
        )
        .bind(since)
        .fetch_all(pool)
        .await
    }

    pub async fn find_open<'e, E>(executor: E) -> Result<Vec<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, TimeLog>(
            "SELECT * FROM time_logs WHERE ended_at IS NULL ORDER BY started_at ASC",
        )
        .fetch_all(executor)
        .await
    }

    pub async fn close<'e, E>(
        executor: E,
        id: Uuid,
        ended_at: DateTime<Utc>,
        duration_seconds: i64,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, TimeLog>(
            r#"UPDATE time_logs
               SET ended_at = $2, duration_seconds = $3
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(ended_at)
        .bind(duration_seconds)
        .fetch_one(executor)
        .await
    }

    pub async fn open<'e, E>(
        executor: E,
        task_id: Uuid,
        started_at: DateTime<Utc>,
        note: Option<&str>,
    ) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, TimeLog>(
            r#"INSERT INTO time_logs (id, task_id, started_at, note)
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(task_id)
        .bind(started_at)
        .bind(note)
        .fetch_one(executor)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM time_logs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
