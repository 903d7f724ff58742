use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, Eq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "task_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Task {
    pub id: Uuid,
    pub project_id: Option<Uuid>,
    pub step_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateTask {
    pub project_id: Option<Uuid>,
    pub step_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
}

impl CreateTask {
    pub fn from_title(title: impl Into<String>) -> Self {
        Self {
            project_id: None,
            step_id: None,
            title: title.into(),
            description: None,
            status: None,
            priority: None,
            due_date: None,
            due_time: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateTask {
    pub project_id: Option<Uuid>,
    pub step_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
}

impl Task {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_project_id(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE project_id = $1 ORDER BY created_at DESC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    /// Tasks due on a single day (the daily planner view).
    pub async fn find_by_due_date(
        pool: &SqlitePool,
        date: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE due_date = $1 ORDER BY due_time ASC, title ASC",
        )
        .bind(date)
        .fetch_all(pool)
        .await
    }

    /// Tasks for the weekly planner: everything still open, plus finished
    /// tasks dated from `today` on.
    pub async fn find_for_week(
        pool: &SqlitePool,
        today: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"SELECT * FROM tasks
               WHERE status != 'done' OR (due_date IS NOT NULL AND due_date >= $1)
               ORDER BY due_date ASC, due_time ASC, title ASC"#,
        )
        .bind(today)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let found: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM tasks WHERE id = $1)")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(found != 0)
    }

    pub async fn create(pool: &SqlitePool, data: &CreateTask) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"INSERT INTO tasks (id, project_id, step_id, title, description, status, priority, due_date, due_time)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.project_id)
        .bind(data.step_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.status.unwrap_or_default())
        .bind(data.priority.unwrap_or_default())
        .bind(data.due_date)
        .bind(data.due_time)
        .fetch_one(pool)
        .await
    }

    pub async fn update(pool: &SqlitePool, id: Uuid, data: &UpdateTask) -> Result<Self, sqlx::Error> {
        let existing = Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let project_id = data.project_id.or(existing.project_id);
        let step_id = data.step_id.or(existing.step_id);
        let title = data.title.as_ref().unwrap_or(&existing.title);
        let description = data.description.clone().or(existing.description);
        let status = data.status.unwrap_or(existing.status);
        let priority = data.priority.unwrap_or(existing.priority);
        let due_date = data.due_date.or(existing.due_date);
        let due_time = data.due_time.or(existing.due_time);

        sqlx::query_as::<_, Task>(
            r#"UPDATE tasks
               SET project_id = $2, step_id = $3, title = $4, description = $5,
                   status = $6, priority = $7, due_date = $8, due_time = $9,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(project_id)
        .bind(step_id)
        .bind(title)
        .bind(description)
        .bind(status)
        .bind(priority)
        .bind(due_date)
        .bind(due_time)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_open(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE status != 'done'")
            .fetch_one(pool)
            .await
    }
}
