use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// An ordered milestone inside a project.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Step {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i64,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateStep {
    pub project_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    /// Appended after the last step when omitted.
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateStep {
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<i64>,
    pub is_completed: Option<bool>,
}

impl Step {
    pub async fn find_by_project_id(
        pool: &SqlitePool,
        project_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Step>(
            "SELECT * FROM steps WHERE project_id = $1 ORDER BY position ASC, rowid ASC",
        )
        .bind(project_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Step>("SELECT * FROM steps WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create<'e, E>(executor: E, data: &CreateStep) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Step>(
            r#"INSERT INTO steps (id, project_id, title, description, position)
               VALUES (
                   $1, $2, $3, $4,
                   COALESCE($5, (SELECT COALESCE(MAX(position) + 1, 0) FROM steps WHERE project_id = $2))
               )
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(data.project_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.position)
        .fetch_one(executor)
        .await
    }

    pub async fn update(pool: &SqlitePool, id: Uuid, data: &UpdateStep) -> Result<Self, sqlx::Error> {
        let existing = Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let title = data.title.as_ref().unwrap_or(&existing.title);
        let description = data.description.clone().or(existing.description);
        let position = data.position.unwrap_or(existing.position);
        let is_completed = data.is_completed.unwrap_or(existing.is_completed);

        sqlx::query_as::<_, Step>(
            r#"UPDATE steps
               SET title = $2, description = $3, position = $4, is_completed = $5,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(position)
        .bind(is_completed)
        .fetch_one(pool)
        .await
    }

    /// Flip the completion flag, returning the updated row.
    pub async fn toggle(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Step>(
            r#"UPDATE steps
               SET is_completed = NOT is_completed, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM steps WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
