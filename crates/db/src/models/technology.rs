use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// An entry on the "Technologies" page, grouped by `category` in the UI.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Technology {
    pub id: Uuid,
    pub lang: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateTechnology {
    pub lang: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    #[serde(default)]
    pub position: i64,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateTechnology {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub position: Option<i64>,
}

impl Technology {
    pub async fn find_all(pool: &SqlitePool, lang: Option<&str>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Technology>(
            r#"SELECT * FROM technologies
               WHERE ($1 IS NULL OR lang = $1)
               ORDER BY lang ASC, category ASC, position ASC, name ASC"#,
        )
        .bind(lang)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Technology>("SELECT * FROM technologies WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateTechnology) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Technology>(
            r#"INSERT INTO technologies (id, lang, name, category, description, icon_url, position)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.lang)
        .bind(&data.name)
        .bind(&data.category)
        .bind(&data.description)
        .bind(&data.icon_url)
        .bind(data.position)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateTechnology,
    ) -> Result<Self, sqlx::Error> {
        let existing = Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let name = data.name.as_ref().unwrap_or(&existing.name);
        let category = data.category.as_ref().unwrap_or(&existing.category);
        let description = data.description.clone().or(existing.description);
        let icon_url = data.icon_url.clone().or(existing.icon_url);
        let position = data.position.unwrap_or(existing.position);

        sqlx::query_as::<_, Technology>(
            r#"UPDATE technologies
               SET name = $2, category = $3, description = $4, icon_url = $5, position = $6,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(name)
        .bind(category)
        .bind(description)
        .bind(icon_url)
        .bind(position)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM technologies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
