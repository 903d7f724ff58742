use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct SocialLink {
    pub id: Uuid,
    pub platform: String,
    pub url: String,
    pub icon: Option<String>,
    pub position: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateSocialLink {
    pub platform: String,
    pub url: String,
    pub icon: Option<String>,
    #[serde(default)]
    pub position: i64,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateSocialLink {
    pub platform: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub position: Option<i64>,
}

impl SocialLink {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, SocialLink>(
            "SELECT * FROM social_links ORDER BY position ASC, platform ASC",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SocialLink>("SELECT * FROM social_links WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateSocialLink) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, SocialLink>(
            r#"INSERT INTO social_links (id, platform, url, icon, position)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.platform)
        .bind(&data.url)
        .bind(&data.icon)
        .bind(data.position)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateSocialLink,
    ) -> Result<Self, sqlx::Error> {
        let existing = Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let platform = data.platform.as_ref().unwrap_or(&existing.platform);
        let url = data.url.as_ref().unwrap_or(&existing.url);
        let icon = data.icon.clone().or(existing.icon);
        let position = data.position.unwrap_or(existing.position);

        sqlx::query_as::<_, SocialLink>(
            r#"UPDATE social_links
               SET platform = $2, url = $3, icon = $4, position = $5,
                   updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(platform)
        .bind(url)
        .bind(icon)
        .bind(position)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM social_links WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
