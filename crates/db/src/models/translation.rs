use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

/// A UI string for one language. `(lang, key)` is unique.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Translation {
    pub id: Uuid,
    pub lang: String,
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct CreateTranslation {
    pub lang: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
pub struct UpdateTranslation {
    pub key: Option<String>,
    pub value: Option<String>,
}

impl Translation {
    pub async fn find_all(pool: &SqlitePool, lang: Option<&str>) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Translation>(
            r#"SELECT * FROM translations
               WHERE ($1 IS NULL OR lang = $1)
               ORDER BY lang ASC, key ASC"#,
        )
        .bind(lang)
        .fetch_all(pool)
        .await
    }

    /// `key -> value` dictionary consumed by the frontend i18n layer.
    pub async fn dictionary(
        pool: &SqlitePool,
        lang: &str,
    ) -> Result<BTreeMap<String, String>, sqlx::Error> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM translations WHERE lang = $1")
                .bind(lang)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().collect())
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Translation>("SELECT * FROM translations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, data: &CreateTranslation) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Translation>(
            r#"INSERT INTO translations (id, lang, key, value)
               VALUES ($1, $2, $3, $4)
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.lang)
        .bind(&data.key)
        .bind(&data.value)
        .fetch_one(pool)
        .await
    }

    /// Insert or overwrite the value for `(lang, key)`.
    pub async fn upsert<'e, E>(executor: E, data: &CreateTranslation) -> Result<Self, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Translation>(
            r#"INSERT INTO translations (id, lang, key, value)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (lang, key) DO UPDATE SET
                   value = excluded.value,
                   updated_at = datetime('now', 'subsec')
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.lang)
        .bind(&data.key)
        .bind(&data.value)
        .fetch_one(executor)
        .await
    }

    /// Upsert a batch atomically.
    pub async fn upsert_many(
        pool: &SqlitePool,
        items: &[CreateTranslation],
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut saved = Vec::with_capacity(items.len());
        for item in items {
            saved.push(Self::upsert(&mut *tx, item).await?);
        }
        tx.commit().await?;
        Ok(saved)
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateTranslation,
    ) -> Result<Self, sqlx::Error> {
        let existing = Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        let key = data.key.as_ref().unwrap_or(&existing.key);
        let value = data.value.as_ref().unwrap_or(&existing.value);

        sqlx::query_as::<_, Translation>(
            r#"UPDATE translations
               SET key = $2, value = $3, updated_at = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(key)
        .bind(value)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM translations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
