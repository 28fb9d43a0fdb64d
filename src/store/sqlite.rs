//! SQLite-backed record source.

use super::records::{RecordSource, SeoRecord};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use log::info;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Reads `seo_settings(key, data, updated_at)` and `seo_pages(slug, data)`.
/// `data` columns hold JSON text; `updated_at` is epoch milliseconds.
#[derive(Debug, Clone)]
pub struct SqliteRecords {
    pool: SqlitePool,
}

impl SqliteRecords {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(url)
            .await?;
        info!("Connected to SEO record database {url}");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create both tables if they do not exist yet.
    pub async fn init_schema(&self) -> StoreResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS seo_settings (
                key TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                updated_at INTEGER
            )",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS seo_pages (
                slug TEXT PRIMARY KEY,
                data TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn upsert_record(&self, key: &str, data: &Value, updated_at: i64) -> StoreResult<()> {
        sqlx::query("INSERT OR REPLACE INTO seo_settings (key, data, updated_at) VALUES (?, ?, ?)")
            .bind(key)
            .bind(data.to_string())
            .bind(updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn upsert_page(&self, slug: &str, data: &Value) -> StoreResult<()> {
        sqlx::query("INSERT OR REPLACE INTO seo_pages (slug, data) VALUES (?, ?)")
            .bind(slug)
            .bind(data.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn parse_data(name: &str, raw: &str) -> StoreResult<Value> {
    serde_json::from_str(raw).map_err(|e| StoreError::json(name, e))
}

#[async_trait]
impl RecordSource for SqliteRecords {
    async fn fetch_record(&self, key: &str) -> StoreResult<Option<SeoRecord>> {
        let row: Option<(String, Option<i64>)> =
            sqlx::query_as("SELECT data, updated_at FROM seo_settings WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some((data, updated_at)) => Ok(Some(SeoRecord {
                key: key.to_owned(),
                data: parse_data(key, &data)?,
                updated_at,
            })),
            None => Ok(None),
        }
    }

    async fn fetch_page(&self, slug: &str) -> StoreResult<Option<Value>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT data FROM seo_pages WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|(data,)| parse_data(slug, &data)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn memory_db() -> SqliteRecords {
        // One connection: every in-memory connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let records = SqliteRecords::new(pool);
        records.init_schema().await.unwrap();
        records
    }

    #[tokio::test]
    async fn missing_rows_are_none() {
        let db = memory_db().await;
        assert!(db.fetch_record("seo:global").await.unwrap().is_none());
        assert!(db.fetch_page("privacy").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn records_round_trip_through_the_table() {
        let db = memory_db().await;
        db.upsert_record("seo:global", &json!({ "brand": { "siteName": "Acme" } }), 42)
            .await
            .unwrap();
        let record = db.fetch_record("seo:global").await.unwrap().unwrap();
        assert_eq!(record.updated_at, Some(42));
        assert_eq!(record.data["brand"]["siteName"], "Acme");

        db.upsert_record("seo:global", &json!({}), 43).await.unwrap();
        let record = db.fetch_record("seo:global").await.unwrap().unwrap();
        assert_eq!(record.updated_at, Some(43));
    }

    #[tokio::test]
    async fn corrupt_data_is_an_error() {
        let db = memory_db().await;
        sqlx::query("INSERT INTO seo_pages (slug, data) VALUES ('terms', '{oops')")
            .execute(db.pool())
            .await
            .unwrap();
        assert!(matches!(
            db.fetch_page("terms").await,
            Err(StoreError::Json { .. })
        ));
    }
}
