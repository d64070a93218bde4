//! Keyword repository.
//!
//! `search_urls` holds the keywords the crawler searches for and is the only
//! keyword table this service writes. `key_words` is a read-only export.

use crate::database::Database;
use crate::error::{DbError, Result};
use std::sync::Arc;
use tubescope_common::listing::PageRequest;
use tubescope_common::models::{Keyword, KeywordExport, Page};

const KEYWORD_COLUMNS: &str = "
    CAST(id AS SIGNED) AS id,
    key_words,
    CAST(last_crawl_time AS DATETIME) AS last_crawl_time,
    CAST(created_at AS DATETIME) AS created_at";

/// Repository for keyword operations.
#[derive(Clone)]
pub struct KeywordRepository {
    db: Arc<Database>,
}

impl KeywordRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Newest keywords first.
    pub async fn page(&self, page: PageRequest) -> Result<Page<Keyword>> {
        let sql = format!(
            "SELECT {} FROM search_urls ORDER BY created_at DESC LIMIT ? OFFSET ?",
            KEYWORD_COLUMNS
        );
        let rows = sqlx::query_as::<_, Keyword>(&sql)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(self.db.pool());
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) AS total FROM search_urls")
            .fetch_one(self.db.pool());

        let (data, total) = tokio::try_join!(rows, count)?;
        Ok(Page { data, total })
    }

    /// The most recent `limit` keywords, for the tag cloud.
    pub async fn recent(&self, limit: u32) -> Result<Vec<Keyword>> {
        let sql = format!(
            "SELECT {} FROM search_urls ORDER BY created_at DESC LIMIT ?",
            KEYWORD_COLUMNS
        );
        let rows = sqlx::query_as::<_, Keyword>(&sql)
            .bind(limit)
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows)
    }

    /// Insert a keyword. A keyword that already exists is `DbError::Duplicate`.
    pub async fn create(&self, key_words: &str) -> Result<u64> {
        let result = sqlx::query("INSERT INTO search_urls (key_words) VALUES (?)")
            .bind(key_words)
            .execute(self.db.pool())
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::Duplicate(_) => DbError::Duplicate(key_words.to_string()),
                other => other,
            })?;

        tracing::info!(id = result.last_insert_id(), key_words, "keyword created");
        Ok(result.last_insert_id())
    }

    /// Delete by id. Returns whether a row was removed.
    pub async fn delete(&self, id: u64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM search_urls WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await?;
        tracing::info!(id, removed = result.rows_affected(), "keyword delete");
        Ok(result.rows_affected() > 0)
    }

    /// Every row of the `key_words` export, highest id first.
    pub async fn all_exports(&self) -> Result<Vec<KeywordExport>> {
        let rows = sqlx::query_as::<_, KeywordExport>(
            "SELECT CAST(id AS SIGNED) AS id, key_words,
                    CAST(last_crawl_date AS DATETIME) AS last_crawl_date
             FROM key_words
             ORDER BY id DESC",
        )
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows)
    }
}
