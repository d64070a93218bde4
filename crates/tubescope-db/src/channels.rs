//! Channel repository.
//!
//! Reads crawl snapshots from `channel_crawl` and flips the benchmark /
//! blacklist flags kept in `channel_base`.

use crate::database::Database;
use crate::error::Result;
use sqlx::{MySql, QueryBuilder};
use std::sync::Arc;
use tubescope_common::listing::{ChannelSortField, PageRequest, Sort};
use tubescope_common::models::{ChannelSearchPage, ChannelSnapshot, ChannelSummary};

/// Columns of a snapshot, normalised to BIGINT / DOUBLE / DATE / DATETIME.
const SNAPSHOT_COLUMNS: &str = "
    channel_id,
    channel_name,
    description,
    canonical_base_url,
    CAST(subscriber_count AS SIGNED) AS subscriber_count,
    CAST(video_count AS SIGNED) AS video_count,
    CAST(view_count AS SIGNED) AS view_count,
    CAST(joined_date AS DATE) AS joined_date,
    country,
    CAST(crawl_date AS DATETIME) AS crawl_date,
    CAST(avg_view_count AS DOUBLE) AS avg_view_count,
    CAST(avg_subscriber_increase AS DOUBLE) AS avg_subscriber_increase,
    CAST(daily_view_increase AS SIGNED) AS daily_view_increase";

/// Restricts `c1` to the newest snapshot of each channel.
const LATEST_SNAPSHOT_JOIN: &str = "
    FROM channel_crawl c1
    INNER JOIN (
        SELECT channel_id, MAX(crawl_date) AS latest_date
        FROM channel_crawl
        GROUP BY channel_id
    ) c2 ON c1.channel_id = c2.channel_id AND c1.crawl_date = c2.latest_date";

/// Channel search criteria.
#[derive(Debug, Clone)]
pub struct ChannelSearch {
    /// Substring of the channel name.
    pub name: Option<String>,
    /// Only channels that joined within this many days; `<= 0` disables.
    pub joined_days: i64,
    /// Minimum total views; `<= 0` disables.
    pub min_view_count: i64,
    pub page: PageRequest,
    pub sort: Sort<ChannelSortField>,
}

impl Default for ChannelSearch {
    fn default() -> Self {
        Self {
            name: None,
            joined_days: 0,
            min_view_count: 0,
            page: PageRequest::new(1, 20, 100),
            sort: Sort::default(),
        }
    }
}

impl ChannelSearch {
    fn push_filters<'a>(&'a self, qb: &mut QueryBuilder<'a, MySql>) {
        let mut first = true;
        let mut clause = |qb: &mut QueryBuilder<'a, MySql>| {
            qb.push(if first { " WHERE " } else { " AND " });
            first = false;
        };

        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            clause(qb);
            qb.push("c1.channel_name LIKE ").push_bind(format!("%{}%", name));
        }
        if self.joined_days > 0 {
            clause(qb);
            qb.push("c1.joined_date >= DATE_SUB(CURDATE(), INTERVAL ")
                .push_bind(self.joined_days)
                .push(" DAY)");
        }
        if self.min_view_count > 0 {
            clause(qb);
            qb.push("c1.view_count >= ").push_bind(self.min_view_count);
        }
    }

    pub fn count_query(&self) -> QueryBuilder<'_, MySql> {
        let mut qb = QueryBuilder::new("SELECT COUNT(DISTINCT c1.channel_id) AS total");
        qb.push(LATEST_SNAPSHOT_JOIN);
        self.push_filters(&mut qb);
        qb
    }

    pub fn page_query(&self) -> QueryBuilder<'_, MySql> {
        let mut qb = QueryBuilder::new(
            "SELECT DISTINCT
                c1.channel_id,
                c1.channel_name,
                CAST(c1.subscriber_count AS SIGNED) AS subscriber_count,
                CAST(c1.video_count AS SIGNED) AS video_count,
                CAST(c1.view_count AS SIGNED) AS view_count,
                CAST(c1.joined_date AS DATE) AS joined_date,
                c1.country,
                CAST(c1.avg_view_count AS DOUBLE) AS avg_view_count,
                CAST(c1.daily_view_increase AS SIGNED) AS daily_view_increase,
                CAST(c1.crawl_date AS DATETIME) AS crawl_date,
                CAST(cb.is_benchmark AS SIGNED) AS is_benchmark",
        );
        qb.push(LATEST_SNAPSHOT_JOIN);
        qb.push(" LEFT JOIN channel_base cb ON c1.channel_id = cb.channel_id");
        self.push_filters(&mut qb);
        // Column and direction come from closed enums, never from the request.
        // DISTINCT needs ORDER BY on output columns; channel_id breaks ties.
        qb.push(" ORDER BY ")
            .push(self.sort.field.name())
            .push(" ")
            .push(self.sort.direction.as_sql())
            .push(", channel_id ASC");
        qb.push(" LIMIT ")
            .push_bind(self.page.limit())
            .push(" OFFSET ")
            .push_bind(self.page.offset());
        qb
    }
}

/// What a blacklist call touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlacklistOutcome {
    pub flagged: u64,
    pub snapshots_deleted: u64,
}

/// Repository for channel operations.
#[derive(Clone)]
pub struct ChannelRepository {
    db: Arc<Database>,
}

impl ChannelRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Paginated search over the latest snapshot of every channel.
    pub async fn search(&self, search: &ChannelSearch) -> Result<ChannelSearchPage> {
        let total: i64 = search
            .count_query()
            .build_query_scalar()
            .fetch_one(self.db.pool())
            .await?;

        let results: Vec<ChannelSummary> = search
            .page_query()
            .build_query_as()
            .fetch_all(self.db.pool())
            .await?;

        tracing::debug!(total, returned = results.len(), "channel search");

        Ok(ChannelSearchPage {
            results,
            total,
            current_page: search.page.page,
            page_size: search.page.page_size,
            total_pages: search.page.total_pages(total),
        })
    }

    /// Every snapshot of a channel, newest first.
    pub async fn history(&self, channel_id: &str) -> Result<Vec<ChannelSnapshot>> {
        let sql = format!(
            "SELECT {} FROM channel_crawl WHERE channel_id = ? ORDER BY crawl_date DESC",
            SNAPSHOT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ChannelSnapshot>(&sql)
            .bind(channel_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows)
    }

    /// Benchmark flag of a channel; unknown channels are not benchmarks.
    pub async fn is_benchmark(&self, channel_id: &str) -> Result<bool> {
        let flag: Option<Option<i64>> = sqlx::query_scalar(
            "SELECT CAST(is_benchmark AS SIGNED) FROM channel_base WHERE channel_id = ?",
        )
        .bind(channel_id)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(flag.flatten() == Some(1))
    }

    /// Set or clear the benchmark flag. Returns the number of rows matched.
    pub async fn set_benchmark(&self, channel_id: &str, benchmark: bool) -> Result<u64> {
        let result = sqlx::query("UPDATE channel_base SET is_benchmark = ? WHERE channel_id = ?")
            .bind(if benchmark { 1i32 } else { 0i32 })
            .bind(channel_id)
            .execute(self.db.pool())
            .await?;
        tracing::info!(channel_id, benchmark, rows = result.rows_affected(), "benchmark flag updated");
        Ok(result.rows_affected())
    }

    /// Flag a channel as blacklisted and drop its crawl history, atomically.
    pub async fn blacklist(&self, channel_id: &str) -> Result<BlacklistOutcome> {
        let mut tx = self.db.pool().begin().await?;

        let flagged = sqlx::query("UPDATE channel_base SET is_blacklist = 1 WHERE channel_id = ?")
            .bind(channel_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let snapshots_deleted = sqlx::query("DELETE FROM channel_crawl WHERE channel_id = ?")
            .bind(channel_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        tracing::info!(channel_id, flagged, snapshots_deleted, "channel blacklisted");
        Ok(BlacklistOutcome { flagged, snapshots_deleted })
    }
}
