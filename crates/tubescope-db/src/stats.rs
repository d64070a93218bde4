//! Dashboard counters.

use crate::database::Database;
use crate::error::Result;
use std::sync::Arc;
use tubescope_common::models::{DashboardStats, MonthlyCount};

#[derive(Clone)]
pub struct StatsRepository {
    db: Arc<Database>,
}

impl StatsRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn dashboard(&self) -> Result<DashboardStats> {
        let pool = self.db.pool();
        let videos = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM videos").fetch_one(pool);
        let channels = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT channel_id) FROM channel_crawl",
        )
        .fetch_one(pool);
        let benchmarks = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM channel_base WHERE is_benchmark = 1",
        )
        .fetch_one(pool);
        let keywords = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM search_urls").fetch_one(pool);

        let (video_count, channel_count, benchmark_channel_count, keyword_count) =
            tokio::try_join!(videos, channels, benchmarks, keywords)?;

        Ok(DashboardStats { video_count, channel_count, benchmark_channel_count, keyword_count })
    }

    /// Videos published per month over the last `months` months, oldest first.
    /// Months without videos are absent; the dashboard fills them with zero.
    pub async fn videos_per_month(&self, months: u32) -> Result<Vec<MonthlyCount>> {
        let rows = sqlx::query_as::<_, MonthlyCount>(
            "SELECT DATE_FORMAT(published_date, '%Y-%m') AS month, COUNT(*) AS videos
             FROM videos
             WHERE published_date >= DATE_SUB(DATE_FORMAT(CURDATE(), '%Y-%m-01'), INTERVAL ? MONTH)
             GROUP BY month
             ORDER BY month",
        )
        .bind(months.saturating_sub(1))
        .fetch_all(self.db.pool())
        .await?;
        Ok(rows)
    }
}
