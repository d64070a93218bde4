//! Video repository.

use crate::database::Database;
use crate::error::{DbError, Result};
use chrono::{Days, NaiveDate};
use sqlx::{MySql, QueryBuilder};
use std::sync::Arc;
use tubescope_common::listing::{PageRequest, Sort, VideoSortField};
use tubescope_common::models::{GroupedVideo, Page, Video};

const VIDEO_COLUMNS: &str = "
    CAST(id AS SIGNED) AS id,
    video_id,
    title,
    CAST(view_count AS SIGNED) AS view_count,
    CAST(published_date AS DATETIME) AS published_date,
    channel_id,
    channel_name,
    canonical_base_url";

/// Numbers every video by (videos in its channel DESC, channel_id,
/// view_count DESC), so consecutive row numbers walk channel by channel,
/// biggest channels first.
const GROUPED_VIDEOS_SQL: &str = "
    WITH channel_sizes AS (
        SELECT channel_id, COUNT(*) AS channel_videos
        FROM videos
        GROUP BY channel_id
    ),
    numbered AS (
        SELECT v.*,
            ROW_NUMBER() OVER (
                ORDER BY COALESCE(s.channel_videos, 0) DESC,
                         v.channel_id,
                         v.view_count DESC
            ) AS global_row_num
        FROM videos v
        LEFT JOIN channel_sizes s ON s.channel_id = v.channel_id
    )
    SELECT
        CAST(id AS SIGNED) AS id,
        video_id,
        title,
        CAST(view_count AS SIGNED) AS view_count,
        CAST(published_date AS DATETIME) AS published_date,
        channel_id,
        channel_name,
        canonical_base_url,
        CAST(global_row_num AS SIGNED) AS global_row_num
    FROM numbered
    WHERE global_row_num BETWEEN ? AND ?
    ORDER BY global_row_num";

/// Video list filters. All optional.
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    pub channel_id: Option<String>,
    /// Published on or after this day.
    pub start_date: Option<NaiveDate>,
    /// Published on or before this day (the whole day counts).
    pub end_date: Option<NaiveDate>,
    pub min_views: Option<i64>,
}

impl VideoFilter {
    fn push_where<'a>(&'a self, qb: &mut QueryBuilder<'a, MySql>) {
        qb.push(" WHERE 1=1");
        if let Some(channel_id) = self.channel_id.as_deref().filter(|c| !c.is_empty()) {
            qb.push(" AND channel_id = ").push_bind(channel_id);
        }
        if let Some(start) = self.start_date {
            qb.push(" AND published_date >= ").push_bind(start);
        }
        if let Some(end) = self.end_date {
            match end.checked_add_days(Days::new(1)) {
                Some(next_day) => qb.push(" AND published_date < ").push_bind(next_day),
                None => qb.push(" AND published_date <= ").push_bind(end),
            };
        }
        if let Some(min_views) = self.min_views.filter(|v| *v > 0) {
            qb.push(" AND view_count >= ").push_bind(min_views);
        }
    }

    pub fn count_query(&self) -> QueryBuilder<'_, MySql> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) AS total FROM videos");
        self.push_where(&mut qb);
        qb
    }

    pub fn page_query(&self, page: PageRequest, sort: Option<Sort<VideoSortField>>) -> QueryBuilder<'_, MySql> {
        let sort = sort.unwrap_or_default();
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(VIDEO_COLUMNS).push(" FROM videos");
        self.push_where(&mut qb);
        qb.push(" ORDER BY ")
            .push(sort.field.column())
            .push(" ")
            .push(sort.direction.as_sql());
        qb.push(" LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());
        qb
    }
}

/// One window of the channel-grouped listing.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GroupedWindow {
    pub data: Vec<GroupedVideo>,
    /// Number of distinct channels with videos.
    pub total: i64,
}

/// Repository for video operations.
#[derive(Clone)]
pub struct VideoRepository {
    db: Arc<Database>,
}

impl VideoRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Filtered, sorted page of videos. Default order is newest first.
    pub async fn page(
        &self,
        page: PageRequest,
        filter: &VideoFilter,
        sort: Option<Sort<VideoSortField>>,
    ) -> Result<Page<Video>> {
        let total: i64 = filter
            .count_query()
            .build_query_scalar()
            .fetch_one(self.db.pool())
            .await?;

        let data: Vec<Video> = filter
            .page_query(page, sort)
            .build_query_as()
            .fetch_all(self.db.pool())
            .await?;

        tracing::debug!(total, page = page.page, page_size = page.page_size, "video page");
        Ok(Page { data, total })
    }

    /// Rows `row_start..=row_end` of the channel-grouped numbering.
    pub async fn grouped_window(&self, row_start: i64, row_end: i64) -> Result<GroupedWindow> {
        if row_start < 1 {
            return Err(DbError::InvalidQuery(format!("row start must be >= 1, got {}", row_start)));
        }

        let data = if row_start > row_end {
            Vec::new()
        } else {
            sqlx::query_as::<_, GroupedVideo>(GROUPED_VIDEOS_SQL)
                .bind(row_start)
                .bind(row_end)
                .fetch_all(self.db.pool())
                .await?
        };

        let total: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT channel_id) FROM videos")
            .fetch_one(self.db.pool())
            .await?;

        Ok(GroupedWindow { data, total })
    }

    /// All videos of one channel, most viewed first.
    pub async fn by_channel(&self, channel_id: &str) -> Result<Vec<Video>> {
        let sql = format!(
            "SELECT {} FROM videos WHERE channel_id = ? ORDER BY view_count DESC",
            VIDEO_COLUMNS
        );
        let rows = sqlx::query_as::<_, Video>(&sql)
            .bind(channel_id)
            .fetch_all(self.db.pool())
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubescope_common::listing::SortDirection;

    #[test]
    fn test_default_order_is_newest_first() {
        let filter = VideoFilter::default();
        let qb = filter.page_query(PageRequest::new(1, 20, 100), None);
        assert!(qb.sql().contains("ORDER BY published_date DESC"));
        assert!(qb.sql().contains("WHERE 1=1 ORDER BY"));
    }

    #[test]
    fn test_sort_by_views() {
        let filter = VideoFilter::default();
        let sort = Sort { field: VideoSortField::ViewCount, direction: SortDirection::Asc };
        let qb = filter.page_query(PageRequest::new(2, 20, 100), Some(sort));
        assert!(qb.sql().contains("ORDER BY view_count ASC"));
    }

    #[test]
    fn test_filters() {
        let filter = VideoFilter {
            channel_id: Some("UC123".into()),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31),
            min_views: Some(500),
        };
        let qb = filter.count_query();
        let sql = qb.sql();
        assert!(sql.contains("AND channel_id = ?"));
        assert!(sql.contains("AND published_date >= ?"));
        assert!(sql.contains("AND published_date < ?"));
        assert!(sql.contains("AND view_count >= ?"));
        assert!(!sql.contains("UC123"));
    }

    #[test]
    fn test_zero_min_views_ignored() {
        let filter = VideoFilter { min_views: Some(0), ..Default::default() };
        assert!(!filter.count_query().sql().contains("view_count"));
    }

    #[test]
    fn test_grouped_sql_numbers_by_channel_size() {
        assert!(GROUPED_VIDEOS_SQL.contains("ROW_NUMBER() OVER"));
        assert!(GROUPED_VIDEOS_SQL.contains("BETWEEN ? AND ?"));
    }
}
