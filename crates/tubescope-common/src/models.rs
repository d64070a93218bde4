//! Row types for the crawler-owned tables.
//!
//! Numeric columns are cast to BIGINT / DOUBLE in the SQL so the Rust types
//! below stay stable whatever integer width the crawler picked.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::{mysql::MySqlRow, FromRow, Row};

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// One crawl snapshot of a channel (`channel_crawl`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChannelSnapshot {
    pub channel_id: String,
    pub channel_name: Option<String>,
    pub description: Option<String>,
    pub canonical_base_url: Option<String>,
    pub subscriber_count: Option<i64>,
    pub video_count: Option<i64>,
    pub view_count: Option<i64>,
    pub joined_date: Option<NaiveDate>,
    pub country: Option<String>,
    pub crawl_date: Option<NaiveDateTime>,
    pub avg_view_count: Option<f64>,
    pub avg_subscriber_increase: Option<f64>,
    pub daily_view_increase: Option<i64>,
}

impl ChannelSnapshot {
    pub fn shorts_url(&self) -> Option<String> {
        self.canonical_base_url.as_deref().map(channel_shorts_url)
    }
}

/// Latest snapshot of a channel plus its benchmark flag, as listed by search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel_id: String,
    pub channel_name: Option<String>,
    pub subscriber_count: Option<i64>,
    pub video_count: Option<i64>,
    pub view_count: Option<i64>,
    pub joined_date: Option<NaiveDate>,
    pub country: Option<String>,
    pub avg_view_count: Option<f64>,
    pub daily_view_increase: Option<i64>,
    pub crawl_date: Option<NaiveDateTime>,
    pub is_benchmark: bool,
}

// is_benchmark comes back as a BIGINT 0/1 (or NULL when channel_base has no row)
impl<'r> FromRow<'r, MySqlRow> for ChannelSummary {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        let flag: Option<i64> = row.try_get("is_benchmark")?;
        Ok(Self {
            channel_id: row.try_get("channel_id")?,
            channel_name: row.try_get("channel_name")?,
            subscriber_count: row.try_get("subscriber_count")?,
            video_count: row.try_get("video_count")?,
            view_count: row.try_get("view_count")?,
            joined_date: row.try_get("joined_date")?,
            country: row.try_get("country")?,
            avg_view_count: row.try_get("avg_view_count")?,
            daily_view_increase: row.try_get("daily_view_increase")?,
            crawl_date: row.try_get("crawl_date")?,
            is_benchmark: flag.unwrap_or(0) != 0,
        })
    }
}

/// Response body of channel search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSearchPage {
    pub results: Vec<ChannelSummary>,
    pub total: i64,
    pub current_page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

// ---------------------------------------------------------------------------
// Video
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Video {
    pub id: i64,
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub view_count: Option<i64>,
    pub published_date: Option<NaiveDateTime>,
    pub channel_id: Option<String>,
    pub channel_name: Option<String>,
    pub canonical_base_url: Option<String>,
}

impl Video {
    pub fn thumbnail_url(&self) -> Option<String> {
        self.video_id.as_deref().map(|id| format!("https://i.ytimg.com/vi/{}/hq720.jpg", id))
    }

    pub fn watch_url(&self) -> Option<String> {
        self.video_id.as_deref().map(|id| format!("https://www.youtube.com/shorts/{}", id))
    }

    pub fn channel_url(&self) -> Option<String> {
        self.canonical_base_url.as_deref().map(channel_shorts_url)
    }
}

/// A video numbered by the channel-grouping window query.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupedVideo {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub video: Video,
    pub global_row_num: i64,
}

// ---------------------------------------------------------------------------
// Keyword
// ---------------------------------------------------------------------------

/// A search keyword the crawler works through (`search_urls`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Keyword {
    pub id: i64,
    pub key_words: String,
    pub last_crawl_time: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
}

/// Row of the read-only `key_words` export.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct KeywordExport {
    pub id: i64,
    pub key_words: String,
    pub last_crawl_date: Option<NaiveDateTime>,
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

/// `{data, total}` page used by the video and keyword listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
}

/// Counters shown on the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub video_count: i64,
    pub channel_count: i64,
    pub benchmark_channel_count: i64,
    pub keyword_count: i64,
}

/// Videos published in one calendar month, `month` formatted `YYYY-MM`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MonthlyCount {
    pub month: String,
    pub videos: i64,
}

pub fn channel_shorts_url(canonical_base_url: &str) -> String {
    format!("https://www.youtube.com{}/shorts", canonical_base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(video_id: Option<&str>) -> Video {
        Video {
            id: 1,
            video_id: video_id.map(str::to_string),
            title: Some("t".into()),
            view_count: Some(10),
            published_date: None,
            channel_id: Some("UC1".into()),
            channel_name: Some("c".into()),
            canonical_base_url: Some("/@creator".into()),
        }
    }

    #[test]
    fn test_video_links() {
        let v = video(Some("abc123"));
        assert_eq!(v.thumbnail_url().unwrap(), "https://i.ytimg.com/vi/abc123/hq720.jpg");
        assert_eq!(v.watch_url().unwrap(), "https://www.youtube.com/shorts/abc123");
        assert_eq!(v.channel_url().unwrap(), "https://www.youtube.com/@creator/shorts");
        assert!(video(None).thumbnail_url().is_none());
    }

    #[test]
    fn test_grouped_video_serializes_flat() {
        let g = GroupedVideo { video: video(Some("x")), global_row_num: 7 };
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["global_row_num"], 7);
        assert_eq!(json["video_id"], "x");
    }

    #[test]
    fn test_search_page_is_camel_case() {
        let page = ChannelSearchPage {
            results: vec![],
            total: 0,
            current_page: 1,
            page_size: 20,
            total_pages: 0,
        };
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("currentPage").is_some());
        assert!(json.get("totalPages").is_some());
    }
}
