//! Pagination and sort parameters shared by the list endpoints.
//!
//! Sort columns are closed enums: whatever arrives on the wire is parsed
//! into one of these before it gets anywhere near an ORDER BY clause.

use serde::{Deserialize, Serialize};

// ── Pagination ───────────────────────────────────────────────────────────────

/// 1-based page request with a clamped page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Clamp `page` to >= 1 and `page_size` to `1..=max_page_size`.
    pub fn new(page: i64, page_size: i64, max_page_size: u32) -> Self {
        let page = page.clamp(1, u32::MAX as i64) as u32;
        let page_size = page_size.clamp(1, max_page_size.max(1) as i64) as u32;
        Self { page, page_size }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    pub fn limit(&self) -> u64 {
        self.page_size as u64
    }

    pub fn total_pages(&self, total: i64) -> u64 {
        total_pages(total, self.page_size)
    }
}

pub fn total_pages(total: i64, page_size: u32) -> u64 {
    if total <= 0 || page_size == 0 {
        return 0;
    }
    (total as u64).div_ceil(page_size as u64)
}

/// Read a numeric query parameter the forgiving way: anything missing,
/// non-numeric or zero yields `default`.
pub fn lenient_number(raw: Option<&str>, default: i64) -> i64 {
    match raw.and_then(|s| s.trim().parse::<f64>().ok()) {
        Some(n) if n.is_finite() && n != 0.0 => n.trunc() as i64,
        _ => default,
    }
}

// ── Sorting ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn flip(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Sortable columns of the channel search table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelSortField {
    ChannelName,
    JoinedDate,
    SubscriberCount,
    VideoCount,
    #[default]
    ViewCount,
    DailyViewIncrease,
    AvgViewCount,
    Country,
    CrawlDate,
}

impl ChannelSortField {
    pub const ALL: [ChannelSortField; 9] = [
        ChannelSortField::ChannelName,
        ChannelSortField::JoinedDate,
        ChannelSortField::SubscriberCount,
        ChannelSortField::VideoCount,
        ChannelSortField::ViewCount,
        ChannelSortField::DailyViewIncrease,
        ChannelSortField::AvgViewCount,
        ChannelSortField::Country,
        ChannelSortField::CrawlDate,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == raw.trim())
    }

    /// Wire name, identical to the output column of the channel search.
    pub fn name(&self) -> &'static str {
        match self {
            ChannelSortField::ChannelName => "channel_name",
            ChannelSortField::JoinedDate => "joined_date",
            ChannelSortField::SubscriberCount => "subscriber_count",
            ChannelSortField::VideoCount => "video_count",
            ChannelSortField::ViewCount => "view_count",
            ChannelSortField::DailyViewIncrease => "daily_view_increase",
            ChannelSortField::AvgViewCount => "avg_view_count",
            ChannelSortField::Country => "country",
            ChannelSortField::CrawlDate => "crawl_date",
        }
    }
}

/// Sortable columns of the video list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoSortField {
    ViewCount,
    #[default]
    PublishedDate,
}

impl VideoSortField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "view_count" => Some(VideoSortField::ViewCount),
            "published_date" => Some(VideoSortField::PublishedDate),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            VideoSortField::ViewCount => "view_count",
            VideoSortField::PublishedDate => "published_date",
        }
    }
}

/// A (column, direction) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl Sort<VideoSortField> {
    /// Both halves must parse; otherwise the listing keeps its default order.
    pub fn video(field: Option<&str>, direction: Option<&str>) -> Option<Self> {
        let field = VideoSortField::parse(field?)?;
        let direction = SortDirection::parse(direction?)?;
        Some(Sort { field, direction })
    }
}

impl Default for Sort<ChannelSortField> {
    fn default() -> Self {
        Sort { field: ChannelSortField::ViewCount, direction: SortDirection::Desc }
    }
}

impl Default for Sort<VideoSortField> {
    fn default() -> Self {
        Sort { field: VideoSortField::PublishedDate, direction: SortDirection::Desc }
    }
}
