//! Video listing, the channel-grouped window and their pages.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tubescope_common::error::ApiError;
use tubescope_common::listing::{lenient_number, PageRequest, Sort, SortDirection, VideoSortField};
use tubescope_common::models::{GroupedVideo, Video};
use tubescope_db::VideoFilter;

use crate::handlers::{non_empty, require_channel_id, MAX_PAGE_SIZE};
use crate::render::PageError;
use crate::state::SharedState;

const DEFAULT_PAGE_SIZE: i64 = 20;
const PAGE_SIZE_OPTIONS: [u32; 3] = [20, 50, 100];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
    pub channel_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_views: Option<String>,
}

impl VideoListParams {
    fn page_request(&self) -> PageRequest {
        PageRequest::new(
            lenient_number(self.page.as_deref(), 1),
            lenient_number(self.page_size.as_deref(), DEFAULT_PAGE_SIZE),
            MAX_PAGE_SIZE,
        )
    }

    fn filter(&self) -> Result<VideoFilter, ApiError> {
        Ok(VideoFilter {
            channel_id: non_empty(self.channel_id.as_deref()).map(str::to_string),
            start_date: parse_date("startDate", self.start_date.as_deref())?,
            end_date: parse_date("endDate", self.end_date.as_deref())?,
            min_views: non_empty(self.min_views.as_deref()).map(|v| lenient_number(Some(v), 0)),
        })
    }

    /// Only a complete, recognised pair changes the order.
    fn sort(&self) -> Option<Sort<VideoSortField>> {
        Sort::video(self.sort_field.as_deref(), self.sort_direction.as_deref())
    }
}

fn parse_date(name: &str, raw: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    match non_empty(raw) {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("Invalid {}: expected YYYY-MM-DD", name))),
        None => Ok(None),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupParams {
    pub row_start: Option<String>,
    pub row_end: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl GroupParams {
    /// `rowStart`/`rowEnd`, falling back to `start`/`end`.
    fn bounds(&self) -> Result<(i64, i64), ApiError> {
        let bound = |primary: &Option<String>, alias: &Option<String>, name: &str| {
            non_empty(primary.as_deref())
                .or(non_empty(alias.as_deref()))
                .and_then(|s| s.parse::<i64>().ok())
                .filter(|n| *n >= 1)
                .ok_or_else(|| ApiError::BadRequest(format!("{} must be a positive integer", name)))
        };
        let start = bound(&self.row_start, &self.start, "rowStart")?;
        let end = bound(&self.row_end, &self.end, "rowEnd")?;
        Ok((start, end))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelVideosParams {
    pub channel_id: Option<String>,
}

// === API Endpoints ===

/// GET /api/video
pub async fn api_list(
    State(state): State<SharedState>,
    Query(params): Query<VideoListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = params.filter()?;
    let page = state.videos().page(params.page_request(), &filter, params.sort()).await?;
    Ok(Json(page))
}

/// GET /api/video/group?rowStart&rowEnd
pub async fn api_group(
    State(state): State<SharedState>,
    Query(params): Query<GroupParams>,
) -> Result<impl IntoResponse, ApiError> {
    let (start, end) = params.bounds()?;
    Ok(Json(state.videos().grouped_window(start, end).await?))
}

/// GET /api/video/group/channel?channelId
pub async fn api_group_channel(
    State(state): State<SharedState>,
    Query(params): Query<ChannelVideosParams>,
) -> Result<impl IntoResponse, ApiError> {
    let channel_id = require_channel_id(params.channel_id.as_deref())?;
    let data = state.videos().by_channel(channel_id).await?;
    Ok(Json(json!({ "data": data })))
}

// === Pages ===

#[derive(Serialize)]
struct VideoRow {
    #[serde(flatten)]
    video: Video,
    thumbnail_url: Option<String>,
    watch_url: Option<String>,
    channel_url: Option<String>,
}

impl From<Video> for VideoRow {
    fn from(video: Video) -> Self {
        Self {
            thumbnail_url: video.thumbnail_url(),
            watch_url: video.watch_url(),
            channel_url: video.channel_url(),
            video,
        }
    }
}

#[derive(Serialize)]
struct VideosPage {
    videos: Vec<VideoRow>,
    total: i64,
    page: u32,
    page_size: u32,
    total_pages: u64,
    channel_id: String,
    start_date: String,
    end_date: String,
    min_views: String,
    sort_field: &'static str,
    sort_direction: &'static str,
    page_size_options: Vec<u32>,
}

/// GET /video
pub async fn videos_page(
    State(state): State<SharedState>,
    Query(params): Query<VideoListParams>,
) -> Result<Html<String>, PageError> {
    let filter = params.filter()?;
    let request = params.page_request();
    let sort = params.sort();
    let page = state.videos().page(request, &filter, sort).await?;

    let shown = sort.unwrap_or_default();
    let ctx = VideosPage {
        videos: page.data.into_iter().map(VideoRow::from).collect(),
        total: page.total,
        page: request.page,
        page_size: request.page_size,
        total_pages: request.total_pages(page.total),
        channel_id: filter.channel_id.unwrap_or_default(),
        start_date: filter.start_date.map(|d| d.to_string()).unwrap_or_default(),
        end_date: filter.end_date.map(|d| d.to_string()).unwrap_or_default(),
        min_views: filter.min_views.filter(|v| *v > 0).map(|v| v.to_string()).unwrap_or_default(),
        sort_field: shown.field.column(),
        sort_direction: if shown.direction == SortDirection::Asc { "asc" } else { "desc" },
        page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
    };
    state.templates.render("videos.html", "video", ctx)
}

#[derive(Serialize)]
struct ChannelGroup {
    channel_id: String,
    channel_name: String,
    channel_url: Option<String>,
    videos: Vec<VideoRow>,
}

/// Consecutive rows of the same channel become one group, in row order.
fn group_by_channel(rows: Vec<GroupedVideo>) -> Vec<ChannelGroup> {
    let mut groups: Vec<ChannelGroup> = Vec::new();
    for row in rows {
        let channel_id = row.video.channel_id.clone().unwrap_or_default();
        if let Some(group) = groups.last_mut().filter(|g| g.channel_id == channel_id) {
            group.videos.push(row.video.into());
            continue;
        }
        groups.push(ChannelGroup {
            channel_name: row.video.channel_name.clone().unwrap_or_else(|| channel_id.clone()),
            channel_url: row.video.channel_url(),
            channel_id,
            videos: vec![row.video.into()],
        });
    }
    groups
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPageParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Serialize)]
struct VideoGroupsPage {
    groups: Vec<ChannelGroup>,
    total: i64,
    page: u32,
    page_size: u32,
    total_pages: u64,
    page_size_options: Vec<u32>,
}

/// GET /video/group
pub async fn video_groups_page(
    State(state): State<SharedState>,
    Query(params): Query<GroupPageParams>,
) -> Result<Html<String>, PageError> {
    let request = PageRequest::new(
        lenient_number(params.page.as_deref(), 1),
        lenient_number(params.page_size.as_deref(), DEFAULT_PAGE_SIZE),
        MAX_PAGE_SIZE,
    );
    // page n shows rows ((n-1)*size, n*size]
    let start = request.offset() as i64 + 1;
    let end = start + request.limit() as i64 - 1;
    let window = state.videos().grouped_window(start, end).await?;

    let ctx = VideoGroupsPage {
        groups: group_by_channel(window.data),
        total: window.total,
        page: request.page,
        page_size: request.page_size,
        total_pages: request.total_pages(window.total),
        page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
    };
    state.templates.render("video_groups.html", "video_group", ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parses_dates() {
        let params = VideoListParams {
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-31".into()),
            min_views: Some("1000".into()),
            channel_id: Some("".into()),
            ..Default::default()
        };
        let filter = params.filter().unwrap();
        assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filter.end_date, NaiveDate::from_ymd_opt(2024, 1, 31));
        assert_eq!(filter.min_views, Some(1000));
        assert!(filter.channel_id.is_none());
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let params = VideoListParams { start_date: Some("01/02/2024".into()), ..Default::default() };
        assert!(matches!(params.filter(), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_sort_needs_pair() {
        let params = VideoListParams {
            sort_field: Some("view_count".into()),
            sort_direction: Some("asc".into()),
            ..Default::default()
        };
        assert_eq!(
            params.sort(),
            Some(Sort { field: VideoSortField::ViewCount, direction: SortDirection::Asc })
        );
        let half = VideoListParams { sort_field: Some("view_count".into()), ..Default::default() };
        assert_eq!(half.sort(), None);
    }

    #[test]
    fn test_group_bounds_and_aliases() {
        let params = GroupParams { row_start: Some("1".into()), row_end: Some("20".into()), ..Default::default() };
        assert_eq!(params.bounds().unwrap(), (1, 20));

        let alias = GroupParams { start: Some("21".into()), end: Some("40".into()), ..Default::default() };
        assert_eq!(alias.bounds().unwrap(), (21, 40));

        let missing = GroupParams { row_start: Some("1".into()), ..Default::default() };
        assert!(missing.bounds().is_err());

        let zero = GroupParams { row_start: Some("0".into()), row_end: Some("5".into()), ..Default::default() };
        assert!(zero.bounds().is_err());

        // reversed bounds are valid input; the window is simply empty
        let reversed = GroupParams { row_start: Some("10".into()), row_end: Some("5".into()), ..Default::default() };
        assert_eq!(reversed.bounds().unwrap(), (10, 5));
    }

    fn grouped(row: i64, channel: &str) -> GroupedVideo {
        GroupedVideo {
            video: Video {
                id: row,
                video_id: Some(format!("v{}", row)),
                title: Some(format!("title {}", row)),
                view_count: Some(100 - row),
                published_date: None,
                channel_id: Some(channel.to_string()),
                channel_name: Some(format!("name {}", channel)),
                canonical_base_url: Some(format!("/@{}", channel)),
            },
            global_row_num: row,
        }
    }

    #[test]
    fn test_group_by_channel_keeps_row_order() {
        let groups = group_by_channel(vec![grouped(1, "a"), grouped(2, "a"), grouped(3, "b")]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].channel_id, "a");
        assert_eq!(groups[0].videos.len(), 2);
        assert_eq!(groups[1].channel_name, "name b");
        assert_eq!(groups[1].channel_url.as_deref(), Some("https://www.youtube.com/@b/shorts"));
    }
}
