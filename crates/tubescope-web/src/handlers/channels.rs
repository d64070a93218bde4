//! Channel search, detail history and the benchmark / blacklist flags.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::{Html, IntoResponse},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tubescope_common::error::ApiError;
use tubescope_common::listing::{lenient_number, ChannelSortField, PageRequest, Sort, SortDirection};
use tubescope_common::models::{ChannelSnapshot, ChannelSummary};
use tubescope_db::ChannelSearch;

use crate::charts::LineChart;
use crate::handlers::{json_number, non_empty, require_channel_id, MAX_PAGE_SIZE};
use crate::render::PageError;
use crate::state::{AppEvent, SharedState};

const DEFAULT_PAGE_SIZE: i64 = 20;

const JOINED_OPTIONS: [(i64, &str); 6] = [
    (30, "Last month"),
    (90, "Last 3 months"),
    (180, "Last 6 months"),
    (365, "Last year"),
    (730, "Last 2 years"),
    (0, "Any time"),
];
const PAGE_SIZE_OPTIONS: [u32; 3] = [20, 50, 100];

/// Table headers in display order.
const COLUMNS: [(ChannelSortField, &str); 9] = [
    (ChannelSortField::ChannelName, "Channel"),
    (ChannelSortField::JoinedDate, "Joined"),
    (ChannelSortField::SubscriberCount, "Subscribers"),
    (ChannelSortField::VideoCount, "Videos"),
    (ChannelSortField::ViewCount, "Views"),
    (ChannelSortField::DailyViewIncrease, "Daily views"),
    (ChannelSortField::AvgViewCount, "Avg views"),
    (ChannelSortField::Country, "Country"),
    (ChannelSortField::CrawlDate, "Crawled"),
];

const CHART_WIDTH: f64 = 600.0;
const CHART_HEIGHT: f64 = 300.0;

// === Request Types ===

#[derive(Debug, Default, Deserialize)]
pub struct SortBody {
    pub field: Option<String>,
    pub direction: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelSearchBody {
    pub channel_name: Option<String>,
    pub joined_days: Option<Value>,
    pub min_view_count: Option<Value>,
    pub page_size: Option<Value>,
    pub current_page: Option<Value>,
    pub sort: Option<SortBody>,
}

impl ChannelSearchBody {
    fn into_search(self) -> Result<ChannelSearch, ApiError> {
        let sort = match &self.sort {
            Some(s) => parse_sort(s.field.as_deref(), s.direction.as_deref())?,
            None => Sort::default(),
        };
        Ok(ChannelSearch {
            name: non_empty(self.channel_name.as_deref()).map(str::to_string),
            joined_days: json_number(self.joined_days.as_ref(), 0),
            min_view_count: json_number(self.min_view_count.as_ref(), 0),
            page: PageRequest::new(
                json_number(self.current_page.as_ref(), 1),
                json_number(self.page_size.as_ref(), DEFAULT_PAGE_SIZE),
                MAX_PAGE_SIZE,
            ),
            sort,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelIdParams {
    pub channel_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelAction {
    pub channel_id: Option<String>,
    pub is_benchmark: Option<Value>,
}

/// Missing field means the default order; a field or direction we don't
/// know is rejected.
fn parse_sort(field: Option<&str>, direction: Option<&str>) -> Result<Sort<ChannelSortField>, ApiError> {
    let field = match non_empty(field) {
        Some(raw) => ChannelSortField::parse(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid sort field: {}", raw)))?,
        None => ChannelSortField::default(),
    };
    let direction = match non_empty(direction) {
        Some(raw) => SortDirection::parse(raw)
            .ok_or_else(|| ApiError::BadRequest(format!("Invalid sort direction: {}", raw)))?,
        None => SortDirection::default(),
    };
    Ok(Sort { field, direction })
}

fn truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    }
}

fn action_body(body: Result<Json<ChannelAction>, JsonRejection>) -> Result<ChannelAction, ApiError> {
    body.map(|Json(b)| b).map_err(|e| ApiError::BadRequest(e.body_text()))
}

// === API Endpoints ===

/// POST /api/channels/search
pub async fn api_search(
    State(state): State<SharedState>,
    body: Result<Json<ChannelSearchBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let search = body.into_search()?;
    Ok(Json(state.channels().search(&search).await?))
}

/// GET /api/channel/{id}
pub async fn api_history(
    State(state): State<SharedState>,
    Path(channel_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let history = state.channels().history(&channel_id).await?;
    if history.is_empty() {
        return Err(ApiError::NotFound("Channel not found".to_string()));
    }
    Ok(Json(history))
}

/// GET /api/channel/benchmark-status?channelId=
pub async fn api_benchmark_status(
    State(state): State<SharedState>,
    Query(params): Query<ChannelIdParams>,
) -> Result<impl IntoResponse, ApiError> {
    let channel_id = require_channel_id(params.channel_id.as_deref())?;
    let is_benchmark = state.channels().is_benchmark(channel_id).await?;
    Ok(Json(json!({ "isBenchmark": is_benchmark })))
}

/// PUT /api/channel/benchmark-status
pub async fn api_set_benchmark_status(
    State(state): State<SharedState>,
    body: Result<Json<ChannelAction>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = action_body(body)?;
    let channel_id = require_channel_id(body.channel_id.as_deref())?;
    let is_benchmark = truthy(body.is_benchmark.as_ref());

    state.channels().set_benchmark(channel_id, is_benchmark).await?;
    state.publish(AppEvent::BenchmarkChanged { channel_id: channel_id.to_string(), is_benchmark });
    Ok(Json(json!({ "message": "Successfully updated" })))
}

/// POST /api/channel/benchmark
pub async fn api_mark_benchmark(
    State(state): State<SharedState>,
    body: Result<Json<ChannelAction>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = action_body(body)?;
    let channel_id = require_channel_id(body.channel_id.as_deref())?;

    state.channels().set_benchmark(channel_id, true).await?;
    state.publish(AppEvent::BenchmarkChanged { channel_id: channel_id.to_string(), is_benchmark: true });
    Ok(Json(json!({ "message": "Successfully updated" })))
}

/// PUT /api/channel/blacklist
pub async fn api_blacklist(
    State(state): State<SharedState>,
    body: Result<Json<ChannelAction>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let body = action_body(body)?;
    let channel_id = require_channel_id(body.channel_id.as_deref())?;

    let outcome = state.channels().blacklist(channel_id).await?;
    state.publish(AppEvent::ChannelBlacklisted {
        channel_id: channel_id.to_string(),
        snapshots_deleted: outcome.snapshots_deleted,
    });
    Ok(Json(json!({ "message": "Channel successfully blacklisted" })))
}

// === Pages ===

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPageParams {
    pub channel_name: Option<String>,
    pub joined_days: Option<String>,
    pub min_view_count: Option<String>,
    pub page_size: Option<String>,
    pub page: Option<String>,
    /// `field:direction`, e.g. `view_count:desc`.
    pub sort: Option<String>,
}

impl ChannelPageParams {
    fn to_search(&self) -> Result<ChannelSearch, ApiError> {
        let (field, direction) = match non_empty(self.sort.as_deref()) {
            Some(raw) => match raw.split_once(':') {
                Some((f, d)) => (Some(f), Some(d)),
                None => (Some(raw), None),
            },
            None => (None, None),
        };
        Ok(ChannelSearch {
            name: non_empty(self.channel_name.as_deref()).map(str::to_string),
            joined_days: lenient_number(self.joined_days.as_deref(), 0),
            min_view_count: lenient_number(self.min_view_count.as_deref(), 0),
            page: PageRequest::new(
                lenient_number(self.page.as_deref(), 1),
                lenient_number(self.page_size.as_deref(), DEFAULT_PAGE_SIZE),
                MAX_PAGE_SIZE,
            ),
            sort: parse_sort(field, direction)?,
        })
    }
}

#[derive(Serialize)]
struct SortColumn {
    label: &'static str,
    active: bool,
    direction: &'static str,
    /// `sort` value the header links to.
    next: String,
}

fn sort_columns(current: Sort<ChannelSortField>) -> Vec<SortColumn> {
    COLUMNS
        .iter()
        .map(|&(field, label)| {
            let active = field == current.field;
            let next_direction = if active { current.direction.flip() } else { SortDirection::Desc };
            SortColumn {
                label,
                active,
                direction: if active { current.direction.as_sql() } else { "" },
                next: format!("{}:{}", field.name(), next_direction.as_sql().to_ascii_lowercase()),
            }
        })
        .collect()
}

#[derive(Serialize)]
struct ChannelsPage {
    results: Vec<ChannelSummary>,
    total: i64,
    page: u32,
    page_size: u32,
    total_pages: u64,
    channel_name: String,
    joined_days: i64,
    min_view_count: i64,
    sort: String,
    columns: Vec<SortColumn>,
    joined_options: Vec<(i64, &'static str)>,
    page_size_options: Vec<u32>,
}

/// GET /channel
pub async fn channels_page(
    State(state): State<SharedState>,
    Query(params): Query<ChannelPageParams>,
) -> Result<Html<String>, PageError> {
    let search = params.to_search()?;
    let result = state.channels().search(&search).await?;

    let ctx = ChannelsPage {
        results: result.results,
        total: result.total,
        page: result.current_page,
        page_size: result.page_size,
        total_pages: result.total_pages,
        channel_name: search.name.clone().unwrap_or_default(),
        joined_days: search.joined_days,
        min_view_count: search.min_view_count,
        sort: format!(
            "{}:{}",
            search.sort.field.name(),
            search.sort.direction.as_sql().to_ascii_lowercase()
        ),
        columns: sort_columns(search.sort),
        joined_options: JOINED_OPTIONS.to_vec(),
        page_size_options: PAGE_SIZE_OPTIONS.to_vec(),
    };
    state.templates.render("channels.html", "channel", ctx)
}

#[derive(Serialize)]
struct ChannelDetailPage {
    latest: ChannelSnapshot,
    shorts_url: Option<String>,
    history: Vec<ChannelSnapshot>,
    is_benchmark: bool,
    charts: Vec<LineChart>,
}

/// Subscriber, video and view trends, oldest snapshot first.
fn trend_charts(history: &[ChannelSnapshot]) -> Vec<LineChart> {
    let series = |value: fn(&ChannelSnapshot) -> Option<i64>| -> Vec<(String, i64)> {
        history
            .iter()
            .rev()
            .map(|s| {
                let label = s.crawl_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
                (label, value(s).unwrap_or(0))
            })
            .collect()
    };
    vec![
        LineChart::new("Subscribers", "#4bc0c0", &series(|s| s.subscriber_count), CHART_WIDTH, CHART_HEIGHT),
        LineChart::new("Videos", "#ff6384", &series(|s| s.video_count), CHART_WIDTH, CHART_HEIGHT),
        LineChart::new("Views", "#36a2eb", &series(|s| s.view_count), CHART_WIDTH, CHART_HEIGHT),
    ]
}

/// GET /channel/{id}
pub async fn channel_detail_page(
    State(state): State<SharedState>,
    Path(channel_id): Path<String>,
) -> Result<Html<String>, PageError> {
    let repo = state.channels();
    let (history, is_benchmark) = tokio::try_join!(repo.history(&channel_id), repo.is_benchmark(&channel_id))?;

    let Some(latest) = history.first().cloned() else {
        return Err(ApiError::NotFound("Channel not found".to_string()).into());
    };

    let ctx = ChannelDetailPage {
        shorts_url: latest.shorts_url(),
        charts: trend_charts(&history),
        latest,
        history,
        is_benchmark,
    };
    state.templates.render("channel_detail.html", "channel", ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_search_body_defaults() {
        let search = ChannelSearchBody::default().into_search().unwrap();
        assert_eq!(search.page, PageRequest { page: 1, page_size: 20 });
        assert_eq!(search.sort, Sort::default());
        assert_eq!(search.joined_days, 0);
        assert!(search.name.is_none());
    }

    #[test]
    fn test_search_body_parses_camel_case() {
        let body: ChannelSearchBody = serde_json::from_value(json!({
            "channelName": "  cook ",
            "joinedDays": "90",
            "minViewCount": 1000,
            "pageSize": 500,
            "currentPage": 3,
            "sort": { "field": "country", "direction": "asc" }
        }))
        .unwrap();
        let search = body.into_search().unwrap();
        assert_eq!(search.name.as_deref(), Some("cook"));
        assert_eq!(search.joined_days, 90);
        assert_eq!(search.min_view_count, 1000);
        assert_eq!(search.page, PageRequest { page: 3, page_size: 100 });
        assert_eq!(search.sort, Sort { field: ChannelSortField::Country, direction: SortDirection::Asc });
    }

    #[test]
    fn test_unknown_sort_is_rejected() {
        let body: ChannelSearchBody = serde_json::from_value(json!({
            "sort": { "field": "view_count desc, (SELECT 1)", "direction": "desc" }
        }))
        .unwrap();
        assert!(matches!(body.into_search(), Err(ApiError::BadRequest(_))));
        assert!(parse_sort(Some("view_count"), Some("sideways")).is_err());
    }

    #[test]
    fn test_truthy() {
        assert!(truthy(Some(&json!(true))));
        assert!(truthy(Some(&json!(1))));
        assert!(!truthy(Some(&json!(0))));
        assert!(!truthy(Some(&json!(""))));
        assert!(!truthy(None));
    }

    #[test]
    fn test_page_params_sort() {
        let params = ChannelPageParams { sort: Some("subscriber_count:asc".into()), ..Default::default() };
        let search = params.to_search().unwrap();
        assert_eq!(search.sort.field, ChannelSortField::SubscriberCount);
        assert_eq!(search.sort.direction, SortDirection::Asc);
    }

    #[test]
    fn test_sort_columns_flip_active() {
        let columns = sort_columns(Sort { field: ChannelSortField::ViewCount, direction: SortDirection::Desc });
        let views = columns.iter().find(|c| c.label == "Views").unwrap();
        assert!(views.active);
        assert_eq!(views.next, "view_count:asc");
        let name = columns.iter().find(|c| c.label == "Channel").unwrap();
        assert_eq!(name.next, "channel_name:desc");
    }

    fn snapshot(day: u32, subscribers: i64) -> ChannelSnapshot {
        ChannelSnapshot {
            channel_id: "UC1".into(),
            channel_name: Some("c".into()),
            description: None,
            canonical_base_url: Some("/@c".into()),
            subscriber_count: Some(subscribers),
            video_count: Some(10),
            view_count: None,
            joined_date: None,
            country: None,
            crawl_date: NaiveDate::from_ymd_opt(2024, 5, day).and_then(|d| d.and_hms_opt(0, 0, 0)),
            avg_view_count: None,
            avg_subscriber_increase: None,
            daily_view_increase: None,
        }
    }

    #[test]
    fn test_trend_charts_run_oldest_first() {
        // history comes newest first
        let history = vec![snapshot(3, 300), snapshot(2, 200), snapshot(1, 100)];
        let charts = trend_charts(&history);
        assert_eq!(charts.len(), 3);
        let subs = &charts[0];
        assert_eq!(subs.points[0].label, "2024-05-01");
        assert_eq!(subs.points[2].value, "300");
        assert_eq!(charts[2].points[0].value, "0");
    }
}
