//! Search keywords: CRUD API, trend suggestions and the keyword page.

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tubescope_common::error::ApiError;
use tubescope_common::listing::{lenient_number, PageRequest};
use tubescope_common::models::Keyword;
use tubescope_db::DbError;

use crate::handlers::MAX_PAGE_SIZE;
use crate::render::PageError;
use crate::state::{AppEvent, SharedState};
use crate::tag_cloud::{self, PlacedWord};

pub const SUGGESTION_TOPICS: [&str; 20] = [
    "Shorts",
    "Live Streaming",
    "AI Content",
    "Niche Content",
    "Community",
    "Storytelling",
    "Cross-platform",
    "Authenticity",
    "Vertical Video",
    "Interactive Content",
    "Micro-content",
    "Personalization",
    "Virtual Reality",
    "Augmented Reality",
    "Social Commerce",
    "User-generated Content",
    "Influencer Marketing",
    "Video SEO",
    "Multi-channel Networks",
    "Subscription Model",
];
pub const SUGGESTION_COUNT: usize = 15;

const CLOUD_WIDTH: f64 = 800.0;
const CLOUD_HEIGHT: f64 = 400.0;
const CLOUD_KEYWORDS: u32 = 30;
const PAGE_SIZE: i64 = 10;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordListParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl KeywordListParams {
    fn page_request(&self) -> PageRequest {
        PageRequest::new(
            lenient_number(self.page.as_deref(), 1),
            lenient_number(self.page_size.as_deref(), PAGE_SIZE),
            MAX_PAGE_SIZE,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteParams {
    pub id: Option<String>,
}

/// `SUGGESTION_COUNT` distinct topics in random order.
pub fn suggestions<R: Rng + ?Sized>(rng: &mut R) -> Vec<&'static str> {
    SUGGESTION_TOPICS
        .choose_multiple(rng, SUGGESTION_COUNT)
        .copied()
        .collect()
}

/// `keyWords` must be a non-blank string.
fn parse_new_keyword(body: Result<Json<Value>, JsonRejection>) -> Result<String, ApiError> {
    let invalid = || ApiError::InvalidParam("Invalid keyword".to_string());
    let Json(body) = body.map_err(|_| invalid())?;
    match body.get("keyWords") {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(invalid()),
    }
}

fn parse_id(raw: Option<&str>) -> Result<u64, ApiError> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::InvalidParam("Invalid ID".to_string()))
}

// === API Endpoints ===

/// GET /api/keywords
pub async fn api_list(
    State(state): State<SharedState>,
    Query(params): Query<KeywordListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.keywords().page(params.page_request()).await?;
    Ok(Json(page))
}

/// POST /api/keywords
pub async fn api_create(
    State(state): State<SharedState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let key_words = parse_new_keyword(body)?;

    let id = state.keywords().create(&key_words).await.map_err(|e| match e {
        DbError::Duplicate(_) => ApiError::Conflict("Keyword already exists".to_string()),
        other => ApiError::from(other),
    })?;

    state.publish(AppEvent::KeywordAdded { id, key_words });
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// DELETE /api/keywords?id=
pub async fn api_delete(
    State(state): State<SharedState>,
    Query(params): Query<DeleteParams>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(params.id.as_deref())?;

    let success = state.keywords().delete(id).await?;
    if success {
        state.publish(AppEvent::KeywordDeleted { id });
    }
    let status = if success { StatusCode::OK } else { StatusCode::NOT_FOUND };
    Ok((status, Json(json!({ "success": success }))))
}

/// GET /api/keywords/all
pub async fn api_all(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.keywords().all_exports().await?))
}

/// GET /api/keywords/suggestions
pub async fn api_suggestions() -> Json<Vec<&'static str>> {
    Json(suggestions(&mut rand::thread_rng()))
}

// === Page ===

#[derive(Serialize)]
struct KeywordPage {
    keyword_cloud: Vec<PlacedWord>,
    suggestion_cloud: Vec<PlacedWord>,
    cloud_width: f64,
    cloud_height: f64,
    columns: Vec<Vec<Keyword>>,
    page: u32,
    page_size: u32,
    total: i64,
    total_pages: u64,
}

/// Split a page into two table columns, left column first.
fn two_columns(rows: Vec<Keyword>) -> Vec<Vec<Keyword>> {
    let half = rows.len().div_ceil(2);
    let mut left = rows;
    let right = left.split_off(half);
    vec![left, right]
}

/// GET /keyword
pub async fn keywords_page(
    State(state): State<SharedState>,
    Query(params): Query<KeywordListParams>,
) -> Result<Html<String>, PageError> {
    let request = params.page_request();
    let repo = state.keywords();
    let (page, recent) = tokio::try_join!(repo.page(request), repo.recent(CLOUD_KEYWORDS))?;

    let recent_words: Vec<&str> = recent.iter().map(|k| k.key_words.as_str()).collect();
    let picked = suggestions(&mut rand::thread_rng());

    let ctx = KeywordPage {
        keyword_cloud: tag_cloud::layout(&recent_words, CLOUD_WIDTH, CLOUD_HEIGHT),
        suggestion_cloud: tag_cloud::layout(&picked, CLOUD_WIDTH, CLOUD_HEIGHT),
        cloud_width: CLOUD_WIDTH,
        cloud_height: CLOUD_HEIGHT,
        page: request.page,
        page_size: request.page_size,
        total: page.total,
        total_pages: request.total_pages(page.total),
        columns: two_columns(page.data),
    };
    state.templates.render("keywords.html", "keyword", ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_suggestions_are_distinct_topics() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = suggestions(&mut rng);
        assert_eq!(picked.len(), SUGGESTION_COUNT);
        let unique: HashSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), SUGGESTION_COUNT);
        assert!(picked.iter().all(|t| SUGGESTION_TOPICS.contains(t)));
    }

    #[test]
    fn test_new_keyword_validation() {
        assert_eq!(parse_new_keyword(Ok(Json(json!({ "keyWords": " diy " })))).unwrap(), "diy");
        assert!(parse_new_keyword(Ok(Json(json!({ "keyWords": "   " })))).is_err());
        assert!(parse_new_keyword(Ok(Json(json!({ "keyWords": 12 })))).is_err());
        assert!(parse_new_keyword(Ok(Json(json!({})))).is_err());
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(Some("42")).unwrap(), 42);
        assert!(parse_id(Some("0")).is_err());
        assert!(parse_id(Some("abc")).is_err());
        assert!(parse_id(None).is_err());
    }

    #[test]
    fn test_list_params_defaults() {
        let params = KeywordListParams { page: Some("x".into()), page_size: None };
        assert_eq!(params.page_request(), PageRequest { page: 1, page_size: 10 });
    }

    fn keyword(id: i64) -> Keyword {
        Keyword { id, key_words: format!("k{}", id), last_crawl_time: None, created_at: None }
    }

    #[test]
    fn test_two_columns() {
        let cols = two_columns((1..=5).map(keyword).collect());
        assert_eq!(cols[0].len(), 3);
        assert_eq!(cols[1].len(), 2);
        assert_eq!(cols[1][0].id, 4);

        let empty = two_columns(Vec::new());
        assert!(empty[0].is_empty() && empty[1].is_empty());
    }
}
