//! Axum router: maps all URL paths to handlers.

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{channels, dashboard, keywords, method_not_allowed, videos};
use crate::sse::sse_handler;
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState, static_dir: &str) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",                 get(dashboard::dashboard))
        .route("/dashboard",        get(dashboard::dashboard))
        .route("/keyword",          get(keywords::keywords_page))
        .route("/channel",          get(channels::channels_page))
        .route("/channel/{id}",     get(channels::channel_detail_page))
        .route("/video",            get(videos::videos_page))
        .route("/video/group",      get(videos::video_groups_page))

        // SSE streaming
        .route("/api/events", get(sse_handler))

        // API endpoints
        .route("/api/dashboard/stats",          get(dashboard::api_stats))
        .route("/api/channels/search",          post(channels::api_search))
        .route("/api/channel/benchmark-status",
            get(channels::api_benchmark_status).put(channels::api_set_benchmark_status))
        .route("/api/channel/benchmark",        post(channels::api_mark_benchmark))
        .route("/api/channel/blacklist",        put(channels::api_blacklist))
        .route("/api/channel/{id}",             get(channels::api_history))
        .route("/api/video",                    get(videos::api_list))
        .route("/api/video/group",              get(videos::api_group))
        .route("/api/video/group/channel",      get(videos::api_group_channel))
        .route("/api/keywords",
            get(keywords::api_list).post(keywords::api_create).delete(keywords::api_delete))
        .route("/api/keywords/all",             get(keywords::api_all))
        .route("/api/keywords/suggestions",     get(keywords::api_suggestions))

        // Applies to every route registered above
        .method_not_allowed_fallback(method_not_allowed)

        // Static files
        .nest_service("/static", ServeDir::new(static_dir))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
