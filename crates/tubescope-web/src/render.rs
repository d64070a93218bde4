//! HTML page rendering.
//!
//! Templates are compiled into the binary and auto-escaped by file extension.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use minijinja::{context, Environment};
use serde::Serialize;
use thiserror::Error;
use tubescope_common::error::ApiError;

use crate::format::{date_filter, datetime_filter, thousands_filter};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("macros.html", include_str!("../templates/macros.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("keywords.html", include_str!("../templates/keywords.html")),
    ("channels.html", include_str!("../templates/channels.html")),
    ("channel_detail.html", include_str!("../templates/channel_detail.html")),
    ("videos.html", include_str!("../templates/videos.html")),
    ("video_groups.html", include_str!("../templates/video_groups.html")),
];

/// Error from a page handler. Rendered as an HTML error page.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl PageError {
    fn status(&self) -> StatusCode {
        match self {
            PageError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PageError::Api(err) => err.status(),
        }
    }
}

impl From<tubescope_db::DbError> for PageError {
    fn from(err: tubescope_db::DbError) -> Self {
        PageError::Api(ApiError::from(err))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            PageError::Api(ApiError::Internal(source)) => {
                tracing::error!(error = %source, "page failed");
                "Internal server error".to_string()
            }
            PageError::Template(err) => {
                tracing::error!(error = %err, "template render failed");
                "Internal server error".to_string()
            }
            PageError::Api(err) => err.to_string(),
        };
        let body = format!(
            "<!DOCTYPE html><html><head><meta charset=\"UTF-8\"><title>{}</title>\
             <link rel=\"stylesheet\" href=\"/static/css/main.css\"></head>\
             <body><main class=\"main-content\"><h1>{}</h1><p>{}</p>\
             <a href=\"/\">Back to dashboard</a></main></body></html>",
            status.as_u16(),
            status.as_u16(),
            minijinja::HtmlEscape(&message)
        );
        (status, Html(body)).into_response()
    }
}

/// Compiled template set.
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        env.add_filter("thousands", thousands_filter);
        env.add_filter("date", date_filter);
        env.add_filter("datetime", datetime_filter);
        Ok(Self { env })
    }

    /// Render `name` with `ctx`. `active` marks the current sidebar entry.
    pub fn render<S: Serialize>(&self, name: &str, active: &str, ctx: S) -> Result<Html<String>, PageError> {
        let template = self.env.get_template(name)?;
        let html = template.render(context! { active => active, ..minijinja::Value::from_serialize(&ctx) })?;
        Ok(Html(html))
    }
}
