use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
};
use log::{error, info, warn};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

use crate::error::{ServiceError, SummaryError};
use crate::pipeline::SummaryService;

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>YouTube Summarizer</title></head>
<body>
<h1>YouTube Summarizer</h1>
<form method="post" action="/">
  <input type="url" name="video_url" placeholder="https://www.youtube.com/watch?v=..." size="60" required>
  <button type="submit">Summarize</button>
</form>
</body>
</html>
"#;

pub type AppState = Arc<SummaryService>;

/// Form payload for POST /
#[derive(Debug, Deserialize)]
pub struct SummarizeForm {
    #[serde(default)]
    pub video_url: String,
}

/// JSON error body: `{"error": "...", "kind": "..."}`
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::InvalidUrl { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Captions(_) => StatusCode::NOT_FOUND,
            ServiceError::Summary(SummaryError::MissingApiKey { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Summary(_) => StatusCode::BAD_GATEWAY,
        };
        ApiError {
            status,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message, "kind": self.kind }));
        (self.status, body).into_response()
    }
}

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/", get(handle_index).post(handle_summarize))
        .with_state(service)
}

async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn handle_summarize(
    State(service): State<AppState>,
    Form(form): Form<SummarizeForm>,
) -> Result<Html<String>, ApiError> {
    let url = form.video_url.trim();
    info!("Summary requested for {url}");

    match service.summarize_url(url).await {
        Ok(summary) => Ok(Html(summary)),
        Err(e) => {
            match e {
                ServiceError::InvalidUrl { ref input } => warn!("Rejected invalid URL: {input:?}"),
                ref other => error!("Summary for {url} failed: {other}"),
            }
            Err(e.into())
        }
    }
}

/// Serve until Ctrl-C
pub async fn serve(service: AppState, bind: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {e}");
            }
            info!("Shutting down");
        })
        .await
}
