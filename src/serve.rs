use anyhow::{Context, Result};
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tracing::{info, warn};

use crate::extract;
use crate::fetch;
use crate::output::{self, Format};

#[derive(Deserialize)]
struct ExtractParams {
    src: Option<String>,
    format: Option<Format>,
}

/// Serve extraction over HTTP: GET /extract?src=<url>&format=<fmt>.
pub async fn run(addr: &str) -> Result<()> {
    let app = Router::new().route("/extract", get(extract_handler));

    info!("Listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn extract_handler(Query(params): Query<ExtractParams>) -> Response {
    let Some(src) = params.src else {
        return (StatusCode::BAD_REQUEST, "no source URL provided").into_response();
    };
    let format = params.format.unwrap_or(Format::Json);

    let client = match fetch::client() {
        Ok(c) => c,
        Err(e) => return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    };
    let html = match fetch::fetch_page(&client, &src).await {
        Ok(h) => h,
        Err(e) => {
            warn!("Fetch failed for {}: {}", src, e);
            return (StatusCode::BAD_GATEWAY, e.to_string()).into_response();
        }
    };

    let quads = extract::extract_quads(&html);
    let mut body = Vec::new();
    if let Err(e) = output::write_quads(&quads, &mut body, format) {
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    ([(header::CONTENT_TYPE, format.content_type())], body).into_response()
}
