//! Request logging middleware.
//!
//! One line per request with the API area it hit, status and latency. Every
//! response carries an `x-request-id` so client reports can be matched to logs.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Which part of the API a path belongs to
fn api_area(path: &str) -> &'static str {
    let rest = path.strip_prefix("/api/").unwrap_or("");
    match rest.split('/').next() {
        Some("public") => "public",
        Some("admin") => "admin",
        Some("auth") => "auth",
        _ => "other",
    }
}

pub async fn request_logging(
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if path == "/health" {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let area = api_area(&path);
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let client_ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string());

    let span = tracing::info_span!(
        "request",
        id = %request_id,
        area,
        client_ip = %client_ip,
    );

    let start = Instant::now();
    let mut response = next.run(request).instrument(span).await;
    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status();

    if status.is_server_error() {
        warn!(id = %request_id, %method, %path, area, status = status.as_u16(), latency_ms, "Request failed");
    } else {
        info!(id = %request_id, %method, %path, area, status = status.as_u16(), latency_ms, "Request completed");
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
