use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use std::time::Instant;

use crate::state::AppState;

const REDACTED: &str = "[REDACTED]";

/// Body keys whose values never reach the log, matched case-insensitively.
const SENSITIVE_FIELDS: [&str; 10] = [
    "password",
    "old_password",
    "new_password",
    "encrypted_password",
    "token",
    "access_token",
    "refresh_token",
    "authorization",
    "secret",
    "api_key",
];

const SENSITIVE_HEADERS: [&str; 5] = [
    "authorization",
    "cookie",
    "set-cookie",
    "x-api-key",
    "x-auth-token",
];

fn should_ignore_path(path: &str) -> bool {
    matches!(path, "/health" | "/health/") || path.starts_with("/swagger-ui")
}

/// Redacts sensitive keys at any depth.
pub fn filter_sensitive_data(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| {
                    let lowered = key.to_ascii_lowercase();
                    if SENSITIVE_FIELDS.contains(&lowered.as_str()) {
                        (key, Value::String(REDACTED.to_string()))
                    } else {
                        (key, filter_sensitive_data(value))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(filter_sensitive_data).collect()),
        other => other,
    }
}

pub fn filter_sensitive_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered_headers = headers.clone();
    for name in SENSITIVE_HEADERS {
        if filtered_headers.contains_key(name) {
            filtered_headers.insert(name, HeaderValue::from_static(REDACTED));
        }
    }
    filtered_headers
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .map(|ct| ct.starts_with("application/json"))
        .unwrap_or(false)
}

fn json_for_log(headers: &HeaderMap, bytes: &[u8]) -> Value {
    if !is_json(headers) {
        return Value::Object(serde_json::Map::new());
    }
    serde_json::from_slice::<Value>(bytes)
        .map(filter_sensitive_data)
        .unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

pub async fn http_logger(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> std::result::Result<impl IntoResponse, (StatusCode, String)> {
    let start_time = Instant::now();

    let method = req.method().clone();
    let uri = req.uri().clone();
    let path = uri.path().to_string();

    if should_ignore_path(&path) || method == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let version = req.version();
    let req_headers = req.headers().clone();
    let x_request_id = req_headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    // Only JSON bodies are buffered; uploads stream through untouched
    let (req, req_body) = if is_json(&req_headers) {
        let (parts, body) = req.into_parts();
        let bytes = buffer_body("request", body).await?;
        let req_body = json_for_log(&req_headers, &bytes);
        (Request::from_parts(parts, Body::from(bytes)), req_body)
    } else {
        (req, Value::Object(serde_json::Map::new()))
    };

    let mut response = next.run(req).await;

    let latency = start_time.elapsed();
    let status = response.status();
    let res_headers = response.headers().clone();

    let should_log_body =
        matches!(method, Method::POST | Method::PUT | Method::PATCH) && is_json(&res_headers);
    let res_body = if should_log_body {
        let (parts, body) = response.into_parts();
        let bytes = buffer_body("response", body).await?;
        let json_body = json_for_log(&res_headers, &bytes);
        response = Response::from_parts(parts, Body::from(bytes));
        json_body
    } else {
        Value::Object(serde_json::Map::new())
    };

    tracing::info!(
        method = ?method,
        path = %path,
        query = uri.query().unwrap_or(""),
        x_request_id = %x_request_id,
        version = ?version,
        req_headers = ?filter_sensitive_headers(&req_headers),
        req_body = %req_body,
        status = status.as_u16(),
        latency_ms = latency.as_millis(),
        res_headers = ?filter_sensitive_headers(&res_headers),
        res_body = %res_body,
        app_env = %state.config.app_env,
        "HTTP request completed"
    );

    Ok(response)
}

pub async fn buffer_body<B>(
    direction: &str,
    body: B,
) -> std::result::Result<Bytes, (StatusCode, String)>
where
    B: BodyExt,
    B::Error: std::fmt::Display,
{
    match body.collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(err) => Err((
            StatusCode::BAD_REQUEST,
            format!("failed to read {direction} body: {err}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redacts_nested_sensitive_fields() {
        let body = json!({
            "email": "a@b.com",
            "Password": "hunter22",
            "session": {"access_token": "abc", "expires_in": 3600},
            "items": [{"new_password": "x"}]
        });

        let filtered = filter_sensitive_data(body);
        assert_eq!(filtered["email"], "a@b.com");
        assert_eq!(filtered["Password"], REDACTED);
        assert_eq!(filtered["session"]["access_token"], REDACTED);
        assert_eq!(filtered["session"]["expires_in"], 3600);
        assert_eq!(filtered["items"][0]["new_password"], REDACTED);
    }

    #[test]
    fn redacts_auth_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let filtered = filter_sensitive_headers(&headers);
        assert_eq!(filtered[header::AUTHORIZATION], REDACTED);
        assert_eq!(filtered[header::ACCEPT], "application/json");
    }

    #[test]
    fn skips_health_and_docs() {
        assert!(should_ignore_path("/health"));
        assert!(should_ignore_path("/swagger-ui/index.html"));
        assert!(!should_ignore_path("/api/v1/students"));
    }
}
