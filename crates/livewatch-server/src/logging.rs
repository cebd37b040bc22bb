use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use rand::Rng;
use std::fmt::Write;
use std::time::Instant;

pub const TRACE_HEADER: &str = "X-Trace-Id";

/// Per-request trace id, stored in request extensions.
#[derive(Clone)]
pub struct TraceId(pub String);

impl std::ops::Deref for TraceId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl TraceId {
    /// 16 hex characters from 8 random bytes.
    pub fn generate() -> Self {
        let bytes: [u8; 8] = rand::thread_rng().gen();
        let mut s = String::with_capacity(16);
        for b in bytes {
            let _ = write!(s, "{b:02x}");
        }
        Self(s)
    }
}

const MAX_BODY_LOG_CHARS: usize = 200;
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Snippet of a UTF-8 body, cut at a char boundary.
fn body_snippet(bytes: &[u8]) -> String {
    let Ok(s) = std::str::from_utf8(bytes) else {
        return "<non-utf8 body>".to_string();
    };
    if s.len() <= MAX_BODY_LOG_CHARS {
        return s.to_string();
    }
    let mut end = MAX_BODY_LOG_CHARS;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

fn format_elapsed(elapsed_us: u128) -> String {
    match elapsed_us {
        0..=999 => format!("{elapsed_us}µs"),
        1000..=999_999 => format!("{}ms", elapsed_us / 1000),
        _ => format!("{:.1}s", elapsed_us as f64 / 1_000_000.0),
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"))
}

fn log_response(trace_id: &str, status: StatusCode, elapsed: &str, body: &str) {
    let status_code = status.as_u16();
    if status.is_server_error() {
        tracing::error!(trace_id, status = status_code, elapsed, body, "<-- response");
    } else if status.is_client_error() {
        tracing::warn!(trace_id, status = status_code, elapsed, body, "<-- response");
    } else {
        tracing::info!(trace_id, status = status_code, elapsed, "<-- response");
    }
}

/// Logs each API request and response, and tags the response with
/// `X-Trace-Id`.
pub async fn request_logging(mut req: Request, next: Next) -> Response {
    let trace_id = TraceId::generate();
    req.extensions_mut().insert(trace_id.clone());

    // Swagger UI assets
    if req.uri().path().starts_with("/docs") {
        return next.run(req).await;
    }

    let start = Instant::now();
    let trace: &str = &trace_id;
    let method = req.method().clone();
    let url = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();

    let req = if matches!(method.as_str(), "POST" | "PUT" | "PATCH") {
        let (parts, body) = req.into_parts();
        let bytes = match axum::body::to_bytes(body, MAX_REQUEST_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(trace_id = %trace, method = %method, path = %url, error = %e, "--> request body rejected");
                let mut response = crate::api::error_response(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    trace,
                    "payload_too_large",
                    &format!("Request body exceeds {MAX_REQUEST_BODY_BYTES} bytes or could not be read"),
                );
                let elapsed = format_elapsed(start.elapsed().as_micros());
                log_response(trace, response.status(), &elapsed, "");
                if let Ok(val) = HeaderValue::from_str(trace) {
                    response.headers_mut().insert(TRACE_HEADER, val);
                }
                return response;
            }
        };
        if bytes.is_empty() {
            tracing::info!(trace_id = %trace, method = %method, path = %url, "--> request");
        } else {
            tracing::info!(
                trace_id = %trace,
                method = %method,
                path = %url,
                body = %body_snippet(&bytes),
                "--> request"
            );
        }
        Request::from_parts(parts, Body::from(bytes))
    } else {
        tracing::info!(trace_id = %trace, method = %method, path = %url, "--> request");
        req
    };

    let response = next.run(req).await;
    let elapsed = format_elapsed(start.elapsed().as_micros());

    let status = response.status();
    let (parts, body) = response.into_parts();
    let bytes: Bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();
    let snippet = if is_json(&parts.headers) && !bytes.is_empty() {
        body_snippet(&bytes)
    } else {
        String::new()
    };
    log_response(trace, status, &elapsed, &snippet);

    let mut response = Response::from_parts(parts, Body::from(bytes));
    if let Ok(val) = HeaderValue::from_str(trace) {
        response.headers_mut().insert(TRACE_HEADER, val);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_ids_are_16_hex_chars() {
        let id = TraceId::generate();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn long_bodies_are_cut_on_char_boundary() {
        let body = "直播".repeat(100);
        let snippet = body_snippet(body.as_bytes());
        assert!(snippet.ends_with("..."));
        assert!(snippet.len() <= MAX_BODY_LOG_CHARS + 3);
        assert_eq!(body_snippet(b"{\"code\":0}"), "{\"code\":0}");
        assert_eq!(body_snippet(&[0xff, 0xfe]), "<non-utf8 body>");
    }

    #[test]
    fn elapsed_units() {
        assert_eq!(format_elapsed(999), "999µs");
        assert_eq!(format_elapsed(12_500), "12ms");
        assert_eq!(format_elapsed(2_500_000), "2.5s");
    }
}
