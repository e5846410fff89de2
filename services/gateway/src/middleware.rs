//! Request middleware for the gateway

use std::any::Any;

use axum::{
    Json,
    body::{Body, Bytes, to_bytes},
    http::{Method, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::sanitize::sanitize_value;

/// Largest JSON body the sanitizer buffers
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

fn is_sanitized_request(req: &Request<Body>) -> bool {
    let writes = matches!(*req.method(), Method::POST | Method::PUT | Method::PATCH);
    let is_json = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    writes && is_json
}

/// Sanitize string values of JSON request bodies before they reach a handler
///
/// Bodies that do not parse as a JSON object or array are passed through
/// untouched so the handler reports the parse error.
pub async fn sanitize_json_body(req: Request<Body>, next: Next) -> Response {
    if !is_sanitized_request(&req) {
        return next.run(req).await;
    }

    let (mut parts, body) = req.into_parts();
    let bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Rejected request body on {}: {}", parts.uri.path(), e);
            return (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({"error": "Request body too large"})),
            )
                .into_response();
        }
    };

    let bytes = match serde_json::from_slice::<Value>(&bytes) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => {
            match serde_json::to_vec(&sanitize_value(value)) {
                Ok(clean) => {
                    parts.headers.remove(header::CONTENT_LENGTH);
                    Bytes::from(clean)
                }
                Err(e) => {
                    warn!("Failed to re-encode sanitized body: {}", e);
                    bytes
                }
            }
        }
        _ => bytes,
    };

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Turn a handler panic into a generic 500 response
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Unhandled panic while serving request: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Internal server error"})),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, middleware, routing::post};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn echo(body: Bytes) -> Bytes {
        body
    }

    fn app() -> Router {
        Router::new()
            .route("/echo", post(echo).put(echo))
            .layer(middleware::from_fn(sanitize_json_body))
    }

    async fn send(method: &str, content_type: &str, body: &str) -> Bytes {
        let req = Request::builder()
            .method(method)
            .uri("/echo")
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_json_strings_are_sanitized() {
        let body = send(
            "POST",
            "application/json; charset=utf-8",
            r#"{"message":"<b>hi</b>","n":[1," x "]}"#,
        )
        .await;
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({"message": "&lt;b&gt;hi&lt;/b&gt;", "n": [1, "x"]}));
    }

    #[tokio::test]
    async fn test_put_is_sanitized() {
        let body = send("PUT", "application/json", r#"["javascript:go"]"#).await;
        assert_eq!(&body[..], br#"["go"]"#);
    }

    #[tokio::test]
    async fn test_non_json_passes_through() {
        let body = send("POST", "text/plain", "<b>hi</b>").await;
        assert_eq!(&body[..], b"<b>hi</b>");
    }

    #[tokio::test]
    async fn test_malformed_json_passes_through() {
        let body = send("POST", "application/json", "{\"message\": <b>").await;
        assert_eq!(&body[..], b"{\"message\": <b>");
    }

    #[tokio::test]
    async fn test_scalar_json_passes_through() {
        let body = send("POST", "application/json", "\"<b>\"").await;
        assert_eq!(&body[..], b"\"<b>\"");
    }

    #[test]
    fn test_panic_becomes_internal_error() {
        let resp = handle_panic(Box::new("boom"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
