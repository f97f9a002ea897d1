use crate::error::AppError;
use axum::body::Body;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{warn, Instrument};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Reuses the caller's `x-request-id` or assigns a fresh one, echoes it on the
/// response and tags the handler span with it.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let id = match req
        .headers()
        .get(X_REQUEST_ID)
        .filter(|v| !v.is_empty())
        .cloned()
    {
        Some(v) => v,
        None => {
            let fresh = Uuid::new_v4().to_string();
            match HeaderValue::from_str(&fresh) {
                Ok(v) => {
                    req.headers_mut().insert(X_REQUEST_ID, v.clone());
                    v
                }
                Err(e) => {
                    warn!("parse request id error: {e}");
                    return Ok(next.run(req).await);
                }
            }
        }
    };
    let span = tracing::info_span!(
        "request",
        request_id = %String::from_utf8_lossy(id.as_bytes()),
        elapsed_us = tracing::field::Empty,
    );
    let mut res = next.run(req).instrument(span).await;
    res.headers_mut().insert(X_REQUEST_ID, id);
    Ok(res)
}
