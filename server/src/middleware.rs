//! Response middleware.

use axum::body::Body;
use axum::http::{HeaderValue, Request, header};
use axum::middleware::Next;
use axum::response::Response;

/// Mark every response as JSON.
///
/// Install with `axum::middleware::from_fn(json_content_type)`. A
/// `Content-Type` set by the handler is replaced.
pub async fn json_content_type(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}
