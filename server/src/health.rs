//! Readiness and liveness handlers.
//!
//! Each handler owns one [`HealthFlag`]; the flag returned alongside it is
//! the only way to change what the handler reports.

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{MethodRouter, any};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Body returned while the flag is down.
pub const UNAVAILABLE_BODY: &str = "Service Unavailable";
/// Body returned while the flag is up.
pub const OK_BODY: &str = "OK";

/// Shared health state.
#[derive(Debug, Clone, Default)]
pub struct HealthFlag(Arc<AtomicBool>);

impl HealthFlag {
    /// Create a flag with the given state.
    #[must_use]
    pub fn new(initial: bool) -> Self {
        Self(Arc::new(AtomicBool::new(initial)))
    }

    /// Update the state.
    pub fn set(&self, healthy: bool) {
        self.0.store(healthy, Ordering::SeqCst);
    }

    /// Current state.
    #[must_use]
    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Status and body for the current state.
    #[must_use]
    pub fn response(&self) -> (StatusCode, &'static str) {
        if self.get() {
            (StatusCode::OK, OK_BODY)
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE_BODY)
        }
    }
}

/// Build a handler answering 200 while its flag is up and 503 otherwise.
///
/// The handler accepts any method.
#[must_use]
pub fn atomic_handler(initial: bool) -> (MethodRouter, HealthFlag) {
    let flag = HealthFlag::new(initial);
    let state = flag.clone();
    let handler = any(move || {
        let state = state.clone();
        async move { state.response() }
    });
    (handler, flag)
}

/// Register independent readiness and liveness handlers, both initially
/// down.
///
/// Returns the router with both routes and the `(ready, live)` flags.
#[must_use]
pub fn register_readiness_liveness(
    router: Router,
    ready_path: &str,
    live_path: &str,
) -> (Router, HealthFlag, HealthFlag) {
    let (ready_handler, ready) = atomic_handler(false);
    let (live_handler, live) = atomic_handler(false);
    debug!(ready_path, live_path, "registering health handlers");
    let router = router
        .route(ready_path, ready_handler)
        .route(live_path, live_handler);
    (router, ready, live)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn probe(router: &Router, path: &str) -> (StatusCode, String) {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_flag_response() {
        let flag = HealthFlag::new(false);
        assert_eq!(
            flag.response(),
            (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
        );
        flag.set(true);
        assert_eq!(flag.response(), (StatusCode::OK, "OK"));
    }

    #[test]
    fn test_default_flag_is_down() {
        assert!(!HealthFlag::default().get());
    }

    #[tokio::test]
    async fn test_atomic_handler_follows_flag() {
        let (handler, flag) = atomic_handler(false);
        let router = Router::new().route("/health", handler);

        assert_eq!(
            probe(&router, "/health").await,
            (StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE_BODY.to_string())
        );

        flag.set(true);
        assert_eq!(
            probe(&router, "/health").await,
            (StatusCode::OK, OK_BODY.to_string())
        );

        flag.set(false);
        assert_eq!(probe(&router, "/health").await.0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_atomic_handler_initially_up() {
        let (handler, _flag) = atomic_handler(true);
        let router = Router::new().route("/health", handler);
        assert_eq!(probe(&router, "/health").await.0, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ready_and_live_are_independent() {
        let (router, ready, live) = register_readiness_liveness(Router::new(), "/ready", "/live");

        assert_eq!(probe(&router, "/ready").await.0, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(probe(&router, "/live").await.0, StatusCode::SERVICE_UNAVAILABLE);

        ready.set(true);
        assert_eq!(probe(&router, "/ready").await.0, StatusCode::OK);
        assert_eq!(probe(&router, "/live").await.0, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!live.get());

        live.set(true);
        ready.set(false);
        assert_eq!(probe(&router, "/ready").await.0, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(probe(&router, "/live").await.0, StatusCode::OK);
    }
}
