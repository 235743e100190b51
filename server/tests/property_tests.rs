//! Property-based tests for health handlers and configuration.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use proptest::prelude::*;
use svc_server::{ServerConfig, atomic_handler, register_readiness_liveness};
use tower::ServiceExt;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

async fn status(router: &Router, path: &str) -> StatusCode {
    router
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap()
        .status()
}

fn expected(healthy: bool) -> StatusCode {
    if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// The handler always reports the last update, even under concurrency.
    #[test]
    fn prop_handler_reports_last_update(
        updates in proptest::collection::vec(any::<bool>(), 0..10),
        callers in 1usize..16,
    ) {
        let rt = runtime();
        let observed = rt.block_on(async {
            let (handler, flag) = atomic_handler(false);
            let router = Router::new().route("/health", handler);
            for update in &updates {
                flag.set(*update);
            }
            let mut probes = tokio::task::JoinSet::new();
            for _ in 0..callers {
                let router = router.clone();
                probes.spawn(async move { status(&router, "/health").await });
            }
            probes.join_all().await
        });

        let want = expected(updates.last().copied().unwrap_or(false));
        prop_assert!(observed.iter().all(|s| *s == want));
    }

    /// Updating readiness never changes liveness and vice versa.
    #[test]
    fn prop_ready_and_live_independent(ready_state in any::<bool>(), live_state in any::<bool>()) {
        let rt = runtime();
        let (ready_status, live_status) = rt.block_on(async {
            let (router, ready, live) =
                register_readiness_liveness(Router::new(), "/ready", "/live");
            ready.set(ready_state);
            live.set(live_state);
            (status(&router, "/ready").await, status(&router, "/live").await)
        });

        prop_assert_eq!(ready_status, expected(ready_state));
        prop_assert_eq!(live_status, expected(live_state));
    }

    /// Any absolute, distinct pair of paths is a valid configuration.
    #[test]
    fn prop_absolute_paths_validate(ready in "/[a-z]{1,10}", live in "/[a-z]{1,10}") {
        let result = ServerConfig::default().with_health_paths(ready.clone(), live.clone()).validate();
        prop_assert_eq!(result.is_ok(), ready != live);
    }
}
