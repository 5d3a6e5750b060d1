//! Metrics instrumentation chain.
//!
//! Three nested axum middlewares, outer to inner:
//! in-flight gauge -> duration histogram -> status/method counter.
//!
//! Each stage observes the response produced by everything inside it, so
//! early rejections (bad `dep`, query rejections, timeouts) are recorded with
//! the status actually sent. The in-flight gauge is released by a drop guard;
//! a request whose future is dropped before responding is neither timed nor
//! counted because no status was ever sent.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::{self, Next},
    response::Response,
    Router,
};

use super::metrics::SharedRecorder;

/// Fixed `handler` label on the duration histogram.
pub const ROOT_HANDLER: &str = "root";

/// Wrap every route (and the fallback) of `router` in the chain.
pub fn instrument<S>(router: Router<S>, recorder: SharedRecorder) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    // axum applies the last layer outermost.
    router
        .layer(middleware::from_fn_with_state(recorder.clone(), count_requests))
        .layer(middleware::from_fn_with_state(recorder.clone(), time_requests))
        .layer(middleware::from_fn_with_state(recorder, track_in_flight))
}

struct InFlightGuard {
    recorder: SharedRecorder,
}

impl InFlightGuard {
    fn enter(recorder: SharedRecorder) -> Self {
        recorder.inc_in_flight();
        Self { recorder }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.recorder.dec_in_flight();
    }
}

fn method_label(method: &Method) -> String {
    method.as_str().to_ascii_lowercase()
}

async fn track_in_flight(State(recorder): State<SharedRecorder>, req: Request, next: Next) -> Response {
    let _guard = InFlightGuard::enter(recorder);
    next.run(req).await
}

async fn time_requests(State(recorder): State<SharedRecorder>, req: Request, next: Next) -> Response {
    let method = method_label(req.method());
    let start = Instant::now();

    let res = next.run(req).await;

    recorder.observe_duration(
        &[
            ("handler", ROOT_HANDLER),
            ("code", res.status().as_str()),
            ("method", &method),
        ],
        start.elapsed().as_secs_f64(),
    );
    res
}

async fn count_requests(State(recorder): State<SharedRecorder>, req: Request, next: Next) -> Response {
    let method = method_label(req.method());

    let res = next.run(req).await;

    recorder.inc_count(&[("code", res.status().as_str()), ("method", &method)]);
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obs::metrics::{MetricsRecorder, ServiceMetrics};
    use axum::{body::Body, http::StatusCode, routing::get};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app(metrics: Arc<ServiceMetrics>) -> Router {
        let routes = Router::new()
            .route("/", get(|| async { "ok" }))
            .route("/teapot", get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }));
        instrument(routes, metrics as Arc<dyn MetricsRecorder>)
    }

    #[tokio::test]
    async fn each_request_is_counted_and_timed_once() {
        let metrics = Arc::new(ServiceMetrics::default());
        let app = app(metrics.clone());

        for uri in ["/", "/teapot", "/"] {
            let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
            app.clone().oneshot(req).await.unwrap();
        }

        assert_eq!(metrics.in_flight.get(), 0);
        assert_eq!(metrics.requests.get(&[("code", "200"), ("method", "get")]), 2);
        assert_eq!(metrics.requests.get(&[("code", "418"), ("method", "get")]), 1);
        assert_eq!(metrics.requests.total(), 3);
        assert_eq!(
            metrics
                .duration
                .count(&[("handler", "root"), ("code", "418"), ("method", "get")]),
            1
        );
    }

    #[tokio::test]
    async fn dropped_request_releases_in_flight() {
        let metrics = Arc::new(ServiceMetrics::default());
        let routes = Router::new().route(
            "/",
            get(|| async {
                tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                "late"
            }),
        );
        let app = instrument(routes, metrics.clone() as Arc<dyn MetricsRecorder>);

        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let pending = tokio::spawn(app.oneshot(req));
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(metrics.in_flight.get(), 1);

        pending.abort();
        let _ = pending.await;
        assert_eq!(metrics.in_flight.get(), 0);
        assert_eq!(metrics.requests.total(), 0);
    }

    #[test]
    fn methods_are_lowercased() {
        assert_eq!(method_label(&Method::POST), "post");
    }
}
