use std::time::{Duration, Instant};

use axum::{
    extract::{Query, State},
    http::{header::HOST, HeaderMap, Uri},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use faultline_core::error::Result;
use faultline_core::{ExecutionPlan, RequestParameters, RequestResult};

use crate::app_state::AppState;
use crate::dependency;
use crate::handler::respond::{compose, HttpError};

/// `GET /` (and every unmatched path).
///
/// Query: `name`, `dep` (base64 path), `sleep` (ms), `code` (status >= 200).
pub async fn root(
    State(app): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    match serve(&app, &headers, &uri, pairs).await {
        Ok(res) => res,
        Err(e) => {
            if e.is_client_error() {
                tracing::warn!(%uri, error = %e, "rejected request");
            }
            HttpError(e).into_response()
        }
    }
}

async fn serve(
    app: &AppState,
    headers: &HeaderMap,
    uri: &Uri,
    pairs: Vec<(String, String)>,
) -> Result<Response> {
    let params = RequestParameters::from_pairs(pairs);
    let plan = ExecutionPlan::interpret(&params)?;
    let start = Instant::now();

    // replay: paste into another request's `dep` to chain onto this one
    tracing::debug!(name = %plan.name, replay = %STANDARD.encode(uri.to_string()), "request received");

    if plan.has_dependency() {
        let host = request_host(headers).unwrap_or_else(|| app.self_authority());
        tracing::info!(name = %plan.name, dep = %plan.dependency_path, "fetching dependency");
        dependency::invoke(app.dependency_client().as_ref(), &host, &plan.dependency_path).await?;
    }

    inject_latency(plan.sleep_millis).await;

    let result = RequestResult::from_plan(&plan, start.elapsed());
    tracing::info!(
        name = %result.name,
        dep = %result.dependency_path,
        code = result.final_status,
        slept_ms = result.sleep_millis,
        "request served"
    );
    Ok(compose(&result, plan.status_code))
}

fn request_host(headers: &HeaderMap) -> Option<String> {
    headers
        .get(HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .map(str::to_string)
}

/// Suspend only this request's task.
async fn inject_latency(sleep_millis: Option<u64>) {
    match sleep_millis {
        Some(ms) if ms > 0 => tokio::time::sleep(Duration::from_millis(ms)).await,
        _ => {}
    }
}
