//! Response composer.
//!
//! The only place where a request outcome, good or bad, becomes HTTP.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use faultline_core::{FaultlineError, RequestResult};

/// Success response: the summary line, with the injected status if any.
///
/// `injected` is `None` when the caller did not ask for a status; the
/// response then keeps the default 200 without an explicit write.
pub fn compose(result: &RequestResult, injected: Option<u16>) -> Response {
    let body = result.summary();
    match injected.and_then(|c| StatusCode::from_u16(c).ok()) {
        Some(status) => (status, body).into_response(),
        None => body.into_response(),
    }
}

/// Per-request failure converted to a plain-text error response.
#[derive(Debug)]
pub struct HttpError(pub FaultlineError);

impl From<FaultlineError> for HttpError {
    fn from(e: FaultlineError) -> Self {
        Self(e)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, format!("{}\n", self.0)).into_response()
    }
}
