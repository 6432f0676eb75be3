// crates/backend-lib/src/middleware/diagnostics.rs

//! Development-only error detail on server failures.
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::{error::ErrorReport, AppState};

/// In development, rebuild 5xx bodies with the underlying error under
/// `trace`. Production responses pass through untouched.
pub async fn attach_diagnostics(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !state.settings.is_development() {
        return response;
    }

    let Some(report) = response.extensions().get::<ErrorReport>().cloned() else {
        return response;
    };

    let body = serde_json::json!({
        "error": report.message,
        "code": report.code,
        "trace": report.detail,
    });
    (response.status(), Json(body)).into_response()
}
