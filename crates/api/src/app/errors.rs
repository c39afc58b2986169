use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::warn;

use stockwise_intel::IntelError;

pub fn intel_error_to_response(err: IntelError) -> axum::response::Response {
    let retryable = err.is_retryable();
    match err {
        IntelError::InvalidParameter(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_parameter", msg, retryable)
        }
        IntelError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg, retryable),
        IntelError::DataSource(msg) => {
            warn!(error = %msg, "request failed on data source");
            json_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "data_source_error",
                msg,
                retryable,
            )
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
    retryable: bool,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "success": false,
            "error": code,
            "message": message.into(),
            "retryable": retryable,
        })),
    )
        .into_response()
}
