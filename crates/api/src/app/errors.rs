use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use restock_session::SessionError;

pub fn session_error_to_response(err: SessionError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        SessionError::ActionNotAllowed { .. } => {
            json_error(StatusCode::CONFLICT, "action_not_allowed", message)
        }
        SessionError::InvalidTransition { .. } => {
            json_error(StatusCode::CONFLICT, "invalid_transition", message)
        }
        SessionError::MissingModel => json_error(StatusCode::CONFLICT, "missing_model", message),
        SessionError::InvalidCatalog(_) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "invalid_catalog", message)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
