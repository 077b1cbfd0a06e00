use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use restock_infra::SessionController;
use restock_session::SessionError;

use crate::app::{dto, errors};

pub async fn status(Extension(controller): Extension<SessionController>) -> impl IntoResponse {
    Json(controller.status())
}

pub async fn catalog(Extension(controller): Extension<SessionController>) -> impl IntoResponse {
    Json(dto::catalog_to_json(&controller.catalog()))
}

pub async fn history(Extension(controller): Extension<SessionController>) -> impl IntoResponse {
    Json(dto::HistoryView {
        transitions: controller.history(),
        training: controller.training_history(),
    })
}

pub async fn train(Extension(controller): Extension<SessionController>) -> axum::response::Response {
    accepted(&controller, controller.request_train())
}

pub async fn predict(
    Extension(controller): Extension<SessionController>,
) -> axum::response::Response {
    accepted(&controller, controller.request_predict())
}

fn accepted(
    controller: &SessionController,
    result: Result<(), SessionError>,
) -> axum::response::Response {
    match result {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(dto::Accepted {
                accepted: true,
                state: controller.state(),
            }),
        )
            .into_response(),
        Err(e) => errors::session_error_to_response(e),
    }
}
