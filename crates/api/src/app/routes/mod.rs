use axum::{
    Router,
    routing::{get, post},
};

pub mod session;
pub mod system;

pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/status", get(session::status))
        .route("/catalog", get(session::catalog))
        .route("/history", get(session::history))
        .route("/train", post(session::train))
        .route("/predict", post(session::predict))
}
