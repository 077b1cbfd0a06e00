//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: builds the session controller from `Config`
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: response shapes
//! - `errors.rs`: consistent error responses

use axum::{Extension, Router};
use tower::ServiceBuilder;

use restock_infra::SessionController;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router around an existing controller.
pub fn build_app(controller: SessionController) -> Router {
    routes::router()
        .layer(Extension(controller))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::log_requests)))
}
