use std::sync::Arc;

use restock_infra::{Config, ControllerSettings, HttpProductSource, SessionController};

/// Controller backed by the configured HTTP product source.
pub fn build_controller(config: &Config) -> SessionController {
    let source = HttpProductSource::new(config.products_url.clone()).with_timeout(config.http_timeout);
    SessionController::new(Arc::new(source), ControllerSettings::from_config(config))
}
