use anyhow::Context;

use restock_infra::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    restock_observability::init();

    let config = Config::from_env().context("invalid configuration")?;
    if config.seed.is_none() {
        tracing::info!("RESTOCK_SEED not set; catalog and weights will differ per run");
    }

    let controller = restock_api::app::services::build_controller(&config);
    controller.start().context("failed to start session")?;

    let app = restock_api::app::build_app(controller);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
