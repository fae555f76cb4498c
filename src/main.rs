use std::sync::Arc;

use wireline::config::Config;
use wireline::handlers::Router;
use wireline::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    let port = cfg.port;

    let mut server = server::serve(port, Arc::new(Router::new(cfg))).await?;
    tracing::info!(port, "server started");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    server.close().await?;

    Ok(())
}
