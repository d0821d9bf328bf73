use rag_slack::api::{create_router, AppState};
use rag_slack::infrastructure::{build_dispatcher, telemetry, AppConfig, Components};
use std::net::SocketAddr;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init_tracing("api=debug,rag_slack=debug,tower_http=debug");

    let config = AppConfig::load()?;
    let components = Components::from_config(&config)?;
    info!(
        vector_store = ?config.config.vector_store.backend,
        embedding = ?config.config.embedding.backend,
        "Services initialized"
    );

    let dispatcher = build_dispatcher(&config, components.runner.clone())?;
    info!(backend = ?config.config.worker.backend, "Job dispatcher initialized");

    let addr = SocketAddr::new(config.config.server.host.parse()?, config.config.server.port);
    let state = AppState::new(components, dispatcher, config);
    let app = create_router(state);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
