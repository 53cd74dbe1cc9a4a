use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use company_enricher::{
    config::Config,
    api::routes::create_router,
    pipeline::Pipeline,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Missing credentials stop us here, before any outbound call
    let config = Config::load()?;
    let server_addr = config.server_addr;

    let app_state = AppState {
        pipeline: Arc::new(Pipeline::new(&config)?),
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
