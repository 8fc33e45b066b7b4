use std::sync::Arc;

use copymasters::api::router::create_router;
use copymasters::config::AppConfig;
use copymasters::presenter::MemoryClipboard;
use copymasters::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing(config.json_logs);

    let addr = format!("{}:{}", config.host, config.port);
    let metrics_handle = copymasters::metrics::init_metrics()?;

    let service = config.data_service()?;
    tracing::info!(
        data_source = config.data_source.as_str(),
        base_url = config.api_base_url.as_deref().unwrap_or("-"),
        "Data service ready"
    );

    let state = AppState::new(
        config,
        service,
        Arc::new(MemoryClipboard::default()),
        metrics_handle,
    );
    let session = state.session.clone();
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Invalidate anything still holding on to the session.
    session.logout();
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let registry = tracing_subscriber::registry().with(EnvFilter::from_default_env());
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
