use std::net::SocketAddr;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use filechanger::config::AppConfig;
use filechanger::state::AppState;
use filechanger::utils::net::local_ip;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,filechanger=debug")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    info!(
        state = %config.storage.state_path().display(),
        uploads = %config.storage.upload_dir.display(),
        "Opening data directories"
    );
    let state = AppState::init(config).await?;
    let app = filechanger::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    let port = listener.local_addr()?.port();
    info!("Server running at http://{addr} (LAN: http://{}:{port})", local_ip().await);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
