use habit_tracker::models::SaveStatus;
use habit_tracker::{AppState, Config, HabitStore, router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if config.api_token.is_none() {
        warn!("HABIT_API_TOKEN is not set; the month service will treat this session as signed out");
    }

    let state = AppState::new(&config, HabitStore::default())?;
    match state.load_remote().await {
        Ok(true) => {}
        Ok(false) => info!("starting from the default month"),
        Err(err) => warn!("could not load month, starting from the default month: {err}"),
    }

    let saver = Arc::clone(&state.saver);
    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if saver.status() == SaveStatus::Pending {
        info!("sending pending month before exit");
        if let Err(err) = saver.flush().await {
            warn!("final save failed: {err}");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
    }
}
