use std::error::Error;
use std::future::Future;

use dotenvy::dotenv;
use tracing::info;

mod analysis;
mod config;
mod error;
mod handlers;
mod llm;
mod state;
mod styling;
#[cfg(test)]
mod testing;
mod utils;

use config::Config;
use state::AppState;
use utils::logging::init_logging;

type MainResult = Result<(), Box<dyn Error + Send + Sync>>;

async fn ensure_directories(config: &Config) -> std::io::Result<()> {
    for dir in [&config.upload_dir, &config.templates_dir, &config.static_dir] {
        tokio::fs::create_dir_all(dir).await?;
    }
    Ok(())
}

/// Resolves once `signal` fires. A signal that cannot be installed never resolves.
async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(err) = signal.await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await;
}

#[tokio::main]
async fn main() -> MainResult {
    dotenv().ok();

    let config = Config::load()?;
    let _guards = init_logging(&config.log_level, &config.logs_dir);

    ensure_directories(&config).await?;
    let addr = config.socket_addr()?;

    let state = AppState::new(config)?;

    info!("{}", "=".repeat(70));
    info!(" STARTING AI STYLING PLATFORM ");
    info!(" Model Selected: {}", state.llm.model());
    info!(" Local Server: http://{}", addr);
    info!("{}", "=".repeat(70));

    let app = handlers::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn failed_signal_registration_keeps_waiting() {
        let failing = async { Err(std::io::Error::other("no signal handler")) };
        let waited =
            tokio::time::timeout(Duration::from_millis(50), wait_for_shutdown(failing)).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn delivered_signal_resolves() {
        let waited =
            tokio::time::timeout(Duration::from_millis(50), wait_for_shutdown(async { Ok(()) }))
                .await;
        assert!(waited.is_ok());
    }
}
