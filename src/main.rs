use std::net::SocketAddr;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};
use va_covid_dashboard::{AppState, Config, load_table, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    info!("starting with {config:?}");
    if config.app_token.is_none() {
        info!("no Socrata app token configured, requests are unauthenticated");
    }

    let (table, join_report) = match load_table(&config).await {
        Ok(loaded) => loaded,
        Err(err) => {
            error!("failed to build unified table: {err}");
            return Err(err.into());
        }
    };

    let state = AppState::new(&config, table, join_report);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
