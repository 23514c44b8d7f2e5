use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use transperth_server::cache::CachedTransperthClient;
use transperth_server::config::{AppConfig, Args};
use transperth_server::coordinator::Coordinator;
use transperth_server::transperth::{AnySource, MockTransperthClient, TransperthClient};
use transperth_server::web::{AppState, create_router};

/// Default log filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "transperth_server=info,tower_http=info";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load(&args)?;

    let source = match &config.mock_data {
        Some(dir) => {
            warn!(dir = %dir.display(), "serving canned planner responses");
            AnySource::Mock(MockTransperthClient::new(dir)?)
        }
        None => {
            let client = TransperthClient::new(config.transperth.clone())?;
            AnySource::Live(CachedTransperthClient::new(client, &config.cache))
        }
    };

    for route in &config.routes {
        info!(route = %route.name, from = %route.from.name, to = %route.to.name, "configured route");
    }

    let coordinator = Arc::new(Coordinator::new(
        source,
        config.routes,
        config.scan_interval,
        config.utc_offset,
    ));

    // Ctrl-C stops both the refresh loop and the server
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("shutdown requested"),
            Err(e) => error!(error = %e, "failed to listen for ctrl-c"),
        }
        let _ = shutdown_tx.send(true);
    });

    let refresher = tokio::spawn(Arc::clone(&coordinator).run(wait_for(shutdown_rx.clone())));

    let app = create_router(AppState::new(coordinator));
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!("Transperth journey sensors listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for(shutdown_rx))
        .await?;

    refresher.await?;
    info!("stopped");
    Ok(())
}

async fn wait_for(mut shutdown: watch::Receiver<bool>) {
    // An error means the sender is gone, which also means shut down
    let _ = shutdown.wait_for(|stop| *stop).await;
}
