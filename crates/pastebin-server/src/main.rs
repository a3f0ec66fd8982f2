//! pastebin HTTP server.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tower_http::trace::TraceLayer;

use pastebin_server::server::{AppState, Config, Overrides, init_logging, router, spawn_sweeper};

/// pastebin HTTP server.
#[derive(Parser, Debug)]
#[command(name = "pastebin-server")]
#[command(about = "Minimal paste service with content-derived or sequential keys")]
struct Args {
    /// Path to the configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "PASTEBIN_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind.
    #[arg(long, env = "BIND")]
    bind: Option<String>,

    /// Port to listen on.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Path segment pastes are POSTed to.
    #[arg(long, env = "ENDPOINT")]
    endpoint: Option<String>,

    /// Store connection string, e.g. `hash://./data` or `counter://./data`.
    #[arg(long, env = "STORE_URL")]
    store_url: Option<String>,

    /// URL notified of every new paste.
    #[arg(long, env = "WEBHOOK_URL")]
    webhook_url: Option<String>,

    /// Host used in returned paste URLs.
    #[arg(long, env = "PUBLIC_HOST")]
    public_host: Option<String>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            bind: self.bind.clone(),
            port: self.port,
            endpoint: self.endpoint.clone(),
            store_url: self.store_url.clone(),
            webhook_url: self.webhook_url.clone(),
            public_host: self.public_host.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration first (needed for logging setup)
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    config.apply(args.overrides());
    config.validate()?;

    init_logging(&config.logging)?;

    tracing::info!("Opening store {}", config.store.url);
    let state = AppState::from_config(&config)?;
    tracing::info!("Your POST endpoint is {}", state.endpoint_path());
    if let Some(webhook) = state.webhook() {
        tracing::info!("Announcing new pastes to {}", webhook.url());
    }

    let sweeper = config.sweep_interval().map(|interval| {
        tracing::info!("Sweeping expired pastes every {}s", interval.as_secs());
        spawn_sweeper(state.store_handle(), interval)
    });

    let app = router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.bind_addr().parse()?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    tracing::info!("Server shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
