use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod error;
mod handlers;
mod history;
mod hub;
mod identity;
mod logic;
mod state;
mod store;

use crate::error::ServerError;
use crate::hub::{spawn_board, spawn_trim_task};
use crate::state::{AppState, BoardConfig, HISTORY_LIMIT, MAX_STROKES_PER_USER, TRIM_INTERVAL};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,
    #[arg(long, env = "PUBLIC_DIR")]
    public_dir: Option<PathBuf>,
    #[arg(long, default_value_t = HISTORY_LIMIT)]
    history_limit: usize,
    #[arg(long, default_value_t = TRIM_INTERVAL.as_secs())]
    trim_interval_secs: u64,
    #[arg(long, default_value_t = MAX_STROKES_PER_USER)]
    max_strokes_per_user: usize,
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = BoardConfig {
        history_limit: args.history_limit,
        max_strokes_per_user: args.max_strokes_per_user,
    };
    let public_dir = args
        .public_dir
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../public"));

    let (board, board_task) = spawn_board(config);
    let trim_task = spawn_trim_task(
        board.clone(),
        Duration::from_secs(args.trim_interval_secs.max(1)),
    );

    let app = handlers::app(
        AppState {
            board: board.clone(),
        },
        public_dir,
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    info!(port = args.port, "server is running");
    log_network_addresses(args.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    trim_task.abort();
    if let Ok(stats) = board.stats().await {
        info!(?stats, "final board state");
    }
    board.shutdown()?;
    let _ = board_task.await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

fn log_network_addresses(port: u16) {
    info!("Localhost: http://localhost:{port}");
    let interfaces = match local_ip_address::list_afinet_netifas() {
        Ok(interfaces) => interfaces,
        Err(error) => {
            warn!(%error, "failed to list network interfaces");
            Vec::new()
        }
    };
    let reachable = interfaces
        .into_iter()
        .filter_map(|(name, ip)| match ip {
            IpAddr::V4(v4) if !v4.is_loopback() => Some((name, v4)),
            _ => None,
        })
        .collect::<Vec<_>>();
    if reachable.is_empty() {
        info!("No network interfaces found");
    }
    for (name, ip) in reachable {
        info!("{name}: http://{ip}:{port}");
    }
}
