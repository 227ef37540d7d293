use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use room_relay::config::{Cli, ServerConfig};
use room_relay::{ChatError, RoomManager, server};

#[tokio::main]
async fn main() -> Result<(), ChatError> {
    let config = ServerConfig::from(Cli::parse());

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("room_relay=info"));
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let manager = RoomManager::new();
    for room in &config.rooms {
        if let Err(e) = manager.create_room(room) {
            warn!(room = %room, error = %e, "skipping startup room");
        }
    }

    let listener = TcpListener::bind(config.bind_addr()).await?;

    tokio::select! {
        result = server::serve(listener, manager, config) => result?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }

    Ok(())
}
