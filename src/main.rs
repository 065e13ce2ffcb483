//! Blindbeat - multiplayer music guessing game server
//!
//! Players guess the title and artist of whatever the linked Spotify
//! account is playing; the round advances when both are found.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use blindbeat::config::Config;
use blindbeat::net::GameServer;
use blindbeat::provider::SpotifyProvider;
use blindbeat::session::Session;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Address to listen on (overrides config)
    #[arg(short, long)]
    bind: Option<String>,

    /// Path to an alternate config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }

    // Setup logging: --verbose wins over the configured level
    let level = if args.verbose {
        Level::DEBUG
    } else {
        config.log_level.parse().unwrap_or(Level::INFO)
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("🎵 Blindbeat v{} starting...", env!("CARGO_PKG_VERSION"));

    let provider = Arc::new(SpotifyProvider::new(&config)?);
    // Clients are only greeted once the provider credentials check out
    provider.ensure_token().await?;
    info!("🔑 Spotify provider authenticated");

    let session = Arc::new(Session::new(
        provider,
        Duration::from_millis(config.settle_delay_ms),
    ));

    // Open the first round with whatever is already playing; a silent
    // provider just leaves the round waiting for a track
    session.request_next_track(false).await;

    let server = GameServer::bind(&config.bind_address, session).await?;
    info!("✅ Blindbeat ready - waiting for players");
    server.run().await
}
