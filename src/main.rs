use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use miniredis::config::Config;
use miniredis::server::Server;
use miniredis::snapshot;
use miniredis::storage::Store;

/// Minimal RESP key-value server with per-key expiry and legacy snapshot
/// bootstrap.
#[derive(Debug, Parser)]
#[command(name = "miniredis")]
struct Cli {
    /// Directory containing the snapshot file
    #[arg(long)]
    dir: Option<String>,

    /// Snapshot file name inside --dir
    #[arg(long)]
    dbfilename: Option<String>,

    /// Port to listen on
    #[arg(long, default_value_t = 6379)]
    port: u16,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = Arc::new(Config {
        dir: cli.dir,
        dbfilename: cli.dbfilename,
        port: cli.port,
    });

    let store = Store::new();

    // Seed the store once before serving traffic. With either --dir or
    // --dbfilename missing there is simply no snapshot to load.
    if let Some((dir, dbfilename)) = config.snapshot_location() {
        match snapshot::load(dir, dbfilename) {
            Ok(entries) => {
                log::info!("Loaded {} keys from snapshot", entries.len());
                store.load_all(entries);
            }
            Err(e) => log::error!("Failed to load startup snapshot: {}", e),
        }
    }

    let server = Server::new(Arc::clone(&config), store)
        .with_context(|| format!("failed to bind port {}", config.port))?;
    server.run().context("server accept loop failed")?;

    Ok(())
}
