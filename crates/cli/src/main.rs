mod config;
mod error;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use policy::Capability;
use server::ServerState;
use storage::AdminStore;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;
use error::Result;

const CONFIG_FILE: &str = "muster.toml";

#[derive(Parser)]
#[command(name = "muster")]
#[command(about = "A capability-gated roster admin service", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Config file path
        #[arg(short, long, default_value = CONFIG_FILE)]
        config: PathBuf,
        /// Override the configured bind address
        #[arg(short, long)]
        bind: Option<String>,
        /// Override the configured database path
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
    /// List the capability strings the service understands
    Capabilities,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        // `muster` with no subcommand serves with defaults.
        None => cmd_serve(PathBuf::from(CONFIG_FILE), None, None).await,
        Some(Commands::Serve {
            config,
            bind,
            database,
        }) => cmd_serve(config, bind, database).await,
        Some(Commands::Capabilities) => cmd_capabilities(),
    }
}

async fn cmd_serve(
    config_path: PathBuf,
    bind: Option<String>,
    database: Option<PathBuf>,
) -> Result<()> {
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        warn!(path = %config_path.display(), "config not found, using defaults");
        Config::default()
    };
    if let Some(bind) = bind {
        config.bind = bind;
    }
    if let Some(database) = database {
        config.database = database;
    }

    if config.principals.is_empty() {
        warn!("no principals configured; every request will be rejected");
    }

    let addr: SocketAddr = config.bind.parse()?;
    let store = AdminStore::open(&config.database)?;
    let state = ServerState::new(store, config.authenticator());

    info!("muster v{}", env!("CARGO_PKG_VERSION"));
    info!(database = %config.database.display(), "store opened");

    server::serve(addr, state).await?;
    Ok(())
}

fn cmd_capabilities() -> Result<()> {
    for capability in Capability::ALL {
        println!("{capability}");
    }
    Ok(())
}
