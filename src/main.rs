//! caddyctl: inspect and push Caddy configuration through the admin API.
//!
//! ```text
//!   config.json ──▶ decode (registry) ──▶ Config ──▶ encode ──▶ POST /load
//!                                                            ◀── GET /config/...
//! ```
//!
//! Documents are decoded locally before they are sent, so unknown modules
//! and malformed handlers are rejected without touching the server.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::Value;

use caddy_config::config;
use caddy_config::observability::logging;
use caddy_config::settings::watcher::read_document;
use caddy_config::settings::{load_settings, ConfigWatcher, Settings};
use caddy_config::{AdminClient, ModuleRegistry};

#[derive(Parser)]
#[command(name = "caddyctl")]
#[command(about = "Typed client for the Caddy admin API", long_about = None)]
struct Cli {
    /// Admin API address
    #[arg(short, long, global = true)]
    address: Option<String>,

    /// Admin API unix socket
    #[arg(short, long, global = true)]
    socket: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the running configuration, or the part of it at PATH
    Get { path: Option<String> },
    /// Print the configuration object tagged with @id
    GetId { id: String },
    /// Validate a config document and load it
    Load {
        file: PathBuf,
        /// Reload whenever the file changes
        #[arg(short, long)]
        watch: bool,
    },
    /// Remove the configuration at PATH
    Delete { path: String },
    /// Validate a config document and print it in canonical form
    Fmt { file: PathBuf },
    /// List registered module ids
    Modules,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    if let Some(address) = cli.address {
        settings.address = address;
        settings.socket = None;
    }
    if let Some(socket) = cli.socket {
        settings.socket = Some(socket);
    }

    logging::init(&settings.log_level);

    let registry = ModuleRegistry::global().clone();

    match cli.command {
        Commands::Get { path } => {
            let client = settings.client()?;
            match path {
                Some(path) => {
                    let value: Value = client.get_config_by_path(&path).await?;
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                None => {
                    let config = client.get_config().await?;
                    print_bytes(&config::encode_pretty(&config)?);
                }
            }
        }
        Commands::GetId { id } => {
            let value: Value = settings.client()?.get_config_by_id(&id).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Commands::Load { file, watch } => {
            let client = settings.client()?;
            let config = read_document(&registry, &file)?;
            client.load(&config).await?;

            if watch {
                watch_and_load(&client, &file, registry).await?;
            }
        }
        Commands::Delete { path } => {
            settings.client()?.delete_config(&path).await?;
            tracing::info!(path = %path, "configuration removed");
        }
        Commands::Fmt { file } => {
            let config = read_document(&registry, &file)?;
            print_bytes(&config::encode_pretty(&config)?);
        }
        Commands::Modules => {
            for id in registry.ids() {
                println!("{}", id);
            }
        }
    }

    Ok(())
}

async fn watch_and_load(
    client: &AdminClient,
    file: &Path,
    registry: ModuleRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let (watcher, mut updates) = ConfigWatcher::new(file, registry);
    let _watcher = watcher.run()?;

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(config) = update else { break };
                if let Err(e) = client.load(&config).await {
                    tracing::error!(error = %e, "failed to load new revision; keeping current configuration");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("stopping watch");
                break;
            }
        }
    }

    Ok(())
}

fn print_bytes(bytes: &[u8]) {
    println!("{}", String::from_utf8_lossy(bytes));
}
