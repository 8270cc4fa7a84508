use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use blitz_api::api::AppState;
use blitz_api::config::{self, Environment};
use blitz_api::database::{DatabaseManager, MemoryStore, PgStore, Store};
use blitz_api::server;

#[derive(Parser)]
#[command(name = "blitz-api")]
#[command(about = "Blitz API - developer networking backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides BLITZ_API_PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Use the in-memory store instead of Postgres")]
        memory: bool,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::config();
    tracing::info!("Starting Blitz API in {:?} mode", config.environment);
    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; token issuance will fail");
    }

    match Cli::parse().command.unwrap_or(Commands::Serve { port: None, memory: false }) {
        Commands::Serve { port, memory } => {
            let store = open_store(memory).await?;
            server::serve(AppState::new(store), port.unwrap_or(config.api.port)).await
        }
        Commands::Migrate => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            Ok(())
        }
    }
}

/// Postgres when configured; the in-memory store on request or in development without a URL
async fn open_store(memory: bool) -> anyhow::Result<Arc<dyn Store>> {
    let config = config::config();
    let use_memory =
        memory || (config.database.url.is_none() && config.environment == Environment::Development);

    if use_memory {
        tracing::warn!("Using in-memory store; data is lost on shutdown");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    if config.database.run_migrations {
        DatabaseManager::migrate(&pool).await?;
    }
    Ok(Arc::new(PgStore::new(pool)))
}
