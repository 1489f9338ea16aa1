use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use crate::auth::TokenVerifier;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, DrinkStore, MemoryDrinkStore, PgDrinkStore};
use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "drinks-api")]
#[command(about = "Drinks menu REST API with permission-gated changes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve(ServeArgs),

    #[command(about = "Drop and recreate the drink table, then insert the seed drink")]
    ResetDb,
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Bind address (overrides HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Listen port (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Drop, recreate and seed the drink table before serving")]
    pub reset_db: bool,

    #[arg(long, help = "Keep drinks in process memory instead of PostgreSQL")]
    pub in_memory: bool,
}

impl ServeArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.reset_db {
            config.database.reset_on_start = true;
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env();

    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => {
            args.apply(&mut config);
            serve(config, args.in_memory).await
        }
        Commands::ResetDb => {
            let store = postgres_store(&config).await?;
            store.reset().await.context("failed to reset drink table")?;
            println!("Drink table reset and seeded");
            Ok(())
        }
    }
}

async fn postgres_store(config: &AppConfig) -> anyhow::Result<PgDrinkStore> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    Ok(PgDrinkStore::new(pool))
}

async fn serve(config: AppConfig, in_memory: bool) -> anyhow::Result<()> {
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting Drinks API in {:?} mode", config.environment);

    let store: Arc<dyn DrinkStore> = if in_memory {
        tracing::warn!("Using the in-memory drink store; data is lost on exit");
        Arc::new(MemoryDrinkStore::new())
    } else {
        Arc::new(postgres_store(&config).await?)
    };

    if config.database.reset_on_start || in_memory {
        store.reset().await.context("failed to reset drink table")?;
    } else {
        store.ensure_schema().await.context("failed to create drink table")?;
    }

    let verifier = TokenVerifier::from_config(&config.auth).context("invalid auth settings")?;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    let app = crate::app(AppState::new(config, store, verifier));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Drinks API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Drinks API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to listen for SIGTERM: {}", e),
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
