use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use xpensia_core::adapters::{MemoryTransactionRepository, PostgresTransactionRepository};
use xpensia_core::cli::{self, Cli, Commands, DbCommands};
use xpensia_core::config::{Config, LogFormat, StoreBackend};
use xpensia_core::identity::FirebaseVerifier;
use xpensia_core::ports::TransactionRepository;
use xpensia_core::{create_app, db, AppState, HttpSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Db(DbCommands::Migrate) => cli::handle_db_migrate(&config).await,
        Commands::Config => cli::handle_config_validate(&config).await,
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let repository: Arc<dyn TransactionRepository> = match config.store_backend {
        StoreBackend::Postgres => {
            let pool = db::create_pool(&config).await?;
            db::run_migrations(&pool, &config.migrations_dir).await?;
            Arc::new(PostgresTransactionRepository::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; records are lost on restart");
            Arc::new(MemoryTransactionRepository::new())
        }
    };

    let verifier = Arc::new(FirebaseVerifier::new(
        config.firebase_project_id.clone(),
        config.firebase_jwks_url.clone(),
        config.request_timeout,
    ));
    tracing::info!(project = %verifier.project_id(), "Firebase token verifier initialized");

    let state = AppState::new(repository, verifier, HttpSettings::from(&config));
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
