use clap::{Parser, Subcommand};

use crate::config::{Config, StoreBackend};
use crate::db::mask_password;

#[derive(Parser)]
#[command(name = "xpensia-core")]
#[command(about = "Xpensia Core - per-user expense records API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Configuration validation
    Config,
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,
}

pub async fn handle_db_migrate(config: &Config) -> anyhow::Result<()> {
    if config.store_backend == StoreBackend::Memory {
        anyhow::bail!("STORE_BACKEND is memory; there is no database to migrate");
    }

    let pool = crate::db::create_pool(config).await?;

    tracing::info!("Running database migrations...");
    crate::db::run_migrations(&pool, &config.migrations_dir).await?;

    println!("✓ Database migrations completed");

    Ok(())
}

pub async fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Server Port: {}", config.server_port);
    println!("  Store Backend: {:?}", config.store_backend);
    if let Some(url) = &config.database_url {
        println!("  Database URL: {}", mask_password(url));
    }
    println!("  Firebase Project: {}", config.firebase_project_id);
    println!("  Signing Keys URL: {}", config.firebase_jwks_url);
    println!("  Request Timeout: {}ms", config.request_timeout.as_millis());
    match &config.cors_allowed_origins {
        Some(origins) => println!("  CORS Origins: {}", origins.join(", ")),
        None => println!("  CORS Origins: *"),
    }

    let report = crate::startup::validate_environment(config).await;
    report.print();

    if !report.is_valid() {
        anyhow::bail!("Configuration validation failed");
    }

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_default_command() {
        let cli = Cli::try_parse_from(["xpensia-core"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_db_migrate() {
        let cli = Cli::try_parse_from(["xpensia-core", "db", "migrate"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Db(DbCommands::Migrate))));
    }

    #[test]
    fn rejects_unknown_command() {
        assert!(Cli::try_parse_from(["xpensia-core", "backup"]).is_err());
    }
}
