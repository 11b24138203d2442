use crate::config::{Config, StoreBackend};
use crate::identity::FirebaseVerifier;
use anyhow::{Context, Result};

pub struct ValidationReport {
    pub environment: bool,
    pub store: bool,
    pub identity: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.environment && self.store && self.identity
    }

    pub fn print(&self) {
        println!("\n=== Startup Validation Report ===");
        println!("Environment Variables: {}", status(self.environment));
        println!("Store Connectivity:    {}", status(self.store));
        println!("Identity Keys:         {}", status(self.identity));

        if !self.errors.is_empty() {
            println!("\nErrors:");
            for error in &self.errors {
                println!("  ❌ {}", error);
            }
        }

        println!("\nOverall Status: {}", if self.is_valid() { "✅ PASS" } else { "❌ FAIL" });
        println!("=================================\n");
    }
}

fn status(ok: bool) -> &'static str {
    if ok { "✅ OK" } else { "❌ FAIL" }
}

pub async fn validate_environment(config: &Config) -> ValidationReport {
    let mut report = ValidationReport {
        environment: true,
        store: true,
        identity: true,
        errors: Vec::new(),
    };

    if let Err(e) = validate_env_vars(config) {
        report.environment = false;
        report.errors.push(format!("Environment: {}", e));
    }

    if let Err(e) = validate_store(config).await {
        report.store = false;
        report.errors.push(format!("Store: {:#}", e));
    }

    if let Err(e) = validate_identity(config).await {
        report.identity = false;
        report.errors.push(format!("Identity: {:#}", e));
    }

    report
}

fn validate_env_vars(config: &Config) -> Result<()> {
    if config.firebase_project_id.trim().is_empty() {
        anyhow::bail!("FIREBASE_PROJECT_ID is empty");
    }
    if config.server_port == 0 {
        anyhow::bail!("SERVER_PORT must be greater than 0");
    }
    if config.store_backend == StoreBackend::Postgres {
        let database_url = config.database_url.as_deref().unwrap_or_default();
        url::Url::parse(database_url).context("DATABASE_URL is not a valid URL")?;
    }

    url::Url::parse(&config.firebase_jwks_url)
        .context("FIREBASE_JWKS_URL is not a valid URL")?;

    Ok(())
}

async fn validate_store(config: &Config) -> Result<()> {
    if config.store_backend == StoreBackend::Memory {
        return Ok(());
    }

    let pool = crate::db::create_pool(config).await?;
    sqlx::query("SELECT 1")
        .fetch_one(&pool)
        .await
        .context("Failed to query database")?;

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(&pool)
        .await
        .context("Failed to check migrations table")?;

    if applied == 0 {
        anyhow::bail!("No migrations applied");
    }

    Ok(())
}

async fn validate_identity(config: &Config) -> Result<()> {
    let verifier = FirebaseVerifier::new(
        config.firebase_project_id.clone(),
        config.firebase_jwks_url.clone(),
        config.request_timeout,
    );

    let keys = verifier.refresh_keys().await?;
    if keys == 0 {
        anyhow::bail!("Key endpoint returned no signing keys");
    }

    Ok(())
}
