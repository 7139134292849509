//! Database connection settings, persisted per project.
//!
//! Settings live in `projects/{project}/db_config.toml`. The password is never
//! serialized; it has to come from `--password` or `PGSCAFFOLD_DB_PASSWORD`
//! on every run.
//!
//! Each field resolves in this order:
//!
//! 1. command-line flag
//! 2. environment variable (`PGSCAFFOLD_DB_*`, read by clap)
//! 3. persisted project file
//! 4. built-in default (`localhost`, `5432`, schema `public`)

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::ScaffoldError;

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_schema() -> String {
    "public".to_string()
}

/// Connection settings for the catalog being introspected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub username: String,
    /// Kept in memory only
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    #[serde(default)]
    pub dbname: String,
    /// Schema whose tables are listed and introspected
    #[serde(default = "default_schema")]
    pub schema: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: String::new(),
            password: None,
            dbname: String::new(),
            schema: default_schema(),
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DbOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub dbname: Option<String>,
    pub schema: Option<String>,
}

impl DbConfig {
    /// Merge `overrides` over `persisted` (or the defaults) and validate
    ///
    /// # Errors
    ///
    /// [`ScaffoldError::Config`] if the username or database name is missing.
    pub fn resolve(
        persisted: Option<DbConfig>,
        overrides: &DbOverrides,
    ) -> Result<Self, ScaffoldError> {
        let mut config = persisted.unwrap_or_default();
        if let Some(host) = &overrides.host {
            config.host = host.clone();
        }
        if let Some(port) = overrides.port {
            config.port = port;
        }
        if let Some(username) = &overrides.username {
            config.username = username.clone();
        }
        if overrides.password.is_some() {
            config.password = overrides.password.clone();
        }
        if let Some(dbname) = &overrides.dbname {
            config.dbname = dbname.clone();
        }
        if let Some(schema) = &overrides.schema {
            config.schema = schema.clone();
        }
        config.validate()?;
        Ok(config)
    }

    /// Check that every required field is present
    pub fn validate(&self) -> Result<(), ScaffoldError> {
        if self.host.trim().is_empty() {
            return Err(ScaffoldError::Config("database host is empty".into()));
        }
        if self.username.trim().is_empty() {
            return Err(ScaffoldError::Config(
                "database username is required (--user or PGSCAFFOLD_DB_USER)".into(),
            ));
        }
        if self.dbname.trim().is_empty() {
            return Err(ScaffoldError::Config(
                "database name is required (--dbname or PGSCAFFOLD_DB_NAME)".into(),
            ));
        }
        if self.schema.trim().is_empty() {
            return Err(ScaffoldError::Config("database schema is empty".into()));
        }
        Ok(())
    }

    /// Driver configuration for `tokio-postgres`
    pub fn pg_config(&self) -> Result<tokio_postgres::Config, ScaffoldError> {
        self.validate()?;
        let mut pg = tokio_postgres::Config::new();
        pg.host(&self.host)
            .port(self.port)
            .user(&self.username)
            .dbname(&self.dbname)
            .application_name("pgscaffold");
        if let Some(password) = &self.password {
            pg.password(password);
        }
        Ok(pg)
    }

    /// SQLAlchemy URI written into the generated `config.py`
    ///
    /// The password is left out; the generated app reads `DATABASE_URL` for
    /// a complete URI.
    pub fn database_uri(&self) -> String {
        format!(
            "postgresql://{}@{}:{}/{}",
            self.username, self.host, self.port, self.dbname
        )
    }
}

/// Load the persisted settings at `path`
///
/// Returns `Ok(None)` when the file does not exist.
pub fn load_db_config(path: &Path) -> anyhow::Result<Option<DbConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read database config: {}", path.display()))?;
    let config: DbConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse database config: {}", path.display()))?;
    debug!(path = %path.display(), "loaded database config");
    Ok(Some(config))
}

/// Persist `config` at `path`, without the password
pub fn save_db_config(path: &Path, config: &DbConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let contents = toml::to_string_pretty(config).context("Failed to serialize database config")?;
    fs::write(path, contents)
        .with_context(|| format!("Failed to write database config: {}", path.display()))?;
    debug!(path = %path.display(), "saved database config");
    Ok(())
}
