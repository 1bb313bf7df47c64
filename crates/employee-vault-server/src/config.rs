//! Configuration for the Employee Vault server.
//!
//! Static connection parameters come from an INI file with a `[Vault]` and a
//! `[Database]` section. The file is read once at startup; a missing or
//! empty required key aborts the process. Process-level settings (bind
//! address, log level) come from the command line instead.
//!
//! ```ini
//! [Vault]
//! vault_addr = http://127.0.0.1:8200
//! vault_token = hvs.example
//! db_path = database/creds/app
//! encryption_key = employees
//!
//! [Database]
//! host = 127.0.0.1
//! port = 5432
//! dbname = employees
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use ::config::{Config, File, FileFormat};
use serde::Deserialize;

use employee_vault_client::VaultClientConfig;
use employee_vault_storage::DatabaseTarget;

/// Validated application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// `[Vault]` section.
    #[serde(alias = "Vault")]
    pub vault: VaultSettings,
    /// `[Database]` section.
    #[serde(alias = "Database")]
    pub database: DatabaseSettings,
}

/// Secret-service connection settings.
#[derive(Clone, Deserialize)]
pub struct VaultSettings {
    /// Service address, e.g. `http://127.0.0.1:8200`. **Required.**
    pub vault_addr: String,
    /// Access token. **Required.**
    pub vault_token: String,
    /// Dynamic database credentials path, e.g. `database/creds/app`. **Required.**
    pub db_path: String,
    /// Transit key name. **Required.**
    pub encryption_key: String,
    /// Outbound request timeout in seconds. Unset means no timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for VaultSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSettings")
            .field("vault_addr", &self.vault_addr)
            .field("vault_token", &"[redacted]")
            .field("db_path", &self.db_path)
            .field("encryption_key", &self.encryption_key)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Where the `employees` table lives.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database host. **Required.**
    pub host: String,
    /// Database port. **Required.**
    pub port: u16,
    /// Database name. **Required.**
    pub dbname: String,
}

impl AppConfig {
    /// Load and validate configuration from an INI file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable, a required key
    /// is absent or empty, or a value cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let source = File::new(&path.to_string_lossy(), FileFormat::Ini).required(true);
        let cfg = Config::builder()
            .add_source(source)
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;
        Self::from_config(cfg)
    }

    /// Parse and validate configuration from INI text.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::load`], minus file access.
    pub fn from_ini_str(ini: &str) -> Result<Self> {
        let cfg = Config::builder()
            .add_source(File::from_str(ini, FileFormat::Ini))
            .build()
            .context("failed to parse configuration")?;
        Self::from_config(cfg)
    }

    fn from_config(cfg: Config) -> Result<Self> {
        let c: Self = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;
        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.vault.vault_addr, "Vault.vault_addr")?;
        ensure_non_empty(&self.vault.vault_token, "Vault.vault_token")?;
        ensure_non_empty(&self.vault.db_path, "Vault.db_path")?;
        ensure_non_empty(&self.vault.encryption_key, "Vault.encryption_key")?;
        ensure_non_empty(&self.database.host, "Database.host")?;
        ensure_non_empty(&self.database.dbname, "Database.dbname")?;

        if self.database.port == 0 {
            anyhow::bail!("Database.port must be a non-zero port");
        }
        if self.vault.timeout_secs == Some(0) {
            anyhow::bail!("Vault.timeout_secs must be > 0 when set");
        }
        Ok(())
    }

    /// Client parameters for the secret service.
    pub fn vault_client_config(&self) -> VaultClientConfig {
        VaultClientConfig {
            addr: self.vault.vault_addr.clone(),
            token: self.vault.vault_token.clone(),
            db_path: self.vault.db_path.clone(),
            transit_key: self.vault.encryption_key.clone(),
            timeout: self.vault.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Database location for the employee store.
    pub fn database_target(&self) -> DatabaseTarget {
        DatabaseTarget {
            host: self.database.host.clone(),
            port: self.database.port,
            dbname: self.database.dbname.clone(),
        }
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
