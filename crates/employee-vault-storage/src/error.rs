//! Storage error types.

use employee_vault_client::VaultError;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Leasing database credentials from the secret service failed.
    #[error("failed to lease database credentials: {0}")]
    Credentials(#[from] VaultError),

    /// Opening the database connection failed.
    #[error("failed to connect to database at {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: sqlx::Error,
    },

    /// A statement, commit, or row decode failed.
    #[error("database {operation} failed: {source}")]
    Query {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Failure from a non-SQL backend.
    #[error("storage backend error: {reason}")]
    Backend { reason: String },
}
