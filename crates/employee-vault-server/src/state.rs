//! Shared application state for the Employee Vault server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. It is read-only after construction.

use std::sync::Arc;

use employee_vault_client::TransitCipher;
use employee_vault_storage::EmployeeStore;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Encrypts sensitive fields on create and decrypts them for display.
    pub cipher: Arc<dyn TransitCipher>,
    /// Employee table access.
    pub store: Arc<dyn EmployeeStore>,
}

impl AppState {
    pub fn new(cipher: Arc<dyn TransitCipher>, store: Arc<dyn EmployeeStore>) -> Self {
        Self { cipher, store }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
