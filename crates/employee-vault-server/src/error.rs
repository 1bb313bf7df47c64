//! Handler error types for the Employee Vault server.
//!
//! Operation failures never become an HTTP error status. Handlers log them
//! and render an inline banner on a 200 page, so [`AppError`] only needs to
//! know how to describe itself to the user.

use employee_vault_client::VaultError;
use employee_vault_storage::StoreError;

/// Failure of a create or list operation.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// One or more form fields were missing or blank.
    #[error("All fields are required!")]
    MissingFields { missing: Vec<&'static str> },

    /// The request body could not be read as the add-employee form.
    #[error("invalid form submission: {0}")]
    MalformedForm(String),

    /// Encrypting a sensitive field failed.
    #[error("failed to encrypt {field}: {source}")]
    Encrypt {
        field: &'static str,
        #[source]
        source: VaultError,
    },

    /// The employee store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AppError {
    /// Banner text for the add-employee page.
    pub fn banner(&self) -> String {
        match self {
            Self::MissingFields { .. } => self.to_string(),
            Self::MalformedForm(_) | Self::Encrypt { .. } | Self::Store(_) => {
                format!("Error: {self}")
            }
        }
    }
}
