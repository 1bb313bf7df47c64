//! Employee routes: the add form and the two table views.
//!
//! - `GET /` renders the empty form
//! - `POST /` validates, encrypts the four sensitive fields, and inserts
//! - `GET /employees` lists and decrypts envelope-prefixed fields
//! - `GET /employees/encrypted` lists stored values as-is
//!
//! Failures are rendered inline with HTTP 200; nothing here returns an
//! error status.

use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, State};
use axum::response::Html;
use axum::routing::get;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use employee_vault_client::{TransitCipher, VaultError, envelope};
use employee_vault_storage::{EmployeeRecord, EmployeeTable, NewEmployee};

use crate::error::AppError;
use crate::routes::ui::{self, Banner, Page};
use crate::state::AppState;

/// Build the employee router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(add_employee_form).post(add_employee))
        .route("/employees", get(view_employees))
        .route("/employees/encrypted", get(view_encrypted_employees))
}

/// Submitted add-employee form. Absent fields deserialize as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmployeeForm {
    pub name: String,
    pub role: String,
    pub email: String,
    pub phone: String,
    pub ssn: String,
    pub address: String,
}

impl EmployeeForm {
    /// Trim every field and reject the form if any is left empty.
    fn validate(self) -> Result<Self, AppError> {
        let form = Self {
            name: self.name.trim().to_owned(),
            role: self.role.trim().to_owned(),
            email: self.email.trim().to_owned(),
            phone: self.phone.trim().to_owned(),
            ssn: self.ssn.trim().to_owned(),
            address: self.address.trim().to_owned(),
        };

        let missing: Vec<&'static str> = [
            ("name", &form.name),
            ("role", &form.role),
            ("email", &form.email),
            ("phone", &form.phone),
            ("ssn", &form.ssn),
            ("address", &form.address),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(form)
        } else {
            Err(AppError::MissingFields { missing })
        }
    }
}

// ── Add employee ─────────────────────────────────────────────────────

async fn add_employee_form() -> Html<String> {
    Html(ui::add_employee_page(None))
}

async fn add_employee(
    State(state): State<Arc<AppState>>,
    form: Result<Form<EmployeeForm>, FormRejection>,
) -> Html<String> {
    let result = match form {
        Ok(Form(form)) => create_employee(&state, form).await,
        Err(rejection) => Err(AppError::MalformedForm(rejection.body_text())),
    };

    let banner = match result {
        Ok((name, id)) => Banner::Success(format!(
            "Employee {name} added successfully with ID {id}!"
        )),
        Err(e) => {
            match &e {
                AppError::MissingFields { missing } => {
                    debug!(?missing, "rejected incomplete employee form");
                }
                AppError::MalformedForm(reason) => {
                    warn!(reason = %reason, "rejected malformed employee form");
                }
                AppError::Encrypt { .. } | AppError::Store(_) => {}
            }
            Banner::Error(e.banner())
        }
    };
    Html(ui::add_employee_page(Some(&banner)))
}

/// Validate, encrypt, and insert. Returns the employee name and new id.
async fn create_employee(
    state: &AppState,
    form: EmployeeForm,
) -> Result<(String, i32), AppError> {
    let form = form.validate()?;
    let cipher = state.cipher.as_ref();

    let employee = NewEmployee {
        email: encrypt_field(cipher, "email", &form.email).await?,
        phone_number: encrypt_field(cipher, "phone_number", &form.phone).await?,
        ssn: encrypt_field(cipher, "ssn", &form.ssn).await?,
        address: encrypt_field(cipher, "address", &form.address).await?,
        name: form.name,
        role: form.role,
    };

    let id = state.store.insert_employee(&employee).await.map_err(|e| {
        error!(name = %employee.name, error = %e, "error adding employee");
        AppError::from(e)
    })?;

    info!(id, name = %employee.name, "employee added");
    Ok((employee.name, id))
}

async fn encrypt_field(
    cipher: &dyn TransitCipher,
    field: &'static str,
    plaintext: &str,
) -> Result<String, AppError> {
    cipher.encrypt(plaintext).await.map_err(|source| {
        error!(field, error = %source, "error encrypting employee field");
        AppError::Encrypt { field, source }
    })
}

// ── Views ────────────────────────────────────────────────────────────

async fn view_employees(State(state): State<Arc<AppState>>) -> Html<String> {
    match state.store.list_employees().await {
        Ok(mut table) => {
            decrypt_table(state.cipher.as_ref(), &mut table).await;
            Html(ui::table_page(Page::Employees, "Employee Records", &table))
        }
        Err(e) => {
            error!(error = %e, "error fetching employees");
            Html(fetch_error_page(Page::Employees, &e))
        }
    }
}

async fn view_encrypted_employees(State(state): State<Arc<AppState>>) -> Html<String> {
    match state.store.list_employees().await {
        Ok(table) => Html(ui::table_page(
            Page::EncryptedEmployees,
            "Encrypted Employee Records",
            &table,
        )),
        Err(e) => {
            error!(error = %e, "error fetching encrypted employees");
            Html(fetch_error_page(Page::EncryptedEmployees, &e))
        }
    }
}

fn fetch_error_page(page: Page, err: &dyn std::fmt::Display) -> String {
    ui::banner_page(page, &Banner::Error(format!("Error fetching data: {err}")))
}

/// Decrypt every envelope-prefixed sensitive field in place.
///
/// Rows are all-or-nothing: if any field of a row fails to decrypt, every
/// sensitive field of that row keeps its stored value. Other rows are
/// unaffected.
pub async fn decrypt_table(cipher: &dyn TransitCipher, table: &mut EmployeeTable) {
    for row in &mut table.rows {
        match decrypt_row(cipher, row).await {
            Ok(plaintexts) => {
                let fields = row.sensitive_fields_mut();
                for ((_, value), plaintext) in fields.into_iter().zip(plaintexts) {
                    if let Some(plaintext) = plaintext {
                        *value = plaintext;
                    }
                }
            }
            Err((column, e)) => warn!(
                row_id = row.id,
                column,
                error = %e,
                "decryption failed, showing stored row"
            ),
        }
    }
}

/// Plaintext for each sensitive field that carries an envelope, in
/// [`EmployeeRecord::sensitive_fields`] order. Stops at the first failure.
async fn decrypt_row(
    cipher: &dyn TransitCipher,
    row: &EmployeeRecord,
) -> Result<[Option<String>; 4], (&'static str, VaultError)> {
    let mut plaintexts: [Option<String>; 4] = Default::default();
    for (slot, (column, value)) in plaintexts.iter_mut().zip(row.sensitive_fields()) {
        if envelope::is_ciphertext(value) {
            *slot = Some(cipher.decrypt(value).await.map_err(|e| (column, e))?);
        }
    }
    Ok(plaintexts)
}
