//! Employee record storage for Employee Vault.
//!
//! This crate defines the [`EmployeeStore`] trait: the two fixed operations
//! the web handlers need (insert one record, list all records). It knows
//! nothing about encryption: sensitive fields arrive already encrypted and
//! leave exactly as stored.
//!
//! Two implementations are provided:
//!
//! - [`PostgresStore`] — leases credentials per operation and opens a
//!   fresh connection each time
//! - [`MemoryStore`] — in-memory, for testing only

mod error;
mod memory;
mod postgres;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use postgres::{DatabaseTarget, PostgresStore};

/// Column names of the `employees` table, in select order.
pub const EMPLOYEE_COLUMNS: [&str; 7] = [
    "id",
    "name",
    "role",
    "email",
    "phone_number",
    "ssn",
    "address",
];

/// Columns holding transit ciphertext.
pub const SENSITIVE_COLUMNS: [&str; 4] = ["email", "phone_number", "ssn", "address"];

/// A record to insert. Sensitive fields are expected to be ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub name: String,
    pub role: String,
    pub email: String,
    pub phone_number: String,
    pub ssn: String,
    pub address: String,
}

/// A stored employee row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct EmployeeRecord {
    pub id: i32,
    pub name: String,
    pub role: String,
    pub email: String,
    pub phone_number: String,
    pub ssn: String,
    pub address: String,
}

impl EmployeeRecord {
    /// Build a record from an insert payload and its generated id.
    pub fn from_new(id: i32, new: NewEmployee) -> Self {
        Self {
            id,
            name: new.name,
            role: new.role,
            email: new.email,
            phone_number: new.phone_number,
            ssn: new.ssn,
            address: new.address,
        }
    }

    /// The sensitive fields paired with their column names.
    pub fn sensitive_fields(&self) -> [(&'static str, &str); 4] {
        [
            (SENSITIVE_COLUMNS[0], &self.email),
            (SENSITIVE_COLUMNS[1], &self.phone_number),
            (SENSITIVE_COLUMNS[2], &self.ssn),
            (SENSITIVE_COLUMNS[3], &self.address),
        ]
    }

    /// Mutable access to the sensitive fields, in the same order.
    pub fn sensitive_fields_mut(&mut self) -> [(&'static str, &mut String); 4] {
        [
            (SENSITIVE_COLUMNS[0], &mut self.email),
            (SENSITIVE_COLUMNS[1], &mut self.phone_number),
            (SENSITIVE_COLUMNS[2], &mut self.ssn),
            (SENSITIVE_COLUMNS[3], &mut self.address),
        ]
    }

    /// Cell values in [`EMPLOYEE_COLUMNS`] order, for display.
    pub fn cells(&self) -> [String; 7] {
        [
            self.id.to_string(),
            self.name.clone(),
            self.role.clone(),
            self.email.clone(),
            self.phone_number.clone(),
            self.ssn.clone(),
            self.address.clone(),
        ]
    }
}

/// Result of a list: the column names reported by the query and the rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeTable {
    pub columns: Vec<String>,
    pub rows: Vec<EmployeeRecord>,
}

impl EmployeeTable {
    /// The canonical column list, used when a query returns no rows.
    pub fn default_columns() -> Vec<String> {
        EMPLOYEE_COLUMNS.iter().map(|c| (*c).to_owned()).collect()
    }
}

/// Storage for employee records.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`)
/// and must release any connection they open before returning, on success
/// and on failure.
#[async_trait::async_trait]
pub trait EmployeeStore: Send + Sync + 'static {
    /// Insert one record and return its generated id.
    ///
    /// Either the whole record is committed or nothing is.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Credentials`] if no credentials could be
    /// leased, [`StoreError::Connect`] if the database is unreachable, and
    /// [`StoreError::Query`] if the insert or commit fails.
    async fn insert_employee(&self, employee: &NewEmployee) -> Result<i32, StoreError>;

    /// Return every record ordered by id.
    ///
    /// # Errors
    ///
    /// Same kinds as [`EmployeeStore::insert_employee`].
    async fn list_employees(&self) -> Result<EmployeeTable, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> EmployeeRecord {
        EmployeeRecord::from_new(
            7,
            NewEmployee {
                name: "Ana".to_owned(),
                role: "Eng".to_owned(),
                email: "e".to_owned(),
                phone_number: "p".to_owned(),
                ssn: "s".to_owned(),
                address: "a".to_owned(),
            },
        )
    }

    #[test]
    fn cells_follow_column_order() {
        let cells = record().cells();
        assert_eq!(cells, ["7", "Ana", "Eng", "e", "p", "s", "a"].map(str::to_owned));
        assert_eq!(cells.len(), EMPLOYEE_COLUMNS.len());
    }

    #[test]
    fn sensitive_fields_cover_sensitive_columns() {
        let mut rec = record();
        let names: Vec<&str> = rec.sensitive_fields_mut().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, SENSITIVE_COLUMNS);
        assert_eq!(
            rec.sensitive_fields(),
            [("email", "e"), ("phone_number", "p"), ("ssn", "s"), ("address", "a")]
        );

        for (_, value) in rec.sensitive_fields_mut() {
            value.push('!');
        }
        assert_eq!(rec.email, "e!");
        assert_eq!(rec.address, "a!");
        assert_eq!(rec.name, "Ana");
    }
}
