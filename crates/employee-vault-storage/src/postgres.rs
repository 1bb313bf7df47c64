//! PostgreSQL employee store.
//!
//! There is no pool: every operation leases a fresh username/password from
//! the secret service, opens one connection with it, runs a single fixed
//! statement, and closes the connection again on every exit path. Leases are
//! left to expire on the service side.
//!
//! Requires an `employees` table with an integer `id` and text columns.
//! NULL text reads as an empty string and `id` is narrowed to `INT4`, so
//! a `BIGSERIAL` id above `i32::MAX` fails the statement.

use std::sync::Arc;

use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Column, Connection, FromRow, Row};
use tracing::{debug, error, info, warn};

use employee_vault_client::CredentialBroker;

use crate::{EmployeeRecord, EmployeeStore, EmployeeTable, NewEmployee, StoreError};

const INSERT_EMPLOYEE: &str = "INSERT INTO employees \
     (id, name, role, email, phone_number, ssn, address) \
     VALUES (DEFAULT, $1, $2, $3, $4, $5, $6) \
     RETURNING id::INT4";

// NULL text reads as "" and BIGSERIAL ids are narrowed to INT4.
const SELECT_EMPLOYEES: &str = "SELECT id::INT4 AS id, \
     COALESCE(name, '') AS name, \
     COALESCE(role, '') AS role, \
     COALESCE(email, '') AS email, \
     COALESCE(phone_number, '') AS phone_number, \
     COALESCE(ssn, '') AS ssn, \
     COALESCE(address, '') AS address \
     FROM employees \
     ORDER BY id";

/// Where the `employees` table lives. Credentials come from the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseTarget {
    pub host: String,
    pub port: u16,
    pub dbname: String,
}

/// An [`EmployeeStore`] backed by PostgreSQL with leased credentials.
#[derive(Clone)]
pub struct PostgresStore {
    broker: Arc<dyn CredentialBroker>,
    target: DatabaseTarget,
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl PostgresStore {
    /// Create a store that leases credentials from `broker` for each operation.
    pub fn new(broker: Arc<dyn CredentialBroker>, target: DatabaseTarget) -> Self {
        Self { broker, target }
    }

    /// Lease credentials and open a connection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Credentials`] or [`StoreError::Connect`].
    pub async fn connect(&self) -> Result<PgConnection, StoreError> {
        let creds = self.broker.lease_credentials().await?;
        debug!(
            username = %creds.username,
            host = %self.target.host,
            port = self.target.port,
            dbname = %self.target.dbname,
            "connecting to database"
        );

        let options = PgConnectOptions::new()
            .host(&self.target.host)
            .port(self.target.port)
            .database(&self.target.dbname)
            .username(&creds.username)
            .password(&creds.password);

        let conn = PgConnection::connect_with(&options)
            .await
            .map_err(|source| {
                error!(host = %self.target.host, error = %source, "database connection failed");
                StoreError::Connect {
                    host: self.target.host.clone(),
                    port: self.target.port,
                    source,
                }
            })?;

        debug!("database connection established");
        Ok(conn)
    }
}

#[async_trait::async_trait]
impl EmployeeStore for PostgresStore {
    async fn insert_employee(&self, employee: &NewEmployee) -> Result<i32, StoreError> {
        let mut conn = self.connect().await?;
        let result = insert_in_transaction(&mut conn, employee).await;
        close(conn).await;

        if let Ok(id) = &result {
            info!(id = *id, name = %employee.name, "employee inserted");
        }
        result
    }

    async fn list_employees(&self) -> Result<EmployeeTable, StoreError> {
        let mut conn = self.connect().await?;
        let result = select_all(&mut conn).await;
        close(conn).await;

        if let Ok(table) = &result {
            debug!(rows = table.rows.len(), "employees listed");
        }
        result
    }
}

/// Run the insert inside a transaction, rolling back explicitly on failure.
async fn insert_in_transaction(
    conn: &mut PgConnection,
    employee: &NewEmployee,
) -> Result<i32, StoreError> {
    let mut tx = conn.begin().await.map_err(|source| StoreError::Query {
        operation: "begin",
        source,
    })?;

    let inserted = sqlx::query_scalar::<_, i32>(INSERT_EMPLOYEE)
        .bind(&employee.name)
        .bind(&employee.role)
        .bind(&employee.email)
        .bind(&employee.phone_number)
        .bind(&employee.ssn)
        .bind(&employee.address)
        .fetch_one(&mut *tx)
        .await;

    match inserted {
        Ok(id) => {
            tx.commit().await.map_err(|source| StoreError::Query {
                operation: "commit",
                source,
            })?;
            Ok(id)
        }
        Err(source) => {
            error!(name = %employee.name, error = %source, "insert failed, rolling back");
            if let Err(e) = tx.rollback().await {
                warn!(error = %e, "rollback failed");
            }
            Err(StoreError::Query {
                operation: "insert",
                source,
            })
        }
    }
}

async fn select_all(conn: &mut PgConnection) -> Result<EmployeeTable, StoreError> {
    let rows: Vec<PgRow> = sqlx::query(SELECT_EMPLOYEES)
        .fetch_all(&mut *conn)
        .await
        .map_err(|source| StoreError::Query {
            operation: "select",
            source,
        })?;

    let columns = rows.first().map_or_else(EmployeeTable::default_columns, |row| {
        row.columns().iter().map(|c| c.name().to_owned()).collect()
    });

    let rows = rows
        .iter()
        .map(|row| EmployeeRecord::from_row(row))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| StoreError::Query {
            operation: "decode",
            source,
        })?;

    Ok(EmployeeTable { columns, rows })
}

async fn close(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        warn!(error = %e, "failed to close database connection cleanly");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::EMPLOYEE_COLUMNS;
    use employee_vault_client::{LeasedCredentials, VaultError};

    struct FixedBroker(Result<(), u16>);

    #[async_trait::async_trait]
    impl CredentialBroker for FixedBroker {
        async fn lease_credentials(&self) -> Result<LeasedCredentials, VaultError> {
            match self.0 {
                Ok(()) => Ok(LeasedCredentials {
                    username: "v-app".to_owned(),
                    password: "pw".to_owned(),
                    lease_id: None,
                    lease_duration_secs: 60,
                }),
                Err(status) => Err(VaultError::Status {
                    path: "database/creds/app".to_owned(),
                    status,
                    message: "permission denied".to_owned(),
                }),
            }
        }
    }

    async fn closed_port() -> u16 {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    fn store(broker: FixedBroker, port: u16) -> PostgresStore {
        PostgresStore::new(
            Arc::new(broker),
            DatabaseTarget {
                host: "127.0.0.1".to_owned(),
                port,
                dbname: "employees".to_owned(),
            },
        )
    }

    #[test]
    fn statements_are_parameterized_and_ordered() {
        assert!(INSERT_EMPLOYEE.contains("VALUES (DEFAULT, $1, $2, $3, $4, $5, $6)"));
        assert!(INSERT_EMPLOYEE.ends_with("RETURNING id::INT4"));
        assert!(SELECT_EMPLOYEES.ends_with("ORDER BY id"));
    }

    #[test]
    fn select_tolerates_null_text_and_wide_ids() {
        assert!(SELECT_EMPLOYEES.starts_with("SELECT id::INT4 AS id,"));
        for column in &EMPLOYEE_COLUMNS[1..] {
            let coalesced = format!("COALESCE({column}, '') AS {column}");
            assert!(SELECT_EMPLOYEES.contains(&coalesced), "{column}");
        }
    }

    #[tokio::test]
    async fn lease_failure_surfaces_as_credentials_error() {
        let store = store(FixedBroker(Err(403)), closed_port().await);
        let err = store.list_employees().await.unwrap_err();
        assert!(matches!(err, StoreError::Credentials(_)), "{err:?}");
        assert!(err.to_string().contains("permission denied"), "{err}");
    }

    #[tokio::test]
    async fn unreachable_database_is_connect_error() {
        let port = closed_port().await;
        let store = store(FixedBroker(Ok(())), port);
        let employee = NewEmployee {
            name: "Ana".to_owned(),
            role: "Eng".to_owned(),
            email: "vault:v1:x".to_owned(),
            phone_number: "vault:v1:x".to_owned(),
            ssn: "vault:v1:x".to_owned(),
            address: "vault:v1:x".to_owned(),
        };
        let err = store.insert_employee(&employee).await.unwrap_err();
        match err {
            StoreError::Connect { port: p, .. } => assert_eq!(p, port),
            other => panic!("expected connect error, got {other:?}"),
        }
    }

    #[test]
    fn debug_omits_broker() {
        let s = PostgresStore::new(
            Arc::new(FixedBroker(Ok(()))),
            DatabaseTarget {
                host: "db".to_owned(),
                port: 5432,
                dbname: "hr".to_owned(),
            },
        );
        let out = format!("{s:?}");
        assert!(out.contains("5432"));
    }
}
