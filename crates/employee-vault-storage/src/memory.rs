//! In-memory employee store for testing.
//!
//! Rows live in a `BTreeMap` keyed by id behind a `RwLock`, so listing is
//! always in id order. Nothing is persisted. The store can be switched
//! "unavailable" to exercise database-failure paths in handlers.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use crate::{EmployeeRecord, EmployeeStore, EmployeeTable, NewEmployee, StoreError};

#[derive(Debug, Default)]
struct Inner {
    rows: BTreeMap<i32, EmployeeRecord>,
    last_id: i32,
}

/// An in-memory [`EmployeeStore`].
///
/// Clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    /// Create an empty store. Ids start at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with [`StoreError::Backend`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    /// Whether the store holds no rows.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Fetch a row by id.
    pub async fn get(&self, id: i32) -> Option<EmployeeRecord> {
        self.inner.read().await.rows.get(&id).cloned()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StoreError::Backend {
                reason: "database unavailable".to_owned(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl EmployeeStore for MemoryStore {
    async fn insert_employee(&self, employee: &NewEmployee) -> Result<i32, StoreError> {
        self.check_available()?;
        let mut inner = self.inner.write().await;
        let id = inner.last_id.checked_add(1).ok_or_else(|| StoreError::Backend {
            reason: "id sequence exhausted".to_owned(),
        })?;
        inner.last_id = id;
        inner
            .rows
            .insert(id, EmployeeRecord::from_new(id, employee.clone()));
        Ok(id)
    }

    async fn list_employees(&self) -> Result<EmployeeTable, StoreError> {
        self.check_available()?;
        let inner = self.inner.read().await;
        Ok(EmployeeTable {
            columns: EmployeeTable::default_columns(),
            rows: inner.rows.values().cloned().collect(),
        })
    }
}
