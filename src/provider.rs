//! Record data provider - the seam between the engine and the business
//! tables.
//!
//! The engine never owns the business schema. It only needs to fetch the
//! current state of a single row (pre-change capture) or of a whole table
//! (snapshot export); the surrounding application's data-access layer
//! supplies both behind this trait.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use crate::types::RowData;

/// Errors surfaced by a record provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider does not serve the requested table
    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// The underlying query failed
    #[error("query failed: {0}")]
    Query(String),
}

/// Read-only access to the current state of tracked business tables
#[async_trait]
pub trait RecordProvider: Send + Sync {
    /// Fetch the current state of one row, or `None` if it does not exist
    async fn fetch_row(&self, table: &str, record_id: i64)
        -> Result<Option<RowData>, ProviderError>;

    /// Fetch all current rows of a table
    async fn fetch_table(&self, table: &str) -> Result<Vec<RowData>, ProviderError>;
}

/// In-memory provider for tests and embedded use.
///
/// Rows are keyed by `(table, record_id)`; `fetch_table` returns them in
/// ascending id order.
#[derive(Default)]
pub struct MemoryProvider {
    tables: DashMap<String, DashMap<i64, RowData>>,
}

impl MemoryProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table so it resolves even while empty
    pub fn add_table(&self, table: &str) {
        self.tables.entry(table.to_string()).or_default();
    }

    /// Insert or replace one row
    pub fn put_row(&self, table: &str, record_id: i64, row: RowData) {
        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(record_id, row);
    }

    /// Remove one row
    pub fn remove_row(&self, table: &str, record_id: i64) {
        if let Some(rows) = self.tables.get(table) {
            rows.remove(&record_id);
        }
    }
}

#[async_trait]
impl RecordProvider for MemoryProvider {
    async fn fetch_row(
        &self,
        table: &str,
        record_id: i64,
    ) -> Result<Option<RowData>, ProviderError> {
        let rows = self
            .tables
            .get(table)
            .ok_or_else(|| ProviderError::UnknownTable(table.to_string()))?;
        Ok(rows.get(&record_id).map(|entry| entry.value().clone()))
    }

    async fn fetch_table(&self, table: &str) -> Result<Vec<RowData>, ProviderError> {
        let rows = self
            .tables
            .get(table)
            .ok_or_else(|| ProviderError::UnknownTable(table.to_string()))?;

        let mut keyed: Vec<(i64, RowData)> = rows
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        keyed.sort_by_key(|(id, _)| *id);

        Ok(keyed.into_iter().map(|(_, row)| row).collect())
    }
}
