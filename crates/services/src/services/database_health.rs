//! Data store health checks: migration state and per-table reachability.

use std::{collections::BTreeMap, sync::Arc};

use db::store::{DataStore, Table, TableQuery};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;

#[derive(Debug, Error)]
pub enum DatabaseHealthError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Checks the configured store. The migration check only runs when a local
/// SQLite pool backs the store.
#[derive(Clone)]
pub struct DatabaseHealthService {
    store: Arc<dyn DataStore>,
    pool: Option<SqlitePool>,
}

impl DatabaseHealthService {
    pub fn new(store: Arc<dyn DataStore>, pool: Option<SqlitePool>) -> Self {
        Self { store, pool }
    }

    pub async fn check(&self) -> Result<HealthReport, DatabaseHealthError> {
        let migrations_applied = match &self.pool {
            Some(pool) => Some(applied_migrations(pool).await?),
            None => None,
        };

        let mut table_counts = BTreeMap::new();
        let mut unreachable_tables = Vec::new();
        for table in Table::ALL {
            match self.store.count(&TableQuery::new(table)).await {
                Ok(count) => {
                    table_counts.insert(table.to_string(), count);
                }
                Err(e) => {
                    warn!(%table, error = %e, "Table count failed");
                    unreachable_tables.push(table.to_string());
                }
            }
        }

        let report = HealthReport {
            data_source: self.store.label().to_string(),
            migrations_applied,
            table_counts,
            unreachable_tables,
        };
        info!(summary = %report.summary(), "Database health check complete");
        Ok(report)
    }
}

async fn applied_migrations(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let table_exists = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?
        > 0;

    if !table_exists {
        return Ok(0);
    }

    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct HealthReport {
    pub data_source: String,
    /// `None` for remote stores.
    pub migrations_applied: Option<i64>,
    pub table_counts: BTreeMap<String, i64>,
    pub unreachable_tables: Vec<String>,
}

impl HealthReport {
    pub fn is_ok(&self) -> bool {
        self.unreachable_tables.is_empty() && self.migrations_applied != Some(0)
    }

    pub fn summary(&self) -> String {
        if self.migrations_applied == Some(0) {
            "Database not initialized - migrations need to be run".to_string()
        } else if !self.unreachable_tables.is_empty() {
            format!(
                "Data store {} unreachable for: {}",
                self.data_source,
                self.unreachable_tables.join(", ")
            )
        } else {
            let rows: i64 = self.table_counts.values().sum();
            format!(
                "Data store {} OK - {} tables, {} rows",
                self.data_source,
                self.table_counts.len(),
                rows
            )
        }
    }
}
