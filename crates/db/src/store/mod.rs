//! Table-scoped read API shared by every data store backend.

pub mod postgrest;
pub mod sqlite;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use strum_macros::{Display, EnumString};
use thiserror::Error;

use crate::models::{
    building::Building, lead::Lead, operator::Operator, room::Room, tenant::Tenant,
};

pub use postgrest::{PostgrestConfig, PostgrestStore};
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to fetch from data store: {0}")]
    Transport(String),
    #[error("data store returned http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("json error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("unknown column `{column}` on table `{table}`")]
    UnknownColumn { table: Table, column: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    /// True for failures that happened before the store could answer.
    pub fn is_network(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Database(e) => matches!(
                e,
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
            ),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Table {
    Operators,
    Buildings,
    Rooms,
    Tenants,
    Leads,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Operators,
        Table::Buildings,
        Table::Rooms,
        Table::Tenants,
        Table::Leads,
    ];

    pub fn columns(&self) -> &'static [Column] {
        match self {
            Table::Operators => Operator::COLUMNS,
            Table::Buildings => Building::COLUMNS,
            Table::Rooms => Room::COLUMNS,
            Table::Tenants => Tenant::COLUMNS,
            Table::Leads => Lead::COLUMNS,
        }
    }

    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns().iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Real,
    Boolean,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn text(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Text }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Integer }
    }

    pub const fn real(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Real }
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Boolean }
    }

    pub const fn date(name: &'static str) -> Self {
        Self { name, kind: ColumnKind::Date }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { column: &'static str, value: Value },
    Neq { column: &'static str, value: Value },
    /// Case-insensitive substring match.
    ILike { column: &'static str, pattern: String },
    Gte { column: &'static str, value: f64 },
    Lte { column: &'static str, value: f64 },
    In { column: &'static str, values: Vec<Value> },
}

impl Filter {
    pub fn column(&self) -> &'static str {
        match self {
            Filter::Eq { column, .. }
            | Filter::Neq { column, .. }
            | Filter::ILike { column, .. }
            | Filter::Gte { column, .. }
            | Filter::Lte { column, .. }
            | Filter::In { column, .. } => column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub direction: Direction,
}

/// A read against a single table: projection, filters, ordering and a row cap.
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    table: Table,
    columns: Vec<&'static str>,
    filters: Vec<Filter>,
    order: Option<Order>,
    limit: Option<u32>,
}

impl TableQuery {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            columns: Vec::new(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn select(mut self, columns: &[&'static str]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq {
            column,
            value: value.into(),
        });
        self
    }

    pub fn neq(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Neq {
            column,
            value: value.into(),
        });
        self
    }

    pub fn ilike(mut self, column: &'static str, pattern: impl Into<String>) -> Self {
        self.filters.push(Filter::ILike {
            column,
            pattern: pattern.into(),
        });
        self
    }

    pub fn gte(mut self, column: &'static str, value: f64) -> Self {
        self.filters.push(Filter::Gte { column, value });
        self
    }

    pub fn lte(mut self, column: &'static str, value: f64) -> Self {
        self.filters.push(Filter::Lte { column, value });
        self
    }

    pub fn in_list(mut self, column: &'static str, values: Vec<Value>) -> Self {
        self.filters.push(Filter::In { column, values });
        self
    }

    pub fn order_asc(mut self, column: &'static str) -> Self {
        self.order = Some(Order {
            column,
            direction: Direction::Asc,
        });
        self
    }

    pub fn order_desc(mut self, column: &'static str) -> Self {
        self.order = Some(Order {
            column,
            direction: Direction::Desc,
        });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn table(&self) -> Table {
        self.table
    }

    /// Projected columns, or every catalogue column when none were selected.
    pub fn projection(&self) -> Vec<&'static Column> {
        if self.columns.is_empty() {
            self.table.columns().iter().collect()
        } else {
            self.columns
                .iter()
                .filter_map(|name| self.table.column(name))
                .collect()
        }
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn order(&self) -> Option<Order> {
        self.order
    }

    pub fn row_limit(&self) -> Option<u32> {
        self.limit
    }

    /// Reject references to columns the table does not have.
    pub fn validate(&self) -> Result<(), StoreError> {
        let referenced = self
            .columns
            .iter()
            .copied()
            .chain(self.filters.iter().map(Filter::column))
            .chain(self.order.iter().map(|o| o.column));

        for name in referenced {
            if self.table.column(name).is_none() {
                return Err(StoreError::UnknownColumn {
                    table: self.table,
                    column: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Read-only, table-scoped access to the property database.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Short label reported to callers as the data source.
    fn label(&self) -> &str;

    async fn select(&self, query: &TableQuery) -> Result<Vec<Value>, StoreError>;

    /// Count-only mode. Projection, ordering and limit are ignored.
    async fn count(&self, query: &TableQuery) -> Result<i64, StoreError>;
}

pub async fn fetch_typed<T: DeserializeOwned>(
    store: &dyn DataStore,
    query: &TableQuery,
) -> Result<Vec<T>, StoreError> {
    store
        .select(query)
        .await?
        .into_iter()
        .map(|record| serde_json::from_value(record).map_err(StoreError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_catalogue_columns() {
        let query = TableQuery::new(Table::Rooms)
            .select(&["room_id", "private_room_rent"])
            .lte("private_room_rent", 2000.0)
            .eq("status", "AVAILABLE")
            .order_asc("private_room_rent")
            .limit(10);
        assert!(query.validate().is_ok());
        assert_eq!(query.projection().len(), 2);
    }

    #[test]
    fn validate_rejects_unknown_filter_column() {
        let query = TableQuery::new(Table::Buildings).eq("bedrooms", 2);
        let err = query.validate().unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnknownColumn { table: Table::Buildings, ref column } if column == "bedrooms"
        ));
    }

    #[test]
    fn empty_projection_means_all_columns() {
        let query = TableQuery::new(Table::Leads);
        assert_eq!(query.projection().len(), Table::Leads.columns().len());
    }

    #[test]
    fn transport_errors_are_network_class() {
        assert!(StoreError::Transport("connection refused".into()).is_network());
        assert!(
            !StoreError::Http {
                status: 400,
                body: "bad filter".into()
            }
            .is_network()
        );
    }

    #[test]
    fn table_names_round_trip_through_strum() {
        use std::str::FromStr;
        assert_eq!(Table::Rooms.to_string(), "rooms");
        assert_eq!(Table::from_str("buildings").unwrap(), Table::Buildings);
    }
}
