use async_trait::async_trait;
use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::{Column, ColumnKind, DataStore, Direction, Filter, StoreError, TableQuery};

/// SQLite backend. Records come back as JSON objects built by `json_object`.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DataStore for SqliteStore {
    fn label(&self) -> &str {
        "sqlite"
    }

    async fn select(&self, query: &TableQuery) -> Result<Vec<Value>, StoreError> {
        query.validate()?;

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT ");
        push_json_object(&mut builder, &query.projection());
        builder.push(" FROM ").push(query.table().to_string());
        push_where(&mut builder, query.filters());

        if let Some(order) = query.order() {
            builder.push(" ORDER BY ").push(order.column).push(match order.direction {
                Direction::Asc => " ASC",
                Direction::Desc => " DESC",
            });
        }
        if let Some(limit) = query.row_limit() {
            builder.push(" LIMIT ").push_bind(i64::from(limit));
        }

        debug!(sql = builder.sql(), "sqlite select");

        let rows: Vec<String> = builder
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| serde_json::from_str(row).map_err(StoreError::from))
            .collect()
    }

    async fn count(&self, query: &TableQuery) -> Result<i64, StoreError> {
        query.validate()?;

        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM ");
        builder.push(query.table().to_string());
        push_where(&mut builder, query.filters());

        debug!(sql = builder.sql(), "sqlite count");

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }
}

fn push_json_object(builder: &mut QueryBuilder<'_, Sqlite>, columns: &[&'static Column]) {
    builder.push("json_object(");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        builder.push("'").push(column.name).push("', ");
        match column.kind {
            // SQLite stores booleans as 0/1; render them as JSON booleans.
            ColumnKind::Boolean => {
                builder
                    .push("json(CASE WHEN ")
                    .push(column.name)
                    .push(" IS NULL THEN 'null' WHEN ")
                    .push(column.name)
                    .push(" THEN 'true' ELSE 'false' END)");
            }
            _ => {
                builder.push(column.name);
            }
        }
    }
    builder.push(")");
}

fn push_where<'args>(builder: &mut QueryBuilder<'args, Sqlite>, filters: &'args [Filter]) {
    for (i, filter) in filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        match filter {
            Filter::Eq { column, value } => {
                builder.push(*column);
                if value.is_null() {
                    builder.push(" IS NULL");
                } else {
                    builder.push(" = ");
                    push_value(builder, value);
                }
            }
            Filter::Neq { column, value } => {
                builder.push(*column);
                if value.is_null() {
                    builder.push(" IS NOT NULL");
                } else {
                    builder.push(" IS NOT ");
                    push_value(builder, value);
                }
            }
            Filter::ILike { column, pattern } => {
                builder
                    .push(*column)
                    .push(" LIKE ")
                    .push_bind(format!("%{}%", escape_like(pattern)))
                    .push(" ESCAPE '\\'");
            }
            Filter::Gte { column, value } => {
                builder.push(*column).push(" >= ").push_bind(*value);
            }
            Filter::Lte { column, value } => {
                builder.push(*column).push(" <= ").push_bind(*value);
            }
            Filter::In { column, values } => {
                if values.is_empty() {
                    builder.push("1 = 0");
                    continue;
                }
                builder.push(*column).push(" IN (");
                for (j, value) in values.iter().enumerate() {
                    if j > 0 {
                        builder.push(", ");
                    }
                    push_value(builder, value);
                }
                builder.push(")");
            }
        }
    }
}

fn push_value<'args>(builder: &mut QueryBuilder<'args, Sqlite>, value: &'args Value) {
    match value {
        Value::Bool(b) => {
            builder.push_bind(*b);
        }
        Value::Number(n) => match n.as_i64() {
            Some(i) => {
                builder.push_bind(i);
            }
            None => {
                builder.push_bind(n.as_f64().unwrap_or_default());
            }
        },
        Value::String(s) => {
            builder.push_bind(s.as_str());
        }
        other => {
            builder.push_bind(other.to_string());
        }
    }
}

fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for ch in pattern.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
