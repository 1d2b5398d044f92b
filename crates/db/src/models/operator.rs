use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::store::{Column, DataStore, StoreError, Table, TableQuery, fetch_typed};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Operator {
    pub operator_id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub active: bool,
    pub date_joined: Option<NaiveDate>,
    pub last_active: Option<NaiveDate>,
    pub operator_type: String,
}

impl Operator {
    pub const COLUMNS: &'static [Column] = &[
        Column::integer("operator_id"),
        Column::text("name"),
        Column::text("email"),
        Column::text("phone"),
        Column::text("role"),
        Column::boolean("active"),
        Column::date("date_joined"),
        Column::date("last_active"),
        Column::text("operator_type"),
    ];

    pub async fn find_all(store: &dyn DataStore) -> Result<Vec<Self>, StoreError> {
        let query = TableQuery::new(Table::Operators).order_asc("operator_id");
        fetch_typed(store, &query).await
    }

    pub async fn find_by_operator_id(
        store: &dyn DataStore,
        operator_id: i64,
    ) -> Result<Option<Self>, StoreError> {
        let query = TableQuery::new(Table::Operators)
            .eq("operator_id", operator_id)
            .limit(1);
        Ok(fetch_typed(store, &query).await?.into_iter().next())
    }
}
