use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::store::{Column, DataStore, StoreError, Table, TableQuery, fetch_typed};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Tenant {
    pub id: i64,
    pub tenant_id: String,
    pub tenant_name: String,
    pub room_id: Option<String>,
    pub room_number: Option<String>,
    pub lease_start_date: Option<NaiveDate>,
    pub lease_end_date: Option<NaiveDate>,
    pub operator_id: Option<i64>,
    pub booking_type: Option<String>,
    pub tenant_nationality: Option<String>,
    pub tenant_email: Option<String>,
    pub phone: Option<String>,
    pub building_id: Option<String>,
    pub status: String,
    pub deposit_amount: Option<f64>,
    pub payment_status: String,
}

impl Tenant {
    pub const COLUMNS: &'static [Column] = &[
        Column::integer("id"),
        Column::text("tenant_id"),
        Column::text("tenant_name"),
        Column::text("room_id"),
        Column::text("room_number"),
        Column::date("lease_start_date"),
        Column::date("lease_end_date"),
        Column::integer("operator_id"),
        Column::text("booking_type"),
        Column::text("tenant_nationality"),
        Column::text("tenant_email"),
        Column::text("phone"),
        Column::text("building_id"),
        Column::text("status"),
        Column::real("deposit_amount"),
        Column::text("payment_status"),
    ];

    pub async fn find_all(store: &dyn DataStore) -> Result<Vec<Self>, StoreError> {
        let query = TableQuery::new(Table::Tenants).order_asc("tenant_name");
        fetch_typed(store, &query).await
    }
}
