use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::store::{Column, DataStore, StoreError, Table, TableQuery, fetch_typed};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Building {
    pub id: i64,
    pub building_id: String,
    pub building_name: String,
    pub full_address: Option<String>,
    pub operator_id: Option<i64>,
    pub street: Option<String>,
    pub area: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub floors: Option<i64>,
    pub total_rooms: Option<i64>,
    pub total_bathrooms: Option<i64>,
    pub wifi_included: Option<bool>,
    pub laundry_onsite: Option<bool>,
}

impl Building {
    pub const COLUMNS: &'static [Column] = &[
        Column::integer("id"),
        Column::text("building_id"),
        Column::text("building_name"),
        Column::text("full_address"),
        Column::integer("operator_id"),
        Column::text("street"),
        Column::text("area"),
        Column::text("city"),
        Column::text("state"),
        Column::text("zip"),
        Column::integer("floors"),
        Column::integer("total_rooms"),
        Column::integer("total_bathrooms"),
        Column::boolean("wifi_included"),
        Column::boolean("laundry_onsite"),
    ];

    pub async fn find_all(store: &dyn DataStore) -> Result<Vec<Self>, StoreError> {
        let query = TableQuery::new(Table::Buildings).order_asc("building_name");
        fetch_typed(store, &query).await
    }

    pub async fn find_by_building_id(
        store: &dyn DataStore,
        building_id: &str,
    ) -> Result<Option<Self>, StoreError> {
        let query = TableQuery::new(Table::Buildings)
            .eq("building_id", building_id)
            .limit(1);
        Ok(fetch_typed(store, &query).await?.into_iter().next())
    }
}
