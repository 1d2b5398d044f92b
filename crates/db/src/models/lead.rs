use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::store::{Column, DataStore, StoreError, Table, TableQuery, fetch_typed};

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Lead {
    pub id: i64,
    pub lead_id: String,
    pub email: String,
    pub status: String,
    pub interaction_count: i64,
    pub rooms_interested: Option<String>, // JSON-encoded list of room ids
    pub selected_room_id: Option<String>,
    pub showing_dates: Option<String>, // JSON-encoded list of timestamps
    pub planned_move_in: Option<String>,
    pub planned_move_out: Option<String>,
    pub visa_status: Option<String>,
}

impl Lead {
    pub const COLUMNS: &'static [Column] = &[
        Column::integer("id"),
        Column::text("lead_id"),
        Column::text("email"),
        Column::text("status"),
        Column::integer("interaction_count"),
        Column::text("rooms_interested"),
        Column::text("selected_room_id"),
        Column::text("showing_dates"),
        Column::text("planned_move_in"),
        Column::text("planned_move_out"),
        Column::text("visa_status"),
    ];

    pub async fn find_all(store: &dyn DataStore) -> Result<Vec<Self>, StoreError> {
        let query = TableQuery::new(Table::Leads).order_asc("lead_id");
        fetch_typed(store, &query).await
    }
}
