use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use crate::store::{Column, DataStore, StoreError, Table, TableQuery, fetch_typed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Available,
    Occupied,
    Maintenance,
    Reserved,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct Room {
    pub id: i64,
    pub room_id: String,
    pub room_number: String,
    pub building_id: Option<String>,
    pub floor_number: Option<i64>,
    pub maximum_people_in_room: Option<i64>,
    pub private_room_rent: Option<f64>,
    pub bathroom_type: Option<String>,
    pub bed_size: Option<String>,
    pub bed_type: Option<String>,
    pub view: Option<String>,
    pub sq_footage: Option<i64>,
    pub bedrooms: Option<i64>,
    pub furnished: Option<bool>,
    pub pet_friendly: Option<bool>,
    pub status: String,
}

impl Room {
    pub const COLUMNS: &'static [Column] = &[
        Column::integer("id"),
        Column::text("room_id"),
        Column::text("room_number"),
        Column::text("building_id"),
        Column::integer("floor_number"),
        Column::integer("maximum_people_in_room"),
        Column::real("private_room_rent"),
        Column::text("bathroom_type"),
        Column::text("bed_size"),
        Column::text("bed_type"),
        Column::text("view"),
        Column::integer("sq_footage"),
        Column::integer("bedrooms"),
        Column::boolean("furnished"),
        Column::boolean("pet_friendly"),
        Column::text("status"),
    ];

    pub async fn find_all(
        store: &dyn DataStore,
        building_id: Option<&str>,
    ) -> Result<Vec<Self>, StoreError> {
        let mut query = TableQuery::new(Table::Rooms).order_asc("room_id");
        if let Some(building_id) = building_id {
            query = query.eq("building_id", building_id);
        }
        fetch_typed(store, &query).await
    }

    pub async fn find_by_room_id(
        store: &dyn DataStore,
        room_id: &str,
    ) -> Result<Option<Self>, StoreError> {
        let query = TableQuery::new(Table::Rooms).eq("room_id", room_id).limit(1);
        Ok(fetch_typed(store, &query).await?.into_iter().next())
    }
}

/// Rent of a raw room record: `private_room_rent`, else `price`, when positive.
pub fn record_rent(record: &Value) -> Option<f64> {
    ["private_room_rent", "price"]
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_f64))
        .filter(|rent| *rent > 0.0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn record_rent_prefers_private_room_rent() {
        assert_eq!(record_rent(&json!({"private_room_rent": 1500.0, "price": 900})), Some(1500.0));
        assert_eq!(record_rent(&json!({"price": 900})), Some(900.0));
        assert_eq!(record_rent(&json!({"private_room_rent": null, "price": 0})), None);
        assert_eq!(record_rent(&json!({"room_id": "R1"})), None);
    }

    #[test]
    fn status_strings_are_screaming_snake_case() {
        assert_eq!(RoomStatus::Available.to_string(), "AVAILABLE");
        assert_eq!(serde_json::to_value(RoomStatus::Occupied).unwrap(), json!("OCCUPIED"));
    }
}
