//! Room search over price, location and amenity constraints.

use db::{
    models::room::RoomStatus,
    store::{DataStore, StoreError, Table, TableQuery},
};
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_ROOM_SEARCH_LIMIT: u32 = 50;

/// Building-level constraints: city, name and street address substrings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildingScope {
    pub city: Option<String>,
    pub building_name: Option<String>,
    pub location: Option<String>,
}

impl BuildingScope {
    pub fn is_empty(&self) -> bool {
        self.city.is_none() && self.building_name.is_none() && self.location.is_none()
    }

    /// Apply the scope directly to a buildings query.
    pub fn apply(&self, mut query: TableQuery) -> TableQuery {
        if let Some(city) = &self.city {
            query = query.ilike("city", city.clone());
        }
        if let Some(name) = &self.building_name {
            query = query.ilike("building_name", name.clone());
        }
        if let Some(location) = &self.location {
            query = query.ilike("full_address", location.clone());
        }
        query
    }

    /// `building_id`s in scope, or `None` when the scope places no constraint.
    pub async fn resolve(&self, store: &dyn DataStore) -> Result<Option<Vec<Value>>, StoreError> {
        if self.is_empty() {
            return Ok(None);
        }

        let query = self.apply(TableQuery::new(Table::Buildings).select(&["building_id"]));
        let ids: Vec<Value> = store
            .select(&query)
            .await?
            .into_iter()
            .filter_map(|mut record| record.get_mut("building_id").map(Value::take))
            .collect();

        debug!(scope = ?self, matched = ids.len(), "Resolved building scope");
        Ok(Some(ids))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomSearch {
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub bedrooms: Option<i64>,
    pub furnished: Option<bool>,
    pub pet_friendly: Option<bool>,
    pub available: Option<bool>,
    pub scope: BuildingScope,
    pub limit: u32,
}

impl Default for RoomSearch {
    fn default() -> Self {
        Self {
            price_min: None,
            price_max: None,
            bedrooms: None,
            furnished: None,
            pet_friendly: None,
            available: None,
            scope: BuildingScope::default(),
            limit: DEFAULT_ROOM_SEARCH_LIMIT,
        }
    }
}

impl RoomSearch {
    fn apply(&self, mut query: TableQuery) -> TableQuery {
        if let Some(min) = self.price_min {
            query = query.gte("private_room_rent", min);
        }
        if let Some(max) = self.price_max {
            query = query.lte("private_room_rent", max);
        }
        if let Some(bedrooms) = self.bedrooms {
            query = query.eq("bedrooms", bedrooms);
        }
        if let Some(furnished) = self.furnished {
            query = query.eq("furnished", furnished);
        }
        if let Some(pet_friendly) = self.pet_friendly {
            query = query.eq("pet_friendly", pet_friendly);
        }
        apply_availability(query, self.available)
    }

    /// Base rooms query, or `None` when the building scope matched nothing.
    async fn scoped_query(&self, store: &dyn DataStore) -> Result<Option<TableQuery>, StoreError> {
        let query = self.apply(TableQuery::new(Table::Rooms));
        match self.scope.resolve(store).await? {
            None => Ok(Some(query)),
            Some(ids) if ids.is_empty() => Ok(None),
            Some(ids) => Ok(Some(query.in_list("building_id", ids))),
        }
    }
}

/// `Some(true)` keeps AVAILABLE rooms, `Some(false)` keeps every other status.
pub fn apply_availability(query: TableQuery, available: Option<bool>) -> TableQuery {
    let status = RoomStatus::Available.to_string();
    match available {
        Some(true) => query.eq("status", status),
        Some(false) => query.neq("status", status),
        None => query,
    }
}

/// Rooms matching `search`, cheapest first.
pub async fn search_rooms(store: &dyn DataStore, search: &RoomSearch) -> Result<Vec<Value>, StoreError> {
    let Some(query) = search.scoped_query(store).await? else {
        return Ok(Vec::new());
    };
    store
        .select(&query.order_asc("private_room_rent").limit(search.limit))
        .await
}

pub async fn count_rooms(store: &dyn DataStore, search: &RoomSearch) -> Result<i64, StoreError> {
    match search.scoped_query(store).await? {
        Some(query) => store.count(&query).await,
        None => Ok(0),
    }
}

#[cfg(test)]
mod tests {
    use db::{DBService, seed, store::SqliteStore};

    use super::*;

    async fn store() -> SqliteStore {
        let db = DBService::new_in_memory().await.unwrap();
        seed::seed_demo_data(&db.pool).await.unwrap();
        SqliteStore::new(db.pool)
    }

    #[tokio::test]
    async fn price_ceiling_and_order() {
        let store = store().await;
        let search = RoomSearch {
            price_max: Some(2000.0),
            ..Default::default()
        };
        let rooms = search_rooms(&store, &search).await.unwrap();

        assert!(!rooms.is_empty());
        let rents: Vec<f64> = rooms
            .iter()
            .map(|r| r["private_room_rent"].as_f64().unwrap())
            .collect();
        assert!(rents.iter().all(|r| *r <= 2000.0));
        assert!(rents.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn building_scope_restricts_rooms() {
        let store = store().await;
        let search = RoomSearch {
            scope: BuildingScope {
                building_name: Some("mission".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let rooms = search_rooms(&store, &search).await.unwrap();

        assert_eq!(rooms.len(), 15);
        assert!(rooms.iter().all(|r| r["building_id"] == "BLD_MISSION"));
    }

    #[tokio::test]
    async fn unmatched_city_short_circuits_to_empty() {
        let store = store().await;
        let search = RoomSearch {
            scope: BuildingScope {
                city: Some("Oakland".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(search_rooms(&store, &search).await.unwrap().is_empty());
        assert_eq!(count_rooms(&store, &search).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn amenity_and_availability_flags() {
        let store = store().await;
        let search = RoomSearch {
            furnished: Some(true),
            available: Some(true),
            ..Default::default()
        };
        let rooms = search_rooms(&store, &search).await.unwrap();

        assert!(!rooms.is_empty());
        assert!(
            rooms
                .iter()
                .all(|r| r["furnished"] == true && r["status"] == "AVAILABLE")
        );
        assert_eq!(count_rooms(&store, &search).await.unwrap(), rooms.len() as i64);
    }

    #[tokio::test]
    async fn unavailable_flag_keeps_other_statuses() {
        let store = store().await;
        let search = RoomSearch {
            available: Some(false),
            ..Default::default()
        };
        let rooms = search_rooms(&store, &search).await.unwrap();

        assert_eq!(rooms.len(), 10);
        assert!(rooms.iter().all(|r| r["status"] != "AVAILABLE"));
        assert_eq!(count_rooms(&store, &search).await.unwrap(), 10);
    }
}
