use std::sync::Arc;

use db::{
    models::room::RoomStatus,
    store::{DataStore, StoreError, Table, TableQuery},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use ts_rs::TS;

use super::intent::{QueryAction, QueryEntity, QueryIntent};
use crate::services::room_search::{apply_availability, count_rooms, search_rooms};

pub const BUILDING_LIMIT: u32 = 20;
pub const TENANT_LIMIT: u32 = 20;
pub const ROOM_LISTING_LIMIT: u32 = 10;

/// Raw executor output: a record list, a count, or portfolio aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryData {
    Records(Vec<Value>),
    Count { count: i64 },
    Statistics(PortfolioStatistics),
}

impl QueryData {
    pub fn is_empty(&self) -> bool {
        matches!(self, QueryData::Records(records) if records.is_empty())
    }

    /// Number of records, or 1 for a single aggregate value.
    pub fn results_count(&self) -> usize {
        match self {
            QueryData::Records(records) => records.len(),
            QueryData::Count { .. } | QueryData::Statistics(_) => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct RoomStatistics {
    pub total: i64,
    pub available: i64,
    pub average_rent: Option<f64>,
    pub min_rent: Option<f64>,
    pub max_rent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct BuildingStatistics {
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct PortfolioStatistics {
    pub rooms: RoomStatistics,
    pub buildings: BuildingStatistics,
}

impl PortfolioStatistics {
    /// Aggregate raw room records (`private_room_rent` or `rent`, plus `status`).
    pub fn from_rooms(rooms: &[Value], building_count: i64) -> Self {
        let available_status = RoomStatus::Available.to_string();
        let available = rooms
            .iter()
            .filter(|r| r.get("status").and_then(Value::as_str) == Some(available_status.as_str()))
            .count() as i64;

        let rents: Vec<f64> = rooms
            .iter()
            .filter_map(|r| {
                ["private_room_rent", "rent"]
                    .iter()
                    .find_map(|key| r.get(*key).and_then(Value::as_f64))
            })
            .collect();

        let (average_rent, min_rent, max_rent) = if rents.is_empty() {
            (None, None, None)
        } else {
            let sum: f64 = rents.iter().sum();
            (
                Some(sum / rents.len() as f64),
                rents.iter().copied().reduce(f64::min),
                rents.iter().copied().reduce(f64::max),
            )
        };

        Self {
            rooms: RoomStatistics {
                total: rooms.len() as i64,
                available,
                average_rent,
                min_rent,
                max_rent,
            },
            buildings: BuildingStatistics {
                total: building_count,
            },
        }
    }

    /// Percentage of rooms not available, or `None` when there are no rooms.
    pub fn occupancy_rate(&self) -> Option<i64> {
        let total = self.rooms.total;
        if total <= 0 {
            return None;
        }
        let occupied = (total - self.rooms.available) as f64;
        Some((occupied / total as f64 * 100.0).round() as i64)
    }
}

/// Read-only dispatch from a classified intent to the data store.
#[derive(Clone)]
pub struct QueryExecutor {
    store: Arc<dyn DataStore>,
}

impl QueryExecutor {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Store failures propagate unchanged.
    pub async fn execute(&self, intent: &QueryIntent) -> Result<QueryData, StoreError> {
        match intent.entity {
            QueryEntity::Rooms | QueryEntity::General => self.rooms(intent).await,
            QueryEntity::Leads | QueryEntity::Operators => {
                info!(
                    entity = %intent.entity,
                    "No dedicated executor for entity, answering with rooms"
                );
                self.rooms(intent).await
            }
            QueryEntity::Buildings => self.buildings(intent).await,
            QueryEntity::Tenants => self.tenants(intent).await,
            QueryEntity::Statistics => self.statistics().await,
        }
    }

    async fn rooms(&self, intent: &QueryIntent) -> Result<QueryData, StoreError> {
        let filters = &intent.filters;

        if intent.action == QueryAction::Count {
            let count = count_rooms(self.store.as_ref(), &filters.room_search()).await?;
            return Ok(QueryData::Count { count });
        }

        if filters.needs_room_search() {
            debug!(?filters, "Delegating to room search");
            let rooms = search_rooms(self.store.as_ref(), &filters.room_search()).await?;
            return Ok(QueryData::Records(rooms));
        }

        let query = apply_availability(TableQuery::new(Table::Rooms), filters.available)
            .order_asc("private_room_rent")
            .limit(ROOM_LISTING_LIMIT);
        Ok(QueryData::Records(self.store.select(&query).await?))
    }

    async fn buildings(&self, intent: &QueryIntent) -> Result<QueryData, StoreError> {
        let query = intent
            .filters
            .building_scope()
            .apply(TableQuery::new(Table::Buildings));

        if intent.action == QueryAction::Count {
            let count = self.store.count(&query).await?;
            return Ok(QueryData::Count { count });
        }

        let buildings = self
            .store
            .select(&query.order_asc("building_name").limit(BUILDING_LIMIT))
            .await?;
        Ok(QueryData::Records(buildings))
    }

    async fn tenants(&self, intent: &QueryIntent) -> Result<QueryData, StoreError> {
        let is_count = intent.action == QueryAction::Count;
        let mut query = TableQuery::new(Table::Tenants);

        if let Some(ids) = intent.filters.building_scope().resolve(self.store.as_ref()).await? {
            if ids.is_empty() {
                return Ok(if is_count {
                    QueryData::Count { count: 0 }
                } else {
                    QueryData::Records(Vec::new())
                });
            }
            query = query.in_list("building_id", ids);
        }

        if is_count {
            let count = self.store.count(&query).await?;
            return Ok(QueryData::Count { count });
        }

        let tenants = self
            .store
            .select(&query.order_asc("tenant_name").limit(TENANT_LIMIT))
            .await?;
        Ok(QueryData::Records(tenants))
    }

    async fn statistics(&self) -> Result<QueryData, StoreError> {
        let rooms = self
            .store
            .select(&TableQuery::new(Table::Rooms).select(&["private_room_rent", "status"]))
            .await?;
        let building_count = self.store.count(&TableQuery::new(Table::Buildings)).await?;

        Ok(QueryData::Statistics(PortfolioStatistics::from_rooms(
            &rooms,
            building_count,
        )))
    }
}
