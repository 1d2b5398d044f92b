use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;

use crate::services::room_search::{BuildingScope, RoomSearch};

/// Record type a query targets; `Statistics` is the aggregate pseudo-entity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueryEntity {
    Rooms,
    Buildings,
    Tenants,
    Leads,
    Operators,
    Statistics,
    General,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QueryAction {
    Search,
    List,
    Count,
    Analyze,
    GetInfo,
}

/// Sparse constraint set extracted from a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct QueryFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furnished: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_friendly: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl QueryFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Drop every constraint that has no meaning for `entity`.
    pub fn retain_applicable(self, entity: QueryEntity) -> Self {
        match entity {
            QueryEntity::Rooms
            | QueryEntity::General
            | QueryEntity::Leads
            | QueryEntity::Operators => self,
            QueryEntity::Buildings | QueryEntity::Tenants => Self {
                city: self.city,
                building_name: self.building_name,
                location: self.location,
                ..Self::default()
            },
            QueryEntity::Statistics => Self::default(),
        }
    }

    /// True when a room query needs more than the plain availability listing.
    pub fn needs_room_search(&self) -> bool {
        Self {
            available: None,
            ..self.clone()
        } != Self::default()
    }

    pub fn building_scope(&self) -> BuildingScope {
        BuildingScope {
            city: self.city.clone(),
            building_name: self.building_name.clone(),
            location: self.location.clone(),
        }
    }

    pub fn room_search(&self) -> RoomSearch {
        RoomSearch {
            price_min: self.price_min,
            price_max: self.price_max,
            bedrooms: self.bedrooms,
            furnished: self.furnished,
            pet_friendly: self.pet_friendly,
            available: self.available,
            scope: self.building_scope(),
            ..RoomSearch::default()
        }
    }
}

/// Structured reading of one free-text query. Built once per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct QueryIntent {
    pub entity: QueryEntity,
    pub action: QueryAction,
    pub filters: QueryFilters,
    pub confidence: f64,
    pub original_query: String,
}

impl QueryIntent {
    pub fn new(
        entity: QueryEntity,
        action: QueryAction,
        filters: QueryFilters,
        confidence: f64,
        original_query: impl Into<String>,
    ) -> Self {
        Self {
            entity,
            action,
            filters: filters.retain_applicable(entity),
            confidence: confidence.clamp(0.0, 1.0),
            original_query: original_query.into(),
        }
    }

    /// Placeholder attached to failed responses.
    pub fn degenerate(original_query: impl Into<String>) -> Self {
        Self::new(
            QueryEntity::General,
            QueryAction::Search,
            QueryFilters::default(),
            0.0,
            original_query,
        )
    }
}
