use serde::Serialize;
use serde_json::Value;

use super::{
    executor::{PortfolioStatistics, QueryData},
    intent::{QueryEntity, QueryIntent},
};

/// Outcome of one `process_query` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<QueryData>,
    /// Same data keyed by entity for renderers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<QueryResult>,
    pub response: String,
    pub metadata: QueryMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMetadata {
    pub intent: QueryIntent,
    pub data_source: String,
    pub results_count: usize,
    /// Wall-clock milliseconds for the whole call.
    pub processing_time: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryResult {
    Buildings(Vec<Value>),
    Rooms(Vec<Value>),
    Tenants(Vec<Value>),
    Stats(PortfolioStatistics),
    Count(i64),
}

impl QueryResult {
    pub fn from_data(entity: QueryEntity, data: &QueryData) -> Self {
        match data {
            QueryData::Statistics(stats) => QueryResult::Stats(stats.clone()),
            QueryData::Count { count } => QueryResult::Count(*count),
            QueryData::Records(records) => match entity {
                QueryEntity::Buildings => QueryResult::Buildings(records.clone()),
                QueryEntity::Tenants => QueryResult::Tenants(records.clone()),
                QueryEntity::Rooms
                | QueryEntity::Leads
                | QueryEntity::Operators
                | QueryEntity::General
                | QueryEntity::Statistics => QueryResult::Rooms(records.clone()),
            },
        }
    }
}
