use axum::{Json, Router, extract::State, response::Json as ResponseJson, routing::post};
use serde::Deserialize;
use services::services::query_dispatcher::response::QueryResponse;
use ts_rs::TS;

use crate::AppState;

#[derive(Debug, Deserialize, TS)]
pub struct QueryRequest {
    pub query: String,
}

/// POST /api/query
/// Always 200; failures are reported inside the body.
pub async fn process_query(
    State(state): State<AppState>,
    Json(payload): Json<QueryRequest>,
) -> ResponseJson<QueryResponse> {
    ResponseJson(state.dispatcher.process_query(&payload.query).await)
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new().route("/query", post(process_query))
}
