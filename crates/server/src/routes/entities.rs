//! Read-only record listings backing the dashboard cards.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    building::Building, lead::Lead, operator::Operator, room::Room, tenant::Tenant,
};
use serde::Deserialize;
use tracing::debug;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct RoomsQuery {
    pub building_id: Option<String>,
}

pub async fn get_buildings(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Building>>>, ApiError> {
    let buildings = Building::find_all(state.store.as_ref()).await?;
    Ok(ResponseJson(ApiResponse::success(buildings)))
}

pub async fn get_building(
    State(state): State<AppState>,
    Path(building_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Building>>, ApiError> {
    let building = Building::find_by_building_id(state.store.as_ref(), &building_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Building {building_id} not found")))?;
    Ok(ResponseJson(ApiResponse::success(building)))
}

/// GET /api/rooms?building_id=..
pub async fn get_rooms(
    State(state): State<AppState>,
    Query(params): Query<RoomsQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Room>>>, ApiError> {
    let rooms = Room::find_all(state.store.as_ref(), params.building_id.as_deref()).await?;
    debug!(building_id = ?params.building_id, count = rooms.len(), "Listed rooms");
    Ok(ResponseJson(ApiResponse::success(rooms)))
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<ResponseJson<ApiResponse<Room>>, ApiError> {
    let room = Room::find_by_room_id(state.store.as_ref(), &room_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Room {room_id} not found")))?;
    Ok(ResponseJson(ApiResponse::success(room)))
}

pub async fn get_tenants(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Tenant>>>, ApiError> {
    let tenants = Tenant::find_all(state.store.as_ref()).await?;
    Ok(ResponseJson(ApiResponse::success(tenants)))
}

pub async fn get_leads(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Lead>>>, ApiError> {
    let leads = Lead::find_all(state.store.as_ref()).await?;
    Ok(ResponseJson(ApiResponse::success(leads)))
}

pub async fn get_operators(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Operator>>>, ApiError> {
    let operators = Operator::find_all(state.store.as_ref()).await?;
    Ok(ResponseJson(ApiResponse::success(operators)))
}

pub async fn get_operator(
    State(state): State<AppState>,
    Path(operator_id): Path<i64>,
) -> Result<ResponseJson<ApiResponse<Operator>>, ApiError> {
    let operator = Operator::find_by_operator_id(state.store.as_ref(), operator_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Operator {operator_id} not found")))?;
    Ok(ResponseJson(ApiResponse::success(operator)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/buildings", get(get_buildings))
        .route("/buildings/{building_id}", get(get_building))
        .route("/rooms", get(get_rooms))
        .route("/rooms/{room_id}", get(get_room))
        .route("/tenants", get(get_tenants))
        .route("/leads", get(get_leads))
        .route("/operators", get(get_operators))
        .route("/operators/{operator_id}", get(get_operator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seeded_state;

    #[tokio::test]
    async fn lists_seeded_records() {
        let state = seeded_state().await;

        let ResponseJson(buildings) = get_buildings(State(state.clone())).await.unwrap();
        assert_eq!(buildings.into_data().unwrap().len(), 3);

        let ResponseJson(tenants) = get_tenants(State(state.clone())).await.unwrap();
        assert_eq!(tenants.into_data().unwrap().len(), 2);

        let ResponseJson(leads) = get_leads(State(state.clone())).await.unwrap();
        assert_eq!(leads.into_data().unwrap().len(), 3);

        let ResponseJson(operators) = get_operators(State(state)).await.unwrap();
        assert_eq!(operators.into_data().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn rooms_filtered_by_building() {
        let state = seeded_state().await;

        let ResponseJson(all) = get_rooms(State(state.clone()), Query(RoomsQuery::default()))
            .await
            .unwrap();
        assert_eq!(all.into_data().unwrap().len(), 43);

        let ResponseJson(market) = get_rooms(
            State(state),
            Query(RoomsQuery {
                building_id: Some("BLD_MARKET".into()),
            }),
        )
        .await
        .unwrap();
        let market = market.into_data().unwrap();
        assert_eq!(market.len(), 16);
        assert!(market.iter().all(|r| r.building_id.as_deref() == Some("BLD_MARKET")));
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let state = seeded_state().await;

        let building = get_building(State(state.clone()), Path("BLD_NOPE".into())).await;
        assert!(matches!(building, Err(ApiError::NotFound(_))));

        let room = get_room(State(state.clone()), Path("NOPE".into())).await;
        assert!(matches!(room, Err(ApiError::NotFound(_))));

        let operator = get_operator(State(state), Path(99)).await;
        assert!(matches!(operator, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn known_operator_is_returned() {
        let ResponseJson(operator) = get_operator(State(seeded_state().await), Path(2))
            .await
            .unwrap();
        assert_eq!(operator.into_data().unwrap().operator_id, 2);
    }

    #[tokio::test]
    async fn known_building_is_returned() {
        let state = seeded_state().await;
        let ResponseJson(building) = get_building(State(state), Path("BLD_SOMA".into()))
            .await
            .unwrap();
        assert_eq!(building.into_data().unwrap().building_id, "BLD_SOMA");
    }
}
