use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use services::services::database_health::HealthReport;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// GET / and GET /health
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<HealthReport>>, ApiError> {
    let report = state.health.check().await?;
    Ok(ResponseJson(ApiResponse::success(report)))
}

pub fn router(_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::seeded_state;

    #[tokio::test]
    async fn reports_table_counts() {
        let ResponseJson(response) = health_check(State(seeded_state().await)).await.unwrap();
        let report = response.into_data().unwrap();
        assert!(report.is_ok());
        assert_eq!(report.table_counts["tenants"], 2);
    }
}
