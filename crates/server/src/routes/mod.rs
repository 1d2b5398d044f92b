use axum::Router;

use crate::AppState;

pub mod entities;
pub mod health;
pub mod query;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router(state))
        .nest(
            "/api",
            Router::new()
                .merge(query::router(state))
                .merge(entities::router(state)),
        )
}
