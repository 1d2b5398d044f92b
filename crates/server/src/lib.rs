use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use db::store::DataStore;
use services::services::{database_health::DatabaseHealthService, query_dispatcher::QueryDispatcher};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod routes;

const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// Shared handles for every route.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub dispatcher: QueryDispatcher,
    pub health: DatabaseHealthService,
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(ALLOWED_ORIGINS.map(HeaderValue::from_static))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    routes::router(&state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use db::{DBService, seed, store::SqliteStore};
    use services::services::{
        completion::DisabledCompletion,
        database_health::DatabaseHealthService,
        query_dispatcher::{DispatcherConfig, QueryDispatcher},
    };

    use crate::AppState;

    pub async fn seeded_state() -> AppState {
        utils::logging::init_for_tests();
        let db = DBService::new_in_memory().await.unwrap();
        seed::seed_demo_data(&db.pool).await.unwrap();

        let store = Arc::new(SqliteStore::new(db.pool.clone()));
        AppState {
            dispatcher: QueryDispatcher::new(
                store.clone(),
                Arc::new(DisabledCompletion),
                DispatcherConfig::default(),
            ),
            health: DatabaseHealthService::new(store.clone(), Some(db.pool)),
            store,
        }
    }
}
