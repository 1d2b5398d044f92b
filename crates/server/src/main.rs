use std::sync::Arc;

use anyhow::Context;
use db::{
    DBService, seed,
    store::{DataStore, PostgrestConfig, PostgrestStore, SqliteStore},
};
use server::{AppState, app, config::Config};
use services::services::{
    claude_api::{ClaudeApiClient, ClaudeConfig},
    completion::{DisabledCompletion, TextCompletion},
    database_health::DatabaseHealthService,
    query_dispatcher::{DispatcherConfig, QueryDispatcher},
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    utils::logging::init(&config.log_filter)?;

    let (store, pool) = match &config.supabase {
        Some(supabase) => {
            info!(url = %supabase.url, "Using Supabase data store");
            let store: Arc<dyn DataStore> = Arc::new(PostgrestStore::new(PostgrestConfig::new(
                supabase.url.clone(),
                supabase.anon_key.clone(),
            ))?);
            (store, None)
        }
        None => {
            let db = DBService::new(&config.database_url)
                .await
                .with_context(|| format!("failed to open {}", config.database_url))?;
            if config.seed_demo_data {
                let summary = seed::seed_demo_data(&db.pool).await?;
                info!(?summary, "Demo data seeded");
            }
            let store: Arc<dyn DataStore> = Arc::new(SqliteStore::new(db.pool.clone()));
            (store, Some(db.pool))
        }
    };

    let completion: Arc<dyn TextCompletion> = match &config.anthropic_api_key {
        Some(key) => {
            let mut claude = ClaudeConfig::new(key.clone());
            if let Some(model) = &config.anthropic_model {
                claude = claude.with_model(model.clone());
            }
            let client = ClaudeApiClient::new(claude)?;
            info!(model = client.model(), "Using Claude for classification and answers");
            Arc::new(client)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set, using keyword classification only");
            Arc::new(DisabledCompletion)
        }
    };

    let state = AppState {
        dispatcher: QueryDispatcher::new(
            store.clone(),
            completion,
            DispatcherConfig {
                data_source: store.label().to_string(),
            },
        ),
        health: DatabaseHealthService::new(store.clone(), pool),
        store,
    };

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "HomeWiz server listening");

    axum::serve(listener, app(state)).await?;
    Ok(())
}
