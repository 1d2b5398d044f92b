//! Natural-language query dispatcher: classify, fetch, summarize.

pub mod classifier;
pub mod executor;
pub mod formatter;
pub mod intent;
pub mod response;

use std::{sync::Arc, time::Instant};

use db::store::{DataStore, StoreError};
use thiserror::Error;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use self::{
    classifier::IntentClassifier,
    executor::QueryExecutor,
    formatter::ResponseFormatter,
    intent::QueryIntent,
    response::{QueryMetadata, QueryResponse, QueryResult},
};
use super::completion::TextCompletion;

const NETWORK_ERROR_MESSAGE: &str =
    "I'm having trouble connecting to the database right now. Please check your connection and try again.";
const GENERIC_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error while processing your query. Please try again.";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DispatchError {
    /// Apology shown to the user in place of the answer.
    pub fn user_message(&self) -> &'static str {
        let is_network = match self {
            DispatchError::Store(e) => e.is_network(),
        };
        if is_network || self.to_string().to_lowercase().contains("fetch") {
            NETWORK_ERROR_MESSAGE
        } else {
            GENERIC_ERROR_MESSAGE
        }
    }
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Reported as `metadata.dataSource`.
    pub data_source: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            data_source: "supabase".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct QueryDispatcher {
    classifier: IntentClassifier,
    executor: QueryExecutor,
    formatter: ResponseFormatter,
    config: DispatcherConfig,
}

impl QueryDispatcher {
    pub fn new(
        store: Arc<dyn DataStore>,
        completion: Arc<dyn TextCompletion>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(completion.clone()),
            executor: QueryExecutor::new(store),
            formatter: ResponseFormatter::new(completion),
            config,
        }
    }

    /// Answer a free-text query. Always returns a well-formed response;
    /// failures are reported through `success` and `error`.
    pub async fn process_query(&self, query: &str) -> QueryResponse {
        let query_id = Uuid::new_v4();
        let span = info_span!("process_query", %query_id);
        self.run(query).instrument(span).await
    }

    async fn run(&self, query: &str) -> QueryResponse {
        let started = Instant::now();
        info!(query, "Processing query");

        let intent = self.classifier.classify(query).await;
        let data = match self.executor.execute(&intent).await {
            Ok(data) => data,
            Err(e) => return self.failure(query, e.into(), started),
        };
        let response = self.formatter.format(&intent, &data).await;

        let results_count = data.results_count();
        let processing_time = started.elapsed().as_millis() as u64;
        info!(
            entity = %intent.entity,
            action = %intent.action,
            results_count,
            processing_time,
            "Query answered"
        );

        QueryResponse {
            success: true,
            result: Some(QueryResult::from_data(intent.entity, &data)),
            data: Some(data),
            response,
            metadata: QueryMetadata {
                intent,
                data_source: self.config.data_source.clone(),
                results_count,
                processing_time,
            },
            error: None,
        }
    }

    fn failure(&self, query: &str, error: DispatchError, started: Instant) -> QueryResponse {
        error!(error = %error, "Query failed");
        QueryResponse {
            success: false,
            data: None,
            result: None,
            response: error.user_message().to_string(),
            metadata: QueryMetadata {
                intent: QueryIntent::degenerate(query),
                data_source: self.config.data_source.clone(),
                results_count: 0,
                processing_time: started.elapsed().as_millis() as u64,
            },
            error: Some(error.to_string()),
        }
    }
}
