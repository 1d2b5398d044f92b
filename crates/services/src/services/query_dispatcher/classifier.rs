use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::intent::{QueryAction, QueryEntity, QueryFilters, QueryIntent};
use crate::services::{
    claude_api::extract_json_object,
    completion::{CompletionError, TextCompletion},
};

/// Confidence attached to every keyword-rule classification.
pub const FALLBACK_CONFIDENCE: f64 = 0.6;
/// Used when the model omits a confidence value.
const DEFAULT_MODEL_CONFIDENCE: f64 = 0.8;

static DOLLAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\s*(\d[\d,]*(?:\.\d+)?)").expect("valid dollar regex"));
static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d[\d,]*(?:\.\d+)?)").expect("valid number regex"));

#[derive(Debug, Error)]
enum ClassificationError {
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error("no JSON object in model output")]
    NoJson,
    #[error("malformed intent JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct ModelIntent {
    entity: QueryEntity,
    action: QueryAction,
    #[serde(default)]
    filters: QueryFilters,
    confidence: Option<f64>,
}

/// Turns free text into a [`QueryIntent`], asking the model first and falling
/// back to keyword rules.
#[derive(Clone)]
pub struct IntentClassifier {
    completion: Arc<dyn TextCompletion>,
}

impl IntentClassifier {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }

    /// Never fails: any model or parse error degrades to [`fallback_intent`].
    pub async fn classify(&self, query: &str) -> QueryIntent {
        match self.classify_with_model(query).await {
            Ok(intent) => {
                debug!(
                    entity = %intent.entity,
                    action = %intent.action,
                    confidence = intent.confidence,
                    "Model classified query"
                );
                intent
            }
            Err(e) => {
                warn!(error = %e, "Model classification failed, using keyword rules");
                fallback_intent(query)
            }
        }
    }

    async fn classify_with_model(&self, query: &str) -> Result<QueryIntent, ClassificationError> {
        let output = self.completion.complete(&build_prompt(query)).await?;
        let json = extract_json_object(&output).ok_or(ClassificationError::NoJson)?;
        let parsed: ModelIntent = serde_json::from_str(json)?;

        let confidence = parsed
            .confidence
            .filter(|c| c.is_finite())
            .unwrap_or(DEFAULT_MODEL_CONFIDENCE);

        Ok(QueryIntent::new(
            parsed.entity,
            parsed.action,
            parsed.filters,
            confidence,
            query,
        ))
    }
}

/// Deterministic keyword rules. Earlier rules win: "building", then "tenant",
/// then "statistic"/"how many", else a room search.
pub fn fallback_intent(query: &str) -> QueryIntent {
    let lower = query.to_lowercase();
    let asks_count = lower.contains("how many");
    let count_or = |action| if asks_count { QueryAction::Count } else { action };

    let (entity, action, filters) = if lower.contains("building") {
        (QueryEntity::Buildings, count_or(QueryAction::List), QueryFilters::default())
    } else if lower.contains("tenant") {
        (QueryEntity::Tenants, count_or(QueryAction::List), QueryFilters::default())
    } else if lower.contains("statistic") || asks_count {
        (QueryEntity::Statistics, QueryAction::Analyze, QueryFilters::default())
    } else {
        let filters = QueryFilters {
            price_max: extract_price(&lower),
            available: lower.contains("available").then_some(true),
            ..Default::default()
        };
        (QueryEntity::Rooms, QueryAction::Search, filters)
    };

    QueryIntent::new(entity, action, filters, FALLBACK_CONFIDENCE, query)
}

/// First `$` amount, else the first bare number.
fn extract_price(text: &str) -> Option<f64> {
    let captures = DOLLAR_PATTERN
        .captures(text)
        .or_else(|| NUMBER_PATTERN.captures(text))?;
    captures[1].replace(',', "").parse().ok()
}

fn build_prompt(query: &str) -> String {
    format!(
        r#"You are the query router for HomeWiz, a property management platform with rooms, buildings, tenants, leads and operators.

Classify the user's query and return ONLY a JSON object with this shape:
{{
  "entity": "rooms|buildings|tenants|leads|operators|statistics|general",
  "action": "search|list|count|analyze|get_info",
  "filters": {{
    "priceMin": number, "priceMax": number, "city": string, "bedrooms": number,
    "available": boolean, "furnished": boolean, "petFriendly": boolean,
    "buildingName": string, "location": string
  }},
  "confidence": number between 0 and 1
}}
Include only the filters the query actually states.

Examples:
Query: "Show me available rooms under $1500"
{{"entity": "rooms", "action": "search", "filters": {{"priceMax": 1500, "available": true}}, "confidence": 0.95}}

Query: "List all buildings in San Francisco"
{{"entity": "buildings", "action": "list", "filters": {{"city": "San Francisco"}}, "confidence": 0.9}}

Query: "How many tenants live in Mission Heights?"
{{"entity": "tenants", "action": "count", "filters": {{"buildingName": "Mission Heights"}}, "confidence": 0.9}}

Query: "What's our occupancy rate?"
{{"entity": "statistics", "action": "analyze", "filters": {{}}, "confidence": 0.9}}

Query: "Furnished pet-friendly rooms between $1200 and $2000"
{{"entity": "rooms", "action": "search", "filters": {{"priceMin": 1200, "priceMax": 2000, "furnished": true, "petFriendly": true}}, "confidence": 0.9}}

Query: "{query}"
"#
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;

    struct ScriptedCompletion {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedCompletion {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err("connection reset".to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextCompletion for ScriptedCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(CompletionError::Unavailable)
        }
    }

    #[test]
    fn how_many_buildings_stays_on_buildings() {
        let intent = fallback_intent("How many buildings do you have?");
        assert_eq!(intent.entity, QueryEntity::Buildings);
        assert_eq!(intent.action, QueryAction::Count);
        assert_eq!(intent.confidence, FALLBACK_CONFIDENCE);
    }

    #[test]
    fn list_buildings_without_count_phrasing() {
        let intent = fallback_intent("Show me our buildings");
        assert_eq!(intent.entity, QueryEntity::Buildings);
        assert_eq!(intent.action, QueryAction::List);
    }

    #[test]
    fn dollar_amount_becomes_price_ceiling() {
        let intent = fallback_intent("Show me rooms under $2000");
        assert_eq!(intent.entity, QueryEntity::Rooms);
        assert_eq!(intent.action, QueryAction::Search);
        assert_eq!(intent.filters.price_max, Some(2000.0));
        assert_eq!(intent.filters.available, None);
    }

    #[test]
    fn price_with_thousands_separator() {
        let intent = fallback_intent("rooms below $1,750 please");
        assert_eq!(intent.filters.price_max, Some(1750.0));
    }

    #[test]
    fn dollar_amount_wins_over_earlier_bare_number() {
        let intent = fallback_intent("Show me 2 bedroom rooms under $3000");
        assert_eq!(intent.filters.price_max, Some(3000.0));
    }

    #[test]
    fn bare_number_used_without_dollar_amount() {
        let intent = fallback_intent("rooms under 1800");
        assert_eq!(intent.filters.price_max, Some(1800.0));
    }

    #[test]
    fn available_furnished_only_extracts_availability() {
        let intent = fallback_intent("Available furnished rooms");
        assert_eq!(intent.entity, QueryEntity::Rooms);
        assert_eq!(intent.filters.available, Some(true));
        assert_eq!(intent.filters.furnished, None);
        assert_eq!(intent.filters.price_max, None);
    }

    #[test]
    fn statistics_and_how_many_rules() {
        assert_eq!(fallback_intent("Give me statistics").entity, QueryEntity::Statistics);
        let intent = fallback_intent("How many rooms are free?");
        assert_eq!(intent.entity, QueryEntity::Statistics);
        assert_eq!(intent.action, QueryAction::Analyze);
        assert!(intent.filters.is_empty());
    }

    #[test]
    fn tenant_rule_precedes_statistics() {
        let intent = fallback_intent("how many tenants are there");
        assert_eq!(intent.entity, QueryEntity::Tenants);
        assert_eq!(intent.action, QueryAction::Count);
    }

    #[test]
    fn fallback_is_deterministic() {
        let query = "Any available rooms for $1800 in the Mission?";
        assert_eq!(fallback_intent(query), fallback_intent(query));
    }

    #[tokio::test]
    async fn model_reply_is_parsed_and_sanitized() {
        let completion = ScriptedCompletion::replying(
            r#"Here you go:
```json
{"entity": "buildings", "action": "list", "filters": {"city": "San Francisco", "bedrooms": 2}, "confidence": 1.7}
```"#,
        );
        let classifier = IntentClassifier::new(completion.clone());

        let intent = classifier.classify("buildings in SF").await;

        assert_eq!(intent.entity, QueryEntity::Buildings);
        assert_eq!(intent.action, QueryAction::List);
        assert_eq!(intent.filters.city.as_deref(), Some("San Francisco"));
        assert_eq!(intent.filters.bedrooms, None);
        assert_eq!(intent.confidence, 1.0);
        assert_eq!(intent.original_query, "buildings in SF");

        let prompts = completion.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains(r#"Query: "buildings in SF""#));
    }

    #[tokio::test]
    async fn missing_confidence_uses_model_default() {
        let classifier = IntentClassifier::new(ScriptedCompletion::replying(
            r#"{"entity": "statistics", "action": "analyze"}"#,
        ));
        let intent = classifier.classify("occupancy?").await;
        assert_eq!(intent.entity, QueryEntity::Statistics);
        assert_eq!(intent.confidence, DEFAULT_MODEL_CONFIDENCE);
    }

    #[tokio::test]
    async fn unparseable_reply_falls_back() {
        let classifier = IntentClassifier::new(ScriptedCompletion::replying(
            r#"{"entity": "spaceships", "action": "list"}"#,
        ));
        let intent = classifier.classify("Show me rooms under $2000").await;
        assert_eq!(intent, fallback_intent("Show me rooms under $2000"));
    }

    #[tokio::test]
    async fn completion_failure_falls_back() {
        let classifier = IntentClassifier::new(ScriptedCompletion::failing());
        let intent = classifier.classify("List the tenants").await;
        assert_eq!(intent.entity, QueryEntity::Tenants);
        assert_eq!(intent.confidence, FALLBACK_CONFIDENCE);
    }

    #[tokio::test]
    async fn prose_without_json_falls_back() {
        let classifier =
            IntentClassifier::new(ScriptedCompletion::replying("I think they want rooms."));
        let intent = classifier.classify("Available furnished rooms").await;
        assert_eq!(intent.filters.available, Some(true));
        assert_eq!(intent.confidence, FALLBACK_CONFIDENCE);
    }
}
