use std::sync::Arc;

use db::models::room::record_rent;
use serde_json::Value;
use tracing::warn;

use super::{
    executor::{PortfolioStatistics, QueryData},
    intent::{QueryEntity, QueryIntent},
};
use crate::services::completion::TextCompletion;

/// Room results beyond this many are not shown in the chat panel.
pub const ROOM_DISPLAY_LIMIT: usize = 6;

/// Turns executor output into the sentence shown to the user.
#[derive(Clone)]
pub struct ResponseFormatter {
    completion: Arc<dyn TextCompletion>,
}

impl ResponseFormatter {
    pub fn new(completion: Arc<dyn TextCompletion>) -> Self {
        Self { completion }
    }

    pub async fn format(&self, intent: &QueryIntent, data: &QueryData) -> String {
        if data.is_empty() {
            return no_results_message(intent.entity);
        }

        match (intent.entity, data) {
            (QueryEntity::Buildings, QueryData::Records(buildings)) => buildings_summary(buildings),
            (QueryEntity::Rooms, QueryData::Records(rooms)) => rooms_summary(rooms),
            (QueryEntity::Statistics, QueryData::Statistics(stats)) => statistics_summary(stats),
            _ => self.generate(intent, data).await,
        }
    }

    async fn generate(&self, intent: &QueryIntent, data: &QueryData) -> String {
        let prompt = match build_prompt(intent, data) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(error = %e, "Could not serialize data for response prompt");
                return minimal_summary(intent.entity, data);
            }
        };

        match self.completion.complete(&prompt).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => minimal_summary(intent.entity, data),
            Err(e) => {
                warn!(error = %e, "Response generation failed, using template");
                minimal_summary(intent.entity, data)
            }
        }
    }
}

pub fn no_results_message(entity: QueryEntity) -> String {
    let hint = match entity {
        QueryEntity::Rooms => {
            "Try widening your price range, choosing a different location, or relaxing amenity requirements like furnished or pet-friendly."
        }
        QueryEntity::Buildings => {
            "Try a different city or building name, or ask me to list all buildings."
        }
        QueryEntity::Tenants => {
            "Try searching by a different building, or ask me to list all current tenants."
        }
        QueryEntity::Statistics => {
            "There is no room or building data to analyze yet. Add some properties and ask again."
        }
        QueryEntity::Leads | QueryEntity::Operators | QueryEntity::General => {
            "Try refining your search, or ask about rooms, buildings, or tenants."
        }
    };
    format!("I couldn't find any results for your query. {hint}")
}

fn buildings_summary(buildings: &[Value]) -> String {
    let n = buildings.len();
    format!(
        "I found {n} building{} in the portfolio. Click on any building card below to see its rooms and details.",
        plural(n)
    )
}

fn rooms_summary(rooms: &[Value]) -> String {
    let n = rooms.len();
    let mut text = format!("I found {n} room{} matching your search.", plural(n));

    let prices: Vec<f64> = rooms.iter().filter_map(record_rent).collect();
    if !prices.is_empty() {
        let average = prices.iter().sum::<f64>() / prices.len() as f64;
        let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        text.push_str(&format!(
            " Monthly rent averages {} and ranges from {} to {}.",
            format_currency(average),
            format_currency(min),
            format_currency(max)
        ));
    }

    if n > ROOM_DISPLAY_LIMIT {
        text.push_str(&format!(
            " Showing the first {ROOM_DISPLAY_LIMIT}; narrow your search to see more specific matches."
        ));
    }
    text
}

fn statistics_summary(stats: &PortfolioStatistics) -> String {
    let rooms = &stats.rooms;
    let mut text = format!(
        "Portfolio overview: {} room{} across {} building{}, {} available.",
        rooms.total,
        plural(rooms.total as usize),
        stats.buildings.total,
        plural(stats.buildings.total as usize),
        rooms.available
    );

    match stats.occupancy_rate() {
        Some(rate) => text.push_str(&format!(" Occupancy rate is {rate}%.")),
        None => text.push_str(" Occupancy rate is not available because there are no rooms on record."),
    }

    match (rooms.min_rent, rooms.max_rent, rooms.average_rent) {
        (Some(min), Some(max), Some(avg)) => text.push_str(&format!(
            " Rent ranges from {} to {} with an average of {}.",
            format_currency(min),
            format_currency(max),
            format_currency(avg)
        )),
        _ => text.push_str(" No rent data is available yet."),
    }
    text
}

fn minimal_summary(entity: QueryEntity, data: &QueryData) -> String {
    match data {
        QueryData::Count { count } => format!("There are {count} matching {entity}."),
        other => {
            let n = other.results_count();
            format!("I found {n} result{} for your query.", plural(n))
        }
    }
}

fn build_prompt(intent: &QueryIntent, data: &QueryData) -> Result<String, serde_json::Error> {
    let intent_json = serde_json::to_string(intent)?;
    let data_json = serde_json::to_string_pretty(data)?;
    Ok(format!(
        r#"You are HomeWiz, a helpful property management assistant.

The user asked: "{query}"
Classified intent: {intent_json}

Data returned from the database:
{data_json}

Write a friendly, conversational answer to the user's question based only on this data.
Highlight the most relevant details, mention totals where useful, and keep it under 200 words."#,
        query = intent.original_query
    ))
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Whole-dollar amount with thousands separators, e.g. `$2,286`.
fn format_currency(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::services::{
        completion::{CompletionError, DisabledCompletion},
        query_dispatcher::intent::{QueryAction, QueryFilters},
    };

    struct EchoCompletion {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextCompletion for EchoCompletion {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("  Here are your tenants.  ".to_string())
        }
    }

    fn intent(entity: QueryEntity) -> QueryIntent {
        QueryIntent::new(entity, QueryAction::List, QueryFilters::default(), 0.9, "q")
    }

    fn offline() -> ResponseFormatter {
        ResponseFormatter::new(Arc::new(DisabledCompletion))
    }

    #[test]
    fn currency_grouping() {
        assert_eq!(format_currency(950.4), "$950");
        assert_eq!(format_currency(2285.5), "$2,286");
        assert_eq!(format_currency(1234567.0), "$1,234,567");
    }

    #[tokio::test]
    async fn empty_results_use_entity_hint() {
        let formatter = offline();
        let empty = QueryData::Records(vec![]);

        let rooms = formatter.format(&intent(QueryEntity::Rooms), &empty).await;
        assert_eq!(rooms, no_results_message(QueryEntity::Rooms));
        assert!(rooms.contains("price range"));

        let general = formatter.format(&intent(QueryEntity::General), &empty).await;
        assert!(general.contains("refining your search"));
    }

    #[tokio::test]
    async fn rooms_template_reports_prices_and_truncation() {
        let rooms: Vec<Value> = (0..8)
            .map(|i| json!({"room_id": format!("R{i}"), "private_room_rent": 1000 + i * 100}))
            .chain([json!({"room_id": "R-free", "price": 0})])
            .collect();
        let text = offline()
            .format(&intent(QueryEntity::Rooms), &QueryData::Records(rooms))
            .await;

        assert!(text.starts_with("I found 9 rooms matching your search."));
        assert!(text.contains("averages $1,350 and ranges from $1,000 to $1,700"));
        assert!(text.contains("Showing the first 6"));
    }

    #[tokio::test]
    async fn single_building_template() {
        let text = offline()
            .format(
                &intent(QueryEntity::Buildings),
                &QueryData::Records(vec![json!({"building_id": "BLD_SOMA"})]),
            )
            .await;
        assert!(text.starts_with("I found 1 building in the portfolio."));
        assert!(text.contains("building card"));
    }

    #[tokio::test]
    async fn statistics_template() {
        let stats = PortfolioStatistics::from_rooms(
            &[
                json!({"rent": 1000, "status": "AVAILABLE"}),
                json!({"rent": 2000, "status": "OCCUPIED"}),
            ],
            1,
        );
        let text = offline()
            .format(&intent(QueryEntity::Statistics), &QueryData::Statistics(stats))
            .await;
        assert!(text.contains("2 rooms across 1 building, 1 available"));
        assert!(text.contains("Occupancy rate is 50%"));
        assert!(text.contains("from $1,000 to $2,000 with an average of $1,500"));
    }

    #[tokio::test]
    async fn statistics_without_rooms_do_not_divide() {
        let stats = PortfolioStatistics::from_rooms(&[], 2);
        let text = offline()
            .format(&intent(QueryEntity::Statistics), &QueryData::Statistics(stats))
            .await;
        assert!(text.contains("Occupancy rate is not available"));
        assert!(text.contains("No rent data"));
    }

    #[tokio::test]
    async fn other_entities_go_to_the_model() {
        let completion = Arc::new(EchoCompletion {
            prompts: Mutex::new(Vec::new()),
        });
        let formatter = ResponseFormatter::new(completion.clone());
        let data = QueryData::Records(vec![json!({"tenant_name": "Alex Chen"})]);

        let text = formatter.format(&intent(QueryEntity::Tenants), &data).await;

        assert_eq!(text, "Here are your tenants.");
        let prompts = completion.prompts.lock().unwrap();
        assert!(prompts[0].contains("Alex Chen"));
        assert!(prompts[0].contains("under 200 words"));
    }

    #[tokio::test]
    async fn model_failure_falls_back_to_counts() {
        let formatter = offline();

        let count = formatter
            .format(&intent(QueryEntity::Buildings), &QueryData::Count { count: 3 })
            .await;
        assert_eq!(count, "There are 3 matching buildings.");

        let tenants = formatter
            .format(
                &intent(QueryEntity::Tenants),
                &QueryData::Records(vec![json!({}), json!({})]),
            )
            .await;
        assert_eq!(tenants, "I found 2 results for your query.");
    }
}
