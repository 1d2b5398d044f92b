use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, header};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use super::{DataStore, Direction, Filter, StoreError, TableQuery};

#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    pub api_key: SecretString,
    pub request_timeout: Duration,
}

impl PostgrestConfig {
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Supabase REST backend.
#[derive(Debug, Clone)]
pub struct PostgrestStore {
    http: Client,
    config: PostgrestConfig,
}

impl PostgrestStore {
    pub fn new(config: PostgrestConfig) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("homewiz/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    fn table_url(&self, query: &TableQuery) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.base_url.trim_end_matches('/'),
            query.table()
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let key = self.config.api_key.expose_secret();
        request
            .header("apikey", key)
            .header(header::AUTHORIZATION, format!("Bearer {key}"))
    }
}

#[async_trait]
impl DataStore for PostgrestStore {
    fn label(&self) -> &str {
        "supabase"
    }

    async fn select(&self, query: &TableQuery) -> Result<Vec<Value>, StoreError> {
        query.validate()?;
        let params = select_params(query);
        debug!(table = %query.table(), ?params, "postgrest select");

        let res = self
            .authorized(self.http.get(self.table_url(query)))
            .query(&params)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(StoreError::Http { status, body });
        }

        res.json::<Vec<Value>>()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }

    async fn count(&self, query: &TableQuery) -> Result<i64, StoreError> {
        query.validate()?;
        let mut params = filter_params(query.filters());
        params.push(("limit".to_string(), "0".to_string()));
        debug!(table = %query.table(), ?params, "postgrest count");

        let res = self
            .authorized(self.http.head(self.table_url(query)))
            .header("Prefer", "count=exact")
            .query(&params)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if !res.status().is_success() {
            return Err(StoreError::Http {
                status: res.status().as_u16(),
                body: String::new(),
            });
        }

        res.headers()
            .get(header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| StoreError::InvalidResponse("missing Content-Range total".to_string()))
    }
}

fn select_params(query: &TableQuery) -> Vec<(String, String)> {
    let columns = query
        .projection()
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(",");

    let mut params = vec![("select".to_string(), columns)];
    params.extend(filter_params(query.filters()));

    if let Some(order) = query.order() {
        let direction = match order.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }
    if let Some(limit) = query.row_limit() {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|filter| {
            let value = match filter {
                Filter::Eq { value, .. } if value.is_null() => "is.null".to_string(),
                Filter::Eq { value, .. } => format!("eq.{}", render_scalar(value)),
                Filter::Neq { value, .. } if value.is_null() => "not.is.null".to_string(),
                Filter::Neq { value, .. } => format!("neq.{}", render_scalar(value)),
                Filter::ILike { pattern, .. } => format!("ilike.*{}*", escape_ilike(pattern)),
                Filter::Gte { value, .. } => format!("gte.{}", value),
                Filter::Lte { value, .. } => format!("lte.{}", value),
                Filter::In { values, .. } => format!(
                    "in.({})",
                    values
                        .iter()
                        .map(|v| match v {
                            Value::String(s) => format!("\"{}\"", s.replace('"', "\\\"")),
                            other => render_scalar(other),
                        })
                        .collect::<Vec<_>>()
                        .join(",")
                ),
            };
            (filter.column().to_string(), value)
        })
        .collect()
}

/// Escape LIKE metacharacters. PostgREST reads `*` as `%`, so a literal `*`
/// becomes the single-character wildcard, which still matches it.
fn escape_ilike(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for ch in pattern.chars() {
        match ch {
            '%' | '_' | '\\' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '*' => escaped.push('_'),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Total from `Content-Range: 0-9/42` or `*/42`.
fn parse_content_range(header: &str) -> Option<i64> {
    header.rsplit_once('/')?.1.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::Table;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Vec<&'a str> {
        params
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn select_params_encode_every_filter_kind() {
        let query = TableQuery::new(Table::Rooms)
            .select(&["room_id", "private_room_rent"])
            .eq("status", "AVAILABLE")
            .eq("furnished", true)
            .gte("private_room_rent", 1200.0)
            .lte("private_room_rent", 2000.5)
            .in_list("building_id", vec![json!("BLD_SOMA"), json!("BLD_MISSION")])
            .order_asc("private_room_rent")
            .limit(50);
        let params = select_params(&query);

        assert_eq!(param(&params, "select"), ["room_id,private_room_rent"]);
        assert_eq!(param(&params, "status"), ["eq.AVAILABLE"]);
        assert_eq!(param(&params, "furnished"), ["eq.true"]);
        assert_eq!(param(&params, "private_room_rent"), ["gte.1200", "lte.2000.5"]);
        assert_eq!(param(&params, "building_id"), ["in.(\"BLD_SOMA\",\"BLD_MISSION\")"]);
        assert_eq!(param(&params, "order"), ["private_room_rent.asc"]);
        assert_eq!(param(&params, "limit"), ["50"]);
    }

    #[test]
    fn ilike_and_null_equality() {
        let params = filter_params(
            TableQuery::new(Table::Buildings)
                .ilike("city", "san fran")
                .eq("zip", Value::Null)
                .filters(),
        );
        assert_eq!(param(&params, "city"), ["ilike.*san fran*"]);
        assert_eq!(param(&params, "zip"), ["is.null"]);
    }

    #[test]
    fn not_equal_filters() {
        let params = filter_params(
            TableQuery::new(Table::Rooms)
                .neq("status", "AVAILABLE")
                .neq("building_id", Value::Null)
                .filters(),
        );
        assert_eq!(param(&params, "status"), ["neq.AVAILABLE"]);
        assert_eq!(param(&params, "building_id"), ["not.is.null"]);
    }

    #[test]
    fn ilike_escapes_wildcards_in_user_text() {
        let params = filter_params(
            TableQuery::new(Table::Buildings)
                .ilike("building_name", r"50%_off*\")
                .filters(),
        );
        assert_eq!(param(&params, "building_name"), [r"ilike.*50\%\_off_\\*"]);
    }

    #[test]
    fn parses_content_range_totals() {
        assert_eq!(parse_content_range("0-9/42"), Some(42));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("*/*"), None);
    }

    #[test]
    fn table_url_trims_trailing_slash() {
        let store = PostgrestStore::new(PostgrestConfig::new(
            "https://example.supabase.co/",
            SecretString::from("anon".to_string()),
        ))
        .unwrap();
        assert_eq!(
            store.table_url(&TableQuery::new(Table::Tenants)),
            "https://example.supabase.co/rest/v1/tenants"
        );
    }
}
