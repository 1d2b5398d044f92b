use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DATABASE_URL: &str = "sqlite://homewiz_local.db?mode=rwc";
const DEFAULT_LOG_FILTER: &str = "info,server=debug,services=debug,db=debug";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: SecretString,
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: String,
    /// Remote store; when absent the local SQLite database is used.
    pub supabase: Option<SupabaseSettings>,
    pub anthropic_api_key: Option<SecretString>,
    pub anthropic_model: Option<String>,
    pub seed_demo_data: bool,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = parse(&var, "HOST", DEFAULT_HOST)?;
        let port = parse(&var, "PORT", &DEFAULT_PORT.to_string())?;

        let supabase = match (var("SUPABASE_URL"), var("SUPABASE_ANON_KEY")) {
            (Some(url), Some(key)) => Some(SupabaseSettings {
                url,
                anon_key: SecretString::from(key),
            }),
            _ => None,
        };

        let seed_demo_data = match var("SEED_DEMO_DATA") {
            None => true,
            Some(v) => match v.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "SEED_DEMO_DATA",
                        value: v,
                    });
                }
            },
        };

        Ok(Self {
            host,
            port,
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            supabase,
            anthropic_api_key: var("ANTHROPIC_API_KEY").map(SecretString::from),
            anthropic_model: var("ANTHROPIC_MODEL"),
            seed_demo_data,
            log_filter: var("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: &str,
) -> Result<T, ConfigError> {
    let value = var(name).unwrap_or_else(|| default.to_string());
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}
