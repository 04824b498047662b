//! Environment configuration
//!
//! Values come from the process environment, after `.env` has been loaded.

use crate::dispatcher::RoutingMode;
use crate::error::RouterError;
use crate::responses::openai::DEFAULT_BASE_URL;
use crate::strategy::{StrategySettings, DEFAULT_ASSISTANT_NAME, DEFAULT_MODEL};
use crate::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_RETURNS_PATH: &str = "Returns/Returns.csv";
pub const DEFAULT_METADATA_PATH: &str = "metadata/focus_funds_metadata.csv";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub model: String,
    pub assistant_name: String,
    pub vector_store_id: Option<String>,
    pub returns_path: PathBuf,
    pub metadata_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub routing_mode: RoutingMode,
    pub cors_allowed_origins: Vec<String>,
}

impl RouterConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration from an explicit map (tests, embedding)
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| RouterError::ConfigError(format!("PORT '{}': {}", raw, e)))?,
            None => DEFAULT_PORT,
        };

        let timeout_secs = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                RouterError::ConfigError(format!("REQUEST_TIMEOUT_SECS '{}': {}", raw, e))
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let routing_mode = match get("ROUTING_MODE") {
            Some(raw) => raw.parse::<RoutingMode>()?,
            None => RoutingMode::Direct,
        };

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: get("MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            assistant_name: get("ASSISTANT_NAME")
                .unwrap_or_else(|| DEFAULT_ASSISTANT_NAME.to_string()),
            vector_store_id: get("VECTOR_STORE_ID"),
            returns_path: get("RETURNS_CSV_PATH")
                .unwrap_or_else(|| DEFAULT_RETURNS_PATH.to_string())
                .into(),
            metadata_path: get("METADATA_CSV_PATH")
                .unwrap_or_else(|| DEFAULT_METADATA_PATH.to_string())
                .into(),
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            request_timeout: Duration::from_secs(timeout_secs),
            routing_mode,
            cors_allowed_origins,
        })
    }

    /// API key, or `ConfigError` when unset
    pub fn require_api_key(&self) -> Result<&str> {
        self.openai_api_key.as_deref().ok_or_else(|| {
            RouterError::ConfigError("OPENAI_API_KEY is required in environment variables".into())
        })
    }

    pub fn strategy_settings(&self) -> StrategySettings {
        StrategySettings {
            model: self.model.clone(),
            assistant_name: self.assistant_name.clone(),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = RouterConfig::from_map(&HashMap::new()).unwrap();

        assert!(config.openai_api_key.is_none());
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.port, 8000);
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.returns_path, PathBuf::from("Returns/Returns.csv"));
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.routing_mode, RoutingMode::Direct);
        assert!(config.cors_allowed_origins.is_empty());
        assert!(config.require_api_key().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = RouterConfig::from_map(&vars(&[
            ("OPENAI_API_KEY", "sk-123"),
            ("MODEL", "gpt-4.1"),
            ("VECTOR_STORE_ID", "vs_42"),
            ("PORT", "9000"),
            ("REQUEST_TIMEOUT_SECS", "60"),
            ("ROUTING_MODE", "escalating"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:3000, https://app.example.com,"),
        ]))
        .unwrap();

        assert_eq!(config.require_api_key().unwrap(), "sk-123");
        assert_eq!(config.strategy_settings().model, "gpt-4.1");
        assert_eq!(config.vector_store_id.as_deref(), Some("vs_42"));
        assert_eq!(config.port, 9000);
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.routing_mode, RoutingMode::Escalating);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://localhost:3000", "https://app.example.com"]
        );
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = RouterConfig::from_map(&vars(&[("VECTOR_STORE_ID", "  "), ("OPENAI_API_KEY", "")]))
            .unwrap();
        assert!(config.vector_store_id.is_none());
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_invalid_numbers() {
        let err = RouterConfig::from_map(&vars(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, RouterError::ConfigError(_)));

        let err = RouterConfig::from_map(&vars(&[("ROUTING_MODE", "random")])).unwrap_err();
        assert!(matches!(err, RouterError::ConfigError(_)));
    }
}
