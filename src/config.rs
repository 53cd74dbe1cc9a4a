use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};
use crate::site::MAX_SUBPAGES;

pub const DEFAULT_SCRAPE_BASE_URL: &str = "https://api.firecrawl.dev";
pub const DEFAULT_MODEL_BASE_URL: &str = "https://ai.gateway.lovable.dev";
pub const DEFAULT_MODEL: &str = "google/gemini-3-flash-preview";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub scrape_api_key: String,
    pub scrape_base_url: String,
    pub model_api_key: String,
    pub model_base_url: String,
    pub model: String,
    pub max_subpages: usize,
    pub http_timeout: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, so callers can supply
    /// settings without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Credentials first: nothing else matters without them
        let scrape_api_key = get("FIRECRAWL_API_KEY").ok_or(AppError::MissingConfig("FIRECRAWL_API_KEY"))?;
        let model_api_key = get("AI_GATEWAY_API_KEY").ok_or(AppError::MissingConfig("AI_GATEWAY_API_KEY"))?;

        let host = get("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = get("PORT").unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let max_subpages = match get("ENRICH_MAX_SUBPAGES") {
            Some(raw) => raw
                .parse::<usize>()
                .map_err(|e| AppError::ConfigError(format!("Invalid ENRICH_MAX_SUBPAGES: {}", e)))?
                .min(MAX_SUBPAGES),
            None => MAX_SUBPAGES,
        };

        let timeout_secs = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|e| AppError::ConfigError(format!("Invalid HTTP_TIMEOUT_SECS: {}", e)))?,
            None => 60,
        };

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            scrape_api_key,
            scrape_base_url: get("FIRECRAWL_BASE_URL").unwrap_or_else(|| DEFAULT_SCRAPE_BASE_URL.to_string()),
            model_api_key,
            model_base_url: get("AI_GATEWAY_BASE_URL").unwrap_or_else(|| DEFAULT_MODEL_BASE_URL.to_string()),
            model: get("ENRICH_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_subpages,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
