use serde::Deserialize;
use std::{error::Error, fs};
use url::Url;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CommonConfig {
    pub project_name: String,
    pub database_url: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct BackendConfig {
    pub server_address: String,
    pub log_level: String,
    #[serde(default)]
    pub allowed_origin: Option<String>,
    /// Address for the Prometheus scrape endpoint; metrics are not exported when absent.
    #[serde(default)]
    pub metrics_address: Option<String>,
}

fn default_max_identifier_attempts() -> u32 {
    3
}

fn default_invoice_sequence() -> String {
    "invoice".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutConfig {
    #[serde(default = "default_max_identifier_attempts")]
    pub max_identifier_attempts: u32,
    #[serde(default = "default_invoice_sequence")]
    pub invoice_sequence: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            max_identifier_attempts: default_max_identifier_attempts(),
            invoice_sequence: default_invoice_sequence(),
        }
    }
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub api_base_url: Url,
    pub log_level: String,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse("http://localhost:3000/api/").expect("static url"),
            log_level: "info".to_string(),
            currency_symbol: default_currency_symbol(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    pub common: CommonConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl Config {
    pub fn load(config_path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let contents = fs::read_to_string(config_path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let config = serde_yml::from_str(contents)?;
        Ok(config)
    }
}
