//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::api_key::ApiKeyPolicy;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// API-key configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// VAT engine configuration.
    #[serde(default)]
    pub vat: VatConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest request body accepted, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    32 * 1024 * 1024
}

/// API-key configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Shared secret expected in the `X-API-Key` header.
    ///
    /// Absent or empty disables the check entirely.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl AuthConfig {
    /// Resolves the configured secret into an access policy.
    #[must_use]
    pub fn policy(&self) -> ApiKeyPolicy {
        ApiKeyPolicy::from_secret(self.api_key.as_deref())
    }
}

/// VAT engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct VatConfig {
    /// Allowed difference between `amount` and `subAmount + vat` per row.
    #[serde(default = "default_tolerance")]
    pub tolerance: Decimal,
    /// VAT rates (percent) that do not raise an `UNUSUAL_VAT_RATE` warning.
    #[serde(default = "default_known_rates")]
    pub known_rates: Vec<i64>,
    /// Earliest accepted reporting year.
    #[serde(default = "default_min_year")]
    pub min_year: i32,
    /// Latest accepted reporting year.
    #[serde(default = "default_max_year")]
    pub max_year: i32,
    /// Maximum rows accepted in a single request.
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    /// Largest magnitude accepted for an amount or energy cell.
    ///
    /// Larger values are treated as 0 and reported as `INVALID_VALUE`.
    #[serde(default = "default_max_amount")]
    pub max_amount: Decimal,
}

impl Default for VatConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            known_rates: default_known_rates(),
            min_year: default_min_year(),
            max_year: default_max_year(),
            max_rows: default_max_rows(),
            max_amount: default_max_amount(),
        }
    }
}

fn default_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn default_known_rates() -> Vec<i64> {
    vec![0, 6, 12, 25]
}

fn default_min_year() -> i32 {
    2000
}

fn default_max_year() -> i32 {
    2099
}

fn default_max_rows() -> usize {
    100_000
}

fn default_max_amount() -> Decimal {
    Decimal::new(1_000_000_000_000_000, 0)
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("VATREC")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("vat.known_rates")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
