//! Configuration loader for the `aqiflow` pipelines and API service.
//!
//! This module centralizes all runtime configuration values and their
//! defaults, loading from environment variables (with optional `.env` file
//! support provided by the caller). By consolidating configuration logic
//! here, we avoid scattering `env::var` calls throughout the codebase.

use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required floating-point environment variable.
macro_rules! require_env_f64 {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
            .parse::<f64>()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent
/// configuration snapshot for the lifetime of the process. Connection and
/// site settings are passed explicitly into constructors — there is no
/// process-wide hidden state.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Monitored site latitude.
    pub site_lat: f64,

    /// Monitored site longitude.
    pub site_lon: f64,

    /// Open-Meteo weather forecast API base URL.
    pub weather_api_url: String,

    /// Open-Meteo air quality API base URL.
    pub air_quality_api_url: String,

    /// Hours ahead served by the forecast endpoint by default.
    pub forecast_horizon_hours: u32,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
/// - `SITE_LAT` / `SITE_LON` – coordinates of the monitored site
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `WEATHER_API_URL` / `AIR_QUALITY_API_URL` – Open-Meteo base URLs
/// - `FORECAST_HORIZON_HOURS` – default forecast length (default: 12)
///
/// Returns an error if any required variable is missing or invalid; that is
/// a fatal startup condition for every stage.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let site_lat = require_env_f64!("SITE_LAT");
    let site_lon = require_env_f64!("SITE_LON");
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 5);
    let forecast_horizon_hours = parse_env_u32!("FORECAST_HORIZON_HOURS", 12);

    let weather_api_url = env::var("WEATHER_API_URL")
        .unwrap_or_else(|_| "https://api.open-meteo.com/v1/forecast".to_string());
    let air_quality_api_url = env::var("AIR_QUALITY_API_URL")
        .unwrap_or_else(|_| "https://air-quality-api.open-meteo.com/v1/air-quality".to_string());

    Ok(Config {
        db_url,
        db_pool_max,
        site_lat,
        site_lon,
        weather_api_url,
        air_quality_api_url,
        forecast_horizon_hours,
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information like database passwords while showing
    /// all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        // Mask the password in the database URL for security
        let masked_db_url = if let Some(at_pos) = self.db_url.rfind('@') {
            if let Some(colon_pos) = self.db_url[..at_pos].rfind(':') {
                format!(
                    "{}:****{}",
                    &self.db_url[..colon_pos],
                    &self.db_url[at_pos..]
                )
            } else {
                self.db_url.clone()
            }
        } else {
            self.db_url.clone()
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL           : {}", masked_db_url);
        tracing::info!("  DB_POOL_MAX            : {}", self.db_pool_max);
        tracing::info!("  SITE_LAT               : {}", self.site_lat);
        tracing::info!("  SITE_LON               : {}", self.site_lon);
        tracing::info!("  WEATHER_API_URL        : {}", self.weather_api_url);
        tracing::info!("  AIR_QUALITY_API_URL    : {}", self.air_quality_api_url);
        tracing::info!("  FORECAST_HORIZON_HOURS : {}", self.forecast_horizon_hours);
    }
}
