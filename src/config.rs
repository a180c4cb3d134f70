use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use crate::models::{ScoringRules, TimeBucket};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub ride_store: RideStoreSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RideStoreSettings {
    pub endpoint: String,
    pub api_key: String,
    pub project_id: String,
    pub database_id: String,
    #[serde(default = "default_rides_collection")]
    pub rides_collection: String,
    pub timeout_secs: Option<u64>,
}

fn default_rides_collection() -> String { "rides".to_string() }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    pub snapshot_ttl_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchingSettings {
    pub default_limit: Option<u16>,
    pub max_limit: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    #[serde(default = "default_time_buckets")]
    pub time_buckets: Vec<TimeBucketConfig>,
    #[serde(default = "default_max_distance_score")]
    pub max_distance_score: f64,
    #[serde(default = "default_route_multiplier")]
    pub route_multiplier: f64,
    #[serde(default = "default_seat_multiplier")]
    pub seat_multiplier: f64,
    #[serde(default)]
    pub min_score: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TimeBucketConfig {
    pub within_minutes: i64,
    pub points: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            time_buckets: default_time_buckets(),
            max_distance_score: default_max_distance_score(),
            route_multiplier: default_route_multiplier(),
            seat_multiplier: default_seat_multiplier(),
            min_score: 0.0,
        }
    }
}

fn default_time_buckets() -> Vec<TimeBucketConfig> {
    ScoringRules::default()
        .time_buckets
        .into_iter()
        .map(|b| TimeBucketConfig { within_minutes: b.within_minutes, points: b.points })
        .collect()
}
fn default_max_distance_score() -> f64 { 10.0 }
fn default_route_multiplier() -> f64 { 5.0 }
fn default_seat_multiplier() -> f64 { 5.0 }

impl From<&ScoringSettings> for ScoringRules {
    fn from(settings: &ScoringSettings) -> Self {
        ScoringRules {
            time_buckets: settings
                .time_buckets
                .iter()
                .map(|b| TimeBucket { within_minutes: b.within_minutes, points: b.points })
                .collect(),
            max_distance_score: settings.max_distance_score,
            route_multiplier: settings.route_multiplier,
            seat_multiplier: settings.seat_multiplier,
            min_score: settings.min_score,
        }
        .normalized()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with CARPOOL_)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CARPOOL__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?
            .try_deserialize()
    }

    /// Scoring rules from the `scoring` section, rejecting negative values
    pub fn scoring_rules(&self) -> Result<ScoringRules, ConfigError> {
        let rules = ScoringRules::from(&self.scoring);
        rules
            .validate()
            .map_err(|e| ConfigError::Message(e.to_string()))?;
        Ok(rules)
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("CARPOOL")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
