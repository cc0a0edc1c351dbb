use crate::core::{
    cost::{table, CostRates},
    exchange::{default_exchange_fallbacks, default_major_cities, ExchangeConfig, ExchangeFallback},
    filters::default_cargo_groups,
    matcher::MatchingConfig,
    scoring::ScoringConfig,
};
use crate::models::ScoringWeights;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub catalogue: CatalogueSettings,
    pub geo: GeoSettings,
    pub cache: CacheSettings,
    pub matching: MatchingSettings,
    pub scoring: ScoringSettings,
    pub costs: CostSettings,
    pub exchange_fallbacks: Vec<ExchangeFallback>,
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            catalogue: CatalogueSettings::default(),
            geo: GeoSettings::default(),
            cache: CacheSettings::default(),
            matching: MatchingSettings::default(),
            scoring: ScoringSettings::default(),
            costs: CostSettings::default(),
            exchange_fallbacks: default_exchange_fallbacks(),
            logging: LoggingSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: None,
        }
    }
}

/// Where route snapshots and the city catalogue are loaded from
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogueSettings {
    pub routes_path: Option<String>,
    /// Built-in catalogue when absent
    pub cities_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoProviderKind {
    #[default]
    Catalogue,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeoSettings {
    pub provider: GeoProviderKind,
    pub geocode_url: String,
    pub routing_url: String,
    pub user_agent: String,
    pub country: String,
    pub timeout_secs: u64,
    pub max_concurrent_requests: usize,
    pub road_factor: f64,
    pub average_speed_kmh: f64,
}

impl Default for GeoSettings {
    fn default() -> Self {
        Self {
            provider: GeoProviderKind::Catalogue,
            geocode_url: "https://nominatim.openstreetmap.org".to_string(),
            routing_url: "https://router.project-osrm.org".to_string(),
            user_agent: concat!("cargo-exchange/", env!("CARGO_PKG_VERSION")).to_string(),
            country: "India".to_string(),
            timeout_secs: 10,
            max_concurrent_requests: 4,
            road_factor: 1.3,
            average_speed_kmh: 50.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// L2 cache; L1 only when absent or unreachable
    pub redis_url: Option<String>,
    pub ttl_secs: u64,
    pub l1_cache_size: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            redis_url: None,
            ttl_secs: 86_400,
            l1_cache_size: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingSettings {
    pub score_threshold: f64,
    pub max_results: usize,
    pub max_limit: usize,
    pub nearby_radius_km: f64,
    pub exchange_radius_km: f64,
    pub max_exchange_points: usize,
    pub concurrency: usize,
    pub require_route_overlap: bool,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            score_threshold: 50.0,
            max_results: 10,
            max_limit: 100,
            nearby_radius_km: 50.0,
            exchange_radius_km: 50.0,
            max_exchange_points: 5,
            concurrency: 8,
            require_route_overlap: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub weights: WeightsConfig,
    pub cargo_groups: Vec<Vec<String>>,
    pub major_cities: Vec<String>,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            weights: WeightsConfig::default(),
            cargo_groups: default_cargo_groups(),
            major_cities: default_major_cities(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightsConfig {
    #[serde(default = "default_route_weight")]
    pub route: f64,
    #[serde(default = "default_cargo_weight")]
    pub cargo: f64,
    #[serde(default = "default_timeline_weight")]
    pub timeline: f64,
    #[serde(default = "default_budget_weight")]
    pub budget: f64,
}

impl Default for WeightsConfig {
    fn default() -> Self {
        Self {
            route: default_route_weight(),
            cargo: default_cargo_weight(),
            timeline: default_timeline_weight(),
            budget: default_budget_weight(),
        }
    }
}

fn default_route_weight() -> f64 { 0.4 }
fn default_cargo_weight() -> f64 { 0.3 }
fn default_timeline_weight() -> f64 { 0.2 }
fn default_budget_weight() -> f64 { 0.1 }

/// Rate tables for the cost model
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CostSettings {
    /// km per litre by fuel type
    pub fuel_efficiency: HashMap<String, f64>,
    /// price per litre by fuel type
    pub fuel_prices: HashMap<String, f64>,
    /// per km by vehicle type
    pub toll_rates: HashMap<String, f64>,
    pub labor_rate_per_hour: f64,
    pub fuel_type: String,
    pub vehicle_type: String,
}

impl Default for CostSettings {
    fn default() -> Self {
        Self {
            fuel_efficiency: table(&[("diesel", 8.0), ("petrol", 12.0)]),
            fuel_prices: table(&[("diesel", 89.0), ("petrol", 96.0)]),
            toll_rates: table(&[("car", 0.5), ("truck", 1.0), ("bus", 0.8)]),
            labor_rate_per_hour: 200.0,
            fuel_type: "diesel".to_string(),
            vehicle_type: "truck".to_string(),
        }
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
    /// 4. Environment variables (prefixed with CARGOX__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., CARGOX__MATCHING__MAX_RESULTS -> matching.max_results
            .add_source(environment())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    pub fn scoring_config(&self) -> ScoringConfig {
        let w = &self.scoring.weights;
        ScoringConfig {
            weights: ScoringWeights {
                route: w.route,
                cargo: w.cargo,
                timeline: w.timeline,
                budget: w.budget,
            },
            nearby_radius_km: self.matching.nearby_radius_km,
            cargo_groups: self.scoring.cargo_groups.clone(),
        }
    }

    pub fn exchange_config(&self) -> ExchangeConfig {
        ExchangeConfig {
            search_radius_km: self.matching.exchange_radius_km,
            max_candidates: self.matching.max_exchange_points,
            major_cities: self.scoring.major_cities.clone(),
            fallbacks: self.exchange_fallbacks.clone(),
        }
    }

    pub fn matching_config(&self) -> MatchingConfig {
        MatchingConfig {
            score_threshold: self.matching.score_threshold,
            max_results: self.matching.max_results,
            concurrency: self.matching.concurrency,
            require_route_overlap: self.matching.require_route_overlap,
        }
    }

    pub fn cost_rates(&self) -> CostRates {
        let c = &self.costs;
        CostRates {
            fuel_efficiency: c.fuel_efficiency.clone(),
            fuel_prices: c.fuel_prices.clone(),
            toll_rates: c.toll_rates.clone(),
            labor_rate_per_hour: c.labor_rate_per_hour,
            fuel_type: c.fuel_type.clone(),
            vehicle_type: c.vehicle_type.clone(),
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix("CARGOX")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Honour the conventional REDIS_URL when no prefixed override is set
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    if env::var("CARGOX__CACHE__REDIS_URL").is_ok() {
        return Ok(settings);
    }

    match env::var("REDIS_URL") {
        Ok(url) if !url.trim().is_empty() => Config::builder()
            .add_source(settings)
            .set_override("cache.redis_url", url)?
            .build(),
        _ => Ok(settings),
    }
}
