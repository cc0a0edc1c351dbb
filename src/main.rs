use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use cargo_exchange::config::{GeoProviderKind, Settings};
use cargo_exchange::core::{CompatibilityScorer, ExchangePointFinder, MatchRanker, RouteCostModel};
use cargo_exchange::routes::{self, matches::AppState};
use cargo_exchange::services::{
    CacheManager, CachedGeoProvider, CatalogueGeoProvider, CityIndex, FallbackGeoProvider,
    GeoProvider, HttpGeoProvider, InMemoryRouteRepository, RouteRepository, StaticCityIndex,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_tracing(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Configuration first so logging can honour it
    let settings = Settings::load().map_err(|e| io_error("Configuration error", e))?;

    init_tracing(&settings.logging.level, &settings.logging.format);

    info!("Starting Cargo Exchange matching service...");

    // City catalogue
    let index: Arc<dyn CityIndex> = match &settings.catalogue.cities_path {
        Some(path) => Arc::new(
            StaticCityIndex::from_json_file(path).map_err(|e| io_error("City catalogue", e))?,
        ),
        None => Arc::new(StaticCityIndex::builtin()),
    };

    info!("City index initialized ({} cities)", index.len());

    // Route snapshots
    let repository: Arc<dyn RouteRepository> = match &settings.catalogue.routes_path {
        Some(path) => Arc::new(
            InMemoryRouteRepository::from_json_file(path).map_err(|e| io_error("Route catalogue", e))?,
        ),
        None => {
            warn!("No routes_path configured, starting with an empty route store");
            Arc::new(InMemoryRouteRepository::default())
        }
    };

    // Cache manager (Redis is optional - L1 alone is enough to run)
    let cache_ttl = settings.cache.ttl_secs;
    let l1_cache_size = settings.cache.l1_cache_size;

    let cache = match &settings.cache.redis_url {
        Some(url) => match CacheManager::new(url, l1_cache_size, cache_ttl).await {
            Ok(c) => c,
            Err(e) => {
                error!("Failed to connect to Redis ({}), running with in-process cache only", e);
                CacheManager::in_memory(l1_cache_size, cache_ttl)
            }
        },
        None => CacheManager::in_memory(l1_cache_size, cache_ttl),
    };
    let cache = Arc::new(cache);

    info!("Cache manager initialized: {:?}", cache.stats());

    // Geo provider
    let geo_settings = &settings.geo;
    let catalogue = CatalogueGeoProvider::new(
        index.clone(),
        geo_settings.road_factor,
        geo_settings.average_speed_kmh,
    );

    let geo: Arc<dyn GeoProvider> = match geo_settings.provider {
        GeoProviderKind::Catalogue => Arc::new(catalogue),
        GeoProviderKind::Http => {
            let http = HttpGeoProvider::new(
                &geo_settings.geocode_url,
                &geo_settings.routing_url,
                &geo_settings.user_agent,
                &geo_settings.country,
                Duration::from_secs(geo_settings.timeout_secs),
            )
            .map_err(|e| io_error("Geo provider", e))?;

            let cached = CachedGeoProvider::new(http, cache.clone(), geo_settings.max_concurrent_requests);
            Arc::new(FallbackGeoProvider::new(Arc::new(cached), Arc::new(catalogue)))
        }
    };

    info!("Geo provider initialized ({:?})", geo_settings.provider);

    // Matching pipeline
    let ranker = MatchRanker::new(
        CompatibilityScorer::new(settings.scoring_config()),
        ExchangePointFinder::new(index.clone(), settings.exchange_config()),
        RouteCostModel::new(settings.cost_rates()),
        geo,
        settings.matching_config(),
    );

    info!("Match ranker initialized with weights: {:?}", ranker.scorer().config().weights);

    // Build application state
    let app_state = AppState {
        repository,
        ranker: Arc::new(ranker),
        max_limit: settings.matching.max_limit,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
