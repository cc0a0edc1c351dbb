use crate::core::distance::great_circle_km;
use crate::models::{GeoPoint, Location, TravelEstimate};
use crate::services::cache::{CacheKey, CacheManager};
use crate::services::city_index::CityIndex;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;

/// Errors that can occur when resolving places or travel times
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Location could not be resolved: {0}")]
    Unresolved(String),

    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    #[error("Provider rate limit exceeded")]
    RateLimited,

    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Geocoding and distance lookups
///
/// Implementations may be remote, rate-limited or flaky; callers treat every
/// error as "unresolved" for the pair at hand.
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Resolve a place name to coordinates
    async fn geocode(&self, city: &str, region: &str) -> Result<GeoPoint, GeoError>;

    /// Road distance and duration between two places
    async fn distance(
        &self,
        origin: &Location,
        destination: &Location,
    ) -> Result<TravelEstimate, GeoError>;

    /// Coordinates for a location, geocoding only when they are missing
    async fn locate(&self, location: &Location) -> Result<GeoPoint, GeoError> {
        match location.point() {
            Some(point) => Ok(point),
            None => self.geocode(&location.city, &location.region).await,
        }
    }
}

/// Offline provider backed by the city catalogue
///
/// Road distance is approximated as great-circle distance times a detour
/// factor; duration assumes a constant average speed.
pub struct CatalogueGeoProvider {
    index: Arc<dyn CityIndex>,
    road_factor: f64,
    average_speed_kmh: f64,
}

impl CatalogueGeoProvider {
    pub fn new(index: Arc<dyn CityIndex>, road_factor: f64, average_speed_kmh: f64) -> Self {
        Self {
            index,
            road_factor: if road_factor > 0.0 { road_factor } else { 1.3 },
            average_speed_kmh: if average_speed_kmh > 0.0 { average_speed_kmh } else { 50.0 },
        }
    }

    pub fn with_defaults(index: Arc<dyn CityIndex>) -> Self {
        Self::new(index, 1.3, 50.0)
    }
}

#[async_trait]
impl GeoProvider for CatalogueGeoProvider {
    async fn geocode(&self, city: &str, region: &str) -> Result<GeoPoint, GeoError> {
        self.index
            .find(city, region)
            .map(|c| c.point())
            .ok_or_else(|| GeoError::Unresolved(Location::new(city, region).label()))
    }

    async fn distance(
        &self,
        origin: &Location,
        destination: &Location,
    ) -> Result<TravelEstimate, GeoError> {
        let from = self.locate(origin).await?;
        let to = self.locate(destination).await?;

        let distance_km = great_circle_km(from, to) * self.road_factor;
        Ok(TravelEstimate {
            distance_km,
            duration_min: distance_km / self.average_speed_kmh * 60.0,
        })
    }
}

/// Remote provider speaking the Nominatim search and OSRM route APIs
pub struct HttpGeoProvider {
    client: Client,
    geocode_url: String,
    routing_url: String,
    country: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64, // metres
    duration: f64, // seconds
}

impl HttpGeoProvider {
    pub fn new(
        geocode_url: &str,
        routing_url: &str,
        user_agent: &str,
        country: &str,
        timeout: Duration,
    ) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            geocode_url: geocode_url.trim_end_matches('/').to_string(),
            routing_url: routing_url.trim_end_matches('/').to_string(),
            country: country.trim().to_string(),
        })
    }

    async fn search(&self, query: &str) -> Result<Option<GeoPoint>, GeoError> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.geocode_url,
            urlencoding::encode(query)
        );

        tracing::debug!("Geocoding via: {}", url);

        let response = self.client.get(&url).send().await?;
        check_status(response.status(), "geocoding")?;

        let places: Vec<NominatimPlace> = response.json().await?;
        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let lat = place.lat.parse::<f64>().map_err(|e| GeoError::InvalidResponse(format!("lat: {}", e)))?;
        let lng = place.lon.parse::<f64>().map_err(|e| GeoError::InvalidResponse(format!("lon: {}", e)))?;

        Ok(Some(GeoPoint::new(lat, lng)))
    }

    fn qualify(&self, parts: &[&str]) -> String {
        parts
            .iter()
            .map(|p| p.trim())
            .chain(std::iter::once(self.country.as_str()))
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn check_status(status: StatusCode, what: &str) -> Result<(), GeoError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(GeoError::RateLimited);
    }
    if !status.is_success() {
        return Err(GeoError::Unavailable(format!("{} returned {}", what, status)));
    }
    Ok(())
}

#[async_trait]
impl GeoProvider for HttpGeoProvider {
    async fn geocode(&self, city: &str, region: &str) -> Result<GeoPoint, GeoError> {
        // Region-qualified first, then the bare city name
        if !region.trim().is_empty() {
            if let Some(point) = self.search(&self.qualify(&[city, region])).await? {
                return Ok(point);
            }
        }

        self.search(&self.qualify(&[city]))
            .await?
            .ok_or_else(|| GeoError::Unresolved(Location::new(city, region).label()))
    }

    async fn distance(
        &self,
        origin: &Location,
        destination: &Location,
    ) -> Result<TravelEstimate, GeoError> {
        let from = self.locate(origin).await?;
        let to = self.locate(destination).await?;

        // OSRM takes lng,lat
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}?overview=false",
            self.routing_url, from.lng, from.lat, to.lng, to.lat,
        );

        let response = self.client.get(&url).send().await?;
        check_status(response.status(), "routing")?;

        let body: OsrmResponse = response.json().await?;
        if body.code != "Ok" {
            return Err(GeoError::Unresolved(format!(
                "no route {} -> {} ({})",
                origin.label(),
                destination.label(),
                body.code
            )));
        }

        let route = body
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| GeoError::InvalidResponse("Missing routes array".into()))?;

        Ok(TravelEstimate {
            distance_km: route.distance / 1000.0,
            duration_min: route.duration / 60.0,
        })
    }
}

/// Caches lookups of an inner provider and bounds its concurrent calls
///
/// Geocodes are keyed by (city, region); travel estimates by the unordered
/// origin/destination pair.
pub struct CachedGeoProvider<P> {
    inner: P,
    cache: Arc<CacheManager>,
    permits: Arc<Semaphore>,
}

impl<P: GeoProvider> CachedGeoProvider<P> {
    pub fn new(inner: P, cache: Arc<CacheManager>, max_concurrent_requests: usize) -> Self {
        Self {
            inner,
            cache,
            permits: Arc::new(Semaphore::new(max_concurrent_requests.max(1))),
        }
    }

    async fn throttled<T, F>(&self, call: F) -> Result<T, GeoError>
    where
        T: Send,
        F: std::future::Future<Output = Result<T, GeoError>> + Send,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| GeoError::Unavailable("provider closed".into()))?;
        call.await
    }
}

#[async_trait]
impl<P: GeoProvider> GeoProvider for CachedGeoProvider<P> {
    async fn geocode(&self, city: &str, region: &str) -> Result<GeoPoint, GeoError> {
        let key = CacheKey::geocode(city, region);
        if let Ok(point) = self.cache.get::<GeoPoint>(&key).await {
            return Ok(point);
        }

        let point = self.throttled(self.inner.geocode(city, region)).await?;

        if let Err(e) = self.cache.set(&key, &point).await {
            tracing::warn!("Failed to cache geocode for {}: {}", key, e);
        }
        Ok(point)
    }

    async fn distance(
        &self,
        origin: &Location,
        destination: &Location,
    ) -> Result<TravelEstimate, GeoError> {
        let key = CacheKey::travel(origin, destination);
        if let Ok(estimate) = self.cache.get::<TravelEstimate>(&key).await {
            return Ok(estimate);
        }

        // Resolve through our own cache before handing off
        let origin = origin.clone().with_point(self.locate(origin).await?);
        let destination = destination.clone().with_point(self.locate(destination).await?);

        let estimate = self
            .throttled(self.inner.distance(&origin, &destination))
            .await?;

        if let Err(e) = self.cache.set(&key, &estimate).await {
            tracing::warn!("Failed to cache travel estimate for {}: {}", key, e);
        }
        Ok(estimate)
    }
}

/// Tries a primary provider and falls back to a secondary one on any error
pub struct FallbackGeoProvider {
    primary: Arc<dyn GeoProvider>,
    secondary: Arc<dyn GeoProvider>,
}

impl FallbackGeoProvider {
    pub fn new(primary: Arc<dyn GeoProvider>, secondary: Arc<dyn GeoProvider>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait]
impl GeoProvider for FallbackGeoProvider {
    async fn geocode(&self, city: &str, region: &str) -> Result<GeoPoint, GeoError> {
        match self.primary.geocode(city, region).await {
            Ok(point) => Ok(point),
            Err(e) => {
                tracing::debug!("Primary geocode failed for {}, falling back: {}", city, e);
                self.secondary.geocode(city, region).await
            }
        }
    }

    async fn distance(
        &self,
        origin: &Location,
        destination: &Location,
    ) -> Result<TravelEstimate, GeoError> {
        match self.primary.distance(origin, destination).await {
            Ok(estimate) => Ok(estimate),
            Err(e) => {
                tracing::debug!(
                    "Primary distance failed for {} -> {}, falling back: {}",
                    origin.label(),
                    destination.label(),
                    e
                );
                self.secondary.distance(origin, destination).await
            }
        }
    }
}
