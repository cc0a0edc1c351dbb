// Service exports
pub mod cache;
pub mod city_index;
pub mod geo;
pub mod repository;

pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use city_index::{CityIndex, CityIndexError, StaticCityIndex};
pub use geo::{CachedGeoProvider, CatalogueGeoProvider, FallbackGeoProvider, GeoError, GeoProvider, HttpGeoProvider};
pub use repository::{InMemoryRouteRepository, RepositoryError, RouteRepository};
