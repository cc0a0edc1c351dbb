use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{CargoRoute, Location};

/// Request to find exchange partners for a stored route
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "route_id", alias = "cargo_id", rename = "routeId")]
    pub route_id: String,
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Request to find exchange partners for a route that is not stored
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PreviewMatchesRequest {
    pub route: CargoRoute,
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Request to search exchange points between two routes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangePointsRequest {
    #[serde(alias = "route_a", alias = "route1", rename = "routeA")]
    pub route_a: RouteEndpoints,
    #[serde(alias = "route_b", alias = "route2", rename = "routeB")]
    pub route_b: RouteEndpoints,
}

/// Bare origin/destination pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEndpoints {
    pub origin: Location,
    pub destination: Location,
}

/// Request to cost a single leg
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteCostRequest {
    pub origin: Location,
    pub destination: Location,
    #[serde(alias = "fuel_type", rename = "fuelType", default)]
    pub fuel_type: Option<String>,
    #[serde(alias = "vehicle_type", rename = "vehicleType", default)]
    pub vehicle_type: Option<String>,
}
