use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// One end of a cargo route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    #[serde(alias = "state", default)]
    pub region: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

impl Location {
    pub fn new(city: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            region: region.into(),
            lat: None,
            lng: None,
        }
    }

    pub fn with_point(mut self, point: GeoPoint) -> Self {
        self.lat = Some(point.lat);
        self.lng = Some(point.lng);
        self
    }

    /// Coordinates, if both halves are known
    pub fn point(&self) -> Option<GeoPoint> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(GeoPoint { lat, lng }),
            _ => None,
        }
    }

    /// Name-level equality: city names compared case-insensitively, regions
    /// only when both sides carry one.
    pub fn same_place(&self, other: &Location) -> bool {
        if !self.city.trim().eq_ignore_ascii_case(other.city.trim()) {
            return false;
        }

        let (r1, r2) = (self.region.trim(), other.region.trim());
        r1.is_empty() || r2.is_empty() || r1.eq_ignore_ascii_case(r2)
    }

    /// "City, Region" label used for provider queries and log lines
    pub fn label(&self) -> String {
        if self.region.trim().is_empty() {
            self.city.trim().to_string()
        } else {
            format!("{}, {}", self.city.trim(), self.region.trim())
        }
    }
}

/// Lifecycle status of a posted route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RouteStatus {
    #[default]
    Active,
    Matched,
    Completed,
    Cancelled,
}

/// A point-to-point transport request posted by one party
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CargoRoute {
    pub id: String,
    #[serde(alias = "userId")]
    pub owner_id: String,
    pub origin: Location,
    pub destination: Location,
    #[serde(alias = "cargoType")]
    pub cargo_type: String,
    /// Mass in tonnes
    pub weight: f64,
    #[serde(alias = "specialRequirements", default)]
    pub special_requirements: Option<String>,
    #[serde(alias = "pickupDate")]
    pub pickup_date: NaiveDate,
    #[serde(alias = "deliveryDate")]
    pub delivery_date: NaiveDate,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub status: RouteStatus,
}

impl CargoRoute {
    pub fn is_active(&self) -> bool {
        self.status == RouteStatus::Active
    }

    /// Budget as a usable ratio operand; zero counts as "not specified"
    pub fn effective_budget(&self) -> Option<f64> {
        self.budget.filter(|b| *b > 0.0)
    }

    /// Special requirements with blank strings treated as absent
    pub fn has_special_requirements(&self) -> bool {
        self.special_requirements
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }
}

/// A known city from the catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    #[serde(alias = "state")]
    pub region: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "isMajor", alias = "is_major", default)]
    pub is_major: bool,
}

impl City {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    pub fn location(&self) -> Location {
        Location::new(self.name.clone(), self.region.clone()).with_point(self.point())
    }
}

/// Which midpoint search produced an exchange candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    OriginMidpoint,
    DestinationMidpoint,
}

/// A city proposed as the place where two shipments swap carriers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeCandidate {
    pub city: String,
    pub region: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "type")]
    pub source: CandidateSource,
    pub score: f64,
}

impl ExchangeCandidate {
    pub fn location(&self) -> Location {
        Location::new(self.city.clone(), self.region.clone())
            .with_point(GeoPoint::new(self.lat, self.lng))
    }
}

/// Distance and duration between two places as reported by a provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelEstimate {
    pub distance_km: f64,
    pub duration_min: f64,
}

/// Modeled cost of driving one leg
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteCost {
    pub distance: f64,
    pub duration: f64,
    pub fuel_cost: f64,
    #[serde(alias = "toll_charges")]
    pub toll_cost: f64,
    pub labor_cost: f64,
    pub total_cost: f64,
}

/// Original-versus-exchange cost comparison for a pair of routes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostSavings {
    pub original_cost: f64,
    pub new_cost: f64,
    pub savings: f64,
    pub savings_percentage: f64,
}

/// Per-factor compatibility sub-scores, each on a 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub route: f64,
    pub cargo: f64,
    pub timeline: f64,
    pub budget: f64,
}

/// A proposed exchange between a target route and one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: String,
    pub route_id: String,
    pub matched_route_id: String,
    pub compatibility_score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub exchange_point: ExchangeCandidate,
    pub exchange_points: Vec<ExchangeCandidate>,
    pub cost_savings: CostSavings,
    pub cargo_route: CargoRoute,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Weights applied to the four compatibility sub-scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub route: f64,
    pub cargo: f64,
    pub timeline: f64,
    pub budget: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            route: 0.4,
            cargo: 0.3,
            timeline: 0.2,
            budget: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_place_ignores_case_and_missing_region() {
        let a = Location::new("Mumbai", "Maharashtra");
        let b = Location::new("mumbai ", "");
        let c = Location::new("Mumbai", "Gujarat");

        assert!(a.same_place(&b));
        assert!(!a.same_place(&c));
    }

    #[test]
    fn test_route_deserializes_original_field_names() {
        let json = r#"{
            "id": "r1",
            "userId": "u1",
            "origin": {"city": "Pune", "state": "Maharashtra"},
            "destination": {"city": "Nagpur", "state": "Maharashtra", "lat": 21.1458, "lng": 79.0882},
            "cargoType": "textiles",
            "weight": 4.5,
            "pickupDate": "2024-03-01",
            "deliveryDate": "2024-03-03"
        }"#;

        let route: CargoRoute = serde_json::from_str(json).unwrap();
        assert_eq!(route.owner_id, "u1");
        assert_eq!(route.origin.region, "Maharashtra");
        assert!(route.origin.point().is_none());
        assert!(route.destination.point().is_some());
        assert!(route.is_active());
        assert_eq!(route.budget, None);
    }

    #[test]
    fn test_zero_budget_is_unspecified() {
        let json = r#"{
            "id": "r1", "owner_id": "u1",
            "origin": {"city": "A"}, "destination": {"city": "B"},
            "cargo_type": "food", "weight": 1.0,
            "pickup_date": "2024-03-01", "delivery_date": "2024-03-01",
            "budget": 0.0
        }"#;

        let route: CargoRoute = serde_json::from_str(json).unwrap();
        assert_eq!(route.effective_budget(), None);
    }
}
