use crate::core::distance::{great_circle_km, midpoint};
use crate::models::{CandidateSource, CargoRoute, City, ExchangeCandidate, GeoPoint, Location};
use crate::services::city_index::CityIndex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Multiplier applied to major metro cities
pub const MAJOR_CITY_FACTOR: f64 = 1.2;

/// A well-known exchange town for a corridor, used when the geometric search comes up empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeFallback {
    pub origin: String,
    pub destination: String,
    pub city: String,
    pub region: String,
}

impl ExchangeFallback {
    fn new(origin: &str, destination: &str, city: &str, region: &str) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            city: city.to_string(),
            region: region.to_string(),
        }
    }

    /// Matches the corridor in either direction
    fn covers(&self, origin: &str, destination: &str) -> bool {
        let (o, d) = (origin.trim(), destination.trim());
        (self.origin.eq_ignore_ascii_case(o) && self.destination.eq_ignore_ascii_case(d))
            || (self.origin.eq_ignore_ascii_case(d) && self.destination.eq_ignore_ascii_case(o))
    }
}

/// Default corridor table
pub fn default_exchange_fallbacks() -> Vec<ExchangeFallback> {
    vec![
        ExchangeFallback::new("Mumbai", "Delhi", "Udaipur", "Rajasthan"),
        ExchangeFallback::new("Pune", "Nagpur", "Aurangabad", "Maharashtra"),
        ExchangeFallback::new("Bangalore", "Chennai", "Hosur", "Tamil Nadu"),
        ExchangeFallback::new("Kolkata", "Bhubaneswar", "Cuttack", "Odisha"),
        ExchangeFallback::new("Mumbai", "Bangalore", "Belgaum", "Karnataka"),
        ExchangeFallback::new("Delhi", "Kolkata", "Dhanbad", "Jharkhand"),
        ExchangeFallback::new("Chennai", "Hyderabad", "Tirupati", "Andhra Pradesh"),
        ExchangeFallback::new("Mumbai", "Pune", "Lonavala", "Maharashtra"),
        ExchangeFallback::new("Delhi", "Jaipur", "Alwar", "Rajasthan"),
        ExchangeFallback::new("Bangalore", "Hyderabad", "Anantapur", "Andhra Pradesh"),
        ExchangeFallback::new("Mumbai", "Ahmedabad", "Surat", "Gujarat"),
        ExchangeFallback::new("Delhi", "Lucknow", "Aligarh", "Uttar Pradesh"),
    ]
}

/// Default major metro list
pub fn default_major_cities() -> Vec<String> {
    ["Mumbai", "Delhi", "Bangalore", "Chennai", "Kolkata", "Hyderabad"]
        .iter()
        .map(|c| c.to_string())
        .collect()
}

/// Tunables for [`ExchangePointFinder`]
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub search_radius_km: f64,
    pub max_candidates: usize,
    pub major_cities: Vec<String>,
    pub fallbacks: Vec<ExchangeFallback>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            search_radius_km: 50.0,
            max_candidates: 5,
            major_cities: default_major_cities(),
            fallbacks: default_exchange_fallbacks(),
        }
    }
}

/// Best available answer to "where should these two shipments swap?"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExchangeSuggestion {
    /// Top candidate from the geometric search
    Candidate(ExchangeCandidate),
    /// Known exchange town for the corridor
    Predefined { city: String, region: String },
    /// Nothing better than a description
    Generic { description: String },
}

/// Searches the city catalogue for swap points between two routes
#[derive(Clone)]
pub struct ExchangePointFinder {
    index: Arc<dyn CityIndex>,
    config: ExchangeConfig,
}

impl ExchangePointFinder {
    pub fn new(index: Arc<dyn CityIndex>, config: ExchangeConfig) -> Self {
        Self { index, config }
    }

    pub fn with_defaults(index: Arc<dyn CityIndex>) -> Self {
        Self::new(index, ExchangeConfig::default())
    }

    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Ranked exchange candidates for two routes, best first
    ///
    /// Empty when any of the four endpoints lacks coordinates.
    pub fn find_exchange_points(&self, a: &CargoRoute, b: &CargoRoute) -> Vec<ExchangeCandidate> {
        self.find_between(&a.origin, &a.destination, &b.origin, &b.destination)
    }

    /// Same as [`Self::find_exchange_points`] for bare endpoints
    pub fn find_between(
        &self,
        a_origin: &Location,
        a_destination: &Location,
        b_origin: &Location,
        b_destination: &Location,
    ) -> Vec<ExchangeCandidate> {
        let (Some(ao), Some(ad), Some(bo), Some(bd)) = (
            a_origin.point(),
            a_destination.point(),
            b_origin.point(),
            b_destination.point(),
        ) else {
            tracing::debug!(
                "Skipping exchange search for {} / {}: unresolved coordinates",
                a_origin.label(),
                b_origin.label()
            );
            return Vec::new();
        };

        let mut pooled = self.candidates_around(ao, bo, CandidateSource::OriginMidpoint);
        pooled.extend(self.candidates_around(ad, bd, CandidateSource::DestinationMidpoint));

        pooled.sort_by(|x, y| {
            y.score
                .partial_cmp(&x.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| x.city.cmp(&y.city))
        });

        // Swapped routes share one midpoint, so the same city shows up twice
        let mut seen = HashSet::new();
        pooled.retain(|c| seen.insert((c.city.to_ascii_lowercase(), c.region.to_ascii_lowercase())));
        pooled.truncate(self.config.max_candidates);

        pooled
    }

    /// Exchange candidate if one exists, else the corridor table, else a description
    pub fn suggest(
        &self,
        a_origin: &Location,
        a_destination: &Location,
        b_origin: &Location,
        b_destination: &Location,
    ) -> ExchangeSuggestion {
        let candidates = self.find_between(a_origin, a_destination, b_origin, b_destination);
        self.suggest_from(&candidates, a_origin, a_destination)
    }

    /// Suggestion for an already computed candidate list, best first
    pub fn suggest_from(
        &self,
        candidates: &[ExchangeCandidate],
        a_origin: &Location,
        a_destination: &Location,
    ) -> ExchangeSuggestion {
        if let Some(best) = candidates.first() {
            return ExchangeSuggestion::Candidate(best.clone());
        }

        if let Some(entry) = self
            .config
            .fallbacks
            .iter()
            .find(|f| f.covers(&a_origin.city, &a_destination.city))
        {
            return ExchangeSuggestion::Predefined {
                city: entry.city.clone(),
                region: entry.region.clone(),
            };
        }

        ExchangeSuggestion::Generic {
            description: format!(
                "Optimal midpoint between {} and {}",
                a_origin.city.trim(),
                a_destination.city.trim()
            ),
        }
    }

    /// Score of `city` as a stand-in for both `p1` and `p2`
    pub fn score_city(&self, city: &City, p1: GeoPoint, p2: GeoPoint) -> f64 {
        exchange_score(city.point(), p1, p2, self.is_major(city))
    }

    fn candidates_around(
        &self,
        p1: GeoPoint,
        p2: GeoPoint,
        source: CandidateSource,
    ) -> Vec<ExchangeCandidate> {
        self.index
            .cities_near(midpoint(p1, p2), self.config.search_radius_km)
            .into_iter()
            .map(|city| ExchangeCandidate {
                score: self.score_city(&city, p1, p2),
                city: city.name,
                region: city.region,
                lat: city.lat,
                lng: city.lng,
                source,
            })
            .collect()
    }

    fn is_major(&self, city: &City) -> bool {
        city.is_major
            || self
                .config
                .major_cities
                .iter()
                .any(|m| m.eq_ignore_ascii_case(&city.name))
    }
}

/// `100 × (0.4·balance + 0.4·accessibility + 0.2·population)`
///
/// balance is 1 when the candidate is equidistant from both points,
/// accessibility decays with the total detour, population is 1.2 for a
/// major metro and 1.0 otherwise.
pub fn exchange_score(candidate: GeoPoint, p1: GeoPoint, p2: GeoPoint, is_major: bool) -> f64 {
    let d1 = great_circle_km(p1, candidate);
    let d2 = great_circle_km(p2, candidate);

    let longest = d1.max(d2);
    let balance = if longest > 0.0 {
        1.0 - (d1 - d2).abs() / longest
    } else {
        1.0
    };

    let accessibility = 1.0 / (1.0 + (d1 + d2) / 100.0);
    let population = if is_major { MAJOR_CITY_FACTOR } else { 1.0 };

    100.0 * (0.4 * balance + 0.4 * accessibility + 0.2 * population)
}
