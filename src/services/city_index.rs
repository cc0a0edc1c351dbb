use crate::core::distance::{calculate_bounding_box, great_circle_km, is_within_bounding_box};
use crate::models::{City, GeoPoint};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading a city catalogue
#[derive(Debug, Error)]
pub enum CityIndexError {
    #[error("Failed to read city catalogue: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse city catalogue: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read-only catalogue of known cities
///
/// Implementations are shared across concurrent matching tasks and must not
/// mutate after construction.
pub trait CityIndex: Send + Sync {
    /// Cities within `radius_km` of `center`, nearest first
    fn cities_near(&self, center: GeoPoint, radius_km: f64) -> Vec<City>;

    /// Look a city up by name, preferring an exact region match when one is given
    fn find(&self, name: &str, region: &str) -> Option<City>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory city catalogue
#[derive(Debug, Clone)]
pub struct StaticCityIndex {
    cities: Vec<City>,
}

impl StaticCityIndex {
    pub fn new(cities: Vec<City>) -> Self {
        Self { cities }
    }

    /// Load a JSON array of cities
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CityIndexError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let cities: Vec<City> = serde_json::from_str(&raw)?;
        tracing::info!("Loaded {} cities from {}", cities.len(), path.as_ref().display());
        Ok(Self::new(cities))
    }

    /// Built-in catalogue of Indian metros and the towns along the main freight corridors
    pub fn builtin() -> Self {
        let cities = BUILTIN_CITIES
            .iter()
            .map(|&(name, region, lat, lng, is_major)| City {
                name: name.to_string(),
                region: region.to_string(),
                lat,
                lng,
                is_major,
            })
            .collect();

        Self::new(cities)
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }
}

impl Default for StaticCityIndex {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CityIndex for StaticCityIndex {
    fn cities_near(&self, center: GeoPoint, radius_km: f64) -> Vec<City> {
        let bbox = calculate_bounding_box(center.lat, center.lng, radius_km);

        let mut nearby: Vec<(f64, &City)> = self
            .cities
            .iter()
            .filter(|c| is_within_bounding_box(c.lat, c.lng, &bbox))
            .map(|c| (great_circle_km(center, c.point()), c))
            .filter(|(d, _)| *d <= radius_km)
            .collect();

        nearby.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        nearby.into_iter().map(|(_, c)| c.clone()).collect()
    }

    fn find(&self, name: &str, region: &str) -> Option<City> {
        let name = name.trim();
        let region = region.trim();

        let mut by_name = self
            .cities
            .iter()
            .filter(|c| c.name.eq_ignore_ascii_case(name));

        if region.is_empty() {
            return by_name.next().cloned();
        }

        let candidates: Vec<&City> = by_name.collect();
        candidates
            .iter()
            .find(|c| c.region.eq_ignore_ascii_case(region))
            .or_else(|| candidates.first())
            .map(|c| (*c).clone())
    }

    fn len(&self) -> usize {
        self.cities.len()
    }
}

/// (name, region, lat, lng, major metro)
const BUILTIN_CITIES: &[(&str, &str, f64, f64, bool)] = &[
    // Metros
    ("Mumbai", "Maharashtra", 19.0760, 72.8777, true),
    ("Delhi", "Delhi", 28.7041, 77.1025, true),
    ("Bangalore", "Karnataka", 12.9716, 77.5946, true),
    ("Chennai", "Tamil Nadu", 13.0827, 80.2707, true),
    ("Kolkata", "West Bengal", 22.5726, 88.3639, true),
    ("Hyderabad", "Telangana", 17.3850, 78.4867, true),
    ("Pune", "Maharashtra", 18.5204, 73.8567, false),
    ("Ahmedabad", "Gujarat", 23.0225, 72.5714, false),
    ("Jaipur", "Rajasthan", 26.9124, 75.7873, false),
    ("Lucknow", "Uttar Pradesh", 26.8467, 80.9462, false),
    ("Surat", "Gujarat", 21.1702, 72.8311, false),
    ("Nagpur", "Maharashtra", 21.1458, 79.0882, false),
    ("Indore", "Madhya Pradesh", 22.7196, 75.8577, false),
    ("Bhopal", "Madhya Pradesh", 23.2599, 77.4126, false),
    ("Kanpur", "Uttar Pradesh", 26.4499, 80.3319, false),
    ("Bhubaneswar", "Odisha", 20.2961, 85.8245, false),
    // Mumbai - Delhi corridor
    ("Thane", "Maharashtra", 19.2183, 72.9781, false),
    ("Navi Mumbai", "Maharashtra", 19.0330, 73.0297, false),
    ("Nashik", "Maharashtra", 19.9975, 73.7898, false),
    ("Dhule", "Maharashtra", 20.9042, 74.7749, false),
    ("Vadodara", "Gujarat", 22.3072, 73.1812, false),
    ("Ratlam", "Madhya Pradesh", 23.3315, 75.0367, false),
    ("Ujjain", "Madhya Pradesh", 23.1765, 75.7885, false),
    ("Banswara", "Rajasthan", 23.5461, 74.4350, false),
    ("Mandsaur", "Madhya Pradesh", 24.0734, 75.0679, false),
    ("Pratapgarh", "Rajasthan", 24.0316, 74.7787, false),
    ("Neemuch", "Madhya Pradesh", 24.4764, 74.8624, false),
    ("Chittorgarh", "Rajasthan", 24.8887, 74.6269, false),
    ("Udaipur", "Rajasthan", 24.5854, 73.7125, false),
    ("Bhilwara", "Rajasthan", 25.3407, 74.6313, false),
    ("Kota", "Rajasthan", 25.2138, 75.8648, false),
    ("Jhalawar", "Rajasthan", 24.5973, 76.1610, false),
    ("Ajmer", "Rajasthan", 26.4499, 74.6399, false),
    ("Alwar", "Rajasthan", 27.5530, 76.6346, false),
    ("Gurgaon", "Haryana", 28.4595, 77.0266, false),
    ("Faridabad", "Haryana", 28.4089, 77.3178, false),
    ("Noida", "Uttar Pradesh", 28.5355, 77.3910, false),
    // Other corridors
    ("Lonavala", "Maharashtra", 18.7546, 73.4062, false),
    ("Aurangabad", "Maharashtra", 19.8762, 75.3433, false),
    ("Belgaum", "Karnataka", 15.8497, 74.4977, false),
    ("Hubli", "Karnataka", 15.3647, 75.1240, false),
    ("Hosur", "Tamil Nadu", 12.7409, 77.8253, false),
    ("Krishnagiri", "Tamil Nadu", 12.5266, 78.2150, false),
    ("Vellore", "Tamil Nadu", 12.9165, 79.1325, false),
    ("Tirupati", "Andhra Pradesh", 13.6288, 79.4192, false),
    ("Nellore", "Andhra Pradesh", 14.4426, 79.9865, false),
    ("Anantapur", "Andhra Pradesh", 14.6819, 77.6006, false),
    ("Kurnool", "Andhra Pradesh", 15.8281, 78.0373, false),
    ("Cuttack", "Odisha", 20.4625, 85.8830, false),
    ("Dhanbad", "Jharkhand", 23.7957, 86.4304, false),
    ("Varanasi", "Uttar Pradesh", 25.3176, 82.9739, false),
    ("Agra", "Uttar Pradesh", 27.1767, 78.0081, false),
    ("Aligarh", "Uttar Pradesh", 27.8974, 78.0880, false),
    ("Gwalior", "Madhya Pradesh", 26.2183, 78.1828, false),
];
