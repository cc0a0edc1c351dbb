use crate::models::{CostSavings, Location, RouteCost, TravelEstimate};
use crate::services::geo::{GeoError, GeoProvider};
use std::collections::HashMap;

/// Fallback fuel efficiency in km per litre (diesel truck)
pub const DEFAULT_FUEL_EFFICIENCY: f64 = 8.0;
/// Fallback fuel price per litre
pub const DEFAULT_FUEL_PRICE: f64 = 89.0;
/// Fallback toll rate per km
pub const DEFAULT_TOLL_RATE: f64 = 1.0;
/// Fallback driver cost per hour
pub const DEFAULT_LABOR_RATE: f64 = 200.0;

/// Rate tables for the cost model, keyed by lowercase fuel / vehicle type
#[derive(Debug, Clone, PartialEq)]
pub struct CostRates {
    pub fuel_efficiency: HashMap<String, f64>,
    pub fuel_prices: HashMap<String, f64>,
    pub toll_rates: HashMap<String, f64>,
    pub labor_rate_per_hour: f64,
    pub fuel_type: String,
    pub vehicle_type: String,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            fuel_efficiency: table(&[("diesel", 8.0), ("petrol", 12.0)]),
            fuel_prices: table(&[("diesel", 89.0), ("petrol", 96.0)]),
            toll_rates: table(&[("car", 0.5), ("truck", 1.0), ("bus", 0.8)]),
            labor_rate_per_hour: DEFAULT_LABOR_RATE,
            fuel_type: "diesel".to_string(),
            vehicle_type: "truck".to_string(),
        }
    }
}

impl CostRates {
    /// Lowercase every table key so lookups are case-insensitive
    pub fn normalized(mut self) -> Self {
        for t in [&mut self.fuel_efficiency, &mut self.fuel_prices, &mut self.toll_rates] {
            *t = t.drain().map(|(k, v)| (k.trim().to_ascii_lowercase(), v)).collect();
        }
        self.fuel_type = self.fuel_type.trim().to_ascii_lowercase();
        self.vehicle_type = self.vehicle_type.trim().to_ascii_lowercase();
        self
    }
}

pub fn table(entries: &[(&str, f64)]) -> HashMap<String, f64> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Converts travel distance and time into fuel, toll and labor cost
#[derive(Debug, Clone, Default)]
pub struct RouteCostModel {
    rates: CostRates,
}

impl RouteCostModel {
    pub fn new(rates: CostRates) -> Self {
        let rates = rates.normalized();

        if !rates.fuel_efficiency.contains_key(&rates.fuel_type)
            || !rates.fuel_prices.contains_key(&rates.fuel_type)
        {
            tracing::warn!(
                "No fuel rates configured for '{}', using {} km/L at {}/L",
                rates.fuel_type,
                DEFAULT_FUEL_EFFICIENCY,
                DEFAULT_FUEL_PRICE
            );
        }
        if !rates.toll_rates.contains_key(&rates.vehicle_type) {
            tracing::warn!(
                "No toll rate configured for '{}', using {}/km",
                rates.vehicle_type,
                DEFAULT_TOLL_RATE
            );
        }

        Self { rates }
    }

    pub fn rates(&self) -> &CostRates {
        &self.rates
    }

    /// Cost of a leg with the configured fuel and vehicle type
    pub fn estimate(&self, travel: TravelEstimate) -> RouteCost {
        self.estimate_with(travel, &self.rates.fuel_type, &self.rates.vehicle_type)
    }

    /// Cost of a leg with an explicit fuel and vehicle type
    ///
    /// fuel  = D / efficiency × price
    /// toll  = D × toll rate
    /// labor = T / 60 × hourly rate
    pub fn estimate_with(&self, travel: TravelEstimate, fuel_type: &str, vehicle_type: &str) -> RouteCost {
        let distance = travel.distance_km.max(0.0);
        let duration = travel.duration_min.max(0.0);

        let fuel_key = fuel_type.trim().to_ascii_lowercase();
        let efficiency = self
            .rates
            .fuel_efficiency
            .get(&fuel_key)
            .copied()
            .filter(|e| *e > 0.0)
            .unwrap_or(DEFAULT_FUEL_EFFICIENCY);
        let price = lookup(&self.rates.fuel_prices, &fuel_key, DEFAULT_FUEL_PRICE);
        let toll_rate = lookup(
            &self.rates.toll_rates,
            &vehicle_type.trim().to_ascii_lowercase(),
            DEFAULT_TOLL_RATE,
        );

        let fuel_cost = distance / efficiency * price;
        let toll_cost = distance * toll_rate;
        let labor_cost = duration / 60.0 * self.rates.labor_rate_per_hour;

        RouteCost {
            distance,
            duration,
            fuel_cost,
            toll_cost,
            labor_cost,
            total_cost: fuel_cost + toll_cost + labor_cost,
        }
    }

    /// Cost of driving `origin` → `destination`, or why it could not be resolved
    pub async fn route_cost(
        &self,
        geo: &dyn GeoProvider,
        origin: &Location,
        destination: &Location,
    ) -> Result<RouteCost, GeoError> {
        let travel = geo.distance(origin, destination).await?;
        Ok(self.estimate(travel))
    }

    /// Compare two direct legs against the same two shipments diverted through an exchange point
    ///
    /// Negative savings are reported as-is; the exchange is then not worthwhile.
    pub fn savings(
        route1_original: &RouteCost,
        route2_original: &RouteCost,
        route1_via_exchange: &RouteCost,
        route2_via_exchange: &RouteCost,
    ) -> CostSavings {
        let original_cost = route1_original.total_cost + route2_original.total_cost;
        let new_cost = route1_via_exchange.total_cost + route2_via_exchange.total_cost;
        let savings = original_cost - new_cost;

        let savings_percentage = if original_cost != 0.0 {
            savings / original_cost * 100.0
        } else {
            0.0
        };

        CostSavings {
            original_cost,
            new_cost,
            savings,
            savings_percentage,
        }
    }
}

fn lookup(table: &HashMap<String, f64>, key: &str, default: f64) -> f64 {
    match table.get(key) {
        Some(v) => *v,
        None => {
            tracing::debug!("No rate for '{}', using default {}", key, default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::geo::CatalogueGeoProvider;
    use crate::services::city_index::StaticCityIndex;
    use std::sync::Arc;

    fn travel(distance_km: f64, duration_min: f64) -> TravelEstimate {
        TravelEstimate { distance_km, duration_min }
    }

    fn cost(total: f64) -> RouteCost {
        RouteCost {
            distance: 0.0,
            duration: 0.0,
            fuel_cost: total,
            toll_cost: 0.0,
            labor_cost: 0.0,
            total_cost: total,
        }
    }

    #[test]
    fn test_default_diesel_truck_cost() {
        let model = RouteCostModel::default();
        let c = model.estimate(travel(400.0, 480.0));

        assert!((c.fuel_cost - 400.0 / 8.0 * 89.0).abs() < 1e-9);
        assert!((c.toll_cost - 400.0).abs() < 1e-9);
        assert!((c.labor_cost - 8.0 * 200.0).abs() < 1e-9);
        assert!((c.total_cost - (c.fuel_cost + c.toll_cost + c.labor_cost)).abs() < 1e-9);
    }

    #[test]
    fn test_petrol_car_override() {
        let model = RouteCostModel::default();
        let c = model.estimate_with(travel(120.0, 0.0), "Petrol", "CAR");

        assert!((c.fuel_cost - 120.0 / 12.0 * 96.0).abs() < 1e-9);
        assert!((c.toll_cost - 60.0).abs() < 1e-9);
        assert_eq!(c.labor_cost, 0.0);
    }

    #[test]
    fn test_missing_rates_fall_back_to_defaults() {
        let model = RouteCostModel::new(CostRates {
            fuel_efficiency: table(&[("diesel", 0.0)]),
            fuel_prices: HashMap::new(),
            toll_rates: HashMap::new(),
            labor_rate_per_hour: 100.0,
            fuel_type: "Diesel".to_string(),
            vehicle_type: "tractor".to_string(),
        });

        let c = model.estimate(travel(80.0, 60.0));
        assert!((c.fuel_cost - 80.0 / DEFAULT_FUEL_EFFICIENCY * DEFAULT_FUEL_PRICE).abs() < 1e-9);
        assert!((c.toll_cost - 80.0 * DEFAULT_TOLL_RATE).abs() < 1e-9);
        assert!((c.labor_cost - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_config_keys_are_case_insensitive() {
        let model = RouteCostModel::new(CostRates {
            fuel_efficiency: table(&[("CNG", 10.0)]),
            fuel_prices: table(&[("Cng", 80.0)]),
            toll_rates: table(&[("Truck", 2.0)]),
            fuel_type: "cng".to_string(),
            ..CostRates::default()
        });

        let c = model.estimate(travel(100.0, 0.0));
        assert!((c.fuel_cost - 800.0).abs() < 1e-9);
        assert!((c.toll_cost - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_savings() {
        let s = RouteCostModel::savings(&cost(1000.0), &cost(1200.0), &cost(500.0), &cost(600.0));

        assert_eq!(s.original_cost, 2200.0);
        assert_eq!(s.new_cost, 1100.0);
        assert_eq!(s.savings, s.original_cost - s.new_cost);
        assert!((s.savings_percentage - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_savings_are_kept() {
        let s = RouteCostModel::savings(&cost(100.0), &cost(100.0), &cost(150.0), &cost(120.0));
        assert_eq!(s.savings, -70.0);
        assert!(s.savings_percentage < 0.0);
    }

    #[test]
    fn test_zero_original_cost() {
        let s = RouteCostModel::savings(&cost(0.0), &cost(0.0), &cost(10.0), &cost(0.0));
        assert_eq!(s.savings, -10.0);
        assert_eq!(s.savings_percentage, 0.0);
    }

    #[test]
    fn test_route_cost_through_provider() {
        let geo = CatalogueGeoProvider::with_defaults(Arc::new(StaticCityIndex::builtin()));
        let model = RouteCostModel::default();

        let resolved = tokio_test::block_on(model.route_cost(
            &geo,
            &Location::new("Mumbai", "Maharashtra"),
            &Location::new("Pune", "Maharashtra"),
        ))
        .unwrap();
        assert!(resolved.distance > 100.0);
        assert!(resolved.total_cost > 0.0);

        let unresolved = tokio_test::block_on(model.route_cost(
            &geo,
            &Location::new("Mumbai", ""),
            &Location::new("Atlantis", ""),
        ));
        assert!(unresolved.is_err());
    }
}
