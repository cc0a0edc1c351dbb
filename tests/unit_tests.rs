// Unit tests for Cargo Exchange

use cargo_exchange::core::{
    cost::{CostRates, RouteCostModel},
    distance::{calculate_bounding_box, great_circle_km, haversine_distance, is_within_bounding_box, midpoint},
    exchange::{exchange_score, ExchangePointFinder},
    filters::{cargo_types_compatible, default_cargo_groups, validate_route, RouteValidationError},
    scoring::{budget_score, timeline_score, CompatibilityScorer},
};
use cargo_exchange::models::{CargoRoute, GeoPoint, Location, RouteCost, RouteStatus, TravelEstimate};
use cargo_exchange::services::StaticCityIndex;
use chrono::NaiveDate;
use std::sync::Arc;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

fn mumbai() -> Location {
    Location::new("Mumbai", "Maharashtra").with_point(GeoPoint::new(19.0760, 72.8777))
}

fn delhi() -> Location {
    Location::new("Delhi", "Delhi").with_point(GeoPoint::new(28.7041, 77.1025))
}

fn create_route(id: &str, origin: Location, destination: Location) -> CargoRoute {
    CargoRoute {
        id: id.to_string(),
        owner_id: format!("owner-{}", id),
        origin,
        destination,
        cargo_type: "electronics".to_string(),
        weight: 10.0,
        special_requirements: None,
        pickup_date: day(10),
        delivery_date: day(15),
        budget: Some(15000.0),
        status: RouteStatus::Active,
    }
}

fn cost(total: f64) -> RouteCost {
    RouteCost {
        distance: 0.0,
        duration: 0.0,
        fuel_cost: 0.0,
        toll_cost: 0.0,
        labor_cost: total,
        total_cost: total,
    }
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(19.0760, 72.8777, 19.0760, 72.8777);
    assert!(distance < 0.01);
}

#[test]
fn test_haversine_distance_mumbai_to_pune() {
    // Roughly 120 km as the crow flies
    let distance = haversine_distance(19.0760, 72.8777, 18.5204, 73.8567);
    assert!(distance > 110.0 && distance < 130.0);
}

#[test]
fn test_bounding_box_creation() {
    let bbox = calculate_bounding_box(19.0760, 72.8777, 10.0);

    assert!(bbox.min_lat < 19.0760);
    assert!(bbox.max_lat > 19.0760);
    assert!(bbox.min_lon < 72.8777);
    assert!(bbox.max_lon > 72.8777);

    // 10km / 111km per degree, both ways
    let lat_span = bbox.max_lat - bbox.min_lat;
    assert!((lat_span - 0.18).abs() < 0.02);

    assert!(is_within_bounding_box(19.08, 72.88, &bbox));
    assert!(!is_within_bounding_box(28.7041, 77.1025, &bbox));
}

#[test]
fn test_midpoint_is_arithmetic_mean() {
    let mid = midpoint(GeoPoint::new(19.0760, 72.8777), GeoPoint::new(28.7041, 77.1025));
    assert!((mid.lat - 23.89005).abs() < 1e-9);
    assert!((mid.lng - 74.9901).abs() < 1e-9);
}

#[test]
fn test_validate_route_rejects_inverted_dates() {
    let mut route = create_route("a", mumbai(), delhi());
    assert!(validate_route(&route).is_ok());

    route.pickup_date = day(20);
    assert!(matches!(
        validate_route(&route),
        Err(RouteValidationError::PickupAfterDelivery { .. })
    ));
}

#[test]
fn test_cargo_groups() {
    let groups = default_cargo_groups();
    assert!(cargo_types_compatible("Electronics", "gadgets", &groups));
    // "industrial" sits in two groups; membership is not transitive
    assert!(cargo_types_compatible("industrial", "pharmaceuticals", &groups));
    assert!(!cargo_types_compatible("chemicals", "machinery", &groups));
    assert!(!cargo_types_compatible("electronics", "furniture", &groups));
}

#[test]
fn test_perfect_swap_scores_at_least_partial_floor() {
    let scorer = CompatibilityScorer::default();
    let a = create_route("a", mumbai(), delhi());
    let b = create_route("b", delhi(), mumbai());

    let (score, breakdown) = scorer.score_breakdown(&a, &b);
    assert_eq!(breakdown.route, 100.0);
    assert!(score >= 70.0);
}

#[test]
fn test_mismatched_cargo_type_lowers_cargo_score() {
    let scorer = CompatibilityScorer::default();
    let a = create_route("a", mumbai(), delhi());
    let mut b = create_route("b", delhi(), mumbai());
    b.cargo_type = "furniture".to_string();

    let (score, breakdown) = scorer.score_breakdown(&a, &b);

    // Type only contributes its floor of 10 of 40
    assert_eq!(breakdown.cargo, 70.0);
    assert_eq!(breakdown.route, 100.0);
    assert!((score - 91.0).abs() < 1e-9);
    assert!(score > 50.0);
}

#[test]
fn test_score_bounded_with_missing_optionals() {
    let scorer = CompatibilityScorer::default();
    let mut a = create_route("a", Location::new("Nowhere", ""), Location::new("Elsewhere", ""));
    let mut b = create_route("b", Location::new("Far", ""), Location::new("Away", ""));
    a.budget = None;
    b.budget = Some(0.0);
    b.special_requirements = Some("hazmat".to_string());

    let score = scorer.score(&a, &b);
    assert!((0.0..=100.0).contains(&score));
    assert_eq!(budget_score(&a, &b), 50.0);
}

#[test]
fn test_timeline_thresholds() {
    let a = create_route("a", mumbai(), delhi());
    let mut b = create_route("b", delhi(), mumbai());

    b.pickup_date = day(13);
    b.delivery_date = day(22);
    // 3 days -> 30, 7 days -> 20
    assert_eq!(timeline_score(&a, &b), 50.0);
}

#[test]
fn test_exchange_score_prefers_balanced_candidates() {
    let p1 = GeoPoint::new(19.0, 73.0);
    let p2 = GeoPoint::new(20.0, 73.0);

    let centered = exchange_score(GeoPoint::new(19.5, 73.0), p1, p2, false);
    let lopsided = exchange_score(GeoPoint::new(19.1, 73.0), p1, p2, false);
    assert!(centered > lopsided);

    let major = exchange_score(GeoPoint::new(19.5, 73.0), p1, p2, true);
    assert!(major > centered);
}

#[test]
fn test_finder_returns_at_most_five_sorted() {
    let finder = ExchangePointFinder::with_defaults(Arc::new(StaticCityIndex::builtin()));
    let a = create_route("a", mumbai(), delhi());
    let b = create_route("b", delhi(), mumbai());

    let candidates = finder.find_exchange_points(&a, &b);

    assert!(!candidates.is_empty());
    assert!(candidates.len() <= 5);
    for pair in candidates.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_finder_empty_when_endpoint_unresolved() {
    let finder = ExchangePointFinder::with_defaults(Arc::new(StaticCityIndex::builtin()));
    let a = create_route("a", mumbai(), delhi());
    let b = create_route("b", Location::new("Atlantis", ""), mumbai());

    assert!(finder.find_exchange_points(&a, &b).is_empty());
}

#[test]
fn test_cost_formula() {
    let model = RouteCostModel::new(CostRates::default());
    let c = model.estimate(TravelEstimate { distance_km: 160.0, duration_min: 180.0 });

    assert!((c.fuel_cost - 1780.0).abs() < 1e-9); // 160 / 8 * 89
    assert!((c.toll_cost - 160.0).abs() < 1e-9);
    assert!((c.labor_cost - 600.0).abs() < 1e-9);
    assert!((c.total_cost - 2540.0).abs() < 1e-9);
}

#[test]
fn test_savings_formula_exact() {
    let s = RouteCostModel::savings(&cost(3000.0), &cost(2800.0), &cost(1500.0), &cost(1450.0));

    assert_eq!(s.savings, s.original_cost - s.new_cost);
    assert_eq!(s.savings, 2850.0);
    assert!((s.savings_percentage - 2850.0 / 5800.0 * 100.0).abs() < 1e-9);

    let zero = RouteCostModel::savings(&cost(0.0), &cost(0.0), &cost(0.0), &cost(0.0));
    assert_eq!(zero.savings_percentage, 0.0);
}

#[test]
fn test_great_circle_matches_haversine() {
    let a = GeoPoint::new(19.0760, 72.8777);
    let b = GeoPoint::new(28.7041, 77.1025);
    assert_eq!(great_circle_km(a, b), haversine_distance(a.lat, a.lng, b.lat, b.lng));
}
