use crate::core::{distance::great_circle_km, filters::{cargo_types_compatible, default_cargo_groups}};
use crate::models::{CargoRoute, Location, ScoreBreakdown, ScoringWeights};

/// Route sub-score when neither endpoint lines up; never zero so every pair stays rankable
pub const ROUTE_BASELINE_SCORE: f64 = 30.0;

/// Budget sub-score when either side did not state a budget
pub const NEUTRAL_BUDGET_SCORE: f64 = 50.0;

/// Tunables for [`CompatibilityScorer`]
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
    pub nearby_radius_km: f64,
    pub cargo_groups: Vec<Vec<String>>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            nearby_radius_km: 50.0,
            cargo_groups: default_cargo_groups(),
        }
    }
}

/// Pairwise compatibility between two cargo routes
///
/// Scoring formula:
/// score = (
///     route_score * 0.4 +       # Opposite directions = higher
///     cargo_score * 0.3 +       # Same cargo type, similar weight
///     timeline_score * 0.2 +    # Close pickup and delivery dates
///     budget_score * 0.1        # Similar budgets
/// )
///
/// Every sub-score is on a 0-100 scale and the result is clamped to [0, 100].
/// Scoring never fails: missing coordinates or budgets degrade to the
/// baseline or neutral value of the affected factor.
#[derive(Debug, Clone, Default)]
pub struct CompatibilityScorer {
    config: ScoringConfig,
}

impl CompatibilityScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Compatibility score (0-100) for a pair of routes
    pub fn score(&self, a: &CargoRoute, b: &CargoRoute) -> f64 {
        self.score_breakdown(a, b).0
    }

    /// Compatibility score together with the individual sub-scores
    pub fn score_breakdown(&self, a: &CargoRoute, b: &CargoRoute) -> (f64, ScoreBreakdown) {
        let breakdown = ScoreBreakdown {
            route: self.route_score(a, b),
            cargo: self.cargo_score(a, b),
            timeline: timeline_score(a, b),
            budget: budget_score(a, b),
        };

        let weights = &self.config.weights;
        let total = breakdown.route * weights.route
            + breakdown.cargo * weights.cargo
            + breakdown.timeline * weights.timeline
            + breakdown.budget * weights.budget;

        (total.clamp(0.0, 100.0), breakdown)
    }

    /// Route sub-score (0-100)
    ///
    /// 100 for a perfect swap (A→B against B→A), 70 when either the origins or
    /// the destinations coincide, 60 when both cross endpoints are within the
    /// nearby radius, otherwise the baseline.
    pub fn route_score(&self, a: &CargoRoute, b: &CargoRoute) -> f64 {
        if a.origin.same_place(&b.destination) && a.destination.same_place(&b.origin) {
            return 100.0;
        }

        // One shared endpoint counts as a partial match
        if a.origin.same_place(&b.origin) || a.destination.same_place(&b.destination) {
            return 70.0;
        }

        if self.is_nearby(&a.origin, &b.destination) && self.is_nearby(&a.destination, &b.origin) {
            return 60.0;
        }

        ROUTE_BASELINE_SCORE
    }

    /// Cargo sub-score (0-100): type, weight ratio, special requirements
    pub fn cargo_score(&self, a: &CargoRoute, b: &CargoRoute) -> f64 {
        let type_score: f64 = if a.cargo_type.trim().eq_ignore_ascii_case(b.cargo_type.trim()) {
            40.0
        } else if cargo_types_compatible(&a.cargo_type, &b.cargo_type, &self.config.cargo_groups) {
            30.0
        } else {
            10.0
        };

        let weight_ratio = ratio(a.weight, b.weight);
        let weight_score: f64 = if weight_ratio > 0.8 {
            30.0
        } else if weight_ratio > 0.6 {
            20.0
        } else {
            10.0
        };

        let requirements_score: f64 = if a.special_requirements == b.special_requirements {
            30.0
        } else if !a.has_special_requirements() && !b.has_special_requirements() {
            20.0
        } else {
            10.0
        };

        (type_score + weight_score + requirements_score).min(100.0)
    }

    fn is_nearby(&self, p: &Location, q: &Location) -> bool {
        match (p.point(), q.point()) {
            (Some(p), Some(q)) => great_circle_km(p, q) <= self.config.nearby_radius_km,
            _ => false,
        }
    }
}

/// Timeline sub-score (0-100) from pickup and delivery date gaps
pub fn timeline_score(a: &CargoRoute, b: &CargoRoute) -> f64 {
    let pickup_gap = (a.pickup_date - b.pickup_date).num_days().abs();
    let delivery_gap = (a.delivery_date - b.delivery_date).num_days().abs();

    (day_gap_score(pickup_gap) + day_gap_score(delivery_gap)).min(100.0)
}

/// Budget sub-score (0-100); neutral when either budget is missing
pub fn budget_score(a: &CargoRoute, b: &CargoRoute) -> f64 {
    match (a.effective_budget(), b.effective_budget()) {
        (Some(x), Some(y)) => {
            let r = ratio(x, y);
            if r > 0.8 {
                100.0
            } else if r > 0.6 {
                70.0
            } else if r > 0.4 {
                40.0
            } else {
                20.0
            }
        }
        _ => NEUTRAL_BUDGET_SCORE,
    }
}

#[inline]
fn day_gap_score(days: i64) -> f64 {
    match days {
        0..=1 => 50.0,
        2..=3 => 30.0,
        4..=7 => 20.0,
        _ => 10.0,
    }
}

/// Smaller over larger; callers guarantee both are positive
#[inline]
fn ratio(x: f64, y: f64) -> f64 {
    let (lo, hi) = if x <= y { (x, y) } else { (y, x) };
    if hi > 0.0 { lo / hi } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPoint, RouteStatus};
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn create_test_route(origin: &str, destination: &str) -> CargoRoute {
        CargoRoute {
            id: format!("{}-{}", origin, destination),
            owner_id: "owner".to_string(),
            origin: Location::new(origin, ""),
            destination: Location::new(destination, ""),
            cargo_type: "electronics".to_string(),
            weight: 10.0,
            special_requirements: None,
            pickup_date: day(10),
            delivery_date: day(15),
            budget: Some(15000.0),
            status: RouteStatus::Active,
        }
    }

    #[test]
    fn test_perfect_swap_route_score() {
        let scorer = CompatibilityScorer::default();
        let a = create_test_route("Mumbai", "Delhi");
        let b = create_test_route("Delhi", "Mumbai");

        assert_eq!(scorer.route_score(&a, &b), 100.0);
    }

    #[test]
    fn test_partial_overlap_route_score() {
        let scorer = CompatibilityScorer::default();
        let a = create_test_route("Mumbai", "Delhi");

        assert_eq!(scorer.route_score(&a, &create_test_route("Mumbai", "Jaipur")), 70.0);
        assert_eq!(scorer.route_score(&a, &create_test_route("Pune", "Delhi")), 70.0);
        assert_eq!(scorer.route_score(&a, &create_test_route("Pune", "Jaipur")), ROUTE_BASELINE_SCORE);
    }

    #[test]
    fn test_nearby_route_score_needs_coordinates() {
        let scorer = CompatibilityScorer::default();

        let mut a = create_test_route("Mumbai", "Delhi");
        a.origin = a.origin.with_point(GeoPoint::new(19.0760, 72.8777));
        a.destination = a.destination.with_point(GeoPoint::new(28.7041, 77.1025));

        // Gurgaon and Thane are each well inside 50km of the other route's endpoints
        let mut b = create_test_route("Gurgaon", "Thane");
        assert_eq!(scorer.route_score(&a, &b), ROUTE_BASELINE_SCORE);

        b.origin = b.origin.with_point(GeoPoint::new(28.4595, 77.0266));
        b.destination = b.destination.with_point(GeoPoint::new(19.2183, 72.9781));
        assert_eq!(scorer.route_score(&a, &b), 60.0);
    }

    #[test]
    fn test_cargo_score_components() {
        let scorer = CompatibilityScorer::default();
        let a = create_test_route("Mumbai", "Delhi");

        let mut same = create_test_route("Delhi", "Mumbai");
        same.weight = 9.5;
        assert_eq!(scorer.cargo_score(&a, &same), 100.0);

        let mut grouped = create_test_route("Delhi", "Mumbai");
        grouped.cargo_type = "Gadgets".to_string();
        grouped.weight = 7.0;
        assert_eq!(scorer.cargo_score(&a, &grouped), 30.0 + 20.0 + 30.0);

        let mut unrelated = create_test_route("Delhi", "Mumbai");
        unrelated.cargo_type = "furniture".to_string();
        unrelated.weight = 2.0;
        unrelated.special_requirements = Some("refrigerated".to_string());
        assert_eq!(scorer.cargo_score(&a, &unrelated), 10.0 + 10.0 + 10.0);
    }

    #[test]
    fn test_special_requirements_both_blank() {
        let scorer = CompatibilityScorer::default();
        let a = create_test_route("Mumbai", "Delhi");
        let mut b = create_test_route("Delhi", "Mumbai");
        b.special_requirements = Some(String::new());

        // None vs "" are not equal but are both blank
        assert_eq!(scorer.cargo_score(&a, &b), 40.0 + 30.0 + 20.0);
    }

    #[test]
    fn test_cargo_type_match_ignores_case() {
        let scorer = CompatibilityScorer::default();
        let mut a = create_test_route("Mumbai", "Delhi");
        a.cargo_type = "Furniture".to_string();
        let mut b = create_test_route("Delhi", "Mumbai");
        b.cargo_type = " furniture ".to_string();

        assert_eq!(scorer.cargo_score(&a, &b), 100.0);
        assert_eq!(scorer.cargo_score(&b, &a), 100.0);
    }

    #[test]
    fn test_timeline_score_thresholds() {
        let a = create_test_route("Mumbai", "Delhi");
        let mut b = create_test_route("Delhi", "Mumbai");

        b.delivery_date = day(16);
        assert_eq!(timeline_score(&a, &b), 100.0);

        b.pickup_date = day(13);
        b.delivery_date = day(20);
        assert_eq!(timeline_score(&a, &b), 30.0 + 20.0);

        b.pickup_date = day(25);
        b.delivery_date = day(30);
        assert_eq!(timeline_score(&a, &b), 20.0);
    }

    #[test]
    fn test_budget_score() {
        let a = create_test_route("Mumbai", "Delhi");
        let mut b = create_test_route("Delhi", "Mumbai");

        b.budget = Some(14000.0);
        assert_eq!(budget_score(&a, &b), 100.0);

        b.budget = Some(10000.0);
        assert_eq!(budget_score(&a, &b), 70.0);

        b.budget = Some(7000.0);
        assert_eq!(budget_score(&a, &b), 40.0);

        b.budget = Some(1000.0);
        assert_eq!(budget_score(&a, &b), 20.0);

        b.budget = None;
        assert_eq!(budget_score(&a, &b), NEUTRAL_BUDGET_SCORE);
    }

    #[test]
    fn test_score_is_symmetric_and_bounded() {
        let scorer = CompatibilityScorer::default();
        let a = create_test_route("Mumbai", "Delhi");
        let mut b = create_test_route("Mumbai", "Jaipur");
        b.cargo_type = "appliances".to_string();
        b.weight = 3.0;
        b.budget = None;
        b.pickup_date = day(1);

        let ab = scorer.score(&a, &b);
        let ba = scorer.score(&b, &a);

        assert_eq!(ab, ba);
        assert!((0.0..=100.0).contains(&ab));
    }

    #[test]
    fn test_weights_are_applied() {
        let scorer = CompatibilityScorer::default();
        let a = create_test_route("Mumbai", "Delhi");
        let mut b = create_test_route("Delhi", "Mumbai");
        b.weight = 9.5;
        b.budget = Some(14000.0);
        b.delivery_date = day(16);

        let (score, breakdown) = scorer.score_breakdown(&a, &b);
        assert_eq!(breakdown.route, 100.0);
        assert_eq!(breakdown.cargo, 100.0);
        assert_eq!(breakdown.timeline, 100.0);
        assert_eq!(breakdown.budget, 100.0);
        assert!((score - 100.0).abs() < 1e-9);
    }
}
