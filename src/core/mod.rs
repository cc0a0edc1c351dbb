// Core algorithm exports
pub mod cost;
pub mod distance;
pub mod exchange;
pub mod filters;
pub mod matcher;
pub mod scoring;

pub use cost::{CostRates, RouteCostModel};
pub use distance::{calculate_bounding_box, great_circle_km, haversine_distance, is_within_bounding_box, midpoint};
pub use exchange::{exchange_score, ExchangeConfig, ExchangeFallback, ExchangePointFinder, ExchangeSuggestion};
pub use filters::{cargo_types_compatible, is_exchange_candidate, validate_route, RouteValidationError};
pub use matcher::{MatchError, MatchRanker, MatchingConfig, RankedMatches};
pub use scoring::{budget_score, timeline_score, CompatibilityScorer, ScoringConfig};
