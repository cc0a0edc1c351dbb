// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BoundingBox, CandidateSource, CargoRoute, City, CostSavings, ExchangeCandidate, GeoPoint,
    Location, MatchResult, RouteCost, RouteStatus, ScoreBreakdown, ScoringWeights,
    TravelEstimate,
};
pub use requests::{ExchangePointsRequest, FindMatchesRequest, PreviewMatchesRequest, RouteCostRequest, RouteEndpoints};
pub use responses::{ErrorResponse, ExchangePointsResponse, FindMatchesResponse, HealthResponse};
