//! Cargo Exchange - route matching service for return-load cargo swaps
//!
//! Pairs independently posted cargo routes that run in (nearly) opposite
//! directions, proposes a city where the two shipments can swap carriers,
//! and estimates what the swap saves against driving both routes end to end.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{CompatibilityScorer, ExchangePointFinder, MatchRanker, RouteCostModel};
pub use models::{CargoRoute, ExchangeCandidate, Location, MatchResult, RouteCost, ScoringWeights};
