use crate::core::{
    cost::RouteCostModel,
    exchange::ExchangePointFinder,
    filters::{is_exchange_candidate, validate_route, RouteValidationError},
    scoring::{CompatibilityScorer, ROUTE_BASELINE_SCORE},
};
use crate::models::{CargoRoute, Location, MatchResult};
use crate::services::geo::GeoProvider;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by a matching pass
///
/// Only contract violations in the input routes surface here; everything
/// pair-scoped (unresolved places, provider failures, no exchange point)
/// just drops that pair.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Invalid route {route_id}: {source}")]
    InvalidRoute {
        route_id: String,
        #[source]
        source: RouteValidationError,
    },
}

/// Tunables for [`MatchRanker`]
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    /// Pairs must score strictly above this to be considered
    pub score_threshold: f64,
    pub max_results: usize,
    /// Pairwise pipelines evaluated at once
    pub concurrency: usize,
    /// Drop pairs whose routes share no endpoint and are not nearby
    pub require_route_overlap: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            score_threshold: 50.0,
            max_results: 10,
            concurrency: 8,
            require_route_overlap: false,
        }
    }
}

/// Result of the matching process
#[derive(Debug, Clone)]
pub struct RankedMatches {
    pub matches: Vec<MatchResult>,
    pub total_candidates: usize,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Input validation
/// 2. Eligibility (not self, not same owner, active)
/// 3. Compatibility scoring and threshold
/// 4. Exchange point search
/// 5. Original vs via-exchange cost comparison
/// 6. Ranking and truncation
///
/// Stages 3-5 run per candidate as independent tasks; results are only
/// merged at the final sort.
pub struct MatchRanker {
    scorer: CompatibilityScorer,
    finder: ExchangePointFinder,
    cost_model: RouteCostModel,
    geo: Arc<dyn GeoProvider>,
    config: MatchingConfig,
}

impl MatchRanker {
    pub fn new(
        scorer: CompatibilityScorer,
        finder: ExchangePointFinder,
        cost_model: RouteCostModel,
        geo: Arc<dyn GeoProvider>,
        config: MatchingConfig,
    ) -> Self {
        Self {
            scorer,
            finder,
            cost_model,
            geo,
            config,
        }
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    pub fn scorer(&self) -> &CompatibilityScorer {
        &self.scorer
    }

    pub fn finder(&self) -> &ExchangePointFinder {
        &self.finder
    }

    pub fn cost_model(&self) -> &RouteCostModel {
        &self.cost_model
    }

    pub fn geo(&self) -> &Arc<dyn GeoProvider> {
        &self.geo
    }

    /// Rank exchange partners for `target` among `candidates`
    ///
    /// # Arguments
    /// * `target` - The route looking for a partner
    /// * `candidates` - Snapshot of posted routes, normally the active ones
    /// * `limit` - Maximum number of matches; falls back to the configured maximum
    ///
    /// # Returns
    /// Matches sorted by compatibility score (descending), ties broken by
    /// match id. Fails only when a route violates its invariants.
    pub async fn find_matches(
        &self,
        target: &CargoRoute,
        candidates: &[CargoRoute],
        limit: Option<usize>,
    ) -> Result<RankedMatches, MatchError> {
        check(target)?;
        for candidate in candidates {
            check(candidate)?;
        }

        let total_candidates = candidates.len();
        let limit = limit.unwrap_or(self.config.max_results);
        let target = self.resolve(target).await;

        let eligible: Vec<&CargoRoute> = candidates
            .iter()
            .filter(|c| is_exchange_candidate(&target, c))
            .collect();

        let mut matches: Vec<MatchResult> = stream::iter(eligible)
            .map(|candidate| self.evaluate(&target, candidate))
            .buffer_unordered(self.config.concurrency.max(1))
            .filter_map(|m| async move { m })
            .collect()
            .await;

        matches.sort_by(|a, b| {
            b.compatibility_score
                .partial_cmp(&a.compatibility_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.match_id.cmp(&b.match_id))
        });
        matches.truncate(limit);

        tracing::info!(
            "Matched route {}: {} results from {} candidates",
            target.id,
            matches.len(),
            total_candidates
        );

        Ok(RankedMatches {
            matches,
            total_candidates,
        })
    }

    /// Full pairwise pipeline; `None` means the pair is skipped
    async fn evaluate(&self, target: &CargoRoute, candidate: &CargoRoute) -> Option<MatchResult> {
        let candidate = self.resolve(candidate).await;

        let (score, breakdown) = self.scorer.score_breakdown(target, &candidate);
        if score <= self.config.score_threshold {
            tracing::debug!("Pair {} / {} below threshold: {:.1}", target.id, candidate.id, score);
            return None;
        }

        if self.config.require_route_overlap && breakdown.route <= ROUTE_BASELINE_SCORE {
            tracing::debug!("Pair {} / {} has no route overlap", target.id, candidate.id);
            return None;
        }

        let exchange_points = self.finder.find_exchange_points(target, &candidate);
        let Some(best) = exchange_points.first() else {
            tracing::debug!("No exchange point for {} / {}", target.id, candidate.id);
            return None;
        };
        let exchange = best.location();

        let geo = self.geo.as_ref();
        let costs = futures::try_join!(
            self.cost_model.route_cost(geo, &target.origin, &target.destination),
            self.cost_model.route_cost(geo, &candidate.origin, &candidate.destination),
            self.cost_model.route_cost(geo, &target.origin, &exchange),
            self.cost_model.route_cost(geo, &candidate.origin, &exchange),
        );

        let (target_original, candidate_original, target_via, candidate_via) = match costs {
            Ok(costs) => costs,
            Err(e) => {
                tracing::debug!("Cost unresolved for {} / {}: {}", target.id, candidate.id, e);
                return None;
            }
        };

        let cost_savings =
            RouteCostModel::savings(&target_original, &candidate_original, &target_via, &candidate_via);

        Some(MatchResult {
            match_id: format!("{}_{}", target.id, candidate.id),
            route_id: target.id.clone(),
            matched_route_id: candidate.id.clone(),
            compatibility_score: score,
            score_breakdown: breakdown,
            exchange_point: best.clone(),
            exchange_points,
            cost_savings,
            cargo_route: candidate,
        })
    }

    /// Copy of `route` with endpoint coordinates filled in where the provider knows them
    async fn resolve(&self, route: &CargoRoute) -> CargoRoute {
        let mut route = route.clone();
        route.origin = self.locate(route.origin).await;
        route.destination = self.locate(route.destination).await;
        route
    }

    async fn locate(&self, location: Location) -> Location {
        if location.point().is_some() {
            return location;
        }

        match self.geo.locate(&location).await {
            Ok(point) => location.with_point(point),
            Err(e) => {
                tracing::debug!("Leaving {} unresolved: {}", location.label(), e);
                location
            }
        }
    }
}

fn check(route: &CargoRoute) -> Result<(), MatchError> {
    validate_route(route).map_err(|source| MatchError::InvalidRoute {
        route_id: route.id.clone(),
        source,
    })
}
