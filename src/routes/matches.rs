use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::{MatchError, MatchRanker};
use crate::models::{
    ErrorResponse, ExchangePointsRequest, ExchangePointsResponse, FindMatchesRequest,
    FindMatchesResponse, HealthResponse, Location, PreviewMatchesRequest, RouteCostRequest,
};
use crate::services::RouteRepository;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn RouteRepository>,
    pub ranker: Arc<MatchRanker>,
    /// Upper bound on a requested result limit
    pub max_limit: usize,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches))
        .route("/matches/preview", web::post().to(preview_matches))
        .route("/exchange-points", web::post().to(exchange_points))
        .route("/routes/cost", web::post().to(route_cost));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        routes: state.repository.len(),
    })
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "routeId": "string",
///   "limit": 10
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {:?}", errors);
        return bad_request("Validation failed", errors.to_string());
    }

    let Some(route) = state.repository.get(&req.route_id) else {
        return HttpResponse::NotFound().json(ErrorResponse {
            error: "Route not found".to_string(),
            message: format!("No route with id {}", req.route_id),
            status_code: 404,
        });
    };

    tracing::info!("Finding matches for route: {}", route.id);

    let candidates = state.repository.active_routes();
    rank(&state, route, &candidates, req.limit).await
}

/// Preview matches for a route that has not been posted
///
/// POST /api/v1/matches/preview
async fn preview_matches(
    state: web::Data<AppState>,
    req: web::Json<PreviewMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return bad_request("Validation failed", errors.to_string());
    }

    let PreviewMatchesRequest { route, limit } = req.into_inner();
    let candidates = state.repository.active_routes();
    rank(&state, route, &candidates, limit).await
}

async fn rank(
    state: &AppState,
    route: crate::models::CargoRoute,
    candidates: &[crate::models::CargoRoute],
    limit: Option<u16>,
) -> HttpResponse {
    let limit = limit.map(|l| (l as usize).min(state.max_limit));

    match state.ranker.find_matches(&route, candidates, limit).await {
        Ok(result) => HttpResponse::Ok().json(FindMatchesResponse {
            route,
            matches: result.matches,
            total_candidates: result.total_candidates,
        }),
        Err(e @ MatchError::InvalidRoute { .. }) => {
            tracing::info!("Rejected matching pass for {}: {}", route.id, e);
            bad_request("Invalid route", e.to_string())
        }
    }
}

/// Exchange point search between two routes
///
/// POST /api/v1/exchange-points
///
/// Request body:
/// ```json
/// {
///   "routeA": {"origin": {"city": "Mumbai", "state": "Maharashtra"}, "destination": {...}},
///   "routeB": {"origin": {...}, "destination": {...}}
/// }
/// ```
async fn exchange_points(
    state: web::Data<AppState>,
    req: web::Json<ExchangePointsRequest>,
) -> impl Responder {
    let ExchangePointsRequest { route_a, route_b } = req.into_inner();

    let a_origin = locate(&state, route_a.origin).await;
    let a_destination = locate(&state, route_a.destination).await;
    let b_origin = locate(&state, route_b.origin).await;
    let b_destination = locate(&state, route_b.destination).await;

    let finder = state.ranker.finder();
    let candidates = finder.find_between(&a_origin, &a_destination, &b_origin, &b_destination);
    let suggestion = finder.suggest_from(&candidates, &a_origin, &a_destination);

    HttpResponse::Ok().json(ExchangePointsResponse {
        candidates,
        suggestion,
    })
}

/// Cost of a single leg
///
/// POST /api/v1/routes/cost
async fn route_cost(
    state: web::Data<AppState>,
    req: web::Json<RouteCostRequest>,
) -> impl Responder {
    let model = state.ranker.cost_model();
    let rates = model.rates();
    let fuel_type = req.fuel_type.as_deref().unwrap_or(&rates.fuel_type);
    let vehicle_type = req.vehicle_type.as_deref().unwrap_or(&rates.vehicle_type);

    match state.ranker.geo().distance(&req.origin, &req.destination).await {
        Ok(travel) => HttpResponse::Ok().json(model.estimate_with(travel, fuel_type, vehicle_type)),
        Err(e) => {
            tracing::debug!(
                "Cost unresolved for {} -> {}: {}",
                req.origin.label(),
                req.destination.label(),
                e
            );
            HttpResponse::UnprocessableEntity().json(ErrorResponse {
                error: "Route unresolved".to_string(),
                message: e.to_string(),
                status_code: 422,
            })
        }
    }
}

/// Fill in coordinates the provider can resolve; leave the rest untouched
async fn locate(state: &AppState, location: Location) -> Location {
    if location.point().is_some() {
        return location;
    }
    match state.ranker.geo().locate(&location).await {
        Ok(point) => location.with_point(point),
        Err(e) => {
            tracing::debug!("Leaving {} unresolved: {}", location.label(), e);
            location
        }
    }
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
            routes: 0,
        };

        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_bad_request_status() {
        let response = bad_request("Validation failed", "limit out of range".to_string());
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
