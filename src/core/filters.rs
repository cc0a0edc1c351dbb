use crate::models::CargoRoute;
use thiserror::Error;

/// Contract violations in a route snapshot
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteValidationError {
    #[error("route id is empty")]
    EmptyId,

    #[error("weight must be positive, got {0}")]
    NonPositiveWeight(f64),

    #[error("budget must not be negative, got {0}")]
    NegativeBudget(f64),

    #[error("pickup date {pickup} is after delivery date {delivery}")]
    PickupAfterDelivery {
        pickup: chrono::NaiveDate,
        delivery: chrono::NaiveDate,
    },
}

/// Check the invariants every route snapshot must satisfy before scoring
pub fn validate_route(route: &CargoRoute) -> Result<(), RouteValidationError> {
    if route.id.trim().is_empty() {
        return Err(RouteValidationError::EmptyId);
    }

    // NaN fails this comparison too
    if !(route.weight > 0.0) {
        return Err(RouteValidationError::NonPositiveWeight(route.weight));
    }

    if let Some(budget) = route.budget {
        if budget < 0.0 || budget.is_nan() {
            return Err(RouteValidationError::NegativeBudget(budget));
        }
    }

    if route.pickup_date > route.delivery_date {
        return Err(RouteValidationError::PickupAfterDelivery {
            pickup: route.pickup_date,
            delivery: route.delivery_date,
        });
    }

    Ok(())
}

/// Whether `candidate` may be paired with `target` at all
///
/// Excludes the route itself, routes posted by the same owner, and anything
/// that is no longer active.
#[inline]
pub fn is_exchange_candidate(target: &CargoRoute, candidate: &CargoRoute) -> bool {
    candidate.id != target.id
        && candidate.owner_id != target.owner_id
        && candidate.is_active()
}

/// Check if two cargo types share a compatibility group (case-insensitive)
pub fn cargo_types_compatible(type1: &str, type2: &str, groups: &[Vec<String>]) -> bool {
    let t1 = type1.trim();
    let t2 = type2.trim();

    groups.iter().any(|group| {
        group.iter().any(|t| t.eq_ignore_ascii_case(t1))
            && group.iter().any(|t| t.eq_ignore_ascii_case(t2))
    })
}

/// Default cargo compatibility groups
pub fn default_cargo_groups() -> Vec<Vec<String>> {
    [
        &["electronics", "gadgets", "appliances"][..],
        &["textiles", "clothing", "fabrics"],
        &["machinery", "equipment", "industrial"],
        &["food", "agriculture", "perishables"],
        &["chemicals", "pharmaceuticals", "industrial"],
    ]
    .iter()
    .map(|group| group.iter().map(|t| t.to_string()).collect())
    .collect()
}
