use crate::core::filters::validate_route;
use crate::models::CargoRoute;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading route snapshots
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Failed to read routes: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse routes: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read-only view of posted routes
///
/// The matching core only ever reads snapshots through this interface;
/// writes belong to whatever listing store sits behind it.
pub trait RouteRepository: Send + Sync {
    fn get(&self, id: &str) -> Option<CargoRoute>;

    /// Routes still open for matching
    fn active_routes(&self) -> Vec<CargoRoute>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Immutable in-memory route store
#[derive(Debug, Clone, Default)]
pub struct InMemoryRouteRepository {
    routes: Vec<CargoRoute>,
    by_id: HashMap<String, usize>,
}

impl InMemoryRouteRepository {
    /// Build from snapshots, dropping any that violate route invariants
    pub fn new(routes: Vec<CargoRoute>) -> Self {
        let mut kept = Vec::with_capacity(routes.len());
        let mut by_id = HashMap::with_capacity(routes.len());

        for route in routes {
            if let Err(e) = validate_route(&route) {
                tracing::warn!("Skipping route {}: {}", route.id, e);
                continue;
            }
            if by_id.contains_key(&route.id) {
                tracing::warn!("Skipping duplicate route id {}", route.id);
                continue;
            }
            by_id.insert(route.id.clone(), kept.len());
            kept.push(route);
        }

        Self { routes: kept, by_id }
    }

    /// Load a JSON array of routes
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let routes: Vec<CargoRoute> = serde_json::from_str(&raw)?;
        let total = routes.len();

        let repo = Self::new(routes);
        tracing::info!(
            "Loaded {} of {} routes from {}",
            repo.len(),
            total,
            path.as_ref().display()
        );
        Ok(repo)
    }
}

impl RouteRepository for InMemoryRouteRepository {
    fn get(&self, id: &str) -> Option<CargoRoute> {
        self.by_id.get(id).map(|&i| self.routes[i].clone())
    }

    fn active_routes(&self) -> Vec<CargoRoute> {
        self.routes.iter().filter(|r| r.is_active()).cloned().collect()
    }

    fn len(&self) -> usize {
        self.routes.len()
    }
}
