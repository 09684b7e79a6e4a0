use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::SignalStore;
use crate::models::DeclaredProfile;
use crate::services::generation::DirectiveController;
use crate::services::providers::{CatalogProvider, TextGenerator};
use crate::services::recommendations::RecommendationService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SignalStore>,
    /// Declared profiles keyed by user; created with empty defaults on first
    /// touch and overwritten whole on preference updates
    pub profiles: Arc<RwLock<HashMap<Uuid, DeclaredProfile>>>,
    pub catalog: Arc<dyn CatalogProvider>,
    pub recommendations: Arc<RecommendationService>,
}

impl AppState {
    /// Wires the engine together from its collaborators
    ///
    /// `generator` may be `None` when no generative credential is
    /// configured; every recommendation request then takes the
    /// deterministic path.
    pub fn new(
        store: Arc<dyn SignalStore>,
        catalog: Arc<dyn CatalogProvider>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        let controller = DirectiveController::new(generator);
        let recommendations = Arc::new(RecommendationService::new(
            store.clone(),
            catalog.clone(),
            controller,
        ));

        Self {
            store,
            profiles: Arc::new(RwLock::new(HashMap::new())),
            catalog,
            recommendations,
        }
    }
}
