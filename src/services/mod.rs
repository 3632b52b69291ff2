//! Business logic services

pub mod catalog;
pub mod circulation;
pub mod session;

use std::sync::Arc;

use crate::{config::CatalogConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub circulation: circulation::CirculationService,
    pub sessions: session::SessionService,
}

impl Services {
    /// Create all services with the given repository and session store
    pub fn new(
        repository: Repository,
        catalog_config: CatalogConfig,
        session_store: Arc<dyn session::SessionStore>,
    ) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), catalog_config.clone()),
            circulation: circulation::CirculationService::new(repository, catalog_config),
            sessions: session::SessionService::new(session_store),
        }
    }
}
