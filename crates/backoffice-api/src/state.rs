use std::sync::Arc;

use backoffice_core::{CrudController, EntityStore, SchemaRegistry};

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SchemaRegistry>,
    pub store: Arc<dyn EntityStore>,
}

impl AppState {
    pub fn new(registry: SchemaRegistry, store: Arc<dyn EntityStore>) -> Self {
        Self {
            registry: Arc::new(registry),
            store,
        }
    }

    /// Controller for the entity named in the URL.
    pub fn controller(&self, entity: &str) -> Result<CrudController<dyn EntityStore>, ApiError> {
        let schema = self.registry.get(entity)?;
        Ok(CrudController::new(self.store.clone(), schema))
    }
}
