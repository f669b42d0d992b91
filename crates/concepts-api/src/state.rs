//! Shared application state.

use std::sync::Arc;

use concepts_backend::BackendHandle;
use concepts_core::defaults;
use concepts_search::ConceptSearchService;

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<ConceptSearchService>,
    /// Same handle the search service dispatches through; used by the
    /// health endpoints.
    pub backend: BackendHandle,
    pub system_code: String,
    pub app_name: String,
}

impl AppState {
    pub fn new(search: ConceptSearchService) -> Self {
        let backend = search.dispatcher().handle().clone();
        Self {
            search: Arc::new(search),
            backend,
            system_code: defaults::SYSTEM_CODE.to_string(),
            app_name: defaults::APP_NAME.to_string(),
        }
    }

    pub fn with_identity(mut self, system_code: impl Into<String>, app_name: impl Into<String>) -> Self {
        self.system_code = system_code.into();
        self.app_name = app_name.into();
        self
    }
}
