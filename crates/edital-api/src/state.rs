//! Shared application state.

use std::sync::Arc;

use crate::services::AnalysisService;

#[derive(Clone)]
pub struct AppState {
    pub analysis: Arc<AnalysisService>,
}

impl AppState {
    pub fn new(analysis: AnalysisService) -> Self {
        Self {
            analysis: Arc::new(analysis),
        }
    }
}
