use std::sync::Arc;

use jyotish_rag::RagPipeline;

use crate::interpret::HouseLordsMap;

/// Shared application state, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RagPipeline>,
    pub house_lords: Arc<HouseLordsMap>,
}
