pub mod api;
pub mod config;
pub mod corpus;
pub mod enrichment;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod scraper;
pub mod site;

use std::sync::Arc;
use pipeline::Pipeline;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}
