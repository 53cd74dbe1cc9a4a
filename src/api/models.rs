use serde::{Deserialize, Serialize};
use crate::enrichment::EnrichmentResult;

#[derive(Deserialize)]
pub struct EnrichRequest {
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Serialize)]
pub struct EnrichResponse {
    pub success: bool,
    pub data: EnrichmentResult,
}
