use axum::Json;
use axum::http::StatusCode;
use crate::api::models::EnrichResponse;
use crate::enrichment::EnrichmentResult;

pub fn success(data: EnrichmentResult) -> (StatusCode, Json<EnrichResponse>) {
    (
        StatusCode::OK,
        Json(EnrichResponse {
            success: true,
            data,
        }),
    )
}
