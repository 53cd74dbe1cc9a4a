use axum::{
    routing::post,
    Router,
    extract::{rejection::JsonRejection, Json, State},
    response::{IntoResponse, Response},
};
use tower_http::cors::{CorsLayer, Any};
use tracing::{error, info};

use crate::api::models::EnrichRequest;
use crate::api::response;
use crate::error::AppError;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/enrich", post(enrich_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn enrich_handler(
    State(state): State<AppState>,
    payload: Result<Json<EnrichRequest>, JsonRejection>,
) -> Response {
    let website = match payload {
        Ok(Json(req)) => req.website.unwrap_or_default(),
        Err(rejection) => {
            info!(error = %rejection.body_text(), "Rejected enrich request body");
            return AppError::InvalidInput(rejection.body_text()).into_response();
        }
    };

    info!(%website, "Processing enrich request");
    let start_time = std::time::Instant::now();

    let result = state.pipeline.enrich(&website).await;
    let elapsed = start_time.elapsed();

    match result {
        Ok(data) => {
            info!(?elapsed, "Enriched {}", website);
            response::success(data).into_response()
        }
        Err(err) => {
            error!(kind = err.kind(), status = err.status_code().as_u16(), error = %err, ?elapsed, "Enrich failed");
            err.into_response()
        }
    }
}
