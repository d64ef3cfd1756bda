//! Statistics endpoint

use axum::{extract::State, Json};

use crate::{error::AppResult, models::stats::Stats};

/// Dashboard counters, recomputed on every call
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Current statistics", body = Stats)
    )
)]
pub async fn get_stats(State(state): State<crate::AppState>) -> AppResult<Json<Stats>> {
    let stats = state.services.circulation.read().await.current_stats();
    Ok(Json(stats))
}
