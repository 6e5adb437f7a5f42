//! Stats, rankings and dashboard endpoints

use axum::{extract::State, Extension, Json};

use crate::error::Result;
use crate::models::*;
use crate::routes::auth::AuthenticatedUser;
use crate::AppState;

const RANKINGS_LIMIT: i64 = 100;

/// GET /api/stats
pub async fn stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<StatsResponse>> {
    let stats = state
        .db
        .get_user_stats(auth.user_id)
        .await?
        .unwrap_or_else(|| UserStats::empty(auth.user_id));

    Ok(Json(StatsResponse::new(stats, auth.email)))
}

/// GET /api/rankings
pub async fn rankings(State(state): State<AppState>) -> Result<Json<RankingsResponse>> {
    let rows = state.db.get_rankings(RANKINGS_LIMIT).await?;
    Ok(Json(RankingsResponse::from_rows(rows)))
}

/// GET /api/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<DashboardResponse>> {
    let dashboard = state.db.get_dashboard(auth.user_id).await?;
    Ok(Json(dashboard))
}
