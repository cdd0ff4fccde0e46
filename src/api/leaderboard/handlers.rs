use axum::extract::State;
use axum::Json;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::schemas::leaderboard::LeaderboardEntry;
use crate::services::leaderboard::rank;

pub(crate) async fn leaderboard(
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let submissions = state
        .submissions()
        .list_all()
        .await
        .map_err(|err| ApiError::internal(err, "Failed to load submissions"))?;

    Ok(Json(rank(&submissions)))
}
