use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::recommendation::{RecommendationResult, RecommendationRow};
use crate::recommender::orchestrator::JobMatch;
use crate::state::AppState;

/// Largest page a caller may request when listing stored recommendations.
pub const MAX_LIST_LIMIT: usize = 100;

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct GeneratedRecommendations {
    pub candidate_id: Uuid,
    pub recommendations: Vec<RecommendationResult>,
}

#[derive(Serialize)]
pub struct StoredRecommendations {
    pub candidate_id: Uuid,
    pub recommendations: Vec<RecommendationRow>,
}

/// POST /api/v1/candidates/:id/recommendations
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Json<GeneratedRecommendations> {
    let recommendations = state.recommender.generate_for_candidate(candidate_id).await;
    Json(GeneratedRecommendations {
        candidate_id,
        recommendations,
    })
}

/// GET /api/v1/candidates/:id/recommendations
pub async fn handle_list(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
    Query(params): Query<ListQuery>,
) -> Result<Json<StoredRecommendations>, AppError> {
    let limit = params
        .limit
        .unwrap_or(state.recommender.settings().per_page);
    if limit == 0 || limit > MAX_LIST_LIMIT {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_LIST_LIMIT}"
        )));
    }

    let recommendations = state
        .recommender
        .stored_or_generate(candidate_id, limit)
        .await?;
    Ok(Json(StoredRecommendations {
        candidate_id,
        recommendations,
    }))
}

/// GET /api/v1/candidates/:id/jobs/:job_id/match
pub async fn handle_match(
    State(state): State<AppState>,
    Path((candidate_id, job_id)): Path<(Uuid, Uuid)>,
) -> Json<JobMatch> {
    Json(state.recommender.match_job(candidate_id, job_id).await)
}
