use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A ranked job for a candidate. `match_score` is a percentage in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub job_id: Uuid,
    pub match_score: f64,
}

/// A persisted recommendation row joined with its job title.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecommendationRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub job_title: String,
    pub match_score: f64,
    pub created_at: DateTime<Utc>,
}
