//! Storage collaborator for the recommender.
//!
//! The orchestrator only sees `dyn RecommendationStore`; `PgRecommendationStore`
//! is the production implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::candidate::CandidateProfile;
use crate::models::job::JobRecord;
use crate::models::recommendation::{RecommendationResult, RecommendationRow};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("candidate {0} not found")]
    CandidateNotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Active postings in a stable retrieval order.
    async fn list_active_jobs(&self) -> Result<Vec<JobRecord>, StoreError>;

    async fn get_candidate_profile(&self, candidate_id: Uuid)
        -> Result<CandidateProfile, StoreError>;

    /// Replaces every stored recommendation for the candidate with `results`.
    async fn replace_recommendations(
        &self,
        candidate_id: Uuid,
        results: &[RecommendationResult],
    ) -> Result<(), StoreError>;

    /// Stored recommendations, highest score first.
    async fn list_recommendations(
        &self,
        candidate_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RecommendationRow>, StoreError>;
}

pub struct PgRecommendationStore {
    pool: PgPool,
}

impl PgRecommendationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecommendationStore for PgRecommendationStore {
    async fn list_active_jobs(&self) -> Result<Vec<JobRecord>, StoreError> {
        let jobs: Vec<JobRecord> = sqlx::query_as(
            r#"
            SELECT j.id, j.title, j.description, j.category, j.subcategory, j.role,
                   j.location, j.qualification, j.salary, j.job_type,
                   c.name AS company_name
            FROM job_postings j
            JOIN companies c ON c.id = j.company_id
            WHERE j.is_active = TRUE
            ORDER BY j.posting_date ASC, j.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(jobs = jobs.len(), "Loaded active job postings");
        Ok(jobs)
    }

    async fn get_candidate_profile(
        &self,
        candidate_id: Uuid,
    ) -> Result<CandidateProfile, StoreError> {
        let profile: Option<CandidateProfile> = sqlx::query_as(
            "SELECT skills, experience, location_preference FROM candidates WHERE id = $1",
        )
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?;

        profile.ok_or(StoreError::CandidateNotFound(candidate_id))
    }

    async fn replace_recommendations(
        &self,
        candidate_id: Uuid,
        results: &[RecommendationResult],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM recommendations WHERE candidate_id = $1")
            .bind(candidate_id)
            .execute(&mut *tx)
            .await?;

        for result in results {
            sqlx::query(
                "INSERT INTO recommendations (id, candidate_id, job_id, match_score) VALUES ($1, $2, $3, $4)",
            )
            .bind(Uuid::new_v4())
            .bind(candidate_id)
            .bind(result.job_id)
            .bind(result.match_score)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn list_recommendations(
        &self,
        candidate_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RecommendationRow>, StoreError> {
        let rows = sqlx::query_as(
            r#"
            SELECT r.id, r.candidate_id, r.job_id, j.title AS job_title,
                   r.match_score, r.created_at
            FROM recommendations r
            JOIN job_postings j ON j.id = r.job_id
            WHERE r.candidate_id = $1
            ORDER BY r.match_score DESC, r.created_at, r.id
            LIMIT $2
            "#,
        )
        .bind(candidate_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

/// In-memory store for tests. Failure switches simulate an unavailable database.
#[cfg(test)]
pub mod memory {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;

    #[derive(Default)]
    pub struct MemoryStore {
        pub jobs: Mutex<Vec<JobRecord>>,
        pub profiles: Mutex<HashMap<Uuid, CandidateProfile>>,
        pub stored: Mutex<HashMap<Uuid, Vec<RecommendationResult>>>,
        pub fail_list_jobs: AtomicBool,
        pub fail_replace: AtomicBool,
        pub list_jobs_calls: AtomicUsize,
        pub replace_calls: AtomicUsize,
    }

    impl MemoryStore {
        pub fn with(jobs: Vec<JobRecord>, profiles: Vec<(Uuid, CandidateProfile)>) -> Self {
            Self {
                jobs: Mutex::new(jobs),
                profiles: Mutex::new(profiles.into_iter().collect()),
                ..Default::default()
            }
        }

        pub fn stored_for(&self, candidate_id: Uuid) -> Option<Vec<RecommendationResult>> {
            self.stored.lock().unwrap().get(&candidate_id).cloned()
        }

        fn unavailable() -> StoreError {
            StoreError::Database(sqlx::Error::PoolTimedOut)
        }
    }

    #[async_trait]
    impl RecommendationStore for MemoryStore {
        async fn list_active_jobs(&self) -> Result<Vec<JobRecord>, StoreError> {
            self.list_jobs_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list_jobs.load(Ordering::SeqCst) {
                return Err(Self::unavailable());
            }
            Ok(self.jobs.lock().unwrap().clone())
        }

        async fn get_candidate_profile(
            &self,
            candidate_id: Uuid,
        ) -> Result<CandidateProfile, StoreError> {
            self.profiles
                .lock()
                .unwrap()
                .get(&candidate_id)
                .cloned()
                .ok_or(StoreError::CandidateNotFound(candidate_id))
        }

        async fn replace_recommendations(
            &self,
            candidate_id: Uuid,
            results: &[RecommendationResult],
        ) -> Result<(), StoreError> {
            self.replace_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_replace.load(Ordering::SeqCst) {
                return Err(Self::unavailable());
            }
            self.stored
                .lock()
                .unwrap()
                .insert(candidate_id, results.to_vec());
            Ok(())
        }

        async fn list_recommendations(
            &self,
            candidate_id: Uuid,
            limit: i64,
        ) -> Result<Vec<RecommendationRow>, StoreError> {
            let jobs = self.jobs.lock().unwrap();
            let mut stored = self.stored_for(candidate_id).unwrap_or_default();
            stored.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));

            Ok(stored
                .into_iter()
                .take(limit.max(0) as usize)
                .map(|r| RecommendationRow {
                    id: Uuid::new_v4(),
                    candidate_id,
                    job_id: r.job_id,
                    job_title: jobs
                        .iter()
                        .find(|j| j.id == r.job_id)
                        .map(|j| j.title.clone())
                        .unwrap_or_default(),
                    match_score: r.match_score,
                    created_at: Utc::now(),
                })
                .collect())
        }
    }
}
