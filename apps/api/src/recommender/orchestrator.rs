//! Recommendation Orchestrator — one full fit-and-score cycle per call.
//!
//! Collaborator failures (store unavailable, unknown candidate) and model-fit
//! failures are logged and turned into an empty result. Callers never see an
//! error from `generate_for_candidate` or `match_job`.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::models::candidate::CandidateProfile;
use crate::models::job::JobRecord;
use crate::models::recommendation::{RecommendationResult, RecommendationRow};
use crate::recommender::features::compose_corpus;
use crate::recommender::similarity::{profile_text, score, similarity_of, to_percentage};
use crate::recommender::store::{RecommendationStore, StoreError};
use crate::recommender::vectorizer::{fit, VectorizerConfig};
use crate::recommender::RecommendError;

#[derive(Debug, Clone, PartialEq)]
pub struct RecommenderSettings {
    /// How many top jobs the similarity engine returns before post-filtering.
    pub top_n: usize,
    /// Minimum percentage score a recommendation must exceed to be kept.
    pub min_score: f64,
    /// Default page size when listing stored recommendations.
    pub per_page: usize,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            top_n: 10,
            min_score: 1.0,
            per_page: 6,
        }
    }
}

/// Similarity between one candidate and one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobMatch {
    pub job_id: Uuid,
    /// Cosine similarity, 0–1.
    pub similarity: f64,
    /// The same value on the 0–100 scale.
    pub match_score: f64,
}

impl JobMatch {
    fn new(job_id: Uuid, similarity: f64) -> Self {
        Self {
            job_id,
            similarity,
            match_score: to_percentage(similarity),
        }
    }
}

/// Fits a model on `jobs` and ranks them for `profile`, keeping only results
/// above `settings.min_score`. A blank profile returns early without fitting.
pub fn rank_jobs(
    jobs: &[JobRecord],
    profile: &CandidateProfile,
    vectorizer: &VectorizerConfig,
    settings: &RecommenderSettings,
) -> Result<Vec<RecommendationResult>, RecommendError> {
    if profile_text(profile).is_none() {
        return Ok(Vec::new());
    }

    let model = fit(&compose_corpus(jobs), vectorizer)?;
    debug!(
        rows = model.n_rows(),
        vocabulary = model.vocabulary_size(),
        "Fitted corpus model"
    );

    Ok(score(profile, &model, settings.top_n)
        .into_iter()
        .filter(|r| r.match_score > settings.min_score)
        .collect())
}

#[derive(Clone)]
pub struct Recommender {
    store: Arc<dyn RecommendationStore>,
    vectorizer: VectorizerConfig,
    settings: RecommenderSettings,
}

impl Recommender {
    pub fn new(
        store: Arc<dyn RecommendationStore>,
        vectorizer: VectorizerConfig,
        settings: RecommenderSettings,
    ) -> Self {
        Self {
            store,
            vectorizer,
            settings,
        }
    }

    pub fn settings(&self) -> &RecommenderSettings {
        &self.settings
    }

    /// Regenerates and stores recommendations for a candidate, returning the
    /// stored list. Stored rows are replaced, never appended to.
    pub async fn generate_for_candidate(&self, candidate_id: Uuid) -> Vec<RecommendationResult> {
        let profile = match self.store.get_candidate_profile(candidate_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(%candidate_id, "Cannot load candidate profile: {e}");
                return Vec::new();
            }
        };

        if !profile.has_matchable_content() {
            info!(%candidate_id, "Candidate has insufficient profile information");
            return Vec::new();
        }

        let Some(jobs) = self.active_jobs().await else {
            return Vec::new();
        };
        info!(%candidate_id, jobs = jobs.len(), "Matching candidate against active jobs");

        let vectorizer = self.vectorizer.clone();
        let settings = self.settings.clone();
        let ranked = tokio::task::spawn_blocking(move || {
            rank_jobs(&jobs, &profile, &vectorizer, &settings)
        })
        .await;

        let results = match ranked {
            Ok(Ok(results)) => results,
            Ok(Err(e)) => {
                warn!(%candidate_id, "No recommendations available: {e}");
                return Vec::new();
            }
            Err(e) => {
                error!(%candidate_id, "Recommendation task failed: {e}");
                return Vec::new();
            }
        };

        if let Err(e) = self
            .store
            .replace_recommendations(candidate_id, &results)
            .await
        {
            error!(%candidate_id, "Failed to store recommendations: {e}");
            return Vec::new();
        }

        info!(
            %candidate_id,
            recommendations = results.len(),
            "Saved recommendations"
        );
        results
    }

    /// Scores a single job for a candidate against a freshly fitted model.
    /// Anything that prevents scoring (unknown candidate or job, blank
    /// profile, empty corpus, fit failure) yields a zero score.
    pub async fn match_job(&self, candidate_id: Uuid, job_id: Uuid) -> JobMatch {
        let profile = match self.store.get_candidate_profile(candidate_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(%candidate_id, "Cannot load candidate profile: {e}");
                return JobMatch::new(job_id, 0.0);
            }
        };
        let Some(jobs) = self.active_jobs().await else {
            return JobMatch::new(job_id, 0.0);
        };

        let vectorizer = self.vectorizer.clone();
        let similarity = tokio::task::spawn_blocking(move || {
            let model = fit(&compose_corpus(&jobs), &vectorizer)?;
            Ok::<_, RecommendError>(similarity_of(job_id, &profile, &model))
        })
        .await;

        match similarity {
            Ok(Ok(similarity)) => JobMatch::new(job_id, similarity),
            Ok(Err(e)) => {
                warn!(%candidate_id, %job_id, "Cannot score job: {e}");
                JobMatch::new(job_id, 0.0)
            }
            Err(e) => {
                error!(%candidate_id, %job_id, "Match task failed: {e}");
                JobMatch::new(job_id, 0.0)
            }
        }
    }

    /// Stored recommendations for a candidate. When nothing is stored yet and
    /// the profile has both skills and experience, generates them first.
    pub async fn stored_or_generate(
        &self,
        candidate_id: Uuid,
        limit: usize,
    ) -> Result<Vec<RecommendationRow>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = self.store.list_recommendations(candidate_id, limit).await?;
        if !rows.is_empty() {
            return Ok(rows);
        }

        let profile = self.store.get_candidate_profile(candidate_id).await?;
        if !profile.is_complete() {
            return Ok(rows);
        }

        self.generate_for_candidate(candidate_id).await;
        self.store.list_recommendations(candidate_id, limit).await
    }

    async fn active_jobs(&self) -> Option<Vec<JobRecord>> {
        match self.store.list_active_jobs().await {
            Ok(jobs) if jobs.is_empty() => {
                info!("No active job postings found");
                None
            }
            Ok(jobs) => Some(jobs),
            Err(e) => {
                error!("Failed to load active jobs: {e}");
                None
            }
        }
    }
}
