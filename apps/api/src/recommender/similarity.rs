//! Similarity Engine — ranks the fitted corpus against a candidate profile.
//!
//! The profile is normalized as one blob (no per-field weighting), projected
//! with the corpus model, and compared to every row by dot product (rows and
//! query are unit vectors, so this is cosine similarity).

use uuid::Uuid;

use crate::models::candidate::{is_filled, CandidateProfile};
use crate::models::recommendation::RecommendationResult;
use crate::recommender::normalize::normalize;
use crate::recommender::vectorizer::{transform, CorpusMatrix};

/// Joins skills, experience and location preference (non-blank ones, in that
/// order). Returns `None` when all three are blank.
pub fn profile_text(profile: &CandidateProfile) -> Option<String> {
    let parts: Vec<&str> = [
        &profile.skills,
        &profile.experience,
        &profile.location_preference,
    ]
    .into_iter()
    .filter(|field| is_filled(field))
    .filter_map(|field| field.as_deref())
    .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Converts a cosine similarity to the stored percentage scale.
pub fn to_percentage(similarity: f64) -> f64 {
    (similarity * 100.0).clamp(0.0, 100.0)
}

/// Cosine similarity of the profile against every corpus row, in row order.
fn similarities(profile_text: &str, model: &CorpusMatrix) -> Vec<f64> {
    let query = transform(&normalize(profile_text), model);
    model.rows().iter().map(|row| query.dot(row)).collect()
}

/// Top `top_n` jobs for the profile, best first.
///
/// Ties keep corpus row order. Results with similarity ≤ 0 are dropped after
/// the top-N cut. Scores are percentages. A blank profile returns nothing
/// without touching the model.
pub fn score(
    profile: &CandidateProfile,
    model: &CorpusMatrix,
    top_n: usize,
) -> Vec<RecommendationResult> {
    let Some(text) = profile_text(profile) else {
        return Vec::new();
    };

    let sims = similarities(&text, model);
    let mut order: Vec<usize> = (0..sims.len()).collect();
    // Stable: equal scores stay in row order.
    order.sort_by(|&a, &b| sims[b].total_cmp(&sims[a]));

    order
        .into_iter()
        .take(top_n)
        .filter(|&row| sims[row] > 0.0)
        .map(|row| RecommendationResult {
            job_id: model.job_ids()[row],
            match_score: to_percentage(sims[row]),
        })
        .collect()
}

/// Raw cosine similarity (0–1) between one job and the profile. Jobs that are
/// not in the fitted corpus, and blank profiles, score 0.
pub fn similarity_of(job_id: Uuid, profile: &CandidateProfile, model: &CorpusMatrix) -> f64 {
    let Some(row) = model.row_of(job_id).and_then(|idx| model.row(idx)) else {
        return 0.0;
    };
    let Some(text) = profile_text(profile) else {
        return 0.0;
    };
    model.transform(&normalize(&text)).dot(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::JobRecord;
    use crate::recommender::features::{compose_corpus, ComposedJob};
    use crate::recommender::vectorizer::{fit, VectorizerConfig};

    fn job(title: &str, description: &str, category: &str, role: &str, qualification: &str) -> JobRecord {
        JobRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            role: Some(role.to_string()),
            qualification: Some(qualification.to_string()),
            ..Default::default()
        }
    }

    fn profile(skills: &str, experience: &str, location: &str) -> CandidateProfile {
        CandidateProfile {
            skills: Some(skills.to_string()),
            experience: Some(experience.to_string()),
            location_preference: Some(location.to_string()),
        }
    }

    fn reference_jobs() -> Vec<JobRecord> {
        vec![
            job(
                "Software Engineer",
                "build web apps with python and javascript",
                "Technology",
                "Developer",
                "bachelor degree computer science",
            ),
            job(
                "Accountant",
                "prepare financial statements",
                "Finance",
                "Assistant",
                "bachelor degree accounting",
            ),
        ]
    }

    #[test]
    fn test_profile_text_skips_blank_fields() {
        let p = profile("rust", "  ", "Penang");
        assert_eq!(profile_text(&p).as_deref(), Some("rust Penang"));
        assert_eq!(profile_text(&profile("", " ", "\t")), None);
        assert_eq!(profile_text(&CandidateProfile::default()), None);
    }

    #[test]
    fn test_end_to_end_software_engineer_ranks_first() {
        let jobs = reference_jobs();
        let model = fit(&compose_corpus(&jobs), &VectorizerConfig::default()).unwrap();
        let p = profile("python javascript web development", "built web applications", "");

        let results = score(&p, &model, 10);
        assert!(!results.is_empty());
        assert_eq!(results[0].job_id, jobs[0].id);
        assert!(results[0].match_score > 0.0);
        if let Some(second) = results.iter().find(|r| r.job_id == jobs[1].id) {
            assert!(second.match_score < results[0].match_score);
        }
    }

    #[test]
    fn test_disjoint_job_is_excluded() {
        let jobs = reference_jobs();
        let model = fit(&compose_corpus(&jobs), &VectorizerConfig::default()).unwrap();
        let p = profile("python javascript", "web", "");

        let results = score(&p, &model, 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].job_id, jobs[0].id);
        assert_eq!(similarity_of(jobs[1].id, &p, &model), 0.0);
    }

    #[test]
    fn test_empty_profile_returns_nothing() {
        let jobs = reference_jobs();
        let model = fit(&compose_corpus(&jobs), &VectorizerConfig::default()).unwrap();
        assert!(score(&profile(" ", "", "\n"), &model, 10).is_empty());
        assert!(score(&CandidateProfile::default(), &model, 10).is_empty());
    }

    #[test]
    fn test_unknown_job_scores_zero() {
        let jobs = reference_jobs();
        let model = fit(&compose_corpus(&jobs), &VectorizerConfig::default()).unwrap();
        let p = profile("python", "", "");
        assert_eq!(similarity_of(Uuid::new_v4(), &p, &model), 0.0);
    }

    #[test]
    fn test_similarity_of_matches_score() {
        let jobs = reference_jobs();
        let model = fit(&compose_corpus(&jobs), &VectorizerConfig::default()).unwrap();
        let p = profile("python javascript web development", "built web applications", "");

        let results = score(&p, &model, 10);
        let sim = similarity_of(jobs[0].id, &p, &model);
        assert!((to_percentage(sim) - results[0].match_score).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let corpus: Vec<ComposedJob> = ["rust tokio", "rust tokio", "java spring"]
            .iter()
            .map(|t| ComposedJob {
                job_id: Uuid::new_v4(),
                text: t.to_string(),
            })
            .collect();
        let model = fit(&corpus, &VectorizerConfig::default()).unwrap();
        let results = score(&profile("rust tokio", "", ""), &model, 10);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].job_id, corpus[0].job_id);
        assert_eq!(results[1].job_id, corpus[1].job_id);
        assert_eq!(results[0].match_score, results[1].match_score);
    }

    #[test]
    fn test_top_n_limits_results() {
        let corpus: Vec<ComposedJob> = ["rust backend", "rust frontend", "rust embedded", "java"]
            .iter()
            .map(|t| ComposedJob {
                job_id: Uuid::new_v4(),
                text: t.to_string(),
            })
            .collect();
        let model = fit(&corpus, &VectorizerConfig::default()).unwrap();
        let results = score(&profile("rust backend frontend embedded", "", ""), &model, 2);
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_profile_against_itself_is_one() {
        let p = profile("python javascript web development", "built web applications", "");
        let corpus = vec![ComposedJob {
            job_id: Uuid::new_v4(),
            text: normalize(&profile_text(&p).unwrap()),
        }];
        let config = VectorizerConfig {
            max_df: 1.0,
            ..Default::default()
        };
        let model = fit(&corpus, &config).unwrap();
        let sim = similarity_of(corpus[0].job_id, &p, &model);
        assert!((sim - 1.0).abs() < 1e-6, "similarity was {sim}");
    }

    #[test]
    fn test_scores_are_percentages() {
        assert_eq!(to_percentage(0.5), 50.0);
        assert_eq!(to_percentage(1.2), 100.0);
        assert_eq!(to_percentage(-0.1), 0.0);
    }
}
