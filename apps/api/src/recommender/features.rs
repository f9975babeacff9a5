//! Feature Composer — folds the text fields of a posting into one weighted
//! document for the vectorizer.
//!
//! Weighting is done by repetition: a field with weight `w > 1` is emitted
//! `trunc(w)` times, anything else once. Repeated copies are space-joined, so
//! bigrams also form across the seam between two copies of the same field
//! (`… last_word first_word …`). The vectorizer sees that seam like any other
//! adjacency.

use uuid::Uuid;

use crate::models::job::JobRecord;
use crate::recommender::normalize::normalize_field;

/// A posting field that contributes to the composed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobField {
    Title,
    Description,
    Category,
    Role,
    Qualification,
}

impl JobField {
    fn value(self, job: &JobRecord) -> Option<&str> {
        match self {
            JobField::Title => Some(job.title.as_str()),
            JobField::Description => Some(job.description.as_str()),
            JobField::Category => Some(job.category.as_str()),
            JobField::Role => job.role.as_deref(),
            JobField::Qualification => job.qualification.as_deref(),
        }
    }
}

/// Field weights, in composition order.
pub const FIELD_WEIGHTS: &[(JobField, f64)] = &[
    (JobField::Title, 3.0),
    (JobField::Description, 2.0),
    (JobField::Category, 1.5),
    (JobField::Role, 2.0),
    (JobField::Qualification, 2.5),
];

/// A composed posting, tagged with the id of the job it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedJob {
    pub job_id: Uuid,
    pub text: String,
}

/// Number of times a field with the given weight is emitted.
/// Fractional weights truncate (2.5 → 2); weights ≤ 1 emit once.
pub fn repetitions(weight: f64) -> usize {
    if weight > 1.0 {
        weight.trunc() as usize
    } else {
        1
    }
}

/// Builds the weighted document for one posting using [`FIELD_WEIGHTS`].
pub fn compose(job: &JobRecord) -> String {
    compose_with(job, FIELD_WEIGHTS)
}

/// Builds the weighted document for one posting from an explicit weight table.
/// Empty or missing fields contribute nothing.
pub fn compose_with(job: &JobRecord, weights: &[(JobField, f64)]) -> String {
    let mut parts: Vec<String> = Vec::new();

    for (field, weight) in weights {
        let normalized = normalize_field(field.value(job));
        if normalized.is_empty() {
            continue;
        }
        parts.extend(std::iter::repeat(normalized).take(repetitions(*weight)));
    }

    parts.join(" ")
}

/// Composes every posting, preserving input order.
pub fn compose_corpus(jobs: &[JobRecord]) -> Vec<ComposedJob> {
    jobs.iter()
        .map(|job| ComposedJob {
            job_id: job.id,
            text: compose(job),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_job(title: &str, description: &str) -> JobRecord {
        JobRecord {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    fn count(text: &str, token: &str) -> usize {
        text.split_whitespace().filter(|t| *t == token).count()
    }

    #[test]
    fn test_repetitions_truncate() {
        assert_eq!(repetitions(3.0), 3);
        assert_eq!(repetitions(2.5), 2);
        assert_eq!(repetitions(1.5), 1);
        assert_eq!(repetitions(1.0), 1);
        assert_eq!(repetitions(0.5), 1);
    }

    #[test]
    fn test_title_repeated_three_times() {
        let job = make_job("Software Engineer", "");
        let text = compose(&job);
        assert_eq!(count(&text, "software"), 3);
        assert_eq!(count(&text, "engineer"), 3);
        assert_eq!(text.split_whitespace().count(), 6);
    }

    #[test]
    fn test_weight_table_drives_repetition() {
        let mut job = make_job("Accountant", "prepare financial statements");
        job.category = "Finance".to_string();
        job.role = Some("Assistant".to_string());
        job.qualification = Some("bachelor degree accounting".to_string());

        let text = compose(&job);
        assert_eq!(count(&text, "accountant"), 3);
        assert_eq!(count(&text, "statement"), 2);
        assert_eq!(count(&text, "finance"), 1);
        assert_eq!(count(&text, "assistant"), 2);
        assert_eq!(count(&text, "bachelor"), 2);
    }

    #[test]
    fn test_missing_fields_contribute_nothing() {
        let job = make_job("", "");
        assert_eq!(compose(&job), "");

        let job = make_job("Analyst", "");
        assert_eq!(compose(&job), "analyst analyst analyst");
    }

    #[test]
    fn test_custom_weights_apply() {
        let job = make_job("Analyst", "reporting");
        let weights = [(JobField::Description, 4.0), (JobField::Title, 1.0)];
        assert_eq!(
            compose_with(&job, &weights),
            "reporting reporting reporting reporting analyst"
        );
    }

    #[test]
    fn test_repeat_seam_joins_last_and_first_word() {
        // Known quirk: copies are space-joined, so "engineer software" is a
        // real adjacency in the composed text.
        let job = make_job("Software Engineer", "");
        let text = compose(&job);
        assert!(text.contains("engineer software"));
    }

    #[test]
    fn test_compose_corpus_preserves_order() {
        let jobs = vec![make_job("Welder", ""), make_job("Plumber", "")];
        let composed = compose_corpus(&jobs);
        assert_eq!(composed.len(), 2);
        assert_eq!(composed[0].job_id, jobs[0].id);
        assert_eq!(composed[1].job_id, jobs[1].id);
        assert!(composed[1].text.starts_with("plumber"));
    }
}
