// Content-based job recommendation.
// normalize → features → vectorizer (fit) → similarity (score) → orchestrator.
// The fitted model is request-scoped: every orchestration call refits on the
// current active-job snapshot and drops the model when it returns.

pub mod features;
pub mod handlers;
pub mod normalize;
pub mod orchestrator;
pub mod similarity;
pub mod store;
pub mod vectorizer;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("cannot fit a model on an empty corpus")]
    EmptyCorpus,

    #[error("no terms remain after document-frequency pruning")]
    EmptyVocabulary,

    #[error("invalid vectorizer config: {0}")]
    InvalidConfig(String),
}
