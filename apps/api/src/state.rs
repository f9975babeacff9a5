use crate::recommender::orchestrator::Recommender;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the storage collaborator (`Arc<dyn RecommendationStore>`) and the
    /// vectorizer/ranking settings.
    pub recommender: Recommender,
}
