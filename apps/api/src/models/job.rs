use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Snapshot of an active job posting as read from `job_postings`.
///
/// Only the text fields feed the recommender; location, salary, job type and
/// company name travel along so callers can render results without a second
/// lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct JobRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub role: Option<String>,
    pub location: String,
    pub qualification: Option<String>,
    pub salary: Option<String>,
    pub job_type: Option<String>,
    pub company_name: String,
}
