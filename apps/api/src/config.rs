use std::str::FromStr;

use anyhow::{Context, Result};

use crate::recommender::orchestrator::RecommenderSettings;
use crate::recommender::vectorizer::VectorizerConfig;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub port: u16,
    pub rust_log: String,
    pub vectorizer: VectorizerConfig,
    pub recommender: RecommenderSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let vectorizer_defaults = VectorizerConfig::default();
        let vectorizer = VectorizerConfig {
            max_features: Some(env_or(
                "TFIDF_MAX_FEATURES",
                vectorizer_defaults.max_features.unwrap_or(10_000),
            )?),
            min_df: env_or("TFIDF_MIN_DF", vectorizer_defaults.min_df)?,
            max_df: env_or("TFIDF_MAX_DF", vectorizer_defaults.max_df)?,
            ..vectorizer_defaults
        };
        vectorizer
            .validate()
            .context("Invalid TF-IDF configuration")?;

        let settings_defaults = RecommenderSettings::default();
        let recommender = RecommenderSettings {
            top_n: env_or("RECOMMENDER_TOP_N", settings_defaults.top_n)?,
            min_score: env_or("RECOMMENDER_MIN_SCORE", settings_defaults.min_score)?,
            per_page: env_or("RECOMMENDATIONS_PER_PAGE", settings_defaults.per_page)?,
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10)?,
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            vectorizer,
            recommender,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Reads and parses an optional variable, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} has an invalid value '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_accepts_numbers() {
        assert_eq!(parse_value::<u16>("PORT", " 9090 ").unwrap(), 9090);
        assert_eq!(parse_value::<f64>("TFIDF_MAX_DF", "0.9").unwrap(), 0.9);
    }

    #[test]
    fn test_parse_value_error_names_the_variable() {
        let err = parse_value::<usize>("RECOMMENDER_TOP_N", "ten").unwrap_err();
        assert!(err.to_string().contains("RECOMMENDER_TOP_N"));
    }

    #[test]
    fn test_env_or_falls_back_when_unset() {
        let value: usize = env_or("JOBMATCH_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
