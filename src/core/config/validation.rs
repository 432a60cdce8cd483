use super::defaults::AppConfig;
use crate::core::errors::ApiError;
use crate::query::RetrievalProfile;

const MAX_K: usize = 100;
const MAX_TIMEOUT_SECS: u64 = 86_400;

pub fn validate_config(config: &AppConfig) -> Result<(), ApiError> {
    validate_non_empty("llm.base_url", &config.llm.base_url)?;
    validate_non_empty("llm.model", &config.llm.model)?;
    validate_non_empty("embedding.base_url", &config.embedding.base_url)?;
    validate_non_empty("embedding.model", &config.embedding.model)?;
    validate_non_empty("server.host", &config.server.host)?;

    if config.llm.timeout_secs == 0 || config.llm.timeout_secs > MAX_TIMEOUT_SECS {
        return Err(range_error(
            "llm.timeout_secs",
            1,
            MAX_TIMEOUT_SECS,
            config.llm.timeout_secs,
        ));
    }

    if let Some(t) = config.llm.temperature {
        if !(0.0..=2.0).contains(&t) {
            return Err(ApiError::BadRequest(format!(
                "llm.temperature must be between 0 and 2, got {}",
                t
            )));
        }
    }

    if let Some(p) = config.llm.top_p {
        if !(0.0..=1.0).contains(&p) {
            return Err(ApiError::BadRequest(format!(
                "llm.top_p must be between 0 and 1, got {}",
                p
            )));
        }
    }

    if config.retrieval.timeout_secs == 0 || config.retrieval.timeout_secs > MAX_TIMEOUT_SECS {
        return Err(range_error(
            "retrieval.timeout_secs",
            1,
            MAX_TIMEOUT_SECS,
            config.retrieval.timeout_secs,
        ));
    }

    validate_profile("retrieval.server", &config.retrieval.server)?;
    validate_profile("retrieval.cli", &config.retrieval.cli)?;

    if config.retrieval.max_context_chars == Some(0) {
        return Err(ApiError::BadRequest(
            "retrieval.max_context_chars must be at least 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Also used for profiles assembled from command-line overrides.
pub fn validate_profile(label: &str, profile: &RetrievalProfile) -> Result<(), ApiError> {
    if profile.k == 0 || profile.k > MAX_K {
        return Err(range_error(
            &format!("{}.k", label),
            1,
            MAX_K as u64,
            profile.k as u64,
        ));
    }
    Ok(())
}

fn validate_non_empty(label: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} must not be empty", label)));
    }
    Ok(())
}

fn range_error(label: &str, min: u64, max: u64, actual: u64) -> ApiError {
    ApiError::BadRequest(format!(
        "{} must be between {} and {}, got {}",
        label, min, max, actual
    ))
}
