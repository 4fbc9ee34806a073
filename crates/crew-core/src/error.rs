//! Error types for crew-core

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// `limit: 0` as a whole number, not `limit: 05` or `limit: 0.5`
static ZERO_LIMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"limit:\s*0(?:$|[^0-9.]|\.(?:$|[^0-9]))").expect("valid regex")
});

/// Main error type for crew-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The service reports a zero allotment for the selected model.
    #[error("Quota exhausted (model unavailable to these credentials): {0}")]
    QuotaExhausted(String),

    /// The service asked us to slow down; worth retrying.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("LLM API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from LLM API: {0}")]
    InvalidResponse(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify a non-success response from the LLM service.
    ///
    /// A 429 (or a body carrying `RESOURCE_EXHAUSTED`) is a rate limit unless
    /// the body states that the allotment itself is zero (`limit: 0`), in
    /// which case waiting cannot help.
    pub fn from_api_response(status: u16, body: &str) -> Self {
        let message = extract_error_message(body);
        let exhausted = status == 429 || body.contains("RESOURCE_EXHAUSTED");

        if exhausted {
            if ZERO_LIMIT.is_match(body) {
                return Self::QuotaExhausted(message);
            }
            return Self::RateLimited(message);
        }

        Self::Api { status, message }
    }

    /// Whether waiting and resending the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }

    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, Self::QuotaExhausted(_))
    }

    /// Short name of the failure class, used in user-facing replies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "ConfigurationError",
            Self::QuotaExhausted(_) => "PermanentQuotaExhausted",
            Self::RateLimited(_) => "TransientRateLimit",
            Self::Api { .. } => "ApiError",
            Self::InvalidResponse(_) => "InvalidResponse",
            Self::Http(_) => "HttpError",
            Self::Json(_) => "JsonError",
            Self::ToolExecution(_) => "ToolExecutionError",
            Self::Io(_) => "IoError",
        }
    }

    /// Operator advice for failures with a known remedy.
    pub fn hint(&self, model: &str) -> Option<String> {
        match self {
            Self::Api { status: 404, .. } => Some(format!(
                "Model '{model}' was not found. Run `crew --list-models` and set GEMINI_MODEL_NAME to one of the listed models."
            )),
            Self::QuotaExhausted(_) => Some(format!(
                "Model '{model}' is not enabled for this account (quota limit 0). Set GEMINI_MODEL_NAME to a standard model such as 'gemini-flash-latest'."
            )),
            Self::RateLimited(_) => Some(format!(
                "The quota for '{model}' was hit. Wait a while or try another model such as 'gemini-flash-latest'."
            )),
            _ => None,
        }
    }
}

/// Pull `error.message` out of a Google-style error body, falling back to
/// the raw body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Result type alias for crew-core
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_classification() {
        let body = r#"{"error":{"code":429,"message":"Resource has been exhausted (e.g. check quota).","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = Error::from_api_response(429, body);

        assert!(err.is_retryable());
        assert!(!err.is_quota_exhausted());
        assert!(err.to_string().contains("Resource has been exhausted"));
    }

    #[test]
    fn test_zero_quota_classification() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded for metric: generate_content_free_tier_requests, limit: 0, model: gemini-2.0-pro","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = Error::from_api_response(429, body);

        assert!(err.is_quota_exhausted());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_nonzero_limits_are_rate_limits() {
        for body in [
            "Quota exceeded, limit: 05, retry later",
            "Quota exceeded, limit: 0.5 per second",
            "Quota exceeded, limit: 10",
        ] {
            let err = Error::from_api_response(429, body);
            assert!(err.is_retryable(), "{body}");
        }

        assert!(Error::from_api_response(429, "Quota exceeded, limit: 0").is_quota_exhausted());
        assert!(Error::from_api_response(429, "Quota exceeded with limit: 0.").is_quota_exhausted());
    }

    #[test]
    fn test_other_status_is_not_retryable() {
        let err = Error::from_api_response(404, "models/foo is not found");

        assert!(!err.is_retryable());
        assert!(matches!(err, Error::Api { status: 404, .. }));
        assert!(err.hint("foo").unwrap().contains("--list-models"));
    }

    #[test]
    fn test_hint_absent_for_generic_errors() {
        let err = Error::Api {
            status: 400,
            message: "bad request".to_string(),
        };
        assert!(err.hint("gemini-1.5-flash").is_none());
        assert_eq!(err.kind(), "ApiError");
    }
}
