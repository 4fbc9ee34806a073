//! LLM API HTTP client
//!
//! [`LlmClient`] is the seam the agents talk through; [`GeminiClient`] is
//! the production implementation on top of reqwest.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::gemini::{GeminiModelList, GeminiRequest, GeminiResponse};
use super::types::*;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Transport error with the request URL stripped
fn http_error(e: reqwest::Error) -> Error {
    Error::Http(e.without_url())
}

/// A service that answers one generation request at a time
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse>;
}

/// Gemini REST client
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a new client. Fails when no API key is configured.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::Config(
                "GEMINI_API_KEY is not set. Add it to your environment or .env file".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(Error::Http)?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create with custom base URL (for testing or proxies)
    pub fn with_base_url(config: &LlmConfig, base_url: impl Into<String>) -> Result<Self> {
        let mut client = Self::new(config)?;
        client.base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(client)
    }

    /// Default model name for requests built by callers
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List the models these credentials can see, following pagination.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/models", self.base_url);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query: Vec<(&str, &str)> = Vec::new();
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            debug!("Listing models: {}", url);

            let response = self
                .client
                .get(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .query(&query)
                .send()
                .await
                .map_err(http_error)?;

            let status = response.status();
            let body = response.text().await.map_err(http_error)?;

            if !status.is_success() {
                warn!("Gemini API error while listing models: {} - {}", status, body);
                return Err(Error::from_api_response(status.as_u16(), &body));
            }

            let page: GeminiModelList = serde_json::from_str(&body).map_err(|e| {
                Error::InvalidResponse(format!("Failed to parse model list: {} - {}", e, body))
            })?;

            models.extend(page.models.into_iter().map(ModelInfo::from));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(models)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let model = if request.model.is_empty() {
            self.model.as_str()
        } else {
            request.model.as_str()
        };
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        debug!(
            "Sending request to Gemini API: {} ({} turns, {} tools)",
            url,
            request.history.len(),
            request.tools.len()
        );

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .header("content-type", "application/json")
            .json(&GeminiRequest::from_request(request))
            .send()
            .await
            .map_err(http_error)?;

        let status = response.status();
        let body = response.text().await.map_err(http_error)?;

        if !status.is_success() {
            warn!("Gemini API error: {} - {}", status, body);
            return Err(Error::from_api_response(status.as_u16(), &body));
        }

        let parsed: GeminiResponse = serde_json::from_str(&body).map_err(|e| {
            Error::InvalidResponse(format!("Failed to parse response: {} - {}", e, body))
        })?;

        let finish_reason = parsed
            .candidates
            .first()
            .and_then(|c| c.finish_reason.clone());
        let response = parsed.into_response()?;

        info!(
            "Gemini API response: finish_reason={:?}, tool_calls={}, tokens={}",
            finish_reason,
            response.tool_calls.len(),
            response.usage.map(|u| u.output_tokens).unwrap_or(0)
        );

        Ok(response)
    }
}
