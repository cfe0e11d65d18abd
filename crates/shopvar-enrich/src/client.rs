//! HTTP client for a Gemini-style `generateContent` endpoint.

use std::future::Future;
use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, StatusCode, Url};
use shopvar_core::AppConfig;

use crate::error::EnrichError;
use crate::types::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "models/gemini-2.5-flash";

/// Anything that turns a prompt into text. The seam between enrichment logic
/// and the model transport.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, EnrichError>> + Send;
}

/// Client for the `generateContent` REST endpoint.
///
/// Use [`GeminiClient::new`] for production or [`GeminiClient::with_base_url`]
/// to point at a mock server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: Url,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"[redacted]")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Creates a client for the public endpoint and the default model.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, EnrichError> {
        Self::with_base_url(api_key, DEFAULT_MODEL, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL and model.
    ///
    /// `model` may be given with or without the `models/` prefix.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Http`] if the `reqwest::Client` cannot be built
    /// and [`EnrichError::InvalidEndpoint`] if the URL is malformed.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, EnrichError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("shopvar/0.1 (variant-enrichment)")
            .build()?;

        let model = model.trim().trim_start_matches("models/");
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(&format!("v1beta/models/{model}:generateContent")))
            .map_err(|e| EnrichError::InvalidEndpoint {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
        })
    }

    /// Builds a client from process configuration. Returns `Ok(None)` when no
    /// API key is configured.
    ///
    /// # Errors
    ///
    /// Same as [`GeminiClient::with_base_url`].
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, EnrichError> {
        let Some(api_key) = config.ai_api_key.as_deref() else {
            return Ok(None);
        };
        Self::with_base_url(
            api_key,
            &config.ai_model,
            config.ai_request_timeout_secs,
            &config.ai_base_url,
        )
        .map(Some)
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends one prompt and returns the model's text.
    ///
    /// # Errors
    ///
    /// - [`EnrichError::Http`] on network failure or timeout.
    /// - [`EnrichError::Api`] on a non-2xx status.
    /// - [`EnrichError::Deserialize`] if the body does not parse.
    /// - [`EnrichError::EmptyResponse`] if the model returned no text.
    pub async fn generate_content(&self, prompt: &str) -> Result<String, EnrichError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .await?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &body, retry_after));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| EnrichError::Deserialize {
                context: "generateContent".to_string(),
                source: e,
            })?;
        parsed.text().ok_or(EnrichError::EmptyResponse)
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, EnrichError>> + Send {
        self.generate_content(prompt)
    }
}

/// Maps a non-success response. A `Retry-After` header takes precedence over
/// the envelope's `RetryInfo`.
fn api_error(status: StatusCode, body: &str, retry_after: Option<Duration>) -> EnrichError {
    let (message, hint) = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(envelope) => {
            let hint = envelope.error.retry_delay();
            (envelope.error.message, hint)
        }
        Err(_) => (body.chars().take(200).collect(), None),
    };
    EnrichError::Api {
        status: status.as_u16(),
        message,
        retry_after: retry_after.or(hint),
    }
}
