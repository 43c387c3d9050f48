//! HTTP client for the remote translate/transliterate API.
//!
//! [`ServiceClient`] implements [`ChunkTransformer`] over two JSON endpoints:
//!
//! - `POST {base}/translate` answering `{"translated_text": ...}`
//! - `POST {base}/transliterate` answering `{"transliterated_text": ...}`
//!
//! Both authenticate with the `api-subscription-key` header. A successful
//! response without the output field yields the input text unchanged.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::error::ChunkError;
use crate::transform::{ChunkTransformer, TransformMode};
use crate::{Result, VertitoError};

/// Header carrying the subscription key
pub const API_KEY_HEADER: &str = "api-subscription-key";

/// Connection settings and fixed request fields for the transform API
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Base URL; endpoint paths are resolved against it
    pub base_url: String,
    /// Subscription key sent with every request
    pub api_key: String,
    /// Language of the source text
    pub source_language: String,
    /// Translation model
    pub model: String,
    /// Speaker gender hint for translation
    pub speaker_gender: String,
    /// Translation register
    pub register: String,
    /// Whether the service normalizes input before translating
    pub enable_preprocessing: bool,
    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.sarvam.ai".to_string(),
            api_key: String::new(),
            source_language: "en-IN".to_string(),
            model: "sarvam-translate:v1".to_string(),
            speaker_gender: "Male".to_string(),
            register: "formal".to_string(),
            enable_preprocessing: true,
            timeout: 30,
        }
    }
}

impl ServiceConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { api_key: api_key.into(), ..Default::default() }
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    input: &'a str,
    source_language_code: &'a str,
    target_language_code: &'a str,
    speaker_gender: &'a str,
    mode: &'a str,
    model: &'a str,
    enable_preprocessing: bool,
}

#[derive(Serialize)]
struct TransliterateRequest<'a> {
    input: &'a str,
    source_language_code: &'a str,
    target_language_code: &'a str,
}

/// Transform API client.
///
/// # Example
///
/// ```rust,no_run
/// use vertito_core::service::{ServiceClient, ServiceConfig};
/// use vertito_core::transform::Orchestrator;
///
/// let primary = ServiceClient::new(ServiceConfig::new("my-key")).unwrap();
/// let fallback = primary.alternate().unwrap();
/// let orchestrator = Orchestrator::new(primary).with_fallback(fallback);
/// ```
#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: Client,
    config: ServiceConfig,
    translate_url: Url,
    transliterate_url: Url,
    name: &'static str,
}

impl ServiceClient {
    /// Create a client with a pooled connection.
    ///
    /// # Errors
    ///
    /// - [`VertitoError::ConfigError`] if the timeout is zero
    /// - [`VertitoError::InvalidUrl`] if the base URL does not parse
    /// - [`VertitoError::HttpError`] if the HTTP client cannot be built
    pub fn new(config: ServiceConfig) -> Result<Self> {
        if config.timeout == 0 {
            return Err(VertitoError::ConfigError("timeout must be at least one second".to_string()));
        }
        let client = Client::builder().timeout(Duration::from_secs(config.timeout)).build()?;
        Self::with_client(client, config, "primary")
    }

    /// A capability-equivalent client over a fresh, non-pooled connection.
    ///
    /// Sends the same requests as `self`; used as the second strategy so a
    /// retry does not reuse a connection the first attempt left in a bad
    /// state.
    pub fn alternate(&self) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout))
            .pool_max_idle_per_host(0)
            .build()?;
        Self::with_client(client, self.config.clone(), "alternate")
    }

    fn with_client(client: Client, config: ServiceConfig, name: &'static str) -> Result<Self> {
        let base = if config.base_url.ends_with('/') { config.base_url.clone() } else { format!("{}/", config.base_url) };
        let base = Url::parse(&base).map_err(|e| VertitoError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;

        let join = |path: &str| base.join(path).map_err(|e| VertitoError::InvalidUrl(e.to_string()));
        let translate_url = join("translate")?;
        let transliterate_url = join("transliterate")?;

        Ok(Self { client, config, translate_url, transliterate_url, name })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Translate `text` into `target_language`
    pub async fn translate(&self, text: &str, target_language: &str) -> std::result::Result<String, ChunkError> {
        let body = TranslateRequest {
            input: text,
            source_language_code: &self.config.source_language,
            target_language_code: target_language,
            speaker_gender: &self.config.speaker_gender,
            mode: &self.config.register,
            model: &self.config.model,
            enable_preprocessing: self.config.enable_preprocessing,
        };
        self.post(&self.translate_url, &body, "translated_text", text).await
    }

    /// Transliterate `text` into the script of `target_language`
    pub async fn transliterate(&self, text: &str, target_language: &str) -> std::result::Result<String, ChunkError> {
        let body = TransliterateRequest {
            input: text,
            source_language_code: &self.config.source_language,
            target_language_code: target_language,
        };
        self.post(&self.transliterate_url, &body, "transliterated_text", text).await
    }

    async fn post<B: Serialize + Sync>(
        &self,
        url: &Url,
        body: &B,
        output_field: &str,
        input: &str,
    ) -> std::result::Result<String, ChunkError> {
        let response = self
            .client
            .post(url.clone())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ChunkError::new(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(ChunkError::new(error_message(&body).unwrap_or_else(|| format!("HTTP {}", status.as_u16()))));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| ChunkError::new(format!("invalid response body: {}", e)))?;

        Ok(body
            .get(output_field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map_or_else(|| input.to_string(), str::to_string))
    }
}

/// `message` or `error.message` from an error body
fn error_message(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("error").and_then(|e| e.get("message")))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl ChunkTransformer for ServiceClient {
    async fn transform_chunk(
        &self,
        text: &str,
        target_language: &str,
        mode: TransformMode,
    ) -> std::result::Result<String, ChunkError> {
        match mode {
            TransformMode::Translate => self.translate(text, target_language).await,
            TransformMode::Transliterate => self.transliterate(text, target_language).await,
        }
    }

    fn name(&self) -> &str {
        self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;
    use crate::transform::{ChunkStatus, Orchestrator};
    use serde_json::json;
    use tokio_util::sync::CancellationToken;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ServiceClient {
        let config = ServiceConfig { base_url: server.uri(), ..ServiceConfig::new("test-key") };
        ServiceClient::new(config).unwrap()
    }

    #[test]
    fn test_service_config_default() {
        let config = ServiceConfig::default();
        assert_eq!(config.base_url, "https://api.sarvam.ai");
        assert_eq!(config.source_language, "en-IN");
        assert_eq!(config.model, "sarvam-translate:v1");
        assert_eq!(config.register, "formal");
        assert!(config.enable_preprocessing);
        assert_eq!(config.timeout, 30);
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ServiceConfig { base_url: "not a url".to_string(), ..Default::default() };
        assert!(matches!(ServiceClient::new(config), Err(VertitoError::InvalidUrl(_))));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ServiceConfig { timeout: 0, ..ServiceConfig::new("k") };
        assert!(matches!(ServiceClient::new(config), Err(VertitoError::ConfigError(_))));
    }

    #[test]
    fn test_endpoints_keep_base_path() {
        let config = ServiceConfig { base_url: "http://localhost:9000/api".to_string(), ..Default::default() };
        let client = ServiceClient::new(config).unwrap();
        assert_eq!(client.translate_url.as_str(), "http://localhost:9000/api/translate");
        assert_eq!(client.transliterate_url.as_str(), "http://localhost:9000/api/transliterate");
    }

    #[tokio::test]
    async fn test_translate_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .and(header(API_KEY_HEADER, "test-key"))
            .and(body_partial_json(json!({
                "input": "Hello",
                "source_language_code": "en-IN",
                "target_language_code": "hi-IN",
                "speaker_gender": "Male",
                "mode": "formal",
                "model": "sarvam-translate:v1",
                "enable_preprocessing": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "translated_text": "नमस्ते" })))
            .expect(1)
            .mount(&server)
            .await;

        let output = client_for(&server).translate("Hello", "hi-IN").await.unwrap();
        assert_eq!(output, "नमस्ते");
    }

    #[tokio::test]
    async fn test_transliterate_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transliterate"))
            .and(body_partial_json(json!({
                "input": "namaste",
                "source_language_code": "en-IN",
                "target_language_code": "hi-IN"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "transliterated_text": "नमस्ते" })))
            .mount(&server)
            .await;

        let output = client_for(&server)
            .transform_chunk("namaste", "hi-IN", TransformMode::Transliterate)
            .await
            .unwrap();
        assert_eq!(output, "नमस्ते");
    }

    #[tokio::test]
    async fn test_missing_output_field_returns_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/translate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "request_id": "abc" })))
            .mount(&server)
            .await;

        let output = client_for(&server).translate("Unchanged", "ta-IN").await.unwrap();
        assert_eq!(output, "Unchanged");
    }

    #[tokio::test]
    async fn test_error_message_from_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({ "message": "quota exceeded" })))
            .mount(&server)
            .await;

        let err = client_for(&server).translate("Hello", "hi-IN").await.unwrap_err();
        assert_eq!(err.reason, "quota exceeded");
    }

    #[tokio::test]
    async fn test_error_message_nested() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({ "error": { "message": "invalid subscription key" } })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).translate("Hello", "hi-IN").await.unwrap_err();
        assert_eq!(err.reason, "invalid subscription key");
    }

    #[tokio::test]
    async fn test_error_status_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).transliterate("Hello", "hi-IN").await.unwrap_err();
        assert_eq!(err.reason, "HTTP 503");
    }

    #[tokio::test]
    async fn test_alternate_client_sends_same_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transliterate"))
            .and(header(API_KEY_HEADER, "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "transliterated_text": "ok" })))
            .mount(&server)
            .await;

        let primary = client_for(&server);
        let alternate = primary.alternate().unwrap();

        assert_eq!(primary.name(), "primary");
        assert_eq!(alternate.name(), "alternate");
        assert_eq!(alternate.transliterate("x", "hi-IN").await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_orchestrated_fallback_over_http() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transliterate"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/transliterate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "transliterated_text": "फॉलबैक" })))
            .mount(&server)
            .await;

        let primary = client_for(&server);
        let orchestrator = Orchestrator::new(primary.clone()).with_fallback(primary.alternate().unwrap());
        let chunks = vec![Chunk { index: 0, paragraphs: 0..1, text: "fallback".to_string() }];

        let document = orchestrator
            .transform(&chunks, "hi-IN", TransformMode::Transliterate, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(document.results[0].status, ChunkStatus::FallbackUsed);
        assert_eq!(document.text(), "फॉलबैक");
    }
}
