//! Reasoning service clients.
//!
//! Every pipeline stage goes through [`ReasoningService::generate`]. The
//! concrete client is chosen from config and built once per process by
//! [`LazyReasoning`].

use crate::config::{AgentConfig, Config, ConfigError};
use async_trait::async_trait;
use reqwest::StatusCode;
use rstructor::LLMClient;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::OnceCell;

#[derive(Error, Debug)]
pub enum ReasoningError {
    #[error("LLM request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("LLM provider rejected the credentials ({0})")]
    Unauthorized(StatusCode),
    #[error("LLM provider rate limit exceeded")]
    RateLimited,
    #[error("LLM provider returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("LLM provider error: {0}")]
    Provider(String),
}

/// Pipeline stage issuing a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Framework,
    Core,
    Layers,
    Structure,
    CounterArgument,
    Steelman,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Framework => "framework",
            Stage::Core => "core",
            Stage::Layers => "layers",
            Stage::Structure => "structure",
            Stage::CounterArgument => "counter_argument",
            Stage::Steelman => "steelman",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which configured model serves a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// Small, cheap model for discrete classification
    Classifier,
    /// Full model for every writing stage
    Full,
}

/// Generation parameters for a single request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub stage: Stage,
    pub model: ModelTier,
    pub temperature: f32,
    pub max_output_tokens: u32,
    /// Ask the provider for a JSON object instead of prose
    pub structured_output: bool,
}

/// A text-generation capability shared by all pipeline stages
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Generate a completion for `prompt`. An empty reply is returned as-is.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ReasoningError>;
}

/// Build the client for the configured provider
pub fn build_client(config: &Config) -> Result<Arc<dyn ReasoningService>, ConfigError> {
    let api_key = config.api_key()?;
    match config.agent.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiClient::new(api_key, &config.agent))),
        "gemini" => Ok(Arc::new(GeminiClient::new(api_key, &config.agent)?)),
        other => Err(ConfigError::UnknownProvider(other.to_string())),
    }
}

/// Process-wide reasoning client, built on first use.
///
/// Concurrent first calls build at most one client. A build failure is not
/// cached, so a later call can succeed once credentials are present.
pub struct LazyReasoning {
    config: Config,
    cell: OnceCell<Arc<dyn ReasoningService>>,
}

impl LazyReasoning {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cell: OnceCell::new(),
        }
    }

    /// Wrap an already-built client
    pub fn ready(client: Arc<dyn ReasoningService>) -> Self {
        Self {
            config: Config::default(),
            cell: OnceCell::new_with(Some(client)),
        }
    }

    pub async fn get(&self) -> Result<Arc<dyn ReasoningService>, ConfigError> {
        let client = self
            .cell
            .get_or_try_init(|| async {
                tracing::info!(provider = %self.config.agent.provider, "initialising reasoning client");
                build_client(&self.config)
            })
            .await?;
        Ok(Arc::clone(client))
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

/// Client for OpenAI-compatible chat completion endpoints
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    classifier_model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(api_key: &str, agent: &AgentConfig) -> Self {
        // Builder only fails when the TLS backend cannot initialise
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(agent.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_key: api_key.to_string(),
            base_url: agent.base_url.trim_end_matches('/').to_string(),
            model: agent.model.clone(),
            classifier_model: agent.classifier_model.clone(),
        }
    }

    fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Classifier => &self.classifier_model,
            ModelTier::Full => &self.model,
        }
    }
}

#[async_trait]
impl ReasoningService for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ReasoningError> {
        let request = ChatRequest {
            model: self.model_for(options.model),
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: options.temperature,
            max_tokens: options.max_output_tokens,
            response_format: options.structured_output.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ReasoningError::Unauthorized(status)
                }
                StatusCode::TOO_MANY_REQUESTS => ReasoningError::RateLimited,
                _ => ReasoningError::Status {
                    status,
                    body: response.text().await.unwrap_or_default(),
                },
            });
        }

        let body: ChatResponse = response.json().await?;
        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

/// Gemini client backed by rstructor
///
/// One rstructor client per model tier, sharing a connection pool. Each call
/// clones the tier's client and applies the stage's sampling settings.
pub struct GeminiClient {
    full: rstructor::GeminiClient,
    classifier: rstructor::GeminiClient,
}

impl GeminiClient {
    pub fn new(api_key: &str, agent: &AgentConfig) -> Result<Self, ConfigError> {
        let base = rstructor::GeminiClient::new(api_key)
            .map_err(|e| ConfigError::ClientInit(e.to_string()))?
            .timeout(Duration::from_secs(agent.timeout_secs));
        Ok(Self {
            full: base.clone().model(agent.model.as_str()),
            classifier: base.model(agent.classifier_model.as_str()),
        })
    }

    fn client_for(&self, tier: ModelTier) -> &rstructor::GeminiClient {
        match tier {
            ModelTier::Classifier => &self.classifier,
            ModelTier::Full => &self.full,
        }
    }
}

#[async_trait]
impl ReasoningService for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> Result<String, ReasoningError> {
        let client = self
            .client_for(options.model)
            .clone()
            .temperature(options.temperature)
            .max_tokens(options.max_output_tokens);

        let result = client
            .generate_with_metadata(prompt)
            .await
            .map_err(|e| ReasoningError::Provider(e.to_string()))?;

        Ok(result.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_key(provider: &str, key: Option<&str>) -> Config {
        let mut config = Config::default();
        config.agent.provider = provider.to_string();
        match provider {
            "gemini" => config.api.gemini_key = key.map(str::to_string),
            _ => config.api.openai_key = key.map(str::to_string),
        }
        config
    }

    #[tokio::test]
    async fn missing_key_fails_fast_and_is_not_cached() {
        let lazy = LazyReasoning::new(config_with_key("openai", None));
        let err = lazy.get().await.err().expect("expected a configuration error");
        assert!(matches!(err, ConfigError::MissingApiKey(p) if p == "openai"));
        assert!(!lazy.is_initialized());
    }

    #[tokio::test]
    async fn client_is_built_once_and_shared() {
        let lazy = LazyReasoning::new(config_with_key("openai", Some("sk-test")));
        let first = lazy.get().await.unwrap();
        let second = lazy.get().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(lazy.is_initialized());
    }

    #[tokio::test]
    async fn concurrent_first_calls_share_one_client() {
        let lazy = LazyReasoning::new(config_with_key("openai", Some("sk-test")));
        let (first, second) = tokio::join!(lazy.get(), lazy.get());
        assert!(Arc::ptr_eq(&first.unwrap(), &second.unwrap()));
    }

    #[tokio::test]
    async fn gemini_client_accepts_any_model_name() {
        let mut config = config_with_key("gemini", Some("gemini-test"));
        config.agent.model = "gemini-2.5-pro".to_string();
        config.agent.classifier_model = "gemini-experimental-lite".to_string();
        let lazy = LazyReasoning::new(config);
        assert!(lazy.get().await.is_ok());
        assert!(lazy.is_initialized());
    }

    #[test]
    fn chat_request_only_asks_for_json_when_structured() {
        let request = ChatRequest {
            model: "gpt-4o",
            messages: [ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.0,
            max_tokens: 10,
            response_format: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("response_format").is_none());
        assert_eq!(value["messages"][0]["role"], "user");

        let request = ChatRequest {
            response_format: Some(ResponseFormat { kind: "json_object" }),
            ..request
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["response_format"]["type"], "json_object");
    }

    #[test]
    fn missing_choice_content_is_empty() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"role": "assistant"}}]}"#).unwrap();
        let text = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        assert_eq!(text, "");
    }

    #[test]
    fn openai_client_picks_model_by_tier() {
        let agent = AgentConfig::default();
        let client = OpenAiClient::new("sk-test", &agent);
        assert_eq!(client.model_for(ModelTier::Classifier), "gpt-4o-mini");
        assert_eq!(client.model_for(ModelTier::Full), "gpt-4o");
    }
}
