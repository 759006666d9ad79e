use crate::config::{Config, HttpConfig};
use crate::error::ChatError;
use crate::llm::ChatModel;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Client for the Gemini generateContent API
pub struct GeminiClient {
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f64>,
    max_output_tokens: Option<i64>,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    models: Option<Vec<ModelInfo>>,
}

/// One entry of the models listing
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl GeminiClient {
    /// Create a client against the given endpoint with an already-resolved key
    pub fn new(endpoint: &str, model: &str, api_key: Option<String>, http: &HttpConfig) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            temperature: None,
            max_output_tokens: None,
            client: Client::builder()
                .timeout(Duration::from_secs(http.timeout_secs))
                .connect_timeout(Duration::from_secs(http.connect_timeout_secs))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Create a client from the application config.
    /// The API key comes from GEMINI_API_KEY or the [gemini] section.
    pub fn from_config(config: &Config) -> Self {
        let mut client = Self::new(
            &config.gemini.endpoint,
            &config.gemini.model,
            config.gemini_api_key(),
            &config.http,
        );
        client.temperature = config.gemini.temperature;
        client.max_output_tokens = config.gemini.max_output_tokens;
        client
    }

    /// The model name requests are sent to
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether a credential is available without sending anything
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// List the models the endpoint advertises
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, ChatError> {
        let api_key = self.api_key.as_ref().ok_or(ChatError::MissingCredential)?;
        let url = format!("{}/v1beta/models?key={}", self.endpoint, api_key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let result: ListModelsResponse = response
            .json()
            .await
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;

        Ok(result.models.unwrap_or_default())
    }

    fn generation_config(&self) -> Option<GenerationConfig> {
        if self.temperature.is_none() && self.max_output_tokens.is_none() {
            return None;
        }
        Some(GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        })
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn answer(&self, context: &str, question: &str) -> Result<String, ChatError> {
        let api_key = self.api_key.as_ref().ok_or(ChatError::MissingCredential)?;

        let prompt = format!("{}\n\n{}", context, question);
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: self.generation_config(),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.endpoint, self.model, api_key
        );

        debug!(model = %self.model, "sending generateContent request");
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Http {
                status: status.as_u16(),
                body,
            });
        }

        // A 2xx body that does not decode carries no candidate either
        let result: GenerateContentResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("failed to decode generation response: {}", e);
                return Err(ChatError::NoCandidate);
            }
        };

        result
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts)
            .and_then(|parts| parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or(ChatError::NoCandidate)
    }
}

fn transport_error(e: reqwest::Error) -> ChatError {
    if e.is_timeout() {
        ChatError::Timeout
    } else {
        ChatError::Connect(e.to_string())
    }
}
