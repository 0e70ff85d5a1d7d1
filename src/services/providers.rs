// AI Provider Service
// OpenAI-compatible chat completion client shared by the rewriter and the detector

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;

use super::config_store::{ConfigStore, ProviderConfig};

pub const API_KEY_NAME: &str = "openai";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Missing content in response")]
    MissingContent,
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("API key not configured")]
    MissingApiKey,
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: i32,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    r#type: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessageResponse>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResult {
    pub content: String,
    pub latency_ms: i64,
}

/// Sampling options for a single chat call.
#[derive(Debug, Clone, Copy)]
pub struct ChatOptions {
    pub max_tokens: i32,
    pub temperature: f64,
    pub json_format: bool,
}

#[derive(Clone)]
pub struct ProviderClient {
    client: Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl ProviderClient {
    pub fn new(config: &ProviderConfig, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            url: config.base_url.clone(),
            model: config.model.clone(),
            api_key,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn chat(
        &self,
        system: &str,
        user: &str,
        options: ChatOptions,
    ) -> Result<ChatResult, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            response_format: options.json_format.then(|| ResponseFormat {
                r#type: "json_object".to_string(),
            }),
        };

        let start = Instant::now();

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let latency_ms = start.elapsed().as_millis() as i64;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        let content = first_content(data).ok_or(ProviderError::MissingContent)?;

        Ok(ChatResult { content, latency_ms })
    }
}

fn first_content(data: ChatResponse) -> Option<String> {
    data.choices?
        .into_iter()
        .next()?
        .message?
        .content
}

/// Get API key from environment or config file
pub fn get_api_key(store: Option<&ConfigStore>) -> Option<String> {
    for key in ["HUMANIZER_API_KEY", "OPENAI_API_KEY"] {
        if let Ok(val) = env::var(key) {
            let v = val.trim();
            if !v.is_empty() {
                return Some(v.to_string());
            }
        }
    }

    store
        .and_then(|s| s.get_api_key(API_KEY_NAME).ok().flatten())
        .filter(|k| !k.trim().is_empty())
}

/// Cut the first `{...}` block out of a model reply.
pub fn extract_json(content: &str) -> String {
    let trimmed = content.trim();
    if let Some(start) = trimmed.find('{') {
        if let Some(end) = trimmed.rfind('}') {
            if end > start {
                return trimmed[start..=end].to_string();
            }
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_content() {
        let data: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"Merhaba"}}]}"#).unwrap();
        assert_eq!(first_content(data), Some("Merhaba".to_string()));

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(first_content(empty), None);

        let missing: ChatResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(first_content(missing), None);
    }

    #[test]
    fn test_extract_json() {
        assert_eq!(extract_json("```json\n{\"probability\": 0.4}\n```"), "{\"probability\": 0.4}");
        assert_eq!(extract_json("  düz metin "), "düz metin");
    }

    #[tokio::test]
    async fn test_chat_without_key_fails_fast() {
        let client = ProviderClient::new(&ProviderConfig::default(), None);
        assert!(!client.has_api_key());
        let options = ChatOptions {
            max_tokens: 16,
            temperature: 0.0,
            json_format: false,
        };
        let err = client.chat("sys", "user", options).await.unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey));
    }
}
