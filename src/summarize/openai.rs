use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{SummarizeError, Summarizer};
use crate::config::OpenAiConfig;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat-completions client (OpenAI or any compatible endpoint).
pub struct OpenAiSummarizer {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl fmt::Debug for OpenAiSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiSummarizer")
            .field("api_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiSummarizer {
    /// Create a client from the `[openai]` settings and an API key.
    pub fn new(api_key: impl Into<String>, config: &OpenAiConfig) -> Result<Self, SummarizeError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SummarizeError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(SummarizeError::ClientBuild)?;

        Ok(Self {
            http,
            api_key,
            endpoint: format!("{}/chat/completions", config.api_url().trim_end_matches('/')),
            model: config.model().to_string(),
            temperature: config.temperature(),
            max_tokens: config.max_tokens(),
        })
    }

    fn request<'a>(&'a self, role: &'a str, instruction: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: role,
                },
                ChatMessage {
                    role: "user",
                    content: instruction,
                },
            ],
        }
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    #[instrument(skip_all, fields(model = %self.model, instruction_bytes = instruction.len()))]
    async fn summarize(&self, role: &str, instruction: &str) -> Result<String, SummarizeError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request(role, instruction))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(&body).unwrap_or_else(|| SummarizeError::Api {
                message: format!("status {status}: {body}"),
            }));
        }

        let text = extract_content(&body)?;
        debug!(answer_bytes = text.len(), "received completion");
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_content(body: &str) -> Result<String, SummarizeError> {
    let payload: ChatResponse = serde_json::from_str(body).map_err(|err| SummarizeError::Api {
        message: format!("invalid response: {err}"),
    })?;
    payload
        .choices
        .into_iter()
        .find_map(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(SummarizeError::EmptyResponse)
}

fn parse_api_error(body: &str) -> Option<SummarizeError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| SummarizeError::Api {
            message: payload.error.message,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_api_key() {
        let config = OpenAiConfig::default();
        assert!(matches!(
            OpenAiSummarizer::new("", &config),
            Err(SummarizeError::InvalidApiKey { .. })
        ));
        assert!(OpenAiSummarizer::new("  ", &config).is_err());
        assert!(OpenAiSummarizer::new("sk-test", &config).is_ok());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let client = OpenAiSummarizer::new("sk-secret", &OpenAiConfig::default()).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_request_shape() {
        let config = OpenAiConfig {
            api_url: Some("http://localhost:8080/v1/".to_string()),
            ..OpenAiConfig::default()
        };
        let client = OpenAiSummarizer::new("sk-test", &config).unwrap();
        assert_eq!(client.endpoint, "http://localhost:8080/v1/chat/completions");

        let json = serde_json::to_value(client.request("be brief", "hello")).unwrap();
        assert_eq!(json["model"], "gpt-4");
        assert_eq!(json["max_tokens"], 180);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], "be brief");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hello");
    }

    #[test]
    fn test_extract_content() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"Fixed the crash."}}]}"#;
        assert_eq!(extract_content(body).unwrap(), "Fixed the crash.");
    }

    #[test]
    fn test_extract_content_empty() {
        assert!(matches!(extract_content(r#"{"choices":[]}"#), Err(SummarizeError::EmptyResponse)));
        let blank = r#"{"choices":[{"message":{"content":"  "}}]}"#;
        assert!(matches!(extract_content(blank), Err(SummarizeError::EmptyResponse)));
    }

    #[test]
    fn test_parse_api_error() {
        let err = parse_api_error(r#"{"error":{"message":"Rate limit reached","type":"requests"}}"#).unwrap();
        assert_eq!(err.to_string(), "API error: Rate limit reached");
        assert!(parse_api_error("<html>").is_none());
    }
}
