use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config;

use super::ExtractionError;

/// Low temperature keeps the structured output stable across retries.
const TEMPERATURE: f32 = 0.1;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Abstraction over the chat-completion backend so the orchestrator can be
/// tested without network access.
pub trait LlmClient: Send + Sync {
    /// Run one chat completion and return the raw assistant message body.
    fn complete(&self, model: &str, system: &str, user: &str) -> Result<String, ExtractionError>;
}

/// OpenAI-compatible chat-completions client for the Groq API.
pub struct GroqClient {
    base_url: String,
    api_key: String,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl GroqClient {
    pub fn new(base_url: String, api_key: String, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout_secs,
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Build a client from the environment. Returns `None` when no API key
    /// is set, which callers treat as "extraction unconfigured".
    pub fn from_env() -> Option<Self> {
        let api_key = config::api_key()?;
        Some(Self::new(config::base_url(), api_key, DEFAULT_TIMEOUT_SECS))
    }
}

impl LlmClient for GroqClient {
    fn complete(&self, model: &str, system: &str, user: &str) -> Result<String, ExtractionError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        tracing::debug!(model, url = %url, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractionError::Timeout(self.timeout_secs)
                } else if e.is_connect() {
                    ExtractionError::Connection(self.base_url.clone())
                } else {
                    ExtractionError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractionError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| ExtractionError::JsonParsing(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ExtractionError::EmptyResponse);
        }

        Ok(content)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Scripted client for tests: returns canned bodies or a canned error.
#[cfg(test)]
pub struct MockLlmClient {
    response: Result<String, fn() -> ExtractionError>,
}

#[cfg(test)]
impl MockLlmClient {
    pub fn replying(body: &str) -> Self {
        Self {
            response: Ok(body.to_string()),
        }
    }

    pub fn failing(make_error: fn() -> ExtractionError) -> Self {
        Self {
            response: Err(make_error),
        }
    }
}

#[cfg(test)]
impl LlmClient for MockLlmClient {
    fn complete(&self, _model: &str, _system: &str, _user: &str) -> Result<String, ExtractionError> {
        match &self.response {
            Ok(body) => Ok(body.clone()),
            Err(make_error) => Err(make_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_wire_shape() {
        let request = ChatRequest {
            model: "llama-3.3-70b-versatile",
            messages: vec![ChatMessage {
                role: "system",
                content: "extract",
            }],
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][0]["role"], "system");
        assert!((json["temperature"].as_f64().unwrap() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn response_parsing_reads_first_choice() {
        let body = r#"{"choices":[{"message":{"content":"{\"actionItems\":[]}"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap();
        assert_eq!(content, r#"{"actionItems":[]}"#);
    }

    #[test]
    fn trailing_slash_in_base_url_is_normalized() {
        let client = GroqClient::new("https://api.example.com/v1/".into(), "key".into(), 5);
        assert_eq!(client.base_url, "https://api.example.com/v1");
    }
}
