// Gemini-specific client implementation

use crate::streaming::{parse_sse_stream, StreamCandidate, StreamEvent, UsageMetadata};
use crate::traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse};
use crate::types::{Content, Message};
use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::Stream;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::pin::Pin;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini client (HTTP direct, no SDK)
pub struct GeminiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    /// Create new client with API key
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, GEMINI_API_BASE)
    }

    /// Create new client against a custom endpoint (useful for testing)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&api_key).context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
        })
    }

    /// Build generateContent request payload
    ///
    /// System messages go into the dedicated systemInstruction field; the
    /// remaining conversation maps to user/model contents.
    pub fn build_generate_request(messages: Vec<Message>, options: &ChatOptions) -> Value {
        let mut system_parts: Vec<Value> = Vec::new();
        let mut contents: Vec<Value> = Vec::new();

        for message in messages {
            match message {
                Message::System { content } => {
                    system_parts.push(serde_json::json!({ "text": content.into_text() }));
                }
                Message::Human { content } => {
                    contents.push(Self::convert_content("user", content));
                }
                Message::AI { content } => {
                    contents.push(Self::convert_content("model", content));
                }
            }
        }

        let mut request = serde_json::json!({ "contents": contents });
        let obj = request.as_object_mut().unwrap();

        if !system_parts.is_empty() {
            obj.insert(
                "systemInstruction".to_string(),
                serde_json::json!({ "parts": system_parts }),
            );
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(temp) = options.temperature {
            generation_config.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = options.max_output_tokens {
            generation_config.insert("maxOutputTokens".to_string(), serde_json::json!(max_tokens));
        }
        if !generation_config.is_empty() {
            obj.insert(
                "generationConfig".to_string(),
                Value::Object(generation_config),
            );
        }

        request
    }

    fn convert_content(role: &str, content: Content) -> Value {
        serde_json::json!({
            "role": role,
            "parts": [{ "text": content.into_text() }],
        })
    }

    fn generate_url(&self, model: &str, stream: bool) -> String {
        if stream {
            format!(
                "{}/models/{}:streamGenerateContent?alt=sse",
                self.base_url, model
            )
        } else {
            format!("{}/models/{}:generateContent", self.base_url, model)
        }
    }
}

#[async_trait]
impl ChatClient for GeminiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = self.generate_url(&request.model, false);
        let payload = Self::build_generate_request(request.messages, &request.options);

        let response = self
            .http_client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .context("Failed to send generateContent request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({}): {}", status, body);
        }

        let raw: Value = response
            .json()
            .await
            .context("Failed to read generateContent response")?;

        let parsed: GenerateContentResponse = serde_json::from_value(raw.clone())
            .context("Unexpected generateContent response shape")?;

        let finish_reason = parsed.finish_reason().map(str::to_string);
        Ok(ChatResponse {
            content: parsed.text(),
            usage: parsed.usage_metadata.map(Into::into),
            finish_reason,
            raw,
        })
    }

    async fn chat_stream(
        &self,
        request: ChatRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>> {
        let url = self.generate_url(&request.model, true);
        let payload = Self::build_generate_request(request.messages, &request.options);

        tracing::debug!(model = %request.model, "Starting Gemini stream");

        let response = self
            .http_client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .context("Failed to send streamGenerateContent request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({}): {}", status, body);
        }

        Ok(parse_sse_stream(response))
    }
}

/// Full (non-streaming) generateContent response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<StreamCandidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if any
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }
}
