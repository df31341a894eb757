// Configuration layer for provider-agnostic client creation

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for the Gemini provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Base URL for the Generative Language API (optional, defaults to the
    /// public v1beta endpoint)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Factory for creating chat clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    /// Create a chat client from provider configuration
    pub fn create_chat_client(config: GeminiConfig) -> Result<Arc<dyn crate::traits::ChatClient>> {
        let client = match config.base_url {
            Some(base_url) => crate::gemini::GeminiClient::with_base_url(config.api_key, base_url)?,
            None => crate::gemini::GeminiClient::new(config.api_key)?,
        };
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_config() {
        let config = GeminiConfig::new("test-key");
        assert_eq!(config.api_key, "test-key");
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_gemini_config_with_base_url() {
        let config = GeminiConfig::new("test-key").with_base_url("http://localhost:8080");
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = GeminiConfig::new("test-key").with_base_url("http://localhost:8080");

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: GeminiConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.api_key, deserialized.api_key);
        assert_eq!(config.base_url, deserialized.base_url);
    }
}
