use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Model parameters for a conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl ChatConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_output_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            temperature: Some(0.8),
            max_output_tokens: None,
        }
    }
}

/// Turn processor configuration
#[derive(Debug, Clone)]
pub struct TurnConfig {
    pub llm: ChatConfig,
    /// Ceiling on one generation call, streaming included
    pub generation_timeout: Duration,
}

impl TurnConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_llm(mut self, llm: ChatConfig) -> Self {
        self.llm = llm;
        self
    }

    pub fn with_generation_timeout(mut self, timeout: Duration) -> Self {
        self.generation_timeout = timeout;
        self
    }
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            llm: ChatConfig::default(),
            generation_timeout: Duration::from_secs(120),
        }
    }
}
