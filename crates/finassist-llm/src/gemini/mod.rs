mod client;

pub use client::{GeminiClient, GenerateContentResponse};
