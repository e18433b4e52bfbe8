//! Answer generation from an assembled prompt.

use crate::error::{Result, SubragError};
use crate::openai::{create_client, ApiKey};
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_trait::async_trait;
use tracing::{debug, info, instrument};

/// Turns a finished prompt into free text.
///
/// Retries and backoff, if any, belong to the implementation.
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// OpenAI chat-completions answer generator.
pub struct OpenAIGenerator {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIGenerator {
    /// Create a generator for `model` with temperature 0.
    pub fn new(api_key: &ApiKey, model: &str) -> Result<Self> {
        Ok(Self {
            client: create_client(api_key)?,
            model: model.to_string(),
            temperature: 0.0,
        })
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AnswerGenerator for OpenAIGenerator {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String> {
        info!("Requesting answer from {}", self.model);

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| SubragError::Provider(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .temperature(self.temperature)
            .build()
            .map_err(|e| SubragError::Provider(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SubragError::Provider(format!("Failed to generate response: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| SubragError::Provider("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated answer of {} chars", answer.len());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_creation() {
        let key = ApiKey::new("sk-test").unwrap();
        let generator = OpenAIGenerator::new(&key, "gpt-4o-mini")
            .unwrap()
            .with_temperature(0.2);

        assert_eq!(generator.model(), "gpt-4o-mini");
        assert_eq!(generator.temperature, 0.2);
    }
}
