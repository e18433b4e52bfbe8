//! Eva, the banking chat assistant.
//!
//! A plain multi-turn chat over the OpenAI API with a fixed system prompt.
//! It does not use the subtitle index.

use crate::config::Prompts;
use crate::error::{Result, SubragError};
use crate::openai::{create_client, ApiKey};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use tracing::{debug, instrument};

/// Title shown when the assistant starts.
pub const ASSISTANT_TITLE: &str = "Eva your banking assistant";

/// Reply to the connectivity check.
pub const HEALTH_CHECK_REPLY: &str = "Working success";

/// Messages kept in history, excluding the system prompt.
const MAX_HISTORY: usize = 20;

/// Banking assistant chat session.
pub struct BankingAssistant {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
    system_prompt: String,
    history: Vec<ChatCompletionRequestMessage>,
}

impl BankingAssistant {
    /// Create an assistant using the prompts' system message.
    pub fn new(api_key: &ApiKey, model: &str, prompts: &Prompts) -> Result<Self> {
        let system_prompt = prompts.render_with_custom(&prompts.assistant.system, &Default::default());
        Ok(Self {
            client: create_client(api_key)?,
            model: model.to_string(),
            temperature: 0.3,
            system_prompt,
            history: Vec::new(),
        })
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Number of messages currently remembered.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Forget the conversation.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Send a message and return Eva's reply.
    ///
    /// The user message is only kept in history if the call succeeds.
    #[instrument(skip(self, message))]
    pub async fn send(&mut self, message: &str) -> Result<String> {
        let user_message: ChatCompletionRequestMessage = ChatCompletionRequestUserMessageArgs::default()
            .content(message)
            .build()
            .map_err(|e| SubragError::Provider(e.to_string()))?
            .into();

        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system_prompt.clone())
                .build()
                .map_err(|e| SubragError::Provider(e.to_string()))?
                .into(),
        ];
        messages.extend(self.history.iter().cloned());
        messages.push(user_message.clone());

        debug!("Sending chat with {} messages", messages.len());

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| SubragError::Provider(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| SubragError::Provider(format!("Chat API error: {}", e)))?;

        let reply = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| SubragError::Provider("Empty response from LLM".to_string()))?
            .clone();

        let assistant_message = ChatCompletionRequestAssistantMessageArgs::default()
            .content(reply.clone())
            .build()
            .map_err(|e| SubragError::Provider(e.to_string()))?;

        self.history.push(user_message);
        self.history.push(assistant_message.into());
        trim_history(&mut self.history, MAX_HISTORY);

        Ok(reply)
    }
}

/// Keep only the most recent `max` messages.
fn trim_history<T>(history: &mut Vec<T>, max: usize) {
    if history.len() > max {
        history.drain(..history.len() - max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistant_creation() {
        let key = ApiKey::new("sk-test").unwrap();
        let mut prompts = Prompts::default();
        prompts.assistant.system = "You work for {{bank}}.".to_string();
        prompts.variables.insert("bank".to_string(), "Acme Bank".to_string());

        let assistant = BankingAssistant::new(&key, "gpt-4o-mini", &prompts).unwrap();
        assert_eq!(assistant.system_prompt, "You work for Acme Bank.");
        assert_eq!(assistant.history_len(), 0);
    }

    #[test]
    fn test_trim_history_keeps_latest() {
        let mut history: Vec<u32> = (0..25).collect();
        trim_history(&mut history, 20);
        assert_eq!(history.len(), 20);
        assert_eq!(history[0], 5);
        assert_eq!(history[19], 24);

        let mut short = vec![1, 2];
        trim_history(&mut short, 20);
        assert_eq!(short, vec![1, 2]);
    }
}
