//! Prompt templates for Subrag.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use crate::error::{Result, SubragError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub rag: RagPrompts,
    pub assistant: AssistantPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompt used to turn retrieved subtitle chunks into an LLM request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagPrompts {
    pub template: String,
}

impl Default for RagPrompts {
    fn default() -> Self {
        Self {
            template: r#"Use only the context below to answer the question.
context:
{{context}}
question: {{question}}
if the answer is not contained within the context, respond with 'I don't know.'"#
                .to_string(),
        }
    }
}

/// Prompts for the Eva banking assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantPrompts {
    pub system: String,
}

impl Default for AssistantPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are Eva, a friendly banking assistant.

Guidelines:
- Help with general questions about accounts, cards, transfers and savings
- Never ask for or repeat passwords, PINs, card numbers or one-time codes
- You cannot see the user's accounts; say so when a question needs account data
- Suggest contacting the bank directly for disputes, fraud or anything urgent
- Keep answers short and plain"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let rag_path = custom_path.join("rag.toml");
            if rag_path.exists() {
                let content = std::fs::read_to_string(&rag_path)?;
                prompts.rag = toml::from_str(&content)?;
            }

            let assistant_path = custom_path.join("assistant.toml");
            if assistant_path.exists() {
                let content = std::fs::read_to_string(&assistant_path)?;
                prompts.assistant = toml::from_str(&content)?;
            }
        }

        prompts.validate()?;
        Ok(prompts)
    }

    /// The RAG template must place both the context and the question.
    pub fn validate(&self) -> Result<()> {
        for placeholder in ["{{context}}", "{{question}}"] {
            if !self.rag.template.contains(placeholder) {
                return Err(SubragError::Configuration(format!(
                    "RAG prompt template is missing the {} placeholder",
                    placeholder
                )));
            }
        }
        Ok(())
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is a single left-to-right pass: text inserted for one
    /// placeholder is never scanned again, and unknown placeholders are kept verbatim.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find("{{") {
            result.push_str(&rest[..open]);
            let after_open = &rest[open + 2..];
            match after_open.find("}}") {
                Some(close) => {
                    let key = &after_open[..close];
                    match vars.get(key.trim()) {
                        Some(value) => result.push_str(value),
                        None => {
                            result.push_str("{{");
                            result.push_str(key);
                            result.push_str("}}");
                        }
                    }
                    rest = &after_open[close + 2..];
                }
                None => {
                    result.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
