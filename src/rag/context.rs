//! Prompt assembly from retrieved chunks.

use crate::chunking::truncate_chars;
use crate::config::Prompts;
use crate::vector_store::SearchResult;
use std::collections::HashMap;

/// Separator placed between context chunks.
const CONTEXT_SEPARATOR: &str = "\n\n";

/// Renders retrieved chunks and a question into an LLM prompt.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    prompts: Prompts,
    max_context_chars_per_chunk: usize,
}

impl PromptAssembler {
    /// Create an assembler with the default template.
    pub fn new(max_context_chars_per_chunk: usize) -> Self {
        Self {
            prompts: Prompts::default(),
            max_context_chars_per_chunk,
        }
    }

    /// Use custom prompts (template and user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn max_context_chars_per_chunk(&self) -> usize {
        self.max_context_chars_per_chunk
    }

    /// Build the prompt. Results are used in the order given.
    pub fn assemble(&self, question: &str, results: &[SearchResult]) -> String {
        let context = format_context_for_prompt(results, self.max_context_chars_per_chunk);

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), context);

        self.prompts.render_with_custom(&self.prompts.rag.template, &vars)
    }
}

/// Assemble a prompt with the default template.
pub fn assemble(question: &str, results: &[SearchResult], max_context_chars_per_chunk: usize) -> String {
    PromptAssembler::new(max_context_chars_per_chunk).assemble(question, results)
}

/// Join truncated chunk texts with a blank line between them.
pub fn format_context_for_prompt(results: &[SearchResult], max_chars: usize) -> String {
    results
        .iter()
        .map(|r| truncate_chars(&r.chunk.text, max_chars))
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}
