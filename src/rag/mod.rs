//! RAG (Retrieval-Augmented Generation) prompt assembly and answer generation.

pub mod context;
mod response;

pub use context::{assemble, format_context_for_prompt, PromptAssembler};
pub use response::{AnswerGenerator, OpenAIGenerator};
