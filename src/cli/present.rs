//! Translation of pipeline outcomes and failures into user-facing messages.
//!
//! Every front-end routes errors through [`notice_for_error`], so each failure
//! kind has exactly one wording.

use super::Output;
use crate::error::SubragError;
use crate::pipeline::{ChunkReport, IndexReport, LoadReport, RetrievalReport};
use crate::session::Action;

/// An error whose notice has already been shown to the user.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct Reported(pub SubragError);

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A message for the user, with an optional follow-up hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub hint: Option<String>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            hint: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Print the notice.
    pub fn emit(&self) {
        match self.level {
            NoticeLevel::Info => Output::info(&self.message),
            NoticeLevel::Success => Output::success(&self.message),
            NoticeLevel::Warning => Output::warning(&self.message),
            NoticeLevel::Error => Output::error(&self.message),
        }
        if let Some(hint) = &self.hint {
            Output::caption(hint);
        }
    }
}

/// Map any error to the message shown to the user.
pub fn notice_for_error(err: &SubragError) -> Notice {
    match err {
        SubragError::StageNotReady(action) => notice_for_guard(*action),
        SubragError::IndexNotReady => notice_for_guard(Action::Retrieve),
        SubragError::EmptyIndex => {
            Notice::warning("There are no chunks to index.").with_hint("Load a subtitle file with some text first.")
        }
        SubragError::Configuration(msg) => Notice::error(format!("Configuration error: {}", msg)),
        SubragError::LoadFailure(msg) => Notice::error(format!("Failed to load file: {}", msg)).with_hint(
            "Hints: ensure the path is correct, file is a valid .srt, and you have read permissions.",
        ),
        SubragError::EmbeddingUnavailable(msg) => {
            Notice::error(format!("Failed to create embeddings/vectorstore: {}", msg))
        }
        SubragError::DimensionMismatch { .. } => Notice::error(format!("Retrieval failed: {}", err))
            .with_hint("Rebuild the index after changing the embedding settings."),
        SubragError::Provider(msg) => Notice::error(format!("LLM request failed: {}", msg)),
        SubragError::MissingApiKey => Notice::warning("Please enter your OpenAI API key")
            .with_hint("Use the 'key' command, --api-key, or set OPENAI_API_KEY."),
        SubragError::InvalidInput(msg) => Notice::warning(msg.clone()),
        SubragError::Io(_) | SubragError::Json(_) | SubragError::TomlParse(_) => {
            Notice::error(err.to_string())
        }
    }
}

/// The message shown when `action` is triggered too early.
pub fn notice_for_guard(action: Action) -> Notice {
    match action {
        Action::Load => Notice::info("Load is always available."),
        Action::Chunk => Notice::info("first load a subtitle file above"),
        Action::BuildIndex => Notice::info("first load and run chunk above"),
        Action::Retrieve => Notice::warning("first create embeddings + vectorstore above"),
        Action::Generate => Notice::warning("Please perform retrieval first to generate the RAG prompt."),
    }
}

/// Notices for a finished load, or `None` when the chunk report says it all.
pub fn notice_for_load(report: &LoadReport) -> Option<Notice> {
    if report.documents == 0 {
        Some(
            Notice::warning("Loaded but no documents were returned (0 items).")
                .with_hint("Check the file content."),
        )
    } else {
        None
    }
}

/// Print the load and chunk outcome.
pub fn show_load(load: &LoadReport, chunks: Option<&ChunkReport>, preview_chars: usize) {
    if let Some(notice) = notice_for_load(load) {
        notice.emit();
        return;
    }

    Output::kv("Source", &load.source);
    Output::kv("Documents", &load.documents.to_string());

    if let Some(report) = chunks {
        show_chunks(report, preview_chars);
    }
}

/// Print the chunk outcome with a preview of the first chunk.
pub fn show_chunks(report: &ChunkReport, preview_chars: usize) {
    Notice::success("ok, chunks created successfully.").emit();
    Output::kv("Total chunks", &report.chunks.to_string());
    Output::caption(&format!(
        "Chunk size: {}, overlap: {}",
        report.chunk_size, report.overlap
    ));

    if let Some(first) = &report.first_chunk {
        Output::header("First chunk");
        Output::block(&first.preview(preview_chars));
    }
}

/// Print the index outcome.
pub fn show_index(report: &IndexReport) {
    Notice::success("ok, vectorstore created successfully.").emit();
    Output::kv("Indexed chunks", &report.entries.to_string());
    Output::kv("Dimensions", &report.dimensions.to_string());
}

/// Print retrieved chunks and the assembled prompt.
pub fn show_retrieval(report: &RetrievalReport, preview_chars: usize) {
    Output::info(&format!("Retrieved {} results:", report.results.len()));
    for (i, result) in report.results.iter().enumerate() {
        Output::chunk_result(i, result.score, &result.chunk.text, preview_chars);
    }

    match &report.prompt {
        Some(prompt) => {
            Output::header("RAG prompt");
            Output::block(prompt);
        }
        None => Notice::warning("Nothing was retrieved, so no RAG prompt was built.").emit(),
    }
}

/// Print a generated answer.
pub fn show_answer(answer: &str) {
    Output::header("LLM Response");
    println!("\n{}\n", answer);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_documents_warning() {
        let report = LoadReport {
            source: "sample.srt".to_string(),
            documents: 0,
        };
        let notice = notice_for_load(&report).unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, "Loaded but no documents were returned (0 items).");

        let loaded = LoadReport {
            source: "sample.srt".to_string(),
            documents: 3,
        };
        assert!(notice_for_load(&loaded).is_none());
    }

    #[test]
    fn test_retrieve_before_index_warning() {
        let notice = notice_for_error(&SubragError::IndexNotReady);
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, "first create embeddings + vectorstore above");
    }

    #[test]
    fn test_guard_messages() {
        let notice = notice_for_error(&SubragError::StageNotReady(Action::BuildIndex));
        assert_eq!(notice.message, "first load and run chunk above");

        let notice = notice_for_error(&SubragError::StageNotReady(Action::Generate));
        assert_eq!(notice.message, "Please perform retrieval first to generate the RAG prompt.");
    }

    #[test]
    fn test_load_failure_has_hint() {
        let notice = notice_for_error(&SubragError::LoadFailure("missing.srt: not found".to_string()));
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Failed to load file: missing.srt: not found");
        assert!(notice.hint.unwrap().contains("valid .srt"));
    }

    #[test]
    fn test_missing_question_and_key() {
        let notice = notice_for_error(&SubragError::InvalidInput("Please enter a question first.".to_string()));
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, "Please enter a question first.");

        let notice = notice_for_error(&SubragError::MissingApiKey);
        assert_eq!(notice.message, "Please enter your OpenAI API key");
    }
}
