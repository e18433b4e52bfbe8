//! Retrieve command implementation.

use super::setup::{build_pipeline, report, subtitle_loader};
use crate::cli::present::{self, Reported};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::SubragError;
use crate::openai::ApiKey;
use crate::pipeline::{Pipeline, RetrievalReport};
use crate::session::Session;
use anyhow::Result;

/// Load, chunk and index a subtitle file in one go.
pub(super) async fn indexed_session(
    settings: &Settings,
    path: Option<&str>,
    api_key: Option<&ApiKey>,
) -> Result<(Pipeline, Session)> {
    let pipeline = build_pipeline(settings, api_key).map_err(report)?;
    index_file(pipeline, settings, path).await
}

/// Load, chunk and index with an existing pipeline.
async fn index_file(
    pipeline: Pipeline,
    settings: &Settings,
    path: Option<&str>,
) -> Result<(Pipeline, Session)> {
    let loader = subtitle_loader(settings, path);

    let mut session = Session::new();
    let (load, _) = pipeline.load_and_chunk(&mut session, &loader).map_err(report)?;
    if let Some(notice) = present::notice_for_load(&load) {
        notice.emit();
        return Err(Reported(SubragError::EmptyIndex).into());
    }

    let spinner = Output::spinner("Creating embeddings + vectorstore...");
    let outcome = pipeline.build_index(&mut session).await;
    spinner.finish_and_clear();
    outcome.map_err(report)?;

    Ok((pipeline, session))
}

/// Retrieve context for `question` from an indexed session.
pub(super) async fn retrieve_into(
    pipeline: &Pipeline,
    session: &mut Session,
    question: &str,
    top_k: usize,
) -> Result<RetrievalReport> {
    pipeline
        .retrieve(session, question, top_k)
        .await
        .map_err(report)
}

/// Run the retrieve command: print the retrieved chunks and the RAG prompt.
pub async fn run_retrieve(
    question: &str,
    path: Option<String>,
    top_k: Option<usize>,
    api_key: Option<ApiKey>,
    settings: Settings,
) -> Result<()> {
    let top_k = top_k.unwrap_or(settings.retrieval.top_k);
    let (pipeline, mut session) = indexed_session(&settings, path.as_deref(), api_key.as_ref()).await?;

    let retrieval = retrieve_into(&pipeline, &mut session, question, top_k).await?;
    present::show_retrieval(&retrieval, settings.retrieval.preview_chars);
    Ok(())
}
