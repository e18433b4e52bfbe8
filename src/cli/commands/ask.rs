//! Ask command implementation.

use super::retrieve::{indexed_session, retrieve_into};
use super::setup::{answer_generator, report};
use crate::cli::present::{self, notice_for_error};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::SubragError;
use crate::openai::ApiKey;
use anyhow::Result;

/// Run the ask command: retrieve context, then have the LLM answer from it.
///
/// Without an API key the assembled prompt is printed instead, so the
/// retrieval half still works offline.
pub async fn run_ask(
    question: &str,
    path: Option<String>,
    top_k: Option<usize>,
    model: Option<String>,
    api_key: Option<ApiKey>,
    settings: Settings,
) -> Result<()> {
    let top_k = top_k.unwrap_or(settings.retrieval.top_k);
    let (pipeline, mut session) = indexed_session(&settings, path.as_deref(), api_key.as_ref()).await?;
    let retrieval = retrieve_into(&pipeline, &mut session, question, top_k).await?;

    let generator = match answer_generator(&settings, api_key.as_ref(), model.as_deref()) {
        Ok(generator) => generator,
        Err(SubragError::MissingApiKey) => {
            notice_for_error(&SubragError::MissingApiKey).emit();
            present::show_retrieval(&retrieval, settings.retrieval.preview_chars);
            return Ok(());
        }
        Err(e) => return Err(report(e)),
    };

    if retrieval.prompt.is_none() {
        present::show_retrieval(&retrieval, settings.retrieval.preview_chars);
        return Ok(());
    }

    let spinner = Output::spinner("Generating answer...");
    let outcome = pipeline.generate(&mut session, &generator).await;
    spinner.finish_and_clear();
    let answer = outcome.map_err(report)?;

    present::show_answer(&answer);

    Output::header("Sources");
    for (i, result) in retrieval.results.iter().enumerate() {
        Output::chunk_result(i, result.score, &result.chunk.text, 100);
    }

    Ok(())
}
