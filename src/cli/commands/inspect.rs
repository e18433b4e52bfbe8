//! Inspect command implementation.

use super::setup::{build_pipeline, report, subtitle_loader};
use crate::cli::present;
use crate::config::Settings;
use crate::session::Session;
use anyhow::Result;

/// Load and chunk a subtitle file and show what came out of it.
pub fn run_inspect(path: Option<String>, settings: Settings) -> Result<()> {
    let pipeline = build_pipeline(&settings, None).map_err(report)?;
    let loader = subtitle_loader(&settings, path.as_deref());

    let mut session = Session::new();
    let (load, chunks) = pipeline.load_and_chunk(&mut session, &loader).map_err(report)?;

    present::show_load(&load, chunks.as_ref(), settings.retrieval.preview_chars);
    Ok(())
}
