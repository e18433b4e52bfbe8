//! Shared construction helpers for CLI commands.

use crate::cli::present::{notice_for_error, Reported};
use crate::config::{Prompts, Settings};
use crate::error::{Result, SubragError};
use crate::loader::SrtLoader;
use crate::openai::ApiKey;
use crate::pipeline::Pipeline;
use crate::rag::OpenAIGenerator;

/// Load prompt templates from the configured directory.
pub(super) fn load_prompts(settings: &Settings) -> Result<Prompts> {
    Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )
}

/// Build the pipeline described by the settings.
pub(super) fn build_pipeline(settings: &Settings, api_key: Option<&ApiKey>) -> Result<Pipeline> {
    let prompts = load_prompts(settings)?;
    Pipeline::from_settings(settings, prompts, api_key)
}

/// Loader for an explicit path, or the configured one.
pub(super) fn subtitle_loader(settings: &Settings, path: Option<&str>) -> SrtLoader {
    let path = match path {
        Some(p) => Settings::expand_path(p),
        None => settings.subtitle_path(),
    };
    SrtLoader::new(path, settings.loader.granularity)
}

/// Answer generator for the configured (or overridden) model.
pub(super) fn answer_generator(
    settings: &Settings,
    api_key: Option<&ApiKey>,
    model: Option<&str>,
) -> Result<OpenAIGenerator> {
    let key = api_key.ok_or(SubragError::MissingApiKey)?;
    let model = model.unwrap_or(&settings.llm.model);
    Ok(OpenAIGenerator::new(key, model)?.with_temperature(settings.llm.temperature))
}

/// Show the user-facing notice for `err` and hand it on as the command's
/// failure, marked so `main` does not print it a second time.
pub(super) fn report(err: SubragError) -> anyhow::Error {
    notice_for_error(&err).emit();
    Reported(err).into()
}
