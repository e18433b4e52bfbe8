//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command against `config_path`.
pub fn run_config(action: &ConfigAction, settings: Settings, config_path: PathBuf) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&redacted(settings))
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Init => {
            if config_path.exists() {
                Output::warning(&format!("Config already exists at {}", config_path.display()));
            } else {
                Settings::default().save_to(&config_path)?;
                Output::success(&format!("Created default config at {}", config_path.display()));
            }
        }

        ConfigAction::Path => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Settings safe to print: a configured API key is masked.
fn redacted(mut settings: Settings) -> Settings {
    if settings.llm.api_key.is_some() {
        settings.llm.api_key = Some("***".to_string());
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_masks_api_key() {
        let mut settings = Settings::default();
        settings.llm.api_key = Some("sk-secret".to_string());

        let shown = toml::to_string_pretty(&redacted(settings)).unwrap();
        assert!(!shown.contains("sk-secret"));
        assert!(shown.contains("***"));
    }

    #[test]
    fn test_init_writes_defaults_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        run_config(&ConfigAction::Init, Settings::default(), path.clone()).unwrap();
        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.chunking.chunk_size, 500);

        std::fs::write(&path, "[chunking]\nchunk_size = 42\noverlap = 2\n").unwrap();
        run_config(&ConfigAction::Init, Settings::default(), path.clone()).unwrap();
        let kept = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(kept.chunking.chunk_size, 42);
    }
}
