//! CLI module for Subrag.

pub mod commands;
mod output;
pub mod present;

pub use output::Output;

use crate::openai::ApiKey;
use clap::{Parser, Subcommand};

/// Subrag - ask questions about subtitle files
///
/// Loads a SubRip (.srt) file, splits it into overlapping chunks, indexes them
/// in memory and answers questions using only the retrieved context.
#[derive(Parser, Debug)]
#[command(name = "subrag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true, value_parser = parse_api_key)]
    pub api_key: Option<ApiKey>,

    #[command(subcommand)]
    pub command: Commands,
}

fn parse_api_key(value: &str) -> std::result::Result<ApiKey, String> {
    ApiKey::new(value).ok_or_else(|| "API key must not be empty".to_string())
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive session (load, index, retrieve, answer step by step)
    Session {
        /// Subtitle file (defaults to loader.path from the config)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Load and chunk a subtitle file and report what was produced
    Inspect {
        /// Subtitle file (defaults to loader.path from the config)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Retrieve the chunks most relevant to a question and print the RAG prompt
    Retrieve {
        /// The question to retrieve context for
        question: String,

        /// Subtitle file (defaults to loader.path from the config)
        #[arg(short, long)]
        path: Option<String>,

        /// Number of chunks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// Answer a question about a subtitle file in one go
    Ask {
        /// The question to ask
        question: String,

        /// Subtitle file (defaults to loader.path from the config)
        #[arg(short, long)]
        path: Option<String>,

        /// Number of chunks to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// LLM model to use for the answer
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Chat with Eva, the banking assistant
    Eva {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the default configuration file if none exists
    Init,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let cli = Cli::try_parse_from([
            "subrag", "ask", "What did X say?", "--path", "talk.srt", "-k", "5",
        ])
        .unwrap();

        match cli.command {
            Commands::Ask { question, path, top_k, model } => {
                assert_eq!(question, "What did X say?");
                assert_eq!(path.as_deref(), Some("talk.srt"));
                assert_eq!(top_k, Some(5));
                assert!(model.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_api_key_is_not_printed_in_debug() {
        let cli = Cli::try_parse_from(["subrag", "--api-key", "sk-secret", "config", "path"]).unwrap();
        let debug = format!("{:?}", cli);
        assert!(!debug.contains("sk-secret"));
        assert_eq!(cli.api_key.unwrap().expose(), "sk-secret");
    }

    #[test]
    fn test_verbosity_counts() {
        let cli = Cli::try_parse_from(["subrag", "-vv", "inspect"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
