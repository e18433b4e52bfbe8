//! Interactive step-by-step session: load, chunk, index, retrieve, answer.

use super::setup::{answer_generator, build_pipeline, subtitle_loader};
use crate::cli::present::{self, notice_for_error, Notice};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::{Result, SubragError};
use crate::openai::ApiKey;
use crate::pipeline::Pipeline;
use crate::rag::OpenAIGenerator;
use crate::session::{Action, Session};
use console::{style, Term};
use std::io::{self, BufRead, Write};
use tracing::debug;

const HELP: &str = "\
Commands:
  load [path]          load a subtitle file and chunk it
  chunk                re-run chunking on the loaded documents
  index                create embeddings and the vectorstore
  retrieve <question>  retrieve context and build the RAG prompt (alias: ask, q)
  answer               send the RAG prompt to the LLM (alias: generate)
  prompt               show the last RAG prompt
  status               show what has been done so far
  key                  enter the OpenAI API key
  k <n>                set how many chunks to retrieve
  reset                discard everything and start over
  help                 show this help
  exit                 leave the session";

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Load(Option<String>),
    Chunk,
    Index,
    Retrieve(String),
    Answer,
    Prompt,
    Status,
    Key,
    TopK(usize),
    Reset,
    Help,
    Exit,
    Empty,
}

impl SessionCommand {
    fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(SessionCommand::Empty);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "load" => SessionCommand::Load((!rest.is_empty()).then(|| rest.to_string())),
            "chunk" => SessionCommand::Chunk,
            "index" | "build" => SessionCommand::Index,
            "retrieve" | "ask" | "q" => SessionCommand::Retrieve(rest.to_string()),
            "answer" | "generate" => SessionCommand::Answer,
            "prompt" => SessionCommand::Prompt,
            "status" => SessionCommand::Status,
            "key" => SessionCommand::Key,
            "k" | "top-k" => match rest.parse::<usize>() {
                Ok(k) if k > 0 => SessionCommand::TopK(k),
                _ => return Err("k expects a positive number, e.g. 'k 5'".to_string()),
            },
            "reset" => SessionCommand::Reset,
            "help" | "?" => SessionCommand::Help,
            "exit" | "quit" => SessionCommand::Exit,
            other => return Err(format!("Unknown command '{}'. Type 'help' for the list.", other)),
        };

        Ok(command)
    }
}

/// State behind the interactive prompt.
struct InteractiveSession {
    settings: Settings,
    api_key: Option<ApiKey>,
    pipeline: Option<Pipeline>,
    generator: Option<OpenAIGenerator>,
    session: Session,
    default_path: Option<String>,
    top_k: usize,
}

impl InteractiveSession {
    fn new(settings: Settings, api_key: Option<ApiKey>, default_path: Option<String>) -> Self {
        let top_k = settings.retrieval.top_k;
        Self {
            settings,
            api_key,
            pipeline: None,
            generator: None,
            session: Session::new(),
            default_path,
            top_k,
        }
    }

    /// The pipeline, built on first use and kept until the key changes,
    /// alongside the session it drives.
    fn parts(&mut self) -> Result<(&Pipeline, &mut Session)> {
        if self.pipeline.is_none() {
            self.pipeline = Some(build_pipeline(&self.settings, self.api_key.as_ref())?);
        }
        match self.pipeline.as_ref() {
            Some(pipeline) => Ok((pipeline, &mut self.session)),
            None => Err(SubragError::Configuration("pipeline unavailable".to_string())),
        }
    }

    /// Handle one command. Returns `false` when the session should end.
    async fn handle(&mut self, command: SessionCommand) -> bool {
        debug!(?command, stage = %self.session.stage(), "Session command");

        let outcome = match command {
            SessionCommand::Empty => Ok(()),
            SessionCommand::Exit => return false,
            SessionCommand::Help => {
                println!("{}", HELP);
                Ok(())
            }
            SessionCommand::Load(path) => self.load(path),
            SessionCommand::Chunk => self.chunk(),
            SessionCommand::Index => self.index().await,
            SessionCommand::Retrieve(question) => self.retrieve(&question).await,
            SessionCommand::Answer => self.answer().await,
            SessionCommand::Prompt => {
                match self.session.last_rag_prompt() {
                    Some(prompt) => {
                        Output::header("RAG prompt");
                        Output::block(prompt);
                    }
                    None => present::notice_for_guard(Action::Generate).emit(),
                }
                Ok(())
            }
            SessionCommand::Status => {
                self.status();
                Ok(())
            }
            SessionCommand::Key => self.read_key(),
            SessionCommand::TopK(k) => {
                self.top_k = k;
                Notice::info(format!("Retrieving {} chunks per question.", k)).emit();
                Ok(())
            }
            SessionCommand::Reset => {
                self.session.reset();
                Notice::info("Session cleared.").emit();
                Ok(())
            }
        };

        if let Err(err) = outcome {
            notice_for_error(&err).emit();
        }
        true
    }

    fn load(&mut self, path: Option<String>) -> Result<()> {
        let path = path.or_else(|| self.default_path.clone());
        let loader = subtitle_loader(&self.settings, path.as_deref());
        let preview_chars = self.settings.retrieval.preview_chars;

        let (pipeline, session) = self.parts()?;
        let (load, chunks) = pipeline.load_and_chunk(session, &loader)?;
        present::show_load(&load, chunks.as_ref(), preview_chars);
        Ok(())
    }

    fn chunk(&mut self) -> Result<()> {
        self.session.guard(Action::Chunk)?;
        let preview_chars = self.settings.retrieval.preview_chars;

        let (pipeline, session) = self.parts()?;
        let report = pipeline.chunk(session)?;
        present::show_chunks(&report, preview_chars);
        Ok(())
    }

    async fn index(&mut self) -> Result<()> {
        self.session.guard(Action::BuildIndex)?;

        let (pipeline, session) = self.parts()?;
        let spinner = Output::spinner("Creating embeddings + vectorstore...");
        let outcome = pipeline.build_index(session).await;
        spinner.finish_and_clear();

        present::show_index(&outcome?);
        Ok(())
    }

    async fn retrieve(&mut self, question: &str) -> Result<()> {
        self.session.guard(Action::Retrieve)?;
        let (k, preview_chars) = (self.top_k, self.settings.retrieval.preview_chars);

        let (pipeline, session) = self.parts()?;
        let report = pipeline.retrieve(session, question, k).await?;
        present::show_retrieval(&report, preview_chars);
        Ok(())
    }

    async fn answer(&mut self) -> Result<()> {
        self.session.guard(Action::Generate)?;

        if self.generator.is_none() {
            self.generator = Some(answer_generator(&self.settings, self.api_key.as_ref(), None)?);
        }
        self.parts()?;
        let (Some(pipeline), Some(generator)) = (self.pipeline.as_ref(), self.generator.as_ref()) else {
            return Err(SubragError::MissingApiKey);
        };

        let spinner = Output::spinner("Generating answer...");
        let outcome = pipeline.generate(&mut self.session, generator).await;
        spinner.finish_and_clear();

        present::show_answer(&outcome?);
        Ok(())
    }

    fn status(&self) {
        Output::kv("Stage", &self.session.stage().to_string());
        Output::kv(
            "Documents",
            &self.session.documents().map_or(0, |d| d.len()).to_string(),
        );
        Output::kv("Chunks", &self.session.chunks().map_or(0, |c| c.len()).to_string());
        Output::kv("Indexed", &self.session.index_len().to_string());
        Output::kv("Top k", &self.top_k.to_string());
        Output::kv(
            "API key",
            if self.api_key.is_some() { "set" } else { "not set" },
        );
    }

    /// Read a key without echoing it. The pipeline is rebuilt so an OpenAI
    /// embedder picks up the new key; the session itself is kept.
    fn read_key(&mut self) -> Result<()> {
        let term = Term::stderr();
        term.write_str("OpenAI API Key: ")?;
        let line = term.read_secure_line()?;

        match ApiKey::new(line) {
            Some(key) => {
                self.api_key = Some(key);
                self.pipeline = None;
                self.generator = None;
                Notice::success("API key set.").emit();
                Ok(())
            }
            None => Err(SubragError::MissingApiKey),
        }
    }
}

/// Run the interactive session command.
pub async fn run_session(
    path: Option<String>,
    api_key: Option<ApiKey>,
    settings: Settings,
) -> anyhow::Result<()> {
    println!("\n{}", style("Subrag Session").bold().cyan());
    println!(
        "{}\n",
        style("Load a subtitle file, index it, then ask questions. Type 'help' for commands.").dim()
    );

    let mut state = InteractiveSession::new(settings, api_key, path);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!(
            "{} ",
            style(format!("[{}]>", state.session.stage())).green().bold()
        );
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let command = match SessionCommand::parse(&input) {
            Ok(command) => command,
            Err(message) => {
                Output::warning(&message);
                continue;
            }
        };

        if !state.handle(command).await {
            Output::info("Goodbye!");
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::TextSplitter;
    use crate::embedding::HashingEmbedder;
    use crate::rag::PromptAssembler;
    use crate::session::Stage;
    use std::sync::Arc;

    /// A session whose pipeline embeds offline.
    fn offline_state(default_path: Option<String>) -> InteractiveSession {
        let mut state = InteractiveSession::new(Settings::default(), None, default_path);
        state.pipeline = Some(Pipeline::new(
            TextSplitter::new(500, 50).unwrap(),
            Arc::new(HashingEmbedder::new(384)),
            PromptAssembler::new(1000),
        ));
        state
    }

    const SAMPLE: &str = "1\n00:00:01,000 --> 00:00:04,000\nThe vault opens at nine in the morning.\n\n2\n00:00:05,000 --> 00:00:08,000\nThe dragon guards the northern pass.\n";

    #[test]
    fn test_parse_commands() {
        assert_eq!(SessionCommand::parse("  "), Ok(SessionCommand::Empty));
        assert_eq!(SessionCommand::parse("load"), Ok(SessionCommand::Load(None)));
        assert_eq!(
            SessionCommand::parse("load ~/talks/a b.srt"),
            Ok(SessionCommand::Load(Some("~/talks/a b.srt".to_string())))
        );
        assert_eq!(
            SessionCommand::parse("q  who guards the pass? "),
            Ok(SessionCommand::Retrieve("who guards the pass?".to_string()))
        );
        assert_eq!(SessionCommand::parse("Generate"), Ok(SessionCommand::Answer));
        assert_eq!(SessionCommand::parse("k 5"), Ok(SessionCommand::TopK(5)));
        assert_eq!(SessionCommand::parse("quit"), Ok(SessionCommand::Exit));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(SessionCommand::parse("k 0").is_err());
        assert!(SessionCommand::parse("k many").is_err());
        assert!(SessionCommand::parse("dance").is_err());
    }

    #[tokio::test]
    async fn test_walkthrough_without_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.srt");
        std::fs::write(&path, SAMPLE).unwrap();

        let mut state = offline_state(Some(path.to_string_lossy().to_string()));

        // Out-of-order steps leave the session untouched.
        assert!(state.handle(SessionCommand::Index).await);
        assert!(state.handle(SessionCommand::Retrieve("vault".to_string())).await);
        assert_eq!(state.session.stage(), Stage::Unloaded);

        state.handle(SessionCommand::Load(None)).await;
        assert_eq!(state.session.stage(), Stage::Chunked);

        state.handle(SessionCommand::Index).await;
        assert_eq!(state.session.stage(), Stage::Indexed);

        state.handle(SessionCommand::Retrieve("When does the vault open?".to_string())).await;
        assert_eq!(state.session.stage(), Stage::Retrieved);
        assert!(state.session.last_rag_prompt().unwrap().contains("vault"));

        // No key: answering is refused and the prompt is kept.
        state.handle(SessionCommand::Answer).await;
        assert_eq!(state.session.stage(), Stage::Retrieved);

        state.handle(SessionCommand::Reset).await;
        assert_eq!(state.session.stage(), Stage::Unloaded);

        assert!(!state.handle(SessionCommand::Exit).await);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_documents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.srt");
        std::fs::write(&path, SAMPLE).unwrap();

        let mut state = offline_state(None);
        state
            .handle(SessionCommand::Load(Some(path.to_string_lossy().to_string())))
            .await;
        assert_eq!(state.session.stage(), Stage::Chunked);

        let missing = dir.path().join("missing.srt");
        state
            .handle(SessionCommand::Load(Some(missing.to_string_lossy().to_string())))
            .await;
        assert_eq!(state.session.stage(), Stage::Chunked);
        assert_eq!(state.session.documents().unwrap().len(), 1);
    }
}
