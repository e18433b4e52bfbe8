//! Eva chat command implementation.

use super::setup::load_prompts;
use crate::assistant::{BankingAssistant, ASSISTANT_TITLE, HEALTH_CHECK_REPLY};
use crate::cli::present::notice_for_error;
use crate::cli::Output;
use crate::config::Settings;
use crate::error::SubragError;
use crate::openai::ApiKey;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

#[derive(Debug, PartialEq, Eq)]
enum EvaInput<'a> {
    Empty,
    Exit,
    Clear,
    HealthCheck,
    Message(&'a str),
}

impl<'a> EvaInput<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            EvaInput::Empty
        } else if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            EvaInput::Exit
        } else if line.eq_ignore_ascii_case("clear") {
            EvaInput::Clear
        } else if line.eq_ignore_ascii_case("hi") {
            EvaInput::HealthCheck
        } else {
            EvaInput::Message(line)
        }
    }
}

/// Run the Eva chat loop.
pub async fn run_eva(model: Option<String>, api_key: Option<ApiKey>, settings: Settings) -> Result<()> {
    let model = model.unwrap_or_else(|| settings.llm.model.clone());
    let prompts = load_prompts(&settings)?;

    let mut assistant = match api_key.as_ref() {
        Some(key) => Some(
            BankingAssistant::new(key, &model, &prompts)?.with_temperature(settings.llm.temperature),
        ),
        None => None,
    };

    println!("\n{}", style(ASSISTANT_TITLE).bold().cyan());
    println!(
        "{}\n",
        style("Type your message, 'hi' to check the assistant, 'clear' to reset, or 'exit' to quit.").dim()
    );
    if assistant.is_none() {
        notice_for_error(&SubragError::MissingApiKey).emit();
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        match EvaInput::parse(&input) {
            EvaInput::Empty => continue,
            EvaInput::Exit => {
                Output::info("Goodbye!");
                break;
            }
            EvaInput::Clear => {
                if let Some(assistant) = assistant.as_mut() {
                    assistant.clear_history();
                }
                Output::info("Conversation history cleared.");
            }
            EvaInput::HealthCheck => eva_says(HEALTH_CHECK_REPLY),
            EvaInput::Message(message) => {
                let Some(assistant) = assistant.as_mut() else {
                    notice_for_error(&SubragError::MissingApiKey).emit();
                    continue;
                };
                match assistant.send(message).await {
                    Ok(reply) => eva_says(&reply),
                    Err(e) => notice_for_error(&e).emit(),
                }
            }
        }
    }

    Ok(())
}

fn eva_says(reply: &str) {
    println!("\n{} {}\n", style("Eva:").cyan().bold(), reply);
}
