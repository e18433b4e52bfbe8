//! CLI output formatting utilities.

use crate::chunking::truncate_chars;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a dimmed caption under the previous message.
    pub fn caption(msg: &str) {
        println!("   {}", style(msg).dim());
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a block of text verbatim, indented.
    pub fn block(text: &str) {
        for line in text.lines() {
            println!("   {}", line);
        }
    }

    /// Print a retrieved chunk.
    pub fn chunk_result(position: usize, score: f32, content: &str, max_chars: usize) {
        println!(
            "\n{} {} (score: {:.2})",
            style(">>").green(),
            style(format!("chunk {}:", position)).bold(),
            score
        );
        Self::block(&content_preview(content, max_chars));
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_chars: usize) -> String {
    let preview = truncate_chars(content, max_chars);
    if preview.len() < content.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("short", 10), "short");
        assert_eq!(content_preview("a longer line", 6), "a long...");
        assert_eq!(content_preview("ñññ", 2), "ññ...");
    }
}
