//! SubRip (.srt) subtitle loader.
//!
//! Cues are blank-line separated blocks of a sequence number, a time range
//! (`00:00:01,000 --> 00:00:04,000`) and one or more lines of text.

use super::{Document, DocumentLoader};
use crate::config::LoadGranularity;
use crate::error::{Result, SubragError};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// A single parsed subtitle cue.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    /// Sequence number from the file (or position, if the file omits it).
    pub sequence: u32,
    /// Start time in seconds.
    pub start_seconds: f64,
    /// End time in seconds.
    pub end_seconds: f64,
    /// Cue text with formatting tags removed and lines joined by spaces.
    pub text: String,
}

struct SrtParser {
    time_regex: Regex,
    tag_regex: Regex,
}

impl SrtParser {
    fn new() -> Self {
        let time_regex = Regex::new(
            r"(?x)
            ^\s*
            (\d+):(\d{2}):(\d{2})[,.](\d{1,3})
            \s*-->\s*
            (\d+):(\d{2}):(\d{2})[,.](\d{1,3})
        ",
        )
        .expect("Invalid regex");

        // HTML-style tags (<i>, <font ...>) and ASS overrides ({\an8})
        let tag_regex = Regex::new(r"<[^>]*>|\{\\[^}]*\}").expect("Invalid regex");

        Self {
            time_regex,
            tag_regex,
        }
    }

    fn parse(&self, content: &str) -> Vec<SubtitleCue> {
        let normalized = content
            .trim_start_matches('\u{feff}')
            .replace("\r\n", "\n")
            .replace('\r', "\n");

        let mut cues = Vec::new();
        let mut block: Vec<&str> = Vec::new();

        for line in normalized.lines().chain(std::iter::once("")) {
            if line.trim().is_empty() {
                if !block.is_empty() {
                    if let Some(cue) = self.parse_block(&block, cues.len() as u32 + 1) {
                        cues.push(cue);
                    }
                    block.clear();
                }
            } else {
                block.push(line);
            }
        }

        cues
    }

    fn parse_block(&self, lines: &[&str], fallback_sequence: u32) -> Option<SubtitleCue> {
        let Some((time_idx, (start_seconds, end_seconds))) = lines
            .iter()
            .enumerate()
            .find_map(|(i, line)| self.parse_time_line(line).map(|t| (i, t)))
        else {
            warn!("Skipping subtitle block without a time line: {:?}", lines.first());
            return None;
        };

        let sequence = time_idx
            .checked_sub(1)
            .and_then(|i| lines[i].trim().parse::<u32>().ok())
            .unwrap_or(fallback_sequence);

        let text = lines[time_idx + 1..]
            .iter()
            .map(|line| self.tag_regex.replace_all(line, "").trim().to_string())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if text.is_empty() {
            debug!("Skipping empty subtitle cue {}", sequence);
            return None;
        }

        if end_seconds < start_seconds {
            warn!("Subtitle cue {} ends before it starts", sequence);
        }

        Some(SubtitleCue {
            sequence,
            start_seconds,
            end_seconds,
            text,
        })
    }

    fn parse_time_line(&self, line: &str) -> Option<(f64, f64)> {
        let caps = self.time_regex.captures(line)?;
        let field = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or("0");

        let start = to_seconds(field(1), field(2), field(3), field(4))?;
        let end = to_seconds(field(5), field(6), field(7), field(8))?;
        Some((start, end))
    }
}

fn to_seconds(hours: &str, minutes: &str, seconds: &str, millis: &str) -> Option<f64> {
    let hours: f64 = hours.parse().ok()?;
    let minutes: f64 = minutes.parse().ok()?;
    let seconds: f64 = seconds.parse().ok()?;
    // "5" means 500ms, not 5ms
    let millis: f64 = format!("{:0<3}", millis).parse().ok()?;

    Some(hours * 3600.0 + minutes * 60.0 + seconds + millis / 1000.0)
}

/// Parse SubRip text into cues. Malformed blocks are skipped.
pub fn parse_srt(content: &str) -> Vec<SubtitleCue> {
    SrtParser::new().parse(content)
}

/// Loads a subtitle file from a fixed path.
pub struct SrtLoader {
    path: PathBuf,
    granularity: LoadGranularity,
}

impl SrtLoader {
    /// Create a loader for the given path.
    pub fn new(path: impl Into<PathBuf>, granularity: LoadGranularity) -> Self {
        Self {
            path: path.into(),
            granularity,
        }
    }

    /// The file this loader reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            SubragError::LoadFailure(format!("{}: {}", self.path.display(), e))
        })?;

        String::from_utf8(bytes).map_err(|_| {
            SubragError::LoadFailure(format!("{} is not valid UTF-8 text", self.path.display()))
        })
    }
}

impl DocumentLoader for SrtLoader {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Vec<Document>> {
        let content = self.read()?;
        let cues = parse_srt(&content);
        let source = self.path.display().to_string();

        info!("Parsed {} subtitle cues", cues.len());

        if cues.is_empty() {
            return Ok(Vec::new());
        }

        let documents = match self.granularity {
            LoadGranularity::File => {
                let text = cues
                    .iter()
                    .map(|c| c.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                vec![Document::new(text)
                    .with_metadata("source", source.as_str())
                    .with_metadata("cue_count", cues.len())]
            }
            LoadGranularity::Cue => cues
                .into_iter()
                .map(|cue| {
                    Document::new(cue.text)
                        .with_metadata("source", source.as_str())
                        .with_metadata("sequence", cue.sequence as usize)
                        .with_metadata("start_seconds", cue.start_seconds)
                        .with_metadata("end_seconds", cue.end_seconds)
                })
                .collect(),
        };

        Ok(documents)
    }

    fn source(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MetadataValue;
    use std::io::Write;

    const SAMPLE: &str = "1
00:00:01,000 --> 00:00:04,000
Welcome to the <i>quarterly</i> review.

2
00:00:04,500 --> 00:00:07,250
Marcus said hello
to everyone.

3
00:01:05,000 --> 00:01:09,000
{\\an8}Revenue grew by twelve percent.
";

    fn write_temp(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".srt").tempfile().unwrap();
        file.write_all(content).unwrap();
        file
    }

    #[test]
    fn test_parse_cues() {
        let cues = parse_srt(SAMPLE);

        assert_eq!(cues.len(), 3);
        assert_eq!(cues[0].sequence, 1);
        assert_eq!(cues[0].start_seconds, 1.0);
        assert_eq!(cues[0].text, "Welcome to the quarterly review.");
        assert_eq!(cues[1].end_seconds, 7.25);
        assert_eq!(cues[1].text, "Marcus said hello to everyone.");
        assert_eq!(cues[2].text, "Revenue grew by twelve percent.");
    }

    #[test]
    fn test_parse_crlf_and_bom() {
        let content = "\u{feff}1\r\n00:00:00,000 --> 00:00:02,5\r\nHi there\r\n\r\n";
        let cues = parse_srt(content);

        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].text, "Hi there");
        assert_eq!(cues[0].end_seconds, 2.5);
    }

    #[test]
    fn test_malformed_blocks_are_skipped() {
        let content = "1
not a time line
Lost text

2
00:00:03.000 --> 00:00:04.000
Kept text
";
        let cues = parse_srt(content);
        assert_eq!(cues.len(), 1);
        assert_eq!(cues[0].sequence, 2);
        assert_eq!(cues[0].text, "Kept text");
    }

    #[test]
    fn test_load_file_granularity() {
        let file = write_temp(SAMPLE.as_bytes());
        let loader = SrtLoader::new(file.path(), LoadGranularity::File);

        let docs = loader.load().unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].text.starts_with("Welcome to the quarterly review. Marcus said hello"));
        assert_eq!(docs[0].metadata["cue_count"], MetadataValue::Number(3.0));
        assert_eq!(docs[0].metadata["source"].to_string(), loader.source());
    }

    #[test]
    fn test_load_cue_granularity() {
        let file = write_temp(SAMPLE.as_bytes());
        let docs = SrtLoader::new(file.path(), LoadGranularity::Cue).load().unwrap();

        assert_eq!(docs.len(), 3);
        assert_eq!(docs[1].metadata["sequence"], MetadataValue::Number(2.0));
        assert_eq!(docs[1].metadata["start_seconds"], MetadataValue::Number(4.5));
    }

    #[test]
    fn test_empty_file_yields_no_documents() {
        let file = write_temp(b"");
        let docs = SrtLoader::new(file.path(), LoadGranularity::File).load().unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_missing_file_is_load_failure() {
        let loader = SrtLoader::new("/definitely/not/here.srt", LoadGranularity::File);
        assert!(matches!(loader.load(), Err(SubragError::LoadFailure(_))));
    }

    #[test]
    fn test_non_utf8_is_load_failure() {
        let file = write_temp(&[0xff, 0xfe, 0x00, 0x31]);
        let loader = SrtLoader::new(file.path(), LoadGranularity::File);
        assert!(matches!(loader.load(), Err(SubragError::LoadFailure(_))));
    }
}
