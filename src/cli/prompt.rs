//! Interactive prompts
//!
//! Reads answers line by line from an async reader (stdin in the binary).
//! Prompts go to stderr so stdout carries only answers.

use std::io::Write as _;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

/// Line-oriented prompt over an async reader
pub struct Prompt<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> Prompt<R> {
    /// Wrap a reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }

    /// Print `question` and read one trimmed line. `None` at end of input.
    pub async fn ask(&mut self, question: &str) -> Result<Option<String>> {
        if !question.is_empty() {
            eprint!("{question}");
            let _ = std::io::stderr().flush();
        }
        let line = self
            .lines
            .next_line()
            .await
            .context("Failed to read from input")?;
        Ok(line.map(|l| l.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ask_reads_trimmed_lines() {
        let input: &[u8] = b"  1 \n24 03 2024\n";
        let mut prompt = Prompt::new(input);

        assert_eq!(prompt.ask("Option: ").await.unwrap().as_deref(), Some("1"));
        assert_eq!(
            prompt.ask("Enter date (dd mm yyyy): ").await.unwrap().as_deref(),
            Some("24 03 2024")
        );
        assert_eq!(prompt.ask("").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ask_handles_missing_trailing_newline() {
        let input: &[u8] = b"q";
        let mut prompt = Prompt::new(input);
        assert_eq!(prompt.ask("").await.unwrap().as_deref(), Some("q"));
        assert_eq!(prompt.ask("").await.unwrap(), None);
    }
}
