use async_trait::async_trait;

use super::{SummarizeError, Summarizer};

const DEFAULT_MAX_CHARS: usize = 280;

/// Deterministic summarizer that never leaves the machine.
///
/// Keeps the text after the instruction preamble (everything past the first
/// blank line, when there is one), drops separator lines and joins the rest
/// into a single line capped at `max_chars`. Good enough for demos and dry runs.
#[derive(Debug, Clone)]
pub struct OfflineSummarizer {
    max_chars: usize,
}

impl Default for OfflineSummarizer {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
        }
    }
}

impl OfflineSummarizer {
    fn digest(&self, instruction: &str) -> String {
        let body = match instruction.split_once("\n\n") {
            Some((_, rest)) if !rest.trim().is_empty() => rest,
            _ => instruction,
        };
        let joined = body
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && *l != "-")
            .collect::<Vec<_>>()
            .join(" / ");

        if joined.chars().count() <= self.max_chars {
            return joined;
        }
        let mut cut: String = joined.chars().take(self.max_chars).collect();
        cut.push('…');
        cut
    }
}

#[async_trait]
impl Summarizer for OfflineSummarizer {
    async fn summarize(&self, _role: &str, instruction: &str) -> Result<String, SummarizeError> {
        let text = self.digest(instruction);
        if text.is_empty() {
            return Err(SummarizeError::EmptyResponse);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drops_preamble_and_separators() {
        let s = OfflineSummarizer::default();
        let out = s
            .summarize("role", "Rewrite this:\n\nFirst line\n-\n\nSecond line\n")
            .await
            .unwrap();
        assert_eq!(out, "First line / Second line");
    }

    #[tokio::test]
    async fn test_without_preamble_keeps_everything() {
        let s = OfflineSummarizer::default();
        let out = s.summarize("role", "Author: true\n-\nActions: 2").await.unwrap();
        assert_eq!(out, "Author: true / Actions: 2");
    }

    #[tokio::test]
    async fn test_truncates_on_char_boundary() {
        let s = OfflineSummarizer { max_chars: 4 };
        let out = s.summarize("role", "héllo wörld").await.unwrap();
        assert_eq!(out, "héll…");
    }

    #[tokio::test]
    async fn test_empty_instruction_is_an_error() {
        let s = OfflineSummarizer::default();
        assert!(matches!(
            s.summarize("role", " \n-\n").await,
            Err(SummarizeError::EmptyResponse)
        ));
    }
}
