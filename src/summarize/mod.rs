pub mod offline;
pub mod openai;
pub mod prompts;

pub use offline::OfflineSummarizer;
pub use openai::OpenAiSummarizer;

use async_trait::async_trait;
use clap::ValueEnum;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {message}")]
    Api { message: String },

    #[error("summarizer returned no content")]
    EmptyResponse,
}

/// Natural-language condensation backend.
/// Implementations must be Send + Sync so one instance can serve the whole run.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Answer `instruction` under the system `role`.
    async fn summarize(&self, role: &str, instruction: &str) -> Result<String, SummarizeError>;
}

/// How the final timecard is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryStyle {
    /// A few sentences of plain facts
    Executive,
    /// Sectioned, technical breakdown
    Technical,
    /// Executive summary followed by the technical breakdown
    Detailed,
}

impl SummaryStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            SummaryStyle::Executive => "executive",
            SummaryStyle::Technical => "technical",
            SummaryStyle::Detailed => "detailed",
        }
    }

    /// System role for the timecard call.
    pub fn timecard_role(self) -> String {
        let mut role = String::from(prompts::TIMECARD_ROLE);
        match self {
            SummaryStyle::Executive => role.push_str(prompts::TIMECARD_EXECUTIVE),
            SummaryStyle::Technical => role.push_str(prompts::TIMECARD_TECHNICAL),
            SummaryStyle::Detailed => {
                role.push_str(prompts::TIMECARD_EXECUTIVE);
                role.push_str(prompts::TIMECARD_TECHNICAL);
            }
        }
        role
    }
}

impl std::fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Call the summarizer and absorb failure: errors and blank answers both become "".
pub async fn best_effort<S: Summarizer + ?Sized>(summarizer: &S, role: &str, instruction: &str) -> String {
    match summarizer.summarize(role, instruction).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            warn!(error = %SummarizeError::EmptyResponse, "summarization failed, continuing without it");
            String::new()
        }
        Err(err) => {
            warn!(error = %err, "summarization failed, continuing without it");
            String::new()
        }
    }
}

/// Rewrite an issue/PR/comment body into a couple of lines.
/// Blank input is returned as "" without calling the summarizer.
pub async fn condense<S: Summarizer + ?Sized>(summarizer: &S, text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    let instruction = format!("{}{}", prompts::CONDENSE_INSTRUCTION, text);
    best_effort(summarizer, prompts::CONDENSE_ROLE, &instruction).await
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Recording summarizer for tests. Answers "summary: <last line>" and fails
    /// any call whose instruction contains `fail_on`.
    #[derive(Default)]
    pub struct StubSummarizer {
        pub calls: Mutex<Vec<(String, String)>>,
        pub fail_on: Option<String>,
        pub answer_empty: bool,
    }

    impl StubSummarizer {
        pub fn failing_on(marker: &str) -> Self {
            Self {
                fail_on: Some(marker.to_string()),
                ..Self::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Summarizer for StubSummarizer {
        async fn summarize(&self, role: &str, instruction: &str) -> Result<String, SummarizeError> {
            self.calls
                .lock()
                .unwrap()
                .push((role.to_string(), instruction.to_string()));
            if self.fail_on.as_deref().is_some_and(|m| instruction.contains(m)) {
                return Err(SummarizeError::Api {
                    message: "stub failure".to_string(),
                });
            }
            if self.answer_empty {
                return Ok("   ".to_string());
            }
            let last = instruction.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or("");
            Ok(format!("summary: {}", last.trim()))
        }
    }

    #[tokio::test]
    async fn test_condense_skips_blank_text() {
        let stub = StubSummarizer::default();
        assert_eq!(condense(&stub, "  \n ").await, "");
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_condense_uses_rewrite_role() {
        let stub = StubSummarizer::default();
        let out = condense(&stub, "Fixes the crash on startup").await;
        assert_eq!(out, "summary: Fixes the crash on startup");
        let calls = stub.calls.lock().unwrap();
        assert_eq!(calls[0].0, prompts::CONDENSE_ROLE);
        assert!(calls[0].1.starts_with(prompts::CONDENSE_INSTRUCTION));
    }

    #[tokio::test]
    async fn test_best_effort_absorbs_errors() {
        let stub = StubSummarizer::failing_on("boom");
        assert_eq!(best_effort(&stub, "role", "boom").await, "");
        assert_eq!(best_effort(&stub, "role", "fine").await, "summary: fine");
    }

    #[tokio::test]
    async fn test_best_effort_treats_blank_answer_as_failure() {
        let stub = StubSummarizer {
            answer_empty: true,
            ..StubSummarizer::default()
        };
        assert_eq!(best_effort(&stub, "role", "anything").await, "");
    }

    #[test]
    fn test_timecard_role_per_style() {
        let executive = SummaryStyle::Executive.timecard_role();
        let technical = SummaryStyle::Technical.timecard_role();
        let detailed = SummaryStyle::Detailed.timecard_role();

        assert!(executive.starts_with(prompts::TIMECARD_ROLE));
        assert!(executive.ends_with(prompts::TIMECARD_EXECUTIVE));
        assert!(technical.ends_with(prompts::TIMECARD_TECHNICAL));
        assert!(detailed.contains(prompts::TIMECARD_EXECUTIVE));
        assert!(detailed.ends_with(prompts::TIMECARD_TECHNICAL));
    }

    #[test]
    fn test_style_parses_from_cli_value() {
        assert_eq!(SummaryStyle::from_str("detailed", false).unwrap(), SummaryStyle::Detailed);
        assert!(SummaryStyle::from_str("verbose", false).is_err());
    }
}
