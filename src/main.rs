mod activity;
mod calendar;
mod config;
mod github;
mod report;
mod summarize;

use chrono::{Local, Utc};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

use activity::{ActivityError, Aggregator, RepoFilter};
use calendar::RangeKeyword;
use config::Config;
use github::{EventSource, FixtureSource, GitHubClient, GitHubError};
use report::{Report, ReportScope};
use summarize::{OfflineSummarizer, OpenAiSummarizer, Summarizer, SummaryStyle};

/// Login the bundled sample feed belongs to.
const SAMPLE_USER: &str = "alice";
const SAMPLE_EVENTS: &str = include_str!("../tests/fixtures/sample_events.json");

/// gh-timecard: turns your recent GitHub activity into a timecard.
///
/// Reads the authenticated user's events since the start of RANGE, groups
/// them by issue and pull request, and asks a language model for a summary
/// in the chosen STYLE.
#[derive(Parser, Debug)]
#[command(name = "gh-timecard", version, about)]
struct Cli {
    /// Start of the period: today, yesterday, last-3days, this-week,
    /// last-week, this-month or last-month
    range: RangeKeyword,

    /// Summary style
    #[arg(value_enum)]
    style: SummaryStyle,

    /// Only include activity in this repository (owner/repo)
    repo: Option<String>,

    /// Optional output file path for markdown report
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Use the bundled sample feed and an offline summarizer (no tokens needed)
    #[arg(long)]
    r#mock: bool,

    /// Replay events from a JSON file instead of calling the GitHub API
    #[arg(long, conflicts_with = "mock")]
    events_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let _main_span = info_span!("timecard", range = %cli.range, style = %cli.style).entered();

    // Everything the user typed is validated before any network traffic.
    let begin = calendar::resolve(cli.range, &Local::now())?.with_timezone(&Utc);
    let repo_filter = cli.repo.as_deref().map(RepoFilter::parse).transpose()?;
    debug!(%begin, repo = ?repo_filter.as_ref().map(RepoFilter::as_str), "resolved scope");

    let (source, summarizer, tracked_user): (Box<dyn EventSource>, Box<dyn Summarizer>, String) =
        if cli.r#mock {
            info!("using sample events and offline summarizer");
            let source = FixtureSource::from_json(SAMPLE_USER, SAMPLE_EVENTS)?.rebased_to(Utc::now());
            (Box::new(source), Box::new(OfflineSummarizer::default()), SAMPLE_USER.to_string())
        } else {
            info!("loading configuration");
            let config = Config::load()?;
            let summarizer = build_summarizer(&config)?;

            match cli.events_file.as_deref() {
                Some(path) => {
                    info!(path = %path.display(), "replaying events from file");
                    let login = config.github.user.clone().ok_or(GitHubError::MissingUser)?;
                    let source = FixtureSource::from_json(login.clone(), &std::fs::read_to_string(path)?)?;
                    (Box::new(source), summarizer, login)
                }
                None => {
                    let client = GitHubClient::new(&config)?;
                    info!("resolving authenticated user");
                    let login = client.authenticated_user().await?;
                    let feed_user = config.github.user.clone().unwrap_or_else(|| login.clone());
                    (Box::new(client.with_feed_user(feed_user)), summarizer, login)
                }
            }
        };

    let scope = ReportScope {
        tracked_user,
        range: cli.range,
        begin,
        repo: repo_filter.as_ref().map(|f| f.as_str().to_string()),
        style: cli.style,
    };

    let built_report = run(source.as_ref(), summarizer.as_ref(), scope, repo_filter).await?;
    report::output(&built_report, cli.output.as_deref())?;
    info!(items = built_report.item_count(), "done");

    Ok(())
}

fn build_summarizer(config: &Config) -> Result<Box<dyn Summarizer>, Box<dyn std::error::Error>> {
    let api_key = config
        .openai_token()
        .ok_or("OpenAI token not found (set openai.token or OPENAI_TOKEN)")?;
    Ok(Box::new(OpenAiSummarizer::new(api_key, &config.openai)?))
}

/// Ingest the feed into a ledger, then summarize it into a report.
async fn run(
    source: &dyn EventSource,
    summarizer: &dyn Summarizer,
    scope: ReportScope,
    repo_filter: Option<RepoFilter>,
) -> Result<Report, ActivityError> {
    info!("collecting activity");
    let (ledger, _stats) = Aggregator::new(summarizer, scope.tracked_user.clone(), scope.begin, repo_filter)
        .run(source)
        .await?;

    info!(work_items = ledger.len(), "summarizing");
    Ok(report::build(summarizer, &ledger, scope).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::WorkItemId;
    use crate::summarize::tests::StubSummarizer;
    use chrono::{DateTime, Duration};

    fn scope(begin: DateTime<Utc>, repo: Option<&str>) -> ReportScope {
        ReportScope {
            tracked_user: SAMPLE_USER.to_string(),
            range: RangeKeyword::ThisWeek,
            begin,
            repo: repo.map(str::to_string),
            style: SummaryStyle::Executive,
        }
    }

    fn ids(digests: &[report::ItemDigest]) -> Vec<WorkItemId> {
        digests.iter().map(|d| d.id).collect()
    }

    #[test]
    fn test_cli_parses_positionals() {
        let cli = Cli::try_parse_from(["gh-timecard", "last-week", "technical", "acme/widgets", "-o", "out.md"]).unwrap();
        assert_eq!(cli.range, RangeKeyword::LastWeek);
        assert_eq!(cli.style, SummaryStyle::Technical);
        assert_eq!(cli.repo.as_deref(), Some("acme/widgets"));
        assert_eq!(cli.output, Some(PathBuf::from("out.md")));
        assert!(!cli.r#mock);
    }

    #[test]
    fn test_cli_rejects_unknown_range_and_style() {
        assert!(Cli::try_parse_from(["gh-timecard", "fortnight", "executive"]).is_err());
        assert!(Cli::try_parse_from(["gh-timecard", "today", "poetic"]).is_err());
        assert!(Cli::try_parse_from(["gh-timecard", "today"]).is_err());
    }

    #[test]
    fn test_cli_mock_conflicts_with_events_file() {
        assert!(Cli::try_parse_from(["gh-timecard", "today", "detailed", "--mock", "--events-file", "x.json"]).is_err());
    }

    #[tokio::test]
    async fn test_sample_feed_this_week() {
        let source = FixtureSource::from_json(SAMPLE_USER, SAMPLE_EVENTS).unwrap();
        let stub = StubSummarizer::default();
        let begin: DateTime<Utc> = "2025-01-27T00:00:00Z".parse().unwrap();

        let built = run(&source, &stub, scope(begin, None), None).await.unwrap();

        assert_eq!(ids(&built.issues), vec![WorkItemId(10)]);
        assert_eq!(ids(&built.pulls), vec![WorkItemId(42), WorkItemId(77)]);
        assert!(built.pulls[0].is_author);
        assert_eq!(built.pulls[0].action_count, 2);
        assert!(!built.pulls[1].is_author);
        assert_eq!(built.pulls[1].action_count, 2);
        assert!(built.timecard.starts_with("summary: "));
    }

    #[tokio::test]
    async fn test_sample_feed_with_repo_filter() {
        let source = FixtureSource::from_json(SAMPLE_USER, SAMPLE_EVENTS).unwrap();
        let stub = StubSummarizer::default();
        let begin: DateTime<Utc> = "2025-01-27T00:00:00Z".parse().unwrap();
        let filter = RepoFilter::parse("acme/widgets").unwrap();

        let built = run(&source, &stub, scope(begin, Some("acme/widgets")), Some(filter))
            .await
            .unwrap();

        assert_eq!(ids(&built.issues), vec![WorkItemId(10)]);
        assert_eq!(ids(&built.pulls), vec![WorkItemId(42)]);
    }

    #[tokio::test]
    async fn test_mock_mode_pipeline_runs_offline() {
        let now = Utc::now();
        let source = FixtureSource::from_json(SAMPLE_USER, SAMPLE_EVENTS)
            .unwrap()
            .rebased_to(now);
        let summarizer = OfflineSummarizer::default();

        let built = run(&source, &summarizer, scope(now - Duration::days(30), None), None)
            .await
            .unwrap();

        assert_eq!(ids(&built.issues), vec![WorkItemId(9), WorkItemId(10)]);
        assert_eq!(ids(&built.pulls), vec![WorkItemId(42), WorkItemId(77)]);
        assert!(!built.timecard.is_empty());
    }

    #[tokio::test]
    async fn test_empty_range_reports_no_activity() {
        let source = FixtureSource::from_json(SAMPLE_USER, SAMPLE_EVENTS).unwrap();
        let stub = StubSummarizer::default();

        let built = run(&source, &stub, scope(Utc::now(), None), None).await.unwrap();

        assert_eq!(built.item_count(), 0);
        assert_eq!(stub.call_count(), 0);
    }
}
