use anyhow::{bail, Context, Result};

use crate::config::AppConfig;
use crate::model::snapshot::SnapshotMeta;
use crate::pipeline::{run_fetch, FetchResponse};
use crate::providers::jira::JiraSource;
use crate::store::FileStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Fetch { label: Option<String> },
    List,
    Show { id: String },
    Help,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    pub verbosity: Verbosity,
}

/// Parse `snapshot [-v|-q] <command> [args]`.
///
/// Supported forms:
///   snapshot fetch
///   snapshot fetch --label "Manual Trigger"
///   snapshot list
///   snapshot show <id>
pub fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut verbosity = Verbosity::Normal;
    let mut rest: Vec<&str> = Vec::new();
    for arg in args {
        match arg.as_str() {
            "-v" | "--verbose" => verbosity = Verbosity::Verbose,
            "-q" | "--quiet" => verbosity = Verbosity::Quiet,
            other => rest.push(other),
        }
    }

    let command = match rest.as_slice() {
        [] | ["help"] | ["-h"] | ["--help"] => Command::Help,
        ["fetch", tail @ ..] => Command::Fetch {
            label: parse_label(tail)?,
        },
        ["list"] => Command::List,
        ["show", id] => Command::Show { id: id.to_string() },
        ["show"] => bail!("Usage: snapshot show <id>"),
        [other, ..] => bail!("Unknown command: {other}. Run `snapshot help` for usage."),
    };

    Ok(Invocation { command, verbosity })
}

fn parse_label(args: &[&str]) -> Result<Option<String>> {
    match args {
        [] => Ok(None),
        ["-l" | "--label"] => bail!("Missing value for --label flag"),
        ["-l" | "--label", label] if label.trim().is_empty() => {
            bail!("Snapshot label cannot be empty")
        }
        ["-l" | "--label", label] => Ok(Some(label.to_string())),
        [other, ..] => bail!("Unexpected argument for fetch: {other}"),
    }
}

/// Run one fetch against Jira and store the result.
///
/// Configuration problems are reported before anything is sent.
pub async fn handle_fetch(config: &AppConfig, label: Option<String>) -> Result<FetchResponse> {
    let jira = config.jira_credentials()?;
    let source = JiraSource::new(
        &jira.domain,
        &jira.email,
        &jira.api_token,
        config.fetch.search_query(),
    );
    let store = FileStore::new(config.snapshot_dir());
    let meta = SnapshotMeta::new(label.unwrap_or_else(|| config.fetch.snapshot_type.clone()));

    let result = run_fetch(&source, &store, &config.fetch.field_ids(), meta).await;
    if let Err(err) = &result {
        tracing::error!(%err, "fetch failed");
    }
    Ok(FetchResponse::from(result))
}

pub async fn handle_list(config: &AppConfig) -> Result<()> {
    let store = FileStore::new(config.snapshot_dir());
    let summaries = store.list().await?;
    if summaries.is_empty() {
        println!("No snapshots stored in {}", store.dir().display());
        return Ok(());
    }
    for s in summaries {
        println!(
            "{}  {}  {:>5} issues  {}",
            s.id,
            s.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            s.total_issues,
            s.snapshot_type
        );
    }
    Ok(())
}

pub async fn handle_show(config: &AppConfig, id: &str) -> Result<()> {
    let store = FileStore::new(config.snapshot_dir());
    let snapshot = store.load(id).await?;
    let json = serde_json::to_string_pretty(&snapshot).context("Failed to render snapshot")?;
    println!("{json}");
    Ok(())
}

pub fn print_help() {
    println!("snapshot — capture Jira issues as normalized snapshot documents\n");
    println!("USAGE:");
    println!("  snapshot fetch [--label <name>]  Fetch issues from Jira and store a snapshot");
    println!("  snapshot list                    List stored snapshots, newest first");
    println!("  snapshot show <id>               Print one stored snapshot");
    println!();
    println!("OPTIONS:");
    println!("  -v, --verbose  Debug logging");
    println!("  -q, --quiet    Errors only");
    println!();
    println!("CONFIG:");
    println!("  ~/.jira-snapshot/config.toml, overridden by .env and JIRA_DOMAIN,");
    println!("  JIRA_EMAIL, JIRA_API_TOKEN, JIRA_PROJECT, SNAPSHOT_DIR.");
    println!("  Log filter: SNAPSHOT_LOG (e.g. SNAPSHOT_LOG=debug).");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(strs: &[&str]) -> Vec<String> {
        strs.iter().map(|s| s.to_string()).collect()
    }

    fn command(strs: &[&str]) -> Command {
        parse_args(&args(strs)).unwrap().command
    }

    #[test]
    fn no_args_is_help() {
        assert_eq!(command(&[]), Command::Help);
        assert_eq!(command(&["--help"]), Command::Help);
    }

    #[test]
    fn parse_plain_fetch() {
        assert_eq!(command(&["fetch"]), Command::Fetch { label: None });
    }

    #[test]
    fn parse_fetch_with_label() {
        assert_eq!(
            command(&["fetch", "--label", "Manual Trigger"]),
            Command::Fetch {
                label: Some("Manual Trigger".into())
            }
        );
        assert_eq!(
            command(&["fetch", "-l", "Daily Scan"]),
            Command::Fetch {
                label: Some("Daily Scan".into())
            }
        );
    }

    #[test]
    fn parse_missing_label_value_fails() {
        let err = parse_args(&args(&["fetch", "--label"])).unwrap_err();
        assert!(err.to_string().contains("Missing value"));
    }

    #[test]
    fn parse_empty_label_fails() {
        let err = parse_args(&args(&["fetch", "--label", "  "])).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn parse_show_and_list() {
        assert_eq!(command(&["list"]), Command::List);
        assert_eq!(command(&["show", "abc"]), Command::Show { id: "abc".into() });
        assert!(parse_args(&args(&["show"])).is_err());
    }

    #[test]
    fn verbosity_flags_anywhere() {
        let inv = parse_args(&args(&["-v", "fetch"])).unwrap();
        assert_eq!(inv.verbosity, Verbosity::Verbose);
        assert_eq!(inv.command, Command::Fetch { label: None });

        let inv = parse_args(&args(&["list", "--quiet"])).unwrap();
        assert_eq!(inv.verbosity, Verbosity::Quiet);
    }

    #[test]
    fn unknown_command_fails() {
        let err = parse_args(&args(&["sync"])).unwrap_err();
        assert!(err.to_string().contains("Unknown command"));
    }

    #[tokio::test]
    async fn fetch_without_credentials_fails_before_network() {
        let config = AppConfig::default();
        let err = handle_fetch(&config, None).await.unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}
