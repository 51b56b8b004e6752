use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use ghost_hunt::audit::AuditSink;
use ghost_hunt::constants::TICK_MS;
use ghost_hunt::engine::{run_investigation, InvestigationOptions};
use ghost_hunt::error::SimError;
use ghost_hunt::logging;
use ghost_hunt::report::InvestigationReport;
use ghost_hunt::roster;
use ghost_hunt::types::{GhostType, HunterSpec};
use serde::Serialize;
use tracing::{error, info};

const TICK_ENV: &str = "GHOST_HUNT_TICK_MS";
const LOG_DIR_ENV: &str = "GHOST_HUNT_LOG_DIR";

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Hunter as NAME:ID. Repeat for more hunters; prompts on stdin when omitted.
    #[arg(long = "hunter", value_name = "NAME:ID")]
    hunters: Vec<String>,
    #[arg(long)]
    seed: Option<u32>,
    /// Force the ghost type (e.g. `the_twins`) instead of drawing one from the seed.
    #[arg(long, value_parser = parse_ghost_type)]
    ghost_type: Option<GhostType>,
    /// Delay between actor ticks. Falls back to GHOST_HUNT_TICK_MS.
    #[arg(long)]
    tick_ms: Option<u64>,
    /// Directory for log_<id>.csv files. Falls back to GHOST_HUNT_LOG_DIR, then the
    /// working directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[arg(long)]
    no_audit: bool,
    #[arg(long)]
    summary_out: Option<PathBuf>,
    #[arg(long)]
    color: bool,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "startedAtMs")]
    started_at_ms: i64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: i64,
    #[serde(rename = "durationMs")]
    duration_ms: i64,
    #[serde(rename = "tickMs")]
    tick_ms: u64,
    #[serde(rename = "auditDir", skip_serializing_if = "Option::is_none")]
    audit_dir: Option<String>,
    report: InvestigationReport,
}

#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse();

    let tick_ms = resolve_tick_ms(cli.tick_ms, std::env::var(TICK_ENV).ok());
    let audit = resolve_audit_sink(cli.no_audit, cli.log_dir.clone(), std::env::var(LOG_DIR_ENV).ok());
    let audit_dir = match &audit {
        AuditSink::Directory(dir) => Some(dir.to_string_lossy().to_string()),
        _ => None,
    };

    let roster = match resolve_roster(&cli.hunters).await {
        Ok(roster) => roster,
        Err(error) => {
            error!(%error, "could not collect hunters");
            std::process::exit(1);
        }
    };

    let options = InvestigationOptions {
        tick: Duration::from_millis(tick_ms),
        seed: cli.seed,
        ghost_type: cli.ghost_type,
        audit,
        ..InvestigationOptions::default()
    };
    let started_at_ms = Utc::now().timestamp_millis();
    let report = match run_investigation(roster, options).await {
        Ok(report) => report,
        Err(error) => {
            error!(%error, "investigation aborted");
            std::process::exit(1);
        }
    };
    let finished_at_ms = Utc::now().timestamp_millis();

    print!("{}", report.render(cli.color));

    if let Some(path) = cli.summary_out.as_ref() {
        let summary = RunSummary {
            started_at_ms,
            finished_at_ms,
            duration_ms: finished_at_ms - started_at_ms,
            tick_ms,
            audit_dir,
            report,
        };
        if let Err(error) = write_summary(path, &summary) {
            error!(path = %path.display(), %error, "summary write failed");
            std::process::exit(2);
        }
        info!(path = %path.display(), "summary written");
    }
}

async fn resolve_roster(entries: &[String]) -> Result<Vec<HunterSpec>, SimError> {
    if !entries.is_empty() {
        return Ok(roster::parse_entries(entries)?);
    }
    tokio::task::spawn_blocking(|| {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        roster::collect_interactive(stdin.lock(), &mut stdout)
    })
    .await?
}

fn parse_ghost_type(value: &str) -> Result<GhostType, String> {
    GhostType::parse(value).ok_or_else(|| format!("unknown ghost type `{value}`"))
}

fn resolve_tick_ms(flag: Option<u64>, env: Option<String>) -> u64 {
    flag.or_else(|| env.and_then(|value| value.trim().parse().ok()))
        .unwrap_or(TICK_MS)
}

fn resolve_audit_sink(disabled: bool, flag: Option<PathBuf>, env: Option<String>) -> AuditSink {
    if disabled {
        return AuditSink::Disabled;
    }
    let dir = flag
        .or_else(|| env.filter(|value| !value.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    AuditSink::Directory(dir)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghost_hunt::case_file::CaseFileSnapshot;

    fn summary() -> RunSummary {
        RunSummary {
            started_at_ms: 1,
            finished_at_ms: 5,
            duration_ms: 4,
            tick_ms: 0,
            audit_dir: None,
            report: InvestigationReport::build(
                3,
                Vec::new(),
                CaseFileSnapshot::default(),
                GhostType::Yokai,
            ),
        }
    }

    #[test]
    fn ghost_type_flag_accepts_catalogue_tokens_only() {
        let cli = Cli::try_parse_from(["investigate", "--hunter", "Ada:1", "--ghost-type", "Onryo"])
            .expect("valid flags");
        assert_eq!(cli.ghost_type, Some(GhostType::Onryo));
        assert!(Cli::try_parse_from(["investigate", "--ghost-type", "casper"]).is_err());
        let cli = Cli::try_parse_from(["investigate"]).expect("no flags");
        assert_eq!(cli.ghost_type, None);
    }

    #[test]
    fn tick_flag_beats_env_and_bad_env_falls_back() {
        assert_eq!(resolve_tick_ms(Some(5), Some("50".to_string())), 5);
        assert_eq!(resolve_tick_ms(None, Some(" 50 ".to_string())), 50);
        assert_eq!(resolve_tick_ms(None, Some("fast".to_string())), TICK_MS);
        assert_eq!(resolve_tick_ms(None, None), TICK_MS);
    }

    #[test]
    fn audit_sink_resolution() {
        assert!(matches!(
            resolve_audit_sink(true, Some(PathBuf::from("logs")), None),
            AuditSink::Disabled
        ));
        match resolve_audit_sink(false, None, Some("from-env".to_string())) {
            AuditSink::Directory(dir) => assert_eq!(dir, PathBuf::from("from-env")),
            other => panic!("unexpected sink {other:?}"),
        }
        match resolve_audit_sink(false, Some(PathBuf::from("flag")), Some("env".to_string())) {
            AuditSink::Directory(dir) => assert_eq!(dir, PathBuf::from("flag")),
            other => panic!("unexpected sink {other:?}"),
        }
        match resolve_audit_sink(false, None, Some(String::new())) {
            AuditSink::Directory(dir) => assert_eq!(dir, PathBuf::from(".")),
            other => panic!("unexpected sink {other:?}"),
        }
    }

    #[tokio::test]
    async fn hunter_flags_skip_the_prompt() {
        let entries = vec!["Ada:1".to_string(), "Bo:2".to_string()];
        let roster = resolve_roster(&entries).await.expect("roster");
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[1].name, "Bo");

        let bad = vec!["Ada".to_string()];
        assert!(matches!(
            resolve_roster(&bad).await,
            Err(SimError::Roster(_))
        ));
    }

    #[test]
    fn write_summary_round_trips_report_fields() {
        let target = std::env::temp_dir().join(format!(
            "ghost-hunt-summary-{}-{}.json",
            std::process::id(),
            Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        write_summary(&target, &summary()).expect("write");
        let text = std::fs::read_to_string(&target).expect("read back");
        let value: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value["durationMs"], 4);
        assert_eq!(value["report"]["ghost"], "yokai");
        assert!(value.get("auditDir").is_none());
        let _ = std::fs::remove_file(&target);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!(
                "ghost-hunt-missing-{}",
                Utc::now().timestamp_millis()
            ))
            .join("summary.json");
        assert!(write_summary(&target, &summary()).is_err());
    }
}
