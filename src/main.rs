//zfind/src/main.rs
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use serde::Serialize;
use zfind::dom::{ArenaDocument, PageSnapshot};
use zfind::{config, FindInPage, FindOutcome, Selection};

mod logging;

const USAGE: &str =
    "usage: zfind <page.json> <phrase> [--select N] [--budget-ms N] [--log-dir DIR]";

struct Args {
    page: PathBuf,
    phrase: String,
    select: Option<i64>,
    budget_ms: Option<u64>,
    log_dir: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report {
    matches: usize,
    slices: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    selection: Option<Selection>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Option<Args> {
    let page = PathBuf::from(args.next()?);
    let phrase = args.next()?;
    let mut parsed = Args {
        page,
        phrase,
        select: None,
        budget_ms: None,
        log_dir: None,
    };
    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--select" => parsed.select = Some(args.next()?.parse().ok()?),
            "--budget-ms" => parsed.budget_ms = Some(args.next()?.parse().ok()?),
            "--log-dir" => parsed.log_dir = Some(PathBuf::from(args.next()?)),
            _ => return None,
        }
    }
    Some(parsed)
}

fn main() -> ExitCode {
    let Some(args) = parse_args(std::env::args().skip(1)) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    let _logging = logging::init(args.log_dir.as_deref());

    match run(&args) {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to encode report");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            tracing::error!(error = %e, page = %args.page.display(), "find failed");
            eprintln!("zfind: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> zfind::Result<Report> {
    let config = config::load_or_default();
    let data = std::fs::read_to_string(&args.page)?;
    let snapshot = PageSnapshot::from_json(&data)?;
    let doc = ArenaDocument::from_snapshot(&snapshot);

    let budget = args
        .budget_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.default_timeout());

    let mut engine = FindInPage::with_config(doc, &config);
    let mut outcome = engine.find_string(&args.phrase, budget);
    let mut slices = 1usize;
    while outcome == FindOutcome::Timeout {
        outcome = engine.pump_search(budget);
        slices += 1;
    }
    let matches = outcome.count().unwrap_or(0);
    tracing::info!(matches, slices, "search finished");

    let selection = args.select.map(|index| engine.select_visible_match(index));
    engine.stop();

    Ok(Report {
        matches,
        slices,
        selection,
    })
}
