//! Non-interactive command line front end over a store snapshot.

pub mod output;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{ConfigManager, EngineConfig};
use crate::ledger::{calendar::iso_key, parse_iso_date, ItemKind, Mode};
use crate::projection::{CalendarMonth, DashboardYear, ProjectionIssue, Projector};
use crate::storage::{ProjectionSource, SnapshotFile};
use crate::time::FixedClock;
use crate::utils::build_info;

use output::{amount, Output};

#[derive(Parser)]
#[command(name = "budget_calendar_cli")]
#[command(about = "Project recurring budgets and ledger activity onto a calendar")]
pub struct Cli {
    /// Path to the engine configuration file
    #[arg(long, global = true, env = "BUDGET_CALENDAR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub plain: bool,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Twelve-month dashboard for a calendar year
    Year {
        #[arg(short, long)]
        snapshot: PathBuf,
        #[arg(short, long)]
        owner: String,
        #[arg(short, long)]
        year: i32,
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// Day-by-day calendar for one month
    Month {
        #[arg(short, long)]
        snapshot: PathBuf,
        #[arg(short, long)]
        owner: String,
        /// Month to show, as YYYY-MM
        #[arg(long)]
        month: String,
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,
        /// Pin "today" (YYYY-MM-DD); drives the projection horizon
        #[arg(long)]
        today: Option<String>,
    },
    /// Show build information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Business,
    Personal,
}

impl From<ModeArg> for Mode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Business => Mode::Business,
            ModeArg::Personal => Mode::Personal,
        }
    }
}

pub fn run_cli() -> Result<()> {
    run(Cli::parse())
}

pub fn run(cli: Cli) -> Result<()> {
    let out = Output::new(cli.plain);
    match cli.command {
        Commands::Version => {
            let info = build_info::current();
            out.line(format!(
                "budget_calendar {} ({} {}, built {} for {} with {})",
                info.version,
                info.git_hash,
                info.git_status,
                info.timestamp,
                info.target,
                info.rustc
            ));
            Ok(())
        }
        Commands::Year {
            ref snapshot,
            ref owner,
            year,
            mode,
        } => {
            let config = load_config(cli.config.as_ref(), mode)?;
            let source = open_snapshot(snapshot, &out)?;
            let inputs = source.load_inputs(owner, config.mode, year)?;
            let mode = config.mode;
            let currency = config.currency.clone();
            let mut projector = Projector::new(config);
            let dashboard = projector.dashboard_year(&inputs, year)?;
            report_issues(&out, &dashboard.issues);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&dashboard.months)?);
            } else {
                print_year(&out, mode, &currency, &dashboard);
            }
            Ok(())
        }
        Commands::Month {
            ref snapshot,
            ref owner,
            ref month,
            mode,
            ref today,
        } => {
            let first = parse_iso_date(&format!("{}-01", month.trim()))
                .with_context(|| format!("invalid month `{month}`, expected YYYY-MM"))?;
            let config = load_config(cli.config.as_ref(), mode)?;
            let source = open_snapshot(snapshot, &out)?;
            let inputs = source.load_inputs(owner, config.mode, first.year())?;
            let mode = config.mode;
            let currency = config.currency.clone();
            let mut projector = match today {
                Some(raw) => Projector::with_clock(config, FixedClock::on(parse_iso_date(raw)?)),
                None => Projector::new(config),
            };
            let view = projector.calendar_month(&inputs, first.year(), first.month())?;
            report_issues(&out, &view.issues);
            if cli.json {
                let days: std::collections::BTreeMap<_, _> = view
                    .days
                    .iter()
                    .map(|(date, bucket)| (iso_key(*date), bucket))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&days)?);
            } else {
                print_month(&out, mode, &currency, &view);
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&PathBuf>, mode: Option<ModeArg>) -> Result<EngineConfig> {
    let manager = match path {
        Some(path) => ConfigManager::new(path.clone()),
        None => ConfigManager::default_location(),
    };
    let config = manager
        .load()
        .with_context(|| format!("reading config {}", manager.path().display()))?;
    Ok(match mode {
        Some(mode) => config.with_mode(mode.into()),
        None => config,
    })
}

fn open_snapshot(path: &Path, out: &Output) -> Result<SnapshotFile> {
    let snapshot = SnapshotFile::open(path)
        .map_err(|err| anyhow!("cannot read snapshot {}: {err}", path.display()))?;
    for skipped in snapshot.skipped() {
        out.warning(skipped);
    }
    Ok(snapshot)
}

fn report_issues(out: &Output, issues: &[ProjectionIssue]) {
    for issue in issues {
        out.warning(issue);
    }
}

fn print_year(out: &Output, mode: Mode, currency: &str, dashboard: &DashboardYear) {
    out.section(format!("{} ({mode}, {currency})", dashboard.year));
    out.line(format!(
        "{:<6}{:>12}{:>12}{:>12}",
        "Month", "Revenue", "Expenses", "Net"
    ));
    for month in &dashboard.months {
        out.line(format!(
            "{:<6}{:>12}{:>12}{}",
            month.label(),
            amount(month.revenue),
            amount(month.expenses),
            out.signed(month.net())
        ));
    }
    out.line(format!(
        "{:<6}{:>12}{:>12}{}",
        "Total",
        amount(dashboard.totals.revenue),
        amount(dashboard.totals.expenses),
        out.signed(dashboard.totals.net)
    ));
}

fn print_month(out: &Output, mode: Mode, currency: &str, view: &CalendarMonth) {
    out.section(format!("{}-{:02} ({mode}, {currency})", view.year, view.month));
    if view.days.is_empty() {
        out.line("Nothing scheduled this month.");
    }
    for (date, bucket) in &view.days {
        out.line(format!(
            "{}  +{}  -{}",
            iso_key(*date),
            amount(bucket.income),
            amount(bucket.expense)
        ));
        for item in &bucket.items {
            let sign = match item.kind {
                ItemKind::Income => '+',
                ItemKind::Expense => '-',
            };
            let note = if item.counted { "" } else { " (not counted)" };
            out.line(format!(
                "    {sign}{:>10}  {}{note}",
                amount(item.amount),
                item.name
            ));
        }
    }
    let summary = &view.summary;
    out.line(format!(
        "Planned: +{} -{}   Actual: +{} -{}",
        amount(summary.planned_income),
        amount(summary.planned_expense),
        amount(summary.actual_income),
        amount(summary.actual_expense)
    ));
    out.line(format!("Net: {}", out.signed(summary.net).trim()));
}
