//! Thin command-line scheduler over a JSON ledger document.

pub mod output;

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::{
    config::{ConfigManager, PlannerConfig},
    core::{
        lookup::LookupContext,
        services::{
            BalanceService, EntryService, ExpansionRegistry, MaterializationReport,
            MaterializeService, ProjectionService,
        },
        time::SystemClock,
    },
    errors::CliError,
    ledger::{EntryId, EntryStatus, PersonId},
    storage::{ledger_warnings, JsonStore},
    utils::{
        build_info,
        paths::{app_data_dir, ledger_file_in},
    },
};

type CliResult<T> = Result<T, CliError>;

#[derive(Parser, Debug)]
#[command(name = "movement_planner_cli")]
#[command(about = "Materializes and projects planned household movements")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Writes pending entries for every rule between two dates, once.
    Materialize(MaterializeArgs),
    /// Prints projected and actual totals per bucket for one month.
    Project(ProjectArgs),
    /// Marks an entry CONFIRMED and records the account balance.
    Confirm(EntryArgs),
    /// Moves an entry back to PENDING and drops its balance snapshot.
    Revert(EntryArgs),
    /// Lists dangling references in a ledger document.
    Check(LedgerArgs),
    /// Prints build metadata.
    Version,
}

#[derive(Args, Debug)]
pub struct LedgerArgs {
    /// Ledger document; `-` picks the configured default ledger.
    pub ledger: PathBuf,
}

#[derive(Args, Debug)]
pub struct MaterializeArgs {
    /// Ledger document; `-` picks the configured default ledger.
    pub ledger: PathBuf,
    /// First day of the window (YYYY-MM-DD).
    #[arg(value_parser = parse_date)]
    pub from: NaiveDate,
    /// Last day of the window (YYYY-MM-DD).
    #[arg(value_parser = parse_date)]
    pub to: NaiveDate,
}

#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Ledger document; `-` picks the configured default ledger.
    pub ledger: PathBuf,
    pub year: i32,
    #[arg(value_parser = clap::value_parser!(u32).range(1..=12))]
    pub month: u32,
    /// Only count rules and entries owned by this person.
    pub person: Option<PersonId>,
}

#[derive(Args, Debug)]
pub struct EntryArgs {
    /// Ledger document; `-` picks the configured default ledger.
    pub ledger: PathBuf,
    pub entry_id: EntryId,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("`{raw}` is not a YYYY-MM-DD date"))
}

/// Runs the command named by the process arguments; clap exits on bad usage.
pub fn run_cli() -> CliResult<()> {
    execute(Cli::parse())
}

/// Parses `args` (binary name first) and runs the command.
pub fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    execute(Cli::try_parse_from(args)?)
}

pub fn execute(cli: Cli) -> CliResult<()> {
    match cli.command {
        Command::Version => {
            println!("{}", build_info::current().summary());
            Ok(())
        }
        Command::Materialize(args) => materialize(&args.ledger, args.from, args.to),
        Command::Project(args) => project(&args.ledger, args.year, args.month, args.person),
        Command::Confirm(args) => {
            change_status(&args.ledger, args.entry_id, EntryStatus::Confirmed)
        }
        Command::Revert(args) => change_status(&args.ledger, args.entry_id, EntryStatus::Pending),
        Command::Check(args) => check(&args.ledger),
    }
}

fn materialize(path: &Path, from: NaiveDate, to: NaiveDate) -> CliResult<()> {
    let config = load_config()?;
    let mut store = JsonStore::open(resolve_ledger_path(path, &config))?;
    let ledger = store.ledger();
    let rules = ledger.rules.all().to_vec();
    let tables = ledger.lookups.clone();
    let lookups = LookupContext::new(&tables, &config);
    let registry = ExpansionRegistry::from_config(&config)?;

    let report = MaterializeService::materialize(&mut store, &lookups, &registry, &rules, from, to)?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &MaterializationReport) {
    output::success(format!(
        "{} inserted, {} skipped ({} to {})",
        report.inserted_count, report.skipped_count, report.window.start, report.window.end
    ));
    for failure in &report.per_rule_errors {
        output::warning(format!(
            "rule `{}` failed ({}): {}",
            failure.description, failure.kind, failure.message
        ));
    }
}

fn project(path: &Path, year: i32, month: u32, person: Option<PersonId>) -> CliResult<()> {
    let config = load_config()?;
    let store = JsonStore::open(resolve_ledger_path(path, &config))?;
    let ledger = store.ledger();
    let lookups = LookupContext::new(&ledger.lookups, &config);

    let projected = ProjectionService::project(ledger.rules.all(), year, month, person, &lookups)?;
    let actual = ProjectionService::actual_totals(&ledger.entries, year, month, person)?;

    output::section(format!("Projection {year}-{month:02}"));
    for row in ProjectionService::compare(&projected, &actual) {
        let category = ledger
            .lookups
            .category(row.category_id)
            .map_or_else(|| row.category_id.to_string(), |c| c.name.clone());
        let kind = ledger
            .lookups
            .transaction_type(row.type_id)
            .map_or_else(|| row.type_id.to_string(), |t| t.name.clone());
        output::info(format!(
            "{category} / {kind}: projected {} actual {} difference {}",
            row.projected, row.actual, row.difference
        ));
    }
    output::success(format!(
        "total projected {}",
        ProjectionService::total(&projected)
    ));
    Ok(())
}

fn change_status(path: &Path, id: EntryId, status: EntryStatus) -> CliResult<()> {
    let config = load_config()?;
    let mut store = JsonStore::open(resolve_ledger_path(path, &config))?;
    let tables = store.ledger().lookups.clone();
    let lookups = LookupContext::new(&tables, &config);
    let clock = SystemClock;
    let service = EntryService::new(&lookups, &clock);

    let (entry, _) = service.set_status(&mut store, id, status)?;
    let balance = BalanceService::current_balance(&store, entry.account_id)?;
    output::success(format!(
        "entry {} is now {:?}; account {} balance {}",
        entry.id, entry.status, entry.account_id, balance
    ));
    Ok(())
}

fn check(path: &Path) -> CliResult<()> {
    let config = load_config()?;
    let store = JsonStore::open(resolve_ledger_path(path, &config))?;
    let warnings = ledger_warnings(store.ledger());
    if warnings.is_empty() {
        output::success("no problems found");
    }
    for warning in warnings {
        output::warning(warning);
    }
    Ok(())
}

fn load_config() -> CliResult<PlannerConfig> {
    Ok(ConfigManager::new()?.load()?)
}

fn resolve_ledger_path(raw: &Path, config: &PlannerConfig) -> PathBuf {
    if raw != Path::new("-") {
        return raw.to_path_buf();
    }
    config
        .ledger_file
        .clone()
        .unwrap_or_else(|| ledger_file_in(&app_data_dir(), "default"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("movement_planner_cli").chain(args.iter().copied()))
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn materialize_parses_dates() {
        let cli = parse(&["materialize", "x.json", "2024-02-01", "2024-04-30"]).unwrap();
        match cli.command {
            Command::Materialize(args) => {
                assert_eq!(args.ledger, PathBuf::from("x.json"));
                assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
                assert_eq!(args.to, NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn project_takes_an_optional_person() {
        let cli = parse(&["project", "-", "2024", "3", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Project(ProjectArgs {
                year: 2024,
                month: 3,
                person: Some(2),
                ..
            })
        ));
        let cli = parse(&["project", "-", "2024", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Project(ProjectArgs { person: None, .. })
        ));
    }

    #[test]
    fn bad_arguments_are_rejected_before_io() {
        assert!(parse(&["materialize", "x.json", "2024-13-01", "2024-01-31"]).is_err());
        assert!(parse(&["confirm", "x.json"]).is_err());
        assert!(parse(&["project", "x.json", "twenty", "1"]).is_err());
        assert!(parse(&["project", "x.json", "2024", "13"]).is_err());
        assert!(parse(&["launch"]).is_err());
        assert!(parse(&[]).is_err());

        let err = run_with_args(["movement_planner_cli", "revert", "x.json", "one"]).unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }

    #[test]
    fn dash_resolves_to_configured_ledger() {
        let config = PlannerConfig {
            ledger_file: Some(PathBuf::from("/tmp/household.json")),
            ..PlannerConfig::default()
        };
        assert_eq!(
            resolve_ledger_path(Path::new("-"), &config),
            PathBuf::from("/tmp/household.json")
        );
        assert_eq!(
            resolve_ledger_path(Path::new("a.json"), &config),
            PathBuf::from("a.json")
        );
    }
}
