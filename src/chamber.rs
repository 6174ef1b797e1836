pub mod config_reader;
pub mod io_common;
pub mod io_csv;
pub mod io_sqlite;

use log::{debug, info, warn};

use party_line::table::{self, Cell, Table};
use party_line::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::time::Duration;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;

pub use crate::args::{Args, Command};
use crate::chamber::config_reader::*;
use crate::chamber::io_common::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
    #[snafu(display("{source}"))]
    Engine { source: EngineError },

    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error rendering the output as JSON"))]
    RenderingJson { source: serde_json::Error },

    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno} of {path}"))]
    CsvRecord {
        source: csv::Error,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Invalid record at line {lineno} of {path}: {source}"))]
    CsvContent {
        source: EngineError,
        path: String,
        lineno: usize,
    },
    #[snafu(display("Error rendering the output as CSV"))]
    CsvWrite { source: csv::Error },

    #[snafu(display("Error writing the output to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type CliResult<T> = Result<T, CliError>;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Csv,
}

/// The result of a command, before rendering.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub table: Table,
    /// Only for the multi-roll commands.
    pub batch: Option<BatchSummary>,
    /// Extra fields added next to the rows in the JSON rendering.
    pub metadata: JSMap<String, JSValue>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub failures: Vec<RollFailure>,
    pub cancelled: bool,
    pub skipped: Vec<RollId>,
    pub completed: usize,
}

impl CommandOutput {
    fn single(table: Table) -> CommandOutput {
        CommandOutput {
            table,
            batch: None,
            metadata: JSMap::new(),
        }
    }

    fn from_batch<T>(report: BatchReport<T>, to_table: impl Fn(&[T]) -> Table) -> CommandOutput {
        CommandOutput {
            table: to_table(&report.rows),
            batch: Some(BatchSummary {
                failures: report.failures,
                cancelled: report.cancelled,
                skipped: report.skipped,
                completed: report.completed,
            }),
            metadata: JSMap::new(),
        }
    }
}

pub fn run(args: &Args) -> CliResult<()> {
    let file_config = match &args.config {
        Some(path) => read_config(path)?,
        None => PartylineConfig::default(),
    };
    let config = merge_args(&file_config, args);
    info!("run: configuration: {:?}", config);
    let rules = validate_rules(&config.rules)?;
    let format = output_format(&config.output)?;

    let output = match (&config.database.path, &config.database.csv_dir) {
        (Some(path), _) => {
            let timeout = config
                .database
                .busy_timeout_ms
                .unwrap_or(DEFAULT_BUSY_TIMEOUT_MS);
            let store =
                io_sqlite::SqliteStore::open(path, Duration::from_millis(timeout), rules.workers)
                    .context(EngineSnafu)?;
            let engine = Engine::new(store, &rules).with_cache();
            run_command(&engine, &args.command, &config)?
        }
        (None, Some(dir)) => {
            let store = io_csv::read_csv_dir(dir)?;
            let engine = Engine::new(store, &rules);
            run_command(&engine, &args.command, &config)?
        }
        (None, None) => {
            whatever!("No vote store given: pass --db or --csv-dir, or set database.path in the configuration file")
        }
    };

    report_batch(&output);

    let rendered = match format {
        OutputFormat::Json => {
            let js = output_to_json(&output);
            serde_json::to_string_pretty(&js).context(RenderingJsonSnafu)?
        }
        OutputFormat::Csv => table_to_csv(&output.table)?,
    };
    emit(config.output.path.as_deref(), &rendered)?;
    check_outcome(&output)?;

    // The reference output, if provided for comparison
    if let Some(reference_path) = &args.reference {
        check_reference(reference_path, &rendered, format)?;
    }
    Ok(())
}

fn run_command<S: VoteStore>(
    engine: &Engine<S>,
    command: &Command,
    config: &PartylineConfig,
) -> CliResult<CommandOutput> {
    debug!("run_command: {:?}", command);
    let include_default = engine.rules().include_non_substantive;
    let res = match command {
        Command::Majority { roll, year } => {
            let roll_id = roll_id(*roll, *year, config)?;
            let majorities = engine.majority_for_roll(roll_id).context(EngineSnafu)?;
            CommandOutput::single(table::majority_table(roll_id, &majorities))
        }
        Command::Dissenters {
            roll,
            year,
            include_non_votes,
        } => {
            let roll_id = roll_id(*roll, *year, config)?;
            let records = engine
                .dissenters_for_roll(roll_id, *include_non_votes || include_default)
                .context(EngineSnafu)?;
            CommandOutput::single(table::dissent_table(&records))
        }
        Command::Tally { roll, year } => {
            let roll_id = roll_id(*roll, *year, config)?;
            let tally = engine.roll_tally(roll_id).context(EngineSnafu)?;
            CommandOutput::single(table::tally_table(&[tally]))
        }
        Command::Tallies { first, last, year } => {
            let year = session_year(*year, config)?;
            let bounds = engine.roll_bounds(year).context(EngineSnafu)?;
            let range = match (first, last, bounds) {
                (Some(f), Some(l), _) => Some((*f, *l)),
                (f, l, Some((bf, bl))) => Some((f.unwrap_or(bf), l.unwrap_or(bl))),
                (_, _, None) => None,
            };
            match range {
                Some((first, last)) => {
                    let report = engine
                        .all_roll_tallies(first, last, year, &CancellationToken::new())
                        .context(EngineSnafu)?;
                    CommandOutput::from_batch(report, table::tally_table)
                }
                None => {
                    info!("run_command: no roll call on record for {}", year);
                    CommandOutput::from_batch(BatchReport::default(), table::tally_table)
                }
            }
        }
        Command::AllDissenters {
            last,
            year,
            include_non_votes,
        } => {
            let year = session_year(*year, config)?;
            let last = match last {
                Some(l) => Some(*l),
                None => engine.latest_roll_number(year).context(EngineSnafu)?,
            };
            match last {
                Some(last) => {
                    let report = engine
                        .all_dissenters(
                            last,
                            year,
                            *include_non_votes || include_default,
                            &CancellationToken::new(),
                        )
                        .context(EngineSnafu)?;
                    CommandOutput::from_batch(report, table::dissent_table)
                }
                None => {
                    info!("run_command: no roll call on record for {}", year);
                    CommandOutput::from_batch(BatchReport::default(), table::dissent_table)
                }
            }
        }
        Command::Pivot { state } => {
            let pivot = engine.state_pivot(state).context(EngineSnafu)?;
            let mut output = CommandOutput::single(table::pivot_table(&pivot));
            let parties: JSMap<String, JSValue> = pivot
                .rows
                .iter()
                .map(|r| (r.label.clone(), json!(r.party)))
                .collect();
            output.metadata.insert("state".to_string(), json!(pivot.state));
            output
                .metadata
                .insert("parties".to_string(), JSValue::Object(parties));
            output
        }
        Command::States => {
            let states = engine.states().context(EngineSnafu)?;
            CommandOutput::single(Table {
                columns: vec!["state".to_string()],
                rows: states.into_iter().map(|s| vec![Cell::Text(s)]).collect(),
            })
        }
        Command::Rolls => {
            let rolls = engine.roll_calls().context(EngineSnafu)?;
            CommandOutput::single(table::roll_table(&rolls))
        }
    };
    Ok(res)
}

fn session_year(year: Option<u32>, config: &PartylineConfig) -> CliResult<u32> {
    match year.or(config.session.year) {
        Some(y) => Ok(y),
        None => whatever!("No year given: pass --year or set session.year in the configuration file"),
    }
}

fn roll_id(roll: u32, year: Option<u32>, config: &PartylineConfig) -> CliResult<RollId> {
    let year = session_year(year, config)?;
    RollId::new(year, roll).context(EngineSnafu)
}

// Failed and skipped roll calls go to the error stream, whatever the format.
fn report_batch(output: &CommandOutput) {
    if let Some(batch) = &output.batch {
        if !batch.failures.is_empty() {
            eprintln!("Failed rolls:");
            for f in batch.failures.iter() {
                eprintln!("  {}: {}", f.roll_id, f.error);
            }
        }
        if batch.cancelled {
            warn!(
                "report_batch: cancelled, {} roll calls not read",
                batch.skipped.len()
            );
        }
    }
}

// A batch where every roll call failed is an error, not an empty result.
fn check_outcome(output: &CommandOutput) -> CliResult<()> {
    if let Some(batch) = &output.batch {
        if batch.completed == 0 && !batch.failures.is_empty() {
            whatever!(
                "All {} roll calls failed, no result was computed",
                batch.failures.len()
            )
        }
    }
    if output.table.is_empty() {
        eprintln!("No rows: the command succeeded with an empty result.");
    }
    Ok(())
}

pub fn output_to_json(output: &CommandOutput) -> JSValue {
    let mut res: JSMap<String, JSValue> = JSMap::new();
    for (k, v) in output.metadata.iter() {
        res.insert(k.clone(), v.clone());
    }
    res.insert("rows".to_string(), JSValue::Array(table_to_json(&output.table)));
    if let Some(batch) = &output.batch {
        let failures: Vec<JSValue> = batch
            .failures
            .iter()
            .map(|f| json!({"roll_id": f.roll_id.raw(), "error": f.error.to_string()}))
            .collect();
        res.insert("failures".to_string(), JSValue::Array(failures));
        res.insert("cancelled".to_string(), json!(batch.cancelled));
        let skipped: Vec<u64> = batch.skipped.iter().map(|r| r.raw()).collect();
        res.insert("skipped".to_string(), json!(skipped));
    }
    JSValue::Object(res)
}
