use crate::chamber::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub path: Option<String>,
    #[serde(rename = "csvDir")]
    pub csv_dir: Option<String>,
    #[serde(rename = "busyTimeoutMs")]
    pub busy_timeout_ms: Option<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesSettings {
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: Option<String>,
    #[serde(rename = "includeNonSubstantive")]
    pub include_non_substantive: Option<bool>,
    pub workers: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSettings {
    pub year: Option<u32>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    pub format: Option<String>,
    pub path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartylineConfig {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub rules: RulesSettings,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

pub fn read_config(path: &str) -> CliResult<PartylineConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read config: {:?}", contents);
    let config: PartylineConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(config)
}

/// Overrides the values of the configuration file with the command line flags.
pub fn merge_args(config: &PartylineConfig, args: &Args) -> PartylineConfig {
    let mut res = config.clone();
    if args.db.is_some() {
        res.database.path = args.db.clone();
        res.database.csv_dir = None;
    }
    if args.csv_dir.is_some() {
        res.database.csv_dir = args.csv_dir.clone();
        res.database.path = None;
    }
    if args.tiebreak_mode.is_some() {
        res.rules.tiebreak_mode = args.tiebreak_mode.clone();
    }
    if args.workers.is_some() {
        res.rules.workers = args.workers;
    }
    if args.format.is_some() {
        res.output.format = args.format.clone();
    }
    if args.out.is_some() {
        res.output.path = args.out.clone();
    }
    res
}

pub fn validate_rules(rules: &RulesSettings) -> CliResult<EngineRules> {
    let defaults = EngineRules::DEFAULT_RULES;
    let res = EngineRules {
        tiebreak_mode: match rules.tiebreak_mode.as_deref() {
            None | Some("vocabularyOrder") => TieBreakMode::VocabularyOrder,
            Some("lexicographic") => TieBreakMode::Lexicographic,
            Some("reject") => TieBreakMode::Reject,
            Some(x) => {
                whatever!(
                    "Cannot use tiebreak mode {:?}: expected vocabularyOrder, lexicographic or reject",
                    x
                )
            }
        },
        include_non_substantive: rules
            .include_non_substantive
            .unwrap_or(defaults.include_non_substantive),
        workers: match rules.workers {
            None => defaults.workers,
            Some(x) if x > 0 => x,
            Some(x) => {
                whatever!("Failed to understand workers option: {:?}: must be at least 1", x)
            }
        },
    };
    Ok(res)
}

pub fn output_format(output: &OutputSettings) -> CliResult<OutputFormat> {
    match output.format.as_deref() {
        None | Some("json") => Ok(OutputFormat::Json),
        Some("csv") => Ok(OutputFormat::Csv),
        Some(x) => whatever!("Unknown output format {:?}: expected json or csv", x),
    }
}
