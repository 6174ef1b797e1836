use clap::{Parser, Subcommand};

/// Finds the legislators who vote against their party, and tallies roll call votes.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. See the manual of the party_line
    /// library for the format. Options given on the command line take precedence.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The SQLite database holding the reps, rolls and votes tables. It is
    /// opened read-only.
    #[clap(long, value_parser)]
    pub db: Option<String>,

    /// (directory) Read the records from reps.csv, rolls.csv and votes.csv in this
    /// directory instead of a database.
    #[clap(long, value_parser)]
    pub csv_dir: Option<String>,

    /// (file path, 'stdout' or empty) Where to write the result. Defaults to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (default json) The output format: json or csv.
    #[clap(long, value_parser)]
    pub format: Option<String>,

    /// (file path) A reference file containing the expected output. If provided, partyline will
    /// check that the computed output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default 4) Maximum number of roll calls read at the same time.
    #[clap(long, value_parser)]
    pub workers: Option<usize>,

    /// (default vocabularyOrder) How to break a tie for the majority of a party:
    /// vocabularyOrder, lexicographic or reject.
    #[clap(long, value_parser)]
    pub tiebreak_mode: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// The majority vote of each party on one roll call.
    Majority {
        #[clap(long, value_parser)]
        roll: u32,
        #[clap(long, value_parser)]
        year: Option<u32>,
    },
    /// The legislators who voted against their party majority on one roll call.
    Dissenters {
        #[clap(long, value_parser)]
        roll: u32,
        #[clap(long, value_parser)]
        year: Option<u32>,
        /// Also report "Present" and "Not Voting" against the party majority.
        #[clap(long, takes_value = false)]
        include_non_votes: bool,
    },
    /// The count of each vote value on one roll call.
    Tally {
        #[clap(long, value_parser)]
        roll: u32,
        #[clap(long, value_parser)]
        year: Option<u32>,
    },
    /// The tallies of a range of roll calls. Defaults to all the roll calls of the year.
    Tallies {
        #[clap(long, value_parser)]
        first: Option<u32>,
        #[clap(long, value_parser)]
        last: Option<u32>,
        #[clap(long, value_parser)]
        year: Option<u32>,
    },
    /// The dissenters of roll calls 1 to --last. Defaults to the latest roll call of the year.
    AllDissenters {
        #[clap(long, value_parser)]
        last: Option<u32>,
        #[clap(long, value_parser)]
        year: Option<u32>,
        #[clap(long, takes_value = false)]
        include_non_votes: bool,
    },
    /// The vote counts of every legislator of a state.
    Pivot {
        #[clap(long, value_parser)]
        state: String,
    },
    /// The states with at least one legislator on record.
    States,
    /// The roll calls on record.
    Rolls,
}
