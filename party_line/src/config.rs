// ********* Input data structures ***********

use std::collections::BTreeMap;
use std::fmt::Display;

use snafu::prelude::*;

use crate::error::*;

/// Base used to compose a roll call id out of a year and a roll call number.
pub const ROLL_BASE: u64 = 1000;

/// The identifier of a roll call: `year * 1000 + roll_number`.
///
/// The roll call number is always in `1..=999`, so that the id can be split
/// back into its year and number without ambiguity.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct RollId(u64);

impl RollId {
    pub fn new(year: u32, roll_number: u32) -> EngineResult<RollId> {
        ensure!((1000..=9999).contains(&year), InvalidYearSnafu { year });
        let roll_number = roll_number as u64;
        ensure!(
            (1..ROLL_BASE).contains(&roll_number),
            RollNumberOutOfRangeSnafu { roll_number }
        );
        Ok(RollId(year as u64 * ROLL_BASE + roll_number))
    }

    /// Validates an id read back from storage.
    pub fn from_raw(raw: u64) -> EngineResult<RollId> {
        let year = raw / ROLL_BASE;
        let year = u32::try_from(year).unwrap_or(u32::MAX);
        RollId::new(year, (raw % ROLL_BASE) as u32)
    }

    pub fn year(&self) -> u32 {
        (self.0 / ROLL_BASE) as u32
    }

    pub fn roll_number(&self) -> u32 {
        (self.0 % ROLL_BASE) as u32
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Display for RollId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three families of vote values.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum VoteCategory {
    Affirmative,
    Negative,
    /// Present or absent: not a position on the question.
    NonSubstantive,
}

/// All the values a legislator may cast on a roll call.
///
/// The vocabulary is closed. A value outside of it is a data error
/// ([`EngineError::AmbiguousVocabulary`]), never a new category.
///
/// The derived ordering is the declared vocabulary order: affirmative,
/// then negative, then non-substantive values, each group sorted by its
/// recorded string.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum VoteValue {
    Aye,
    Yea,
    Nay,
    No,
    NotVoting,
    Present,
}

impl VoteValue {
    pub const VOCABULARY: [VoteValue; 6] = [
        VoteValue::Aye,
        VoteValue::Yea,
        VoteValue::Nay,
        VoteValue::No,
        VoteValue::NotVoting,
        VoteValue::Present,
    ];

    pub fn parse(s: &str) -> EngineResult<VoteValue> {
        match s {
            "Aye" => Ok(VoteValue::Aye),
            "Yea" => Ok(VoteValue::Yea),
            "Nay" => Ok(VoteValue::Nay),
            "No" => Ok(VoteValue::No),
            "Not Voting" => Ok(VoteValue::NotVoting),
            "Present" => Ok(VoteValue::Present),
            x => AmbiguousVocabularySnafu { value: x }.fail(),
        }
    }

    /// The string recorded by the clerk for this value.
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteValue::Aye => "Aye",
            VoteValue::Yea => "Yea",
            VoteValue::Nay => "Nay",
            VoteValue::No => "No",
            VoteValue::NotVoting => "Not Voting",
            VoteValue::Present => "Present",
        }
    }

    pub fn category(&self) -> VoteCategory {
        match self {
            VoteValue::Aye | VoteValue::Yea => VoteCategory::Affirmative,
            VoteValue::Nay | VoteValue::No => VoteCategory::Negative,
            VoteValue::NotVoting | VoteValue::Present => VoteCategory::NonSubstantive,
        }
    }

    pub fn is_non_substantive(&self) -> bool {
        self.category() == VoteCategory::NonSubstantive
    }
}

impl Display for VoteValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A member of the chamber. Reference data: never modified by the engine.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Legislator {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Single letter affiliation ("D", "R", "I", ...).
    pub party: String,
    /// Qualifier on the affiliation, for example the party an independent
    /// caucuses with.
    pub party_designation: Option<String>,
    pub state: String,
    pub district: Option<String>,
    pub phone: Option<String>,
}

impl Legislator {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The row label of the state pivot. The party is part of the label so
    /// that namesakes from different parties stay apart.
    pub fn pivot_label(&self) -> String {
        match self.party_designation.as_deref() {
            Some(d) if !d.is_empty() => {
                format!("{} ({}, {})", self.display_name(), self.party, d)
            }
            _ => format!("{} ({})", self.display_name(), self.party),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RollCall {
    pub roll_id: RollId,
    pub question: Option<String>,
    pub date: Option<String>,
    pub result: Option<String>,
}

/// One vote on a roll call, joined with the legislator who cast it.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RollVote {
    pub legislator: Legislator,
    pub value: VoteValue,
}

/// One vote, without the legislator details.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CastVote {
    pub roll_id: RollId,
    pub legislator_id: String,
    pub value: VoteValue,
}

// ******** Output data structures *********

/// The most common value cast by the members of a party on a roll call.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PartyMajority {
    pub party: String,
    pub value: VoteValue,
    pub count: u64,
    /// The other values that reached the same count, if the tie-break had
    /// to be applied.
    pub tied_with: Vec<VoteValue>,
}

impl PartyMajority {
    pub fn is_tie(&self) -> bool {
        !self.tied_with.is_empty()
    }
}

/// A vote that departs from the majority of the legislator's party.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DissentRecord {
    pub roll_id: RollId,
    pub legislator_id: String,
    pub party: String,
    pub vote: VoteValue,
    pub first_name: String,
    pub last_name: String,
    pub state: String,
    pub district: Option<String>,
    pub phone: Option<String>,
    pub party_vote: VoteValue,
}

impl DissentRecord {
    pub fn name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The count of each value cast on one roll call.
///
/// The counts are sparse: a value nobody cast has no entry.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RollTally {
    pub roll: RollCall,
    pub counts: BTreeMap<VoteValue, u64>,
}

impl RollTally {
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn count(&self, value: VoteValue) -> Option<u64> {
        self.counts.get(&value).cloned()
    }

    /// The counts over the full vocabulary, with explicit zeros.
    pub fn dense_counts(&self) -> Vec<(VoteValue, u64)> {
        VoteValue::VOCABULARY
            .iter()
            .map(|v| (*v, self.count(*v).unwrap_or(0)))
            .collect()
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PivotRow {
    pub legislator_id: String,
    pub label: String,
    pub party: String,
    /// Aligned with [`StatePivot::columns`].
    pub counts: Vec<u64>,
}

/// Vote counts of every legislator of a state over all the roll calls on
/// record. Dense: every row has a count for every column.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StatePivot {
    pub state: String,
    pub columns: Vec<VoteValue>,
    pub rows: Vec<PivotRow>,
}

impl StatePivot {
    pub fn get(&self, legislator_id: &str, value: VoteValue) -> Option<u64> {
        let col = self.columns.iter().position(|c| *c == value)?;
        self.rows
            .iter()
            .find(|r| r.legislator_id == legislator_id)
            .and_then(|r| r.counts.get(col).cloned())
    }
}

/// A roll call that could not be computed during a multi-roll operation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RollFailure {
    pub roll_id: RollId,
    pub error: EngineError,
}

/// The result of a multi-roll operation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BatchReport<T> {
    /// The successful rows, in roll call order.
    pub rows: Vec<T>,
    /// The roll calls that failed, in roll call order.
    pub failures: Vec<RollFailure>,
    /// True if the operation was cancelled before all the roll calls were read.
    pub cancelled: bool,
    /// The roll calls that were never queried because of the cancellation.
    pub skipped: Vec<RollId>,
    /// The number of roll calls read without error.
    pub completed: usize,
}

// No `T: Default` bound, unlike the derive.
impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        BatchReport {
            rows: Vec::new(),
            failures: Vec::new(),
            cancelled: false,
            skipped: Vec::new(),
            completed: 0,
        }
    }
}

impl<T> BatchReport<T> {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    /// True if roll calls were read and every one of them failed.
    pub fn all_failed(&self) -> bool {
        self.completed == 0 && !self.failures.is_empty()
    }

    pub fn missing_rolls(&self) -> Vec<RollId> {
        self.failures
            .iter()
            .filter(|f| f.error.is_not_found())
            .map(|f| f.roll_id)
            .collect()
    }
}

// ********* Configuration **********

/// How to pick the majority of a party when several values share the
/// highest count.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    /// Affirmative over negative over non-substantive, then by the recorded
    /// string.
    VocabularyOrder,
    /// By the recorded string only.
    Lexicographic,
    /// Fail with [`EngineError::TieBreakAmbiguity`].
    Reject,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct EngineRules {
    pub tiebreak_mode: TieBreakMode,
    /// Whether a "Present" or "Not Voting" against the party majority counts
    /// as a dissent in the batch operations.
    pub include_non_substantive: bool,
    /// Upper bound on the roll calls read concurrently.
    pub workers: usize,
}

impl EngineRules {
    pub const DEFAULT_RULES: EngineRules = EngineRules {
        tiebreak_mode: TieBreakMode::VocabularyOrder,
        include_non_substantive: false,
        workers: 4,
    };
}
