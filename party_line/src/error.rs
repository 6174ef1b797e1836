use snafu::prelude::*;

use crate::config::RollId;
use crate::config::VoteValue;

/// Errors raised by the engine and by the vote stores it reads from.
///
/// Single-roll operations return them directly. Multi-roll operations
/// collect them per roll in a [`crate::BatchReport`] instead of aborting.
#[derive(Debug, Snafu, Clone, PartialEq, Eq)]
#[snafu(visibility(pub))]
pub enum EngineError {
    #[snafu(display("Roll call {roll_id} not found"))]
    RollNotFound { roll_id: RollId },

    #[snafu(display("No legislators on record for state {state:?}"))]
    StateNotFound { state: String },

    #[snafu(display("Legislator {legislator_id:?} not found"))]
    LegislatorNotFound { legislator_id: String },

    #[snafu(display("Vote store unavailable: {reason}"))]
    StoreUnavailable { reason: String },

    #[snafu(display("Vote value {value:?} is not part of the roll-call vocabulary"))]
    AmbiguousVocabulary { value: String },

    #[snafu(display("Party {party:?} is tied between {tied:?} on roll call {roll_id}"))]
    TieBreakAmbiguity {
        roll_id: RollId,
        party: String,
        tied: Vec<VoteValue>,
    },

    #[snafu(display("Legislator {legislator_id:?} voted more than once on roll call {roll_id}"))]
    DuplicateVote {
        roll_id: RollId,
        legislator_id: String,
    },

    #[snafu(display("Roll call number {roll_number} must be between 1 and 999"))]
    RollNumberOutOfRange { roll_number: u64 },

    #[snafu(display("Year {year} is not a four-digit year"))]
    InvalidYear { year: u32 },

    #[snafu(display("Invalid roll call range {first}..={last}"))]
    InvalidRange { first: u32, last: u32 },
}

impl EngineError {
    /// True for the errors that mean "requested data is absent".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::RollNotFound { .. }
                | EngineError::StateNotFound { .. }
                | EngineError::LegislatorNotFound { .. }
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
