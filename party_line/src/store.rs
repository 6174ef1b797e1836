use std::collections::{BTreeSet, HashMap};

use snafu::prelude::*;

use crate::config::*;
use crate::error::*;

/// An opaque fingerprint of the content of a store.
///
/// Two reads that return the same version are guaranteed to see the same
/// data, which is what the result cache relies on.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct StoreVersion(pub String);

/// Read-only access to the legislators, roll calls and votes.
///
/// Implementations must fail with [`EngineError::RollNotFound`] (or the other
/// not-found variants) when a requested id has no data, and with
/// [`EngineError::StoreUnavailable`] when the underlying storage cannot be
/// reached in time. Vote strings outside of the vocabulary must be reported
/// as [`EngineError::AmbiguousVocabulary`], never dropped.
pub trait VoteStore: Send + Sync {
    fn roll_call(&self, roll_id: RollId) -> EngineResult<RollCall>;

    /// The votes cast on a roll call, joined with the legislators, ordered by
    /// legislator id.
    fn votes_for_roll(&self, roll_id: RollId) -> EngineResult<Vec<RollVote>>;

    /// All the roll calls on record, ordered by id.
    fn all_roll_calls(&self) -> EngineResult<Vec<RollCall>>;

    fn legislators_by_state(&self, state: &str) -> EngineResult<Vec<Legislator>>;

    fn distinct_states(&self) -> EngineResult<BTreeSet<String>>;

    fn version(&self) -> EngineResult<StoreVersion>;

    /// All the votes cast by the legislators of a state.
    ///
    /// The provided implementation reads every roll call; stores that can
    /// filter on their side should override it.
    fn votes_for_state(&self, state: &str) -> EngineResult<Vec<CastVote>> {
        let mut res: Vec<CastVote> = Vec::new();
        for roll in self.all_roll_calls()? {
            for v in self.votes_for_roll(roll.roll_id)? {
                if v.legislator.state == state {
                    res.push(CastVote {
                        roll_id: roll.roll_id,
                        legislator_id: v.legislator.id,
                        value: v.value,
                    });
                }
            }
        }
        Ok(res)
    }
}

impl<S: VoteStore + ?Sized> VoteStore for &S {
    fn roll_call(&self, roll_id: RollId) -> EngineResult<RollCall> {
        (**self).roll_call(roll_id)
    }

    fn votes_for_roll(&self, roll_id: RollId) -> EngineResult<Vec<RollVote>> {
        (**self).votes_for_roll(roll_id)
    }

    fn all_roll_calls(&self) -> EngineResult<Vec<RollCall>> {
        (**self).all_roll_calls()
    }

    fn legislators_by_state(&self, state: &str) -> EngineResult<Vec<Legislator>> {
        (**self).legislators_by_state(state)
    }

    fn distinct_states(&self) -> EngineResult<BTreeSet<String>> {
        (**self).distinct_states()
    }

    fn version(&self) -> EngineResult<StoreVersion> {
        (**self).version()
    }

    fn votes_for_state(&self, state: &str) -> EngineResult<Vec<CastVote>> {
        (**self).votes_for_state(state)
    }
}

/// A store held in memory. Use [`crate::builder::Builder`] to create one.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    pub(crate) legislators: HashMap<String, Legislator>,
    // Ordered by roll id.
    pub(crate) rolls: Vec<RollCall>,
    // Per roll id, ordered by legislator id.
    pub(crate) votes: HashMap<RollId, Vec<(String, VoteValue)>>,
    pub(crate) version: StoreVersion,
}

impl MemoryStore {
    fn legislator(&self, legislator_id: &str) -> EngineResult<&Legislator> {
        self.legislators
            .get(legislator_id)
            .context(LegislatorNotFoundSnafu { legislator_id })
    }
}

impl VoteStore for MemoryStore {
    fn roll_call(&self, roll_id: RollId) -> EngineResult<RollCall> {
        self.rolls
            .binary_search_by_key(&roll_id, |r| r.roll_id)
            .ok()
            .map(|idx| self.rolls[idx].clone())
            .context(RollNotFoundSnafu { roll_id })
    }

    fn votes_for_roll(&self, roll_id: RollId) -> EngineResult<Vec<RollVote>> {
        let votes = match self.votes.get(&roll_id) {
            Some(votes) => votes,
            None => {
                // A roll call on record without any vote is valid.
                self.roll_call(roll_id)?;
                return Ok(Vec::new());
            }
        };
        let mut res: Vec<RollVote> = Vec::with_capacity(votes.len());
        for (legislator_id, value) in votes.iter() {
            res.push(RollVote {
                legislator: self.legislator(legislator_id)?.clone(),
                value: *value,
            });
        }
        Ok(res)
    }

    fn all_roll_calls(&self) -> EngineResult<Vec<RollCall>> {
        Ok(self.rolls.clone())
    }

    fn legislators_by_state(&self, state: &str) -> EngineResult<Vec<Legislator>> {
        let mut res: Vec<Legislator> = self
            .legislators
            .values()
            .filter(|l| l.state == state)
            .cloned()
            .collect();
        res.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(res)
    }

    fn distinct_states(&self) -> EngineResult<BTreeSet<String>> {
        Ok(self.legislators.values().map(|l| l.state.clone()).collect())
    }

    fn version(&self) -> EngineResult<StoreVersion> {
        Ok(self.version.clone())
    }

    fn votes_for_state(&self, state: &str) -> EngineResult<Vec<CastVote>> {
        let mut res: Vec<CastVote> = Vec::new();
        for roll in self.rolls.iter() {
            if let Some(votes) = self.votes.get(&roll.roll_id) {
                for (legislator_id, value) in votes.iter() {
                    if self.legislator(legislator_id)?.state == state {
                        res.push(CastVote {
                            roll_id: roll.roll_id,
                            legislator_id: legislator_id.clone(),
                            value: *value,
                        });
                    }
                }
            }
        }
        Ok(res)
    }
}
