mod config;
mod error;

pub mod batch;
pub mod builder;
pub mod cache;
pub mod dissent;
pub mod majority;
pub mod manual;
pub mod pivot;
pub mod store;
pub mod table;
pub mod tally;

#[cfg(test)]
mod testdata;

use std::collections::BTreeSet;

use log::{debug, info};
use snafu::prelude::*;

pub use crate::batch::CancellationToken;
pub use crate::cache::{CacheStats, ResultCache};
pub use crate::config::*;
pub use crate::error::*;
pub use crate::store::*;

use crate::cache::CacheKey;

/// The dissent and aggregation engine over a vote store.
///
/// The engine never writes to the store. All the results are recomputed from
/// the store on demand, unless a cache is attached with
/// [`Engine::with_cache`], in which case they are reused for as long as the
/// store reports the same version.
///
/// ```
/// use party_line::builder::Builder;
/// use party_line::*;
///
/// let store = Builder::new().build();
/// let engine = Engine::new(store, &EngineRules::DEFAULT_RULES);
/// let missing = RollId::new(2023, 1)?;
/// assert!(engine.dissenters_for_roll(missing, false).unwrap_err().is_not_found());
/// # Ok::<(), EngineError>(())
/// ```
pub struct Engine<S: VoteStore> {
    store: S,
    rules: EngineRules,
    cache: Option<ResultCache>,
}

impl<S: VoteStore> Engine<S> {
    pub fn new(store: S, rules: &EngineRules) -> Engine<S> {
        info!("Engine::new: rules: {:?}", rules);
        Engine {
            store,
            rules: rules.clone(),
            cache: None,
        }
    }

    pub fn with_cache(self) -> Engine<S> {
        Engine {
            cache: Some(ResultCache::new()),
            ..self
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rules(&self) -> &EngineRules {
        &self.rules
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|c| c.stats())
    }

    fn cached<T, F>(&self, key: CacheKey, compute: F) -> EngineResult<T>
    where
        T: cache::CacheEntry,
        F: FnOnce() -> EngineResult<T>,
    {
        match &self.cache {
            Some(cache) => {
                let version = self.store.version()?;
                cache.get_or_compute(&version, key, compute)
            }
            None => compute(),
        }
    }

    // The votes of a roll call, checked for duplicate legislators.
    fn roll_votes(&self, roll_id: RollId) -> EngineResult<Vec<RollVote>> {
        let votes = self.store.votes_for_roll(roll_id)?;
        dissent::check_votes(roll_id, &votes)?;
        Ok(votes)
    }

    /// The majority value of each party on a roll call, sorted by party.
    pub fn majority_for_roll(&self, roll_id: RollId) -> EngineResult<Vec<PartyMajority>> {
        self.cached(CacheKey::Majorities(roll_id), || {
            let votes = self.roll_votes(roll_id)?;
            majority::resolve(roll_id, &votes, self.rules.tiebreak_mode)
        })
    }

    /// The legislators who voted against the majority of their party on a
    /// roll call.
    ///
    /// An empty result is a valid answer (nobody dissented). A roll call that
    /// does not exist is an error.
    pub fn dissenters_for_roll(
        &self,
        roll_id: RollId,
        include_non_substantive: bool,
    ) -> EngineResult<Vec<DissentRecord>> {
        self.cached(
            CacheKey::Dissenters(roll_id, include_non_substantive),
            || {
                let votes = self.roll_votes(roll_id)?;
                let majorities = majority::resolve(roll_id, &votes, self.rules.tiebreak_mode)?;
                Ok(dissent::detect(
                    roll_id,
                    &votes,
                    &majorities,
                    include_non_substantive,
                ))
            },
        )
    }

    /// The roll call details and the count of each value cast on it.
    pub fn roll_tally(&self, roll_id: RollId) -> EngineResult<RollTally> {
        self.cached(CacheKey::Tally(roll_id), || {
            let roll = self.store.roll_call(roll_id)?;
            let votes = self.roll_votes(roll_id)?;
            Ok(tally::tally(&roll, &votes))
        })
    }

    /// The tallies of roll calls `first..=last` of a year, in roll call
    /// order.
    ///
    /// Roll calls that cannot be read are listed in the failures of the
    /// report; they do not abort the others.
    pub fn all_roll_tallies(
        &self,
        first: u32,
        last: u32,
        year: u32,
        cancel: &CancellationToken,
    ) -> EngineResult<BatchReport<RollTally>> {
        let roll_ids = roll_range(first, last, year)?;
        Ok(batch::run_rolls(
            &roll_ids,
            self.rules.workers,
            cancel,
            |roll_id| Ok(vec![self.roll_tally(roll_id)?]),
        ))
    }

    /// The dissenters of roll calls `1..=last` of a year, ordered by roll
    /// call and then as in [`Engine::dissenters_for_roll`].
    pub fn all_dissenters(
        &self,
        last: u32,
        year: u32,
        include_non_substantive: bool,
        cancel: &CancellationToken,
    ) -> EngineResult<BatchReport<DissentRecord>> {
        let roll_ids = roll_range(1, last, year)?;
        Ok(batch::run_rolls(
            &roll_ids,
            self.rules.workers,
            cancel,
            |roll_id| self.dissenters_for_roll(roll_id, include_non_substantive),
        ))
    }

    /// The vote counts of every legislator of a state, over all the roll
    /// calls on record.
    pub fn state_pivot(&self, state: &str) -> EngineResult<StatePivot> {
        self.cached(CacheKey::Pivot(state.to_string()), || {
            let legislators = self.store.legislators_by_state(state)?;
            ensure!(!legislators.is_empty(), StateNotFoundSnafu { state });
            let votes = self.store.votes_for_state(state)?;
            Ok(pivot::build(state, &legislators, &votes))
        })
    }

    pub fn states(&self) -> EngineResult<BTreeSet<String>> {
        self.store.distinct_states()
    }

    pub fn roll_calls(&self) -> EngineResult<Vec<RollCall>> {
        self.store.all_roll_calls()
    }

    /// The first and last roll call numbers on record for a year.
    pub fn roll_bounds(&self, year: u32) -> EngineResult<Option<(u32, u32)>> {
        let rolls = self.store.all_roll_calls()?;
        Ok(tally::roll_bounds(&rolls, year))
    }

    /// The last roll call number on record for a year.
    pub fn latest_roll_number(&self, year: u32) -> EngineResult<Option<u32>> {
        Ok(self.roll_bounds(year)?.map(|(_, last)| last))
    }
}

fn roll_range(first: u32, last: u32, year: u32) -> EngineResult<Vec<RollId>> {
    ensure!(first <= last, InvalidRangeSnafu { first, last });
    // Validates both ends before creating any id.
    RollId::new(year, first)?;
    RollId::new(year, last)?;
    let res: EngineResult<Vec<RollId>> = (first..=last).map(|n| RollId::new(year, n)).collect();
    debug!("roll_range: {}..={} of {}", first, last, year);
    res
}
