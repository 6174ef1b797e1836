use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};
use snafu::prelude::*;

use crate::config::*;
use crate::error::*;
use crate::store::{MemoryStore, StoreVersion};

/// A builder for an in-memory vote store.
///
/// The builder checks the invariants of the vote records as they are added:
/// a vote refers to a known roll call and a known legislator, its value is
/// part of the vocabulary, and each legislator votes at most once per roll
/// call.
///
/// ```
/// use party_line::builder::Builder;
/// use party_line::*;
/// # use party_line::EngineError;
///
/// let mut builder = Builder::new();
/// builder.add_legislator(Legislator {
///     id: "A000001".to_string(),
///     first_name: "Ada".to_string(),
///     last_name: "Adams".to_string(),
///     party: "D".to_string(),
///     party_designation: None,
///     state: "CA".to_string(),
///     district: Some("12".to_string()),
///     phone: None,
/// })?;
/// let roll_id = RollId::new(2023, 1)?;
/// builder.add_roll_call(RollCall {
///     roll_id,
///     question: Some("On Passage".to_string()),
///     date: None,
///     result: None,
/// })?;
/// builder.add_vote(roll_id, "A000001", "Yea")?;
/// let store = builder.build();
/// assert_eq!(store.votes_for_roll(roll_id)?.len(), 1);
///
/// # Ok::<(), EngineError>(())
/// ```
#[derive(Debug, Default)]
pub struct Builder {
    pub(crate) _legislators: HashMap<String, Legislator>,
    pub(crate) _rolls: BTreeMap<RollId, RollCall>,
    pub(crate) _votes: HashMap<RollId, BTreeMap<String, VoteValue>>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    pub fn add_legislator(&mut self, legislator: Legislator) -> EngineResult<()> {
        if let Some(previous) = self._legislators.get(&legislator.id) {
            if *previous != legislator {
                warn!(
                    "add_legislator: replacing legislator {:?}: {:?} -> {:?}",
                    legislator.id, previous, legislator
                );
            }
        }
        self._legislators.insert(legislator.id.clone(), legislator);
        Ok(())
    }

    pub fn add_roll_call(&mut self, roll: RollCall) -> EngineResult<()> {
        self._rolls.insert(roll.roll_id, roll);
        Ok(())
    }

    /// Adds a vote, as recorded by the clerk.
    ///
    /// The value must be one of the strings of the vocabulary ("Yea", "Aye",
    /// "Nay", "No", "Present", "Not Voting").
    pub fn add_vote(&mut self, roll_id: RollId, legislator_id: &str, value: &str) -> EngineResult<()> {
        let value = VoteValue::parse(value)?;
        self.add_cast_vote(&CastVote {
            roll_id,
            legislator_id: legislator_id.to_string(),
            value,
        })
    }

    pub fn add_cast_vote(&mut self, vote: &CastVote) -> EngineResult<()> {
        let roll_id = vote.roll_id;
        ensure!(self._rolls.contains_key(&roll_id), RollNotFoundSnafu { roll_id });
        ensure!(
            self._legislators.contains_key(&vote.legislator_id),
            LegislatorNotFoundSnafu {
                legislator_id: vote.legislator_id.clone()
            }
        );
        let roll_votes = self._votes.entry(roll_id).or_default();
        ensure!(
            !roll_votes.contains_key(&vote.legislator_id),
            DuplicateVoteSnafu {
                roll_id,
                legislator_id: vote.legislator_id.clone()
            }
        );
        roll_votes.insert(vote.legislator_id.clone(), vote.value);
        Ok(())
    }

    pub fn build(self) -> MemoryStore {
        let version = fingerprint(&self);
        debug!(
            "build: {} legislators, {} roll calls, version {}",
            self._legislators.len(),
            self._rolls.len(),
            version.0
        );
        MemoryStore {
            legislators: self._legislators,
            rolls: self._rolls.into_values().collect(),
            votes: self
                ._votes
                .into_iter()
                .map(|(roll_id, votes)| (roll_id, votes.into_iter().collect()))
                .collect(),
            version,
        }
    }
}

// A digest of a canonical listing of all the records.
fn fingerprint(builder: &Builder) -> StoreVersion {
    let mut listing = String::new();
    let mut legislators: Vec<&Legislator> = builder._legislators.values().collect();
    legislators.sort_by(|a, b| a.id.cmp(&b.id));
    for l in legislators {
        listing.push_str(&format!("L|{:?}\n", l));
    }
    for (roll_id, roll) in builder._rolls.iter() {
        listing.push_str(&format!("R|{}|{:?}\n", roll_id, roll));
        if let Some(votes) = builder._votes.get(roll_id) {
            for (legislator_id, value) in votes.iter() {
                listing.push_str(&format!("V|{}|{}|{}\n", roll_id, legislator_id, value));
            }
        }
    }
    StoreVersion(sha256::digest(listing))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::*;

    #[test]
    fn rejects_unknown_vote_value() {
        let mut b = Builder::new();
        b.add_legislator(rep("a", "D")).unwrap();
        b.add_roll_call(roll_call(1)).unwrap();
        assert_eq!(
            b.add_vote(roll(1), "a", "Abstain"),
            Err(EngineError::AmbiguousVocabulary {
                value: "Abstain".to_string()
            })
        );
    }

    #[test]
    fn rejects_second_vote_of_a_legislator() {
        let mut b = Builder::new();
        b.add_legislator(rep("a", "D")).unwrap();
        b.add_roll_call(roll_call(1)).unwrap();
        b.add_vote(roll(1), "a", "Yea").unwrap();
        assert_eq!(
            b.add_vote(roll(1), "a", "Nay"),
            Err(EngineError::DuplicateVote {
                roll_id: roll(1),
                legislator_id: "a".to_string()
            })
        );
    }

    #[test]
    fn rejects_dangling_references() {
        let mut b = Builder::new();
        b.add_legislator(rep("a", "D")).unwrap();
        assert!(b.add_vote(roll(1), "a", "Yea").unwrap_err().is_not_found());
        b.add_roll_call(roll_call(1)).unwrap();
        assert_eq!(
            b.add_vote(roll(1), "zz", "Yea"),
            Err(EngineError::LegislatorNotFound {
                legislator_id: "zz".to_string()
            })
        );
    }

    #[test]
    fn version_follows_content() {
        let v1 = small_chamber().version;
        let v2 = small_chamber().version;
        assert_eq!(v1, v2);

        let mut b = small_chamber_builder();
        b.add_roll_call(roll_call(9)).unwrap();
        b.add_vote(roll(9), "d1", "Yea").unwrap();
        assert_ne!(b.build().version, v1);
    }

    #[test]
    fn version_follows_each_vote() {
        let with_vote = |value: &str| {
            let mut b = small_chamber_builder();
            b.add_vote(roll(3), "d1", value).unwrap();
            b
        };
        let yea = with_vote("Yea");
        let v_yea = fingerprint(&yea);
        assert_eq!(yea.build().version, v_yea);
        assert_ne!(fingerprint(&with_vote("Nay")), v_yea);
        assert_ne!(small_chamber().version, v_yea);
    }
}
