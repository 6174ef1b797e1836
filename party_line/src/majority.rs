use std::collections::BTreeMap;

use log::debug;
use snafu::prelude::*;

use crate::config::*;
use crate::error::*;

/// Computes the majority value of every party present in the votes of one
/// roll call.
///
/// Every recorded value takes part in the count, including "Present" and
/// "Not Voting". A party with no vote on the roll call gets no entry, so its
/// members can never be flagged as dissenters on it.
///
/// The result is sorted by party.
pub fn resolve(
    roll_id: RollId,
    votes: &[RollVote],
    tiebreak: TieBreakMode,
) -> EngineResult<Vec<PartyMajority>> {
    let mut counts: BTreeMap<&str, BTreeMap<VoteValue, u64>> = BTreeMap::new();
    for v in votes.iter() {
        let e = counts
            .entry(v.legislator.party.as_str())
            .or_default()
            .entry(v.value)
            .or_insert(0);
        *e += 1;
    }

    let mut res: Vec<PartyMajority> = Vec::new();
    for (party, tally) in counts.iter() {
        // Not empty: a party only shows up after one of its votes.
        let max_count = match tally.values().max() {
            Some(c) => *c,
            None => continue,
        };
        let mut all_largest: Vec<VoteValue> = tally
            .iter()
            .filter_map(|(v, c)| if *c == max_count { Some(*v) } else { None })
            .collect();

        if all_largest.len() > 1 {
            ensure!(
                tiebreak != TieBreakMode::Reject,
                TieBreakAmbiguitySnafu {
                    roll_id,
                    party: *party,
                    tied: all_largest.clone(),
                }
            );
            sort_for_tiebreak(&mut all_largest, tiebreak);
            debug!(
                "resolve: roll {}: party {} tied between {:?} with {} votes each, picking {:?}",
                roll_id, party, all_largest, max_count, all_largest[0]
            );
        }

        let value = all_largest.remove(0);
        res.push(PartyMajority {
            party: party.to_string(),
            value,
            count: max_count,
            tied_with: all_largest,
        });
    }
    debug!("resolve: roll {}: majorities {:?}", roll_id, res);
    Ok(res)
}

// The winner of the tie-break comes first.
fn sort_for_tiebreak(values: &mut [VoteValue], tiebreak: TieBreakMode) {
    match tiebreak {
        TieBreakMode::VocabularyOrder | TieBreakMode::Reject => values.sort(),
        TieBreakMode::Lexicographic => values.sort_by_key(|v| v.as_str()),
    }
}

/// Looks up the majority of one party in the output of [`resolve`].
pub fn majority_of<'a>(majorities: &'a [PartyMajority], party: &str) -> Option<&'a PartyMajority> {
    majorities
        .binary_search_by(|m| m.party.as_str().cmp(party))
        .ok()
        .map(|idx| &majorities[idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::*;

    #[test]
    fn democrats_and_republicans() {
        let votes = scenario_2023001();
        let m = resolve(roll(1), &votes, TieBreakMode::VocabularyOrder).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m[0].party, "D");
        assert_eq!(m[0].value, VoteValue::Yea);
        assert_eq!(m[0].count, 3);
        assert!(!m[0].is_tie());
        assert_eq!(m[1].party, "R");
        assert_eq!(m[1].value, VoteValue::Nay);
        assert_eq!(m[1].count, 2);
    }

    #[test]
    fn majority_is_a_true_max() {
        let votes = vec![
            roll_vote(&rep("a", "D"), "Yea"),
            roll_vote(&rep("b", "D"), "Nay"),
            roll_vote(&rep("c", "D"), "Nay"),
            roll_vote(&rep("d", "D"), "Not Voting"),
            roll_vote(&rep("e", "D"), "Not Voting"),
            roll_vote(&rep("f", "D"), "Not Voting"),
        ];
        let m = resolve(roll(2), &votes, TieBreakMode::VocabularyOrder).unwrap();
        assert_eq!(m[0].value, VoteValue::NotVoting);
        for value in VoteValue::VOCABULARY {
            let c = votes.iter().filter(|v| v.value == value).count() as u64;
            assert!(m[0].count >= c);
        }
    }

    #[test]
    fn tie_uses_vocabulary_order() {
        let votes = vec![
            roll_vote(&rep("a", "R"), "Present"),
            roll_vote(&rep("b", "R"), "Nay"),
            roll_vote(&rep("c", "R"), "Yea"),
            roll_vote(&rep("d", "R"), "Present"),
            roll_vote(&rep("e", "R"), "Nay"),
            roll_vote(&rep("f", "R"), "Yea"),
        ];
        let m = resolve(roll(3), &votes, TieBreakMode::VocabularyOrder).unwrap();
        assert_eq!(m[0].value, VoteValue::Yea);
        assert_eq!(m[0].tied_with, vec![VoteValue::Nay, VoteValue::Present]);

        // The input order does not matter.
        let mut reversed = votes.clone();
        reversed.reverse();
        let m2 = resolve(roll(3), &reversed, TieBreakMode::VocabularyOrder).unwrap();
        assert_eq!(m, m2);
    }

    #[test]
    fn tie_lexicographic() {
        let votes = vec![
            roll_vote(&rep("a", "R"), "Yea"),
            roll_vote(&rep("b", "R"), "Nay"),
        ];
        let m = resolve(roll(3), &votes, TieBreakMode::Lexicographic).unwrap();
        assert_eq!(m[0].value, VoteValue::Nay);
        assert_eq!(m[0].tied_with, vec![VoteValue::Yea]);
    }

    #[test]
    fn tie_rejected_for_audit() {
        let votes = vec![
            roll_vote(&rep("a", "R"), "Yea"),
            roll_vote(&rep("b", "R"), "No"),
        ];
        let err = resolve(roll(4), &votes, TieBreakMode::Reject).unwrap_err();
        assert_eq!(
            err,
            EngineError::TieBreakAmbiguity {
                roll_id: roll(4),
                party: "R".to_string(),
                tied: vec![VoteValue::Yea, VoteValue::No],
            }
        );
        // No tie, no error.
        let clean = vec![roll_vote(&rep("a", "R"), "Yea")];
        assert!(resolve(roll(4), &clean, TieBreakMode::Reject).is_ok());
    }

    #[test]
    fn lone_independent_is_its_own_majority() {
        let votes = vec![
            roll_vote(&rep("a", "D"), "Yea"),
            roll_vote(&rep("b", "D"), "Yea"),
            roll_vote(&rep("i", "I"), "Nay"),
        ];
        let m = resolve(roll(5), &votes, TieBreakMode::VocabularyOrder).unwrap();
        let ind = majority_of(&m, "I").unwrap();
        assert_eq!(ind.value, VoteValue::Nay);
        assert_eq!(ind.count, 1);
        assert!(majority_of(&m, "R").is_none());
    }

    #[test]
    fn no_votes_no_majority() {
        let m = resolve(roll(6), &[], TieBreakMode::VocabularyOrder).unwrap();
        assert!(m.is_empty());
    }
}
