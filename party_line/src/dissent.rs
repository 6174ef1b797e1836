use std::collections::HashSet;

use log::debug;
use snafu::prelude::*;

use crate::config::*;
use crate::error::*;
use crate::majority::majority_of;

/// Rejects a roll call on which a legislator voted more than once.
pub(crate) fn check_votes(roll_id: RollId, votes: &[RollVote]) -> EngineResult<()> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(votes.len());
    for v in votes.iter() {
        ensure!(
            seen.insert(v.legislator.id.as_str()),
            DuplicateVoteSnafu {
                roll_id,
                legislator_id: v.legislator.id.clone()
            }
        );
    }
    Ok(())
}

/// Finds the votes that depart from the majority of their party.
///
/// A vote is a dissent when its value differs from the majority value of the
/// party of the legislator. When `include_non_substantive` is false,
/// "Present" and "Not Voting" are never flagged. Members of a party without
/// a majority entry are never flagged.
///
/// The records are sorted by party, vote, last name, first name.
pub fn detect(
    roll_id: RollId,
    votes: &[RollVote],
    majorities: &[PartyMajority],
    include_non_substantive: bool,
) -> Vec<DissentRecord> {
    let mut res: Vec<DissentRecord> = votes
        .iter()
        .filter_map(|v| {
            let majority = majority_of(majorities, &v.legislator.party)?;
            if v.value == majority.value {
                return None;
            }
            if !include_non_substantive && v.value.is_non_substantive() {
                return None;
            }
            let l = &v.legislator;
            Some(DissentRecord {
                roll_id,
                legislator_id: l.id.clone(),
                party: l.party.clone(),
                vote: v.value,
                first_name: l.first_name.clone(),
                last_name: l.last_name.clone(),
                state: l.state.clone(),
                district: l.district.clone(),
                phone: l.phone.clone(),
                party_vote: majority.value,
            })
        })
        .collect();
    sort_records(&mut res);
    debug!(
        "detect: roll {}: {} dissenters out of {} votes",
        roll_id,
        res.len(),
        votes.len()
    );
    res
}

pub(crate) fn sort_records(records: &mut [DissentRecord]) {
    records.sort_by(|a, b| {
        (
            a.party.as_str(),
            a.vote.as_str(),
            a.last_name.as_str(),
            a.first_name.as_str(),
            a.legislator_id.as_str(),
        )
            .cmp(&(
                b.party.as_str(),
                b.vote.as_str(),
                b.last_name.as_str(),
                b.first_name.as_str(),
                b.legislator_id.as_str(),
            ))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::majority::resolve;
    use crate::testdata::*;

    fn run(votes: &[RollVote], include: bool) -> Vec<DissentRecord> {
        let m = resolve(roll(1), votes, TieBreakMode::VocabularyOrder).unwrap();
        detect(roll(1), votes, &m, include)
    }

    #[test]
    fn single_nay_democrat() {
        let res = run(&scenario_2023001(), false);
        assert_eq!(res.len(), 1);
        let r = &res[0];
        assert_eq!(r.roll_id.raw(), 2023001);
        assert_eq!(r.legislator_id, "d4");
        assert_eq!(r.party, "D");
        assert_eq!(r.vote, VoteValue::Nay);
        assert_eq!(r.party_vote, VoteValue::Yea);
        // No R dissenters.
        assert!(res.iter().all(|r| r.party != "R"));
    }

    #[test]
    fn abstentions_follow_the_flag() {
        let votes = vec![
            roll_vote(&rep("a", "D"), "Yea"),
            roll_vote(&rep("b", "D"), "Yea"),
            roll_vote(&rep("c", "D"), "Present"),
            roll_vote(&rep("d", "D"), "Not Voting"),
            roll_vote(&rep("e", "D"), "Nay"),
        ];
        let without = run(&votes, false);
        assert_eq!(without.len(), 1);
        assert!(without.iter().all(|r| !r.vote.is_non_substantive()));

        let with = run(&votes, true);
        let ids: Vec<&str> = with.iter().map(|r| r.legislator_id.as_str()).collect();
        // Sorted by vote string: "Nay" < "Not Voting" < "Present".
        assert_eq!(ids, vec!["e", "d", "c"]);
    }

    #[test]
    fn lone_independent_never_dissents() {
        let mut votes = scenario_2023001();
        votes.push(roll_vote(&rep("i", "I"), "Present"));
        for include in [false, true] {
            let res = run(&votes, include);
            assert!(res.iter().all(|r| r.party != "I"));
        }
    }

    #[test]
    fn party_without_majority_is_skipped() {
        let votes = scenario_2023001();
        let m = resolve(roll(1), &votes[..4], TieBreakMode::VocabularyOrder).unwrap();
        // The R members are not part of the majority computation.
        let res = detect(roll(1), &votes, &m, true);
        assert!(res.iter().all(|r| r.party == "D"));
    }

    #[test]
    fn legislator_appears_at_most_once() {
        let votes = vec![
            roll_vote(&rep("a", "R"), "Yea"),
            roll_vote(&rep("b", "R"), "Yea"),
            roll_vote(&rep("c", "R"), "No"),
            roll_vote(&rep("d", "D"), "Nay"),
            roll_vote(&rep("e", "D"), "Nay"),
            roll_vote(&rep("f", "D"), "Aye"),
        ];
        let res = run(&votes, true);
        let ids: HashSet<&str> = res.iter().map(|r| r.legislator_id.as_str()).collect();
        assert_eq!(ids.len(), res.len());
    }

    #[test]
    fn ordering_by_party_vote_and_name() {
        let mut zed = rep("z", "D");
        zed.last_name = "Zed".to_string();
        let mut abe = rep("y", "D");
        abe.last_name = "Abe".to_string();
        let votes = vec![
            roll_vote(&rep("r1", "R"), "Nay"),
            roll_vote(&rep("r2", "R"), "Nay"),
            roll_vote(&rep("r3", "R"), "Aye"),
            roll_vote(&rep("d1", "D"), "Yea"),
            roll_vote(&rep("d2", "D"), "Yea"),
            roll_vote(&rep("d3", "D"), "Yea"),
            roll_vote(&zed, "No"),
            roll_vote(&abe, "No"),
            roll_vote(&rep("d4", "D"), "Nay"),
        ];
        let res = run(&votes, false);
        let names: Vec<(String, &str)> = res.iter().map(|r| (r.party.clone(), r.last_name.as_str())).collect();
        assert_eq!(
            names,
            vec![
                ("D".to_string(), "D4"),
                ("D".to_string(), "Abe"),
                ("D".to_string(), "Zed"),
                ("R".to_string(), "R3"),
            ]
        );
    }

    #[test]
    fn duplicate_votes_are_rejected() {
        let votes = vec![
            roll_vote(&rep("a", "R"), "Yea"),
            roll_vote(&rep("a", "R"), "Nay"),
        ];
        assert_eq!(
            check_votes(roll(1), &votes),
            Err(EngineError::DuplicateVote {
                roll_id: roll(1),
                legislator_id: "a".to_string()
            })
        );
        assert!(check_votes(roll(1), &scenario_2023001()).is_ok());
    }
}
