use std::collections::BTreeMap;

use log::debug;

use crate::config::*;

/// Counts the values cast on one roll call.
///
/// The counts sum to the number of votes. Values that nobody cast have no
/// entry.
pub fn tally(roll: &RollCall, votes: &[RollVote]) -> RollTally {
    let mut counts: BTreeMap<VoteValue, u64> = BTreeMap::new();
    for v in votes.iter() {
        *counts.entry(v.value).or_insert(0) += 1;
    }
    debug!("tally: roll {}: {:?}", roll.roll_id, counts);
    RollTally {
        roll: roll.clone(),
        counts,
    }
}

/// The roll calls of a year, as `(first, last)` roll call numbers.
pub fn roll_bounds(rolls: &[RollCall], year: u32) -> Option<(u32, u32)> {
    let numbers = rolls
        .iter()
        .filter(|r| r.roll_id.year() == year)
        .map(|r| r.roll_id.roll_number());
    let min = numbers.clone().min()?;
    let max = numbers.max()?;
    Some((min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::*;

    #[test]
    fn counts_sum_to_votes() {
        let votes = scenario_2023001();
        let t = tally(&roll_call(1), &votes);
        assert_eq!(t.total(), votes.len() as u64);
        assert_eq!(t.count(VoteValue::Yea), Some(3));
        assert_eq!(t.count(VoteValue::Nay), Some(3));
        // Sparse: nobody voted Present.
        assert_eq!(t.count(VoteValue::Present), None);
        assert_eq!(t.counts.len(), 2);
    }

    #[test]
    fn dense_counts_fill_zeros() {
        let t = tally(&roll_call(1), &scenario_2023001());
        let dense = t.dense_counts();
        assert_eq!(dense.len(), VoteValue::VOCABULARY.len());
        assert!(dense.contains(&(VoteValue::Present, 0)));
        assert!(dense.contains(&(VoteValue::Yea, 3)));
    }

    #[test]
    fn empty_roll() {
        let t = tally(&roll_call(3), &[]);
        assert_eq!(t.total(), 0);
        assert!(t.counts.is_empty());
    }

    #[test]
    fn bounds_per_year() {
        let mut rolls = vec![roll_call(5), roll_call(2), roll_call(17)];
        rolls.push(RollCall {
            roll_id: RollId::new(2024, 400).unwrap(),
            question: None,
            date: None,
            result: None,
        });
        assert_eq!(roll_bounds(&rolls, 2023), Some((2, 17)));
        assert_eq!(roll_bounds(&rolls, 2024), Some((400, 400)));
        assert_eq!(roll_bounds(&rolls, 2022), None);
    }
}
