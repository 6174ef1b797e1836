use std::collections::HashMap;

use log::{debug, warn};

use crate::config::*;

/// Builds the dense table of vote counts of the legislators of a state.
///
/// There is one row per legislator, including those without any vote, and
/// one column per value of the vocabulary. Votes of legislators who are not
/// part of `legislators` are ignored.
///
/// Rows are sorted by last name, first name and id.
pub fn build(state: &str, legislators: &[Legislator], votes: &[CastVote]) -> StatePivot {
    let columns: Vec<VoteValue> = VoteValue::VOCABULARY.to_vec();
    let col_index: HashMap<VoteValue, usize> =
        columns.iter().enumerate().map(|(idx, v)| (*v, idx)).collect();

    let mut sorted: Vec<&Legislator> = legislators.iter().collect();
    sorted.sort_by(|a, b| {
        (a.last_name.as_str(), a.first_name.as_str(), a.id.as_str())
            .cmp(&(b.last_name.as_str(), b.first_name.as_str(), b.id.as_str()))
    });

    let mut rows: Vec<PivotRow> = sorted
        .iter()
        .map(|l| PivotRow {
            legislator_id: l.id.clone(),
            label: l.pivot_label(),
            party: l.party.clone(),
            counts: vec![0; columns.len()],
        })
        .collect();
    let row_index: HashMap<String, usize> = rows
        .iter()
        .enumerate()
        .map(|(idx, r)| (r.legislator_id.clone(), idx))
        .collect();

    let mut ignored: usize = 0;
    for v in votes.iter() {
        match row_index.get(&v.legislator_id) {
            Some(&row) => rows[row].counts[col_index[&v.value]] += 1,
            None => ignored += 1,
        }
    }
    if ignored > 0 {
        warn!(
            "build: state {}: ignored {} votes of legislators outside of the state",
            state, ignored
        );
    }
    debug!(
        "build: state {}: {} rows x {} columns",
        state,
        rows.len(),
        columns.len()
    );
    StatePivot {
        state: state.to_string(),
        columns,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testdata::*;

    fn cast(n: u32, id: &str, value: &str) -> CastVote {
        CastVote {
            roll_id: roll(n),
            legislator_id: id.to_string(),
            value: VoteValue::parse(value).unwrap(),
        }
    }

    #[test]
    fn pivot_is_dense() {
        let legislators = vec![rep("a", "D"), rep("b", "R"), rep("c", "D")];
        let votes = vec![
            cast(1, "a", "Yea"),
            cast(2, "a", "Yea"),
            cast(1, "b", "Nay"),
            cast(2, "b", "Present"),
        ];
        let p = build("CA", &legislators, &votes);
        assert_eq!(p.rows.len(), 3);
        assert_eq!(p.columns.len(), VoteValue::VOCABULARY.len());
        for r in p.rows.iter() {
            assert_eq!(r.counts.len(), p.columns.len());
        }
        assert_eq!(p.get("a", VoteValue::Yea), Some(2));
        assert_eq!(p.get("a", VoteValue::Nay), Some(0));
        assert_eq!(p.get("b", VoteValue::Present), Some(1));
        // No votes at all, still a full row of zeros.
        let c = p.rows.iter().find(|r| r.legislator_id == "c").unwrap();
        assert!(c.counts.iter().all(|n| *n == 0));
    }

    #[test]
    fn party_is_carried_on_the_row() {
        let mut a = rep("a", "I");
        a.party_designation = Some("caucuses D".to_string());
        let p = build("CA", &[a], &[]);
        assert_eq!(p.rows[0].party, "I");
        assert_eq!(p.rows[0].label, "a A (I, caucuses D)");
    }

    #[test]
    fn foreign_votes_are_ignored() {
        let p = build("CA", &[rep("a", "D")], &[cast(1, "zz", "Yea")]);
        assert_eq!(p.rows[0].counts.iter().sum::<u64>(), 0);
    }
}
