use std::collections::BTreeSet;

use crate::config::*;

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Cell {
    Int(u64),
    Text(String),
    /// A field with no value: a missing roll call detail, or a vote value that
    /// nobody cast on a roll call.
    Empty,
}

impl Cell {
    fn opt_text(s: &Option<String>) -> Cell {
        match s {
            Some(x) => Cell::Text(x.clone()),
            None => Cell::Empty,
        }
    }
}

/// An ordered sequence of records with named fields.
///
/// The order of the columns is part of the output contract of each
/// operation.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    fn new(columns: &[&str]) -> Table {
        Table {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

pub const DISSENT_COLUMNS: [&str; 8] = [
    "roll_id",
    "party",
    "vote",
    "name",
    "state",
    "district",
    "phone",
    "party_vote",
];

pub fn dissent_table(records: &[DissentRecord]) -> Table {
    let mut t = Table::new(&DISSENT_COLUMNS);
    for r in records.iter() {
        t.rows.push(vec![
            Cell::Int(r.roll_id.raw()),
            Cell::Text(r.party.clone()),
            Cell::Text(r.vote.to_string()),
            Cell::Text(r.name()),
            Cell::Text(r.state.clone()),
            Cell::opt_text(&r.district),
            Cell::opt_text(&r.phone),
            Cell::Text(r.party_vote.to_string()),
        ]);
    }
    t
}

pub const ROLL_COLUMNS: [&str; 5] = ["roll_id", "roll_call", "question", "date", "result"];

/// One row per roll call, merged with one column per vote value cast on any
/// of the roll calls. A value absent from a roll call is left empty.
pub fn tally_table(tallies: &[RollTally]) -> Table {
    let present: BTreeSet<VoteValue> = tallies
        .iter()
        .flat_map(|t| t.counts.keys().cloned())
        .collect();
    let mut t = Table::new(&ROLL_COLUMNS);
    t.columns.extend(present.iter().map(|v| v.to_string()));
    for tally in tallies.iter() {
        let roll = &tally.roll;
        let mut row = vec![
            Cell::Int(roll.roll_id.raw()),
            Cell::Int(roll.roll_id.roll_number() as u64),
            Cell::opt_text(&roll.question),
            Cell::opt_text(&roll.date),
            Cell::opt_text(&roll.result),
        ];
        row.extend(present.iter().map(|v| match tally.count(*v) {
            Some(c) => Cell::Int(c),
            None => Cell::Empty,
        }));
        t.rows.push(row);
    }
    t
}

/// The party of each row stays available in [`StatePivot::rows`] and in the
/// label itself.
pub fn pivot_table(pivot: &StatePivot) -> Table {
    let mut t = Table::new(&["legislator_name"]);
    t.columns.extend(pivot.columns.iter().map(|v| v.to_string()));
    for r in pivot.rows.iter() {
        let mut row = vec![Cell::Text(r.label.clone())];
        row.extend(r.counts.iter().map(|c| Cell::Int(*c)));
        t.rows.push(row);
    }
    t
}

pub fn majority_table(roll_id: RollId, majorities: &[PartyMajority]) -> Table {
    let mut t = Table::new(&["roll_id", "party", "party_vote", "count", "tied_with"]);
    for m in majorities.iter() {
        let tied: Vec<&str> = m.tied_with.iter().map(|v| v.as_str()).collect();
        t.rows.push(vec![
            Cell::Int(roll_id.raw()),
            Cell::Text(m.party.clone()),
            Cell::Text(m.value.to_string()),
            Cell::Int(m.count),
            if tied.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(tied.join(","))
            },
        ]);
    }
    t
}

pub fn roll_table(rolls: &[RollCall]) -> Table {
    let mut t = Table::new(&ROLL_COLUMNS);
    for roll in rolls.iter() {
        t.rows.push(vec![
            Cell::Int(roll.roll_id.raw()),
            Cell::Int(roll.roll_id.roll_number() as u64),
            Cell::opt_text(&roll.question),
            Cell::opt_text(&roll.date),
            Cell::opt_text(&roll.result),
        ]);
    }
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::tally;
    use crate::testdata::*;

    #[test]
    fn dissent_columns_in_contract_order() {
        let t = dissent_table(&[]);
        assert_eq!(
            t.columns,
            vec!["roll_id", "party", "vote", "name", "state", "district", "phone", "party_vote"]
        );
        assert!(t.is_empty());
    }

    #[test]
    fn tallies_merge_sparse_columns() {
        let yes_only = vec![roll_vote(&rep("a", "D"), "Yea")];
        let mixed = vec![
            roll_vote(&rep("a", "D"), "Nay"),
            roll_vote(&rep("b", "R"), "Present"),
        ];
        let t = tally_table(&[tally(&roll_call(1), &yes_only), tally(&roll_call(2), &mixed)]);
        assert_eq!(
            t.columns,
            vec!["roll_id", "roll_call", "question", "date", "result", "Yea", "Nay", "Present"]
        );
        let nay = t.column("Nay").unwrap();
        assert_eq!(t.rows[0][nay], Cell::Empty);
        assert_eq!(t.rows[1][nay], Cell::Int(1));
        assert_eq!(t.rows[0][0], Cell::Int(2023001));
        assert_eq!(t.rows[1][1], Cell::Int(2));
    }

    #[test]
    fn pivot_has_every_vocabulary_column() {
        let p = crate::pivot::build("CA", &[rep("a", "D")], &[]);
        let t = pivot_table(&p);
        assert_eq!(t.columns.len(), 1 + VoteValue::VOCABULARY.len());
        assert_eq!(t.columns[0], "legislator_name");
        assert_eq!(t.rows[0][0], Cell::Text("a A (D)".to_string()));
        assert_eq!(t.rows[0][1], Cell::Int(0));
    }
}
