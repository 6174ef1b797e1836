// Fixtures shared by the unit tests.

use crate::builder::Builder;
use crate::config::*;
use crate::store::MemoryStore;

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn roll(n: u32) -> RollId {
    RollId::new(2023, n).unwrap()
}

pub fn roll_call(n: u32) -> RollCall {
    RollCall {
        roll_id: roll(n),
        question: Some(format!("Question {}", n)),
        date: Some(format!("2023-01-{:02}", n)),
        result: Some("Passed".to_string()),
    }
}

pub fn rep(id: &str, party: &str) -> Legislator {
    Legislator {
        id: id.to_string(),
        first_name: id.to_string(),
        last_name: id.to_uppercase(),
        party: party.to_string(),
        party_designation: None,
        state: "CA".to_string(),
        district: None,
        phone: None,
    }
}

fn member(id: &str, first: &str, last: &str, party: &str, state: &str, district: &str) -> Legislator {
    Legislator {
        id: id.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        party: party.to_string(),
        party_designation: None,
        state: state.to_string(),
        district: Some(district.to_string()),
        phone: Some(format!("202-225-{}", district)),
    }
}

pub fn roll_vote(legislator: &Legislator, value: &str) -> RollVote {
    RollVote {
        legislator: legislator.clone(),
        value: VoteValue::parse(value).unwrap(),
    }
}

/// Party D casts Yea x3 and Nay x1, party R casts Nay x2.
pub fn scenario_2023001() -> Vec<RollVote> {
    vec![
        roll_vote(&rep("d1", "D"), "Yea"),
        roll_vote(&rep("d2", "D"), "Yea"),
        roll_vote(&rep("d3", "D"), "Yea"),
        roll_vote(&rep("d4", "D"), "Nay"),
        roll_vote(&rep("r1", "R"), "Nay"),
        roll_vote(&rep("r2", "R"), "Nay"),
    ]
}

pub fn chamber_members() -> Vec<Legislator> {
    let mut independent = member("i1", "Gus", "Green", "I", "VT", "0");
    independent.party_designation = Some("caucuses D".to_string());
    vec![
        member("d1", "Ada", "Adams", "D", "CA", "1"),
        member("d2", "Ben", "Baker", "D", "CA", "2"),
        member("d3", "Cal", "Clark", "D", "NY", "3"),
        member("d4", "Dee", "Davis", "D", "CA", "4"),
        member("r1", "Eve", "Evans", "R", "TX", "5"),
        member("r2", "Fay", "Ford", "R", "CA", "6"),
        independent,
    ]
}

/// Seven members over roll calls 1, 2, 3 (no votes) and 5 of 2023.
///
/// - roll 1: the D/R scenario, plus the lone independent voting Nay.
/// - roll 2: D majority is Nay (d1 Yea, d2 Not Voting dissent), R is tied
///   between Yea and Present.
/// - roll 4 is absent from the record.
pub fn small_chamber_builder() -> Builder {
    let mut b = Builder::new();
    for l in chamber_members() {
        b.add_legislator(l).unwrap();
    }
    for n in [1, 2, 3, 5] {
        b.add_roll_call(roll_call(n)).unwrap();
    }
    let votes: [(u32, [&str; 7]); 3] = [
        (1, ["Yea", "Yea", "Yea", "Nay", "Nay", "Nay", "Nay"]),
        (2, ["Yea", "Not Voting", "Nay", "Nay", "Yea", "Present", "Yea"]),
        (5, ["Aye", "No", "Aye", "Aye", "No", "No", "Present"]),
    ];
    let ids = ["d1", "d2", "d3", "d4", "r1", "r2", "i1"];
    for (n, values) in votes.iter() {
        for (id, value) in ids.iter().zip(values.iter()) {
            b.add_vote(roll(*n), id, value).unwrap();
        }
    }
    b
}

pub fn small_chamber() -> MemoryStore {
    small_chamber_builder().build()
}
