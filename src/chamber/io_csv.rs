// Primitives for reading the records from CSV files.

use std::path::Path;

use party_line::builder::Builder;
use serde::Deserialize;

use crate::chamber::*;

#[derive(Debug, Deserialize)]
struct RepRecord {
    rep_id: String,
    first_name: String,
    last_name: String,
    party: String,
    #[serde(default)]
    party_designation: Option<String>,
    state: String,
    #[serde(default)]
    district: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

// Other columns, such as roll_call, are ignored: the number is part of the id.
#[derive(Debug, Deserialize)]
struct RollRecord {
    roll_id: u64,
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    result: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VoteRecord {
    roll_id: u64,
    rep_id: String,
    vote: String,
}

// Calls `f` on each record, with the line number of the record in the file.
fn read_records<T, F>(path: &Path, mut f: F) -> CliResult<usize>
where
    T: for<'de> Deserialize<'de>,
    F: FnMut(T) -> EngineResult<()>,
{
    let path_s = path.display().to_string();
    let mut rdr = csv::Reader::from_path(path).context(CsvOpenSnafu { path: &path_s })?;
    let mut count = 0;
    for (idx, record_r) in rdr.deserialize::<T>().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let record = record_r.context(CsvRecordSnafu {
            path: &path_s,
            lineno,
        })?;
        f(record).context(CsvContentSnafu {
            path: &path_s,
            lineno,
        })?;
        count += 1;
    }
    debug!("read_records: {}: {} records", path_s, count);
    Ok(count)
}

/// Reads `reps.csv`, `rolls.csv` and `votes.csv` from a directory.
pub fn read_csv_dir(dir: &str) -> CliResult<MemoryStore> {
    let dir = Path::new(dir);
    let mut builder = Builder::new();

    read_records(&dir.join("reps.csv"), |r: RepRecord| {
        builder.add_legislator(Legislator {
            id: r.rep_id,
            first_name: r.first_name,
            last_name: r.last_name,
            party: r.party,
            party_designation: r.party_designation.filter(|s| !s.is_empty()),
            state: r.state,
            district: r.district,
            phone: r.phone,
        })
    })?;

    read_records(&dir.join("rolls.csv"), |r: RollRecord| {
        builder.add_roll_call(RollCall {
            roll_id: RollId::from_raw(r.roll_id)?,
            question: r.question,
            date: r.date,
            result: r.result,
        })
    })?;

    let num_votes = read_records(&dir.join("votes.csv"), |r: VoteRecord| {
        builder.add_vote(RollId::from_raw(r.roll_id)?, &r.rep_id, &r.vote)
    })?;

    info!("read_csv_dir: {:?}: {} votes", dir, num_votes);
    Ok(builder.build())
}
