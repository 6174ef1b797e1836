// Read-only access to a roll call database.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::Value;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};

use crate::chamber::*;

/// A [`VoteStore`] over a SQLite database with the `reps`, `rolls` and
/// `votes` tables.
///
/// Every connection is opened read-only with `PRAGMA query_only`, and all the
/// inputs are passed as bound parameters. A database locked by a writer for
/// longer than the busy timeout fails with `StoreUnavailable`.
pub struct SqliteStore {
    path: String,
    busy_timeout: Duration,
    pool_size: usize,
    pool: Mutex<Vec<Connection>>,
    // `PRAGMA data_version` can only be compared between calls on the same
    // connection.
    watcher: Mutex<Connection>,
}

fn unavailable(e: rusqlite::Error) -> EngineError {
    EngineError::StoreUnavailable {
        reason: e.to_string(),
    }
}

fn poisoned() -> EngineError {
    EngineError::StoreUnavailable {
        reason: "connection pool poisoned".to_string(),
    }
}

fn connect(path: &str, busy_timeout: Duration) -> EngineResult<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags).map_err(unavailable)?;
    conn.busy_timeout(busy_timeout).map_err(unavailable)?;
    conn.execute_batch("PRAGMA query_only = ON;")
        .map_err(unavailable)?;
    Ok(conn)
}

// Identifiers and districts are stored as text or as integers depending on
// the source of the database.
fn text(row: &Row, idx: usize) -> rusqlite::Result<Option<String>> {
    let v: Value = row.get(idx)?;
    Ok(match v {
        Value::Null => None,
        Value::Integer(x) => Some(x.to_string()),
        Value::Real(x) => Some(x.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    })
}

// The eight columns of `reps` starting at `base`. None when the join found
// no legislator.
fn legislator_at(row: &Row, base: usize) -> rusqlite::Result<Option<Legislator>> {
    let id = match text(row, base)? {
        Some(id) => id,
        None => return Ok(None),
    };
    Ok(Some(Legislator {
        id,
        first_name: text(row, base + 1)?.unwrap_or_default(),
        last_name: text(row, base + 2)?.unwrap_or_default(),
        party: text(row, base + 3)?.unwrap_or_default(),
        party_designation: text(row, base + 4)?.filter(|s| !s.is_empty()),
        state: text(row, base + 5)?.unwrap_or_default(),
        district: text(row, base + 6)?,
        phone: text(row, base + 7)?,
    }))
}

type RawRoll = (i64, Option<String>, Option<String>, Option<String>);

fn raw_roll(row: &Row) -> rusqlite::Result<RawRoll> {
    Ok((row.get(0)?, text(row, 1)?, text(row, 2)?, text(row, 3)?))
}

fn roll_id_of(raw: i64) -> EngineResult<RollId> {
    match u64::try_from(raw) {
        Ok(x) => RollId::from_raw(x),
        Err(_) => Err(EngineError::StoreUnavailable {
            reason: format!("invalid roll id {} in the rolls table", raw),
        }),
    }
}

fn to_roll_call((raw, question, date, result): RawRoll) -> EngineResult<RollCall> {
    Ok(RollCall {
        roll_id: roll_id_of(raw)?,
        question,
        date,
        result,
    })
}

impl SqliteStore {
    /// Opens the database and checks that it has the expected tables.
    ///
    /// At most `pool_size` connections are kept open between two reads.
    pub fn open(path: &str, busy_timeout: Duration, pool_size: usize) -> EngineResult<SqliteStore> {
        ensure!(
            Path::new(path).is_file(),
            StoreUnavailableSnafu {
                reason: format!("no database file at {}", path)
            }
        );
        let conn = connect(path, busy_timeout)?;
        let tables: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('reps', 'rolls', 'votes')",
                [],
                |row| row.get(0),
            )
            .map_err(unavailable)?;
        ensure!(
            tables == 3,
            StoreUnavailableSnafu {
                reason: format!("{} does not have the reps, rolls and votes tables", path)
            }
        );
        let watcher = connect(path, busy_timeout)?;
        info!(
            "SqliteStore::open: {} (busy timeout {:?}, pool {})",
            path, busy_timeout, pool_size
        );
        Ok(SqliteStore {
            path: path.to_string(),
            busy_timeout,
            pool_size: pool_size.max(1),
            pool: Mutex::new(vec![conn]),
            watcher: Mutex::new(watcher),
        })
    }

    fn with_conn<T, F>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&Connection) -> EngineResult<T>,
    {
        let pooled = self.pool.lock().map_err(|_| poisoned())?.pop();
        let conn = match pooled {
            Some(c) => c,
            None => {
                debug!("with_conn: opening a new connection to {}", self.path);
                connect(&self.path, self.busy_timeout)?
            }
        };
        let res = f(&conn);
        if let Ok(mut pool) = self.pool.lock() {
            if pool.len() < self.pool_size {
                pool.push(conn);
            }
        }
        res
    }
}

impl VoteStore for SqliteStore {
    fn roll_call(&self, roll_id: RollId) -> EngineResult<RollCall> {
        let raw = self.with_conn(|conn| {
            conn.prepare_cached(
                "SELECT roll_id, question, date, result FROM rolls WHERE roll_id = ?1",
            )
            .and_then(|mut stmt| stmt.query_row(params![roll_id.raw() as i64], raw_roll).optional())
            .map_err(unavailable)
        })?;
        to_roll_call(raw.context(RollNotFoundSnafu { roll_id })?)
    }

    fn votes_for_roll(&self, roll_id: RollId) -> EngineResult<Vec<RollVote>> {
        // A roll call without any vote is valid, a missing one is not.
        self.roll_call(roll_id)?;
        let rows = self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT v.rep_id, v.vote,
                            r.rep_id, r.first_name, r.last_name, r.party,
                            r.party_designation, r.state, r.district, r.phone
                     FROM votes v LEFT JOIN reps r ON r.rep_id = v.rep_id
                     WHERE v.roll_id = ?1
                     ORDER BY v.rep_id",
                )
                .map_err(unavailable)?;
            let rows = stmt
                .query_map(params![roll_id.raw() as i64], |row| {
                    Ok((
                        text(row, 0)?.unwrap_or_default(),
                        text(row, 1)?,
                        legislator_at(row, 2)?,
                    ))
                })
                .map_err(unavailable)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(unavailable)?;
            Ok(rows)
        })?;

        let mut res: Vec<RollVote> = Vec::with_capacity(rows.len());
        for (legislator_id, vote, legislator) in rows {
            let legislator = legislator.context(LegislatorNotFoundSnafu { legislator_id })?;
            let value = VoteValue::parse(vote.as_deref().unwrap_or(""))?;
            res.push(RollVote { legislator, value });
        }
        Ok(res)
    }

    fn all_roll_calls(&self) -> EngineResult<Vec<RollCall>> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached("SELECT roll_id, question, date, result FROM rolls ORDER BY roll_id")
                .map_err(unavailable)?;
            let rows = stmt
                .query_map([], raw_roll)
                .map_err(unavailable)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(unavailable)?;
            Ok(rows)
        })?;
        rows.into_iter().map(to_roll_call).collect()
    }

    fn legislators_by_state(&self, state: &str) -> EngineResult<Vec<Legislator>> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT r.rep_id, r.first_name, r.last_name, r.party,
                            r.party_designation, r.state, r.district, r.phone
                     FROM reps r WHERE r.state = ?1 ORDER BY r.rep_id",
                )
                .map_err(unavailable)?;
            let rows = stmt
                .query_map(params![state], |row| legislator_at(row, 0))
                .map_err(unavailable)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(unavailable)?;
            Ok(rows)
        })?;
        Ok(rows.into_iter().flatten().collect())
    }

    fn distinct_states(&self) -> EngineResult<BTreeSet<String>> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached("SELECT DISTINCT state FROM reps WHERE state IS NOT NULL")
                .map_err(unavailable)?;
            let rows = stmt
                .query_map([], |row| text(row, 0))
                .map_err(unavailable)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(unavailable)?;
            Ok(rows)
        })?;
        Ok(rows.into_iter().flatten().collect())
    }

    fn version(&self) -> EngineResult<StoreVersion> {
        let conn = self.watcher.lock().map_err(|_| poisoned())?;
        let data_version: i64 = conn
            .query_row("PRAGMA data_version", [], |row| row.get(0))
            .map_err(unavailable)?;
        Ok(StoreVersion(sha256::digest(format!("{}|{}", self.path, data_version))))
    }

    // One query instead of one per roll call.
    fn votes_for_state(&self, state: &str) -> EngineResult<Vec<CastVote>> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn
                .prepare_cached(
                    "SELECT v.roll_id, v.rep_id, v.vote
                     FROM votes v
                     JOIN reps r ON r.rep_id = v.rep_id
                     JOIN rolls ro ON ro.roll_id = v.roll_id
                     WHERE r.state = ?1
                     ORDER BY v.roll_id, v.rep_id",
                )
                .map_err(unavailable)?;
            let rows = stmt
                .query_map(params![state], |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        text(row, 1)?.unwrap_or_default(),
                        text(row, 2)?,
                    ))
                })
                .map_err(unavailable)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(unavailable)?;
            Ok(rows)
        })?;

        let mut res: Vec<CastVote> = Vec::with_capacity(rows.len());
        for (raw, legislator_id, vote) in rows {
            res.push(CastVote {
                roll_id: roll_id_of(raw)?,
                legislator_id,
                value: VoteValue::parse(vote.as_deref().unwrap_or(""))?,
            });
        }
        Ok(res)
    }
}
