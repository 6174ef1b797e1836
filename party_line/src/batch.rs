use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use log::{debug, info};

pub use tokio_util::sync::CancellationToken;

use crate::config::*;
use crate::error::*;

// Claims the next roll index. The token is checked after the claim, so a
// roll claimed after a cancellation is left unissued and reported as skipped.
fn claim(cursor: &AtomicUsize, len: usize, cancel: &CancellationToken) -> Option<usize> {
    let idx = cursor.fetch_add(1, Ordering::SeqCst);
    if idx >= len || cancel.is_cancelled() {
        return None;
    }
    Some(idx)
}

/// Runs `f` on every roll call with at most `workers` threads, and
/// concatenates the rows in the order of `roll_ids`.
///
/// Each roll call is computed independently. A failing roll call is recorded
/// in the report and does not stop the others.
pub fn run_rolls<T, F>(
    roll_ids: &[RollId],
    workers: usize,
    cancel: &CancellationToken,
    f: F,
) -> BatchReport<T>
where
    T: Send,
    F: Fn(RollId) -> EngineResult<Vec<T>> + Sync,
{
    let workers = workers.clamp(1, roll_ids.len().max(1));
    info!(
        "run_rolls: processing {} roll calls with {} workers",
        roll_ids.len(),
        workers
    );

    let cursor = AtomicUsize::new(0);
    let finished: Vec<Vec<(usize, EngineResult<Vec<T>>)>> = thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let cursor = &cursor;
                let f = &f;
                s.spawn(move || {
                    let mut done: Vec<(usize, EngineResult<Vec<T>>)> = Vec::new();
                    while let Some(idx) = claim(cursor, roll_ids.len(), cancel) {
                        done.push((idx, f(roll_ids[idx])));
                    }
                    done
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    });

    let mut slots: Vec<Option<EngineResult<Vec<T>>>> = roll_ids.iter().map(|_| None).collect();
    for (idx, res) in finished.into_iter().flatten() {
        slots[idx] = Some(res);
    }

    let mut report = BatchReport {
        rows: Vec::new(),
        failures: Vec::new(),
        cancelled: false,
        skipped: Vec::new(),
        completed: 0,
    };
    for (roll_id, slot) in roll_ids.iter().zip(slots) {
        match slot {
            Some(Ok(rows)) => {
                report.completed += 1;
                report.rows.extend(rows);
            }
            Some(Err(error)) => {
                debug!("run_rolls: roll {} failed: {}", roll_id, error);
                report.failures.push(RollFailure {
                    roll_id: *roll_id,
                    error,
                });
            }
            None => report.skipped.push(*roll_id),
        }
    }
    report.cancelled = !report.skipped.is_empty();
    info!(
        "run_rolls: {} rows, {} failed roll calls, {} skipped",
        report.rows.len(),
        report.failures.len(),
        report.skipped.len()
    );
    report
}
