use std::collections::HashMap;
use std::sync::Mutex;

use log::debug;

use crate::config::*;
use crate::error::*;
use crate::store::StoreVersion;

/// The operation and parameters a cached result was computed for.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub(crate) enum CacheKey {
    Majorities(RollId),
    Dissenters(RollId, bool),
    Tally(RollId),
    Pivot(String),
}

#[derive(Debug, Clone)]
pub(crate) enum CachedValue {
    Majorities(Vec<PartyMajority>),
    Dissenters(Vec<DissentRecord>),
    Tally(RollTally),
    Pivot(StatePivot),
}

pub(crate) trait CacheEntry: Sized + Clone {
    fn wrap(self) -> CachedValue;
    fn unwrap(value: CachedValue) -> Option<Self>;
}

macro_rules! cache_entry {
    ($t:ty, $variant:ident) => {
        impl CacheEntry for $t {
            fn wrap(self) -> CachedValue {
                CachedValue::$variant(self)
            }
            fn unwrap(value: CachedValue) -> Option<Self> {
                match value {
                    CachedValue::$variant(x) => Some(x),
                    _ => None,
                }
            }
        }
    };
}

cache_entry!(Vec<PartyMajority>, Majorities);
cache_entry!(Vec<DissentRecord>, Dissenters);
cache_entry!(RollTally, Tally);
cache_entry!(StatePivot, Pivot);

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug, Default)]
struct CacheState {
    version: Option<StoreVersion>,
    entries: HashMap<CacheKey, CachedValue>,
    stats: CacheStats,
}

/// Results of the single-roll and state operations, valid for one version of
/// the store.
///
/// Every lookup is made with the current version of the store. When the
/// version changes, all the entries are dropped. Errors are never cached.
#[derive(Debug, Default)]
pub struct ResultCache {
    state: Mutex<CacheState>,
}

impl ResultCache {
    pub fn new() -> ResultCache {
        ResultCache::default()
    }

    pub(crate) fn get_or_compute<T, F>(
        &self,
        version: &StoreVersion,
        key: CacheKey,
        compute: F,
    ) -> EngineResult<T>
    where
        T: CacheEntry,
        F: FnOnce() -> EngineResult<T>,
    {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if state.version.as_ref() != Some(version) {
                if state.version.is_some() {
                    debug!(
                        "get_or_compute: store version changed, dropping {} entries",
                        state.entries.len()
                    );
                }
                state.entries.clear();
                state.version = Some(version.clone());
            }
            if let Some(hit) = state.entries.get(&key).cloned().and_then(T::unwrap) {
                state.stats.hits += 1;
                return Ok(hit);
            }
            state.stats.misses += 1;
        }

        // Not holding the lock while reading the store.
        let res = compute()?;

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.version.as_ref() == Some(version) {
            state.entries.insert(key, res.clone().wrap());
        }
        Ok(res)
    }

    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        CacheStats {
            entries: state.entries.len(),
            ..state.stats
        }
    }

    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.entries.clear();
        state.version = None;
    }
}
