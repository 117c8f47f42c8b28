use super::types::{Exchange, SessionConfig, SessionHistory, SessionKey};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Reset epoch observed alongside a history read.
///
/// Every [`SessionStore::reset_all`] advances it, so a write that was planned
/// against an older generation can be told apart from one that was not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

#[derive(Debug, Default)]
struct SessionTable {
    generation: u64,
    sessions: HashMap<SessionKey, SessionHistory>,
}

/// In-memory conversational memory keyed by [`SessionKey`].
///
/// A single table-wide lock guards every operation, which keeps reads
/// consistent and makes `reset_all` atomic with respect to appends.
#[derive(Debug, Default)]
pub struct SessionStore {
    table: Mutex<SessionTable>,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            table: Mutex::new(SessionTable::default()),
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionTable> {
        // The table holds plain data; a panic mid-operation cannot leave it torn.
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ordered history for `key`; empty when the key was never seen.
    pub fn get(&self, key: SessionKey) -> SessionHistory {
        self.lock().sessions.get(&key).cloned().unwrap_or_default()
    }

    /// History for `key` together with the reset generation it was read under.
    pub fn snapshot(&self, key: SessionKey) -> (Generation, SessionHistory) {
        let table = self.lock();
        let history = table.sessions.get(&key).cloned().unwrap_or_default();
        (Generation(table.generation), history)
    }

    /// Append one exchange to the end of `key`'s history, creating it if absent.
    pub fn append(&self, key: SessionKey, exchange: Exchange) {
        let mut table = self.lock();
        Self::push(&mut table, key, exchange, self.config.max_exchanges);
    }

    /// Append only if no reset happened since `generation` was observed.
    ///
    /// Returns `false` when the exchange was discarded.
    pub fn append_if_current(
        &self,
        key: SessionKey,
        exchange: Exchange,
        generation: Generation,
    ) -> bool {
        let mut table = self.lock();
        if table.generation != generation.0 {
            return false;
        }
        Self::push(&mut table, key, exchange, self.config.max_exchanges);
        true
    }

    /// Drop every session. Irrecoverable.
    pub fn reset_all(&self) {
        let mut table = self.lock();
        table.sessions.clear();
        table.generation = table.generation.wrapping_add(1);
    }

    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    pub fn len(&self, key: SessionKey) -> usize {
        self.lock().sessions.get(&key).map_or(0, Vec::len)
    }

    fn push(table: &mut SessionTable, key: SessionKey, exchange: Exchange, cap: usize) {
        let history = table.sessions.entry(key).or_default();
        history.push(exchange);
        if cap > 0 && history.len() > cap {
            let overflow = history.len() - cap;
            history.drain(..overflow);
        }
    }
}
