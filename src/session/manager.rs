use super::store::SessionStore;
use super::types::{AddressingMode, SessionConfig, SessionKey};
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide conversational state: the session table plus the addressing
/// mode that decides which key a sender resolves to.
///
/// Built once at startup and shared by reference with the dispatcher.
#[derive(Debug, Default)]
pub struct SessionManager {
    store: SessionStore,
    group_mode: AtomicBool,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            store: SessionStore::new(config),
            group_mode: AtomicBool::new(false),
        }
    }

    pub fn addressing_mode(&self) -> AddressingMode {
        if self.group_mode.load(Ordering::Acquire) {
            AddressingMode::Group
        } else {
            AddressingMode::Individual
        }
    }

    /// Switch key derivation for every future call. Existing histories stay
    /// untouched and remain reachable under the keys they were stored with.
    ///
    /// Returns the mode that was in effect before the switch.
    pub fn set_addressing_mode(&self, mode: AddressingMode) -> AddressingMode {
        let previous = if self
            .group_mode
            .swap(mode == AddressingMode::Group, Ordering::AcqRel)
        {
            AddressingMode::Group
        } else {
            AddressingMode::Individual
        };
        if previous != mode {
            tracing::info!(from = previous.as_str(), to = mode.as_str(), "addressing mode changed");
        }
        previous
    }

    /// Session key for a command sent by `sender_id` in `chat_id`.
    pub fn resolve_key(&self, sender_id: i64, chat_id: i64) -> SessionKey {
        match self.addressing_mode() {
            AddressingMode::Individual => SessionKey(sender_id),
            AddressingMode::Group => SessionKey(chat_id),
        }
    }

    /// Clear every session; used by the flush command.
    pub fn reset_all(&self) {
        let sessions = self.store.session_count();
        self.store.reset_all();
        tracing::info!(sessions, "all session histories cleared");
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}
