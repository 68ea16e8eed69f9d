//! Service state
//!
//! Everything one service instance remembers across connections: the user
//! table, the flag store and the fault-injection switches. Owned by the
//! session worker and lent to each session, never shared between threads.

use log::warn;
use std::collections::HashMap;

use crate::auth::UserTable;
use crate::config::DataFailMode;

/// Fault switches toggled by the test-only commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultFlags {
    pub registration_disabled: bool,
    pub data_corruption_enabled: bool,
}

/// Stored flags keyed by login.
#[derive(Debug, Default)]
pub struct FlagStore {
    flags: HashMap<String, String>,
}

impl FlagStore {
    /// Stores `flag` for `login`, replacing any previous value.
    pub fn store(&mut self, login: &str, flag: String) {
        self.flags.insert(login.to_string(), flag);
    }

    pub fn get(&self, login: &str) -> Option<&str> {
        self.flags.get(login).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.flags.clear();
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ServiceState {
    pub users: UserTable,
    pub flags: FlagStore,
    pub faults: FaultFlags,
}

impl ServiceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a flag, appending `marker` when data corruption is on.
    pub fn store_flag(&mut self, login: &str, flag: &str, marker: &str) {
        let mut stored = flag.to_string();
        if self.faults.data_corruption_enabled {
            stored.push_str(marker);
        }
        self.flags.store(login, stored);
    }

    /// Applies DATAFAIL according to `mode`.
    pub fn apply_datafail(&mut self, mode: DataFailMode) {
        match mode {
            DataFailMode::Reference => {
                warn!("DATAFAIL in reference mode clears data corruption instead of enabling it");
                self.faults.data_corruption_enabled = false;
            }
            DataFailMode::Corrupt => {
                warn!("Data corruption enabled");
                self.faults.data_corruption_enabled = true;
            }
        }
    }
}
