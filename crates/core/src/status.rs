use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::warn;

/// Shared status of one reactor build.
///
/// Halting is one-way: once [`halt`](Self::halt) has been called no new module
/// builds are started. Modules downstream of a failure under fail-at-end are
/// blacklisted and skipped instead.
#[derive(Debug, Default)]
pub struct ReactorBuildStatus {
    halted: AtomicBool,
    blacklisted: Mutex<HashSet<String>>,
}

impl ReactorBuildStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    pub fn halt(&self) {
        if !self.halted.swap(true, Ordering::SeqCst) {
            warn!("reactor build halted");
        }
    }

    pub fn blacklist<I, S>(&self, modules: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut blacklisted = self
            .blacklisted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        blacklisted.extend(modules.into_iter().map(Into::into));
    }

    pub fn is_blacklisted(&self, module: &str) -> bool {
        self.blacklisted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(module)
    }
}
