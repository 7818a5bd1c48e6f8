use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::IdGenerator;

pub const DEFAULT_ID_PREFIX: &str = "field";

static PROCESS_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Ids unique across the whole process, so two forms on one page never share
/// an element id.
#[derive(Debug, Clone)]
pub struct ProcessIdGenerator {
    prefix: String,
}

impl ProcessIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for ProcessIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PREFIX)
    }
}

impl IdGenerator for ProcessIdGenerator {
    fn next_id(&self) -> String {
        let n = PROCESS_COUNTER.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.prefix, n)
    }
}

/// Ids from a private counter starting at zero. Deterministic, for tests and
/// isolated builds.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    counter: Cell<u64>,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Cell::new(0),
        }
    }

    /// Number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.counter.get()
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ID_PREFIX)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.get();
        self.counter.set(n + 1);
        format!("{}{}", self.prefix, n)
    }
}
