//! Entry id allocation.
//!
//! Ids keep the shape of Unix timestamps in milliseconds, so files written by
//! older deployments stay compatible, but they are handed out by an atomic
//! counter: two entries created within the same millisecond still get
//! distinct ids.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

use crate::EntryId;

#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    /// Build a generator that never returns an id `<= floor`.
    pub fn starting_after(floor: EntryId) -> Self {
        Self {
            last: AtomicI64::new(floor),
        }
    }

    /// Raise the floor, e.g. after reading ids written by someone else.
    pub fn observe(&self, id: EntryId) {
        self.last.fetch_max(id, Ordering::AcqRel);
    }

    /// Next id: the current time in milliseconds, or `last + 1` when the clock
    /// has not moved past the last issued id.
    pub fn next_id(&self) -> EntryId {
        self.next_at(Utc::now().timestamp_millis())
    }

    fn next_at(&self, now_ms: i64) -> EntryId {
        let mut current = self.last.load(Ordering::Acquire);
        loop {
            let candidate = now_ms.max(current.saturating_add(1));
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return candidate,
                Err(actual) => current = actual,
            }
        }
    }
}
