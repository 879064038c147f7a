// src/crawl/counter.rs
// =============================================================================
// The shared fetch budget.
//
// Every worker must call try_admit() before it fetches a URL. The counter
// holds `count` (fetches admitted so far) and `limit` (the most we allow).
// The check and the increment happen under ONE lock acquisition, so two
// workers can never both see "one slot left" and both take it. That means
// try_admit() returns true at most `limit` times, however many workers race.
//
// has_capacity() is a plain read. Workers use it before enqueueing a freshly
// discovered link, to avoid growing the queue once the budget is gone. It is
// only advice: by the time the link is dequeued the answer may have changed,
// and try_admit() is what actually decides.
//
// Rust concepts:
// - Mutex: Mutual exclusion lock guarding the count
// - PoisonError::into_inner: Keep going if another thread panicked mid-lock
//   (a plain integer can't be left half-updated)
// =============================================================================

use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
pub struct SharedCounter {
    count: Mutex<u64>,
    limit: u64,
}

impl SharedCounter {
    // Creates a counter that will admit at most `limit` fetches
    pub fn new(limit: u64) -> Self {
        Self {
            count: Mutex::new(0),
            limit,
        }
    }

    // Consumes one unit of budget if any is left
    //
    // Returns: true if the caller may fetch, false if the limit is reached
    pub fn try_admit(&self) -> bool {
        let mut count = self.lock();
        if *count < self.limit {
            *count += 1;
            true
        } else {
            false
        }
    }

    // Advisory check: is there budget left right now?
    pub fn has_capacity(&self) -> bool {
        *self.lock() < self.limit
    }

    // Fetches admitted so far
    pub fn count(&self) -> u64 {
        *self.lock()
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    // Admissions still available
    pub fn remaining(&self) -> u64 {
        self.limit.saturating_sub(*self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, u64> {
        self.count.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
