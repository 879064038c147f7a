// src/crawl/queue.rs
// =============================================================================
// This module implements the shared URL queue.
//
// How it works:
// 1. The pool puts the seed URL in the queue before any worker starts
// 2. Workers claim URLs from the front and push discovered links at the back
// 3. A claimed URL counts as "in flight" until the worker drops its Claim
// 4. An idle worker waits instead of quitting while others are in flight,
//    because their pages may still add new links
// 5. Once the queue is empty AND nothing is in flight, there can never be
//    more work, so every waiting worker is told to finish
//
// The queue can also be closed early (the pool does this once the fetch
// budget is spent) so that idle workers stop waiting.
//
// enqueue()/dequeue() are the plain, never-blocking operations: they only
// touch the FIFO itself. claim() is the worker-facing, waiting version.
//
// Rust concepts:
// - VecDeque: Double-ended queue, push at the back, pop from the front
// - Mutex: Only one thread touches the queue state at a time
// - tokio::sync::Notify: Lets idle workers sleep until something changes
// - Drop: Claim releases its in-flight slot automatically, even on early return
// =============================================================================

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<String>,
    in_flight: usize,
    closed: bool,
}

#[derive(Debug, Default)]
pub struct UrlQueue {
    state: Mutex<QueueState>,
    changed: Notify,
}

impl UrlQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // Appends a copy of the URL at the back of the queue
    //
    // There is no size bound. Enqueueing on a closed queue still stores the
    // URL (it just won't be claimed by a worker any more).
    pub fn enqueue(&self, url: &str) {
        self.lock().pending.push_back(url.to_string());
        self.changed.notify_waiters();
    }

    // Removes and returns the URL at the front, or None if the queue is empty
    //
    // Never waits. The returned URL is NOT counted as in flight.
    pub fn dequeue(&self) -> Option<String> {
        self.lock().pending.pop_front()
    }

    // Takes the next URL for a worker, waiting while other workers are busy
    //
    // Returns:
    //   Some(claim) - a URL to work on; it stays "in flight" until dropped
    //   None        - the crawl is over (closed, or drained with nothing in flight)
    pub async fn claim(&self) -> Option<Claim<'_>> {
        loop {
            // Register for a wakeup BEFORE looking at the state, so an
            // enqueue/release that happens between the check and the await
            // is not missed
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if state.closed {
                    return None;
                }
                if let Some(url) = state.pending.pop_front() {
                    state.in_flight += 1;
                    return Some(Claim { queue: self, url });
                }
                if state.in_flight == 0 {
                    // Drained: nobody can produce more work
                    state.closed = true;
                    drop(state);
                    self.changed.notify_waiters();
                    return None;
                }
            }

            notified.await;
        }
    }

    // Ends the crawl: current and future claim() calls return None
    pub fn close(&self) {
        self.lock().closed = true;
        self.changed.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    // Number of URLs waiting in the queue
    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().pending.is_empty()
    }

    // Number of claims not yet released
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    fn release(&self) {
        {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.changed.notify_waiters();
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// A URL taken from the queue by claim()
//
// While a Claim is alive the queue knows someone is still working and may
// add more links. Drop it only after the discovered links have been enqueued.
#[derive(Debug)]
pub struct Claim<'a> {
    queue: &'a UrlQueue,
    url: String,
}

impl Claim<'_> {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Deref for Claim<'_> {
    type Target = str;

    fn deref(&self) -> &str {
        &self.url
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.queue.release();
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why not just exit when the queue is empty?
//    - Another worker may be halfway through fetching a page
//    - That page can contain links, which will refill the queue
//    - Quitting early would end the crawl before the limit is reached
//
// 2. What does notified().enable() do?
//    - It registers this task as a waiter right away
//    - notify_waiters() only wakes tasks that are already registered
//    - Registering first, then checking the state, means no wakeup is lost
//
// 3. Why is the MutexGuard inside its own { } block?
//    - A std MutexGuard must not be held across an .await
//    - The block makes sure the guard is dropped before we wait
//
// 4. What is Deref on Claim?
//    - It lets a Claim be used wherever a &str is expected
//    - e.g. fetcher.fetch(&claim) works directly
// -----------------------------------------------------------------------------
