//! Latest-value-wins publication of emulator outputs.
//!
//! A feed holds a single slot. Publishing overwrites it and wakes waiting
//! subscribers; a slow subscriber skips intermediate values but always sees
//! the newest one, and the publisher never waits on anyone.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

struct Slot<T> {
    value: T,
    version: u64,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    condvar: Condvar,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The publishing side of a feed.
pub struct Feed<T> {
    shared: Arc<Shared<T>>,
}

impl<T: Clone> Feed<T> {
    /// Create a feed whose subscribers start out seeing `initial`.
    pub fn new(initial: T) -> Feed<T> {
        Feed {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    value: initial,
                    version: 0,
                }),
                condvar: Condvar::new(),
            }),
        }
    }

    /// Replace the current value and notify subscribers.
    pub fn publish(&self, value: T) {
        let mut slot = self.shared.lock();
        slot.value = value;
        slot.version += 1;
        self.shared.condvar.notify_all();
    }

    /// A new subscriber. Values published before this call count as seen.
    pub fn subscribe(&self) -> Subscriber<T> {
        let seen = self.shared.lock().version;
        Subscriber {
            shared: self.shared.clone(),
            seen,
        }
    }

    pub fn latest(&self) -> T {
        self.shared.lock().value.clone()
    }
}

/// The receiving side of a feed.
pub struct Subscriber<T> {
    shared: Arc<Shared<T>>,
    seen: u64,
}

impl<T: Clone> Subscriber<T> {
    /// The current value, whether or not it was seen before.
    pub fn latest(&mut self) -> T {
        let slot = self.shared.lock();
        self.seen = slot.version;
        slot.value.clone()
    }

    /// The current value if it was published since the last read.
    pub fn try_next(&mut self) -> Option<T> {
        let slot = self.shared.lock();
        if slot.version == self.seen {
            return None;
        }
        self.seen = slot.version;
        Some(slot.value.clone())
    }

    /// Wait up to `timeout` for a value that has not been read yet.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.shared.lock();
        while slot.version == self.seen {
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            slot = self
                .shared
                .condvar
                .wait_timeout(slot, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        self.seen = slot.version;
        Some(slot.value.clone())
    }
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Subscriber {
            shared: self.shared.clone(),
            seen: self.seen,
        }
    }
}
