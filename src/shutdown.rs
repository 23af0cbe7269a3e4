//! Shutdown coordination
//!
//! The interrupt handler raises the flag; the control thread sleeps on a
//! condition variable until it is raised. The audio callbacks never see it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Process-wide "stop requested" flag
#[derive(Debug, Default)]
pub struct ShutdownFlag {
    requested: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the control loop to stop. Safe to call from any thread, any number of times.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
        // Taking the lock orders this store against a waiter that has just
        // checked the flag and is about to sleep.
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.wake.notify_all();
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Block until a stop is requested.
    ///
    /// Wakes immediately on `request()`, and re-checks the flag at least
    /// every `poll_interval` regardless.
    pub fn wait(&self, poll_interval: Duration) {
        let mut guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        while !self.is_requested() {
            guard = match self.wake.wait_timeout(guard, poll_interval) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
    }
}

/// Route Ctrl+C (SIGINT) to `flag`
pub fn install_interrupt_handler(flag: Arc<ShutdownFlag>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        flag.request();
    })
}
