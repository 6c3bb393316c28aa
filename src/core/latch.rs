use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// One-shot gate: opened once, waited on by any number of threads
///
/// Once open it stays open. Waiters re-check the flag under the lock, so
/// spurious wakeups never release them early.
#[derive(Debug, Default)]
pub struct Latch {
    open: Mutex<bool>,
    cvar: Condvar,
}

impl Latch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the gate and wake every waiter
    ///
    /// Returns `true` if this call opened it, `false` if it was already open.
    pub fn open(&self) -> bool {
        let mut open = self.lock();
        if *open {
            return false;
        }
        *open = true;
        self.cvar.notify_all();
        true
    }

    pub fn is_open(&self) -> bool {
        *self.lock()
    }

    /// Block until the gate is open
    pub fn wait(&self) {
        let open = self.lock();
        let _open = self
            .cvar
            .wait_while(open, |open| !*open)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Block until the gate is open or the timeout expires
    ///
    /// Returns `true` if open, `false` if timed out.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut open = self.lock();

        while !*open {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .cvar
                .wait_timeout(open, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            open = guard;
        }
        true
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
