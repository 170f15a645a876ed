use std::{
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

/// a cancellation token, shared by every worker.
#[derive(Debug, Default)]
pub struct CancellationToken {
    // setting this to true marks the token as cancelled.
    cancelled: Mutex<bool>,
    cvar: Condvar,
}

// === impl CancellationToken ===

impl CancellationToken {
    /// marks the [`CancellationToken`] as cancelled, waking any sleepers.
    ///
    /// this is idempotent. once cancelled, the token stays cancelled.
    pub fn cancel(&self) {
        let mut cancelled = self.lock();

        if !*cancelled {
            *cancelled = true;
            self.cvar.notify_all();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.lock()
    }

    /// sleeps for `duration`, or until the token is cancelled.
    ///
    /// returns whether the token has been cancelled. a token cancelled before this is called
    /// returns immediately.
    pub fn sleep_with_cancellation(&self, duration: Duration) -> bool {
        let cancelled = self.lock();

        let (cancelled, _) = self
            .cvar
            .wait_timeout_while(cancelled, duration, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);

        *cancelled
    }

    /// the guarded value is a plain flag, so a poisoned lock is still meaningful.
    fn lock(&self) -> MutexGuard<'_, bool> {
        self.cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
