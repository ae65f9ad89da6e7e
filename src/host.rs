//! Host interpreter lock — the handoff protocol around blocking engine calls.
//!
//! The embedding scripting runtime serializes all host-level execution behind
//! a single process-wide lock. A synthesis call blocks for the whole
//! utterance, so holding that lock across it would stall every other host
//! thread. The protocol here is a cooperative hand-back:
//!
//! 1. Host code runs holding a [`HostGuard`].
//! 2. [`HostGuard::suspended`] releases the lock for the duration of the
//!    blocking native call (`Released` state) and hands the callee a
//!    [`Handoff`].
//! 3. Each time the engine re-enters host-level logic (one chunk handler
//!    invocation), [`Handoff::reenter`] re-acquires the lock for exactly that
//!    invocation (`HeldForCallback` state) and releases it again before
//!    control returns to the engine.
//! 4. When the native call returns, `suspended` re-acquires the lock on the
//!    way out — on every exit path, including unwinds.
//!
//! The lock is a `parking_lot::Mutex` rather than `std::sync::Mutex`: a
//! panicking chunk handler must not poison the runtime's lock.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};

use parking_lot::{Mutex, MutexGuard};

/// The process-wide lock serializing host-level execution.
///
/// Owned by the embedding runtime; the synthesis layer only ever borrows it
/// through a [`HostGuard`].
#[derive(Debug, Default)]
pub struct HostLock {
    inner: Mutex<()>,
}

impl HostLock {
    /// Create a new host lock.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(()),
        }
    }

    /// Acquire the lock, blocking until it is free.
    ///
    /// Host-level code runs for as long as the returned guard lives.
    pub fn acquire(&self) -> HostGuard<'_> {
        HostGuard {
            lock: self,
            held: Some(self.inner.lock()),
        }
    }

    /// Whether some thread currently holds the lock.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}

/// Proof that the current thread holds the [`HostLock`].
pub struct HostGuard<'l> {
    lock: &'l HostLock,
    /// `Some` while the lock is held, `None` while suspended.
    held: Option<MutexGuard<'l, ()>>,
}

impl<'l> HostGuard<'l> {
    /// Release the lock for the duration of `f`, then re-acquire it.
    ///
    /// `f` is the long blocking native call. It receives a [`Handoff`] through
    /// which engine-side code can transiently re-enter host-level logic. The
    /// lock is re-acquired on every exit path out of `f`, including a panic
    /// unwinding through it, so the guard is always valid again afterwards.
    pub fn suspended<R>(&mut self, f: impl FnOnce(&Handoff<'l>) -> R) -> R {
        // Released state: other host threads may run from here on.
        self.held = None;
        let handoff = Handoff { lock: self.lock };

        let result = catch_unwind(AssertUnwindSafe(|| f(&handoff)));

        // Back to held, whichever way f exited.
        self.held = Some(self.lock.inner.lock());
        match result {
            Ok(value) => value,
            Err(payload) => resume_unwind(payload),
        }
    }
}

impl fmt::Debug for HostGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostGuard")
            .field("held", &self.held.is_some())
            .finish()
    }
}

/// The released side of a suspended [`HostGuard`].
///
/// Handed to the code running the blocking native call; exists only for the
/// duration of one [`HostGuard::suspended`] scope.
#[derive(Debug)]
pub struct Handoff<'l> {
    lock: &'l HostLock,
}

impl Handoff<'_> {
    /// Re-acquire the lock for the duration of one handler invocation.
    ///
    /// This is the `HeldForCallback` state: `f` runs host-level logic under
    /// the lock, and the lock is released again before control returns to the
    /// engine — also when `f` unwinds.
    pub fn reenter<R>(&self, f: impl FnOnce() -> R) -> R {
        let _held = self.lock.inner.lock();
        f()
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn acquire_holds_and_drop_releases() {
        let lock = HostLock::new();
        assert!(!lock.is_locked());

        let guard = lock.acquire();
        assert!(lock.is_locked());

        drop(guard);
        assert!(!lock.is_locked());
    }

    #[test]
    fn suspended_releases_and_reacquires() {
        let lock = HostLock::new();
        let mut guard = lock.acquire();

        guard.suspended(|_handoff| {
            assert!(!lock.is_locked());
        });

        assert!(lock.is_locked());
    }

    #[test]
    fn reenter_holds_for_the_callback_only() {
        let lock = HostLock::new();
        let mut guard = lock.acquire();

        guard.suspended(|handoff| {
            handoff.reenter(|| assert!(lock.is_locked()));
            assert!(!lock.is_locked());
        });
    }

    #[test]
    fn other_threads_run_while_suspended() {
        let lock = HostLock::new();
        let mut guard = lock.acquire();

        guard.suspended(|_handoff| {
            let (tx, rx) = mpsc::channel();
            thread::scope(|s| {
                s.spawn(|| {
                    // Must not block: the suspending thread released the lock.
                    let _guard = lock.acquire();
                    tx.send(()).unwrap();
                });
                rx.recv_timeout(Duration::from_secs(5))
                    .expect("second thread could not take the suspended lock");
            });
        });
    }

    #[test]
    fn lock_state_is_restored_after_a_panic() {
        let lock = HostLock::new();
        let mut guard = lock.acquire();

        let result = catch_unwind(AssertUnwindSafe(|| {
            guard.suspended(|_handoff| panic!("engine blew up"));
        }));
        assert!(result.is_err());

        // The guard re-acquired on the unwind path and is still usable.
        assert!(lock.is_locked());
        guard.suspended(|_handoff| assert!(!lock.is_locked()));
        drop(guard);
        assert!(!lock.is_locked());
    }
}
