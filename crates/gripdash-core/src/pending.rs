//! At-most-one-in-flight guards.
//!
//! One boolean flag per idempotency-sensitive operation. Not a queue and
//! not a semaphore: a caller that finds the flag held drops its own turn,
//! and staleness is bounded by the next poll tick. The flag also serves as
//! the "still relevant?" guard for calls whose timer was stopped mid-flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-flight marker for one operation kind.
#[derive(Debug, Clone, Default)]
pub struct PendingFlag {
    busy: Arc<AtomicBool>,
}

impl PendingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the flag if it is idle. The returned guard releases on drop,
    /// so a panicking or early-returning caller can never leave the flag
    /// stuck.
    pub fn try_acquire(&self) -> Option<PendingGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| PendingGuard {
                flag: self.clone(),
            })
    }

    /// Whether an operation currently holds the flag.
    pub fn is_pending(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Scoped hold on a [`PendingFlag`].
#[derive(Debug)]
pub struct PendingGuard {
    flag: PendingFlag,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.flag.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_refused_until_release() {
        let flag = PendingFlag::new();
        assert!(!flag.is_pending());

        let guard = flag.try_acquire().expect("first acquire");
        assert!(flag.is_pending());
        assert!(flag.try_acquire().is_none());

        drop(guard);
        assert!(!flag.is_pending());
        assert!(flag.try_acquire().is_some());
    }

    #[test]
    fn clones_share_the_flag() {
        let flag = PendingFlag::new();
        let clone = flag.clone();
        let _guard = flag.try_acquire().expect("acquire");
        assert!(clone.is_pending());
        assert!(clone.try_acquire().is_none());
    }
}
