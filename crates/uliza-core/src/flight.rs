//! Single in-flight submission guard shared by the auth and query flows.

use std::sync::atomic::{AtomicBool, Ordering};

/// RAII marker for a submission in flight.
///
/// Acquired before the network call and released on drop, so every exit
/// path (success, failure, or a dropped future) clears the flag.
pub(crate) struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlightGuard<'a> {
    /// Returns `None` when a submission is already in flight.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);

        let guard = FlightGuard::acquire(&flag).expect("first acquire should succeed");
        assert!(FlightGuard::acquire(&flag).is_none());

        drop(guard);
        assert!(FlightGuard::acquire(&flag).is_some());
    }
}
