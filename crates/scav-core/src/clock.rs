//! Manually driven block clock.
//!
//! The reference environment advances one block per transaction; tests and
//! the simulator drive time explicitly with [`ManualClock::advance`] and
//! [`ManualClock::set`]. Clones share the same counter.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::traits::Clock;
use crate::types::BlockNumber;

#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    height: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading `height`.
    pub fn new(height: BlockNumber) -> Self {
        Self {
            height: Arc::new(AtomicU64::new(height)),
        }
    }

    /// Move forward by `blocks`. Returns the new height.
    pub fn advance(&self, blocks: u64) -> BlockNumber {
        self.height.fetch_add(blocks, Ordering::SeqCst) + blocks
    }

    /// Jump to `height`. Never moves backwards.
    pub fn set(&self, height: BlockNumber) -> BlockNumber {
        self.height.fetch_max(height, Ordering::SeqCst).max(height)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> BlockNumber {
        self.height.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_given_height() {
        assert_eq!(ManualClock::new(17).now(), 17);
        assert_eq!(ManualClock::default().now(), 0);
    }

    #[test]
    fn advance_returns_new_height() {
        let clock = ManualClock::new(10);
        assert_eq!(clock.advance(5), 15);
        assert_eq!(clock.now(), 15);
    }

    #[test]
    fn set_never_rewinds() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.set(50), 100);
        assert_eq!(clock.set(150), 150);
        assert_eq!(clock.now(), 150);
    }

    #[test]
    fn clones_share_the_counter() {
        let a = ManualClock::new(0);
        let b = a.clone();
        a.advance(3);
        assert_eq!(b.now(), 3);
    }
}
