use std::sync::atomic::{AtomicU32, Ordering};

/// Oracle calls allowed per process when not configured otherwise.
pub const DEFAULT_CEILING: u32 = 250;

/// Lifetime budget of oracle calls. Owned by the composition root and shared
/// behind `Arc`; the counter never resets and never exceeds the ceiling.
#[derive(Debug)]
pub struct RateLimiter {
    ceiling: u32,
    used: AtomicU32,
}

impl RateLimiter {
    pub fn new(ceiling: u32) -> Self {
        Self {
            ceiling,
            used: AtomicU32::new(0),
        }
    }

    /// Claims one unit of capacity. The read and the increment are a single
    /// compare-and-swap, so two callers can never claim the same unit.
    pub fn try_acquire(&self) -> bool {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                (used < self.ceiling).then_some(used + 1)
            })
            .is_ok()
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub fn used(&self) -> u32 {
        self.used.load(Ordering::Acquire)
    }

    pub fn remaining(&self) -> u32 {
        self.ceiling.saturating_sub(self.used())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_CEILING)
    }
}
