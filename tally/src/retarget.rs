//! Difficulty retarget boundaries

use std::num::NonZeroU64;
use crate::constants::RETARGET_INTERVAL;

const DEFAULT_INTERVAL: NonZeroU64 = match NonZeroU64::new(RETARGET_INTERVAL) {
    Some(interval) => interval,
    None => panic!("retarget interval must be non-zero"),
};

/// First retarget boundary strictly above `height`.
///
/// A height sitting exactly on a boundary has already retargeted, so the
/// following boundary is returned. Saturates at `u64::MAX` when that boundary
/// is not representable.
pub fn next_retarget_height(height: u64, interval: NonZeroU64) -> u64 {
    let interval = interval.get();
    (height / interval).saturating_add(1).saturating_mul(interval)
}

/// Blocks left until the next boundary, in `1..=interval` below the saturation point.
pub fn blocks_until_retarget(height: u64, interval: NonZeroU64) -> u64 {
    next_retarget_height(height, interval) - height
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetargetSchedule {
    interval: NonZeroU64,
}

impl RetargetSchedule {
    pub fn new(interval: u64) -> Option<Self> {
        NonZeroU64::new(interval).map(|interval| Self { interval })
    }

    pub fn interval(&self) -> u64 {
        self.interval.get()
    }

    pub fn next_after(&self, height: u64) -> u64 {
        next_retarget_height(height, self.interval)
    }

    pub fn blocks_until(&self, height: u64) -> u64 {
        blocks_until_retarget(height, self.interval)
    }

    pub fn is_boundary(&self, height: u64) -> bool {
        height % self.interval.get() == 0
    }
}

impl Default for RetargetSchedule {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(value: u64) -> NonZeroU64 {
        NonZeroU64::new(value).unwrap()
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(next_retarget_height(2016, interval(2016)), 4032);
        assert_eq!(next_retarget_height(2015, interval(2016)), 2016);
        assert_eq!(next_retarget_height(0, interval(2016)), 2016);
        assert_eq!(next_retarget_height(2017, interval(2016)), 4032);
        assert_eq!(next_retarget_height(840_000, interval(2016)), 840_672);
    }

    #[test]
    fn test_saturates_near_max_height() {
        assert_eq!(next_retarget_height(u64::MAX - 5, interval(2016)), u64::MAX);
        assert_eq!(next_retarget_height(u64::MAX, interval(1)), u64::MAX);
        assert_eq!(blocks_until_retarget(u64::MAX - 5, interval(2016)), 5);
    }

    #[test]
    fn test_result_is_strictly_greater_multiple() {
        for height in 0..5000 {
            let next = next_retarget_height(height, interval(144));
            assert!(next > height);
            assert_eq!(next % 144, 0);
            assert!(next - height <= 144);
        }
    }

    #[test]
    fn test_blocks_until() {
        assert_eq!(blocks_until_retarget(2015, interval(2016)), 1);
        assert_eq!(blocks_until_retarget(2016, interval(2016)), 2016);
        assert_eq!(blocks_until_retarget(840_000, interval(2016)), 672);
    }

    #[test]
    fn test_schedule() {
        assert!(RetargetSchedule::new(0).is_none());
        let schedule = RetargetSchedule::default();
        assert_eq!(schedule.interval(), 2016);
        assert!(schedule.is_boundary(4032));
        assert!(!schedule.is_boundary(4033));
        assert_eq!(schedule.next_after(4032), 6048);
        assert_eq!(schedule.blocks_until(4031), 1);
    }
}
