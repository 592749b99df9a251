//! Wheel selector: pick one restaurant at random.
//!
//! The draw is uniform over the current list, with no weighting and no
//! memory of previous winners. The only state is a latch preventing a new
//! spin while one is still animating; the animation itself, and the moment
//! it completes, belong to the caller.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;

/// Uniform random index into a list of `len` options. `None` for an empty
/// list.
pub fn draw_index(len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(rand::thread_rng().gen_range(0..len))
}

/// Spin latch plus draw. One spin may be outstanding at a time.
#[derive(Debug, Default)]
pub struct Wheel {
    spinning: AtomicBool,
}

impl Wheel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a spin over `len` options and return the drawn index.
    ///
    /// Refuses (`None`) while a previous spin is still in progress, and for
    /// lists shorter than two: a one-entry wheel is not a choice.
    pub fn spin(&self, len: usize) -> Option<usize> {
        if len < 2 {
            return None;
        }
        if self.spinning.swap(true, Ordering::AcqRel) {
            return None;
        }
        draw_index(len)
    }

    /// Caller-driven animation-complete event; releases the latch.
    pub fn finish(&self) {
        self.spinning.store(false, Ordering::Release);
    }

    pub fn is_spinning(&self) -> bool {
        self.spinning.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draw_stays_in_bounds() {
        for _ in 0..1_000 {
            let index = draw_index(5).unwrap();
            assert!(index < 5);
        }
        assert_eq!(draw_index(0), None);
        assert_eq!(draw_index(1), Some(0));
    }

    #[test]
    fn draw_is_roughly_uniform() {
        const DRAWS: usize = 10_000;
        const OPTIONS: usize = 5;

        let mut counts = [0usize; OPTIONS];
        for _ in 0..DRAWS {
            counts[draw_index(OPTIONS).unwrap()] += 1;
        }

        // each bucket expects 2000; allow a generous band that a fair
        // uniform source essentially never leaves
        let expected = DRAWS / OPTIONS;
        for (index, &count) in counts.iter().enumerate() {
            assert!(
                count > expected * 7 / 10 && count < expected * 13 / 10,
                "index {index} drawn {count} times, expected about {expected}"
            );
        }
    }

    #[test]
    fn spin_requires_at_least_two_options() {
        let wheel = Wheel::new();
        assert_eq!(wheel.spin(0), None);
        assert_eq!(wheel.spin(1), None);
        assert!(wheel.spin(2).is_some());
    }

    #[test]
    fn latch_blocks_overlapping_spins() {
        let wheel = Wheel::new();

        assert!(wheel.spin(5).is_some());
        assert!(wheel.is_spinning());
        assert_eq!(wheel.spin(5), None);

        wheel.finish();
        assert!(!wheel.is_spinning());
        assert!(wheel.spin(5).is_some());
    }
}
