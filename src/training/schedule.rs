//! Linear learning-rate decay schedule
//!
//! Holds the rate at 1.0 until a configured epoch, then decays linearly to
//! 0.0 at the final epoch. The returned value is a multiplier applied to a
//! base learning rate via `Optimizer::set_lr`; it carries no optimizer
//! state of its own.

use anyhow::{bail, Result};

/// Epoch -> learning-rate multiplier schedule
#[derive(Debug, Clone, Copy)]
pub struct DecaySchedule {
    /// Total number of training epochs
    pub n_epochs: i64,
    /// Offset added to the epoch counter (for resumed runs)
    pub offset: i64,
    /// Epoch at which the linear decay begins
    pub decay_start_epoch: i64,
}

impl DecaySchedule {
    /// Create a new schedule
    ///
    /// Fails if decay would not start before training ends, since the decay
    /// denominator would be non-positive.
    pub fn new(n_epochs: i64, offset: i64, decay_start_epoch: i64) -> Result<Self> {
        if n_epochs <= decay_start_epoch {
            bail!(
                "decay must start before training ends (n_epochs={}, decay_start_epoch={})",
                n_epochs,
                decay_start_epoch
            );
        }
        Ok(Self {
            n_epochs,
            offset,
            decay_start_epoch,
        })
    }

    /// Learning-rate multiplier for the given epoch
    ///
    /// 1.0 before `decay_start_epoch - offset`, 0.0 at `n_epochs - offset`,
    /// linear in between.
    pub fn factor(&self, epoch: i64) -> f64 {
        let progressed = (epoch + self.offset - self.decay_start_epoch).max(0);
        1.0 - progressed as f64 / (self.n_epochs - self.decay_start_epoch) as f64
    }

    /// Alias for `factor` keeping the conventional scheduler call shape
    pub fn step(&self, epoch: i64) -> f64 {
        self.factor(epoch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_construction_rejected() {
        assert!(DecaySchedule::new(100, 0, 100).is_err());
        assert!(DecaySchedule::new(100, 0, 150).is_err());
    }

    #[test]
    fn test_flat_before_decay() {
        let schedule = DecaySchedule::new(200, 0, 100).unwrap();

        assert_eq!(schedule.factor(0), 1.0);
        assert_eq!(schedule.factor(50), 1.0);
        assert_eq!(schedule.factor(100), 1.0);
    }

    #[test]
    fn test_endpoints() {
        let schedule = DecaySchedule::new(200, 0, 100).unwrap();

        assert_eq!(schedule.factor(100), 1.0);
        assert_eq!(schedule.factor(200), 0.0);
        assert!((schedule.factor(150) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_monotonically_non_increasing() {
        let schedule = DecaySchedule::new(100, 0, 60).unwrap();

        let mut prev = f64::INFINITY;
        for epoch in 0..=100 {
            let factor = schedule.factor(epoch);
            assert!(factor <= prev);
            prev = factor;
        }
    }

    #[test]
    fn test_offset_shifts_decay() {
        let schedule = DecaySchedule::new(200, 50, 100).unwrap();

        // Effective epoch = epoch + offset
        assert_eq!(schedule.factor(50), 1.0);
        assert_eq!(schedule.factor(150), 0.0);
    }
}
