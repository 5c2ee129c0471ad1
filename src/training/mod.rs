//! Training module for CycleGAN
//!
//! This module provides:
//! - Training loop implementation
//! - Loss functions (least-squares adversarial, cycle, identity)
//! - Replay buffer for discriminator inputs
//! - Linear learning-rate decay schedule
//! - Training configuration and metrics

mod losses;
mod metrics;
mod replay;
mod schedule;
mod trainer;

pub use losses::{adversarial_loss, cycle_loss, identity_loss};
pub use metrics::TrainingMetrics;
pub use replay::ReplayBuffer;
pub use schedule::DecaySchedule;
pub use trainer::{Trainer, TrainingConfig};
