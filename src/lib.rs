//! # CycleGAN for Unpaired Image Translation
//!
//! This crate provides a modular implementation of CycleGAN: two ResNet
//! generators learn to translate images between two visual domains without
//! paired examples, trained adversarially against two patch discriminators
//! with cycle-consistency and identity constraints.
//!
//! ## Modules
//!
//! - `data`: Unpaired two-domain image datasets and batching
//! - `model`: Network architecture (generators, discriminators, wrapper)
//! - `training`: Training loop, losses, replay buffer, LR schedule
//! - `utils`: Configuration and checkpoint helpers

pub mod data;
pub mod model;
pub mod training;
pub mod utils;

pub use data::{load_image, tensor_to_image, ImageFolderDataset, PairLoader};
pub use model::{CycleGan, CycleGanConfig, Direction, Discriminator, GeneratorResNet};
pub use training::{DecaySchedule, ReplayBuffer, Trainer, TrainingConfig, TrainingMetrics};
pub use utils::{load_checkpoint, save_checkpoint, Config};
