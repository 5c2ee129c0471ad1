//! Data module for loading and batching unpaired image domains
//!
//! This module provides:
//! - Two-domain image folder dataset (trainA/trainB layout)
//! - Batching loader with aligned or unaligned pairing
//! - Image file to normalized tensor conversion and back

mod dataset;
mod loader;
mod transforms;

pub use dataset::ImageFolderDataset;
pub use loader::PairLoader;
pub use transforms::{load_image, tensor_to_image};
