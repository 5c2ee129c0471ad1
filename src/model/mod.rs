//! Model module containing the CycleGAN architecture components
//!
//! This module provides:
//! - Residual blocks used inside the generator bottleneck
//! - ResNet-style generators for domain-to-domain translation
//! - Patch-based discriminators
//! - Weight initialization dispatch
//! - CycleGan wrapper combining both generator/discriminator pairs

mod cyclegan;
mod discriminator;
mod generator;
mod init;
mod residual;

pub use cyclegan::{CycleGan, CycleGanConfig, Direction};
pub use discriminator::{Discriminator, DiscriminatorConfig};
pub use generator::{GeneratorConfig, GeneratorResNet};
pub use init::LayerKind;
pub use residual::ResidualBlock;

use tch::Tensor;

/// Affine-free instance normalization over (N, C, H, W).
///
/// Normalizes each sample's feature maps independently, so no batch
/// statistics leak across unrelated images. There are no learnable
/// parameters.
pub(crate) fn instance_norm2d(x: &Tensor) -> Tensor {
    x.instance_norm(
        None::<Tensor>,
        None::<Tensor>,
        None::<Tensor>,
        None::<Tensor>,
        true,
        0.1,
        1e-5,
        false,
    )
}

/// Leaky rectifier with a configurable negative slope.
///
/// Equivalent to max(x, slope * x) for slope in (0, 1).
pub(crate) fn leaky_relu(x: &Tensor, slope: f64) -> Tensor {
    x.maximum(&(x * slope))
}
