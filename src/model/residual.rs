//! Residual block used in the generator bottleneck
//!
//! Two 3x3 convolutions with reflective padding and instance normalization,
//! plus a skip connection. Reflective padding avoids the border artifacts
//! that zero padding introduces in image translation.

use tch::nn::Module;
use tch::{nn, Tensor};

use super::init::LayerKind;
use super::instance_norm2d;

/// Residual block preserving the input shape
#[derive(Debug)]
pub struct ResidualBlock {
    conv1: nn::Conv2D,
    conv2: nn::Conv2D,
}

impl ResidualBlock {
    /// Create a new residual block operating on `in_features` channels
    pub fn new(vs: &nn::Path, in_features: i64) -> Self {
        let conv_config = nn::ConvConfig {
            ws_init: LayerKind::Convolution.weight_init(),
            bs_init: LayerKind::Convolution.bias_init(),
            ..Default::default()
        };

        // Padding is done by reflection before each conv, not inside it
        let conv1 = nn::conv2d(vs / "conv1", in_features, in_features, 3, conv_config);
        let conv2 = nn::conv2d(vs / "conv2", in_features, in_features, 3, conv_config);

        Self { conv1, conv2 }
    }

    /// Forward pass: input + transform(input), output shape equals input shape
    pub fn forward(&self, x: &Tensor) -> Tensor {
        let y = x.reflection_pad2d([1, 1, 1, 1]);
        let y = self.conv1.forward(&y);
        let y = instance_norm2d(&y).relu();

        let y = y.reflection_pad2d([1, 1, 1, 1]);
        let y = self.conv2.forward(&y);
        let y = instance_norm2d(&y);

        x + y
    }
}

impl nn::Module for ResidualBlock {
    fn forward(&self, xs: &Tensor) -> Tensor {
        ResidualBlock::forward(self, xs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{nn::VarStore, Device, Kind, Tensor};

    #[test]
    fn test_residual_block_preserves_shape() {
        let vs = VarStore::new(Device::Cpu);
        let block = ResidualBlock::new(&vs.root(), 16);

        let input = Tensor::randn([2, 16, 20, 24], (Kind::Float, Device::Cpu));
        let output = block.forward(&input);

        assert_eq!(output.size(), vec![2, 16, 20, 24]);
    }

    #[test]
    fn test_residual_block_single_channel() {
        let vs = VarStore::new(Device::Cpu);
        let block = ResidualBlock::new(&vs.root(), 1);

        let input = Tensor::randn([1, 1, 8, 8], (Kind::Float, Device::Cpu));
        let output = block.forward(&input);

        assert_eq!(output.size(), vec![1, 1, 8, 8]);
    }
}
