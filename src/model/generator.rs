//! ResNet-style generator for image-to-image translation
//!
//! The generator downsamples the input, applies a stack of residual blocks
//! at the reduced resolution, then upsamples back to the input size. The
//! final tanh bounds the output to [-1, 1].

use tch::nn::Module;
use tch::{nn, Tensor};

use super::init::LayerKind;
use super::instance_norm2d;
use super::residual::ResidualBlock;

/// Generator network configuration
#[derive(Debug, Clone, Copy)]
pub struct GeneratorConfig {
    /// Number of image channels (3 for RGB)
    pub channels: i64,
    /// Number of residual blocks in the bottleneck
    pub num_residual_blocks: i64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            channels: 3,
            num_residual_blocks: 9,
        }
    }
}

/// ResNet generator
///
/// Architecture:
/// 1. Reflection-padded 7x7 convolution expanding to 64 channels
/// 2. Two stride-2 downsampling convolutions (64 -> 128 -> 256)
/// 3. `num_residual_blocks` residual blocks at 256 channels
/// 4. Two nearest-neighbor upsample + convolution stages (256 -> 128 -> 64)
/// 5. Reflection-padded 7x7 convolution back to `channels`, tanh
#[derive(Debug)]
pub struct GeneratorResNet {
    config: GeneratorConfig,
    /// Initial wide convolution
    conv_in: nn::Conv2D,
    /// Downsampling convolutions
    down1: nn::Conv2D,
    down2: nn::Conv2D,
    /// Bottleneck residual blocks
    blocks: Vec<ResidualBlock>,
    /// Upsampling convolutions (after nearest-neighbor upsample)
    up1: nn::Conv2D,
    up2: nn::Conv2D,
    /// Final wide convolution
    conv_out: nn::Conv2D,
}

impl GeneratorResNet {
    /// Create a new generator network
    pub fn new(vs: &nn::Path, config: GeneratorConfig) -> Self {
        let init = nn::ConvConfig {
            ws_init: LayerKind::Convolution.weight_init(),
            bs_init: LayerKind::Convolution.bias_init(),
            ..Default::default()
        };
        let stride2 = nn::ConvConfig {
            stride: 2,
            padding: 1,
            ..init
        };
        let pad1 = nn::ConvConfig { padding: 1, ..init };

        // Initial block, input is reflection-padded by 3 before the 7x7 conv
        let conv_in = nn::conv2d(vs / "conv_in", config.channels, 64, 7, init);

        let down1 = nn::conv2d(vs / "down1", 64, 128, 3, stride2);
        let down2 = nn::conv2d(vs / "down2", 128, 256, 3, stride2);

        let blocks = (0..config.num_residual_blocks)
            .map(|i| ResidualBlock::new(&(vs / format!("res{}", i)), 256))
            .collect();

        let up1 = nn::conv2d(vs / "up1", 256, 128, 3, pad1);
        let up2 = nn::conv2d(vs / "up2", 128, 64, 3, pad1);

        let conv_out = nn::conv2d(vs / "conv_out", 64, config.channels, 7, init);

        Self {
            config,
            conv_in,
            down1,
            down2,
            blocks,
            up1,
            up2,
            conv_out,
        }
    }

    /// Forward pass
    ///
    /// # Arguments
    ///
    /// * `input` - Tensor of shape (batch, channels, height, width) with
    ///   height and width divisible by 4
    ///
    /// # Returns
    ///
    /// Tensor of the same shape with values in [-1, 1]
    pub fn forward(&self, input: &Tensor) -> Tensor {
        let x = input.reflection_pad2d([3, 3, 3, 3]);
        let x = self.conv_in.forward(&x);
        let x = instance_norm2d(&x).relu();

        let x = self.down1.forward(&x);
        let x = instance_norm2d(&x).relu();
        let x = self.down2.forward(&x);
        let mut x = instance_norm2d(&x).relu();

        for block in &self.blocks {
            x = block.forward(&x);
        }

        let x = upsample2x(&x);
        let x = self.up1.forward(&x);
        let x = instance_norm2d(&x).relu();

        let x = upsample2x(&x);
        let x = self.up2.forward(&x);
        let x = instance_norm2d(&x).relu();

        let x = x.reflection_pad2d([3, 3, 3, 3]);
        self.conv_out.forward(&x).tanh()
    }

    /// Get configuration
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }
}

impl nn::Module for GeneratorResNet {
    fn forward(&self, xs: &Tensor) -> Tensor {
        GeneratorResNet::forward(self, xs)
    }
}

/// Nearest-neighbor upsampling by a factor of 2
fn upsample2x(x: &Tensor) -> Tensor {
    let size = x.size();
    let (h, w) = (size[size.len() - 2], size[size.len() - 1]);
    x.upsample_nearest2d([h * 2, w * 2], None::<f64>, None::<f64>)
}
