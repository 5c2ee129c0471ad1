//! Patch-based discriminator
//!
//! Scores overlapping patches of the input rather than the whole image: the
//! output is a spatial grid of real/fake logits, one per receptive-field
//! patch, which pushes the generator toward local realism. Fully
//! convolutional, so the input resolution is flexible.

use tch::nn::Module;
use tch::{nn, Tensor};

use super::init::LayerKind;
use super::{instance_norm2d, leaky_relu};

/// Discriminator network configuration
#[derive(Debug, Clone, Copy)]
pub struct DiscriminatorConfig {
    /// Number of image channels (3 for RGB)
    pub channels: i64,
    /// Input image height
    pub height: i64,
    /// Input image width
    pub width: i64,
}

impl Default for DiscriminatorConfig {
    fn default() -> Self {
        Self {
            channels: 3,
            height: 256,
            width: 256,
        }
    }
}

/// Patch discriminator
///
/// Architecture: four stride-2 4x4 convolutions (64 -> 128 -> 256 -> 512),
/// instance norm on all but the first, LeakyReLU(0.2) throughout, then
/// asymmetric zero padding and a final 4x4 convolution collapsing to one
/// logit channel.
#[derive(Debug)]
pub struct Discriminator {
    config: DiscriminatorConfig,
    conv1: nn::Conv2D,
    conv2: nn::Conv2D,
    conv3: nn::Conv2D,
    conv4: nn::Conv2D,
    /// Final patch-logit projection
    conv_out: nn::Conv2D,
}

impl Discriminator {
    /// Create a new discriminator network
    pub fn new(vs: &nn::Path, config: DiscriminatorConfig) -> Self {
        let stride2 = nn::ConvConfig {
            stride: 2,
            padding: 1,
            ws_init: LayerKind::Convolution.weight_init(),
            bs_init: LayerKind::Convolution.bias_init(),
            ..Default::default()
        };
        let pad1 = nn::ConvConfig {
            padding: 1,
            ws_init: LayerKind::Convolution.weight_init(),
            bs_init: LayerKind::Convolution.bias_init(),
            ..Default::default()
        };

        let conv1 = nn::conv2d(vs / "conv1", config.channels, 64, 4, stride2);
        let conv2 = nn::conv2d(vs / "conv2", 64, 128, 4, stride2);
        let conv3 = nn::conv2d(vs / "conv3", 128, 256, 4, stride2);
        let conv4 = nn::conv2d(vs / "conv4", 256, 512, 4, stride2);
        let conv_out = nn::conv2d(vs / "conv_out", 512, 1, 4, pad1);

        Self {
            config,
            conv1,
            conv2,
            conv3,
            conv4,
            conv_out,
        }
    }

    /// Shape of the output logit map: (1, height/16, width/16)
    pub fn output_shape(&self) -> (i64, i64, i64) {
        (1, self.config.height / 16, self.config.width / 16)
    }

    /// Forward pass
    ///
    /// # Arguments
    ///
    /// * `input` - Tensor of shape (batch, channels, height, width)
    ///
    /// # Returns
    ///
    /// Patch logits of shape (batch, 1, height/16, width/16)
    pub fn forward(&self, input: &Tensor) -> Tensor {
        // First block has no normalization
        let x = leaky_relu(&self.conv1.forward(input), 0.2);

        let x = self.conv2.forward(&x);
        let x = leaky_relu(&instance_norm2d(&x), 0.2);

        let x = self.conv3.forward(&x);
        let x = leaky_relu(&instance_norm2d(&x), 0.2);

        let x = self.conv4.forward(&x);
        let x = leaky_relu(&instance_norm2d(&x), 0.2);

        // Asymmetric zero padding keeps the final map at height/16
        let x = x.constant_pad_nd([1, 0, 1, 0]);
        self.conv_out.forward(&x)
    }

    /// Get configuration
    pub fn config(&self) -> &DiscriminatorConfig {
        &self.config
    }
}

impl nn::Module for Discriminator {
    fn forward(&self, xs: &Tensor) -> Tensor {
        Discriminator::forward(self, xs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{nn::VarStore, Device, Kind};

    #[test]
    fn test_discriminator_output_shape() {
        let vs = VarStore::new(Device::Cpu);
        let disc = Discriminator::new(&vs.root(), DiscriminatorConfig::default());

        assert_eq!(disc.output_shape(), (1, 16, 16));

        let input = Tensor::zeros([1, 3, 256, 256], (Kind::Float, Device::Cpu));
        let output = disc.forward(&input);

        assert_eq!(output.size(), vec![1, 1, 16, 16]);
    }

    #[test]
    fn test_discriminator_smaller_resolution() {
        // Fully convolutional: other resolutions produce height/16 maps
        let vs = VarStore::new(Device::Cpu);
        let config = DiscriminatorConfig {
            channels: 3,
            height: 64,
            width: 64,
        };
        let disc = Discriminator::new(&vs.root(), config);

        let input = Tensor::randn([2, 3, 64, 64], (Kind::Float, Device::Cpu));
        let output = disc.forward(&input);

        assert_eq!(output.size(), vec![2, 1, 4, 4]);
    }
}
