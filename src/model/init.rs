//! Weight initialization for GAN layers
//!
//! Convolution weights are drawn from N(0, 0.02) and biases zeroed, the
//! standard recipe for image-translation GANs. The kind of a layer is picked
//! explicitly at construction time rather than by inspecting type names.

use tch::nn::Init;

/// Kind of layer being initialized, a closed set selected by the concrete
/// component that owns the parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Convolutional layers (including the final projection convs)
    Convolution,
    /// Affine normalization layers. The instance norms used by these
    /// networks carry no parameters, so this arm is only exercised if an
    /// affine norm layer is ever added.
    Normalization,
}

impl LayerKind {
    /// Initializer for the layer's weight tensor
    pub fn weight_init(self) -> Init {
        match self {
            LayerKind::Convolution => Init::Randn { mean: 0.0, stdev: 0.02 },
            LayerKind::Normalization => Init::Randn { mean: 1.0, stdev: 0.02 },
        }
    }

    /// Initializer for the layer's bias tensor
    pub fn bias_init(self) -> Init {
        Init::Const(0.0)
    }
}
