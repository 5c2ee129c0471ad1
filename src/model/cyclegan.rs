//! CycleGAN wrapper combining both generator/discriminator pairs
//!
//! Owns the two translation generators (A->B and B->A) and the two domain
//! discriminators, their variable stores, and the optimizer builders.

use anyhow::{Context, Result};
use tch::{nn, nn::OptimizerConfig, nn::VarStore, Device, Tensor};

use super::discriminator::{Discriminator, DiscriminatorConfig};
use super::generator::{GeneratorConfig, GeneratorResNet};

/// Translation direction for inference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Translate a domain-A image into domain B
    AtoB,
    /// Translate a domain-B image into domain A
    BtoA,
}

/// Architecture hyperparameters shared by all four networks
#[derive(Debug, Clone, Copy)]
pub struct CycleGanConfig {
    /// Number of image channels
    pub channels: i64,
    /// Residual blocks per generator
    pub num_residual_blocks: i64,
    /// Square input resolution
    pub image_size: i64,
}

impl Default for CycleGanConfig {
    fn default() -> Self {
        Self {
            channels: 3,
            num_residual_blocks: 9,
            image_size: 256,
        }
    }
}

/// Complete CycleGAN model
pub struct CycleGan {
    /// Generator translating A -> B
    pub g_ab: GeneratorResNet,
    /// Generator translating B -> A
    pub g_ba: GeneratorResNet,
    /// Discriminator for domain A
    pub d_a: Discriminator,
    /// Discriminator for domain B
    pub d_b: Discriminator,
    /// Variable store holding both generators (optimized jointly)
    pub gen_vs: VarStore,
    /// Variable store for the domain-A discriminator
    pub d_a_vs: VarStore,
    /// Variable store for the domain-B discriminator
    pub d_b_vs: VarStore,
    /// Device (CPU/GPU)
    pub device: Device,
    config: CycleGanConfig,
}

impl CycleGan {
    /// Create a new CycleGAN model
    pub fn new(config: CycleGanConfig, device: Device) -> Self {
        let gen_vs = VarStore::new(device);
        let d_a_vs = VarStore::new(device);
        let d_b_vs = VarStore::new(device);

        let gen_config = GeneratorConfig {
            channels: config.channels,
            num_residual_blocks: config.num_residual_blocks,
        };
        let disc_config = DiscriminatorConfig {
            channels: config.channels,
            height: config.image_size,
            width: config.image_size,
        };

        let gen_root = gen_vs.root();
        let g_ab = GeneratorResNet::new(&(&gen_root / "g_ab"), gen_config);
        let g_ba = GeneratorResNet::new(&(&gen_root / "g_ba"), gen_config);
        let d_a = Discriminator::new(&d_a_vs.root(), disc_config);
        let d_b = Discriminator::new(&d_b_vs.root(), disc_config);

        Self {
            g_ab,
            g_ba,
            d_a,
            d_b,
            gen_vs,
            d_a_vs,
            d_b_vs,
            device,
            config,
        }
    }

    /// Translate a batch of images without tracking gradients
    pub fn translate(&self, input: &Tensor, direction: Direction) -> Tensor {
        tch::no_grad(|| match direction {
            Direction::AtoB => self.g_ab.forward(input),
            Direction::BtoA => self.g_ba.forward(input),
        })
    }

    /// Joint Adam optimizer over both generators
    pub fn gen_optimizer(&self, lr: f64, betas: (f64, f64)) -> Result<nn::Optimizer> {
        build_adam(&self.gen_vs, lr, betas).context("failed to create generator optimizer")
    }

    /// Optimizer for the domain-A discriminator
    pub fn d_a_optimizer(&self, lr: f64, betas: (f64, f64)) -> Result<nn::Optimizer> {
        build_adam(&self.d_a_vs, lr, betas).context("failed to create D_A optimizer")
    }

    /// Optimizer for the domain-B discriminator
    pub fn d_b_optimizer(&self, lr: f64, betas: (f64, f64)) -> Result<nn::Optimizer> {
        build_adam(&self.d_b_vs, lr, betas).context("failed to create D_B optimizer")
    }

    /// Save all network weights into a directory
    pub fn save(&self, dir: &str) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        self.gen_vs.save(format!("{}/generators.pt", dir))?;
        self.d_a_vs.save(format!("{}/disc_a.pt", dir))?;
        self.d_b_vs.save(format!("{}/disc_b.pt", dir))?;
        Ok(())
    }

    /// Load all network weights from a directory
    ///
    /// Fails if the stored parameters do not match this model's
    /// architecture hyperparameters.
    pub fn load(&mut self, dir: &str) -> Result<()> {
        self.gen_vs
            .load(format!("{}/generators.pt", dir))
            .with_context(|| format!("loading generator weights from {}", dir))?;
        self.d_a_vs
            .load(format!("{}/disc_a.pt", dir))
            .with_context(|| format!("loading D_A weights from {}", dir))?;
        self.d_b_vs
            .load(format!("{}/disc_b.pt", dir))
            .with_context(|| format!("loading D_B weights from {}", dir))?;
        Ok(())
    }

    /// Get architecture configuration
    pub fn config(&self) -> &CycleGanConfig {
        &self.config
    }
}

fn build_adam(vs: &VarStore, lr: f64, betas: (f64, f64)) -> Result<nn::Optimizer, tch::TchError> {
    nn::Adam {
        beta1: betas.0,
        beta2: betas.1,
        wd: 0.0,
        ..Default::default()
    }
    .build(vs, lr)
}
