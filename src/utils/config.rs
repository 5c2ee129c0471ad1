//! Configuration management
//!
//! Provides unified configuration for the entire CycleGAN pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data configuration
    pub data: DataConfig,
    /// Model configuration
    pub model: ModelConfig,
    /// Training configuration
    pub training: TrainingConfigFile,
}

/// Data-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Dataset root containing <mode>A and <mode>B subdirectories
    pub root: String,
    /// Square resolution images are resized to
    pub image_size: i64,
    /// Batch size
    pub batch_size: usize,
    /// Pair domains by independent random indices instead of position
    pub unaligned: bool,
}

/// Model-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Number of image channels (3 for RGB)
    pub channels: i64,
    /// Residual blocks per generator
    pub num_residual_blocks: i64,
}

/// Training-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfigFile {
    /// Number of epochs
    pub epochs: i64,
    /// Epoch at which learning-rate decay begins
    pub decay_epoch: i64,
    /// Base learning rate
    pub lr: f64,
    /// Weight of the cycle-consistency loss
    pub lambda_cycle: f64,
    /// Weight of the identity loss
    pub lambda_identity: f64,
    /// Replay buffer capacity per discriminator
    pub buffer_size: usize,
    /// Checkpoint save frequency
    pub checkpoint_every: i64,
    /// Checkpoint directory
    pub checkpoint_dir: String,
    /// Device: "cpu" or "cuda"
    pub device: String,
    /// Optional RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                root: "data/monet2photo".to_string(),
                image_size: 256,
                batch_size: 1,
                unaligned: true,
            },
            model: ModelConfig {
                channels: 3,
                num_residual_blocks: 9,
            },
            training: TrainingConfigFile {
                epochs: 200,
                decay_epoch: 100,
                lr: 2e-4,
                lambda_cycle: 10.0,
                lambda_identity: 5.0,
                buffer_size: 50,
                checkpoint_every: 10,
                checkpoint_dir: "checkpoints".to_string(),
                device: "cpu".to_string(),
                seed: None,
            },
        }
    }
}

impl Config {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from TOML file
    pub fn from_toml(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_toml(&self, path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn from_json(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn save_json(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from a path, dispatching on the file extension
    pub fn load(path: &str) -> anyhow::Result<Self> {
        if path.ends_with(".toml") {
            Self::from_toml(path)
        } else {
            Self::from_json(path)
        }
    }

    /// Get device from configuration
    pub fn get_device(&self) -> tch::Device {
        match self.training.device.to_lowercase().as_str() {
            "cuda" | "gpu" => {
                if tch::Cuda::is_available() {
                    tch::Device::Cuda(0)
                } else {
                    tracing::warn!("CUDA requested but not available, falling back to CPU");
                    tch::Device::Cpu
                }
            }
            _ => tch::Device::Cpu,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.data.batch_size == 0 {
            anyhow::bail!("Batch size must be > 0");
        }
        if self.data.image_size <= 0 || self.data.image_size % 4 != 0 {
            anyhow::bail!("Image size must be positive and divisible by 4");
        }
        if self.model.num_residual_blocks <= 0 {
            anyhow::bail!("Number of residual blocks must be > 0");
        }
        if self.training.epochs <= 0 {
            anyhow::bail!("Number of epochs must be > 0");
        }
        if self.training.decay_epoch >= self.training.epochs {
            anyhow::bail!("Decay epoch must be before the final epoch");
        }
        if self.training.buffer_size == 0 {
            anyhow::bail!("Replay buffer size must be > 0");
        }
        Ok(())
    }
}

/// Create default configuration file if it doesn't exist
pub fn ensure_config_exists(path: &str) -> anyhow::Result<Config> {
    if Path::new(path).exists() {
        Config::load(path)
    } else {
        let config = Config::default();
        if path.ends_with(".toml") {
            config.save_toml(path)?;
        } else {
            config.save_json(path)?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.data.image_size, 256);
        assert_eq!(config.model.num_residual_blocks, 9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let loaded: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(config.data.root, loaded.data.root);
        assert_eq!(config.training.lambda_cycle, loaded.training.lambda_cycle);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.training.decay_epoch = config.training.epochs;
        assert!(config.validate().is_err());

        config = Config::default();
        config.training.buffer_size = 0;
        assert!(config.validate().is_err());

        config = Config::default();
        config.data.image_size = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_toml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();

        let config = Config::default();
        config.save_toml(path).unwrap();

        let loaded = Config::load(path).unwrap();
        assert_eq!(loaded.data.batch_size, config.data.batch_size);
        assert_eq!(loaded.training.buffer_size, config.training.buffer_size);
    }
}
