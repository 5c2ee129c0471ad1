//! Training loop implementation for CycleGAN
//!
//! Alternates a joint generator update with one update per domain
//! discriminator, routing generated samples through replay buffers and
//! decaying the learning rate on a linear schedule.

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tch::Device;
use tracing::{info, warn};

use crate::data::PairLoader;
use crate::model::CycleGan;
use crate::utils::save_checkpoint;

use super::losses::{adversarial_loss, cycle_loss, identity_loss};
use super::metrics::TrainingMetrics;
use super::replay::ReplayBuffer;
use super::schedule::DecaySchedule;

/// Training configuration
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    /// Total number of training epochs
    pub epochs: i64,
    /// Absolute epoch the loop starts at (nonzero when resuming)
    pub start_epoch: i64,
    /// Epoch at which learning-rate decay begins
    pub decay_epoch: i64,
    /// Base learning rate for all optimizers
    pub lr: f64,
    /// Adam first-moment decay
    pub beta1: f64,
    /// Adam second-moment decay
    pub beta2: f64,
    /// Weight of the cycle-consistency term
    pub lambda_cycle: f64,
    /// Weight of the identity term
    pub lambda_identity: f64,
    /// Replay buffer capacity per discriminator
    pub buffer_size: usize,
    /// Save checkpoint every N epochs
    pub checkpoint_every: i64,
    /// Directory to save checkpoints
    pub checkpoint_dir: String,
    /// RNG seed for the replay buffers (entropy-seeded when absent)
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 200,
            start_epoch: 0,
            decay_epoch: 100,
            lr: 2e-4,
            beta1: 0.5,
            beta2: 0.999,
            lambda_cycle: 10.0,
            lambda_identity: 5.0,
            buffer_size: 50,
            checkpoint_every: 10,
            checkpoint_dir: "checkpoints".to_string(),
            seed: None,
        }
    }
}

/// CycleGAN trainer
pub struct Trainer {
    config: TrainingConfig,
    device: Device,
    metrics: TrainingMetrics,
}

impl Trainer {
    /// Create a new trainer
    pub fn new(config: TrainingConfig, device: Device) -> Self {
        Self::with_metrics(config, device, TrainingMetrics::new())
    }

    /// Create a trainer that continues recording into existing metrics,
    /// as restored from a checkpoint
    pub fn with_metrics(config: TrainingConfig, device: Device, metrics: TrainingMetrics) -> Self {
        Self {
            config,
            device,
            metrics,
        }
    }

    /// Learning-rate schedule over absolute epochs
    ///
    /// The training loop counts epochs from zero even when resuming, so
    /// the schedule carries no extra offset.
    pub fn lr_schedule(&self) -> Result<DecaySchedule> {
        DecaySchedule::new(self.config.epochs, 0, self.config.decay_epoch)
    }

    /// Train the CycleGAN model
    ///
    /// # Arguments
    ///
    /// * `model` - CycleGAN model to train
    /// * `loader` - Loader providing unaligned (A, B) image batches
    ///
    /// # Returns
    ///
    /// Training metrics
    pub fn train(&mut self, model: &mut CycleGan, loader: &mut PairLoader) -> Result<&TrainingMetrics> {
        let betas = (self.config.beta1, self.config.beta2);
        let mut gen_opt = model.gen_optimizer(self.config.lr, betas)?;
        let mut d_a_opt = model.d_a_optimizer(self.config.lr, betas)?;
        let mut d_b_opt = model.d_b_optimizer(self.config.lr, betas)?;

        let schedule = self.lr_schedule()?;

        let mut buffer_a = match self.config.seed {
            Some(seed) => ReplayBuffer::with_seed(self.config.buffer_size, seed)?,
            None => ReplayBuffer::new(self.config.buffer_size)?,
        };
        let mut buffer_b = match self.config.seed {
            Some(seed) => ReplayBuffer::with_seed(self.config.buffer_size, seed.wrapping_add(1))?,
            None => ReplayBuffer::new(self.config.buffer_size)?,
        };

        let num_batches = loader.num_batches();
        info!(
            "Starting training for {} epochs, {} batches per epoch",
            self.config.epochs - self.config.start_epoch,
            num_batches
        );

        std::fs::create_dir_all(&self.config.checkpoint_dir).ok();

        for epoch in self.config.start_epoch..self.config.epochs {
            let lr = self.config.lr * schedule.factor(epoch);
            gen_opt.set_lr(lr);
            d_a_opt.set_lr(lr);
            d_b_opt.set_lr(lr);

            let mut epoch_gen_loss = 0.0;
            let mut epoch_disc_loss = 0.0;
            let mut epoch_cycle_loss = 0.0;
            let mut epoch_identity_loss = 0.0;
            let mut batch_count = 0;

            let pb = ProgressBar::new(num_batches as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("##-"),
            );

            loader.reset();
            while let Some((real_a, real_b)) = loader.next_batch()? {
                let real_a = real_a.to_device(self.device);
                let real_b = real_b.to_device(self.device);

                // ========== Train Generators ==========
                let same_a = model.g_ba.forward(&real_a);
                let same_b = model.g_ab.forward(&real_b);
                let loss_identity =
                    (identity_loss(&same_a, &real_a) + identity_loss(&same_b, &real_b)) / 2.0;

                let fake_b = model.g_ab.forward(&real_a);
                let fake_a = model.g_ba.forward(&real_b);
                let loss_gan = (adversarial_loss(&model.d_b.forward(&fake_b), true)
                    + adversarial_loss(&model.d_a.forward(&fake_a), true))
                    / 2.0;

                let recovered_a = model.g_ba.forward(&fake_b);
                let recovered_b = model.g_ab.forward(&fake_a);
                let loss_cycle = (cycle_loss(&recovered_a, &real_a)
                    + cycle_loss(&recovered_b, &real_b))
                    / 2.0;

                let loss_g = &loss_gan
                    + &loss_cycle * self.config.lambda_cycle
                    + &loss_identity * self.config.lambda_identity;

                gen_opt.zero_grad();
                loss_g.backward();
                gen_opt.step();

                // ========== Train Discriminator A ==========
                let fake_a_pool = buffer_a.push_and_pop(&fake_a);
                let loss_d_a = (adversarial_loss(&model.d_a.forward(&real_a), true)
                    + adversarial_loss(&model.d_a.forward(&fake_a_pool), false))
                    / 2.0;

                d_a_opt.zero_grad();
                loss_d_a.backward();
                d_a_opt.step();

                // ========== Train Discriminator B ==========
                let fake_b_pool = buffer_b.push_and_pop(&fake_b);
                let loss_d_b = (adversarial_loss(&model.d_b.forward(&real_b), true)
                    + adversarial_loss(&model.d_b.forward(&fake_b_pool), false))
                    / 2.0;

                d_b_opt.zero_grad();
                loss_d_b.backward();
                d_b_opt.step();

                let g = loss_g.double_value(&[]);
                let d = loss_d_a.double_value(&[]) + loss_d_b.double_value(&[]);
                epoch_gen_loss += g;
                epoch_disc_loss += d;
                epoch_cycle_loss += loss_cycle.double_value(&[]);
                epoch_identity_loss += loss_identity.double_value(&[]);
                batch_count += 1;

                pb.set_message(format!("G: {:.4}, D: {:.4}", g, d));
                pb.inc(1);
            }

            pb.finish_with_message("done");

            if batch_count == 0 {
                anyhow::bail!("loader produced no batches; dataset too small for batch size");
            }

            let n = batch_count as f64;
            let avg_gen = epoch_gen_loss / n;
            let avg_disc = epoch_disc_loss / n;
            let avg_cycle = epoch_cycle_loss / n;
            let avg_identity = epoch_identity_loss / n;

            self.metrics.record_epoch(avg_gen, avg_disc, avg_cycle, avg_identity);

            info!(
                "Epoch {}/{}: lr={:.2e}, G_loss={:.4}, D_loss={:.4}, cycle={:.4}, identity={:.4}",
                epoch + 1,
                self.config.epochs,
                lr,
                avg_gen,
                avg_disc,
                avg_cycle,
                avg_identity
            );

            if (epoch + 1) % self.config.checkpoint_every == 0 {
                match save_checkpoint(model, &self.metrics, (epoch + 1) as usize, &self.config.checkpoint_dir) {
                    Ok(path) => info!("Saved checkpoint to {}", path),
                    Err(e) => warn!("Failed to save checkpoint: {}", e),
                }
            }
        }

        // Save final model
        let final_dir = format!("{}/final", self.config.checkpoint_dir);
        if let Err(e) = model.save(&final_dir) {
            warn!("Failed to save final model: {}", e);
        }

        let metrics_path = format!("{}/training_metrics.csv", self.config.checkpoint_dir);
        if let Err(e) = self.metrics.save_csv(&metrics_path) {
            warn!("Failed to save metrics: {}", e);
        }

        Ok(&self.metrics)
    }

    /// Get training metrics
    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    /// Get configuration
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_config_default() {
        let config = TrainingConfig::default();
        assert_eq!(config.epochs, 200);
        assert_eq!(config.decay_epoch, 100);
        assert_eq!(config.lambda_cycle, 10.0);
        assert_eq!(config.buffer_size, 50);
    }

    #[test]
    fn test_resume_keeps_schedule_on_absolute_epochs() {
        // Resuming at epoch 150 of a 200-epoch run with decay from 100
        // must land halfway down the ramp, not below zero.
        let config = TrainingConfig {
            epochs: 200,
            start_epoch: 150,
            decay_epoch: 100,
            ..Default::default()
        };
        let trainer = Trainer::new(config, Device::Cpu);
        let schedule = trainer.lr_schedule().unwrap();

        assert!((schedule.factor(150) - 0.5).abs() < 1e-9);
        assert!((schedule.factor(100) - 1.0).abs() < 1e-9);
        for epoch in 150..200 {
            assert!(schedule.factor(epoch) >= 0.0);
        }
    }

    #[test]
    fn test_with_metrics_keeps_restored_history() {
        let mut restored = TrainingMetrics::new();
        restored.record_epoch(3.0, 0.9, 1.2, 0.6);
        restored.record_epoch(2.5, 0.8, 1.0, 0.5);

        let trainer = Trainer::with_metrics(TrainingConfig::default(), Device::Cpu, restored);
        assert_eq!(trainer.metrics().num_epochs(), 2);
        assert_eq!(trainer.metrics().latest_gen_loss(), Some(2.5));
    }

    #[test]
    fn test_trainer_rejects_bad_schedule() {
        let config = TrainingConfig {
            epochs: 10,
            decay_epoch: 10,
            ..Default::default()
        };
        let mut trainer = Trainer::new(config, Device::Cpu);

        let mut model = CycleGan::new(
            crate::model::CycleGanConfig {
                channels: 3,
                num_residual_blocks: 1,
                image_size: 32,
            },
            Device::Cpu,
        );
        let mut loader = PairLoader::empty(32, 1);

        assert!(trainer.train(&mut model, &mut loader).is_err());
    }
}
