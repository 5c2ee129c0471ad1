//! Training metrics for monitoring GAN progress
//!
//! Tracks the per-epoch loss components of the CycleGAN objective and
//! persists them as CSV for resumed runs and offline inspection.

use anyhow::Context;

/// Metrics collected during training
#[derive(Debug, Clone, Default)]
pub struct TrainingMetrics {
    /// Total generator losses per epoch
    pub gen_losses: Vec<f64>,
    /// Combined discriminator losses per epoch
    pub disc_losses: Vec<f64>,
    /// Cycle-consistency losses per epoch
    pub cycle_losses: Vec<f64>,
    /// Identity losses per epoch
    pub identity_losses: Vec<f64>,
}

impl TrainingMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record epoch metrics
    pub fn record_epoch(&mut self, gen: f64, disc: f64, cycle: f64, identity: f64) {
        self.gen_losses.push(gen);
        self.disc_losses.push(disc);
        self.cycle_losses.push(cycle);
        self.identity_losses.push(identity);
    }

    /// Get number of recorded epochs
    pub fn num_epochs(&self) -> usize {
        self.gen_losses.len()
    }

    /// Get latest generator loss
    pub fn latest_gen_loss(&self) -> Option<f64> {
        self.gen_losses.last().copied()
    }

    /// Get latest discriminator loss
    pub fn latest_disc_loss(&self) -> Option<f64> {
        self.disc_losses.last().copied()
    }

    /// Moving average of the generator loss over the last `window` epochs
    pub fn gen_loss_ma(&self, window: usize) -> f64 {
        moving_average(&self.gen_losses, window)
    }

    /// Moving average of the discriminator loss over the last `window` epochs
    pub fn disc_loss_ma(&self, window: usize) -> f64 {
        moving_average(&self.disc_losses, window)
    }

    /// Save metrics to CSV file
    pub fn save_csv(&self, path: &str) -> anyhow::Result<()> {
        let mut writer = csv::Writer::from_path(path)?;

        writer.write_record(["epoch", "gen_loss", "disc_loss", "cycle_loss", "identity_loss"])?;

        for i in 0..self.num_epochs() {
            writer.write_record([
                (i + 1).to_string(),
                self.gen_losses[i].to_string(),
                self.disc_losses[i].to_string(),
                self.cycle_losses[i].to_string(),
                self.identity_losses[i].to_string(),
            ])?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Load metrics from CSV file
    pub fn load_csv(path: &str) -> anyhow::Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut metrics = Self::new();

        for (row, result) in reader.records().enumerate() {
            let record = result?;
            let field = |i: usize| -> anyhow::Result<f64> {
                record
                    .get(i)
                    .with_context(|| format!("metrics row {} is missing column {}", row + 1, i))?
                    .parse()
                    .with_context(|| format!("metrics row {} column {} is not a number", row + 1, i))
            };
            metrics.gen_losses.push(field(1)?);
            metrics.disc_losses.push(field(2)?);
            metrics.cycle_losses.push(field(3)?);
            metrics.identity_losses.push(field(4)?);
        }

        Ok(metrics)
    }
}

/// Calculate moving average of last `window` values
fn moving_average(values: &[f64], window: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let n = window.min(values.len());
    let sum: f64 = values.iter().rev().take(n).sum();
    sum / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_metrics() {
        let mut metrics = TrainingMetrics::new();

        metrics.record_epoch(3.2, 0.8, 1.1, 0.5);
        metrics.record_epoch(2.9, 0.7, 1.0, 0.45);

        assert_eq!(metrics.num_epochs(), 2);
        assert_eq!(metrics.latest_gen_loss(), Some(2.9));
        assert_eq!(metrics.latest_disc_loss(), Some(0.7));
    }

    #[test]
    fn test_moving_average() {
        let mut metrics = TrainingMetrics::new();
        metrics.record_epoch(1.0, 0.0, 0.0, 0.0);
        metrics.record_epoch(2.0, 0.0, 0.0, 0.0);
        metrics.record_epoch(3.0, 0.0, 0.0, 0.0);

        assert!((metrics.gen_loss_ma(2) - 2.5).abs() < 1e-12);
        assert!((metrics.gen_loss_ma(10) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_csv_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.csv");
        let path = path.to_str().unwrap();

        let mut metrics = TrainingMetrics::new();
        metrics.record_epoch(3.2, 0.8, 1.1, 0.5);
        metrics.save_csv(path).unwrap();

        let loaded = TrainingMetrics::load_csv(path).unwrap();
        assert_eq!(loaded.num_epochs(), 1);
        assert_eq!(loaded.latest_gen_loss(), Some(3.2));
        assert_eq!(loaded.identity_losses[0], 0.5);
    }

    #[test]
    fn test_csv_truncated_row_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.csv");
        std::fs::write(
            &path,
            "epoch,gen_loss,disc_loss,cycle_loss,identity_loss\n1,3.2,0.8\n",
        )
        .unwrap();

        let err = TrainingMetrics::load_csv(path.to_str().unwrap());
        assert!(err.is_err());
    }

    #[test]
    fn test_csv_non_numeric_field_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metrics.csv");
        std::fs::write(
            &path,
            "epoch,gen_loss,disc_loss,cycle_loss,identity_loss\n1,oops,0.8,1.1,0.5\n",
        )
        .unwrap();

        let err = TrainingMetrics::load_csv(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }
}
