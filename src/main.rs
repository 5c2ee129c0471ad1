//! CycleGAN for Unpaired Image Translation
//!
//! Main entry point providing CLI interface for:
//! - Initializing a configuration file
//! - Training the CycleGAN model
//! - Translating single images with a trained generator

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use rust_cyclegan::{
    data::{ImageFolderDataset, PairLoader},
    model::{CycleGan, CycleGanConfig, Direction},
    training::{Trainer, TrainingConfig, TrainingMetrics},
    utils::{ensure_config_exists, find_latest_checkpoint, list_checkpoints, load_checkpoint, Config},
};

/// CycleGAN unpaired image-to-image translation
#[derive(Parser)]
#[command(name = "cyclegan")]
#[command(version = "0.1.0")]
#[command(about = "Train CycleGAN generators and translate images between two domains")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize default configuration file
    Init {
        /// Output configuration file path
        #[arg(short, long, default_value = "config.json")]
        output: String,
    },

    /// Train the CycleGAN model
    Train {
        /// Dataset root containing trainA/ and trainB/ subdirectories
        #[arg(short, long)]
        data: Option<String>,

        /// Number of epochs (overrides the configuration)
        #[arg(short, long)]
        epochs: Option<i64>,

        /// Resume from a checkpoint directory
        #[arg(long)]
        resume: Option<String>,
    },

    /// Translate a single image with a trained generator
    Translate {
        /// Checkpoint directory holding trained weights
        #[arg(short, long)]
        model: String,

        /// Input image path
        #[arg(short, long)]
        input: String,

        /// Output image path
        #[arg(short, long, default_value = "translated.png")]
        output: String,

        /// Translation direction: "a2b" or "b2a"
        #[arg(short, long, default_value = "a2b")]
        direction: String,
    },

    /// List checkpoints in a directory
    Checkpoints {
        /// Checkpoint directory
        #[arg(short, long, default_value = "checkpoints")]
        dir: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbosity.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { output } => init_config(&output),
        Commands::Train {
            data,
            epochs,
            resume,
        } => train_model(&cli.config, data, epochs, resume),
        Commands::Translate {
            model,
            input,
            output,
            direction,
        } => translate_image(&cli.config, &model, &input, &output, &direction),
        Commands::Checkpoints { dir } => show_checkpoints(&dir),
    }
}

/// Initialize default configuration file
fn init_config(output_path: &str) -> Result<()> {
    let config = Config::default();

    if output_path.ends_with(".toml") {
        config.save_toml(output_path)?;
    } else {
        config.save_json(output_path)?;
    }

    info!("Created default configuration at {}", output_path);
    Ok(())
}

/// Train the CycleGAN model
fn train_model(
    config_path: &str,
    data_root: Option<String>,
    epochs: Option<i64>,
    resume: Option<String>,
) -> Result<()> {
    let mut config = ensure_config_exists(config_path)?;
    if let Some(root) = data_root {
        config.data.root = root;
    }
    if let Some(epochs) = epochs {
        config.training.epochs = epochs;
    }
    config.validate()?;

    let device = config.get_device();
    info!("Using device: {:?}", device);

    info!("Indexing dataset at {}", config.data.root);
    let dataset = match config.training.seed {
        Some(seed) => ImageFolderDataset::with_seed(&config.data.root, "train", seed)?,
        None => ImageFolderDataset::new(&config.data.root, "train")?,
    };
    info!("Found {} unpaired image pairs", dataset.len());

    let mut loader = match config.training.seed {
        Some(seed) => PairLoader::with_seed(
            dataset,
            config.data.image_size,
            config.data.batch_size,
            config.data.unaligned,
            seed,
        ),
        None => PairLoader::new(
            dataset,
            config.data.image_size,
            config.data.batch_size,
            config.data.unaligned,
        ),
    };

    let model_config = CycleGanConfig {
        channels: config.model.channels,
        num_residual_blocks: config.model.num_residual_blocks,
        image_size: config.data.image_size,
    };
    let mut model = CycleGan::new(model_config, device);

    if let Some(seed) = config.training.seed {
        tch::manual_seed(seed as i64);
    }

    let (start_epoch, restored_metrics) = if let Some(checkpoint_dir) = resume {
        let (epoch, metrics) = load_checkpoint(&mut model, &checkpoint_dir)?;
        info!(
            "Resumed from epoch {} ({} recorded epochs of metrics)",
            epoch,
            metrics.num_epochs()
        );
        (epoch as i64, metrics)
    } else {
        (0, TrainingMetrics::new())
    };

    let training_config = TrainingConfig {
        epochs: config.training.epochs,
        start_epoch,
        decay_epoch: config.training.decay_epoch,
        lr: config.training.lr,
        lambda_cycle: config.training.lambda_cycle,
        lambda_identity: config.training.lambda_identity,
        buffer_size: config.training.buffer_size,
        checkpoint_every: config.training.checkpoint_every,
        checkpoint_dir: config.training.checkpoint_dir.clone(),
        seed: config.training.seed,
        ..Default::default()
    };

    let mut trainer = Trainer::with_metrics(training_config, device, restored_metrics);
    let metrics = trainer.train(&mut model, &mut loader)?;

    info!(
        "Training complete. Final G_loss: {:.4}, D_loss: {:.4}",
        metrics.latest_gen_loss().unwrap_or(0.0),
        metrics.latest_disc_loss().unwrap_or(0.0)
    );

    Ok(())
}

/// Translate a single image with a trained generator
fn translate_image(
    config_path: &str,
    model_dir: &str,
    input_path: &str,
    output_path: &str,
    direction: &str,
) -> Result<()> {
    let config = if std::path::Path::new(config_path).exists() {
        Config::load(config_path)?
    } else {
        Config::default()
    };

    let direction = match direction.to_lowercase().as_str() {
        "a2b" | "ab" => Direction::AtoB,
        "b2a" | "ba" => Direction::BtoA,
        other => bail!("unknown direction '{}', expected 'a2b' or 'b2a'", other),
    };

    let device = config.get_device();
    let model_config = CycleGanConfig {
        channels: config.model.channels,
        num_residual_blocks: config.model.num_residual_blocks,
        image_size: config.data.image_size,
    };
    let mut model = CycleGan::new(model_config, device);
    model.load(model_dir)?;
    info!("Loaded model from {}", model_dir);

    let input = rust_cyclegan::data::load_image(input_path, config.data.image_size)?
        .unsqueeze(0)
        .to_device(device);
    let output = model.translate(&input, direction);

    let img = rust_cyclegan::data::tensor_to_image(&output.to_device(tch::Device::Cpu))?;
    img.save(output_path)?;
    info!("Saved translated image to {}", output_path);

    Ok(())
}

/// List checkpoints in a directory
fn show_checkpoints(dir: &str) -> Result<()> {
    let mut checkpoints = list_checkpoints(dir);
    if checkpoints.is_empty() {
        info!("No checkpoints found in {}", dir);
        return Ok(());
    }

    checkpoints.sort_by(|a, b| a.1.epoch.cmp(&b.1.epoch));
    for (path, meta) in &checkpoints {
        info!(
            "{}: epoch {}, G_loss={:.4}, D_loss={:.4}, saved {}",
            path, meta.epoch, meta.gen_loss, meta.disc_loss, meta.timestamp
        );
    }

    if let Some(latest) = find_latest_checkpoint(dir) {
        info!("Latest: {}", latest);
    }

    Ok(())
}
