//! Loader batching unaligned image pairs for training
//!
//! Decodes images lazily per batch and yields `(A, B)` tensor pairs of
//! shape (batch, 3, size, size). In unaligned mode the B-side index is
//! drawn independently at random each time, so the two domains are never
//! spuriously correlated through file ordering. Incomplete trailing
//! batches are dropped, as usual for GAN training.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tch::Tensor;

use super::dataset::ImageFolderDataset;
use super::transforms::load_image;

/// Batching loader over a two-domain dataset
pub struct PairLoader {
    dataset: ImageFolderDataset,
    image_size: i64,
    batch_size: usize,
    unaligned: bool,
    indices: Vec<usize>,
    current: usize,
    rng: StdRng,
}

impl PairLoader {
    /// Create a new loader
    ///
    /// # Arguments
    ///
    /// * `dataset` - Indexed two-domain dataset
    /// * `image_size` - Square resolution images are resized to
    /// * `batch_size` - Pairs per batch
    /// * `unaligned` - Draw B-side indices independently at random
    pub fn new(
        dataset: ImageFolderDataset,
        image_size: i64,
        batch_size: usize,
        unaligned: bool,
    ) -> Self {
        Self::with_rng(dataset, image_size, batch_size, unaligned, StdRng::from_entropy())
    }

    /// Same as `new` but with a fixed shuffle/pairing seed
    pub fn with_seed(
        dataset: ImageFolderDataset,
        image_size: i64,
        batch_size: usize,
        unaligned: bool,
        seed: u64,
    ) -> Self {
        Self::with_rng(
            dataset,
            image_size,
            batch_size,
            unaligned,
            StdRng::seed_from_u64(seed),
        )
    }

    fn with_rng(
        dataset: ImageFolderDataset,
        image_size: i64,
        batch_size: usize,
        unaligned: bool,
        mut rng: StdRng,
    ) -> Self {
        let mut indices: Vec<usize> = (0..dataset.len()).collect();
        indices.shuffle(&mut rng);

        Self {
            dataset,
            image_size,
            batch_size,
            unaligned,
            indices,
            current: 0,
            rng,
        }
    }

    /// Loader over an empty dataset, useful as a placeholder in tests
    pub fn empty(image_size: i64, batch_size: usize) -> Self {
        Self::with_rng(
            ImageFolderDataset {
                files_a: Vec::new(),
                files_b: Vec::new(),
            },
            image_size,
            batch_size,
            false,
            StdRng::seed_from_u64(0),
        )
    }

    /// Number of full batches per epoch
    pub fn num_batches(&self) -> usize {
        self.dataset.len() / self.batch_size
    }

    /// Number of pairs in the dataset
    pub fn num_samples(&self) -> usize {
        self.dataset.len()
    }

    /// Reset for a new epoch, reshuffling the iteration order
    pub fn reset(&mut self) {
        self.current = 0;
        self.indices.shuffle(&mut self.rng);
    }

    /// Decode and return the next `(A, B)` batch
    ///
    /// Returns `Ok(None)` when the epoch is exhausted. Decoding failures
    /// (missing or malformed files) propagate as errors.
    pub fn next_batch(&mut self) -> Result<Option<(Tensor, Tensor)>> {
        let start = self.current;
        let end = start + self.batch_size;
        if end > self.indices.len() {
            return Ok(None);
        }

        let mut batch_a = Vec::with_capacity(self.batch_size);
        let mut batch_b = Vec::with_capacity(self.batch_size);

        for &idx in &self.indices[start..end] {
            let idx_b = if self.unaligned {
                self.rng.gen_range(0..self.dataset.len())
            } else {
                idx
            };

            batch_a.push(load_image(&self.dataset.files_a[idx], self.image_size)?);
            batch_b.push(load_image(&self.dataset.files_b[idx_b], self.image_size)?);
        }

        self.current = end;
        Ok(Some((
            Tensor::stack(&batch_a, 0),
            Tensor::stack(&batch_b, 0),
        )))
    }
}
