//! Replay buffer for discriminator inputs
//!
//! Keeps a bounded pool of previously generated samples and probabilistically
//! swaps them into incoming batches. Feeding the discriminator a mix of
//! current and historical generator outputs decorrelates consecutive
//! batches and damps training oscillation.

use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tch::Tensor;

/// Bounded pool of detached generated samples
pub struct ReplayBuffer {
    max_size: usize,
    data: Vec<Tensor>,
    rng: StdRng,
}

impl ReplayBuffer {
    /// Create a buffer with the given capacity
    ///
    /// Fails if `max_size` is zero; the capacity is never clamped.
    pub fn new(max_size: usize) -> Result<Self> {
        Self::with_rng(max_size, StdRng::from_entropy())
    }

    /// Create a buffer with a fixed RNG seed for reproducible runs
    pub fn with_seed(max_size: usize, seed: u64) -> Result<Self> {
        Self::with_rng(max_size, StdRng::seed_from_u64(seed))
    }

    fn with_rng(max_size: usize, rng: StdRng) -> Result<Self> {
        if max_size == 0 {
            bail!("replay buffer capacity must be > 0");
        }
        Ok(Self {
            max_size,
            data: Vec::with_capacity(max_size),
            rng,
        })
    }

    /// Push a batch of generated samples and return a same-sized batch
    ///
    /// Per sample: while the buffer has spare capacity the sample is stored
    /// and returned unchanged. Once full, with probability 0.5 a uniformly
    /// random slot is swapped out - an independent copy of its content is
    /// returned and the slot overwritten with the new sample; otherwise the
    /// new sample passes through and the buffer is untouched.
    pub fn push_and_pop(&mut self, batch: &Tensor) -> Tensor {
        let batch = batch.detach();
        let batch_size = batch.size()[0];
        let mut to_return = Vec::with_capacity(batch_size as usize);

        for i in 0..batch_size {
            let element = batch.get(i).unsqueeze(0);
            if self.data.len() < self.max_size {
                self.data.push(element.copy());
                to_return.push(element);
            } else if self.rng.gen::<f64>() > 0.5 {
                let slot = self.rng.gen_range(0..self.max_size);
                to_return.push(self.data[slot].copy());
                self.data[slot] = element;
            } else {
                to_return.push(element);
            }
        }

        Tensor::cat(&to_return, 0)
    }

    /// Number of samples currently stored
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no samples yet
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Configured capacity
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{Device, Kind};

    fn sample(value: f64) -> Tensor {
        Tensor::full([1, 3, 4, 4], value, (Kind::Float, Device::Cpu))
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(ReplayBuffer::new(0).is_err());
    }

    #[test]
    fn test_fills_to_capacity() {
        let mut buffer = ReplayBuffer::with_seed(3, 42).unwrap();

        for i in 0..3 {
            let out = buffer.push_and_pop(&sample(i as f64));
            assert_eq!(out.size(), vec![1, 3, 4, 4]);
        }
        assert_eq!(buffer.len(), 3);

        // Further pushes never grow the buffer
        for i in 3..10 {
            let out = buffer.push_and_pop(&sample(i as f64));
            assert_eq!(out.size()[0], 1);
            assert_eq!(buffer.len(), 3);
        }
    }

    #[test]
    fn test_passthrough_before_full() {
        let mut buffer = ReplayBuffer::with_seed(5, 7).unwrap();
        let input = sample(1.5);

        let out = buffer.push_and_pop(&input);
        let diff: f64 = (&out - &input).abs().max().double_value(&[]);
        assert!(diff < 1e-6);
    }

    #[test]
    fn test_batch_size_preserved() {
        let mut buffer = ReplayBuffer::with_seed(2, 0).unwrap();
        let batch = Tensor::randn([4, 3, 4, 4], (Kind::Float, Device::Cpu));

        let out = buffer.push_and_pop(&batch);
        assert_eq!(out.size(), vec![4, 3, 4, 4]);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_full_buffer_returns_fresh_or_buffered() {
        // End-to-end scenario: capacity 2, three single-sample pushes
        let mut buffer = ReplayBuffer::with_seed(2, 123).unwrap();
        buffer.push_and_pop(&sample(0.0));
        buffer.push_and_pop(&sample(1.0));
        assert_eq!(buffer.len(), 2);

        let out = buffer.push_and_pop(&sample(2.0));
        assert_eq!(out.size(), vec![1, 3, 4, 4]);
        assert_eq!(buffer.len(), 2);

        // The returned sample is either the fresh one or a buffered one
        let value = out.mean(Kind::Float).double_value(&[]);
        assert!([0.0, 1.0, 2.0].iter().any(|v| (value - v).abs() < 1e-6));
    }

    #[test]
    fn test_eviction_returns_independent_copy() {
        let mut buffer = ReplayBuffer::with_seed(1, 9).unwrap();
        buffer.push_and_pop(&sample(0.0));

        // Clobbering every returned tensor must never leak back into the
        // buffered entry, whether the return was a passthrough or a swap.
        for i in 1..100 {
            let mut out = buffer.push_and_pop(&sample(i as f64));
            let _ = out.fill_(-999.0);
        }
        assert_eq!(buffer.len(), 1);
        let stored = buffer.data[0].mean(Kind::Float).double_value(&[]);
        assert!(
            (0..100).any(|v| (stored - v as f64).abs() < 1e-6),
            "buffered entry was overwritten through a returned tensor: {}",
            stored
        );
    }
}
