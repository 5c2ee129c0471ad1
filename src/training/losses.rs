//! Loss functions for CycleGAN training
//!
//! Least-squares adversarial loss plus L1 cycle-consistency and identity
//! terms. All functions return scalar tensors on the input's device.

use tch::{Reduction, Tensor};

/// Least-squares adversarial loss
///
/// MSE between the discriminator's patch logits and an all-ones (real) or
/// all-zeros (fake) target map.
///
/// # Arguments
///
/// * `pred` - Discriminator output patch logits
/// * `target_is_real` - Whether the prediction should be scored as real
pub fn adversarial_loss(pred: &Tensor, target_is_real: bool) -> Tensor {
    let target = if target_is_real {
        Tensor::ones_like(pred)
    } else {
        Tensor::zeros_like(pred)
    };
    pred.mse_loss(&target, Reduction::Mean)
}

/// Cycle-consistency loss: mean L1 between the reconstructed image
/// (A -> B -> A or B -> A -> B) and the original.
pub fn cycle_loss(recovered: &Tensor, real: &Tensor) -> Tensor {
    recovered.l1_loss(real, Reduction::Mean)
}

/// Identity loss: mean L1 between a generator's output on an image already
/// in its target domain and that image. Discourages unnecessary color
/// shifts.
pub fn identity_loss(same: &Tensor, real: &Tensor) -> Tensor {
    same.l1_loss(real, Reduction::Mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{Device, Kind};

    #[test]
    fn test_adversarial_loss_positive() {
        let pred = Tensor::randn([4, 1, 16, 16], (Kind::Float, Device::Cpu));
        let loss = adversarial_loss(&pred, true);

        assert_eq!(loss.size(), Vec::<i64>::new());
        assert!(loss.double_value(&[]) > 0.0);
    }

    #[test]
    fn test_adversarial_loss_perfect_prediction() {
        let pred = Tensor::ones([4, 1, 16, 16], (Kind::Float, Device::Cpu));
        let loss = adversarial_loss(&pred, true);

        assert!(loss.double_value(&[]) < 1e-6);
    }

    #[test]
    fn test_cycle_loss_zero_for_identical() {
        let x = Tensor::randn([2, 3, 8, 8], (Kind::Float, Device::Cpu));
        let loss = cycle_loss(&x, &x);

        assert!(loss.double_value(&[]) < 1e-6);
    }

    #[test]
    fn test_identity_loss_scales_with_distance() {
        let real = Tensor::zeros([1, 3, 8, 8], (Kind::Float, Device::Cpu));
        let near = Tensor::full([1, 3, 8, 8], 0.1, (Kind::Float, Device::Cpu));
        let far = Tensor::full([1, 3, 8, 8], 0.5, (Kind::Float, Device::Cpu));

        let near_loss = identity_loss(&near, &real).double_value(&[]);
        let far_loss = identity_loss(&far, &real).double_value(&[]);
        assert!(far_loss > near_loss);
    }
}
