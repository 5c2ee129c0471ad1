//! Image file <-> tensor conversion
//!
//! Images are decoded, converted to RGB, resized to a square resolution and
//! normalized per channel to [-1, 1] to match the generator's tanh output
//! range. The inverse mapping rescales to displayable 8-bit pixels.

use std::path::Path;

use anyhow::{Context, Result};
use image::{imageops::FilterType, RgbImage};
use tch::{Kind, Tensor};

/// Load an image file as a (3, size, size) float tensor in [-1, 1]
///
/// Non-RGB images (grayscale, palette, RGBA) are converted to RGB before
/// normalization.
pub fn load_image<P: AsRef<Path>>(path: P, size: i64) -> Result<Tensor> {
    let path = path.as_ref();
    let img = image::open(path)
        .with_context(|| format!("failed to open image {}", path.display()))?;
    let img = img
        .resize_exact(size as u32, size as u32, FilterType::Triangle)
        .to_rgb8();

    Ok(rgb_to_tensor(&img))
}

/// Convert an RGB image to a (3, H, W) float tensor in [-1, 1]
pub fn rgb_to_tensor(img: &RgbImage) -> Tensor {
    let (width, height) = img.dimensions();
    let (w, h) = (width as usize, height as usize);

    // CHW layout, normalized from [0, 255] to [-1, 1]
    let mut data = vec![0f32; 3 * h * w];
    for (x, y, pixel) in img.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for c in 0..3 {
            data[c * h * w + y * w + x] = pixel[c] as f32 / 127.5 - 1.0;
        }
    }

    Tensor::from_slice(&data).view([3, h as i64, w as i64])
}

/// Convert a (3, H, W) or (1, 3, H, W) tensor in [-1, 1] back to 8-bit RGB
pub fn tensor_to_image(tensor: &Tensor) -> Result<RgbImage> {
    let t = if tensor.dim() == 4 {
        tensor.squeeze_dim(0)
    } else {
        tensor.shallow_clone()
    };
    anyhow::ensure!(
        t.dim() == 3 && t.size()[0] == 3,
        "expected a (3, H, W) tensor, got {:?}",
        t.size()
    );

    let size = t.size();
    let (h, w) = (size[1], size[2]);

    // [-1, 1] -> [0, 255]
    let scaled = ((t + 1.0) * 127.5).clamp(0.0, 255.0).to_kind(Kind::Uint8);
    let hwc = scaled.permute([1, 2, 0]).contiguous();

    let mut data = vec![0u8; (3 * h * w) as usize];
    hwc.view([-1]).copy_data(&mut data, (3 * h * w) as usize);

    RgbImage::from_raw(w as u32, h as u32, data)
        .context("tensor has fewer pixels than its shape claims")
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_rgb_to_tensor_range_and_shape() {
        let mut img = RgbImage::new(8, 6);
        img.put_pixel(0, 0, Rgb([255, 0, 128]));

        let t = rgb_to_tensor(&img);
        assert_eq!(t.size(), vec![3, 6, 8]);

        // Red channel of (0,0) maps to 1.0, green to -1.0
        let r: f64 = t.double_value(&[0, 0, 0]);
        let g: f64 = t.double_value(&[1, 0, 0]);
        assert!((r - 1.0).abs() < 1e-6);
        assert!((g + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_tensor_image_roundtrip() {
        let mut img = RgbImage::new(4, 4);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 60) as u8, (y * 60) as u8, 200]);
        }

        let t = rgb_to_tensor(&img);
        let restored = tensor_to_image(&t).unwrap();

        for (x, y, pixel) in img.enumerate_pixels() {
            let restored_pixel = restored.get_pixel(x, y);
            for c in 0..3 {
                let diff = (pixel[c] as i32 - restored_pixel[c] as i32).abs();
                assert!(diff <= 1, "channel {} off by {}", c, diff);
            }
        }
    }

    #[test]
    fn test_load_image_resizes_and_converts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");

        // Grayscale on disk, expected to come back as 3-channel
        let gray = image::GrayImage::from_pixel(10, 20, image::Luma([128]));
        gray.save(&path).unwrap();

        let t = load_image(&path, 16).unwrap();
        assert_eq!(t.size(), vec![3, 16, 16]);

        let max_val: f64 = t.max().double_value(&[]);
        let min_val: f64 = t.min().double_value(&[]);
        assert!(min_val >= -1.0 && max_val <= 1.0);
    }

    #[test]
    fn test_tensor_to_image_rejects_bad_shape() {
        let t = Tensor::zeros([1, 8, 8], (Kind::Float, tch::Device::Cpu));
        assert!(tensor_to_image(&t).is_err());
    }
}
