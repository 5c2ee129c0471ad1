//! Unpaired two-domain image folder dataset
//!
//! Expects the standard CycleGAN layout: `<root>/<mode>A` and
//! `<root>/<mode>B`, each holding arbitrary image files with no filename
//! pairing between the domains. Listings are shuffled at load time and
//! truncated to the shorter domain so index-based pairing is well defined.

use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp", "tif", "tiff"];

/// Index over the image files of two domains
#[derive(Debug, Clone)]
pub struct ImageFolderDataset {
    /// Domain-A image paths
    pub files_a: Vec<PathBuf>,
    /// Domain-B image paths
    pub files_b: Vec<PathBuf>,
}

impl ImageFolderDataset {
    /// Index `<root>/<mode>A` and `<root>/<mode>B`
    ///
    /// `mode` is typically "train" or "test". Fails if either directory is
    /// missing or contains no image files.
    pub fn new<P: AsRef<Path>>(root: P, mode: &str) -> Result<Self> {
        Self::with_rng(root, mode, &mut StdRng::from_entropy())
    }

    /// Same as `new` but with a fixed shuffle seed
    pub fn with_seed<P: AsRef<Path>>(root: P, mode: &str, seed: u64) -> Result<Self> {
        Self::with_rng(root, mode, &mut StdRng::seed_from_u64(seed))
    }

    fn with_rng<P: AsRef<Path>>(root: P, mode: &str, rng: &mut StdRng) -> Result<Self> {
        let root = root.as_ref();
        let mut files_a = list_images(&root.join(format!("{}A", mode)))?;
        let mut files_b = list_images(&root.join(format!("{}B", mode)))?;

        files_a.shuffle(rng);
        files_b.shuffle(rng);

        // Truncate to the shorter domain so every index has a pair
        let len = files_a.len().min(files_b.len());
        files_a.truncate(len);
        files_b.truncate(len);

        Ok(Self { files_a, files_b })
    }

    /// Number of index-aligned pairs
    pub fn len(&self) -> usize {
        self.files_a.len()
    }

    /// Whether the dataset holds no pairs
    pub fn is_empty(&self) -> bool {
        self.files_a.is_empty()
    }
}

/// List image files in a directory, sorted by name for a stable base order
fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read image directory {}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    files.sort();

    ensure!(!files.is_empty(), "no image files found in {}", dir.display());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_images(dir: &Path, count: usize) {
        std::fs::create_dir_all(dir).unwrap();
        for i in 0..count {
            let img = RgbImage::from_pixel(4, 4, Rgb([i as u8, 0, 0]));
            img.save(dir.join(format!("img_{}.png", i))).unwrap();
        }
    }

    #[test]
    fn test_dataset_truncates_to_shorter_domain() {
        let root = tempfile::tempdir().unwrap();
        write_images(&root.path().join("trainA"), 5);
        write_images(&root.path().join("trainB"), 3);

        let dataset = ImageFolderDataset::with_seed(root.path(), "train", 0).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.files_a.len(), dataset.files_b.len());
    }

    #[test]
    fn test_dataset_missing_dir_fails() {
        let root = tempfile::tempdir().unwrap();
        write_images(&root.path().join("trainA"), 2);

        assert!(ImageFolderDataset::new(root.path(), "train").is_err());
    }

    #[test]
    fn test_dataset_ignores_non_images() {
        let root = tempfile::tempdir().unwrap();
        write_images(&root.path().join("testA"), 2);
        write_images(&root.path().join("testB"), 2);
        std::fs::write(root.path().join("testA/notes.txt"), "not an image").unwrap();

        let dataset = ImageFolderDataset::with_seed(root.path(), "test", 0).unwrap();
        assert_eq!(dataset.len(), 2);
    }
}
