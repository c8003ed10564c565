// ============================================================
// Layer 4 — Paired Image Loader
// ============================================================
// Loads (image, mask) pairs from two parallel directories:
//
//   {DataSource}/images/frame_0001.png
//   {DataSource}/labels/frame_0001.png   ← same filename
//
// Pairing is by exact filename. Any file present on one side
// but not the other is a hard error: a silently dropped pair
// would bias training, so we refuse to guess.
//
// Filenames are sorted before the debug truncation so that
// "first N samples" means the same N on every run.
//
// Reference: Rust Book §9 (Error Handling)
//            image crate documentation

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::domain::sample::SegSample;
use crate::domain::traits::SampleSource;

/// Mask pixels above this byte value count as foreground.
const MASK_THRESHOLD: u8 = 127;

/// Loads all image/mask pairs from a directory pair, optionally
/// capped to the first N samples for debug runs.
pub struct PairedImageLoader {
    images_dir: PathBuf,
    labels_dir: PathBuf,
    limit: Option<usize>,
}

impl PairedImageLoader {
    pub fn new(images_dir: impl Into<PathBuf>, labels_dir: impl Into<PathBuf>) -> Self {
        Self {
            images_dir: images_dir.into(),
            labels_dir: labels_dir.into(),
            limit: None,
        }
    }

    /// Cap the dataset at the first `n` pairs (debug mode).
    pub fn with_limit(mut self, n: Option<usize>) -> Self {
        self.limit = n;
        self
    }
}

impl SampleSource for PairedImageLoader {
    fn load_all(&self) -> Result<Vec<SegSample>> {
        let image_names = list_image_files(&self.images_dir)?;
        let label_names = list_image_files(&self.labels_dir)?;

        // The two filename sets must match exactly.
        if let Some(name) = image_names.difference(&label_names).next() {
            bail!(
                "image '{}' has no matching mask in '{}'",
                name,
                self.labels_dir.display()
            );
        }
        if let Some(name) = label_names.difference(&image_names).next() {
            bail!(
                "mask '{}' has no matching image in '{}'",
                name,
                self.images_dir.display()
            );
        }

        // BTreeSet iteration is already sorted; truncate before decoding
        // so debug runs never pay for the full dataset.
        let names: Vec<&String> = match self.limit {
            Some(n) => image_names.iter().take(n).collect(),
            None => image_names.iter().collect(),
        };

        let mut samples: Vec<SegSample> = Vec::with_capacity(names.len());
        for name in names {
            let sample = load_pair(
                &self.images_dir.join(name),
                &self.labels_dir.join(name),
            )
            .with_context(|| format!("while loading pair '{name}'"))?;

            // All samples must share dimensions so the batcher can stack them.
            if let Some(first) = samples.first() {
                if first.width != sample.width || first.height != sample.height {
                    bail!(
                        "'{}' is {}x{} but the dataset is {}x{}",
                        name,
                        sample.width,
                        sample.height,
                        first.width,
                        first.height
                    );
                }
            }
            samples.push(sample);
        }

        tracing::info!(
            "Loaded {} image/mask pairs from '{}'",
            samples.len(),
            self.images_dir.display()
        );
        Ok(samples)
    }
}

/// List the image filenames in a directory as a sorted set.
fn list_image_files(dir: &Path) -> Result<BTreeSet<String>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("cannot read directory '{}'", dir.display()))?;

    let mut names = BTreeSet::new();
    for entry in entries {
        let path = entry?.path();
        let is_image = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("png") | Some("jpg") | Some("jpeg")
        );
        if !is_image {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            names.insert(name.to_string());
        }
    }
    Ok(names)
}

/// Decode one image/mask pair to normalised f32 buffers.
fn load_pair(image_path: &Path, mask_path: &Path) -> Result<SegSample> {
    let image = image::open(image_path)
        .with_context(|| format!("cannot decode image '{}'", image_path.display()))?
        .to_luma8();
    let mask = image::open(mask_path)
        .with_context(|| format!("cannot decode mask '{}'", mask_path.display()))?
        .to_luma8();

    let (width, height) = image.dimensions();
    if mask.dimensions() != (width, height) {
        bail!(
            "mask '{}' is {}x{} but its image is {}x{}",
            mask_path.display(),
            mask.dimensions().0,
            mask.dimensions().1,
            width,
            height
        );
    }

    let image: Vec<f32> = image.as_raw().iter().map(|&p| p as f32 / 255.0).collect();
    let mask: Vec<f32> = mask
        .as_raw()
        .iter()
        .map(|&p| if p > MASK_THRESHOLD { 1.0 } else { 0.0 })
        .collect();

    Ok(SegSample {
        image,
        mask,
        width: width as usize,
        height: height as usize,
    })
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    fn write_gray(path: &Path, width: u32, height: u32, value: u8) {
        let img = GrayImage::from_pixel(width, height, image::Luma([value]));
        img.save(path).unwrap();
    }

    fn build_dataset(count: usize) -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        let images = tmp.path().join("images");
        let labels = tmp.path().join("labels");
        fs::create_dir_all(&images).unwrap();
        fs::create_dir_all(&labels).unwrap();
        for i in 0..count {
            let name = format!("frame_{i:04}.png");
            write_gray(&images.join(&name), 8, 8, 128);
            write_gray(&labels.join(&name), 8, 8, 255);
        }
        tmp
    }

    #[test]
    fn test_loads_matching_pairs() {
        let tmp = build_dataset(3);
        let loader = PairedImageLoader::new(tmp.path().join("images"), tmp.path().join("labels"));
        let samples = loader.load_all().unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].width, 8);
        assert_eq!(samples[0].height, 8);
        // 255 > threshold → every mask pixel is foreground
        assert_eq!(samples[0].foreground_fraction(), 1.0);
    }

    #[test]
    fn test_debug_limit_truncates() {
        let tmp = build_dataset(12);
        let loader = PairedImageLoader::new(tmp.path().join("images"), tmp.path().join("labels"))
            .with_limit(Some(8));
        let samples = loader.load_all().unwrap();
        assert_eq!(samples.len(), 8);
    }

    #[test]
    fn test_limit_larger_than_dataset() {
        let tmp = build_dataset(2);
        let loader = PairedImageLoader::new(tmp.path().join("images"), tmp.path().join("labels"))
            .with_limit(Some(8));
        assert_eq!(loader.load_all().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_mask_is_an_error() {
        let tmp = build_dataset(2);
        fs::remove_file(tmp.path().join("labels/frame_0001.png")).unwrap();
        let loader = PairedImageLoader::new(tmp.path().join("images"), tmp.path().join("labels"));
        let err = loader.load_all().unwrap_err().to_string();
        assert!(err.contains("frame_0001.png"), "unexpected error: {err}");
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let loader = PairedImageLoader::new(tmp.path().join("images"), tmp.path().join("labels"));
        assert!(loader.load_all().is_err());
    }

    #[test]
    fn test_mask_binarisation() {
        let tmp = tempfile::tempdir().unwrap();
        let images = tmp.path().join("images");
        let labels = tmp.path().join("labels");
        fs::create_dir_all(&images).unwrap();
        fs::create_dir_all(&labels).unwrap();
        write_gray(&images.join("a.png"), 4, 4, 10);
        // 100 is below the threshold → background everywhere
        write_gray(&labels.join("a.png"), 4, 4, 100);

        let loader = PairedImageLoader::new(images, labels);
        let samples = loader.load_all().unwrap();
        assert!(samples[0].mask.iter().all(|&v| v == 0.0));
    }
}
