/// One training pair: a grayscale image and its binary segmentation
/// mask, both stored row-major with the same spatial dimensions.
/// Pixel values are normalised to [0, 1]; mask values are exactly
/// 0.0 or 1.0.
#[derive(Debug, Clone)]
pub struct SegSample {
    pub image: Vec<f32>,
    pub mask: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl SegSample {
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Fraction of mask pixels that are foreground.
    /// Useful for spotting empty or degenerate labels.
    pub fn foreground_fraction(&self) -> f32 {
        if self.mask.is_empty() {
            return 0.0;
        }
        self.mask.iter().sum::<f32>() / self.mask.len() as f32
    }
}
