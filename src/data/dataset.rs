use burn::data::dataset::Dataset;

use crate::domain::sample::SegSample;

/// In-memory dataset over the loaded image/mask pairs.
/// Implements Burn's Dataset trait so the DataLoader can
/// call .get(index) and .len() on it.
pub struct SegDataset {
    samples: Vec<SegSample>,
}

impl SegDataset {
    pub fn new(samples: Vec<SegSample>) -> Self {
        Self { samples }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Dataset<SegSample> for SegDataset {
    fn get(&self, index: usize) -> Option<SegSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
