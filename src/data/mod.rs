// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from image files on disk to GPU-ready tensors.
//
//   {DataSource}/images/*.png + {DataSource}/labels/*.png
//       │
//       ▼
//   PairedImageLoader  → pairs files by name, decodes, binarises masks
//       │
//       ▼
//   SegDataset         → implements Burn's Dataset trait
//       │
//       ▼
//   SegBatcher         → stacks samples into [N, 1, H, W] tensors
//       │
//       ▼
//   DataLoader         → shuffles and feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads paired image/mask files from two directories
pub mod loader;

/// Implements Burn's Dataset trait over loaded samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
