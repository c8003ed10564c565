// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting disk concerns that don't belong to any single
// business layer:
//
//   workspace.rs — the on-disk layout of an experiment directory
//                  (checkpoints/, evaluation/) and persistence of
//                  model + optimizer state via Burn's
//                  CompactRecorder, as a consistent pair.
//
//   metrics.rs   — per-epoch scalar metrics appended to a CSV
//                  file, flushed after every epoch so partial
//                  runs keep partial telemetry.
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Records and Checkpointing)

/// Experiment directory layout and model/optimizer snapshots
pub mod workspace;

/// Training metrics CSV logger
pub mod metrics;
