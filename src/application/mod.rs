// ============================================================
// Layer 2 — Application Layer
// ============================================================
// Use cases and run configuration. This layer owns the
// experiment spec (specs.json) and the orchestration of a
// training run, but contains no tensor math, no file formats
// beyond the spec itself, and no framework types.
//
//   experiment.rs     — ExperimentSpec, LossKind, SpecError
//   train_use_case.rs — wires workspace + data + trainer together
//
// Reference: Rust Book §7 (Modules)

/// Experiment spec loading and the typed fail-fast errors
pub mod experiment;

/// The end-to-end training pipeline
pub mod train_use_case;
