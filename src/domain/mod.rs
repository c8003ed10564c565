// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and traits describing the core concepts.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain structs, enums, and traits
//
// Keeping this layer pure makes it trivially unit-testable and
// lets the data layer swap sources (different image formats,
// synthetic data in tests) behind a single trait.
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// One (image, mask) training pair
pub mod sample;

// The data-source seam between data and application layers
pub mod traits;
