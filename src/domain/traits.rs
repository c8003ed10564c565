// ============================================================
// Layer 3 — Domain Traits
// ============================================================
// The seam between the application layer and concrete data
// sources. The application only ever sees `SampleSource`, so
// the paired-directory loader can be swapped for an in-memory
// source in tests without touching the pipeline.

use anyhow::Result;

use crate::domain::sample::SegSample;

/// Anything that can produce the full set of training pairs.
pub trait SampleSource {
    fn load_all(&self) -> Result<Vec<SegSample>>;
}
