//! Analysis module wiring the statistics to the on-disk benchmark artifacts.
//!
//! - [`accuracy`]: per-population rate / irregularity / correlation pipeline
//! - [`pairwise`]: histogram artifacts comparing two runs, and their KL summary
//! - [`compare`]: spike-for-spike equivalence check between two runs
pub mod accuracy;
pub mod compare;
pub mod pairwise;
