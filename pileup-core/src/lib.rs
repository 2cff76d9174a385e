//! Core data model shared by the pileup crates.
//!
//! - [`Variant`]: a candidate site with its reference and alternate alleles
//! - [`AlleleCombination`]: the one or two alleles a single image is built for
//! - [`Window`]: a half-open reference interval around a variant
//! - [`ImageRow`]: one read (or the reference) rendered across all channels

pub mod errors;
pub mod models;

pub use errors::{ModelError, Result};
pub use models::{AlleleCombination, ImageRow, Variant, Window};
