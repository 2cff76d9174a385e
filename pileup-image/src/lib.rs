//! # Pileup images for candidate variants
//!
//! Turns a candidate variant plus encoded read evidence into the multi-channel
//! pixel buffers consumed by the variant-calling model. For every variant:
//!
//! 1. [`alleles::alt_allele_combinations`] lists the allele subsets that each get an image.
//! 2. [`alt_align::AltAlignmentPolicy`] decides whether reads must also be realigned to alt haplotypes.
//! 3. [`haplotype::create_haplotype`] builds those haplotypes from the reference.
//! 4. [`pileup::PileupAssembler`] merges the base rows and any alt-aligned rows into one buffer.
//!
//! [`generator::ExamplesGenerator`] runs the whole sequence, over many variants
//! in parallel if asked to. Read alignment and encoding stay outside this crate,
//! behind [`generator::EvidenceProvider`].
//!
//! ```
//! use pileup_core::ImageRow;
//! use pileup_image::config::AltAlignedPileup;
//! use pileup_image::pileup::fill_pileup_array;
//!
//! let rows = vec![ImageRow::from_channels(vec![vec![1, 2], vec![3, 4]]).unwrap()];
//! let mut out = Vec::new();
//! let shape = fill_pileup_array(&rows, &[], AltAlignedPileup::None, &mut out).unwrap();
//!
//! assert_eq!(shape.channels, 2);
//! assert_eq!(out, vec![1, 2, 3, 4]);
//! ```

pub mod alleles;
pub mod alt_align;
pub mod config;
pub mod error;
pub mod generator;
pub mod haplotype;
pub mod pileup;

pub use alleles::alt_allele_combinations;
pub use alt_align::AltAlignmentPolicy;
pub use config::{
    AltAlignedPileup, ConfigError, MultiAllelicMode, PileupImageOptions, PixelLayout,
    TypesToAltAlign,
};
pub use error::{PileupError, Result};
pub use generator::{EvidenceProvider, Example, ExamplesGenerator, PileupImageRef, PileupScratch};
pub use haplotype::{Haplotype, create_haplotype};
pub use pileup::{ImageShape, PileupAssembler, PileupImage, fill_pileup_array};
