//! Per-variant orchestration: combinations, haplotypes, alt rows, assembly.

use log::{debug, info};
use ndarray::ArrayView3;
use rayon::prelude::*;

use pileup_core::{AlleleCombination, ImageRow, Variant};
use pileup_reference::ReferenceReader;

use crate::alleles::alt_allele_combinations;
use crate::alt_align::AltAlignmentPolicy;
use crate::config::{ConfigError, PileupImageOptions, PixelLayout};
use crate::error::{PileupError, Result};
use crate::haplotype::{Haplotype, create_haplotype};
use crate::pileup::{self, ImageShape, PileupAssembler, PileupImage};

///
/// Source of encoded evidence rows for a variant.
///
/// Read alignment, realignment against alt haplotypes and per-read encoding
/// all happen behind this trait. Implementations are shared between worker
/// threads.
///
pub trait EvidenceProvider: Sync {
    /// Rows of reads aligned to the reference, conventionally the reference row first.
    fn pileup_rows(
        &self,
        variant: &Variant,
        combination: &AlleleCombination,
    ) -> anyhow::Result<Vec<ImageRow>>;

    /// The same rows after realignment to `haplotype`, in the same order.
    fn alt_aligned_rows(
        &self,
        variant: &Variant,
        combination: &AlleleCombination,
        haplotype: &Haplotype,
    ) -> anyhow::Result<Vec<ImageRow>>;
}

///
/// Buffers reused from one variant to the next by a single worker.
///
#[derive(Debug, Default)]
pub struct PileupScratch {
    buffer: Vec<u8>,
    alt_row_sets: Vec<Vec<ImageRow>>,
}

impl PileupScratch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes currently reserved for pixel data.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }
}

///
/// An image borrowed from a worker's scratch buffer. It is only valid inside
/// the sink call that receives it; use [`PileupImageRef::to_image`] to keep it.
///
#[derive(Debug, Clone, Copy)]
pub struct PileupImageRef<'a> {
    pub variant: &'a Variant,
    pub combination: &'a AlleleCombination,
    /// one per allele of the combination when alt-alignment ran, otherwise empty
    pub haplotypes: &'a [Haplotype],
    pub data: &'a [u8],
    pub shape: ImageShape,
    pub layout: PixelLayout,
}

impl PileupImageRef<'_> {
    pub fn as_array(&self) -> Result<ArrayView3<'_, u8>> {
        pileup::as_array(self.data, self.shape, self.layout)
    }

    pub fn to_image(&self) -> PileupImage {
        PileupImage {
            data: self.data.to_vec(),
            shape: self.shape,
            layout: self.layout,
        }
    }

    pub fn to_example(&self) -> Example {
        Example {
            combination: self.combination.clone(),
            haplotypes: self.haplotypes.to_vec(),
            image: self.to_image(),
        }
    }
}

/// One owned image together with what it was built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub combination: AlleleCombination,
    pub haplotypes: Vec<Haplotype>,
    pub image: PileupImage,
}

///
/// Builds pileup images for candidate variants.
///
/// Options are validated once on construction, so a misconfigured run fails
/// before any variant is touched. The reference is only ever read and may be
/// shared by all workers of [`ExamplesGenerator::make_examples`].
///
#[derive(Debug)]
pub struct ExamplesGenerator<R: ReferenceReader> {
    options: PileupImageOptions,
    reference: R,
    policy: AltAlignmentPolicy,
    assembler: PileupAssembler,
}

impl<R: ReferenceReader> ExamplesGenerator<R> {
    pub fn new(options: PileupImageOptions, reference: R) -> std::result::Result<Self, ConfigError> {
        options.validate()?;
        let policy = AltAlignmentPolicy::from_options(&options);
        let assembler = PileupAssembler::from_options(&options);
        Ok(ExamplesGenerator {
            options,
            reference,
            policy,
            assembler,
        })
    }

    pub fn options(&self) -> &PileupImageOptions {
        &self.options
    }

    pub fn reference(&self) -> &R {
        &self.reference
    }

    pub fn alt_allele_combinations(&self, variant: &Variant) -> Result<Vec<AlleleCombination>> {
        Ok(alt_allele_combinations(variant, self.options.multi_allelic_mode)?)
    }

    pub fn need_alt_alignment(&self, variant: &Variant) -> bool {
        self.policy.need_alt_alignment(variant)
    }

    pub fn create_haplotype(&self, variant: &Variant, alt: &str) -> Result<Haplotype> {
        create_haplotype(&self.reference, variant, alt, self.options.width)
    }

    ///
    /// Build every image of `variant` and hand each one to `sink`.
    ///
    /// Images are assembled into `scratch`, so each [`PileupImageRef`] is
    /// overwritten by the next. Returns the number of images produced.
    ///
    pub fn make_images<P, F>(
        &self,
        variant: &Variant,
        provider: &P,
        scratch: &mut PileupScratch,
        mut sink: F,
    ) -> Result<usize>
    where
        P: EvidenceProvider + ?Sized,
        F: FnMut(PileupImageRef<'_>) -> anyhow::Result<()>,
    {
        let combinations = self.alt_allele_combinations(variant)?;
        let need_alt_alignment = self.need_alt_alignment(variant);

        for combination in &combinations {
            let base_rows = provider.pileup_rows(variant, combination)?;
            self.check_row_shape(&base_rows)?;

            scratch.alt_row_sets.clear();
            let mut haplotypes = Vec::new();
            if need_alt_alignment {
                for allele in combination.alleles() {
                    let haplotype = self.create_haplotype(variant, allele)?;
                    if haplotype.exceeds_width(self.options.width) {
                        debug!(
                            "{}: haplotype for {} is {} bases, wider than the pileup",
                            variant,
                            allele,
                            haplotype.len()
                        );
                    }
                    let rows = provider.alt_aligned_rows(variant, combination, &haplotype)?;
                    scratch.alt_row_sets.push(rows);
                    haplotypes.push(haplotype);
                }
            }

            let shape = self
                .assembler
                .fill(&base_rows, &scratch.alt_row_sets, &mut scratch.buffer)?;
            debug!("{}: image {} for {}", variant, shape, combination);

            sink(PileupImageRef {
                variant,
                combination,
                haplotypes: &haplotypes,
                data: &scratch.buffer,
                shape,
                layout: self.assembler.layout(),
            })?;
        }

        Ok(combinations.len())
    }

    // rows must match the configured pileup, not just each other
    fn check_row_shape(&self, rows: &[ImageRow]) -> Result<()> {
        let Some(first) = rows.first() else {
            return Ok(());
        };
        if first.width() != self.options.width || first.num_channels() != self.options.num_channels {
            return Err(PileupError::DimensionMismatch {
                rows: "base".to_string(),
                row: 0,
                width: self.options.width,
                channels: self.options.num_channels,
                found_width: first.width(),
                found_channels: first.num_channels(),
            });
        }
        Ok(())
    }

    /// Every image of `variant`, copied out of the scratch buffer.
    pub fn make_images_owned<P>(&self, variant: &Variant, provider: &P) -> Result<Vec<Example>>
    where
        P: EvidenceProvider + ?Sized,
    {
        let mut scratch = PileupScratch::new();
        let mut examples = Vec::new();
        self.make_images(variant, provider, &mut scratch, |image| {
            examples.push(image.to_example());
            Ok(())
        })?;
        Ok(examples)
    }

    ///
    /// Process `variants` in parallel on the rayon pool, one scratch buffer
    /// per worker. Images reach `sink` in no particular order. The first
    /// error stops the run and is returned.
    ///
    pub fn make_examples<P, F>(&self, variants: &[Variant], provider: &P, sink: F) -> Result<usize>
    where
        P: EvidenceProvider + ?Sized,
        F: Fn(PileupImageRef<'_>) -> anyhow::Result<()> + Sync,
    {
        let num_images = variants
            .par_iter()
            .map_init(PileupScratch::new, |scratch, variant| {
                self.make_images(variant, provider, scratch, &sink)
            })
            .try_reduce(|| 0, |a, b| Ok(a + b))?;

        info!(
            "Made {} pileup images for {} variants",
            num_images,
            variants.len()
        );
        Ok(num_images)
    }
}
