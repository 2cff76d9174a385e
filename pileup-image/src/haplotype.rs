//! Alt haplotypes: reference windows with one allele spliced in.

use log::debug;

use pileup_core::{ModelError, Variant, Window};
use pileup_reference::ReferenceReader;

use crate::error::{PileupError, Result};

/// Reference window around a variant with one allele substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Haplotype {
    /// the allele spliced into the window
    pub allele: String,
    pub sequence: String,
    /// reference bases consumed, after clipping to the contig
    pub window: Window,
}

impl Haplotype {
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// True when an insertion made the haplotype longer than `width` bases.
    pub fn exceeds_width(&self, width: usize) -> bool {
        self.sequence.len() > width
    }
}

///
/// Reference window of a variant for a pileup `width`.
///
/// The window spans `(width - 1) / 2` bases on each side of the reference
/// allele, so a reference allele longer than one base widens it instead of
/// pushing the variant off-center. The window is clipped to `[0, contig_length)`.
///
pub fn haplotype_window(variant: &Variant, width: usize, contig_length: u64) -> Result<Window> {
    let var_end = variant.end();
    if var_end > contig_length {
        return Err(PileupError::VariantPastContigEnd {
            variant: variant.to_string(),
            contig: variant.reference_name.clone(),
            end: var_end,
            length: contig_length,
        });
    }

    let half_width = (width.saturating_sub(1) / 2) as u64;
    let start = variant.start.saturating_sub(half_width);
    let end = (var_end + half_width).min(contig_length);
    Ok(Window::new(start, end))
}

///
/// Build the haplotype for `alt`: the reference bases of the variant's window
/// with the reference allele replaced by `alt`.
///
/// Bases outside the substituted span are copied from the reference
/// unchanged. The window is never widened for long insertions, so the
/// haplotype may be longer than `width`.
///
pub fn create_haplotype<R: ReferenceReader + ?Sized>(
    reference: &R,
    variant: &Variant,
    alt: &str,
    width: usize,
) -> Result<Haplotype> {
    if alt.is_empty() {
        return Err(ModelError::EmptyAllele.into());
    }

    let contig = variant.reference_name.as_str();
    let contig_length = reference.contig_length(contig)?;
    let window = haplotype_window(variant, width, contig_length)?;

    let prefix = reference.get_bases(contig, window.start, variant.start)?;
    let suffix = reference.get_bases(contig, variant.end(), window.end)?;

    let mut sequence = String::with_capacity(prefix.len() + alt.len() + suffix.len());
    sequence.push_str(&prefix);
    sequence.push_str(alt);
    sequence.push_str(&suffix);

    debug!(
        "{}: haplotype for {} over {} ({} bases)",
        variant,
        alt,
        window,
        sequence.len()
    );

    Ok(Haplotype {
        allele: alt.to_string(),
        sequence,
        window,
    })
}
