//! Whether a variant's reads must be realigned to its alt haplotypes.

use pileup_core::Variant;

use crate::config::{AltAlignedPileup, PileupImageOptions, TypesToAltAlign};

/// Decides, per variant, whether the alt-realignment pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AltAlignmentPolicy {
    pub alt_aligned_pileup: AltAlignedPileup,
    pub types_to_alt_align: TypesToAltAlign,
}

impl AltAlignmentPolicy {
    pub fn new(alt_aligned_pileup: AltAlignedPileup, types_to_alt_align: TypesToAltAlign) -> Self {
        AltAlignmentPolicy {
            alt_aligned_pileup,
            types_to_alt_align,
        }
    }

    pub fn from_options(options: &PileupImageOptions) -> Self {
        Self::new(options.alt_aligned_pileup, options.types_to_alt_align)
    }

    pub fn is_enabled(&self) -> bool {
        self.alt_aligned_pileup != AltAlignedPileup::None
            && self.types_to_alt_align != TypesToAltAlign::None
    }

    ///
    /// True when `variant` needs alt-aligned rows.
    ///
    /// With `indels` scope a single length-changing alternate is enough,
    /// even when the other alternates are substitutions.
    ///
    pub fn need_alt_alignment(&self, variant: &Variant) -> bool {
        if self.alt_aligned_pileup == AltAlignedPileup::None {
            return false;
        }
        match self.types_to_alt_align {
            TypesToAltAlign::None => false,
            TypesToAltAlign::All => true,
            TypesToAltAlign::Indels => variant.is_indel(),
        }
    }
}

impl From<&PileupImageOptions> for AltAlignmentPolicy {
    fn from(options: &PileupImageOptions) -> Self {
        Self::from_options(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn variant(reference: &str, alts: Vec<&str>) -> Variant {
        Variant::new("chr20", 10, reference, alts).unwrap()
    }

    #[rstest]
    // SNP
    #[case("A", vec!["T"], false)]
    // insertion
    #[case("A", vec!["AT"], true)]
    // deletion
    #[case("AC", vec!["A"], true)]
    // SNP and insertion
    #[case("A", vec!["C", "AT"], true)]
    // MNP
    #[case("AC", vec!["GT"], false)]
    fn test_indels(#[case] reference: &str, #[case] alts: Vec<&str>, #[case] expected: bool) {
        let policy = AltAlignmentPolicy::new(AltAlignedPileup::DiffChannels, TypesToAltAlign::Indels);
        assert_eq!(policy.need_alt_alignment(&variant(reference, alts)), expected);
    }

    #[rstest]
    #[case("A", vec!["T"])]
    #[case("A", vec!["AT"])]
    #[case("AC", vec!["A"])]
    #[case("A", vec!["C", "AT"])]
    fn test_all(#[case] reference: &str, #[case] alts: Vec<&str>) {
        let policy = AltAlignmentPolicy::new(AltAlignedPileup::DiffChannels, TypesToAltAlign::All);
        assert_eq!(policy.need_alt_alignment(&variant(reference, alts)), true);
    }

    #[rstest]
    #[case(AltAlignedPileup::None, TypesToAltAlign::Indels)]
    #[case(AltAlignedPileup::None, TypesToAltAlign::All)]
    #[case(AltAlignedPileup::BaseChannels, TypesToAltAlign::None)]
    fn test_disabled(
        #[case] alt_aligned_pileup: AltAlignedPileup,
        #[case] types_to_alt_align: TypesToAltAlign,
    ) {
        let policy = AltAlignmentPolicy::new(alt_aligned_pileup, types_to_alt_align);
        assert_eq!(policy.is_enabled(), false);
        for (reference, alts) in [
            ("A", vec!["T"]),
            ("A", vec!["AT"]),
            ("AC", vec!["A"]),
            ("A", vec!["C", "AT"]),
        ] {
            assert_eq!(policy.need_alt_alignment(&variant(reference, alts)), false);
        }
    }

    #[rstest]
    fn test_from_options() {
        let options = PileupImageOptions {
            alt_aligned_pileup: AltAlignedPileup::BaseChannels,
            ..Default::default()
        };
        let policy = AltAlignmentPolicy::from(&options);
        assert_eq!(policy.types_to_alt_align, TypesToAltAlign::Indels);
        assert_eq!(policy.is_enabled(), options.alt_alignment_enabled());
    }
}
