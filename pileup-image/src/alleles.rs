//! Allele combinations that each get their own pileup image.

use log::debug;

use pileup_core::{AlleleCombination, Variant};

use crate::config::{ConfigError, ConfigResult, MultiAllelicMode};

///
/// Enumerate the allele combinations an image must be generated for.
///
/// - `NO_HET_ALT_IMAGES`: one single-allele combination per alternate.
/// - `ADD_HET_ALT_IMAGES`: over `[ref, alt_1, .., alt_n]`, every pair `(i, j)`
///   with `i < j`; pairs starting at the reference collapse to `[alt_j]`, so the
///   result is every alternate alone plus every unordered pair of alternates.
///
/// A repeated alternate allele gets its own combinations each time it
/// appears. The reference allele is never part of a combination.
///
pub fn alt_allele_combinations(
    variant: &Variant,
    mode: MultiAllelicMode,
) -> ConfigResult<Vec<AlleleCombination>> {
    let alts = &variant.alternate_bases;

    let combinations = match mode {
        MultiAllelicMode::Unspecified => return Err(ConfigError::UnspecifiedMultiAllelicMode),
        MultiAllelicMode::NoHetAltImages => alts
            .iter()
            .map(|alt| AlleleCombination::single(alt.as_str()))
            .collect(),
        MultiAllelicMode::AddHetAltImages => {
            let mut alleles = Vec::with_capacity(alts.len() + 1);
            alleles.push(variant.reference_bases.as_str());
            alleles.extend(alts.iter().map(String::as_str));

            let mut combinations = Vec::with_capacity(alleles.len() * (alleles.len() - 1) / 2);
            for i in 0..alleles.len() {
                for j in (i + 1)..alleles.len() {
                    if i == 0 {
                        combinations.push(AlleleCombination::single(alleles[j]));
                    } else {
                        combinations.push(AlleleCombination::pair(alleles[i], alleles[j]));
                    }
                }
            }
            combinations
        }
    };

    debug!(
        "{}: {} allele combinations ({})",
        variant,
        combinations.len(),
        mode
    );
    Ok(combinations)
}
