use std::fmt::{self, Display};

use crate::errors::{ModelError, Result};

///
/// A candidate variant: reference allele and ordered alternate alleles at a
/// 0-based position on a contig.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variant {
    pub reference_name: String,
    pub start: u64,
    pub reference_bases: String,
    pub alternate_bases: Vec<String>,
}

impl Variant {
    ///
    /// Create a variant, checking that every allele is a non-empty upper-case
    /// base sequence and that at least one alternate is present. IUPAC
    /// ambiguity codes count as bases.
    ///
    pub fn new<S: Into<String>>(
        reference_name: S,
        start: u64,
        reference_bases: S,
        alternate_bases: Vec<S>,
    ) -> Result<Self> {
        let reference_name = reference_name.into();
        let reference_bases = reference_bases.into();
        let alternate_bases: Vec<String> = alternate_bases.into_iter().map(Into::into).collect();

        validate_allele(&reference_bases)?;
        if alternate_bases.is_empty() {
            return Err(ModelError::NoAlternateAlleles(format!(
                "{}:{}",
                reference_name, start
            )));
        }
        for alt in &alternate_bases {
            validate_allele(alt)?;
        }

        Ok(Variant {
            reference_name,
            start,
            reference_bases,
            alternate_bases,
        })
    }

    ///
    /// Exclusive end of the reference span covered by the reference allele.
    ///
    pub fn end(&self) -> u64 {
        self.start + self.reference_bases.len() as u64
    }

    /// True when any alternate allele changes the length of the reference allele.
    pub fn is_indel(&self) -> bool {
        let ref_len = self.reference_bases.len();
        self.alternate_bases.iter().any(|alt| alt.len() != ref_len)
    }

    pub fn num_alternates(&self) -> usize {
        self.alternate_bases.len()
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}>{}",
            self.reference_name,
            self.start,
            self.reference_bases,
            self.alternate_bases.join(",")
        )
    }
}

pub(crate) fn validate_allele(allele: &str) -> Result<()> {
    if allele.is_empty() {
        return Err(ModelError::EmptyAllele);
    }
    if let Some(base) = allele.bytes().find(|b| !b.is_ascii_uppercase()) {
        return Err(ModelError::InvalidBase {
            allele: allele.to_string(),
            base: base as char,
        });
    }
    Ok(())
}
