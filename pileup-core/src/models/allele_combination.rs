use std::fmt::{self, Display};

use crate::errors::{ModelError, Result};
use crate::models::variant::validate_allele;

///
/// The alleles a single pileup image is generated for: either one alternate
/// allele, or two alternates together (a het-alt image).
///
#[derive(Eq, PartialEq, Hash, Debug, Clone, PartialOrd, Ord)]
pub struct AlleleCombination {
    alleles: Vec<String>,
}

impl AlleleCombination {
    pub fn single<S: Into<String>>(allele: S) -> Self {
        AlleleCombination {
            alleles: vec![allele.into()],
        }
    }

    pub fn pair<S: Into<String>>(first: S, second: S) -> Self {
        AlleleCombination {
            alleles: vec![first.into(), second.into()],
        }
    }

    pub fn alleles(&self) -> &[String] {
        &self.alleles
    }

    pub fn len(&self) -> usize {
        self.alleles.len()
    }

    /// A combination built through the public constructors is never empty.
    pub fn is_empty(&self) -> bool {
        self.alleles.is_empty()
    }

    pub fn is_het_alt(&self) -> bool {
        self.alleles.len() == 2
    }
}

impl TryFrom<Vec<String>> for AlleleCombination {
    type Error = ModelError;

    fn try_from(alleles: Vec<String>) -> Result<Self> {
        if alleles.is_empty() || alleles.len() > 2 {
            return Err(ModelError::CombinationSize(alleles.len()));
        }
        for allele in &alleles {
            validate_allele(allele)?;
        }
        Ok(AlleleCombination { alleles })
    }
}

impl Display for AlleleCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.alleles.join("|"))
    }
}
