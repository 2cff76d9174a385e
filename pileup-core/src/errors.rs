use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModelError {
    #[error("Allele must not be empty")]
    EmptyAllele,

    #[error("Invalid base '{base}' in allele {allele}")]
    InvalidBase { allele: String, base: char },

    #[error("Variant at {0} has no alternate alleles")]
    NoAlternateAlleles(String),

    #[error("An allele combination holds one or two alleles, got {0}")]
    CombinationSize(usize),

    #[error("Image row channel {channel} has width {found}, expected {expected}")]
    RaggedChannel {
        channel: usize,
        expected: usize,
        found: usize,
    },

    #[error("Image row must have at least one channel and a non-zero width")]
    EmptyImageRow,
}

pub type Result<T> = std::result::Result<T, ModelError>;
