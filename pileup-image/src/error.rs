use thiserror::Error;

use pileup_core::ModelError;
use pileup_reference::ReferenceError;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum PileupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Reference error: {0}")]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Variant {variant} ends at {end}, past the end of {contig} (length {length})")]
    VariantPastContigEnd {
        variant: String,
        contig: String,
        end: u64,
        length: u64,
    },

    #[error("Pileup has no rows")]
    EmptyPileup,

    #[error(
        "{rows} row {row} is {found_width} pixels x {found_channels} channels, expected {width} x {channels}"
    )]
    DimensionMismatch {
        rows: String,
        row: usize,
        width: usize,
        channels: usize,
        found_width: usize,
        found_channels: usize,
    },

    #[error("At most two alt-aligned row sets can be merged, got {0}")]
    TooManyAltRowSets(usize),

    #[error("Alt-aligned row set {set} has {found} rows, expected {expected}")]
    AltRowCountMismatch {
        set: usize,
        expected: usize,
        found: usize,
    },

    #[error("Channel {channel} requested from rows with {num_channels} channels")]
    ChannelOutOfRange { channel: usize, num_channels: usize },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    /// Failure reported by an external collaborator (evidence provider or image sink).
    #[error(transparent)]
    External(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PileupError>;
