use std::io;
use thiserror::Error;

/// Error type for reference sequence access.
#[derive(Error, Debug)]
pub enum ReferenceError {
    /// The requested contig is not present in the reference.
    #[error("Unknown contig: {0}")]
    UnknownContig(String),

    /// Range start is past range end.
    #[error("Invalid range {contig}:{start}-{end}: start is past end")]
    InvalidRange { contig: String, start: u64, end: u64 },

    /// Range falls outside of the bases available for the contig.
    #[error(
        "Range {contig}:{start}-{end} is outside of the available bases {available_start}-{available_end}"
    )]
    OutOfBounds {
        contig: String,
        start: u64,
        end: u64,
        available_start: u64,
        available_end: u64,
    },

    /// The same contig name was added twice.
    #[error("Duplicate contig: {0}")]
    DuplicateContig(String),

    /// A contig fragment does not fit inside its declared contig length.
    #[error("Fragment {contig}:{start}+{len} does not fit in a contig of length {length}")]
    InvalidFragment {
        contig: String,
        start: u64,
        len: u64,
        length: u64,
    },

    /// Malformed line in a `.fai` index.
    #[error("Invalid FAI line {line}: {reason}")]
    InvalidFai { line: usize, reason: String },

    /// Malformed FASTA content.
    #[error("Invalid FASTA record {name}: {reason}")]
    InvalidFasta { name: String, reason: String },

    /// Gzip-compressed FASTA files cannot be randomly accessed.
    #[error("Compressed FASTA cannot be indexed: {0}")]
    CompressedFasta(String),

    /// Sequence data contains bytes that are not ASCII.
    #[error("Non-ASCII sequence data in contig {0}")]
    NonAscii(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result type alias for reference operations.
pub type Result<T> = std::result::Result<T, ReferenceError>;
