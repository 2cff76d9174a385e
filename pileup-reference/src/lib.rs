//! # Reference sequence access
//!
//! Pileup construction only ever asks a reference two things: how long is a
//! contig, and what are the bases in `[start, end)`. Both questions are
//! answered through the [`ReferenceReader`] trait, which has two
//! implementations:
//!
//! - [`InMemoryReference`]: contigs (or fragments of contigs) held in memory
//! - [`IndexedFastaReference`]: a memory-mapped FASTA file located through its `.fai` index
//!
//! Readers are `Send + Sync` so a single instance can be shared by every worker
//! thread processing variants.
//!
//! ```
//! use pileup_reference::{InMemoryReference, ReferenceReader};
//!
//! let mut reference = InMemoryReference::new();
//! reference.add_contig("chr1", "ACGTACGT").unwrap();
//!
//! assert_eq!(reference.contig_length("chr1").unwrap(), 8);
//! assert_eq!(reference.get_bases("chr1", 2, 5).unwrap(), "GTA");
//! ```

pub mod error;
pub mod fai;
pub mod indexed;
pub mod memory;
mod utils;

use std::sync::Arc;

pub use error::{ReferenceError, Result};
pub use fai::{FaiRecord, compute_fai, read_fai, write_fai};
pub use indexed::IndexedFastaReference;
pub use memory::InMemoryReference;

/// Read-only access to reference bases, safe to share between threads.
pub trait ReferenceReader: Send + Sync {
    /// Names of all contigs, in the order they were loaded.
    fn contig_names(&self) -> Vec<&str>;

    /// Full length of a contig in bases.
    fn contig_length(&self, contig: &str) -> Result<u64>;

    /// Upper-cased bases of `contig` in the half-open range `[start, end)`.
    fn get_bases(&self, contig: &str, start: u64, end: u64) -> Result<String>;

    fn has_contig(&self, contig: &str) -> bool {
        self.contig_length(contig).is_ok()
    }
}

impl<R: ReferenceReader + ?Sized> ReferenceReader for Arc<R> {
    fn contig_names(&self) -> Vec<&str> {
        (**self).contig_names()
    }

    fn contig_length(&self, contig: &str) -> Result<u64> {
        (**self).contig_length(contig)
    }

    fn get_bases(&self, contig: &str, start: u64, end: u64) -> Result<String> {
        (**self).get_bases(contig, start, end)
    }
}

impl<R: ReferenceReader + ?Sized> ReferenceReader for Box<R> {
    fn contig_names(&self) -> Vec<&str> {
        (**self).contig_names()
    }

    fn contig_length(&self, contig: &str) -> Result<u64> {
        (**self).contig_length(contig)
    }

    fn get_bases(&self, contig: &str, start: u64, end: u64) -> Result<String> {
        (**self).get_bases(contig, start, end)
    }
}

/// Validate `[start, end)` against the bases available for a contig.
pub(crate) fn check_range(
    contig: &str,
    start: u64,
    end: u64,
    available_start: u64,
    available_end: u64,
) -> Result<()> {
    if start > end {
        return Err(ReferenceError::InvalidRange {
            contig: contig.to_string(),
            start,
            end,
        });
    }
    if start < available_start || end > available_end {
        return Err(ReferenceError::OutOfBounds {
            contig: contig.to_string(),
            start,
            end,
            available_start,
            available_end,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10, true)]
    #[case(5, 5, true)]
    #[case(10, 10, true)]
    #[case(0, 11, false)]
    #[case(6, 5, false)]
    fn test_check_range(#[case] start: u64, #[case] end: u64, #[case] ok: bool) {
        assert_eq!(check_range("chr1", start, end, 0, 10).is_ok(), ok);
    }

    #[rstest]
    fn test_check_range_fragment_start() {
        let result = check_range("chr1", 2, 4, 3, 10);
        assert!(matches!(
            result,
            Err(ReferenceError::OutOfBounds {
                available_start: 3,
                ..
            })
        ));
    }

    #[rstest]
    fn test_shared_reader() {
        let mut reference = InMemoryReference::new();
        reference.add_contig("chr2", "acgt").unwrap();

        let shared: Arc<dyn ReferenceReader> = Arc::new(reference);
        assert_eq!(shared.get_bases("chr2", 0, 4).unwrap(), "ACGT");
        assert_eq!(shared.has_contig("chr2"), true);
        assert_eq!(shared.has_contig("chrX"), false);
    }
}
