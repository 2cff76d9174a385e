use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use memmap2::Mmap;

use crate::error::{ReferenceError, Result};
use crate::fai::{FaiRecord, compute_fai, read_fai};
use crate::utils::{fai_path_for, is_gzipped};
use crate::{ReferenceReader, check_range};

///
/// File-backed reference: a memory-mapped, uncompressed FASTA file whose
/// records are located through a `.fai` index.
///
/// The map is read-only, so one reader can serve any number of threads.
///
#[derive(Debug)]
pub struct IndexedFastaReference {
    path: PathBuf,
    mmap: Mmap,
    index: HashMap<String, FaiRecord>,
    /// contig names in index order
    names: Vec<String>,
}

impl IndexedFastaReference {
    ///
    /// Open a FASTA file, using `<path>.fai` when it exists and computing the
    /// index by scanning the file otherwise.
    ///
    pub fn from_path<P: AsRef<Path>>(fasta_path: P) -> Result<Self> {
        let fasta_path = fasta_path.as_ref();
        let fai_path = fai_path_for(fasta_path);

        let records = if fai_path.exists() {
            debug!("Using FAI index {}", fai_path.display());
            read_fai(&fai_path)?
        } else {
            warn!(
                "No FAI index found for {}; computing one in memory",
                fasta_path.display()
            );
            compute_fai(fasta_path)?
        };

        Self::from_records(fasta_path, records)
    }

    ///
    /// Open a FASTA file with an explicit index path.
    ///
    pub fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(fasta_path: P, fai_path: Q) -> Result<Self> {
        let records = read_fai(fai_path)?;
        Self::from_records(fasta_path.as_ref(), records)
    }

    fn from_records(fasta_path: &Path, records: Vec<FaiRecord>) -> Result<Self> {
        if is_gzipped(fasta_path) {
            return Err(ReferenceError::CompressedFasta(
                fasta_path.display().to_string(),
            ));
        }

        let file = File::open(fasta_path)?;
        // SAFETY: the map is only ever read; the FASTA must not be modified while open.
        let mmap = unsafe { Mmap::map(&file)? };

        let mut index = HashMap::with_capacity(records.len());
        let mut names = Vec::with_capacity(records.len());
        for record in records {
            if index.contains_key(&record.name) {
                return Err(ReferenceError::DuplicateContig(record.name));
            }
            names.push(record.name.clone());
            index.insert(record.name.clone(), record);
        }

        debug!(
            "Opened {} ({} contigs, {} bytes)",
            fasta_path.display(),
            names.len(),
            mmap.len()
        );

        Ok(IndexedFastaReference {
            path: fasta_path.to_path_buf(),
            mmap,
            index,
            names,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn fai_record(&self, contig: &str) -> Option<&FaiRecord> {
        self.index.get(contig)
    }

    fn record(&self, contig: &str) -> Result<&FaiRecord> {
        self.index
            .get(contig)
            .ok_or_else(|| ReferenceError::UnknownContig(contig.to_string()))
    }
}

impl ReferenceReader for IndexedFastaReference {
    fn contig_names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    fn contig_length(&self, contig: &str) -> Result<u64> {
        Ok(self.record(contig)?.length)
    }

    fn get_bases(&self, contig: &str, start: u64, end: u64) -> Result<String> {
        let record = self.record(contig)?;
        check_range(contig, start, end, 0, record.length)?;
        if start == end {
            return Ok(String::new());
        }

        let first = record.base_offset(start) as usize;
        let last = record.base_offset(end - 1) as usize + 1;
        let raw = self
            .mmap
            .get(first..last)
            .ok_or_else(|| ReferenceError::InvalidFasta {
                name: contig.to_string(),
                reason: format!(
                    "index points past the end of the file ({} > {} bytes)",
                    last,
                    self.mmap.len()
                ),
            })?;

        let bases: Vec<u8> = raw
            .iter()
            .filter(|b| **b != b'\n' && **b != b'\r')
            .map(u8::to_ascii_uppercase)
            .collect();

        let expected = (end - start) as usize;
        if bases.len() != expected {
            return Err(ReferenceError::InvalidFasta {
                name: contig.to_string(),
                reason: format!(
                    "expected {} bases at {}-{}, read {}; the index does not match the file",
                    expected,
                    start,
                    end,
                    bases.len()
                ),
            });
        }

        String::from_utf8(bases).map_err(|_| ReferenceError::NonAscii(contig.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::fai::write_fai;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_fasta(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("ref.fa");
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[rstest]
    #[case(0, 4, "ACGT")]
    #[case(2, 7, "GTTTG")]
    #[case(8, 10, "CC")]
    #[case(3, 3, "")]
    fn test_get_bases_across_lines(#[case] start: u64, #[case] end: u64, #[case] expected: &str) {
        let dir = tempdir().unwrap();
        let path = write_fasta(dir.path(), ">chr1\nACGT\nTTgg\nCC\n");

        let reference = IndexedFastaReference::from_path(&path).unwrap();
        assert_eq!(reference.contig_length("chr1").unwrap(), 10);
        assert_eq!(reference.get_bases("chr1", start, end).unwrap(), expected);
    }

    #[rstest]
    fn test_crlf_line_endings() {
        let dir = tempdir().unwrap();
        let path = write_fasta(dir.path(), ">chr1\r\nACG\r\nTAC\r\nG\r\n");

        let reference = IndexedFastaReference::from_path(&path).unwrap();
        assert_eq!(reference.get_bases("chr1", 1, 7).unwrap(), "CGTACG");
    }

    #[rstest]
    fn test_uses_existing_index() {
        let dir = tempdir().unwrap();
        let path = write_fasta(dir.path(), ">chr1\nACGT\nAC\n>chr2\nGGGG\n");
        let records = compute_fai(&path).unwrap();
        let fai_path = dir.path().join("custom.fai");
        write_fai(&records, &fai_path).unwrap();

        let reference = IndexedFastaReference::from_paths(&path, &fai_path).unwrap();
        assert_eq!(reference.contig_names(), vec!["chr1", "chr2"]);
        assert_eq!(reference.get_bases("chr2", 0, 4).unwrap(), "GGGG");
        assert_eq!(reference.fai_record("chr1").map(|r| r.line_bases), Some(4));
    }

    #[rstest]
    fn test_out_of_bounds() {
        let dir = tempdir().unwrap();
        let path = write_fasta(dir.path(), ">chr1\nACGT\n");

        let reference = IndexedFastaReference::from_path(&path).unwrap();
        assert!(matches!(
            reference.get_bases("chr1", 2, 5),
            Err(ReferenceError::OutOfBounds { .. })
        ));
        assert!(matches!(
            reference.get_bases("chr9", 0, 1),
            Err(ReferenceError::UnknownContig(_))
        ));
    }

    #[rstest]
    fn test_stale_index_detected() {
        let dir = tempdir().unwrap();
        let path = write_fasta(dir.path(), ">chr1\nACGT\n");
        let stale = vec![FaiRecord {
            name: "chr1".to_string(),
            length: 40,
            offset: 6,
            line_bases: 4,
            line_bytes: 5,
        }];
        let fai_path = dir.path().join("ref.fa.fai");
        write_fai(&stale, &fai_path).unwrap();

        let reference = IndexedFastaReference::from_path(&path).unwrap();
        assert!(matches!(
            reference.get_bases("chr1", 30, 35),
            Err(ReferenceError::InvalidFasta { .. })
        ));
    }
}
