//! FASTA index (`.fai`) records.
//!
//! An index line has five tab-separated columns: name, length, byte offset of
//! the first base, bases per line and bytes per line (including the line
//! terminator). Given those, the byte offset of any base can be computed
//! without scanning the file.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{ReferenceError, Result};
use crate::utils::{get_dynamic_reader, is_gzipped, parse_header_name, trim_line_end};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaiRecord {
    pub name: String,
    pub length: u64,
    /// byte offset to first base of sequence data
    pub offset: u64,
    /// number of bases per line
    pub line_bases: u64,
    /// number of bytes per line (including newline chars)
    pub line_bytes: u64,
}

impl FaiRecord {
    ///
    /// Byte offset in the FASTA file of the base at 0-based position `pos`.
    ///
    pub fn base_offset(&self, pos: u64) -> u64 {
        if self.line_bases == 0 {
            return self.offset;
        }
        self.offset + (pos / self.line_bases) * self.line_bytes + pos % self.line_bases
    }

    fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.name, self.length, self.offset, self.line_bases, self.line_bytes
        )
    }
}

/// Parse one `.fai` line; `line_num` is 1-based and only used in errors.
pub fn parse_fai_line(line: &str, line_num: usize) -> Result<FaiRecord> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 5 {
        return Err(ReferenceError::InvalidFai {
            line: line_num,
            reason: format!("expected 5 columns, found {}", fields.len()),
        });
    }

    let parse = |idx: usize, column: &str| -> Result<u64> {
        fields[idx]
            .trim()
            .parse::<u64>()
            .map_err(|e| ReferenceError::InvalidFai {
                line: line_num,
                reason: format!("bad {} '{}': {}", column, fields[idx], e),
            })
    };

    let record = FaiRecord {
        name: fields[0].to_string(),
        length: parse(1, "length")?,
        offset: parse(2, "offset")?,
        line_bases: parse(3, "line_bases")?,
        line_bytes: parse(4, "line_bytes")?,
    };

    if record.line_bytes < record.line_bases {
        return Err(ReferenceError::InvalidFai {
            line: line_num,
            reason: "line_bytes is smaller than line_bases".to_string(),
        });
    }
    if record.length > 0 && record.line_bases == 0 {
        return Err(ReferenceError::InvalidFai {
            line: line_num,
            reason: "line_bases is zero for a non-empty sequence".to_string(),
        });
    }

    Ok(record)
}

///
/// Read a `.fai` index file.
///
pub fn read_fai<P: AsRef<Path>>(fai_path: P) -> Result<Vec<FaiRecord>> {
    let reader = BufReader::new(File::open(fai_path.as_ref())?);
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(parse_fai_line(&line, idx + 1)?);
    }
    Ok(records)
}

///
/// Write records in `.fai` format.
///
pub fn write_fai<P: AsRef<Path>>(records: &[FaiRecord], fai_path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(fai_path.as_ref())?);
    for record in records {
        writeln!(writer, "{}", record.to_line())?;
    }
    writer.flush()?;
    Ok(())
}

/// Per-sequence state while scanning a FASTA file.
struct PendingRecord {
    name: String,
    offset: u64,
    length: u64,
    line_bases: Option<u64>,
    line_bytes: Option<u64>,
    // a short or blank line was seen; only the sequence end may follow
    closed: bool,
}

impl PendingRecord {
    fn finish(self) -> FaiRecord {
        FaiRecord {
            name: self.name,
            length: self.length,
            offset: self.offset,
            line_bases: self.line_bases.unwrap_or(0),
            line_bytes: self.line_bytes.unwrap_or(0),
        }
    }
}

///
/// Compute FAI records by scanning a plain-text FASTA file, as `samtools faidx` does.
///
/// Every sequence line except the last of each record must have the same
/// length; otherwise byte offsets could not be computed and an
/// [`ReferenceError::InvalidFasta`] is returned. Gzip-compressed files are
/// rejected since offsets into compressed data are meaningless.
///
pub fn compute_fai<P: AsRef<Path>>(fasta_path: P) -> Result<Vec<FaiRecord>> {
    let fasta_path = fasta_path.as_ref();
    if is_gzipped(fasta_path) {
        return Err(ReferenceError::CompressedFasta(
            fasta_path.display().to_string(),
        ));
    }

    let mut reader = get_dynamic_reader(fasta_path)?;
    let mut results = Vec::new();
    let mut line = Vec::new();
    let mut byte_position: u64 = 0;
    let mut current: Option<PendingRecord> = None;

    loop {
        line.clear();
        let bytes_read = reader.read_until(b'\n', &mut line)?;
        if bytes_read == 0 {
            if let Some(record) = current.take() {
                results.push(record.finish());
            }
            break;
        }
        byte_position += bytes_read as u64;

        if line.starts_with(b">") {
            if let Some(record) = current.take() {
                results.push(record.finish());
            }
            current = Some(PendingRecord {
                name: parse_header_name(&line),
                offset: byte_position,
                length: 0,
                line_bases: None,
                line_bytes: None,
                closed: false,
            });
            continue;
        }

        let Some(record) = current.as_mut() else {
            // text before the first header is ignored
            continue;
        };

        let bases = trim_line_end(&line).len() as u64;
        if bases == 0 {
            record.closed = true;
            continue;
        }
        if record.closed {
            return Err(ReferenceError::InvalidFasta {
                name: record.name.clone(),
                reason: "sequence lines have uneven lengths".to_string(),
            });
        }

        match record.line_bases {
            None => {
                record.line_bases = Some(bases);
                record.line_bytes = Some(bytes_read as u64);
            }
            Some(line_bases) if bases > line_bases => {
                return Err(ReferenceError::InvalidFasta {
                    name: record.name.clone(),
                    reason: format!(
                        "line of {} bases is longer than the first line ({} bases)",
                        bases, line_bases
                    ),
                });
            }
            Some(line_bases) if bases < line_bases => record.closed = true,
            Some(_) => {}
        }
        record.length += bases;
    }

    Ok(results)
}
