use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::error::Result;

pub(crate) fn is_gzipped(path: &Path) -> bool {
    path.extension() == Some(OsStr::new("gz"))
}

///
/// Get a reader for either a gzip'd or a plain file.
///
pub(crate) fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let file = File::open(path)?;
    let file: Box<dyn Read> = match is_gzipped(path) {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

/// `<fasta>.fai`, the samtools convention for index location.
pub(crate) fn fai_path_for(fasta_path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.fai", fasta_path.display()))
}

/// Contig name from a FASTA header line: the first word after `>`.
pub(crate) fn parse_header_name(line: &[u8]) -> String {
    let header = String::from_utf8_lossy(&line[1..]);
    header
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Strip a trailing `\n` or `\r\n`.
pub(crate) fn trim_line_end(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && (line[end - 1] == b'\n' || line[end - 1] == b'\r') {
        end -= 1;
    }
    &line[..end]
}
