use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::io::BufRead;
use std::path::Path;

use log::info;

use crate::error::{ReferenceError, Result};
use crate::utils::{get_dynamic_reader, parse_header_name, trim_line_end};
use crate::{ReferenceReader, check_range};

/// Bases of one contig, possibly only a fragment `[start, start + bases.len())` of it.
#[derive(Debug, Clone)]
struct ContigSequence {
    length: u64,
    start: u64,
    bases: String,
}

impl ContigSequence {
    fn end(&self) -> u64 {
        self.start + self.bases.len() as u64
    }
}

///
/// Reference held entirely in memory.
///
/// A contig can be loaded whole, or as a fragment covering only part of a
/// longer contig (useful for tests and for small regions extracted from a
/// large genome). Requests outside the loaded bases fail with
/// [`ReferenceError::OutOfBounds`].
///
#[derive(Debug, Clone, Default)]
pub struct InMemoryReference {
    contigs: HashMap<String, ContigSequence>,
    /// contig names in insertion order
    names: Vec<String>,
}

impl InMemoryReference {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Build a reference from `(name, bases)` pairs.
    ///
    pub fn from_sequences<I, N, S>(sequences: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, S)>,
        N: Into<String>,
        S: AsRef<str>,
    {
        let mut reference = Self::new();
        for (name, bases) in sequences {
            reference.add_contig(name, bases.as_ref())?;
        }
        Ok(reference)
    }

    ///
    /// Load every record of a FASTA file (plain or gzip'd) into memory.
    ///
    pub fn from_fasta<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = get_dynamic_reader(path)?;
        let mut reference = Self::new();

        let mut line = Vec::new();
        let mut current: Option<(String, String)> = None;
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            if line.starts_with(b">") {
                if let Some((name, bases)) = current.take() {
                    reference.add_contig(name, &bases)?;
                }
                current = Some((parse_header_name(&line), String::new()));
            } else if let Some((name, bases)) = current.as_mut() {
                let trimmed = trim_line_end(&line);
                if !trimmed.is_ascii() {
                    return Err(ReferenceError::NonAscii(name.clone()));
                }
                bases.push_str(&String::from_utf8_lossy(trimmed));
            }
        }
        if let Some((name, bases)) = current.take() {
            reference.add_contig(name, &bases)?;
        }

        info!(
            "Loaded {} contigs from {} into memory",
            reference.names.len(),
            path.display()
        );
        Ok(reference)
    }

    ///
    /// Add a whole contig.
    ///
    pub fn add_contig<N: Into<String>>(&mut self, name: N, bases: &str) -> Result<()> {
        let length = bases.len() as u64;
        self.add_contig_fragment(name, length, 0, bases)
    }

    ///
    /// Add the bases covering `[start, start + bases.len())` of a contig whose
    /// full length is `length`.
    ///
    pub fn add_contig_fragment<N: Into<String>>(
        &mut self,
        name: N,
        length: u64,
        start: u64,
        bases: &str,
    ) -> Result<()> {
        let name = name.into();
        if self.contigs.contains_key(&name) {
            return Err(ReferenceError::DuplicateContig(name));
        }
        if !bases.is_ascii() {
            return Err(ReferenceError::NonAscii(name));
        }
        let len = bases.len() as u64;
        if start + len > length {
            return Err(ReferenceError::InvalidFragment {
                contig: name,
                start,
                len,
                length,
            });
        }

        self.contigs.insert(
            name.clone(),
            ContigSequence {
                length,
                start,
                bases: bases.to_ascii_uppercase(),
            },
        );
        self.names.push(name);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn contig(&self, name: &str) -> Result<&ContigSequence> {
        self.contigs
            .get(name)
            .ok_or_else(|| ReferenceError::UnknownContig(name.to_string()))
    }
}

impl ReferenceReader for InMemoryReference {
    fn contig_names(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    fn contig_length(&self, contig: &str) -> Result<u64> {
        Ok(self.contig(contig)?.length)
    }

    fn get_bases(&self, contig: &str, start: u64, end: u64) -> Result<String> {
        let sequence = self.contig(contig)?;
        check_range(contig, start, end, sequence.start, sequence.end())?;

        let from = (start - sequence.start) as usize;
        let to = (end - sequence.start) as usize;
        Ok(sequence.bases[from..to].to_string())
    }
}

impl Display for InMemoryReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "InMemoryReference ({} contigs)", self.names.len())?;
        for name in &self.names {
            if let Some(sequence) = self.contigs.get(name) {
                writeln!(
                    f,
                    "  {}\tlength={}\tloaded=[{}, {})",
                    name,
                    sequence.length,
                    sequence.start,
                    sequence.end()
                )?;
            }
        }
        Ok(())
    }
}
