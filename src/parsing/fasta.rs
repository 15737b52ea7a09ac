//! FASTA input and output using noodles.
//!
//! Genomes handled here are bacterial (a few Mb), so whole records are held in
//! memory.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use noodles::fasta;

use crate::core::contig::{Contig, ContigLayout};
use crate::parsing::ParseError;

/// A FASTA record reduced to what the pipeline uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub name: String,
    pub sequence: Vec<u8>,
}

/// Read every record of a FASTA file.
///
/// # Errors
///
/// Returns `ParseError::Open` if the file cannot be opened, `ParseError::Noodles`
/// if a record is malformed, or `ParseError::InvalidFormat` if the file holds
/// no sequences.
pub fn read_records(path: &Path) -> Result<Vec<SequenceRecord>, ParseError> {
    let file = File::open(path).map_err(|source| ParseError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = fasta::io::Reader::new(BufReader::new(file));
    let records = read_from(&mut reader)?;

    if records.is_empty() {
        return Err(ParseError::InvalidFormat(format!(
            "No sequences found in FASTA file {}",
            path.display()
        )));
    }

    Ok(records)
}

fn read_from<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<Vec<SequenceRecord>, ParseError> {
    let mut records = Vec::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        records.push(SequenceRecord {
            name: String::from_utf8_lossy(record.name()).to_string(),
            sequence: record.sequence().as_ref().to_vec(),
        });
    }

    Ok(records)
}

/// Read a FASTA file as one concatenated sequence plus the layout of its contigs.
///
/// # Errors
///
/// Same as [`read_records`].
pub fn read_concatenated(path: &Path) -> Result<(ContigLayout, Vec<u8>), ParseError> {
    let records = read_records(path)?;
    let total: usize = records.iter().map(|r| r.sequence.len()).sum();

    let mut sequence = Vec::with_capacity(total);
    let mut contigs = Vec::with_capacity(records.len());
    for record in records {
        contigs.push(Contig::new(record.name, record.sequence.len() as u64));
        sequence.extend_from_slice(&record.sequence);
    }

    Ok((ContigLayout::new(contigs), sequence))
}

/// Write `(name, sequence)` pairs as a FASTA file.
///
/// An empty iterator produces an empty file.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be created or written.
pub fn write_records<'a, I>(path: &Path, records: I) -> Result<usize, ParseError>
where
    I: IntoIterator<Item = (String, &'a [u8])>,
{
    let mut buf = BufWriter::new(File::create(path)?);
    let mut writer = fasta::io::Writer::new(&mut buf);
    let mut written = 0;

    for (name, sequence) in records {
        let record = fasta::Record::new(
            fasta::record::Definition::new(name, None),
            fasta::record::Sequence::from(sequence.to_vec()),
        );
        writer.write_record(&record)?;
        written += 1;
    }

    drop(writer);
    buf.flush()?;
    Ok(written)
}
