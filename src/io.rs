use std::convert::TryFrom;
use std::path::Path;

use csv::WriterBuilder;
use log::debug;
use serde::Serialize;
use tabfile::Tabfile;

use crate::alignment::{AlignedBase, AlignmentTable};
use crate::amino_acid::{AminoAcid, CodonTable};
use crate::cigar::Cigar;
use crate::error::{FileError, MutfreqError, ParseError};
use crate::map::SubstitutionMap;

const ALIGNMENT_COLUMNS: [&str; 6] = [
    "query_id",
    "cigar",
    "read_position",
    "reference_position",
    "reference_base",
    "read_base",
];

/// Read a materialized per-base alignment table
///
/// Expects the six columns query_id, cigar, read_position,
/// reference_position, reference_base and read_base, separated by tabs. An
/// optional header line is skipped. Empty cells (as well as `NA`, `nan` and
/// `None`) are absent values, missing trailing cells too.
pub fn read_alignment_table<P: AsRef<Path>>(path: P) -> Result<AlignmentTable, MutfreqError> {
    const QUERY_ID_IDX: usize = 0;
    const CIGAR_IDX: usize = 1;
    const READ_POSITION_IDX: usize = 2;
    const REFERENCE_POSITION_IDX: usize = 3;
    const REFERENCE_BASE_IDX: usize = 4;
    const READ_BASE_IDX: usize = 5;

    let tabfile = match Tabfile::open(&path) {
        Ok(tf) => tf.comment_character('#'),
        Err(e) => return Err(FileError::io(Some(&path), e).into()),
    };
    let mut rows = Vec::new();
    for record_result in tabfile {
        let record = match record_result {
            Ok(record) => record,
            Err(e) => return Err(FileError::io(Some(&path), e).into()),
        };
        let tokens = record.fields();
        if tokens.first() == Some(&ALIGNMENT_COLUMNS[QUERY_ID_IDX]) {
            continue; // header
        }
        let parse_error = |expected: &'static str| {
            FileError::parse(
                Some(&path),
                ParseError::file(
                    path.as_ref().to_path_buf(),
                    record.line_number(),
                    expected,
                    record.line().to_string(),
                ),
            )
        };
        if tokens.len() < 4 {
            return Err(parse_error("at least 4 columns").into());
        }
        let cell = |i: usize| tokens.get(i).copied().filter(|t| !is_absent(t));

        let read_position = match cell(READ_POSITION_IDX) {
            Some(token) => {
                let position =
                    parse_integer(token).ok_or_else(|| parse_error("integer read position"))?;
                Some(
                    usize::try_from(position)
                        .map_err(|_| parse_error("non-negative read position"))?,
                )
            }
            None => None,
        };
        let reference_position = match cell(REFERENCE_POSITION_IDX) {
            Some(token) => {
                Some(parse_integer(token).ok_or_else(|| parse_error("integer reference position"))?)
            }
            None => None,
        };
        let reference_base = match cell(REFERENCE_BASE_IDX) {
            Some(token) => Some(parse_base(token).ok_or_else(|| parse_error("single reference base"))?),
            None => None,
        };
        let read_base = match cell(READ_BASE_IDX) {
            Some(token) => Some(parse_base(token).ok_or_else(|| parse_error("single read base"))?),
            None => None,
        };
        let cigar = tokens[CIGAR_IDX];
        Cigar::parse(cigar).map_err(|e| FileError::parse(Some(&path), e))?;
        if read_position.is_none() && reference_position.is_none() {
            return Err(parse_error("read position or reference position").into());
        }
        rows.push(AlignedBase {
            query_id: tokens[QUERY_ID_IDX].to_string(),
            cigar: cigar.to_string(),
            read_position,
            reference_position,
            reference_base,
            read_base,
        });
    }
    debug!(
        "Read {} alignment rows from {}",
        rows.len(),
        path.as_ref().display()
    );
    Ok(AlignmentTable::from_rows(rows)?)
}

/// Read a `codon<TAB>amino acid` table with one-letter amino acid codes
///
/// The table does not have to cover all codons.
pub fn read_codon_table<P: AsRef<Path>>(path: P) -> Result<CodonTable, FileError> {
    let tabfile = match Tabfile::open(&path) {
        Ok(tf) => tf.comment_character('#'),
        Err(e) => return Err(FileError::io(Some(&path), e)),
    };
    let mut entries = Vec::new();
    for record_result in tabfile {
        let record = match record_result {
            Ok(record) => record,
            Err(e) => return Err(FileError::io(Some(&path), e)),
        };
        let tokens = record.fields();
        let parse_error = |expected: &'static str| {
            FileError::parse(
                Some(&path),
                ParseError::file(
                    path.as_ref().to_path_buf(),
                    record.line_number(),
                    expected,
                    record.line().to_string(),
                ),
            )
        };
        if tokens.len() < 2 {
            return Err(parse_error("2 columns"));
        }
        let codon = tokens[0];
        if codon.chars().count() != 3 {
            return Err(parse_error("codon of length 3"));
        }
        let mut symbols = tokens[1].chars();
        let amino_acid = match (symbols.next(), symbols.next()) {
            (Some(symbol), None) => {
                AminoAcid::try_from(symbol).map_err(|e| FileError::parse(Some(&path), e))?
            }
            _ => return Err(parse_error("one-letter amino acid code")),
        };
        entries.push((codon.to_string(), amino_acid));
    }
    Ok(CodonTable::from_entries(entries))
}

/// Write rows as a tab-separated table with a header line
///
/// Absent values are written as empty cells. Nothing is written for an
/// empty table.
pub fn write_tsv<T: Serialize, P: AsRef<Path>>(rows: &[T], path: P) -> Result<(), FileError> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&path)
        .map_err(|e| FileError::csv(Some(&path), e))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| FileError::csv(Some(&path), e))?;
    }
    writer.flush().map_err(|e| FileError::io(Some(&path), e))
}

/// Write a substitution map in wide format
///
/// The first column holds the read labels. The other columns are named
/// `position:reference` (or just `reference` for submaps).
pub fn write_map<P: AsRef<Path>>(map: &SubstitutionMap, path: P) -> Result<(), FileError> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(&path)
        .map_err(|e| FileError::csv(Some(&path), e))?;

    let mut header = vec![map.resolution.read_column().to_string()];
    header.extend(map.columns().iter().map(|column| match column.reference_position {
        Some(position) => format!("{}:{}", position, column.reference),
        None => column.reference.clone(),
    }));
    writer
        .write_record(&header)
        .map_err(|e| FileError::csv(Some(&path), e))?;

    for (label, values) in map.rows().iter().zip(map.values()) {
        let mut record = vec![label.clone()];
        record.extend(values.iter().map(|v| v.to_string()));
        writer
            .write_record(&record)
            .map_err(|e| FileError::csv(Some(&path), e))?;
    }
    writer.flush().map_err(|e| FileError::io(Some(&path), e))
}

fn is_absent(token: &str) -> bool {
    matches!(token.trim(), "" | "NA" | "nan" | "NaN" | "None")
}

/// Accepts integers written as floats ("12.0"), as produced by dataframe exports
fn parse_integer(token: &str) -> Option<i64> {
    let token = token.trim();
    token.parse::<i64>().ok().or_else(|| {
        let value = token.parse::<f64>().ok()?;
        if value.fract() == 0.0 {
            Some(value as i64)
        } else {
            None
        }
    })
}

fn parse_base(token: &str) -> Option<char> {
    let mut chars = token.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer() {
        assert_eq!(parse_integer("74846395"), Some(74846395));
        assert_eq!(parse_integer("12.0"), Some(12));
        assert_eq!(parse_integer("12.5"), None);
        assert_eq!(parse_integer("x"), None);
    }

    #[test]
    fn test_parse_base() {
        assert_eq!(parse_base("a"), Some('A'));
        assert_eq!(parse_base("AC"), None);
        assert_eq!(parse_base(""), None);
        assert!(is_absent(""));
        assert!(is_absent("nan"));
        assert!(!is_absent("A"));
    }
}
