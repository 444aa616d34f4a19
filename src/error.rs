use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
#[error("Expected {expected} {location} but observed: {observed}")]
pub struct ParseError {
    expected: &'static str,
    observed: String,
    location: Location,
}

#[derive(Debug)]
pub enum Location {
    Unknown,
    File { path: PathBuf, line: usize },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Unknown => write!(f, "at unknown location"),
            Location::File { path, line } => {
                write!(f, "in file {} on line {}", path.as_path().display(), line)
            }
        }
    }
}

impl ParseError {
    pub fn somewhere(expected: &'static str, observed: String) -> Self {
        Self {
            expected,
            observed,
            location: Location::Unknown,
        }
    }

    pub fn file(path: PathBuf, line: usize, expected: &'static str, observed: String) -> Self {
        let location = Location::File { path, line };
        Self {
            observed,
            expected,
            location,
        }
    }
}

#[derive(Debug, Error)]
pub struct FileError {
    path: Option<PathBuf>,
    #[source]
    source: FileErrorSource,
}

impl FileError {
    pub fn io<P: AsRef<Path>>(path: Option<P>, error: std::io::Error) -> Self {
        Self {
            path: path.map(|p| p.as_ref().to_path_buf()),
            source: error.into(),
        }
    }

    pub fn parse<P: AsRef<Path>>(path: Option<P>, error: ParseError) -> Self {
        Self {
            path: path.map(|p| p.as_ref().to_path_buf()),
            source: error.into(),
        }
    }

    pub fn csv<P: AsRef<Path>>(path: Option<P>, error: csv::Error) -> Self {
        Self {
            path: path.map(|p| p.as_ref().to_path_buf()),
            source: error.into(),
        }
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "Failed to work with file {}", path.display()),
            None => write!(f, "Failed to work with anonymous file"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FileErrorSource {
    #[error("Failed to parse file")]
    Parse {
        #[from]
        source: ParseError,
    },
    #[error("Failed to read/write to file")]
    IO {
        #[from]
        source: std::io::Error,
    },
    #[error("Failed to write table")]
    Csv {
        #[from]
        source: csv::Error,
    },
}

/// Fatal violations of the invariants that the derived tables rely on.
///
/// None of these can be recovered from inside the pipeline. The caller has to
/// fix the region or the input table and run again.
#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error(
        "Reference positions are not contiguous: {distinct} distinct positions between {min} and {max}"
    )]
    Contiguity { min: i64, max: i64, distinct: usize },

    #[error("Alignment table contains {count} duplicate rows (first: read {query_id} at reference position {reference_position:?})")]
    DuplicateRows {
        count: usize,
        query_id: String,
        reference_position: Option<i64>,
    },

    #[error("Read {query_id} has no base at read position {read_position} of its aligned sequence")]
    MalformedRead {
        query_id: String,
        read_position: usize,
    },

    #[error("Join on {key} expected {expected} but key {observed} occurs more than once")]
    JoinCardinality {
        key: &'static str,
        expected: &'static str,
        observed: String,
    },

    #[error("None of the amino acid, codon or nucleotide reference columns were found in [{}]", .columns.join(", "))]
    UnrecognizedColumns { columns: Vec<&'static str> },

    #[error("Column {column} cannot be aggregated")]
    UnknownValueColumn { column: String },
}

/// Catch-all error for top-level API
#[derive(Debug, Error)]
pub enum MutfreqError {
    #[error(transparent)]
    ParseError(#[from] ParseError),
    #[error(transparent)]
    FileError(#[from] FileError),
    #[error(transparent)]
    TableError(#[from] TableError),
    #[error("Failed to fetch reads from the alignment source")]
    SourceError(#[source] Box<dyn std::error::Error + Send + Sync>),
}
