use std::convert::TryFrom;
use std::fmt;

use crate::error::ParseError;

/// A single CIGAR operation kind (SAM alphabet)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarKind {
    AlignmentMatch, // M
    Insertion,      // I
    Deletion,       // D
    Skip,           // N
    SoftClip,       // S
    HardClip,       // H
    Padding,        // P
    SequenceMatch,  // =
    Mismatch,       // X
}

impl CigarKind {
    pub fn code(&self) -> char {
        match self {
            Self::AlignmentMatch => 'M',
            Self::Insertion => 'I',
            Self::Deletion => 'D',
            Self::Skip => 'N',
            Self::SoftClip => 'S',
            Self::HardClip => 'H',
            Self::Padding => 'P',
            Self::SequenceMatch => '=',
            Self::Mismatch => 'X',
        }
    }

    /// Insertions and deletions break the positional correspondence between
    /// read and reference.
    pub fn is_indel(&self) -> bool {
        matches!(self, Self::Insertion | Self::Deletion)
    }
}

impl TryFrom<char> for CigarKind {
    type Error = ParseError;
    fn try_from(c: char) -> Result<Self, Self::Error> {
        Ok(match c {
            'M' => Self::AlignmentMatch,
            'I' => Self::Insertion,
            'D' => Self::Deletion,
            'N' => Self::Skip,
            'S' => Self::SoftClip,
            'H' => Self::HardClip,
            'P' => Self::Padding,
            '=' => Self::SequenceMatch,
            'X' => Self::Mismatch,
            _ => return Err(ParseError::somewhere("CIGAR operation", c.to_string())),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CigarOp {
    pub kind: CigarKind,
    pub len: usize,
}

/// A parsed CIGAR string
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cigar {
    ops: Vec<CigarOp>,
}

impl Cigar {
    /// Parse a SAM CIGAR string. `*` (unavailable) yields an empty CIGAR.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut ops = Vec::new();
        if text == "*" {
            return Ok(Self { ops });
        }
        if text.is_empty() {
            return Err(ParseError::somewhere("CIGAR string", text.to_string()));
        }

        let mut number_start: Option<usize> = None;
        for (i, c) in text.char_indices() {
            if c.is_ascii_digit() {
                number_start.get_or_insert(i);
                continue;
            }
            let start = match number_start.take() {
                Some(start) => start,
                None => return Err(ParseError::somewhere("count before operation", text.to_string())),
            };
            let len = text[start..i]
                .parse::<usize>()
                .map_err(|_| ParseError::somewhere("usize", text[start..i].to_string()))?;
            ops.push(CigarOp {
                kind: CigarKind::try_from(c)?,
                len,
            });
        }
        if number_start.is_some() {
            return Err(ParseError::somewhere("trailing CIGAR operation", text.to_string()));
        }
        Ok(Self { ops })
    }

    pub fn ops(&self) -> &[CigarOp] {
        &self.ops
    }

    pub fn has_indel(&self) -> bool {
        self.ops.iter().any(|op| op.kind.is_indel())
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return write!(f, "*");
        }
        for op in &self.ops {
            write!(f, "{}{}", op.len, op.kind.code())?;
        }
        Ok(())
    }
}

/// Check a raw CIGAR string for insertion or deletion operators.
///
/// Reads are excluded from mutation counting on the textual content of their
/// CIGAR alone, so this does not require the string to be well formed.
pub fn contains_indel(cigar: &str) -> bool {
    cigar.contains(|c| c == 'I' || c == 'D')
}
