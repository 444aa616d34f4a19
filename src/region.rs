use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// A window on a contig
///
/// Unlike most half-open intervals, both `start` and `end` are inclusive.
/// Coordinates are taken verbatim from the alignment records, so whether they
/// are zero- or one-based is up to the alignment reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub contig: String,
    pub start: i64, // inclusive
    pub end: i64,   // inclusive
}

impl Region {
    pub fn new(contig: impl Into<String>, start: i64, end: i64) -> Result<Region, ParseError> {
        if end < start {
            Err(ParseError::somewhere(
                "start <= end",
                format!("{}>{}", start, end),
            ))
        } else {
            Ok(Region {
                contig: contig.into(),
                start,
                end,
            })
        }
    }

    /// Parse a region of the form `contig:start-end`
    pub fn parse(text: &str) -> Result<Region, ParseError> {
        // contig names may themselves contain colons (e.g. HLA contigs)
        let (contig, range) = match text.rfind(':') {
            Some(i) => (&text[..i], &text[i + 1..]),
            None => return Err(ParseError::somewhere("contig:start-end", text.to_string())),
        };
        if contig.is_empty() {
            return Err(ParseError::somewhere("contig name", text.to_string()));
        }
        let parts: Vec<&str> = range.split('-').collect();
        if parts.len() != 2 {
            return Err(ParseError::somewhere("start-end", range.to_string()));
        }
        let start = parts[0]
            .replace(',', "")
            .parse::<i64>()
            .map_err(|_| ParseError::somewhere("integer", parts[0].to_string()))?;
        let end = parts[1]
            .replace(',', "")
            .parse::<i64>()
            .map_err(|_| ParseError::somewhere("integer", parts[1].to_string()))?;
        Region::new(contig, start, end)
    }

    pub fn contains(&self, position: i64) -> bool {
        self.start <= position && position <= self.end
    }

    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        false // start <= end is checked on construction
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.contig, self.start, self.end)
    }
}
