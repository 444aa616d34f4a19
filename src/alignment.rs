use std::collections::{BTreeMap, HashSet};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::cigar::contains_indel;
use crate::codon::{self, CodonMutationRow};
use crate::coverage::{self, CoverageRow};
use crate::error::TableError;
use crate::nucleotide::{self, NucleotideMutationRow};
use crate::region::Region;

/// One entry of a read's aligned-pair list
///
/// `read_position` is absent for deleted reference bases, `reference_position`
/// (and with it `reference_base`) is absent for inserted or soft clipped read
/// bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedPair {
    pub read_position: Option<usize>,
    pub reference_position: Option<i64>,
    pub reference_base: Option<char>,
}

impl AlignedPair {
    pub fn new(
        read_position: Option<usize>,
        reference_position: Option<i64>,
        reference_base: Option<char>,
    ) -> Self {
        Self {
            read_position,
            reference_position,
            reference_base,
        }
    }
}

/// What the alignment reader has to provide for every read
pub trait AlignedRead {
    fn query_id(&self) -> &str;
    fn cigar(&self) -> &str;
    fn aligned_pairs(&self) -> &[AlignedPair];

    /// The bases consumed by the alignment, in read order, without soft clips
    fn query_alignment_sequence(&self) -> &str;

    /// Read coordinate of the first base of `query_alignment_sequence`.
    ///
    /// Readers that report read positions relative to the full read
    /// (including soft clips) must return the length of the leading soft clip.
    fn query_alignment_start(&self) -> usize {
        0
    }
}

/// Random access to the reads overlapping a region (e.g. an indexed BAM file)
pub trait AlignmentSource {
    type Read: AlignedRead;
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch(&mut self, region: &Region) -> Result<Vec<Self::Read>, Self::Error>;
}

/// An owned read, for readers that do not want to implement `AlignedRead` themselves
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRecord {
    pub query_id: String,
    pub cigar: String,
    pub aligned_pairs: Vec<AlignedPair>,
    pub query_alignment_sequence: String,
    pub query_alignment_start: usize,
}

impl AlignedRead for ReadRecord {
    fn query_id(&self) -> &str {
        &self.query_id
    }

    fn cigar(&self) -> &str {
        &self.cigar
    }

    fn aligned_pairs(&self) -> &[AlignedPair] {
        &self.aligned_pairs
    }

    fn query_alignment_sequence(&self) -> &str {
        &self.query_alignment_sequence
    }

    fn query_alignment_start(&self) -> usize {
        self.query_alignment_start
    }
}

/// A row of the per-base alignment table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlignedBase {
    pub query_id: String,
    pub cigar: String,
    pub read_position: Option<usize>,
    pub reference_position: Option<i64>,
    pub reference_base: Option<char>,
    pub read_base: Option<char>,
}

impl AlignedBase {
    pub fn is_insertion(&self) -> bool {
        self.reference_position.is_none()
    }

    pub fn is_deletion(&self) -> bool {
        self.read_position.is_none()
    }

    /// True if the read this base belongs to has an insertion or deletion anywhere
    pub fn has_indel(&self) -> bool {
        contains_indel(&self.cigar)
    }
}

/// The per-base table of all reads in a region
///
/// This is the entry point of the pipeline. Every derived table is computed
/// from it and it is never modified after construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignmentTable {
    rows: Vec<AlignedBase>,
}

impl AlignmentTable {
    /// Decompose reads into per-base rows and keep those inside `region`
    pub fn from_reads<R: AlignedRead>(reads: &[R], region: &Region) -> Result<Self, TableError> {
        let mut rows = Vec::new();
        for read in reads {
            let sequence = read.query_alignment_sequence().as_bytes();
            let offset = read.query_alignment_start();
            for pair in read.aligned_pairs() {
                let reference_position = match pair.reference_position {
                    Some(position) if region.contains(position) => position,
                    _ => continue,
                };
                let read_base = match pair.read_position {
                    Some(read_position) => {
                        let base = read_position
                            .checked_sub(offset)
                            .and_then(|i| sequence.get(i))
                            .ok_or_else(|| TableError::MalformedRead {
                                query_id: read.query_id().to_string(),
                                read_position,
                            })?;
                        Some(base.to_ascii_uppercase() as char)
                    }
                    None => None,
                };
                rows.push(AlignedBase {
                    query_id: read.query_id().to_string(),
                    cigar: read.cigar().to_string(),
                    read_position: pair.read_position,
                    reference_position: Some(reference_position),
                    reference_base: pair.reference_base.map(|c| c.to_ascii_uppercase()),
                    read_base,
                });
            }
        }
        debug!(
            "Built alignment table for {} with {} rows from {} reads",
            region,
            rows.len(),
            reads.len()
        );
        Self::from_rows(rows)
    }

    /// Wrap already materialized rows, checking that no row occurs twice
    pub fn from_rows(rows: Vec<AlignedBase>) -> Result<Self, TableError> {
        check_unique(&rows)?;
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[AlignedBase] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of reads whose CIGAR has no insertion or deletion
    pub fn without_indels(&self) -> AlignmentTable {
        let rows: Vec<AlignedBase> = self
            .rows
            .iter()
            .filter(|row| !row.has_indel())
            .cloned()
            .collect();
        AlignmentTable { rows }
    }

    /// Distinct reference positions, ascending
    pub fn positions(&self) -> Vec<i64> {
        let positions: HashSet<i64> = self
            .rows
            .iter()
            .filter_map(|row| row.reference_position)
            .collect();
        let mut positions: Vec<i64> = positions.into_iter().collect();
        positions.sort_unstable();
        positions
    }

    /// The reference base at each covered position, ascending by position
    ///
    /// Fails if two rows disagree on the reference base of a position.
    pub fn reference_sequence(&self) -> Result<Vec<(i64, char)>, TableError> {
        let mut reference: BTreeMap<i64, char> = BTreeMap::new();
        for row in &self.rows {
            if let (Some(position), Some(base)) = (row.reference_position, row.reference_base) {
                let known = *reference.entry(position).or_insert(base);
                if known != base {
                    return Err(TableError::JoinCardinality {
                        key: "reference_position",
                        expected: "one reference base per position",
                        observed: position.to_string(),
                    });
                }
            }
        }
        Ok(reference.into_iter().collect())
    }

    /// Fails unless the covered reference positions form a gap-free range
    pub fn check_contiguous(&self) -> Result<(), TableError> {
        check_contiguous(&self.positions())
    }

    /// Rows whose reference position lies inside `region`
    pub fn within(&self, region: &Region) -> AlignmentTable {
        let rows: Vec<AlignedBase> = self
            .rows
            .iter()
            .filter(|row| matches!(row.reference_position, Some(p) if region.contains(p)))
            .cloned()
            .collect();
        AlignmentTable { rows }
    }

    pub fn coverage(&self) -> Vec<CoverageRow> {
        coverage::aggregate(self)
    }

    pub fn nucleotide_mutations(&self) -> Vec<NucleotideMutationRow> {
        nucleotide::count(self)
    }

    /// See [`codon::assemble`]
    pub fn codon_mutations(&self, origin: Option<i64>) -> Result<Vec<CodonMutationRow>, TableError> {
        codon::assemble(self, origin)
    }
}

/// `positions` must be sorted and free of duplicates
pub(crate) fn check_contiguous(positions: &[i64]) -> Result<(), TableError> {
    if let (Some(&min), Some(&max)) = (positions.first(), positions.last()) {
        if (max - min + 1) as usize != positions.len() {
            return Err(TableError::Contiguity {
                min,
                max,
                distinct: positions.len(),
            });
        }
    }
    Ok(())
}

fn check_unique(rows: &[AlignedBase]) -> Result<(), TableError> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut first_duplicate: Option<&AlignedBase> = None;
    let mut count = 0;
    for row in rows {
        let key = (
            row.query_id.as_str(),
            row.cigar.as_str(),
            row.read_position,
            row.reference_position,
        );
        if !seen.insert(key) {
            count += 1;
            first_duplicate.get_or_insert(row);
        }
    }
    match first_duplicate {
        None => Ok(()),
        Some(row) => Err(TableError::DuplicateRows {
            count,
            query_id: row.query_id.clone(),
            reference_position: row.reference_position,
        }),
    }
}
