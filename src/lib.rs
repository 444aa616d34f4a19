//! Mutation statistics from aligned reads.
//!
//! Starting from a per-base alignment table (one row per aligned base of every
//! read in a region), this crate derives read coverage, nucleotide and codon
//! substitution counts, amino acid substitutions and per-base mutation
//! frequencies, and pivots any of them into substitution maps.
//!
//! Reading alignment files is left to the caller: implement [`AlignedRead`]
//! (or fill in [`ReadRecord`]s) and hand the reads to [`AlignmentTable::from_reads`]
//! or [`MutationReport::from_reads`].
//!
//! Every derived table distinguishes a missing row (nothing observed) from a
//! row with an absent value (observed, but wild type and therefore not counted
//! as a mutation).

mod alignment;
mod amino_acid;
pub mod cigar;
pub mod codon;
pub mod coverage;
pub mod error;
pub mod frequency;
pub mod io;
pub mod map;
mod mutation;
pub mod nucleotide;
mod pipeline;
mod region;

pub use crate::alignment::{
    AlignedBase, AlignedPair, AlignedRead, AlignmentSource, AlignmentTable, ReadRecord,
};
pub use crate::amino_acid::{translate_rows, AminoAcid, AminoAcidMutationRow, CodonTable};
pub use crate::codon::{CodonMutationRow, CodonWindow};
pub use crate::coverage::CoverageRow;
pub use crate::error::{MutfreqError, TableError};
pub use crate::frequency::FrequencyRow;
pub use crate::map::{Aggregation, LongTable, MapBuilder, MapColumn, Resolution, SubstitutionMap};
pub use crate::mutation::MutationType;
pub use crate::nucleotide::NucleotideMutationRow;
pub use crate::pipeline::{MutationReport, PipelineOptions};
pub use crate::region::Region;
