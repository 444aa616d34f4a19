use std::fs::create_dir_all;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::alignment::{AlignedRead, AlignmentSource, AlignmentTable};
use crate::amino_acid::{translate_rows, AminoAcidMutationRow, CodonTable};
use crate::codon::CodonMutationRow;
use crate::coverage::CoverageRow;
use crate::error::{FileError, MutfreqError, TableError};
use crate::frequency::{normalize, FrequencyRow};
use crate::io::write_tsv;
use crate::nucleotide::NucleotideMutationRow;
use crate::region::Region;

/// What to analyse and how
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOptions {
    pub region: Region,
    /// First base of a codon. Defaults to the first covered position.
    #[serde(default)]
    pub codon_origin: Option<i64>,
    /// Defaults to the standard genetic code
    #[serde(default)]
    pub codon_table: Option<CodonTable>,
}

impl PipelineOptions {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            codon_origin: None,
            codon_table: None,
        }
    }

    pub fn codon_origin(mut self, origin: i64) -> Self {
        self.codon_origin = Some(origin);
        self
    }

    pub fn codon_table(mut self, table: CodonTable) -> Self {
        self.codon_table = Some(table);
        self
    }
}

/// Every table derived from one region
#[derive(Debug, Clone, PartialEq)]
pub struct MutationReport {
    pub region: Region,
    pub alignment: AlignmentTable,
    pub coverage: Vec<CoverageRow>,
    pub nucleotide_mutations: Vec<NucleotideMutationRow>,
    pub codon_mutations: Vec<CodonMutationRow>,
    pub amino_acid_mutations: Vec<AminoAcidMutationRow>,
    pub frequencies: Vec<FrequencyRow>,
}

impl MutationReport {
    /// Fetch the reads of the region from `source` and run all stages
    pub fn fetch<S: AlignmentSource>(
        source: &mut S,
        options: &PipelineOptions,
    ) -> Result<Self, MutfreqError> {
        let reads = source
            .fetch(&options.region)
            .map_err(|e| MutfreqError::SourceError(Box::new(e)))?;
        Ok(Self::from_reads(&reads, options)?)
    }

    pub fn from_reads<R: AlignedRead>(
        reads: &[R],
        options: &PipelineOptions,
    ) -> Result<Self, TableError> {
        let table = AlignmentTable::from_reads(reads, &options.region)?;
        Self::from_table(table, options)
    }

    /// Run all stages on a per-base table. Rows outside the region are dropped first.
    pub fn from_table(table: AlignmentTable, options: &PipelineOptions) -> Result<Self, TableError> {
        let alignment = table.within(&options.region);
        let coverage = alignment.coverage();
        let nucleotide_mutations = alignment.nucleotide_mutations();
        let codon_mutations = alignment.codon_mutations(options.codon_origin)?;
        let amino_acid_mutations = translate_rows(&codon_mutations, options.codon_table.as_ref());
        let frequencies = normalize(&nucleotide_mutations, &coverage)?;
        info!(
            "{}: {} aligned bases, {} covered positions, {} nucleotide, {} codon rows",
            options.region,
            alignment.len(),
            coverage.len(),
            nucleotide_mutations.len(),
            codon_mutations.len()
        );
        Ok(Self {
            region: options.region.clone(),
            alignment,
            coverage,
            nucleotide_mutations,
            codon_mutations,
            amino_acid_mutations,
            frequencies,
        })
    }

    /// Write every table as `<name>.tsv` into `outdir`
    pub fn write_tsv<P: AsRef<Path>>(&self, outdir: P) -> Result<(), FileError> {
        let outdir = outdir.as_ref();
        create_dir_all(outdir).map_err(|e| FileError::io(Some(outdir), e))?;
        write_tsv(self.alignment.rows(), outdir.join("alignment.tsv"))?;
        write_tsv(&self.coverage, outdir.join("coverage.tsv"))?;
        write_tsv(&self.nucleotide_mutations, outdir.join("nucleotide_mutations.tsv"))?;
        write_tsv(&self.codon_mutations, outdir.join("codon_mutations.tsv"))?;
        write_tsv(&self.amino_acid_mutations, outdir.join("amino_acid_mutations.tsv"))?;
        write_tsv(&self.frequencies, outdir.join("frequencies.tsv"))?;
        info!("Wrote tables for {} to {}", self.region, outdir.display());
        Ok(())
    }
}
