//! Cross-tabulation of long-format tables into substitution matrices.
//!
//! A map has one row per read label (read base, read codon or read amino acid)
//! and one column per (reference position, reference label). A submap drops
//! the position so that each column is just a reference label, summarizing
//! the whole region. Cells without observations are filled with zero.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::amino_acid::AminoAcidMutationRow;
use crate::codon::CodonMutationRow;
use crate::coverage::CoverageRow;
use crate::error::TableError;
use crate::frequency::FrequencyRow;
use crate::nucleotide::NucleotideMutationRow;

/// The level at which substitutions are tabulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    Nucleotide,
    Codon,
    AminoAcid,
}

impl Resolution {
    pub fn reference_column(&self) -> &'static str {
        match self {
            Self::Nucleotide => "reference_base",
            Self::Codon => "codon_reference",
            Self::AminoAcid => "aa_reference",
        }
    }

    pub fn read_column(&self) -> &'static str {
        match self {
            Self::Nucleotide => "read_base",
            Self::Codon => "codon_read",
            Self::AminoAcid => "aa_read",
        }
    }

    /// The finest-grained meaning a table schema supports.
    ///
    /// Amino acid columns win over codon columns, which win over nucleotide columns.
    pub fn infer(columns: &[&'static str]) -> Result<Self, TableError> {
        [Self::AminoAcid, Self::Codon, Self::Nucleotide]
            .iter()
            .copied()
            .find(|resolution| columns.contains(&resolution.reference_column()))
            .ok_or_else(|| TableError::UnrecognizedColumns {
                columns: columns.to_vec(),
            })
    }
}

/// A long-format table row that can be pivoted
pub trait LongTable {
    /// All columns, in output order
    const COLUMNS: &'static [&'static str];
    /// Columns with numeric values that can be aggregated
    const VALUE_COLUMNS: &'static [&'static str];

    fn reference_position(&self) -> i64;

    /// The cell of a label column, `None` if the cell or the column is absent
    fn label(&self, column: &str) -> Option<String>;

    /// The cell of a value column, `None` if the cell or the column is absent
    fn value(&self, column: &str) -> Option<f64>;

    fn resolution() -> Result<Resolution, TableError> {
        Resolution::infer(Self::COLUMNS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregation {
    Sum,
    Count,
    Mean,
    Min,
    Max,
}

impl Aggregation {
    /// Absent values are skipped; `None` if nothing is left
    fn apply(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return match self {
                Self::Sum | Self::Count => Some(0.0),
                _ => None,
            };
        }
        Some(match self {
            Self::Sum => values.iter().sum(),
            Self::Count => values.len() as f64,
            Self::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Self::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MapColumn {
    /// `None` in a submap
    pub reference_position: Option<i64>,
    pub reference: String,
}

/// A read label by (position, reference label) matrix
#[derive(Debug, Clone, PartialEq)]
pub struct SubstitutionMap {
    pub resolution: Resolution,
    pub value_column: String,
    columns: Vec<MapColumn>,
    rows: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl SubstitutionMap {
    pub fn columns(&self) -> &[MapColumn] {
        &self.columns
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Row-major cell values
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn get(&self, row: &str, column: &MapColumn) -> Option<f64> {
        let i = self.rows.iter().position(|r| r == row)?;
        let j = self.columns.iter().position(|c| c == column)?;
        Some(self.values[i][j])
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Builds maps and submaps from any `LongTable`
#[derive(Debug, Clone)]
pub struct MapBuilder {
    value_column: String,
    aggregation: Aggregation,
    resolution: Option<Resolution>,
}

impl MapBuilder {
    pub fn new(value_column: impl Into<String>, aggregation: Aggregation) -> Self {
        Self {
            value_column: value_column.into(),
            aggregation,
            resolution: None,
        }
    }

    /// Use this resolution instead of inferring it from the table's columns
    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// Position-resolved map
    pub fn map<T: LongTable>(&self, rows: &[T]) -> Result<SubstitutionMap, TableError> {
        self.pivot(rows, true)
    }

    /// Region-wide map without the position axis
    pub fn submap<T: LongTable>(&self, rows: &[T]) -> Result<SubstitutionMap, TableError> {
        self.pivot(rows, false)
    }

    fn pivot<T: LongTable>(
        &self,
        rows: &[T],
        by_position: bool,
    ) -> Result<SubstitutionMap, TableError> {
        let resolution = match self.resolution {
            Some(resolution) => {
                if !T::COLUMNS.contains(&resolution.reference_column()) {
                    return Err(TableError::UnrecognizedColumns {
                        columns: T::COLUMNS.to_vec(),
                    });
                }
                resolution
            }
            None => T::resolution()?,
        };
        if !T::VALUE_COLUMNS.iter().any(|c| *c == self.value_column) {
            return Err(TableError::UnknownValueColumn {
                column: self.value_column.clone(),
            });
        }
        // tables without a read column (coverage) get a single row named after the value
        let has_read_column = T::COLUMNS.contains(&resolution.read_column());

        let mut cells: BTreeMap<(String, MapColumn), Vec<f64>> = BTreeMap::new();
        for row in rows {
            let reference = match row.label(resolution.reference_column()) {
                Some(reference) => reference,
                None => continue,
            };
            let read = if has_read_column {
                match row.label(resolution.read_column()) {
                    Some(read) => read,
                    None => continue,
                }
            } else {
                self.value_column.clone()
            };
            let column = MapColumn {
                reference_position: if by_position {
                    Some(row.reference_position())
                } else {
                    None
                },
                reference,
            };
            let values = cells.entry((read, column)).or_insert_with(Vec::new);
            if let Some(value) = row.value(&self.value_column) {
                values.push(value);
            }
        }

        let row_labels: Vec<String> = cells
            .keys()
            .map(|(read, _)| read.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let columns: Vec<MapColumn> = cells
            .keys()
            .map(|(_, column)| column.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mut values = vec![vec![0.0; columns.len()]; row_labels.len()];
        for ((read, column), cell) in &cells {
            // both searches succeed, the labels were collected from `cells`
            if let (Ok(i), Ok(j)) = (row_labels.binary_search(read), columns.binary_search(column)) {
                values[i][j] = self.aggregation.apply(cell).unwrap_or(0.0);
            }
        }

        Ok(SubstitutionMap {
            resolution,
            value_column: self.value_column.clone(),
            columns,
            rows: row_labels,
            values,
        })
    }
}

impl LongTable for CoverageRow {
    const COLUMNS: &'static [&'static str] = &["reference_position", "reference_base", "depth"];
    const VALUE_COLUMNS: &'static [&'static str] = &["depth"];

    fn reference_position(&self) -> i64 {
        self.reference_position
    }

    fn label(&self, column: &str) -> Option<String> {
        match column {
            "reference_base" => Some(self.reference_base.to_string()),
            _ => None,
        }
    }

    fn value(&self, column: &str) -> Option<f64> {
        match column {
            "depth" => Some(self.depth as f64),
            _ => None,
        }
    }
}

impl LongTable for NucleotideMutationRow {
    const COLUMNS: &'static [&'static str] = &[
        "reference_position",
        "reference_base",
        "read_base",
        "depth",
    ];
    const VALUE_COLUMNS: &'static [&'static str] = &["depth"];

    fn reference_position(&self) -> i64 {
        self.reference_position
    }

    fn label(&self, column: &str) -> Option<String> {
        match column {
            "reference_base" => Some(self.reference_base.to_string()),
            "read_base" => Some(self.read_base.to_string()),
            _ => None,
        }
    }

    fn value(&self, column: &str) -> Option<f64> {
        match column {
            "depth" => self.depth.map(f64::from),
            _ => None,
        }
    }
}

impl LongTable for CodonMutationRow {
    const COLUMNS: &'static [&'static str] = &[
        "reference_position",
        "codon_reference",
        "codon_read",
        "depth",
    ];
    const VALUE_COLUMNS: &'static [&'static str] = &["depth"];

    fn reference_position(&self) -> i64 {
        self.reference_position
    }

    fn label(&self, column: &str) -> Option<String> {
        match column {
            "codon_reference" => Some(self.codon_reference.clone()),
            "codon_read" => Some(self.codon_read.clone()),
            _ => None,
        }
    }

    fn value(&self, column: &str) -> Option<f64> {
        match column {
            "depth" => self.depth.map(f64::from),
            _ => None,
        }
    }
}

impl LongTable for AminoAcidMutationRow {
    const COLUMNS: &'static [&'static str] = &[
        "reference_position",
        "codon_reference",
        "codon_read",
        "depth",
        "aa_reference",
        "aa_read",
    ];
    const VALUE_COLUMNS: &'static [&'static str] = &["depth"];

    fn reference_position(&self) -> i64 {
        self.reference_position
    }

    fn label(&self, column: &str) -> Option<String> {
        match column {
            "codon_reference" => Some(self.codon_reference.clone()),
            "codon_read" => Some(self.codon_read.clone()),
            "aa_reference" => self.aa_reference.map(|aa| aa.symbol().to_string()),
            "aa_read" => self.aa_read.map(|aa| aa.symbol().to_string()),
            _ => None,
        }
    }

    fn value(&self, column: &str) -> Option<f64> {
        match column {
            "depth" => self.depth.map(f64::from),
            _ => None,
        }
    }
}

impl LongTable for FrequencyRow {
    const COLUMNS: &'static [&'static str] = &[
        "reference_position",
        "reference_base",
        "read_base",
        "depth_mutation",
        "depth_total",
        "frequency",
    ];
    const VALUE_COLUMNS: &'static [&'static str] = &["depth_mutation", "depth_total", "frequency"];

    fn reference_position(&self) -> i64 {
        self.reference_position
    }

    fn label(&self, column: &str) -> Option<String> {
        match column {
            "reference_base" => Some(self.reference_base.to_string()),
            "read_base" => Some(self.read_base.to_string()),
            _ => None,
        }
    }

    fn value(&self, column: &str) -> Option<f64> {
        match column {
            "depth_mutation" => self.depth_mutation.map(f64::from),
            "depth_total" => Some(self.depth_total as f64),
            "frequency" => self.frequency,
            _ => None,
        }
    }
}
