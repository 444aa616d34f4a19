use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::alignment::AlignmentTable;

/// Number of indel-free reads showing `read_base` where the reference has `reference_base`
///
/// A row that exists was observed. `depth` is `None` when the row is wild type
/// (`reference_base == read_base`): the bases were seen, but are not a
/// mutation. Substitutions that were never observed have no row at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NucleotideMutationRow {
    pub reference_position: i64,
    pub reference_base: char,
    pub read_base: char,
    pub depth: Option<u32>,
}

impl NucleotideMutationRow {
    pub fn is_wild_type(&self) -> bool {
        self.reference_base == self.read_base
    }
}

/// Group indel-free rows by (position, reference base, read base) and count them,
/// before wild type masking
pub fn count_unmasked(table: &AlignmentTable) -> BTreeMap<(i64, char, char), u32> {
    let mut counts = BTreeMap::new();
    for row in table.rows().iter().filter(|row| !row.has_indel()) {
        if let (Some(position), Some(reference_base), Some(read_base)) =
            (row.reference_position, row.reference_base, row.read_base)
        {
            *counts
                .entry((position, reference_base, read_base))
                .or_insert(0) += 1;
        }
    }
    counts
}

pub fn count(table: &AlignmentTable) -> Vec<NucleotideMutationRow> {
    let result: Vec<NucleotideMutationRow> = count_unmasked(table)
        .into_iter()
        .map(
            |((reference_position, reference_base, read_base), depth)| NucleotideMutationRow {
                reference_position,
                reference_base,
                read_base,
                depth: if reference_base == read_base {
                    None
                } else {
                    Some(depth)
                },
            },
        )
        .collect();
    debug!("Nucleotide mutation table has {} rows", result.len());
    result
}
