use std::collections::HashMap;

use log::debug;
use serde::Serialize;

use crate::coverage::CoverageRow;
use crate::error::TableError;
use crate::nucleotide::NucleotideMutationRow;

/// Mutation depth relative to the total depth at a position
///
/// `depth_mutation` and `frequency` are `None` for wild type rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    pub reference_position: i64,
    pub reference_base: char,
    pub read_base: char,
    pub depth_mutation: Option<u32>,
    pub depth_total: u32,
    pub frequency: Option<f64>,
}

/// Join mutation counts to coverage on (position, reference base)
///
/// Every mutation row must find exactly one coverage row. Mutation rows
/// without coverage are dropped.
pub fn normalize(
    mutations: &[NucleotideMutationRow],
    coverage: &[CoverageRow],
) -> Result<Vec<FrequencyRow>, TableError> {
    let mut depth_total: HashMap<(i64, char), u32> = HashMap::with_capacity(coverage.len());
    for row in coverage {
        let key = (row.reference_position, row.reference_base);
        if depth_total.insert(key, row.depth).is_some() {
            return Err(TableError::JoinCardinality {
                key: "(reference_position, reference_base)",
                expected: "many-to-one",
                observed: format!("({}, {})", key.0, key.1),
            });
        }
    }

    let mut result = Vec::with_capacity(mutations.len());
    for row in mutations {
        let total = match depth_total.get(&(row.reference_position, row.reference_base)) {
            Some(&total) => total,
            None => continue,
        };
        let wild_type = row.reference_base == row.read_base;
        let depth_mutation = if wild_type { None } else { row.depth };
        result.push(FrequencyRow {
            reference_position: row.reference_position,
            reference_base: row.reference_base,
            read_base: row.read_base,
            depth_mutation,
            depth_total: total,
            frequency: depth_mutation.map(|depth| depth as f64 / total as f64),
        });
    }
    debug!("Frequency table has {} rows", result.len());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mutation(position: i64, reference: char, read: char, depth: Option<u32>) -> NucleotideMutationRow {
        NucleotideMutationRow {
            reference_position: position,
            reference_base: reference,
            read_base: read,
            depth,
        }
    }

    fn coverage(position: i64, reference: char, depth: u32) -> CoverageRow {
        CoverageRow {
            reference_position: position,
            reference_base: reference,
            depth,
        }
    }

    #[test]
    fn test_normalize() {
        let mutations = vec![
            mutation(1, 'C', 'C', None),
            mutation(1, 'C', 'T', Some(2)),
            mutation(1, 'C', 'A', Some(1)),
            mutation(2, 'G', 'A', Some(5)),
            mutation(9, 'G', 'A', Some(5)),
        ];
        let coverage = vec![coverage(1, 'C', 8), coverage(2, 'G', 5)];
        let rows = normalize(&mutations, &coverage).unwrap();
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[0].depth_mutation, None);
        assert_eq!(rows[0].frequency, None);
        assert_eq!(rows[0].depth_total, 8);
        assert_eq!(rows[1].frequency, Some(0.25));
        assert_eq!(rows[2].frequency, Some(0.125));
        assert_eq!(rows[3].frequency, Some(1.0));

        for row in rows.iter().filter_map(|r| r.frequency) {
            assert!(0.0 < row && row <= 1.0);
        }
    }

    #[test]
    fn test_duplicate_coverage_is_fatal() {
        let mutations = vec![mutation(1, 'C', 'T', Some(2))];
        let coverage = vec![coverage(1, 'C', 8), coverage(1, 'C', 3)];
        assert!(matches!(
            normalize(&mutations, &coverage),
            Err(TableError::JoinCardinality { .. })
        ));
    }
}
