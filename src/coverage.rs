use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::alignment::AlignmentTable;

/// Read depth at one reference position
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageRow {
    pub reference_position: i64,
    pub reference_base: char,
    pub depth: u32,
}

/// Count the rows observed at every (position, reference base)
///
/// Reads with indels count like any other. Rows without a reference base do
/// not contribute.
pub fn aggregate(table: &AlignmentTable) -> Vec<CoverageRow> {
    let mut counts: BTreeMap<(i64, char), u32> = BTreeMap::new();
    for row in table.rows() {
        if let (Some(position), Some(base)) = (row.reference_position, row.reference_base) {
            *counts.entry((position, base)).or_insert(0) += 1;
        }
    }
    let result: Vec<CoverageRow> = counts
        .into_iter()
        .map(|((reference_position, reference_base), depth)| CoverageRow {
            reference_position,
            reference_base,
            depth,
        })
        .collect();
    debug!("Coverage table has {} rows", result.len());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::tests::ungapped_read;
    use crate::alignment::{AlignedPair, ReadRecord};
    use crate::region::Region;

    #[test]
    fn test_aggregate() {
        let region = Region::new("chr1", 0, 10).unwrap();
        let reads = vec![
            ungapped_read("r1", 0, "ACGT", "ACGT"),
            ungapped_read("r2", 1, "CGT", "CCT"),
            ReadRecord {
                query_id: "r3".to_string(),
                cigar: "1M1D1M".to_string(),
                aligned_pairs: vec![
                    AlignedPair::new(Some(0), Some(1), Some('C')),
                    AlignedPair::new(None, Some(2), Some('G')),
                    AlignedPair::new(Some(1), Some(3), Some('T')),
                ],
                query_alignment_sequence: "CT".to_string(),
                query_alignment_start: 0,
            },
        ];
        let table = AlignmentTable::from_reads(&reads, &region).unwrap();
        let coverage = aggregate(&table);
        let depths: Vec<(i64, char, u32)> = coverage
            .iter()
            .map(|row| (row.reference_position, row.reference_base, row.depth))
            .collect();
        assert_eq!(
            depths,
            vec![(0, 'A', 1), (1, 'C', 3), (2, 'G', 3), (3, 'T', 3)]
        );

        // depth sums up to all rows that carry a reference base
        let total: u32 = coverage.iter().map(|row| row.depth).sum();
        let expected = table
            .rows()
            .iter()
            .filter(|row| row.reference_base.is_some())
            .count();
        assert_eq!(total as usize, expected);

        assert_eq!(aggregate(&table), coverage);
    }
}
