use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::Serialize;

use crate::alignment::{check_contiguous, AlignmentTable};
use crate::error::TableError;

/// The codon window that `position` falls into, when windows start at `origin`
///
/// Windows are numbered from 1 and `origin` is the first base of window 1.
/// Positions left of the origin get windows 0, -1, ... This is the exact
/// integer form of `ceil(offset / 3 + eps)`, which gives the same result for
/// every `0 < eps < 1/3`.
pub fn codon_index(position: i64, origin: i64) -> i64 {
    (position - origin).div_euclid(3) + 1
}

/// One codon window of the reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodonWindow {
    pub codon_position: i64,
    /// First reference position of the window
    pub reference_position: i64,
    pub codon_reference: String,
}

impl CodonWindow {
    /// Windows at the edges of a region may cover fewer than 3 bases
    pub fn is_complete(&self) -> bool {
        self.codon_reference.len() == 3
    }
}

/// Number of indel-free reads that show `codon_read` where the reference has `codon_reference`
///
/// As with nucleotides, `depth` is `None` for observed wild type codons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodonMutationRow {
    /// First reference position of the codon window
    pub reference_position: i64,
    pub codon_reference: String,
    pub codon_read: String,
    pub depth: Option<u32>,
}

impl CodonMutationRow {
    pub fn is_wild_type(&self) -> bool {
        self.codon_reference == self.codon_read
    }
}

/// Split the covered reference into codon windows
///
/// `origin` sets the reading frame. Without it, the first covered position
/// starts the first codon. The covered positions must not have gaps.
pub fn codon_windows(
    table: &AlignmentTable,
    origin: Option<i64>,
) -> Result<Vec<CodonWindow>, TableError> {
    let reference = table.reference_sequence()?;
    let positions: Vec<i64> = reference.iter().map(|(position, _)| *position).collect();
    check_contiguous(&positions)?;

    let origin = match (origin, positions.first()) {
        (Some(origin), _) => origin,
        (None, Some(&first)) => first,
        (None, None) => return Ok(Vec::new()),
    };

    let mut windows: BTreeMap<i64, CodonWindow> = BTreeMap::new();
    for (position, base) in reference {
        let codon_position = codon_index(position, origin);
        windows
            .entry(codon_position)
            .or_insert_with(|| CodonWindow {
                codon_position,
                reference_position: position,
                codon_reference: String::with_capacity(3),
            })
            .codon_reference
            .push(base);
    }
    Ok(windows.into_values().collect())
}

/// Count codon substitutions per window
///
/// A read contributes to a window only if it has no indel and covers all
/// three bases of that window. Reads that only partially cover a window are
/// left out of it.
pub fn assemble(
    table: &AlignmentTable,
    origin: Option<i64>,
) -> Result<Vec<CodonMutationRow>, TableError> {
    let windows = codon_windows(table, origin)?;
    let window_of: HashMap<i64, &CodonWindow> = {
        let mut window_of = HashMap::new();
        for window in &windows {
            let offset = window.reference_position;
            for i in 0..window.codon_reference.len() as i64 {
                window_of.insert(offset + i, window);
            }
        }
        window_of
    };

    // (query_id, codon_position) -> bases of that read in that window
    let mut read_codons: BTreeMap<(&str, i64), Vec<(i64, Option<char>)>> = BTreeMap::new();
    for row in table.rows().iter().filter(|row| !row.has_indel()) {
        let position = match (row.reference_position, row.reference_base) {
            (Some(position), Some(_)) => position,
            _ => continue,
        };
        if let Some(window) = window_of.get(&position) {
            read_codons
                .entry((row.query_id.as_str(), window.codon_position))
                .or_insert_with(Vec::new)
                .push((position, row.read_base));
        }
    }

    let windows_by_index: HashMap<i64, &CodonWindow> =
        windows.iter().map(|w| (w.codon_position, w)).collect();
    let mut counts: BTreeMap<(i64, &str, String), u32> = BTreeMap::new();
    let mut partial = 0;
    for ((_, codon_position), mut bases) in read_codons {
        let window = windows_by_index[&codon_position];
        bases.sort_unstable_by_key(|(position, _)| *position);
        let spans_window = bases.len() == 3 && bases.windows(2).all(|w| w[0].0 < w[1].0);
        if !spans_window || !window.is_complete() {
            partial += 1;
            continue;
        }
        let codon_read: Option<String> = bases.iter().map(|(_, base)| *base).collect();
        match codon_read {
            Some(codon_read) => {
                *counts
                    .entry((
                        window.reference_position,
                        window.codon_reference.as_str(),
                        codon_read,
                    ))
                    .or_insert(0) += 1
            }
            None => partial += 1,
        }
    }
    debug!(
        "Dropped {} partially covered read codons out of {} windows",
        partial,
        windows.len()
    );

    let result: Vec<CodonMutationRow> = counts
        .into_iter()
        .map(|((reference_position, codon_reference, codon_read), depth)| {
            let depth = if codon_reference == codon_read {
                None
            } else {
                Some(depth)
            };
            CodonMutationRow {
                reference_position,
                codon_reference: codon_reference.to_string(),
                codon_read,
                depth,
            }
        })
        .collect();
    debug!("Codon mutation table has {} rows", result.len());
    Ok(result)
}
