use std::error::Error;
use std::fs;
use std::path::Path;

use tempfile::TempDir;

use mutfreq::io::{read_alignment_table, read_codon_table, write_map, write_tsv};
use mutfreq::{
    Aggregation, AlignedPair, AlignmentSource, AlignmentTable, AminoAcid, MapBuilder, MapColumn,
    MutationReport, MutationType, MutfreqError, PipelineOptions, ReadRecord, Region, Resolution,
    TableError,
};

/// Reference: ATG GCC TGG AAA starting at position 100
const REFERENCE: &str = "ATGGCCTGGAAA";
const START: i64 = 100;

fn read(id: &str, offset: usize, sequence: &str) -> ReadRecord {
    let aligned_pairs = (0..sequence.len())
        .map(|i| {
            let reference_index = offset + i;
            AlignedPair::new(
                Some(i),
                Some(START + reference_index as i64),
                REFERENCE.chars().nth(reference_index),
            )
        })
        .collect();
    ReadRecord {
        query_id: id.to_string(),
        cigar: format!("{}M", sequence.len()),
        aligned_pairs,
        query_alignment_sequence: sequence.to_string(),
        query_alignment_start: 0,
    }
}

/// Read with a 1 base deletion after its first 4 aligned bases
fn deletion_read(id: &str) -> ReadRecord {
    let mut aligned_pairs = Vec::new();
    let mut read_position = 0;
    for (i, base) in REFERENCE.chars().enumerate() {
        if i == 4 {
            aligned_pairs.push(AlignedPair::new(None, Some(START + i as i64), Some(base)));
        } else {
            aligned_pairs.push(AlignedPair::new(
                Some(read_position),
                Some(START + i as i64),
                Some(base),
            ));
            read_position += 1;
        }
    }
    ReadRecord {
        query_id: id.to_string(),
        cigar: "4M1D7M".to_string(),
        aligned_pairs,
        query_alignment_sequence: "TTTTTTTTTTT".to_string(),
        query_alignment_start: 0,
    }
}

fn reads() -> Vec<ReadRecord> {
    vec![
        read("wt1", 0, "ATGGCCTGGAAA"),
        read("wt2", 0, "ATGGCCTGGAAA"),
        read("stop", 0, "ATGGCCTGAAAA"),
        read("missense", 0, "ATGGACTGGAAA"),
        // starts inside the second codon
        read("partial", 4, "CCTGGAAA"),
        deletion_read("del"),
    ]
}

fn options() -> PipelineOptions {
    PipelineOptions::new(Region::new("chr7", START, START + 11).unwrap())
}

struct VecSource(Vec<ReadRecord>);

#[derive(Debug)]
struct NoReads;

impl std::fmt::Display for NoReads {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no reads")
    }
}

impl std::error::Error for NoReads {}

impl AlignmentSource for VecSource {
    type Read = ReadRecord;
    type Error = NoReads;

    fn fetch(&mut self, _region: &Region) -> Result<Vec<ReadRecord>, NoReads> {
        if self.0.is_empty() {
            Err(NoReads)
        } else {
            Ok(self.0.clone())
        }
    }
}

#[test]
fn test_report() {
    let report = MutationReport::from_reads(&reads(), &options()).unwrap();

    // 4 full reads, 8 bases of the partial read and the deletion read
    assert_eq!(report.alignment.len(), 4 * 12 + 8 + 12);
    assert_eq!(report.alignment.without_indels().len(), 4 * 12 + 8);

    assert_eq!(report.coverage.len(), 12);
    let total: u32 = report.coverage.iter().map(|row| row.depth).sum();
    assert_eq!(total as usize, report.alignment.len());
    assert_eq!(report.coverage[0].depth, 5);
    assert_eq!(report.coverage[11].depth, 6);

    // the deletion read is all T but never counted
    assert!(report
        .nucleotide_mutations
        .iter()
        .all(|row| row.read_base != 'T' || row.reference_base == 'T'));
    for row in &report.nucleotide_mutations {
        assert_eq!(row.depth.is_none(), row.reference_base == row.read_base);
    }

    assert_eq!(report.frequencies.len(), report.nucleotide_mutations.len());
    let stop = report
        .frequencies
        .iter()
        .find(|row| row.reference_position == START + 8)
        .filter(|row| row.read_base == 'A')
        .unwrap();
    assert_eq!(stop.depth_mutation, Some(1));
    assert_eq!(stop.depth_total, 6);
    for frequency in report.frequencies.iter().filter_map(|row| row.frequency) {
        assert!(0.0 < frequency && frequency <= 1.0);
    }

    let codons: Vec<(i64, &str, &str, Option<u32>)> = report
        .codon_mutations
        .iter()
        .map(|row| {
            (
                row.reference_position,
                row.codon_reference.as_str(),
                row.codon_read.as_str(),
                row.depth,
            )
        })
        .collect();
    assert_eq!(
        codons,
        vec![
            (100, "ATG", "ATG", None),
            (103, "GCC", "GAC", Some(1)),
            (103, "GCC", "GCC", None),
            (106, "TGG", "TGA", Some(1)),
            (106, "TGG", "TGG", None),
            (109, "AAA", "AAA", None),
        ]
    );

    let effects: Vec<MutationType> = report
        .amino_acid_mutations
        .iter()
        .filter(|row| row.depth.is_some())
        .map(|row| row.mutation_type())
        .collect();
    assert_eq!(effects, vec![MutationType::Missense, MutationType::Nonsense]);
}

#[test]
fn test_fetch() {
    let mut source = VecSource(reads());
    let report = MutationReport::fetch(&mut source, &options()).unwrap();
    assert_eq!(report.coverage.len(), 12);

    let mut empty = VecSource(Vec::new());
    assert!(matches!(
        MutationReport::fetch(&mut empty, &options()),
        Err(MutfreqError::SourceError(_))
    ));
}

#[test]
fn test_gap_aborts_codon_assembly() {
    let reads = vec![read("a", 0, "ATGGC"), read("b", 7, "GGAAA")];
    let result = MutationReport::from_reads(&reads, &options());
    assert_eq!(
        result.err(),
        Some(TableError::Contiguity {
            min: 100,
            max: 111,
            distinct: 10
        })
    );
}

#[test]
fn test_maps() {
    let report = MutationReport::from_reads(&reads(), &options()).unwrap();

    let map = MapBuilder::new("depth", Aggregation::Sum)
        .map(&report.amino_acid_mutations)
        .unwrap();
    assert_eq!(map.resolution, Resolution::AminoAcid);
    let column = MapColumn {
        reference_position: Some(106),
        reference: "W".to_string(),
    };
    assert_eq!(map.get("*", &column), Some(1.0));
    assert_eq!(map.get("W", &column), Some(0.0));

    let submap = MapBuilder::new("frequency", Aggregation::Max)
        .submap(&report.frequencies)
        .unwrap();
    let column = MapColumn {
        reference_position: None,
        reference: "C".to_string(),
    };
    assert_eq!(submap.get("A", &column), Some(1.0 / 6.0));
}

#[test]
fn test_alignment_table_round_trip() {
    let dir = TempDir::new().expect("failed to create temporary directory");
    let report = MutationReport::from_reads(&reads(), &options()).unwrap();

    let path = dir.path().join("alignment.tsv");
    write_tsv(report.alignment.rows(), &path).unwrap();
    let table = read_alignment_table(&path).unwrap();
    assert_eq!(table, report.alignment);

    let again = MutationReport::from_table(table, &options()).unwrap();
    assert_eq!(again, report);
}

#[test]
fn test_read_alignment_table() {
    let dir = TempDir::new().expect("failed to create temporary directory");
    let path = dir.path().join("bases.tsv");
    fs::write(
        &path,
        "query_id\tcigar\tread_position\treference_position\treference_base\tread_base\n\
         r1\t2M1D1M\t0.0\t10.0\ta\ta\n\
         r1\t2M1D1M\t1.0\t11.0\tC\tT\n\
         r1\t2M1D1M\t\t12.0\tG\t\n\
         r1\t2M1D1M\t2.0\t13.0\tT\tT\n",
    )
    .unwrap();
    let table = read_alignment_table(&path).unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(table.rows()[0].reference_base, Some('A'));
    assert!(table.rows()[2].is_deletion());
    assert_eq!(table.rows()[2].read_base, None);
    assert!(table.without_indels().is_empty());

    fs::write(&path, "r1\t4M\t0\t10\tA\tA\nr1\t4M\t0\t10\tA\tA\n").unwrap();
    assert!(matches!(
        read_alignment_table(&path),
        Err(MutfreqError::TableError(TableError::DuplicateRows { count: 1, .. }))
    ));

    fs::write(&path, "r1\t4M\tx\t10\tA\tA\n").unwrap();
    assert!(matches!(
        read_alignment_table(&path),
        Err(MutfreqError::FileError(_))
    ));

    fs::write(&path, "r1\t4M\t-1\t10\tA\tA\n").unwrap();
    let error = read_alignment_table(&path).unwrap_err();
    assert!(matches!(error, MutfreqError::FileError(_)));
    let mut messages = Vec::new();
    let mut source: Option<&dyn Error> = Some(&error);
    while let Some(e) = source {
        messages.push(e.to_string());
        source = e.source();
    }
    assert!(
        messages.iter().any(|m| m.contains("non-negative read position")),
        "{:?}",
        messages
    );
}

#[test]
fn test_custom_codon_table() {
    let dir = TempDir::new().expect("failed to create temporary directory");
    let path = dir.path().join("codons.tsv");
    fs::write(&path, "# vertebrate mitochondrial\nTGA\tW\nTGG\tW\nGCC\tA\n").unwrap();
    let table = read_codon_table(&path).unwrap();
    assert_eq!(table.len(), 3);

    let options = options().codon_table(table);
    let report = MutationReport::from_reads(&reads(), &options).unwrap();
    let tga = report
        .amino_acid_mutations
        .iter()
        .find(|row| row.codon_read == "TGA")
        .unwrap();
    assert_eq!(tga.aa_read, Some(AminoAcid::Tryptophan));
    assert_eq!(tga.mutation_type(), MutationType::Synonymous);

    // GAC is not in the partial table
    let gac = report
        .amino_acid_mutations
        .iter()
        .find(|row| row.codon_read == "GAC")
        .unwrap();
    assert_eq!(gac.aa_reference, Some(AminoAcid::Alanine));
    assert_eq!(gac.aa_read, None);

    fs::write(&path, "TGAA\tW\n").unwrap();
    assert!(read_codon_table(&path).is_err());
}

#[test]
fn test_write_outputs() {
    let dir = TempDir::new().expect("failed to create temporary directory");
    let report = MutationReport::from_reads(&reads(), &options()).unwrap();
    let outdir = dir.path().join("out");
    report.write_tsv(&outdir).unwrap();

    for name in &[
        "alignment",
        "coverage",
        "nucleotide_mutations",
        "codon_mutations",
        "amino_acid_mutations",
        "frequencies",
    ] {
        assert!(Path::new(&outdir.join(format!("{}.tsv", name))).exists());
    }

    let frequencies = fs::read_to_string(outdir.join("frequencies.tsv")).unwrap();
    let header = frequencies.lines().next().unwrap();
    assert_eq!(
        header,
        "reference_position\treference_base\tread_base\tdepth_mutation\tdepth_total\tfrequency"
    );
    // wild type rows leave the masked cells empty
    assert!(frequencies.lines().any(|line| line == "100\tA\tA\t\t5\t"));

    let amino_acids = fs::read_to_string(outdir.join("amino_acid_mutations.tsv")).unwrap();
    assert!(amino_acids.lines().any(|line| line == "106\tTGG\tTGA\t1\tW\t*"));

    let map = MapBuilder::new("depth", Aggregation::Sum)
        .submap(&report.nucleotide_mutations)
        .unwrap();
    let map_path = outdir.join("submap.tsv");
    write_map(&map, &map_path).unwrap();
    let text = fs::read_to_string(&map_path).unwrap();
    assert_eq!(text.lines().next().unwrap(), "read_base\tA\tC\tG\tT");
}

#[test]
fn test_empty_alignment() {
    let table = AlignmentTable::default();
    let report = MutationReport::from_table(table, &options()).unwrap();
    assert!(report.coverage.is_empty());
    assert!(report.codon_mutations.is_empty());
    assert!(report.frequencies.is_empty());
}
