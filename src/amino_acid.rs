use std::collections::HashMap;
use std::convert::TryFrom;

use log::info;
use serde::{Deserialize, Serialize};

use crate::codon::CodonMutationRow;
use crate::error::ParseError;
use crate::mutation::MutationType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "char", try_from = "char")]
pub enum AminoAcid {
    Alanine,
    Arginine,
    Asparagine,
    AsparticAcid,
    Cysteine,
    GlutamicAcid,
    Glutamine,
    Glycine,
    Histidine,
    Isoleucine,
    Leucine,
    Lysine,
    Methionine,
    Phenylalanine,
    Proline,
    Serine,
    Threonine,
    Tryptophan,
    Tyrosine,
    Valine,
    Stop,
}

impl AminoAcid {
    /// IUPAC one-letter code, `*` for stop
    pub fn symbol(&self) -> char {
        match self {
            Self::Alanine => 'A',
            Self::Arginine => 'R',
            Self::Asparagine => 'N',
            Self::AsparticAcid => 'D',
            Self::Cysteine => 'C',
            Self::GlutamicAcid => 'E',
            Self::Glutamine => 'Q',
            Self::Glycine => 'G',
            Self::Histidine => 'H',
            Self::Isoleucine => 'I',
            Self::Leucine => 'L',
            Self::Lysine => 'K',
            Self::Methionine => 'M',
            Self::Phenylalanine => 'F',
            Self::Proline => 'P',
            Self::Serine => 'S',
            Self::Threonine => 'T',
            Self::Tryptophan => 'W',
            Self::Tyrosine => 'Y',
            Self::Valine => 'V',
            Self::Stop => '*',
        }
    }
}

impl From<AminoAcid> for char {
    fn from(amino_acid: AminoAcid) -> char {
        amino_acid.symbol()
    }
}

impl TryFrom<char> for AminoAcid {
    type Error = ParseError;
    fn try_from(c: char) -> Result<Self, Self::Error> {
        Ok(match c.to_ascii_uppercase() {
            'A' => Self::Alanine,
            'R' => Self::Arginine,
            'N' => Self::Asparagine,
            'D' => Self::AsparticAcid,
            'C' => Self::Cysteine,
            'E' => Self::GlutamicAcid,
            'Q' => Self::Glutamine,
            'G' => Self::Glycine,
            'H' => Self::Histidine,
            'I' => Self::Isoleucine,
            'L' => Self::Leucine,
            'K' => Self::Lysine,
            'M' => Self::Methionine,
            'F' => Self::Phenylalanine,
            'P' => Self::Proline,
            'S' => Self::Serine,
            'T' => Self::Threonine,
            'W' => Self::Tryptophan,
            'Y' => Self::Tyrosine,
            'V' => Self::Valine,
            '*' => Self::Stop,
            _ => {
                return Err(ParseError::somewhere(
                    "one-letter amino acid code",
                    c.to_string(),
                ))
            }
        })
    }
}

const GENETIC_CODE: [AminoAcid; 64] = [
    AminoAcid::Lysine,        //AAA
    AminoAcid::Asparagine,    //AAC
    AminoAcid::Lysine,        //AAG
    AminoAcid::Asparagine,    //AAT
    AminoAcid::Threonine,     //ACA
    AminoAcid::Threonine,     //ACC
    AminoAcid::Threonine,     //ACG
    AminoAcid::Threonine,     //ACT
    AminoAcid::Arginine,      //AGA
    AminoAcid::Serine,        //AGC
    AminoAcid::Arginine,      //AGG
    AminoAcid::Serine,        //AGT
    AminoAcid::Isoleucine,    //ATA
    AminoAcid::Isoleucine,    //ATC
    AminoAcid::Methionine,    //ATG
    AminoAcid::Isoleucine,    //ATT
    AminoAcid::Glutamine,     //CAA
    AminoAcid::Histidine,     //CAC
    AminoAcid::Glutamine,     //CAG
    AminoAcid::Histidine,     //CAT
    AminoAcid::Proline,       //CCA
    AminoAcid::Proline,       //CCC
    AminoAcid::Proline,       //CCG
    AminoAcid::Proline,       //CCT
    AminoAcid::Arginine,      //CGA
    AminoAcid::Arginine,      //CGC
    AminoAcid::Arginine,      //CGG
    AminoAcid::Arginine,      //CGT
    AminoAcid::Leucine,       //CTA
    AminoAcid::Leucine,       //CTC
    AminoAcid::Leucine,       //CTG
    AminoAcid::Leucine,       //CTT
    AminoAcid::GlutamicAcid,  //GAA
    AminoAcid::AsparticAcid,  //GAC
    AminoAcid::GlutamicAcid,  //GAG
    AminoAcid::AsparticAcid,  //GAT
    AminoAcid::Alanine,       //GCA
    AminoAcid::Alanine,       //GCC
    AminoAcid::Alanine,       //GCG
    AminoAcid::Alanine,       //GCT
    AminoAcid::Glycine,       //GGA
    AminoAcid::Glycine,       //GGC
    AminoAcid::Glycine,       //GGG
    AminoAcid::Glycine,       //GGT
    AminoAcid::Valine,        //GTA
    AminoAcid::Valine,        //GTC
    AminoAcid::Valine,        //GTG
    AminoAcid::Valine,        //GTT
    AminoAcid::Stop,          //TAA
    AminoAcid::Tyrosine,      //TAC
    AminoAcid::Stop,          //TAG
    AminoAcid::Tyrosine,      //TAT
    AminoAcid::Serine,        //TCA
    AminoAcid::Serine,        //TCC
    AminoAcid::Serine,        //TCG
    AminoAcid::Serine,        //TCT
    AminoAcid::Stop,          //TGA
    AminoAcid::Cysteine,      //TGC
    AminoAcid::Tryptophan,    //TGG
    AminoAcid::Cysteine,      //TGT
    AminoAcid::Leucine,       //TTA
    AminoAcid::Phenylalanine, //TTC
    AminoAcid::Leucine,       //TTG
    AminoAcid::Phenylalanine, //TTT
];

const BASES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Translate a codon with the standard genetic code
fn translate(codon: &str) -> Option<AminoAcid> {
    if codon.len() == 3 {
        let mut index = 0;
        for c in codon.chars() {
            let v = match c {
                // translate to base 4
                'A' | 'a' => 0,
                'C' | 'c' => 1,
                'G' | 'g' => 2,
                'T' | 't' | 'U' | 'u' => 3,
                _ => return None,
            };
            index <<= 2; // times 4
            index += v;
        }
        Some(GENETIC_CODE[index])
    } else {
        None
    }
}

/// A codon to amino acid mapping
///
/// Tables do not need to cover all 64 codons. Codons missing from the table,
/// including any codon with an ambiguity character, translate to `None`.
/// Serialized as a flat `codon -> one-letter code` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "HashMap<String, AminoAcid>",
    into = "HashMap<String, AminoAcid>"
)]
pub struct CodonTable {
    codons: HashMap<String, AminoAcid>,
}

impl CodonTable {
    /// The standard genetic code (NCBI table 1)
    pub fn standard() -> Self {
        let codons = BASES
            .iter()
            .flat_map(|a| {
                BASES.iter().flat_map(move |b| {
                    BASES.iter().map(move |c| [*a, *b, *c].iter().collect::<String>())
                })
            })
            .filter_map(|codon| translate(&codon).map(|amino_acid| (codon, amino_acid)))
            .collect();
        Self { codons }
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, AminoAcid)>,
        S: AsRef<str>,
    {
        let codons = entries
            .into_iter()
            .map(|(codon, amino_acid)| (normalize(codon.as_ref()), amino_acid))
            .collect();
        Self { codons }
    }

    /// Look up a codon. Case is ignored and `U` is read as `T`.
    pub fn get(&self, codon: &str) -> Option<AminoAcid> {
        self.codons.get(&normalize(codon)).copied()
    }

    pub fn len(&self) -> usize {
        self.codons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codons.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.codons.len() == 64
    }
}

impl From<HashMap<String, AminoAcid>> for CodonTable {
    fn from(codons: HashMap<String, AminoAcid>) -> Self {
        Self::from_entries(codons)
    }
}

impl From<CodonTable> for HashMap<String, AminoAcid> {
    fn from(table: CodonTable) -> Self {
        table.codons
    }
}

impl Default for CodonTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn normalize(codon: &str) -> String {
    codon
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            'U' => 'T',
            other => other,
        })
        .collect()
}

/// A codon substitution together with the amino acids it encodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AminoAcidMutationRow {
    pub reference_position: i64,
    pub codon_reference: String,
    pub codon_read: String,
    pub depth: Option<u32>,
    pub aa_reference: Option<AminoAcid>,
    pub aa_read: Option<AminoAcid>,
}

impl AminoAcidMutationRow {
    pub fn mutation_type(&self) -> MutationType {
        MutationType::classify(self.aa_reference, self.aa_read)
    }
}

/// Attach amino acids to codon rows
///
/// Falls back to the standard genetic code if no table is given.
pub fn translate_rows(
    rows: &[CodonMutationRow],
    table: Option<&CodonTable>,
) -> Vec<AminoAcidMutationRow> {
    let standard;
    let table = match table {
        Some(table) => table,
        None => {
            info!("No codon table given, using the standard genetic code");
            standard = CodonTable::standard();
            &standard
        }
    };
    rows.iter()
        .map(|row| AminoAcidMutationRow {
            reference_position: row.reference_position,
            codon_reference: row.codon_reference.clone(),
            codon_read: row.codon_read.clone(),
            depth: row.depth,
            aa_reference: table.get(&row.codon_reference),
            aa_read: table.get(&row.codon_read),
        })
        .collect()
}
