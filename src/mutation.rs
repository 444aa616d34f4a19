use crate::amino_acid::AminoAcid;

/// The effect of a codon substitution on the protein
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MutationType {
    Unknown,
    Synonymous,
    Missense,
    Nonsense,
    StopLoss,
}

impl MutationType {
    /// Classify a substitution from `reference` to `read`.
    ///
    /// Codons that could not be translated are `Unknown`.
    pub fn classify(reference: Option<AminoAcid>, read: Option<AminoAcid>) -> Self {
        match (reference, read) {
            (Some(reference), Some(read)) => {
                if reference == read {
                    Self::Synonymous
                } else if reference == AminoAcid::Stop {
                    Self::StopLoss
                } else if read == AminoAcid::Stop {
                    Self::Nonsense
                } else {
                    Self::Missense
                }
            }
            _ => Self::Unknown,
        }
    }
}
