use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Value every threshold input starts from and is reset to.
pub const DEFAULT_THRESHOLD: &str = "50";

/// One analysis stage the backend can run, numbered 1 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Phase(u8);

impl Phase {
    pub const ALL: [Phase; 5] = [Phase(1), Phase(2), Phase(3), Phase(4), Phase(5)];

    pub fn new(number: u8) -> Option<Self> {
        (1..=5).contains(&number).then_some(Self(number))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Binary classification phases take a pair of class thresholds.
    pub fn requires_thresholds(self) -> bool {
        matches!(self.0, 1..=3)
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Virus vs Non-Virus",
            2 => "(+)ssRNA vs Other Viruses",
            3 => "Coronavirus vs Other (+)ssRNA",
            4 => "Coronavirus Species",
            _ => "SARS-CoV-2 Variants",
        }
    }

    /// Element id of threshold input `slot` (1 or 2).
    pub fn threshold_input_id(self, slot: u8) -> String {
        format!("phase{}_threshold{slot}", self.0)
    }

    /// Multipart field carrying the comma-joined threshold pair.
    pub fn thresholds_field(self) -> String {
        format!("phase{}_thresholds", self.0)
    }
}

impl FromStr for Phase {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| ParseError::Phase(s.to_string()))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SequenceType {
    #[default]
    Protein,
    Nucleotide,
}

impl SequenceType {
    pub const ALL: [SequenceType; 2] = [Self::Protein, Self::Nucleotide];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Protein => "protein",
            Self::Nucleotide => "nucleotide",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Protein => "Protein",
            Self::Nucleotide => "Nucleotide",
        }
    }
}

impl FromStr for SequenceType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "protein" => Self::Protein,
            "nucleotide" => Self::Nucleotide,
            _ => return Err(ParseError::SequenceType(s.to_string())),
        })
    }
}

/// Sequence database an accession id is looked up in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Database {
    #[default]
    Ncbi,
    Uniprot,
}

impl Database {
    pub const ALL: [Database; 2] = [Self::Ncbi, Self::Uniprot];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ncbi => "ncbi",
            Self::Uniprot => "uniprot",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ncbi => "NCBI",
            Self::Uniprot => "UniProt",
        }
    }
}

impl FromStr for Database {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ncbi" => Self::Ncbi,
            "uniprot" => Self::Uniprot,
            _ => return Err(ParseError::Database(s.to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_first_three_phases_take_thresholds() {
        let flagged: Vec<u8> = Phase::ALL
            .iter()
            .filter(|phase| phase.requires_thresholds())
            .map(|phase| phase.number())
            .collect();
        assert_eq!(flagged, vec![1, 2, 3]);
    }

    #[test]
    fn parses_checkbox_values() {
        assert_eq!("3".parse::<Phase>().ok(), Phase::new(3));
        assert!("0".parse::<Phase>().is_err());
        assert!("6".parse::<Phase>().is_err());
        assert!("all".parse::<Phase>().is_err());
    }

    #[test]
    fn names_threshold_controls_by_phase_number() {
        let phase = Phase::new(2).unwrap();
        assert_eq!(phase.threshold_input_id(1), "phase2_threshold1");
        assert_eq!(phase.threshold_input_id(2), "phase2_threshold2");
        assert_eq!(phase.thresholds_field(), "phase2_thresholds");
    }

    #[test]
    fn radio_defaults() {
        assert_eq!(SequenceType::default().as_str(), "protein");
        assert_eq!(Database::default().as_str(), "ncbi");
        assert_eq!("uniprot".parse::<Database>(), Ok(Database::Uniprot));
        assert!("embl".parse::<Database>().is_err());
    }
}
