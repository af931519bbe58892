/// Symbol alphabets recognized by sidecar entries
///
/// Purely informational: the virtualization core moves raw bytes and never
/// consults the alphabet, but records carry one so consumers can interpret
/// and validate the symbols they read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Alphabet {
    #[default]
    Dna,
    Rna,
    Protein,
}

impl Alphabet {
    /// Canonical display name, as stored alongside records
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dna => "DNA",
            Self::Rna => "RNA",
            Self::Protein => "Protein",
        }
    }

    /// Resolves an alphabet from its display name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "DNA" => Some(Self::Dna),
            "RNA" => Some(Self::Rna),
            "PROTEIN" => Some(Self::Protein),
            _ => None,
        }
    }

    /// Single-byte code used in the serialized sidecar form
    #[must_use]
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Dna => 0,
            Self::Rna => 1,
            Self::Protein => 2,
        }
    }

    pub(crate) fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Dna),
            1 => Some(Self::Rna),
            2 => Some(Self::Protein),
            _ => None,
        }
    }

    /// Whether `symbol` is a member of the alphabet (case-insensitive,
    /// including the ambiguity placeholder and the gap symbol).
    #[must_use]
    pub fn contains(&self, symbol: u8) -> bool {
        let upper = symbol.to_ascii_uppercase();
        match self {
            Self::Dna => matches!(upper, b'A' | b'C' | b'G' | b'T' | b'N' | b'-'),
            Self::Rna => matches!(upper, b'A' | b'C' | b'G' | b'U' | b'N' | b'-'),
            Self::Protein => upper == b'-' || upper == b'X' || AMINO_ACIDS.contains(&upper),
        }
    }

    /// Looks up the display character for a symbol byte, or `None` when the
    /// byte is not a member of the alphabet.
    #[must_use]
    pub fn lookup(&self, symbol: u8) -> Option<char> {
        if self.contains(symbol) {
            Some(symbol.to_ascii_uppercase() as char)
        } else {
            None
        }
    }
}

/// The 20 standard amino acid codes
const AMINO_ACIDS: [u8; 20] = [
    b'A', b'R', b'N', b'D', b'C', b'Q', b'E', b'G', b'H', b'I', b'L', b'K', b'M', b'F', b'P', b'S',
    b'T', b'W', b'Y', b'V',
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trip() {
        for alphabet in [Alphabet::Dna, Alphabet::Rna, Alphabet::Protein] {
            assert_eq!(Alphabet::from_name(alphabet.name()), Some(alphabet));
            assert_eq!(Alphabet::from_code(alphabet.code()), Some(alphabet));
        }
        assert_eq!(Alphabet::from_name("dna"), Some(Alphabet::Dna));
        assert_eq!(Alphabet::from_name("unknown"), None);
        assert_eq!(Alphabet::from_code(9), None);
    }

    #[test]
    fn membership() {
        assert!(Alphabet::Dna.contains(b'a'));
        assert!(Alphabet::Dna.contains(b'N'));
        assert!(!Alphabet::Dna.contains(b'U'));
        assert!(Alphabet::Rna.contains(b'U'));
        assert!(!Alphabet::Rna.contains(b'T'));
        assert!(Alphabet::Protein.contains(b'W'));
        assert!(!Alphabet::Protein.contains(b'B'));
        assert_eq!(Alphabet::Dna.lookup(b'g'), Some('G'));
        assert_eq!(Alphabet::Dna.lookup(b'Z'), None);
    }
}
