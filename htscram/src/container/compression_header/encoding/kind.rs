/// An encoding ID, as serialized in the compression header.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Kind {
    /// No data (0).
    Null,
    /// One external block (1).
    External,
    /// Golomb coding (2).
    Golomb,
    /// Canonical Huffman coding (3).
    Huffman,
    /// A length encoding plus a value encoding (4).
    ByteArrayLength,
    /// An external block with a terminator byte (5).
    ByteArrayStop,
    /// Fixed-width binary with an offset (6).
    Beta,
    /// Sub-exponential coding (7).
    Subexp,
    /// Golomb-Rice coding (8).
    GolombRice,
    /// Elias gamma coding (9).
    Gamma,
}

impl Kind {
    pub(crate) fn from_id(n: i32) -> Option<Self> {
        match n {
            0 => Some(Self::Null),
            1 => Some(Self::External),
            2 => Some(Self::Golomb),
            3 => Some(Self::Huffman),
            4 => Some(Self::ByteArrayLength),
            5 => Some(Self::ByteArrayStop),
            6 => Some(Self::Beta),
            7 => Some(Self::Subexp),
            8 => Some(Self::GolombRice),
            9 => Some(Self::Gamma),
            _ => None,
        }
    }

    pub(crate) fn id(&self) -> i32 {
        match self {
            Self::Null => 0,
            Self::External => 1,
            Self::Golomb => 2,
            Self::Huffman => 3,
            Self::ByteArrayLength => 4,
            Self::ByteArrayStop => 5,
            Self::Beta => 6,
            Self::Subexp => 7,
            Self::GolombRice => 8,
            Self::Gamma => 9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids() {
        for n in 0..=9 {
            assert_eq!(Kind::from_id(n).map(|kind| kind.id()), Some(n));
        }

        assert!(Kind::from_id(10).is_none());
        assert!(Kind::from_id(-1).is_none());
    }
}
