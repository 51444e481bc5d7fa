//! The base substitution matrix.

use std::{error, fmt};

/// A reference/read base as far as substitution coding is concerned.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Base {
    /// Adenine.
    A,
    /// Cytosine.
    C,
    /// Guanine.
    G,
    /// Thymine.
    T,
    /// Any other or unknown base.
    N,
}

/// All bases, in the canonical order used for matrix serialization.
pub(crate) const BASES: [Base; 5] = [Base::A, Base::C, Base::G, Base::T, Base::N];

/// An error returned when a byte is not a substitution base.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TryFromByteError(u8);

impl error::Error for TryFromByteError {}

impl fmt::Display for TryFromByteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid substitution base: {:#04x}", self.0)
    }
}

impl TryFrom<u8> for Base {
    type Error = TryFromByteError;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        match b.to_ascii_uppercase() {
            b'A' => Ok(Self::A),
            b'C' => Ok(Self::C),
            b'G' => Ok(Self::G),
            b'T' => Ok(Self::T),
            b'N' => Ok(Self::N),
            _ => Err(TryFromByteError(b)),
        }
    }
}

impl From<Base> for u8 {
    fn from(base: Base) -> Self {
        match base {
            Base::A => b'A',
            Base::C => b'C',
            Base::G => b'G',
            Base::T => b'T',
            Base::N => b'N',
        }
    }
}

impl From<Base> for usize {
    fn from(base: Base) -> Self {
        match base {
            Base::A => 0,
            Base::C => 1,
            Base::G => 2,
            Base::T => 3,
            Base::N => 4,
        }
    }
}

/// A 5 x 4 permutation table mapping each reference base to a ranked list of
/// substitute bases.
///
/// Both directions are precomputed at construction and immutable for the
/// container's lifetime: encode by `(reference base, read base) -> code` and
/// decode by `(reference base, code) -> read base`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SubstitutionMatrix {
    // substitutions[reference base][code] = read base
    substitutions: [[Base; 4]; 5],
    // codes[reference base][read base] = code (the diagonal is never used)
    codes: [[u8; 5]; 5],
}

impl SubstitutionMatrix {
    /// Builds a matrix ranking substitutes by observed frequency.
    ///
    /// Ties and unseen substitutions fall back to canonical base order, so a
    /// matrix built from no observations equals the default matrix.
    pub fn from_frequencies(frequencies: [[u64; 5]; 5]) -> Self {
        let mut substitutions = [[Base::N; 4]; 5];

        for (r, reference_base) in BASES.into_iter().enumerate() {
            let mut substitutes: Vec<Base> = BASES
                .into_iter()
                .filter(|&b| b != reference_base)
                .collect();

            // Sort is stable, so equal frequencies keep canonical order.
            substitutes.sort_by_key(|&b| std::cmp::Reverse(frequencies[r][usize::from(b)]));

            substitutions[r].copy_from_slice(&substitutes);
        }

        Self::from_substitutions(substitutions)
    }

    /// Returns the read base for a (reference base, code) pair.
    pub fn get(&self, reference_base: Base, code: u8) -> Base {
        self.substitutions[usize::from(reference_base)][usize::from(code & 0x03)]
    }

    /// Returns the code for a (reference base, read base) pair.
    ///
    /// The result is meaningless when the bases are equal: equal bases are
    /// not substitutions and are never encoded.
    pub fn find(&self, reference_base: Base, read_base: Base) -> u8 {
        self.codes[usize::from(reference_base)][usize::from(read_base)]
    }

    fn from_substitutions(substitutions: [[Base; 4]; 5]) -> Self {
        let mut codes = [[0; 5]; 5];

        for (r, row) in substitutions.iter().enumerate() {
            for (code, &read_base) in row.iter().enumerate() {
                codes[r][usize::from(read_base)] = code as u8;
            }
        }

        Self {
            substitutions,
            codes,
        }
    }

    pub(crate) fn from_wire(src: [u8; 5]) -> Self {
        let mut substitutions = [[Base::N; 4]; 5];

        for (r, reference_base) in BASES.into_iter().enumerate() {
            for (i, substitute) in BASES
                .into_iter()
                .filter(|&b| b != reference_base)
                .enumerate()
            {
                let code = (src[r] >> (6 - 2 * i)) & 0x03;
                substitutions[r][usize::from(code)] = substitute;
            }
        }

        Self::from_substitutions(substitutions)
    }

    pub(crate) fn to_wire(&self) -> [u8; 5] {
        let mut dst = [0; 5];

        for (r, reference_base) in BASES.into_iter().enumerate() {
            for (i, substitute) in BASES
                .into_iter()
                .filter(|&b| b != reference_base)
                .enumerate()
            {
                dst[r] |= self.codes[r][usize::from(substitute)] << (6 - 2 * i);
            }
        }

        dst
    }
}

impl Default for SubstitutionMatrix {
    fn default() -> Self {
        Self::from_substitutions([
            [Base::C, Base::G, Base::T, Base::N],
            [Base::A, Base::G, Base::T, Base::N],
            [Base::A, Base::C, Base::T, Base::N],
            [Base::A, Base::C, Base::G, Base::N],
            [Base::A, Base::C, Base::G, Base::T],
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_codes() {
        let matrix = SubstitutionMatrix::default();

        assert_eq!(matrix.get(Base::A, 0), Base::C);
        assert_eq!(matrix.get(Base::A, 3), Base::N);
        assert_eq!(matrix.get(Base::N, 0), Base::A);

        assert_eq!(matrix.find(Base::C, Base::T), 2);
        assert_eq!(matrix.find(Base::T, Base::A), 0);
    }

    #[test]
    fn test_round_trip_for_every_pair() {
        let matrix = SubstitutionMatrix::default();

        for reference_base in BASES {
            for read_base in BASES {
                if reference_base == read_base {
                    continue;
                }

                let code = matrix.find(reference_base, read_base);
                assert_eq!(
                    matrix.get(reference_base, code),
                    read_base,
                    "({reference_base:?}, {read_base:?})"
                );
            }
        }
    }

    #[test]
    fn test_wire_round_trip() {
        let matrix = SubstitutionMatrix::default();
        // Each row ranks the four substitutes in canonical order: 00 01 10 11.
        assert_eq!(matrix.to_wire(), [0x1b; 5]);
        assert_eq!(SubstitutionMatrix::from_wire([0x1b; 5]), matrix);

        let mut frequencies = [[0; 5]; 5];
        frequencies[usize::from(Base::C)][usize::from(Base::T)] = 10;
        frequencies[usize::from(Base::C)][usize::from(Base::A)] = 5;

        let matrix = SubstitutionMatrix::from_frequencies(frequencies);
        assert_eq!(matrix.get(Base::C, 0), Base::T);
        assert_eq!(matrix.get(Base::C, 1), Base::A);
        assert_eq!(matrix.get(Base::C, 2), Base::G);

        let wire = matrix.to_wire();
        assert_eq!(SubstitutionMatrix::from_wire(wire), matrix);
    }

    #[test]
    fn test_frequency_ties_keep_canonical_order() {
        let matrix = SubstitutionMatrix::from_frequencies([[0; 5]; 5]);
        assert_eq!(matrix, SubstitutionMatrix::default());
    }
}
