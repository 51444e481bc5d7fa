//! Reference sequence sources.

use std::sync::Arc;

use md5::{Digest, Md5};
use noodles_core::Position;

use crate::error::{Error, Result};

/// A provider of reference sequence bases, keyed by reference sequence ID.
///
/// The codec consumes this interface; it does not read FASTA files itself.
pub trait ReferenceSource {
    /// Returns the bases of the given reference sequence.
    fn bases(&self, reference_sequence_id: usize) -> Result<Arc<[u8]>>;

    /// Returns the normalized MD5 digest of
    /// `[start, start + span)` on the given reference sequence.
    fn md5(&self, reference_sequence_id: usize, start: Position, span: usize) -> Result<[u8; 16]> {
        let bases = self.bases(reference_sequence_id)?;

        let i = usize::from(start) - 1;
        let end = i + span;

        let slab = bases.get(i..end).ok_or_else(|| {
            Error::InvalidState("reference interval out of bounds")
        })?;

        Ok(calculate_normalized_sequence_digest(slab))
    }
}

/// An in-memory reference source, mainly for tests and small references.
#[derive(Clone, Debug, Default)]
pub struct InMemoryReferenceSource {
    sequences: Vec<Arc<[u8]>>,
}

impl InMemoryReferenceSource {
    /// Creates a source from sequences in header order.
    pub fn new<I, B>(sequences: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        Self {
            sequences: sequences
                .into_iter()
                .map(|b| Arc::from(b.into().into_boxed_slice()))
                .collect(),
        }
    }
}

impl ReferenceSource for InMemoryReferenceSource {
    fn bases(&self, reference_sequence_id: usize) -> Result<Arc<[u8]>> {
        self.sequences
            .get(reference_sequence_id)
            .cloned()
            .ok_or(Error::InvalidState("unknown reference sequence ID"))
    }
}

// _Sequence Alignment/Map Format Specification_ § 1.3.2 "Reference MD5
// calculation"
pub(crate) fn calculate_normalized_sequence_digest(sequence: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();

    for &b in sequence {
        // "All characters outside of the inclusive range 33 ('!') to 126
        // ('~') are stripped out."
        if b.is_ascii_graphic() {
            // "All lowercase characters are converted to uppercase."
            hasher.update([b.to_ascii_uppercase()]);
        }
    }

    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_normalized_sequence_digest() {
        assert_eq!(
            calculate_normalized_sequence_digest(b"ACGT"),
            [
                0xf1, 0xf8, 0xf4, 0xbf, 0x41, 0x3b, 0x16, 0xad, 0x13, 0x57, 0x22, 0xaa, 0x45, 0x91,
                0x04, 0x3e
            ]
        );

        assert_eq!(
            calculate_normalized_sequence_digest(b"ACgt"),
            [
                0xf1, 0xf8, 0xf4, 0xbf, 0x41, 0x3b, 0x16, 0xad, 0x13, 0x57, 0x22, 0xaa, 0x45, 0x91,
                0x04, 0x3e
            ]
        );

        assert_eq!(
            calculate_normalized_sequence_digest(b"ACGTACGTACGTACGTACGTACGT...12345!!!"),
            [
                0xdf, 0xab, 0xdb, 0xb3, 0x6e, 0x23, 0x9a, 0x6d, 0xa8, 0x89, 0x57, 0x84, 0x1f, 0x32,
                0xb8, 0xe4
            ]
        );
    }

    #[test]
    fn test_in_memory_source() -> Result<()> {
        let source = InMemoryReferenceSource::new([b"ACGTACGT".to_vec()]);

        assert_eq!(&source.bases(0)?[..], b"ACGTACGT");
        assert!(source.bases(1).is_err());

        let digest = source.md5(0, Position::try_from(1).unwrap(), 4)?;
        assert_eq!(
            digest,
            [
                0xf1, 0xf8, 0xf4, 0xbf, 0x41, 0x3b, 0x16, 0xad, 0x13, 0x57, 0x22, 0xaa, 0x45, 0x91,
                0x04, 0x3e
            ]
        );

        Ok(())
    }
}
