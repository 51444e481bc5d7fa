//! BAI-style binning entries over CRAM slices.
//!
//! CRAM streams can also be indexed with the classic SAM binning scheme:
//! each slice contributes a bin computed from its alignment interval and a
//! chunk given by its byte coordinates.

use noodles_core::Position;

use crate::{
    container::{ReferenceContext, Slice},
    error::{Error, Result},
};

/// A binning index entry for one slice.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    reference_sequence_id: usize,
    bin: usize,
    chunk_start: u64,
    chunk_end: u64,
}

impl Entry {
    /// Derives the entry for a single-reference slice.
    ///
    /// The slice's indexing parameters must have been back-filled by
    /// container serialization; otherwise this fails with
    /// [`Error::InvalidState`], as does a non-single-reference slice.
    pub fn from_slice(slice: &Slice, container_byte_offset: u64) -> Result<Self> {
        let index = slice
            .index()
            .ok_or(Error::InvalidState("slice indexing parameters are uninitialized"))?;

        let context = slice.header().alignment_context();

        let ReferenceContext::Single(reference_sequence_id) = context.reference_context() else {
            return Err(Error::InvalidState(
                "binning entries require a single-reference slice",
            ));
        };

        let start = context
            .alignment_start()
            .ok_or(Error::InvalidState("slice has no alignment start"))?;

        let end = context.alignment_end().unwrap_or(start);

        let chunk_start = container_byte_offset + index.byte_offset as u64;
        let chunk_end = chunk_start + index.byte_size as u64;

        Ok(Self {
            reference_sequence_id,
            bin: reg2bin(start, end),
            chunk_start,
            chunk_end,
        })
    }

    /// Returns the reference sequence ID.
    pub fn reference_sequence_id(&self) -> usize {
        self.reference_sequence_id
    }

    /// Returns the bin number.
    pub fn bin(&self) -> usize {
        self.bin
    }

    /// Returns the byte offset of the chunk start.
    pub fn chunk_start(&self) -> u64 {
        self.chunk_start
    }

    /// Returns the byte offset of the chunk end.
    pub fn chunk_end(&self) -> u64 {
        self.chunk_end
    }
}

/// Computes the bin of a 1-based closed interval using the classic SAM
/// binning scheme (§ 5.3 "C source code for computing bin number and
/// overlapping bins").
pub fn reg2bin(alignment_start: Position, alignment_end: Position) -> usize {
    // 0-based half-open
    let beg = usize::from(alignment_start) - 1;
    let end = usize::from(alignment_end);

    if beg >> 14 == (end - 1) >> 14 {
        ((1 << 15) - 1) / 7 + (beg >> 14)
    } else if beg >> 17 == (end - 1) >> 17 {
        ((1 << 12) - 1) / 7 + (beg >> 17)
    } else if beg >> 20 == (end - 1) >> 20 {
        ((1 << 9) - 1) / 7 + (beg >> 20)
    } else if beg >> 23 == (end - 1) >> 23 {
        ((1 << 6) - 1) / 7 + (beg >> 23)
    } else if beg >> 26 == (end - 1) >> 26 {
        ((1 << 3) - 1) / 7 + (beg >> 26)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(n: usize) -> Position {
        Position::new(n).unwrap()
    }

    #[test]
    fn test_reg2bin() {
        // [1, 1]: the smallest 16 KiB bin
        assert_eq!(reg2bin(position(1), position(1)), 4681);

        // [1, 16384] stays in the first 16 KiB bin
        assert_eq!(reg2bin(position(1), position(16384)), 4681);

        // [16385, 16385] is the next 16 KiB bin
        assert_eq!(reg2bin(position(16385), position(16385)), 4682);

        // [1, 16385] spills into the 128 KiB level
        assert_eq!(reg2bin(position(1), position(16385)), 585);

        // a span crossing every level lands in bin 0
        assert_eq!(reg2bin(position(1), position(1 << 28)), 0);
    }
}
