use noodles_core::Position;

use crate::{
    container::reference_context::{MULTIPLE_REFERENCE_ID, UNMAPPED_UNPLACED_ID},
    error::{Error, Result},
};

/// A CRAI entry: one slice reference context with its byte coordinates.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    reference_sequence_id: Option<usize>,
    alignment_start: Option<Position>,
    alignment_span: usize,
    offset: u64,
    landmark: u64,
    slice_size: u64,
}

impl Record {
    /// Creates an entry from wire-form fields.
    ///
    /// `reference_sequence_id` of -1 marks an unplaced entry; the
    /// multi-reference sentinel (-2) is rejected with
    /// [`Error::InvalidState`]: multi-reference slices must first be
    /// expanded into per-reference entries.
    pub fn try_new(
        reference_sequence_id: i32,
        alignment_start: i64,
        alignment_span: i64,
        offset: u64,
        landmark: u64,
        slice_size: u64,
    ) -> Result<Self> {
        let reference_sequence_id = match reference_sequence_id {
            MULTIPLE_REFERENCE_ID => {
                return Err(Error::InvalidState(
                    "CRAI entries cannot be built from a multi-reference context",
                ));
            }
            UNMAPPED_UNPLACED_ID => None,
            n => Some(usize::try_from(n).map_err(|_| {
                Error::Malformed(format!("invalid reference sequence ID: {n}"))
            })?),
        };

        let (alignment_start, alignment_span) = match reference_sequence_id {
            Some(_) => {
                let start = usize::try_from(alignment_start)
                    .ok()
                    .and_then(Position::new);

                let span = usize::try_from(alignment_span).map_err(|_| {
                    Error::Malformed(format!("invalid alignment span: {alignment_span}"))
                })?;

                (start, span)
            }
            // the alignment interval of unplaced entries is ignored
            None => (None, 0),
        };

        Ok(Self {
            reference_sequence_id,
            alignment_start,
            alignment_span,
            offset,
            landmark,
            slice_size,
        })
    }

    /// Returns the reference sequence ID (`None` for unplaced entries).
    pub fn reference_sequence_id(&self) -> Option<usize> {
        self.reference_sequence_id
    }

    /// Returns the 1-based alignment start.
    pub fn alignment_start(&self) -> Option<Position> {
        self.alignment_start
    }

    /// Returns the alignment span.
    pub fn alignment_span(&self) -> usize {
        self.alignment_span
    }

    /// Returns the absolute byte offset of the container.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the byte offset of the slice, measured from the start of the
    /// container body (the compression header block).
    pub fn landmark(&self) -> u64 {
        self.landmark
    }

    /// Returns the byte size of the slice's blocks.
    pub fn slice_size(&self) -> u64 {
        self.slice_size
    }
}
