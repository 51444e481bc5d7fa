//! Reference contexts and alignment contexts.

use std::cmp;

use noodles_core::Position;

use crate::error::{Error, Result};

/// The reference sequence ID written for unmapped-unplaced contexts.
pub const UNMAPPED_UNPLACED_ID: i32 = -1;

/// The reference sequence ID written for multi-reference contexts.
pub const MULTIPLE_REFERENCE_ID: i32 = -2;

/// A slice/container classifier: reads against a single reference sequence,
/// reads against several, or unplaced reads.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ReferenceContext {
    /// All records are aligned to the one reference sequence.
    Single(usize),
    /// Records are aligned to more than one reference sequence (or a mix of
    /// placed and unplaced).
    Multi,
    /// No record is placed.
    Unmapped,
}

impl ReferenceContext {
    pub(crate) fn from_id(id: i32) -> Result<Self> {
        match id {
            UNMAPPED_UNPLACED_ID => Ok(Self::Unmapped),
            MULTIPLE_REFERENCE_ID => Ok(Self::Multi),
            _ => usize::try_from(id)
                .map(Self::Single)
                .map_err(|_| Error::Malformed(format!("invalid reference sequence ID: {id}"))),
        }
    }

    pub(crate) fn id(&self) -> i32 {
        match self {
            Self::Single(id) => *id as i32,
            Self::Multi => MULTIPLE_REFERENCE_ID,
            Self::Unmapped => UNMAPPED_UNPLACED_ID,
        }
    }

    /// Returns whether this is a single-reference context.
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    /// Returns whether this is a multi-reference context.
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi)
    }
}

/// A reference context together with the alignment interval it covers.
///
/// Only a single-reference context carries a start and span; multi-reference
/// and unmapped contexts always report no interval.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AlignmentContext {
    reference_context: ReferenceContext,
    alignment_start: Option<Position>,
    alignment_span: usize,
}

impl AlignmentContext {
    /// Creates a single-reference context covering `[start, end]`.
    pub fn single(
        reference_sequence_id: usize,
        alignment_start: Position,
        alignment_end: Position,
    ) -> Self {
        let span = usize::from(alignment_end) - usize::from(alignment_start) + 1;

        Self {
            reference_context: ReferenceContext::Single(reference_sequence_id),
            alignment_start: Some(alignment_start),
            alignment_span: span,
        }
    }

    /// Creates a multi-reference context.
    pub fn multi() -> Self {
        Self {
            reference_context: ReferenceContext::Multi,
            alignment_start: None,
            alignment_span: 0,
        }
    }

    /// Creates an unmapped-unplaced context.
    pub fn unmapped() -> Self {
        Self {
            reference_context: ReferenceContext::Unmapped,
            alignment_start: None,
            alignment_span: 0,
        }
    }

    /// Returns the reference context.
    pub fn reference_context(&self) -> ReferenceContext {
        self.reference_context
    }

    /// Returns the alignment start (single-reference contexts only).
    pub fn alignment_start(&self) -> Option<Position> {
        self.alignment_start
    }

    /// Returns the alignment span (0 unless single-reference).
    pub fn alignment_span(&self) -> usize {
        self.alignment_span
    }

    /// Returns the inclusive alignment end (single-reference contexts only).
    pub fn alignment_end(&self) -> Option<Position> {
        let start = self.alignment_start?;

        if self.alignment_span == 0 {
            return None;
        }

        Position::new(usize::from(start) + self.alignment_span - 1)
    }

    /// Folds a record's placement into this context.
    ///
    /// A record on the same reference widens the interval; a record on a
    /// different reference, or mixing placed and unplaced records, collapses
    /// the context to multi-reference.
    pub fn update(
        &mut self,
        reference_sequence_id: Option<usize>,
        alignment_start: Option<Position>,
        alignment_end: Option<Position>,
    ) {
        *self = match (
            self.reference_context,
            reference_sequence_id,
            alignment_start,
            alignment_end,
        ) {
            (ReferenceContext::Single(id), Some(record_id), Some(start), Some(end))
                if id == record_id =>
            {
                let start = self.alignment_start.map_or(start, |s| cmp::min(s, start));
                let end = self.alignment_end().map_or(end, |e| cmp::max(e, end));
                Self::single(id, start, end)
            }
            (ReferenceContext::Single(..), ..) => Self::multi(),
            (ReferenceContext::Unmapped, None, ..) => Self::unmapped(),
            (ReferenceContext::Unmapped, Some(_), ..) => Self::multi(),
            (ReferenceContext::Multi, ..) => Self::multi(),
        }
    }

    /// Builds the context of a batch of records from scratch.
    pub fn from_placements<I>(placements: I) -> Self
    where
        I: IntoIterator<Item = (Option<usize>, Option<Position>, Option<Position>)>,
    {
        let mut placements = placements.into_iter();

        let mut context = match placements.next() {
            Some((Some(id), Some(start), Some(end))) => Self::single(id, start, end),
            Some(_) => Self::unmapped(),
            None => return Self::unmapped(),
        };

        for (id, start, end) in placements {
            context.update(id, start, end);
        }

        context
    }

    pub(crate) fn from_wire(id: i32, start: i64, span: i64) -> Result<Self> {
        match ReferenceContext::from_id(id)? {
            ReferenceContext::Single(reference_sequence_id) => {
                let alignment_start = usize::try_from(start)
                    .ok()
                    .and_then(Position::new)
                    .ok_or_else(|| {
                        Error::Malformed(format!("invalid alignment start: {start}"))
                    })?;

                let alignment_span = usize::try_from(span)
                    .map_err(|_| Error::Malformed(format!("invalid alignment span: {span}")))?;

                Ok(Self {
                    reference_context: ReferenceContext::Single(reference_sequence_id),
                    alignment_start: Some(alignment_start),
                    alignment_span,
                })
            }
            ReferenceContext::Multi => Ok(Self::multi()),
            ReferenceContext::Unmapped => Ok(Self::unmapped()),
        }
    }

    pub(crate) fn to_wire(self) -> (i32, i64, i64) {
        match self.reference_context {
            ReferenceContext::Single(_) => {
                let start = self.alignment_start.map(usize::from).unwrap_or_default();
                (
                    self.reference_context.id(),
                    start as i64,
                    self.alignment_span as i64,
                )
            }
            _ => (self.reference_context.id(), 0, 0),
        }
    }
}

impl Default for AlignmentContext {
    fn default() -> Self {
        Self::unmapped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(n: usize) -> Position {
        Position::new(n).unwrap()
    }

    #[test]
    fn test_update() {
        let mut context = AlignmentContext::single(0, position(8), position(13));
        context.update(Some(0), Some(position(5)), Some(position(21)));
        assert_eq!(context, AlignmentContext::single(0, position(5), position(21)));

        let mut context = AlignmentContext::single(0, position(8), position(13));
        context.update(None, None, None);
        assert_eq!(context, AlignmentContext::multi());

        let mut context = AlignmentContext::unmapped();
        context.update(Some(0), Some(Position::MIN), Some(Position::MIN));
        assert_eq!(context, AlignmentContext::multi());

        let mut context = AlignmentContext::unmapped();
        context.update(None, None, None);
        assert_eq!(context, AlignmentContext::unmapped());

        let mut context = AlignmentContext::multi();
        context.update(None, None, None);
        assert_eq!(context, AlignmentContext::multi());
    }

    #[test]
    fn test_alignment_end() {
        let context = AlignmentContext::single(1, position(2), position(6));
        assert_eq!(context.alignment_span(), 5);
        assert_eq!(context.alignment_end(), Some(position(6)));

        assert_eq!(AlignmentContext::multi().alignment_end(), None);
        assert_eq!(AlignmentContext::unmapped().alignment_end(), None);
    }

    #[test]
    fn test_wire_round_trip() -> Result<()> {
        let context = AlignmentContext::single(2, position(3), position(7));
        let (id, start, span) = context.to_wire();
        assert_eq!((id, start, span), (2, 3, 5));
        assert_eq!(AlignmentContext::from_wire(id, start, span)?, context);

        assert_eq!(
            AlignmentContext::from_wire(UNMAPPED_UNPLACED_ID, 0, 0)?,
            AlignmentContext::unmapped()
        );

        assert_eq!(
            AlignmentContext::from_wire(MULTIPLE_REFERENCE_ID, 0, 0)?,
            AlignmentContext::multi()
        );

        Ok(())
    }
}
