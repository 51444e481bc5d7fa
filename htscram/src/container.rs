//! CRAM containers: the top-level serialization unit.

pub mod block;
pub mod compression_header;
mod header;
pub(crate) mod reference_context;
pub mod slice;

pub use self::{
    block::Block,
    compression_header::CompressionHeader,
    header::Header,
    reference_context::{AlignmentContext, ReferenceContext},
    slice::Slice,
};
use crate::error::{Error, Result};

/// A container: a compression header plus one or more slices.
///
/// Containers are immutable once serialized; the byte offset is assigned by
/// the reader or writer that placed the container in a stream.
#[derive(Debug, PartialEq)]
pub struct Container {
    pub(crate) header: Header,
    pub(crate) compression_header: CompressionHeader,
    pub(crate) slices: Vec<Slice>,
    pub(crate) byte_offset: Option<u64>,
}

impl Container {
    /// Assembles a container from slices, inferring the aggregate reference
    /// context.
    ///
    /// All slices must agree: the same single reference sequence, all
    /// multi-reference, or all unmapped. Any other combination fails with
    /// [`Error::InvalidState`].
    pub fn try_new(
        compression_header: CompressionHeader,
        slices: Vec<Slice>,
        record_counter: u64,
        base_count: u64,
    ) -> Result<Self> {
        if slices.is_empty() {
            return Err(Error::InvalidState("container requires at least one slice"));
        }

        let alignment_context = infer_alignment_context(&slices)?;
        let record_count = slices.iter().map(|s| s.header().record_count()).sum();

        let header = Header {
            alignment_context,
            record_count,
            record_counter,
            base_count,
            block_count: 0,
            landmarks: Vec::new(),
        };

        Ok(Self {
            header,
            compression_header,
            slices,
            byte_offset: None,
        })
    }

    /// Returns the container header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the compression header.
    pub fn compression_header(&self) -> &CompressionHeader {
        &self.compression_header
    }

    /// Returns the slices.
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    /// Returns the absolute byte offset of the container in its stream, if
    /// it has been placed.
    pub fn byte_offset(&self) -> Option<u64> {
        self.byte_offset
    }

    /// Decodes the records of every slice, one rayon task per slice.
    ///
    /// Slices are independent, so this is equivalent to calling
    /// [`Slice::records`] on each in turn.
    #[cfg(feature = "parallel")]
    pub fn records_par(&self) -> Result<Vec<Vec<crate::record::Record>>> {
        use rayon::prelude::*;

        self.slices
            .par_iter()
            .map(|slice| slice.records(&self.compression_header))
            .collect()
    }
}

fn infer_alignment_context(slices: &[Slice]) -> Result<AlignmentContext> {
    let mut iter = slices.iter().map(|slice| slice.header().alignment_context());

    let mut container_context = iter.next().expect("slices is non-empty");

    for slice_context in iter {
        container_context = match (
            container_context.reference_context(),
            slice_context.reference_context(),
        ) {
            (ReferenceContext::Single(a), ReferenceContext::Single(b)) if a == b => {
                let start = match (
                    container_context.alignment_start(),
                    slice_context.alignment_start(),
                ) {
                    (Some(x), Some(y)) => x.min(y),
                    (Some(x), None) | (None, Some(x)) => x,
                    (None, None) => {
                        return Err(Error::InvalidState(
                            "single-reference slice without an alignment start",
                        ));
                    }
                };

                let end = container_context
                    .alignment_end()
                    .into_iter()
                    .chain(slice_context.alignment_end())
                    .max()
                    .unwrap_or(start);

                AlignmentContext::single(a, start, end)
            }
            (ReferenceContext::Multi, ReferenceContext::Multi) => AlignmentContext::multi(),
            (ReferenceContext::Unmapped, ReferenceContext::Unmapped) => {
                AlignmentContext::unmapped()
            }
            (expected, actual) => {
                tracing::warn!(?expected, ?actual, "mixed slice reference contexts");
                return Err(Error::InvalidState(
                    "container slices have mixed reference contexts",
                ));
            }
        };
    }

    Ok(container_context)
}

#[cfg(test)]
mod tests {
    use noodles_core::Position;

    use super::{slice::Header as SliceHeader, *};

    fn position(n: usize) -> Position {
        Position::new(n).unwrap()
    }

    fn slice_with_context(alignment_context: AlignmentContext) -> Slice {
        Slice::new(
            SliceHeader {
                alignment_context,
                record_count: 1,
                ..Default::default()
            },
            Block::default(),
            Vec::new(),
        )
    }

    #[test]
    fn test_try_new_with_single_reference_slices() -> Result<()> {
        let slices = vec![
            slice_with_context(AlignmentContext::single(5, position(2), position(8))),
            slice_with_context(AlignmentContext::single(5, position(7), position(13))),
        ];

        let container = Container::try_new(CompressionHeader::default(), slices, 0, 0)?;

        assert_eq!(
            container.header().alignment_context(),
            AlignmentContext::single(5, position(2), position(13))
        );

        Ok(())
    }

    #[test]
    fn test_try_new_with_multi_reference_slices() -> Result<()> {
        let slices = vec![
            slice_with_context(AlignmentContext::multi()),
            slice_with_context(AlignmentContext::multi()),
        ];

        let container = Container::try_new(CompressionHeader::default(), slices, 0, 0)?;

        assert_eq!(
            container.header().alignment_context(),
            AlignmentContext::multi()
        );

        Ok(())
    }

    #[test]
    fn test_try_new_with_mixed_contexts() {
        let slices = vec![
            slice_with_context(AlignmentContext::single(0, position(1), position(4))),
            slice_with_context(AlignmentContext::single(0, position(5), position(8))),
            slice_with_context(AlignmentContext::unmapped()),
        ];

        assert!(matches!(
            Container::try_new(CompressionHeader::default(), slices, 0, 0),
            Err(Error::InvalidState(_))
        ));

        let slices = vec![
            slice_with_context(AlignmentContext::single(0, position(1), position(4))),
            slice_with_context(AlignmentContext::single(1, position(1), position(4))),
        ];

        assert!(matches!(
            Container::try_new(CompressionHeader::default(), slices, 0, 0),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_try_new_with_no_slices() {
        assert!(matches!(
            Container::try_new(CompressionHeader::default(), Vec::new(), 0, 0),
            Err(Error::InvalidState(_))
        ));
    }
}
