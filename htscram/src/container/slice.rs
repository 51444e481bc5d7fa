//! CRAM slices: the unit of random access.

mod header;

use std::collections::HashMap;

use noodles_core::Position;

pub use self::header::Header;
use super::{ReferenceContext, block::Block};
use crate::{
    crai,
    error::{Error, Result},
    record::Record,
};

/// Indexing parameters of a serialized slice.
///
/// These are unknown until the containing container lays out its blocks and
/// are back-filled during serialization. Index derivation on a slice without
/// them fails with [`Error::InvalidState`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SliceIndex {
    /// The index of this slice's landmark within the container.
    pub landmark_index: usize,
    /// The byte offset of the slice header block, measured from the start of
    /// the compression header block.
    pub byte_offset: usize,
    /// The byte size of all of the slice's blocks.
    pub byte_size: usize,
}

/// The alignment coverage of one reference context within a slice.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AlignmentSpan {
    start: Option<Position>,
    span: usize,
    mapped_record_count: u64,
    unmapped_record_count: u64,
}

impl AlignmentSpan {
    /// Returns the 1-based start of the covered interval.
    pub fn start(&self) -> Option<Position> {
        self.start
    }

    /// Returns the length of the covered interval.
    pub fn span(&self) -> usize {
        self.span
    }

    /// Returns the number of mapped records.
    pub fn mapped_record_count(&self) -> u64 {
        self.mapped_record_count
    }

    /// Returns the number of unmapped records.
    pub fn unmapped_record_count(&self) -> u64 {
        self.unmapped_record_count
    }
}

/// A batch of records sharing a reference context.
#[derive(Clone, Debug, PartialEq)]
pub struct Slice {
    pub(crate) header: Header,
    pub(crate) core_data_block: Block,
    pub(crate) external_blocks: Vec<Block>,
    pub(crate) index: Option<SliceIndex>,
}

impl Slice {
    pub(crate) fn new(header: Header, core_data_block: Block, external_blocks: Vec<Block>) -> Self {
        Self {
            header,
            core_data_block,
            external_blocks,
            index: None,
        }
    }

    /// Returns the slice header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the core data block.
    pub fn core_data_block(&self) -> &Block {
        &self.core_data_block
    }

    /// Returns the external blocks.
    pub fn external_blocks(&self) -> &[Block] {
        &self.external_blocks
    }

    /// Returns the indexing parameters, if the slice has been serialized.
    pub fn index(&self) -> Option<&SliceIndex> {
        self.index.as_ref()
    }

    pub(crate) fn set_index(&mut self, index: SliceIndex) {
        self.index = Some(index);
    }

    fn require_index(&self) -> Result<&SliceIndex> {
        self.index
            .as_ref()
            .ok_or(Error::InvalidState("slice indexing parameters are uninitialized"))
    }

    /// Decodes the slice's records.
    ///
    /// Records come out with resolved mates and quality scores. Sequences of
    /// mapped records stay empty until restored against a reference (the
    /// reader driver does this); substitution features carry matrix codes.
    pub fn records(&self, compression_header: &crate::container::CompressionHeader) -> Result<Vec<Record>> {
        use crate::io::reader::container::slice::records::{decode_records, resolve_mates};
        use crate::record::resolve;

        let core_data = self.core_data_block.decode()?;

        let external_data = self
            .external_blocks
            .iter()
            .map(|block| Ok((block.content_id(), block.decode()?)))
            .collect::<Result<Vec<_>>>()?;

        let mut records = decode_records(
            compression_header,
            &core_data,
            &external_data,
            self.header.alignment_context(),
            self.header.record_count(),
        )?;

        for (i, record) in records.iter_mut().enumerate() {
            // Empty stored names mean "no name".
            if record.name.as_ref().is_some_and(|name| name.is_empty()) {
                record.name = None;
            }

            if record.name.is_none() {
                let n = self.header.record_counter() + i as u64;
                record.name = Some(n.to_string().into());
            }

            if record.cram_flags().quality_scores_are_preserved() {
                if record
                    .quality_scores
                    .iter()
                    .all(|&b| b == resolve::MISSING_QUALITY_SCORE)
                {
                    record.quality_scores.clear();
                }
            } else if !record.bam_flags().is_unmapped() {
                let scores = resolve::resolve_quality_scores(&record.features, record.read_length);

                record.quality_scores = if scores
                    .iter()
                    .all(|&b| b == resolve::MISSING_QUALITY_SCORE)
                {
                    Vec::new()
                } else {
                    scores
                };
            }
        }

        resolve_mates(&mut records)?;

        Ok(records)
    }

    /// Derives the CRAI entries for this slice.
    ///
    /// Single-reference and unmapped slices produce one entry. Multi-reference
    /// slices produce one entry per reference context present and require the
    /// alignment spans from [`multi_reference_alignment_spans`]; deriving them
    /// without spans, or from a slice whose indexing parameters have not been
    /// back-filled, fails with [`Error::InvalidState`].
    pub fn crai_entries(
        &self,
        container_byte_offset: u64,
        multi_reference_spans: Option<&[(ReferenceContext, AlignmentSpan)]>,
    ) -> Result<Vec<crai::Record>> {
        let index = self.require_index()?;

        let context = self.header.alignment_context();

        match context.reference_context() {
            ReferenceContext::Single(_) | ReferenceContext::Unmapped => {
                let (id, start, span) = context.to_wire();

                let record = crai::Record::try_new(
                    id,
                    start,
                    span,
                    container_byte_offset,
                    index.byte_offset as u64,
                    index.byte_size as u64,
                )?;

                Ok(vec![record])
            }
            ReferenceContext::Multi => {
                let spans = multi_reference_spans.ok_or(Error::InvalidState(
                    "multi-reference slice requires alignment spans for index derivation",
                ))?;

                spans
                    .iter()
                    .map(|(reference_context, span)| {
                        let (id, start, len) = match reference_context {
                            ReferenceContext::Single(id) => (
                                *id as i32,
                                span.start().map(usize::from).unwrap_or_default() as i64,
                                span.span() as i64,
                            ),
                            ReferenceContext::Unmapped => {
                                (super::reference_context::UNMAPPED_UNPLACED_ID, 0, 0)
                            }
                            ReferenceContext::Multi => {
                                return Err(Error::InvalidState(
                                    "alignment spans cannot be multi-reference",
                                ));
                            }
                        };

                        crai::Record::try_new(
                            id,
                            start,
                            len,
                            container_byte_offset,
                            index.byte_offset as u64,
                            index.byte_size as u64,
                        )
                    })
                    .collect()
            }
        }
    }
}

/// Computes, for each reference context present in `records`, the covered
/// alignment interval and mapped/unmapped record counts.
///
/// This pass requires coordinate-sorted input and fails with
/// [`Error::InvalidState`] otherwise. Unmapped-unplaced records accumulate
/// under [`ReferenceContext::Unmapped`] with an empty interval. Results are
/// ordered by reference sequence ID, unplaced last.
pub fn multi_reference_alignment_spans(
    records: &[Record],
    coordinate_sorted: bool,
) -> Result<Vec<(ReferenceContext, AlignmentSpan)>> {
    if !coordinate_sorted {
        return Err(Error::InvalidState(
            "multi-reference alignment spans require coordinate-sorted records",
        ));
    }

    let mut spans: HashMap<Option<usize>, AlignmentSpan> = HashMap::new();

    for record in records {
        let key = if record.is_placed() {
            record.reference_sequence_id()
        } else {
            None
        };

        let span = spans.entry(key).or_insert(AlignmentSpan {
            start: None,
            span: 0,
            mapped_record_count: 0,
            unmapped_record_count: 0,
        });

        if record.bam_flags().is_unmapped() {
            span.unmapped_record_count += 1;
        } else {
            span.mapped_record_count += 1;
        }

        if key.is_some() {
            if let (Some(record_start), Some(record_end)) =
                (record.alignment_start(), record.alignment_end())
            {
                let start = span
                    .start
                    .map_or(record_start, |start| start.min(record_start));

                let end = span
                    .start
                    .and_then(|start| {
                        Position::new(usize::from(start) + span.span - 1)
                            .map(|end| end.max(record_end))
                    })
                    .unwrap_or(record_end);

                span.start = Some(start);
                span.span = usize::from(end) - usize::from(start) + 1;
            }
        }
    }

    let mut entries: Vec<_> = spans
        .into_iter()
        .map(|(key, span)| {
            let context = match key {
                Some(id) => ReferenceContext::Single(id),
                None => ReferenceContext::Unmapped,
            };

            (context, span)
        })
        .collect();

    entries.sort_by_key(|(context, _)| match context {
        ReferenceContext::Single(id) => (0, *id),
        _ => (1, 0),
    });

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Flags;

    fn position(n: usize) -> Position {
        Position::new(n).unwrap()
    }

    fn record(
        reference_sequence_id: Option<usize>,
        alignment_start: Option<usize>,
        read_length: usize,
        flags: Flags,
    ) -> Record {
        Record {
            bam_flags: flags,
            reference_sequence_id,
            alignment_start: alignment_start.map(|n| position(n)),
            read_length,
            ..Default::default()
        }
    }

    #[test]
    fn test_multi_reference_alignment_spans() -> Result<()> {
        let records = [
            record(Some(1), Some(1), 3, Flags::default()),
            record(Some(2), Some(2), 3, Flags::UNMAPPED),
            record(Some(1), Some(3), 3, Flags::default()),
            record(None, None, 3, Flags::UNMAPPED),
        ];

        let spans = multi_reference_alignment_spans(&records, true)?;

        assert_eq!(spans.len(), 3);

        let (context, span) = &spans[0];
        assert_eq!(*context, ReferenceContext::Single(1));
        assert_eq!(span.start(), Some(position(1)));
        assert_eq!(span.span(), 5);
        assert_eq!(span.mapped_record_count(), 2);
        assert_eq!(span.unmapped_record_count(), 0);

        let (context, span) = &spans[1];
        assert_eq!(*context, ReferenceContext::Single(2));
        assert_eq!(span.start(), Some(position(2)));
        assert_eq!(span.span(), 3);
        assert_eq!(span.mapped_record_count(), 0);
        assert_eq!(span.unmapped_record_count(), 1);

        let (context, span) = &spans[2];
        assert_eq!(*context, ReferenceContext::Unmapped);
        assert_eq!(span.start(), None);
        assert_eq!(span.span(), 0);
        assert_eq!(span.unmapped_record_count(), 1);

        Ok(())
    }

    #[test]
    fn test_multi_reference_alignment_spans_requires_sorted_input() {
        assert!(matches!(
            multi_reference_alignment_spans(&[], false),
            Err(Error::InvalidState(_))
        ));
    }
}
