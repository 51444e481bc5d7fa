//! The alignment-record interface consumed and produced by the codec.
//!
//! This is the logical field set of a SAM record, supplied by an upstream
//! caller (a SAM/BAM reader, an aligner, tests). The codec converts between
//! this interface and its internal feature-based record representation.

pub mod cigar;

use bstr::BString;
use noodles_core::Position;

pub use self::cigar::Cigar;
use crate::record::{Flags, Tag, Value};

/// An alignment record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    /// The read name.
    pub name: Option<BString>,
    /// The SAM flags.
    pub flags: Flags,
    /// The reference sequence ID.
    pub reference_sequence_id: Option<usize>,
    /// The 1-based alignment start.
    pub alignment_start: Option<Position>,
    /// The mapping quality.
    pub mapping_quality: Option<u8>,
    /// The CIGAR operations.
    pub cigar: Cigar,
    /// The read bases (ACGTN-normalized).
    pub sequence: Vec<u8>,
    /// The per-base quality scores, or empty when missing.
    pub quality_scores: Vec<u8>,
    /// The mate's reference sequence ID.
    pub mate_reference_sequence_id: Option<usize>,
    /// The mate's 1-based alignment start.
    pub mate_alignment_start: Option<Position>,
    /// The template length.
    pub template_length: i64,
    /// The read group ID (its index in the SAM header).
    pub read_group_id: Option<usize>,
    /// The tags.
    pub tags: Vec<(Tag, Value)>,
}

impl Record {
    /// Returns the inclusive 1-based alignment end, derived from the CIGAR.
    pub fn alignment_end(&self) -> Option<Position> {
        let start = self.alignment_start?;
        let span = self.cigar.reference_len();

        if span == 0 {
            return None;
        }

        Position::new(usize::from(start) + span - 1)
    }
}
