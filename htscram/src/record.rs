//! The CRAM record model.

pub mod feature;
mod flags;
pub(crate) mod resolve;
pub mod tag;

use bstr::BString;
use noodles_core::Position;

pub use self::{
    feature::Feature,
    flags::{CramFlags, Flags, MateFlags},
    tag::{Tag, Value},
};

/// A logical CRAM record.
///
/// Alignment detail is carried as read features (an edit script against the
/// reference) rather than as a CIGAR string; mate linkage within a slice is
/// carried as a record index rather than a pointer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    pub(crate) bam_flags: Flags,
    pub(crate) cram_flags: CramFlags,
    pub(crate) reference_sequence_id: Option<usize>,
    pub(crate) read_length: usize,
    pub(crate) alignment_start: Option<Position>,
    pub(crate) read_group_id: Option<usize>,
    pub(crate) name: Option<BString>,
    pub(crate) mate_flags: MateFlags,
    pub(crate) mate_reference_sequence_id: Option<usize>,
    pub(crate) mate_alignment_start: Option<Position>,
    pub(crate) template_length: i64,
    pub(crate) mate_distance: Option<usize>,
    pub(crate) next_mate_index: Option<usize>,
    pub(crate) tags: Vec<(Tag, Value)>,
    pub(crate) features: Vec<Feature>,
    pub(crate) mapping_quality: Option<u8>,
    pub(crate) sequence: Vec<u8>,
    pub(crate) quality_scores: Vec<u8>,
}

impl Record {
    /// Returns the BAM flags.
    pub fn bam_flags(&self) -> Flags {
        self.bam_flags
    }

    /// Returns the CRAM flags.
    pub fn cram_flags(&self) -> CramFlags {
        self.cram_flags
    }

    /// Returns the reference sequence ID.
    pub fn reference_sequence_id(&self) -> Option<usize> {
        self.reference_sequence_id
    }

    /// Returns the read length.
    pub fn read_length(&self) -> usize {
        self.read_length
    }

    /// Returns the 1-based alignment start.
    pub fn alignment_start(&self) -> Option<Position> {
        self.alignment_start
    }

    /// Returns the read group ID.
    pub fn read_group_id(&self) -> Option<usize> {
        self.read_group_id
    }

    /// Returns the read name.
    pub fn name(&self) -> Option<&BString> {
        self.name.as_ref()
    }

    /// Returns the mate flags.
    pub fn mate_flags(&self) -> MateFlags {
        self.mate_flags
    }

    /// Returns the mate's reference sequence ID.
    pub fn mate_reference_sequence_id(&self) -> Option<usize> {
        self.mate_reference_sequence_id
    }

    /// Returns the mate's 1-based alignment start.
    pub fn mate_alignment_start(&self) -> Option<Position> {
        self.mate_alignment_start
    }

    /// Returns the template length.
    pub fn template_length(&self) -> i64 {
        self.template_length
    }

    /// Returns the number of records between this one and its next fragment
    /// in the slice.
    pub fn mate_distance(&self) -> Option<usize> {
        self.mate_distance
    }

    /// Returns the tags.
    pub fn tags(&self) -> &[(Tag, Value)] {
        &self.tags
    }

    /// Returns the read features.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Returns the mapping quality.
    pub fn mapping_quality(&self) -> Option<u8> {
        self.mapping_quality
    }

    /// Returns the read bases.
    pub fn sequence(&self) -> &[u8] {
        &self.sequence
    }

    /// Returns the quality scores.
    pub fn quality_scores(&self) -> &[u8] {
        &self.quality_scores
    }

    /// Returns whether the record is placed on a reference.
    ///
    /// A placed record has an alignment start. This is independent of the
    /// unmapped BAM flag: a placed-but-unmapped record is stored next to its
    /// placed neighbors.
    pub fn is_placed(&self) -> bool {
        self.alignment_start.is_some()
    }

    /// Returns the number of reference bases covered by the alignment.
    pub fn alignment_span(&self) -> usize {
        if self.alignment_start.is_none() {
            return 0;
        }

        calculate_alignment_span(self.read_length, &self.features)
    }

    /// Returns the inclusive 1-based alignment end.
    ///
    /// Unplaced records have no alignment end.
    pub fn alignment_end(&self) -> Option<Position> {
        let start = self.alignment_start?;
        let span = self.alignment_span();

        if span == 0 {
            return None;
        }

        Position::new(usize::from(start) + span - 1)
    }
}

fn calculate_alignment_span(read_length: usize, features: &[Feature]) -> usize {
    features
        .iter()
        .fold(read_length as isize, |span, feature| match feature {
            Feature::Insertion { bases, .. } => span - bases.len() as isize,
            Feature::InsertBase { .. } => span - 1,
            Feature::Deletion { len, .. } => span + *len as isize,
            Feature::ReferenceSkip { len, .. } => span + *len as isize,
            Feature::SoftClip { bases, .. } => span - bases.len() as isize,
            _ => span,
        })
        .max(0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(n: usize) -> Position {
        Position::new(n).unwrap()
    }

    #[test]
    fn test_calculate_alignment_span() {
        assert_eq!(calculate_alignment_span(4, &[]), 4);

        let features = [Feature::HardClip {
            position: position(1),
            len: 4,
        }];
        assert_eq!(calculate_alignment_span(4, &features), 4);

        let features = [
            Feature::Insertion {
                position: position(1),
                bases: b"AC".to_vec(),
            },
            Feature::InsertBase {
                position: position(4),
                base: b'G',
            },
            Feature::Deletion {
                position: position(6),
                len: 3,
            },
            Feature::ReferenceSkip {
                position: position(10),
                len: 5,
            },
            Feature::SoftClip {
                position: position(16),
                bases: b"ACGT".to_vec(),
            },
        ];
        assert_eq!(calculate_alignment_span(20, &features), 21);
    }

    #[test]
    fn test_alignment_end() {
        let record = Record {
            alignment_start: Some(position(1)),
            read_length: 4,
            ..Default::default()
        };

        assert_eq!(record.alignment_end(), Some(position(4)));

        let record = Record::default();
        assert_eq!(record.alignment_end(), None);
    }
}
