//! The mapping from data series to encodings.

pub mod data_series;

use std::collections::HashSet;

pub use self::data_series::DataSeries;
pub(crate) use self::data_series::{ALL_DATA_SERIES, STANDARD_DATA_SERIES};
use super::{
    Encoding,
    encoding::codec::{Byte, ByteArray, Integer},
};
use crate::container::block::ContentId;

/// The per-container data series encodings.
///
/// A series without an entry is absent from the serialized encoding map;
/// decoding a record that needs it is an error.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DataSeriesEncodings {
    pub(crate) bam_flags: Option<Encoding<Integer>>,
    pub(crate) cram_flags: Option<Encoding<Integer>>,
    pub(crate) reference_sequence_ids: Option<Encoding<Integer>>,
    pub(crate) read_lengths: Option<Encoding<Integer>>,
    pub(crate) alignment_starts: Option<Encoding<Integer>>,
    pub(crate) read_group_ids: Option<Encoding<Integer>>,
    pub(crate) names: Option<Encoding<ByteArray>>,
    pub(crate) mate_flags: Option<Encoding<Integer>>,
    pub(crate) mate_reference_sequence_ids: Option<Encoding<Integer>>,
    pub(crate) mate_alignment_starts: Option<Encoding<Integer>>,
    pub(crate) template_lengths: Option<Encoding<Integer>>,
    pub(crate) mate_distances: Option<Encoding<Integer>>,
    pub(crate) tag_set_ids: Option<Encoding<Integer>>,
    pub(crate) feature_counts: Option<Encoding<Integer>>,
    pub(crate) feature_codes: Option<Encoding<Byte>>,
    pub(crate) feature_positions: Option<Encoding<Integer>>,
    pub(crate) deletion_lengths: Option<Encoding<Integer>>,
    pub(crate) stretches_of_bases: Option<Encoding<ByteArray>>,
    pub(crate) stretches_of_quality_scores: Option<Encoding<ByteArray>>,
    pub(crate) base_substitution_codes: Option<Encoding<Byte>>,
    pub(crate) insertion_bases: Option<Encoding<ByteArray>>,
    pub(crate) reference_skip_lengths: Option<Encoding<Integer>>,
    pub(crate) padding_lengths: Option<Encoding<Integer>>,
    pub(crate) hard_clip_lengths: Option<Encoding<Integer>>,
    pub(crate) soft_clip_bases: Option<Encoding<ByteArray>>,
    pub(crate) mapping_qualities: Option<Encoding<Integer>>,
    pub(crate) bases: Option<Encoding<Byte>>,
    pub(crate) quality_scores: Option<Encoding<Byte>>,
}

// Read names, insertion bases, and soft clip bases use a tab sentinel, which
// cannot occur in any of them.
const STOP_BYTE: u8 = b'\t';

fn external_int(series: DataSeries) -> Option<Encoding<Integer>> {
    Some(Encoding::new(Integer::External {
        block_content_id: ContentId::from(series),
    }))
}

fn external_byte(series: DataSeries) -> Option<Encoding<Byte>> {
    Some(Encoding::new(Byte::External {
        block_content_id: ContentId::from(series),
    }))
}

fn byte_array_stop(series: DataSeries) -> Option<Encoding<ByteArray>> {
    Some(Encoding::new(ByteArray::ByteArrayStop {
        stop_byte: STOP_BYTE,
        block_content_id: ContentId::from(series),
    }))
}

fn byte_array_len(series: DataSeries) -> Option<Encoding<ByteArray>> {
    let block_content_id = ContentId::from(series);

    Some(Encoding::new(ByteArray::ByteArrayLength {
        len_encoding: Encoding::new(Integer::External { block_content_id }),
        value_encoding: Encoding::new(Byte::External { block_content_id }),
    }))
}

impl DataSeriesEncodings {
    /// Returns the default write map: every data series routed to its own
    /// external block.
    pub fn init() -> Self {
        Self {
            bam_flags: external_int(DataSeries::BamFlags),
            cram_flags: external_int(DataSeries::CramFlags),
            reference_sequence_ids: external_int(DataSeries::ReferenceSequenceIds),
            read_lengths: external_int(DataSeries::ReadLengths),
            alignment_starts: external_int(DataSeries::AlignmentStarts),
            read_group_ids: external_int(DataSeries::ReadGroupIds),
            names: byte_array_stop(DataSeries::Names),
            mate_flags: external_int(DataSeries::MateFlags),
            mate_reference_sequence_ids: external_int(DataSeries::MateReferenceSequenceIds),
            mate_alignment_starts: external_int(DataSeries::MateAlignmentStarts),
            template_lengths: external_int(DataSeries::TemplateLengths),
            mate_distances: external_int(DataSeries::MateDistances),
            tag_set_ids: external_int(DataSeries::TagSetIds),
            feature_counts: external_int(DataSeries::FeatureCounts),
            feature_codes: external_byte(DataSeries::FeatureCodes),
            feature_positions: external_int(DataSeries::FeaturePositions),
            deletion_lengths: external_int(DataSeries::DeletionLengths),
            stretches_of_bases: byte_array_stop(DataSeries::StretchesOfBases),
            stretches_of_quality_scores: byte_array_len(DataSeries::StretchesOfQualityScores),
            base_substitution_codes: external_byte(DataSeries::BaseSubstitutionCodes),
            insertion_bases: byte_array_stop(DataSeries::InsertionBases),
            reference_skip_lengths: external_int(DataSeries::ReferenceSkipLengths),
            padding_lengths: external_int(DataSeries::PaddingLengths),
            hard_clip_lengths: external_int(DataSeries::HardClipLengths),
            soft_clip_bases: byte_array_stop(DataSeries::SoftClipBases),
            mapping_qualities: external_int(DataSeries::MappingQualities),
            bases: external_byte(DataSeries::Bases),
            quality_scores: external_byte(DataSeries::QualityScores),
        }
    }

    /// Removes encodings whose default external blocks carry no data.
    ///
    /// This assumes content IDs match `ContentId::from(DataSeries::*)` as
    /// assigned by [`Self::init`]; maps decoded from a file must not use it.
    pub(crate) fn retain_used_content_ids(&mut self, used: &HashSet<ContentId>) {
        macro_rules! clear_if_unused {
            ($field:ident, $series:expr) => {
                if !used.contains(&ContentId::from($series)) {
                    self.$field = None;
                }
            };
        }

        clear_if_unused!(bam_flags, DataSeries::BamFlags);
        clear_if_unused!(cram_flags, DataSeries::CramFlags);
        clear_if_unused!(reference_sequence_ids, DataSeries::ReferenceSequenceIds);
        clear_if_unused!(read_lengths, DataSeries::ReadLengths);
        clear_if_unused!(alignment_starts, DataSeries::AlignmentStarts);
        clear_if_unused!(read_group_ids, DataSeries::ReadGroupIds);
        clear_if_unused!(names, DataSeries::Names);
        clear_if_unused!(mate_flags, DataSeries::MateFlags);
        clear_if_unused!(
            mate_reference_sequence_ids,
            DataSeries::MateReferenceSequenceIds
        );
        clear_if_unused!(mate_alignment_starts, DataSeries::MateAlignmentStarts);
        clear_if_unused!(template_lengths, DataSeries::TemplateLengths);
        clear_if_unused!(mate_distances, DataSeries::MateDistances);
        clear_if_unused!(tag_set_ids, DataSeries::TagSetIds);
        clear_if_unused!(feature_counts, DataSeries::FeatureCounts);
        clear_if_unused!(feature_codes, DataSeries::FeatureCodes);
        clear_if_unused!(feature_positions, DataSeries::FeaturePositions);
        clear_if_unused!(deletion_lengths, DataSeries::DeletionLengths);
        clear_if_unused!(stretches_of_bases, DataSeries::StretchesOfBases);
        clear_if_unused!(
            stretches_of_quality_scores,
            DataSeries::StretchesOfQualityScores
        );
        clear_if_unused!(base_substitution_codes, DataSeries::BaseSubstitutionCodes);
        clear_if_unused!(insertion_bases, DataSeries::InsertionBases);
        clear_if_unused!(reference_skip_lengths, DataSeries::ReferenceSkipLengths);
        clear_if_unused!(padding_lengths, DataSeries::PaddingLengths);
        clear_if_unused!(hard_clip_lengths, DataSeries::HardClipLengths);
        clear_if_unused!(soft_clip_bases, DataSeries::SoftClipBases);
        clear_if_unused!(mapping_qualities, DataSeries::MappingQualities);
        clear_if_unused!(bases, DataSeries::Bases);
        clear_if_unused!(quality_scores, DataSeries::QualityScores);
    }

    pub(crate) fn len(&self) -> usize {
        [
            self.bam_flags.is_some(),
            self.cram_flags.is_some(),
            self.reference_sequence_ids.is_some(),
            self.read_lengths.is_some(),
            self.alignment_starts.is_some(),
            self.read_group_ids.is_some(),
            self.names.is_some(),
            self.mate_flags.is_some(),
            self.mate_reference_sequence_ids.is_some(),
            self.mate_alignment_starts.is_some(),
            self.template_lengths.is_some(),
            self.mate_distances.is_some(),
            self.tag_set_ids.is_some(),
            self.feature_counts.is_some(),
            self.feature_codes.is_some(),
            self.feature_positions.is_some(),
            self.deletion_lengths.is_some(),
            self.stretches_of_bases.is_some(),
            self.stretches_of_quality_scores.is_some(),
            self.base_substitution_codes.is_some(),
            self.insertion_bases.is_some(),
            self.reference_skip_lengths.is_some(),
            self.padding_lengths.is_some(),
            self.hard_clip_lengths.is_some(),
            self.soft_clip_bases.is_some(),
            self.mapping_qualities.is_some(),
            self.bases.is_some(),
            self.quality_scores.is_some(),
        ]
        .into_iter()
        .filter(|&present| present)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_declares_all_standard_series() {
        let encodings = DataSeriesEncodings::init();
        assert_eq!(encodings.len(), 28);
    }

    #[test]
    fn test_retain_used_content_ids() {
        let mut encodings = DataSeriesEncodings::init();

        let used: HashSet<ContentId> = [
            ContentId::from(DataSeries::BamFlags),
            ContentId::from(DataSeries::ReadLengths),
        ]
        .into_iter()
        .collect();

        encodings.retain_used_content_ids(&used);

        assert_eq!(encodings.len(), 2);
        assert!(encodings.bam_flags.is_some());
        assert!(encodings.read_lengths.is_some());
        assert!(encodings.quality_scores.is_none());
    }
}
