use super::encoding::{
    consume_any_encoding, read_byte_array_encoding, read_byte_encoding, read_integer_encoding,
};
use crate::{
    container::compression_header::{DataSeries, DataSeriesEncodings},
    error::{Error, Result},
    io::reader::collections::read_map,
};

pub(super) fn read_data_series_encodings(src: &mut &[u8]) -> Result<DataSeriesEncodings> {
    let (mut buf, len) = read_map(src)?;
    read_data_series_encodings_inner(&mut buf, len)
}

fn read_data_series_encodings_inner(src: &mut &[u8], len: usize) -> Result<DataSeriesEncodings> {
    let mut encodings = DataSeriesEncodings::default();

    for _ in 0..len {
        let key = read_key(src)?;

        match key {
            DataSeries::BamFlags => {
                encodings.bam_flags = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::CramFlags => {
                encodings.cram_flags = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::ReferenceSequenceIds => {
                encodings.reference_sequence_ids = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::ReadLengths => {
                encodings.read_lengths = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::AlignmentStarts => {
                encodings.alignment_starts = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::ReadGroupIds => {
                encodings.read_group_ids = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::Names => {
                encodings.names = Some(read_byte_array_encoding(src, key.name())?);
            }
            DataSeries::MateFlags => {
                encodings.mate_flags = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::MateReferenceSequenceIds => {
                encodings.mate_reference_sequence_ids =
                    Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::MateAlignmentStarts => {
                encodings.mate_alignment_starts = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::TemplateLengths => {
                encodings.template_lengths = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::MateDistances => {
                encodings.mate_distances = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::TagSetIds => {
                encodings.tag_set_ids = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::FeatureCounts => {
                encodings.feature_counts = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::FeatureCodes => {
                encodings.feature_codes = Some(read_byte_encoding(src, key.name())?);
            }
            DataSeries::FeaturePositions => {
                encodings.feature_positions = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::DeletionLengths => {
                encodings.deletion_lengths = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::StretchesOfBases => {
                encodings.stretches_of_bases = Some(read_byte_array_encoding(src, key.name())?);
            }
            DataSeries::StretchesOfQualityScores => {
                encodings.stretches_of_quality_scores =
                    Some(read_byte_array_encoding(src, key.name())?);
            }
            DataSeries::BaseSubstitutionCodes => {
                encodings.base_substitution_codes = Some(read_byte_encoding(src, key.name())?);
            }
            DataSeries::InsertionBases => {
                encodings.insertion_bases = Some(read_byte_array_encoding(src, key.name())?);
            }
            DataSeries::ReferenceSkipLengths => {
                encodings.reference_skip_lengths = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::PaddingLengths => {
                encodings.padding_lengths = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::HardClipLengths => {
                encodings.hard_clip_lengths = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::SoftClipBases => {
                encodings.soft_clip_bases = Some(read_byte_array_encoding(src, key.name())?);
            }
            DataSeries::MappingQualities => {
                encodings.mapping_qualities = Some(read_integer_encoding(src, key.name())?);
            }
            DataSeries::Bases => {
                encodings.bases = Some(read_byte_encoding(src, key.name())?);
            }
            DataSeries::QualityScores => {
                encodings.quality_scores = Some(read_byte_encoding(src, key.name())?);
            }
            // Legacy CRAM 2.x series this crate does not decode.
            DataSeries::ReservedTc | DataSeries::ReservedTn => {
                consume_any_encoding(src)?;
            }
        }
    }

    Ok(encodings)
}

fn read_key(src: &mut &[u8]) -> Result<DataSeries> {
    let (buf, rest) = src
        .split_first_chunk::<2>()
        .ok_or_else(|| Error::Malformed("truncated data series encoding map".into()))?;

    *src = rest;

    DataSeries::try_from(*buf).map_err(|e| Error::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::compression_header::{Encoding, encoding::codec::Integer};

    #[test]
    fn test_read_data_series_encodings() -> Result<()> {
        let src = [
            0x0c, // data.len = 12
            0x02, // map.len = 2
            b'B', b'F', // BF
            0x01, 0x01, 0x01, // external, block content ID = 1
            b'A', b'P', // AP
            0x01, 0x01, 0x05, // external, block content ID = 5
        ];

        let encodings = read_data_series_encodings(&mut &src[..])?;

        assert_eq!(
            encodings.bam_flags,
            Some(Encoding::new(Integer::External {
                block_content_id: 1
            }))
        );
        assert_eq!(
            encodings.alignment_starts,
            Some(Encoding::new(Integer::External {
                block_content_id: 5
            }))
        );
        assert!(encodings.cram_flags.is_none());

        Ok(())
    }
}
