mod encoding;

use std::io::{self, Write};

pub(crate) use self::encoding::{
    write_byte_array_encoding, write_byte_encoding, write_integer_encoding,
};
use crate::{
    container::{
        block::ContentId,
        compression_header::{
            CompressionHeader, DataSeriesEncodings, Encoding, PreservationMap,
            SubstitutionMatrix, TagEncodings, TagSets,
            data_series_encodings::DataSeries,
            encoding::codec::{Byte, ByteArray, Integer},
            preservation_map::{Key, tag_sets},
        },
    },
    io::writer::{
        collections::write_array,
        num::{write_itf8, write_u8},
    },
    record::{Feature, Record, feature::substitution},
};

/// Builds the per-container schema from the container's records.
pub(crate) fn build_compression_header(
    records: &[Record],
    preserve_read_names: bool,
    reference_required: bool,
) -> CompressionHeader {
    let preservation_map = PreservationMap {
        read_names_included: preserve_read_names,
        ap_delta: records_are_coordinate_sorted(records),
        reference_required,
        substitution_matrix: build_substitution_matrix(records),
        tag_sets: build_tag_sets(records),
    };

    let tag_encodings = build_tag_encodings(&preservation_map.tag_sets);

    CompressionHeader::new(
        preservation_map,
        DataSeriesEncodings::init(),
        tag_encodings,
    )
}

fn records_are_coordinate_sorted(records: &[Record]) -> bool {
    records
        .windows(2)
        .all(|pair| match (&pair[0], &pair[1]) {
            (a, b) if a.reference_sequence_id() == b.reference_sequence_id() => {
                match (a.alignment_start(), b.alignment_start()) {
                    (Some(x), Some(y)) => x <= y,
                    _ => true,
                }
            }
            _ => true,
        })
}

fn build_substitution_matrix(records: &[Record]) -> SubstitutionMatrix {
    let mut frequencies = [[0u64; 5]; 5];

    for record in records {
        for feature in record.features() {
            if let Feature::Substitution {
                value: substitution::Value::Bases(reference_base, read_base),
                ..
            } = feature
            {
                frequencies[usize::from(*reference_base)][usize::from(*read_base)] += 1;
            }
        }
    }

    SubstitutionMatrix::from_frequencies(frequencies)
}

fn build_tag_sets(records: &[Record]) -> TagSets {
    let mut tag_sets = TagSets::default();

    for record in records {
        let keys = record
            .tags()
            .iter()
            .map(|(tag, value)| tag_sets::Key::new(*tag, value.ty()))
            .collect();

        tag_sets.insert(keys);
    }

    tag_sets
}

fn build_tag_encodings(tag_sets: &TagSets) -> TagEncodings {
    let mut encodings = TagEncodings::default();

    for set in tag_sets.sets() {
        for key in set {
            let block_content_id = ContentId::from(*key);

            encodings
                .entry(block_content_id)
                .or_insert_with(|| {
                    Encoding::new(ByteArray::ByteArrayLength {
                        len_encoding: Encoding::new(Integer::External { block_content_id }),
                        value_encoding: Encoding::new(Byte::External { block_content_id }),
                    })
                });
        }
    }

    encodings
}

pub(crate) fn write_compression_header<W>(
    writer: &mut W,
    compression_header: &CompressionHeader,
) -> io::Result<()>
where
    W: Write,
{
    write_preservation_map(writer, &compression_header.preservation_map)?;
    write_data_series_encodings(writer, &compression_header.data_series_encodings)?;
    write_tag_encodings(writer, &compression_header.tag_encodings)?;
    Ok(())
}

fn write_preservation_map<W>(writer: &mut W, preservation_map: &PreservationMap) -> io::Result<()>
where
    W: Write,
{
    let mut buf = Vec::new();

    write_itf8(&mut buf, 5)?;

    write_key(&mut buf, Key::ReadNamesIncluded)?;
    write_bool(&mut buf, preservation_map.read_names_included)?;

    write_key(&mut buf, Key::ApDelta)?;
    write_bool(&mut buf, preservation_map.ap_delta)?;

    write_key(&mut buf, Key::ReferenceRequired)?;
    write_bool(&mut buf, preservation_map.reference_required)?;

    write_key(&mut buf, Key::SubstitutionMatrix)?;
    buf.write_all(&preservation_map.substitution_matrix.to_wire())?;

    write_key(&mut buf, Key::TagSets)?;
    write_array(&mut buf, &preservation_map.tag_sets.to_wire())?;

    write_array(writer, &buf)
}

fn write_key<W>(writer: &mut W, key: Key) -> io::Result<()>
where
    W: Write,
{
    writer.write_all(&<[u8; 2]>::from(key))
}

fn write_bool<W>(writer: &mut W, value: bool) -> io::Result<()>
where
    W: Write,
{
    write_u8(writer, if value { 0x01 } else { 0x00 })
}

fn write_data_series_encodings<W>(
    writer: &mut W,
    encodings: &DataSeriesEncodings,
) -> io::Result<()>
where
    W: Write,
{
    let mut buf = Vec::new();

    write_itf8(&mut buf, encodings.len() as i32)?;
    write_encodings(&mut buf, encodings)?;

    write_array(writer, &buf)
}

#[rustfmt::skip]
fn write_encodings<W>(writer: &mut W, encodings: &DataSeriesEncodings) -> io::Result<()>
where
    W: Write,
{
    maybe_write_integer(writer, DataSeries::BamFlags, &encodings.bam_flags)?;
    maybe_write_integer(writer, DataSeries::CramFlags, &encodings.cram_flags)?;
    maybe_write_integer(writer, DataSeries::ReferenceSequenceIds, &encodings.reference_sequence_ids)?;
    maybe_write_integer(writer, DataSeries::ReadLengths, &encodings.read_lengths)?;
    maybe_write_integer(writer, DataSeries::AlignmentStarts, &encodings.alignment_starts)?;
    maybe_write_integer(writer, DataSeries::ReadGroupIds, &encodings.read_group_ids)?;
    maybe_write_byte_array(writer, DataSeries::Names, &encodings.names)?;
    maybe_write_integer(writer, DataSeries::MateFlags, &encodings.mate_flags)?;
    maybe_write_integer(writer, DataSeries::MateReferenceSequenceIds, &encodings.mate_reference_sequence_ids)?;
    maybe_write_integer(writer, DataSeries::MateAlignmentStarts, &encodings.mate_alignment_starts)?;
    maybe_write_integer(writer, DataSeries::TemplateLengths, &encodings.template_lengths)?;
    maybe_write_integer(writer, DataSeries::MateDistances, &encodings.mate_distances)?;
    maybe_write_integer(writer, DataSeries::TagSetIds, &encodings.tag_set_ids)?;
    maybe_write_integer(writer, DataSeries::FeatureCounts, &encodings.feature_counts)?;
    maybe_write_byte(writer, DataSeries::FeatureCodes, &encodings.feature_codes)?;
    maybe_write_integer(writer, DataSeries::FeaturePositions, &encodings.feature_positions)?;
    maybe_write_integer(writer, DataSeries::DeletionLengths, &encodings.deletion_lengths)?;
    maybe_write_byte_array(writer, DataSeries::StretchesOfBases, &encodings.stretches_of_bases)?;
    maybe_write_byte_array(writer, DataSeries::StretchesOfQualityScores, &encodings.stretches_of_quality_scores)?;
    maybe_write_byte(writer, DataSeries::BaseSubstitutionCodes, &encodings.base_substitution_codes)?;
    maybe_write_byte_array(writer, DataSeries::InsertionBases, &encodings.insertion_bases)?;
    maybe_write_integer(writer, DataSeries::ReferenceSkipLengths, &encodings.reference_skip_lengths)?;
    maybe_write_integer(writer, DataSeries::PaddingLengths, &encodings.padding_lengths)?;
    maybe_write_integer(writer, DataSeries::HardClipLengths, &encodings.hard_clip_lengths)?;
    maybe_write_byte_array(writer, DataSeries::SoftClipBases, &encodings.soft_clip_bases)?;
    maybe_write_integer(writer, DataSeries::MappingQualities, &encodings.mapping_qualities)?;
    maybe_write_byte(writer, DataSeries::Bases, &encodings.bases)?;
    maybe_write_byte(writer, DataSeries::QualityScores, &encodings.quality_scores)?;

    Ok(())
}

fn write_series_key<W>(writer: &mut W, key: DataSeries) -> io::Result<()>
where
    W: Write,
{
    writer.write_all(&<[u8; 2]>::from(key))
}

fn maybe_write_integer<W>(
    writer: &mut W,
    key: DataSeries,
    encoding: &Option<Encoding<Integer>>,
) -> io::Result<()>
where
    W: Write,
{
    if let Some(encoding) = encoding {
        write_series_key(writer, key)?;
        write_integer_encoding(writer, encoding)?;
    }

    Ok(())
}

fn maybe_write_byte<W>(
    writer: &mut W,
    key: DataSeries,
    encoding: &Option<Encoding<Byte>>,
) -> io::Result<()>
where
    W: Write,
{
    if let Some(encoding) = encoding {
        write_series_key(writer, key)?;
        write_byte_encoding(writer, encoding)?;
    }

    Ok(())
}

fn maybe_write_byte_array<W>(
    writer: &mut W,
    key: DataSeries,
    encoding: &Option<Encoding<ByteArray>>,
) -> io::Result<()>
where
    W: Write,
{
    if let Some(encoding) = encoding {
        write_series_key(writer, key)?;
        write_byte_array_encoding(writer, encoding)?;
    }

    Ok(())
}

fn write_tag_encodings<W>(writer: &mut W, tag_encodings: &TagEncodings) -> io::Result<()>
where
    W: Write,
{
    let mut buf = Vec::new();

    write_itf8(&mut buf, tag_encodings.len() as i32)?;

    for (&block_content_id, encoding) in tag_encodings.iter() {
        write_itf8(&mut buf, block_content_id)?;
        write_byte_array_encoding(&mut buf, encoding)?;
    }

    write_array(writer, &buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::reader::container::compression_header::read_compression_header_body;

    #[test]
    fn test_compression_header_wire_round_trip() -> crate::error::Result<()> {
        use noodles_core::Position;

        use crate::container::compression_header::preservation_map::substitution_matrix::Base;
        use crate::record::{Tag, Value};

        let records = [
            Record {
                alignment_start: Position::new(1),
                read_length: 4,
                tags: vec![(Tag::new(b'X', b'S'), Value::Int32(-18))],
                features: vec![Feature::Substitution {
                    position: Position::new(2).unwrap(),
                    value: substitution::Value::Bases(Base::C, Base::T),
                }],
                ..Default::default()
            },
            Record {
                alignment_start: Position::new(5),
                read_length: 4,
                ..Default::default()
            },
        ];

        let compression_header = build_compression_header(&records, true, true);

        assert!(compression_header.preservation_map().ap_delta());
        assert_eq!(compression_header.tag_encodings().len(), 1);

        let mut buf = Vec::new();
        write_compression_header(&mut buf, &compression_header)?;

        let decoded = read_compression_header_body(&mut &buf[..])?;

        assert_eq!(decoded, compression_header);

        Ok(())
    }

    #[test]
    fn test_records_are_coordinate_sorted() {
        use noodles_core::Position;

        let sorted = [
            Record {
                alignment_start: Position::new(5),
                ..Default::default()
            },
            Record {
                alignment_start: Position::new(2),
                ..Default::default()
            },
        ];

        assert!(!records_are_coordinate_sorted(&sorted));

        let sorted = [
            Record {
                alignment_start: Position::new(2),
                ..Default::default()
            },
            Record {
                alignment_start: Position::new(5),
                ..Default::default()
            },
        ];

        assert!(records_are_coordinate_sorted(&sorted));
    }
}
