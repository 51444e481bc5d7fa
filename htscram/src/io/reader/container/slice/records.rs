use bstr::BString;
use noodles_core::Position;

use crate::{
    container::{
        AlignmentContext, CompressionHeader, ReferenceContext,
        block::ContentId,
        compression_header::{
            Encoding,
            encoding::{ExternalDataReaders, codec::{Byte, ByteArray, Integer}},
        },
    },
    error::{Error, Result},
    io::BitReader,
    record::{
        CramFlags, Feature, Flags, MateFlags, Record,
        feature::substitution,
        tag,
    },
};

const MISSING_REFERENCE_SEQUENCE_ID: i32 = -1;
const MISSING_READ_GROUP_ID: i32 = -1;
const MISSING_MAPPING_QUALITY: i32 = 255;

/// Decodes all records of a slice from its core and external block payloads.
///
/// Records come out raw: substitutions carry matrix codes, sequences of
/// mapped records are empty until restored against the reference, and mate
/// links are unresolved.
pub(crate) fn decode_records(
    compression_header: &CompressionHeader,
    core_data: &[u8],
    external_data: &[(ContentId, Vec<u8>)],
    alignment_context: AlignmentContext,
    record_count: usize,
) -> Result<Vec<Record>> {
    let mut external_data_readers = ExternalDataReaders::new();

    for (id, buf) in external_data {
        external_data_readers.insert(*id, buf);
    }

    let (_, initial_alignment_start, _) = alignment_context.to_wire();

    let mut decoder = Decoder {
        compression_header,
        core_data_reader: BitReader::new(core_data),
        external_data_readers,
        reference_context: alignment_context.reference_context(),
        prev_alignment_start: initial_alignment_start as i32,
    };

    (0..record_count).map(|_| decoder.decode_record()).collect()
}

struct Decoder<'a, 'ch> {
    compression_header: &'ch CompressionHeader,
    core_data_reader: BitReader<'a>,
    external_data_readers: ExternalDataReaders<'a>,
    reference_context: ReferenceContext,
    prev_alignment_start: i32,
}

fn require<'e, C>(
    encoding: &'e Option<Encoding<C>>,
    data_series: &'static str,
) -> Result<&'e Encoding<C>> {
    encoding.as_ref().ok_or_else(|| {
        Error::Malformed(format!("missing encoding for data series {data_series}"))
    })
}

impl Decoder<'_, '_> {
    fn decode_int(&mut self, encoding: &Encoding<Integer>) -> Result<i32> {
        encoding
            .decode(&mut self.core_data_reader, &mut self.external_data_readers)
            .map_err(Error::Io)
    }

    fn decode_byte(&mut self, encoding: &Encoding<Byte>) -> Result<u8> {
        encoding
            .decode(&mut self.core_data_reader, &mut self.external_data_readers)
            .map_err(Error::Io)
    }

    fn decode_byte_array(&mut self, encoding: &Encoding<ByteArray>) -> Result<Vec<u8>> {
        encoding
            .decode(&mut self.core_data_reader, &mut self.external_data_readers)
            .map_err(Error::Io)
    }

    fn decode_record(&mut self) -> Result<Record> {
        let encodings = &self.compression_header.data_series_encodings;
        let preservation_map = &self.compression_header.preservation_map;

        let bam_flags = require(&encodings.bam_flags, "BF")?;
        let bam_flags = self.decode_int(bam_flags).and_then(|n| {
            u16::try_from(n)
                .map(Flags::from_bits_truncate)
                .map_err(|_| Error::Malformed(format!("invalid BAM flags: {n}")))
        })?;

        let cram_flags = require(&encodings.cram_flags, "CF")?;
        let cram_flags = self.decode_int(cram_flags).and_then(|n| {
            u8::try_from(n)
                .map(CramFlags::from_bits_truncate)
                .map_err(|_| Error::Malformed(format!("invalid CRAM flags: {n}")))
        })?;

        let reference_sequence_id = match self.reference_context {
            ReferenceContext::Single(id) => Some(id),
            ReferenceContext::Unmapped => None,
            ReferenceContext::Multi => {
                let encoding = require(&encodings.reference_sequence_ids, "RI")?;

                match self.decode_int(encoding)? {
                    MISSING_REFERENCE_SEQUENCE_ID => None,
                    n => Some(usize::try_from(n).map_err(|_| {
                        Error::Malformed(format!("invalid reference sequence ID: {n}"))
                    })?),
                }
            }
        };

        let read_length = {
            let encoding = require(&encodings.read_lengths, "RL")?;
            self.decode_int(encoding).and_then(|n| {
                usize::try_from(n)
                    .map_err(|_| Error::Malformed(format!("invalid read length: {n}")))
            })?
        };

        let alignment_start = {
            let encoding = require(&encodings.alignment_starts, "AP")?;
            let n = self.decode_int(encoding)?;

            let start = if preservation_map.ap_delta {
                let start = self.prev_alignment_start + n;
                self.prev_alignment_start = start;
                start
            } else {
                n
            };

            usize::try_from(start).ok().and_then(Position::new)
        };

        let read_group_id = {
            let encoding = require(&encodings.read_group_ids, "RG")?;

            match self.decode_int(encoding)? {
                MISSING_READ_GROUP_ID => None,
                n => Some(usize::try_from(n).map_err(|_| {
                    Error::Malformed(format!("invalid read group ID: {n}"))
                })?),
            }
        };

        let mut name = None;

        if preservation_map.read_names_included {
            let encoding = require(&encodings.names, "RN")?;
            name = Some(BString::from(self.decode_byte_array(encoding)?));
        }

        let mut mate_flags = MateFlags::default();
        let mut mate_reference_sequence_id = None;
        let mut mate_alignment_start = None;
        let mut template_length = 0;
        let mut mate_distance = None;

        if cram_flags.is_detached() {
            let encoding = require(&encodings.mate_flags, "MF")?;
            mate_flags = self.decode_int(encoding).and_then(|n| {
                u8::try_from(n)
                    .map(MateFlags::from_bits_truncate)
                    .map_err(|_| Error::Malformed(format!("invalid mate flags: {n}")))
            })?;

            if !preservation_map.read_names_included {
                let encoding = require(&encodings.names, "RN")?;
                name = Some(BString::from(self.decode_byte_array(encoding)?));
            }

            let encoding = require(&encodings.mate_reference_sequence_ids, "NS")?;
            mate_reference_sequence_id = match self.decode_int(encoding)? {
                MISSING_REFERENCE_SEQUENCE_ID => None,
                n => Some(usize::try_from(n).map_err(|_| {
                    Error::Malformed(format!("invalid mate reference sequence ID: {n}"))
                })?),
            };

            let encoding = require(&encodings.mate_alignment_starts, "NP")?;
            mate_alignment_start = usize::try_from(self.decode_int(encoding)?)
                .ok()
                .and_then(Position::new);

            let encoding = require(&encodings.template_lengths, "TS")?;
            template_length = i64::from(self.decode_int(encoding)?);
        } else if cram_flags.has_mate_downstream() {
            let encoding = require(&encodings.mate_distances, "NF")?;
            mate_distance = Some(self.decode_int(encoding).and_then(|n| {
                usize::try_from(n)
                    .map_err(|_| Error::Malformed(format!("invalid mate distance: {n}")))
            })?);
        }

        let tags = self.decode_tags()?;

        let mut features = Vec::new();
        let mut mapping_quality = None;
        let mut sequence = Vec::new();
        let mut quality_scores = Vec::new();

        if !bam_flags.is_unmapped() {
            features = self.decode_features()?;

            let encoding = require(&encodings.mapping_qualities, "MQ")?;
            mapping_quality = match self.decode_int(encoding)? {
                MISSING_MAPPING_QUALITY => None,
                n => Some(u8::try_from(n).map_err(|_| {
                    Error::Malformed(format!("invalid mapping quality: {n}"))
                })?),
            };

            if cram_flags.quality_scores_are_preserved() {
                quality_scores = self.decode_quality_scores(read_length)?;
            }
        } else {
            if !cram_flags.has_unknown_bases() {
                let encoding = require(&encodings.bases, "BA")?;

                sequence = (0..read_length)
                    .map(|_| self.decode_byte(encoding))
                    .collect::<Result<_>>()?;
            }

            if cram_flags.quality_scores_are_preserved() {
                quality_scores = self.decode_quality_scores(read_length)?;
            }
        }

        Ok(Record {
            bam_flags,
            cram_flags,
            reference_sequence_id,
            read_length,
            alignment_start,
            read_group_id,
            name,
            mate_flags,
            mate_reference_sequence_id,
            mate_alignment_start,
            template_length,
            mate_distance,
            next_mate_index: None,
            tags,
            features,
            mapping_quality,
            sequence,
            quality_scores,
        })
    }

    fn decode_tags(&mut self) -> Result<Vec<(tag::Tag, tag::Value)>> {
        let encodings = &self.compression_header.data_series_encodings;
        let tag_sets = &self.compression_header.preservation_map.tag_sets;

        let encoding = require(&encodings.tag_set_ids, "TL")?;
        let tag_set_id = self.decode_int(encoding).and_then(|n| {
            usize::try_from(n).map_err(|_| Error::Malformed(format!("invalid tag set ID: {n}")))
        })?;

        let keys = tag_sets
            .get(tag_set_id)
            .ok_or_else(|| Error::Malformed(format!("invalid tag set ID: {tag_set_id}")))?
            .to_vec();

        let mut tags = Vec::with_capacity(keys.len());

        for key in keys {
            let id = ContentId::from(key);

            let encoding = self
                .compression_header
                .tag_encodings
                .get(&id)
                .ok_or_else(|| Error::Malformed(format!("missing tag encoding: {id}")))?;

            let buf = encoding
                .decode(&mut self.core_data_reader, &mut self.external_data_readers)
                .map_err(Error::Io)?;

            let value = tag::value::decode(&mut &buf[..], key.ty())?;
            tags.push((key.tag(), value));
        }

        Ok(tags)
    }

    fn decode_features(&mut self) -> Result<Vec<Feature>> {
        let encodings = &self.compression_header.data_series_encodings;

        let encoding = require(&encodings.feature_counts, "FN")?;
        let feature_count = self.decode_int(encoding).and_then(|n| {
            usize::try_from(n)
                .map_err(|_| Error::Malformed(format!("invalid feature count: {n}")))
        })?;

        let mut features = Vec::with_capacity(feature_count);
        let mut prev_position = 0;

        for _ in 0..feature_count {
            let encoding = require(&encodings.feature_codes, "FC")?;
            let code = self.decode_byte(encoding)?;

            let encoding = require(&encodings.feature_positions, "FP")?;
            let delta = self.decode_int(encoding).and_then(|n| {
                usize::try_from(n)
                    .map_err(|_| Error::Malformed(format!("invalid feature position delta: {n}")))
            })?;

            prev_position += delta;

            let position = Position::new(prev_position)
                .ok_or_else(|| Error::Malformed("invalid feature position: 0".into()))?;

            let feature = match code {
                b'b' => {
                    let encoding = require(&encodings.stretches_of_bases, "BB")?;
                    Feature::Bases {
                        position,
                        bases: self.decode_byte_array(encoding)?,
                    }
                }
                b'q' => {
                    let encoding = require(&encodings.stretches_of_quality_scores, "QQ")?;
                    Feature::Scores {
                        position,
                        quality_scores: self.decode_byte_array(encoding)?,
                    }
                }
                b'B' => {
                    let base_encoding = require(&encodings.bases, "BA")?;
                    let base = self.decode_byte(base_encoding)?;

                    let score_encoding = require(&encodings.quality_scores, "QS")?;
                    let quality_score = self.decode_byte(score_encoding)?;

                    Feature::ReadBase {
                        position,
                        base,
                        quality_score,
                    }
                }
                b'X' => {
                    let encoding = require(&encodings.base_substitution_codes, "BS")?;
                    Feature::Substitution {
                        position,
                        value: substitution::Value::Code(self.decode_byte(encoding)?),
                    }
                }
                b'I' => {
                    let encoding = require(&encodings.insertion_bases, "IN")?;
                    Feature::Insertion {
                        position,
                        bases: self.decode_byte_array(encoding)?,
                    }
                }
                b'D' => {
                    let encoding = require(&encodings.deletion_lengths, "DL")?;
                    Feature::Deletion {
                        position,
                        len: self.decode_len(encoding)?,
                    }
                }
                b'i' => {
                    let encoding = require(&encodings.bases, "BA")?;
                    Feature::InsertBase {
                        position,
                        base: self.decode_byte(encoding)?,
                    }
                }
                b'Q' => {
                    let encoding = require(&encodings.quality_scores, "QS")?;
                    Feature::QualityScore {
                        position,
                        quality_score: self.decode_byte(encoding)?,
                    }
                }
                b'N' => {
                    let encoding = require(&encodings.reference_skip_lengths, "RS")?;
                    Feature::ReferenceSkip {
                        position,
                        len: self.decode_len(encoding)?,
                    }
                }
                b'S' => {
                    let encoding = require(&encodings.soft_clip_bases, "SC")?;
                    Feature::SoftClip {
                        position,
                        bases: self.decode_byte_array(encoding)?,
                    }
                }
                b'P' => {
                    let encoding = require(&encodings.padding_lengths, "PD")?;
                    Feature::Padding {
                        position,
                        len: self.decode_len(encoding)?,
                    }
                }
                b'H' => {
                    let encoding = require(&encodings.hard_clip_lengths, "HC")?;
                    Feature::HardClip {
                        position,
                        len: self.decode_len(encoding)?,
                    }
                }
                _ => {
                    return Err(Error::Malformed(format!(
                        "invalid feature code: {:#04x}",
                        code
                    )));
                }
            };

            features.push(feature);
        }

        Ok(features)
    }

    fn decode_len(&mut self, encoding: &Encoding<Integer>) -> Result<usize> {
        self.decode_int(encoding).and_then(|n| {
            usize::try_from(n).map_err(|_| Error::Malformed(format!("invalid feature length: {n}")))
        })
    }

    fn decode_quality_scores(&mut self, read_length: usize) -> Result<Vec<u8>> {
        let encodings = &self.compression_header.data_series_encodings;
        let encoding = require(&encodings.quality_scores, "QS")?;

        (0..read_length)
            .map(|_| self.decode_byte(encoding))
            .collect()
    }
}

/// Resolves intra-slice mate links into concrete mate fields.
///
/// Non-detached records with a downstream mate form chains of record indices;
/// each record takes its mate fields from the next record in the chain, and
/// the last record points back to the first. Template lengths are derived
/// from the outermost alignment coordinates.
pub(crate) fn resolve_mates(records: &mut [Record]) -> Result<()> {
    let len = records.len();

    let mut has_upstream = vec![false; len];

    for i in 0..len {
        let record = &records[i];

        if record.cram_flags.is_detached() {
            continue;
        }

        if let Some(distance) = record.mate_distance {
            let j = i + distance + 1;

            if j >= len {
                return Err(Error::Malformed(format!(
                    "mate distance out of bounds: {distance} from record {i}"
                )));
            }

            records[i].next_mate_index = Some(j);
            has_upstream[j] = true;
        }
    }

    for i in 0..len {
        if has_upstream[i] || records[i].next_mate_index.is_none() {
            continue;
        }

        let mut chain = vec![i];
        let mut j = i;

        while let Some(k) = records[j].next_mate_index {
            chain.push(k);
            j = k;
        }

        resolve_chain(records, &chain);
    }

    Ok(())
}

fn resolve_chain(records: &mut [Record], chain: &[usize]) {
    // Fragments of one template share the head's name.
    let name = records[chain[0]].name.clone();

    for &i in &chain[1..] {
        records[i].name = name.clone();
    }

    for w in 0..chain.len() {
        let i = chain[w];
        let j = chain[(w + 1) % chain.len()];

        let (mate_reference_sequence_id, mate_alignment_start, mate_bam_flags) = {
            let mate = &records[j];
            (
                mate.reference_sequence_id,
                mate.alignment_start,
                mate.bam_flags,
            )
        };

        let record = &mut records[i];

        record.mate_reference_sequence_id = mate_reference_sequence_id;
        record.mate_alignment_start = mate_alignment_start;

        if mate_bam_flags.is_reverse_complemented() {
            record.mate_flags |= MateFlags::ON_NEGATIVE_STRAND;
            record.bam_flags |= Flags::MATE_REVERSE_COMPLEMENTED;
        }

        if mate_bam_flags.is_unmapped() {
            record.mate_flags |= MateFlags::UNMAPPED;
            record.bam_flags |= Flags::MATE_UNMAPPED;
        }
    }

    set_template_lengths(records, chain);
}

fn set_template_lengths(records: &mut [Record], chain: &[usize]) {
    let mut bounds: Option<(usize, usize, Position, Position)> = None;

    for &i in chain {
        let record = &records[i];

        let (Some(start), Some(end)) = (record.alignment_start, record.alignment_end()) else {
            return;
        };

        bounds = Some(match bounds {
            None => (i, i, start, end),
            Some((leftmost, rightmost, min_start, max_end)) => {
                let (leftmost, min_start) = if start < min_start {
                    (i, start)
                } else {
                    (leftmost, min_start)
                };

                let (rightmost, max_end) = if end > max_end { (i, end) } else { (rightmost, max_end) };

                (leftmost, rightmost, min_start, max_end)
            }
        });
    }

    let Some((leftmost, rightmost, min_start, max_end)) = bounds else {
        return;
    };

    if leftmost == rightmost {
        return;
    }

    let template_length = (usize::from(max_end) - usize::from(min_start) + 1) as i64;

    for &i in chain {
        records[i].template_length = if i == leftmost {
            template_length
        } else if i == rightmost {
            -template_length
        } else {
            0
        };
    }
}
