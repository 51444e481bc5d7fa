use crate::{
    container::{
        CompressionHeader, ReferenceContext,
        block::ContentId,
        compression_header::{
            Encoding,
            encoding::{ExternalDataWriters, codec::{Byte, ByteArray, Integer}},
            preservation_map::tag_sets,
        },
    },
    error::{Error, Result},
    io::BitWriter,
    record::{Feature, Record, feature::substitution},
};

const MISSING_REFERENCE_SEQUENCE_ID: i32 = -1;
const MISSING_READ_GROUP_ID: i32 = -1;
const MISSING_MAPPING_QUALITY: i32 = 255;

pub(super) struct Encoder<'ch> {
    compression_header: &'ch CompressionHeader,
    core_data_writer: BitWriter,
    external_data_writers: ExternalDataWriters,
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

impl<'ch> Encoder<'ch> {
    pub(super) fn new(
        compression_header: &'ch CompressionHeader,
        reference_context: ReferenceContext,
        initial_alignment_start: i32,
    ) -> Self {
        let mut external_data_writers = ExternalDataWriters::default();

        for data_series in
            crate::container::compression_header::data_series_encodings::STANDARD_DATA_SERIES
        {
            external_data_writers.insert(ContentId::from(data_series), Vec::new());
        }

        for &block_content_id in compression_header.tag_encodings.keys() {
            external_data_writers.insert(block_content_id, Vec::new());
        }

        Self {
            compression_header,
            core_data_writer: BitWriter::default(),
            external_data_writers,
            reference_context,
            prev_alignment_start: initial_alignment_start,
        }
    }

    pub(super) fn finish(self) -> Result<(Vec<u8>, ExternalDataWriters)> {
        let core_data = self.core_data_writer.finish().map_err(Error::Io)?;
        Ok((core_data, self.external_data_writers))
    }

    fn encode_int(&mut self, encoding: &Encoding<Integer>, value: i32) -> Result<()> {
        encoding
            .encode(
                &mut self.core_data_writer,
                &mut self.external_data_writers,
                value,
            )
            .map_err(Error::Io)
    }

    fn encode_byte(&mut self, encoding: &Encoding<Byte>, value: u8) -> Result<()> {
        encoding
            .encode(
                &mut self.core_data_writer,
                &mut self.external_data_writers,
                value,
            )
            .map_err(Error::Io)
    }

    fn encode_byte_array(&mut self, encoding: &Encoding<ByteArray>, value: &[u8]) -> Result<()> {
        encoding
            .encode(
                &mut self.core_data_writer,
                &mut self.external_data_writers,
                value,
            )
            .map_err(Error::Io)
    }

    pub(super) fn write_record(&mut self, record: &Record) -> Result<()> {
        let encodings = &self.compression_header.data_series_encodings;
        let preservation_map = &self.compression_header.preservation_map;

        let encoding = require(&encodings.bam_flags, "BF")?;
        self.encode_int(encoding, i32::from(record.bam_flags.bits()))?;

        let encoding = require(&encodings.cram_flags, "CF")?;
        self.encode_int(encoding, i32::from(record.cram_flags.bits()))?;

        if self.reference_context.is_multi() {
            let n = record
                .reference_sequence_id
                .map_or(MISSING_REFERENCE_SEQUENCE_ID, |id| id as i32);

            let encoding = require(&encodings.reference_sequence_ids, "RI")?;
            self.encode_int(encoding, n)?;
        }

        let encoding = require(&encodings.read_lengths, "RL")?;
        self.encode_int(encoding, record.read_length as i32)?;

        let alignment_start = record
            .alignment_start
            .map(usize::from)
            .unwrap_or_default() as i32;

        let encoding = require(&encodings.alignment_starts, "AP")?;

        if preservation_map.ap_delta {
            self.encode_int(encoding, alignment_start - self.prev_alignment_start)?;
            self.prev_alignment_start = alignment_start;
        } else {
            self.encode_int(encoding, alignment_start)?;
        }

        let encoding = require(&encodings.read_group_ids, "RG")?;
        let n = record
            .read_group_id
            .map_or(MISSING_READ_GROUP_ID, |id| id as i32);
        self.encode_int(encoding, n)?;

        if preservation_map.read_names_included {
            let encoding = require(&encodings.names, "RN")?;
            let name: &[u8] = record.name.as_ref().map(|s| s.as_slice()).unwrap_or_default();
            self.encode_byte_array(encoding, name)?;
        }

        if record.cram_flags.is_detached() {
            let encoding = require(&encodings.mate_flags, "MF")?;
            self.encode_int(encoding, i32::from(record.mate_flags.bits()))?;

            if !preservation_map.read_names_included {
                let encoding = require(&encodings.names, "RN")?;
                let name: &[u8] = record.name.as_ref().map(|s| s.as_slice()).unwrap_or_default();
                self.encode_byte_array(encoding, name)?;
            }

            let encoding = require(&encodings.mate_reference_sequence_ids, "NS")?;
            let n = record
                .mate_reference_sequence_id
                .map_or(MISSING_REFERENCE_SEQUENCE_ID, |id| id as i32);
            self.encode_int(encoding, n)?;

            let encoding = require(&encodings.mate_alignment_starts, "NP")?;
            let n = record
                .mate_alignment_start
                .map(usize::from)
                .unwrap_or_default() as i32;
            self.encode_int(encoding, n)?;

            let encoding = require(&encodings.template_lengths, "TS")?;
            let n = i32::try_from(record.template_length)
                .map_err(|_| Error::RecordValidation("template length overflow".into()))?;
            self.encode_int(encoding, n)?;
        } else if record.cram_flags.has_mate_downstream() {
            let distance = record.mate_distance.ok_or(Error::InvalidState(
                "record has a downstream mate but no mate distance",
            ))?;

            let encoding = require(&encodings.mate_distances, "NF")?;
            self.encode_int(encoding, distance as i32)?;
        }

        self.write_tags(record)?;

        if !record.bam_flags.is_unmapped() {
            self.write_features(record)?;

            let encoding = require(&encodings.mapping_qualities, "MQ")?;
            let n = record
                .mapping_quality
                .map_or(MISSING_MAPPING_QUALITY, i32::from);
            self.encode_int(encoding, n)?;

            if record.cram_flags.quality_scores_are_preserved() {
                self.write_quality_scores(record)?;
            }
        } else {
            if !record.cram_flags.has_unknown_bases() {
                let encoding = require(&encodings.bases, "BA")?;

                for i in 0..record.read_length {
                    let base = record.sequence.get(i).copied().unwrap_or(b'N');
                    self.encode_byte(encoding, base)?;
                }
            }

            if record.cram_flags.quality_scores_are_preserved() {
                self.write_quality_scores(record)?;
            }
        }

        Ok(())
    }

    fn write_tags(&mut self, record: &Record) -> Result<()> {
        let encodings = &self.compression_header.data_series_encodings;
        let tag_sets = &self.compression_header.preservation_map.tag_sets;

        let keys: Vec<_> = record
            .tags
            .iter()
            .map(|(tag, value)| tag_sets::Key::new(*tag, value.ty()))
            .collect();

        let tag_set_id = tag_sets.position(&keys).ok_or(Error::InvalidState(
            "record tag set missing from the tag dictionary",
        ))?;

        let encoding = require(&encodings.tag_set_ids, "TL")?;
        self.encode_int(encoding, tag_set_id as i32)?;

        for ((_, value), key) in record.tags.iter().zip(&keys) {
            let id = ContentId::from(*key);

            let mut buf = Vec::new();
            value.encode_into(&mut buf);

            let encoding = self
                .compression_header
                .tag_encodings
                .get(&id)
                .ok_or_else(|| Error::Malformed(format!("missing tag encoding: {id}")))?;

            encoding
                .encode(
                    &mut self.core_data_writer,
                    &mut self.external_data_writers,
                    &buf,
                )
                .map_err(Error::Io)?;
        }

        Ok(())
    }

    fn write_features(&mut self, record: &Record) -> Result<()> {
        let encodings = &self.compression_header.data_series_encodings;
        let substitution_matrix = &self
            .compression_header
            .preservation_map
            .substitution_matrix;

        let encoding = require(&encodings.feature_counts, "FN")?;
        self.encode_int(encoding, record.features.len() as i32)?;

        let mut prev_position = 0;

        for feature in &record.features {
            let position = usize::from(feature.position());

            let encoding = require(&encodings.feature_codes, "FC")?;
            self.encode_byte(encoding, feature.code())?;

            let delta = position.checked_sub(prev_position).ok_or_else(|| {
                Error::RecordValidation("read features out of position order".into())
            })?;

            let encoding = require(&encodings.feature_positions, "FP")?;
            self.encode_int(encoding, delta as i32)?;
            prev_position = position;

            match feature {
                Feature::Bases { bases, .. } => {
                    let encoding = require(&encodings.stretches_of_bases, "BB")?;
                    self.encode_byte_array(encoding, bases)?;
                }
                Feature::Scores { quality_scores, .. } => {
                    let encoding = require(&encodings.stretches_of_quality_scores, "QQ")?;
                    self.encode_byte_array(encoding, quality_scores)?;
                }
                Feature::ReadBase {
                    base,
                    quality_score,
                    ..
                } => {
                    let encoding = require(&encodings.bases, "BA")?;
                    self.encode_byte(encoding, *base)?;

                    let encoding = require(&encodings.quality_scores, "QS")?;
                    self.encode_byte(encoding, *quality_score)?;
                }
                Feature::Substitution { value, .. } => {
                    let code = match value {
                        substitution::Value::Code(code) => *code,
                        substitution::Value::Bases(reference_base, read_base) => {
                            substitution_matrix.find(*reference_base, *read_base)
                        }
                    };

                    let encoding = require(&encodings.base_substitution_codes, "BS")?;
                    self.encode_byte(encoding, code)?;
                }
                Feature::Insertion { bases, .. } => {
                    let encoding = require(&encodings.insertion_bases, "IN")?;
                    self.encode_byte_array(encoding, bases)?;
                }
                Feature::Deletion { len, .. } => {
                    let encoding = require(&encodings.deletion_lengths, "DL")?;
                    self.encode_int(encoding, *len as i32)?;
                }
                Feature::InsertBase { base, .. } => {
                    let encoding = require(&encodings.bases, "BA")?;
                    self.encode_byte(encoding, *base)?;
                }
                Feature::QualityScore { quality_score, .. } => {
                    let encoding = require(&encodings.quality_scores, "QS")?;
                    self.encode_byte(encoding, *quality_score)?;
                }
                Feature::ReferenceSkip { len, .. } => {
                    let encoding = require(&encodings.reference_skip_lengths, "RS")?;
                    self.encode_int(encoding, *len as i32)?;
                }
                Feature::SoftClip { bases, .. } => {
                    let encoding = require(&encodings.soft_clip_bases, "SC")?;
                    self.encode_byte_array(encoding, bases)?;
                }
                Feature::Padding { len, .. } => {
                    let encoding = require(&encodings.padding_lengths, "PD")?;
                    self.encode_int(encoding, *len as i32)?;
                }
                Feature::HardClip { len, .. } => {
                    let encoding = require(&encodings.hard_clip_lengths, "HC")?;
                    self.encode_int(encoding, *len as i32)?;
                }
            }
        }

        Ok(())
    }

    fn write_quality_scores(&mut self, record: &Record) -> Result<()> {
        let encodings = &self.compression_header.data_series_encodings;
        let encoding = require(&encodings.quality_scores, "QS")?;

        for i in 0..record.read_length {
            let score = record.quality_scores.get(i).copied().unwrap_or(0xff);
            self.encode_byte(encoding, score)?;
        }

        Ok(())
    }
}
