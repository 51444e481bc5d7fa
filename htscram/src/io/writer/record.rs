use noodles_core::Position;

use crate::{
    alignment,
    alignment::cigar::Kind,
    container::compression_header::preservation_map::substitution_matrix::Base,
    error::{Error, Result},
    record::{CramFlags, Feature, MateFlags, Record, feature::substitution},
};

/// Converts an alignment record into a CRAM record, building the feature
/// edit script against the reference.
///
/// Match runs are diffed base-by-base against `reference`; mismatches become
/// substitution features carrying the resolved base pair (codes are assigned
/// once the container's substitution matrix is built). Without a reference,
/// match runs are stored verbatim as base stretches.
pub(crate) fn build_record(
    record: &alignment::Record,
    reference: Option<&[u8]>,
) -> Result<Record> {
    let bam_flags = record.flags;
    let mut cram_flags = CramFlags::default();

    let read_length = if record.sequence.is_empty() {
        record.cigar.read_len()
    } else {
        record.sequence.len()
    };

    if record.sequence.is_empty() && read_length > 0 {
        cram_flags.insert(CramFlags::UNKNOWN_BASES);
    }

    if !record.quality_scores.is_empty() {
        if record.quality_scores.len() != read_length {
            return Err(Error::RecordValidation(format!(
                "quality score length mismatch: expected {read_length}, got {}",
                record.quality_scores.len()
            )));
        }

        cram_flags.insert(CramFlags::FORCE_PRESERVE_QUALITY_SCORES);
    }

    if record.alignment_start.is_none() && !bam_flags.is_unmapped() {
        tracing::warn!(
            name = ?record.name,
            "record appears mapped but has no valid alignment start"
        );
    }

    let features = if bam_flags.is_unmapped() || cram_flags.has_unknown_bases() {
        Vec::new()
    } else {
        build_features(record, reference)?
    };

    // Mate strand and mapping are kept in both the BAM flags and the mate
    // flags.
    let mut mate_flags = MateFlags::default();

    if bam_flags.is_mate_reverse_complemented() {
        mate_flags.insert(MateFlags::ON_NEGATIVE_STRAND);
    }

    if bam_flags.is_mate_unmapped() {
        mate_flags.insert(MateFlags::UNMAPPED);
    }

    Ok(Record {
        bam_flags,
        cram_flags,
        reference_sequence_id: record.reference_sequence_id,
        read_length,
        alignment_start: record.alignment_start,
        read_group_id: record.read_group_id,
        name: record.name.clone(),
        mate_flags,
        mate_reference_sequence_id: record.mate_reference_sequence_id,
        mate_alignment_start: record.mate_alignment_start,
        template_length: record.template_length,
        mate_distance: None,
        next_mate_index: None,
        tags: record.tags.clone(),
        features,
        mapping_quality: record.mapping_quality,
        sequence: record.sequence.clone(),
        quality_scores: record.quality_scores.clone(),
    })
}

fn build_features(
    record: &alignment::Record,
    reference: Option<&[u8]>,
) -> Result<Vec<Feature>> {
    let Some(alignment_start) = record.alignment_start else {
        return Ok(Vec::new());
    };

    let sequence = &record.sequence;

    let mut features = Vec::new();

    // 0-based coordinates
    let mut read_pos = 0;
    let mut ref_pos = usize::from(alignment_start) - 1;

    // A mapped record with no CIGAR is treated as fully matching.
    let full_match = [alignment::cigar::Op::new(Kind::Match, sequence.len())];
    let ops = if record.cigar.as_ref().is_empty() {
        &full_match[..]
    } else {
        record.cigar.as_ref()
    };

    for op in ops {
        let len = op.len();

        let position = Position::new(read_pos + 1)
            .ok_or_else(|| Error::RecordValidation("invalid read position".into()))?;

        match op.kind() {
            Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch => {
                let bases = sequence.get(read_pos..read_pos + len).ok_or_else(|| {
                    Error::RecordValidation("CIGAR runs past the sequence end".into())
                })?;

                match reference {
                    Some(reference) => {
                        diff_match_run(&mut features, bases, reference, read_pos, ref_pos)?;
                    }
                    None => features.push(Feature::Bases {
                        position,
                        bases: bases.to_vec(),
                    }),
                }
            }
            Kind::Insertion => {
                let bases = sequence.get(read_pos..read_pos + len).ok_or_else(|| {
                    Error::RecordValidation("CIGAR runs past the sequence end".into())
                })?;

                if len == 1 {
                    features.push(Feature::InsertBase {
                        position,
                        base: bases[0],
                    });
                } else {
                    features.push(Feature::Insertion {
                        position,
                        bases: bases.to_vec(),
                    });
                }
            }
            Kind::SoftClip => {
                let bases = sequence.get(read_pos..read_pos + len).ok_or_else(|| {
                    Error::RecordValidation("CIGAR runs past the sequence end".into())
                })?;

                features.push(Feature::SoftClip {
                    position,
                    bases: bases.to_vec(),
                });
            }
            Kind::Deletion => features.push(Feature::Deletion { position, len }),
            Kind::Skip => features.push(Feature::ReferenceSkip { position, len }),
            Kind::HardClip => features.push(Feature::HardClip { position, len }),
            Kind::Pad => features.push(Feature::Padding { position, len }),
        }

        if op.kind().consumes_read() {
            read_pos += len;
        }

        if op.kind().consumes_reference() {
            ref_pos += len;
        }
    }

    Ok(features)
}

fn diff_match_run(
    features: &mut Vec<Feature>,
    bases: &[u8],
    reference: &[u8],
    read_pos: usize,
    ref_pos: usize,
) -> Result<()> {
    for (i, &read_base) in bases.iter().enumerate() {
        let reference_base = *reference.get(ref_pos + i).ok_or_else(|| {
            Error::RecordValidation(format!(
                "alignment runs past the reference end at {}",
                ref_pos + i
            ))
        })?;

        if read_base.to_ascii_uppercase() == reference_base.to_ascii_uppercase() {
            continue;
        }

        let position = Position::new(read_pos + i + 1)
            .ok_or_else(|| Error::RecordValidation("invalid read position".into()))?;

        let reference_base = Base::try_from(reference_base).unwrap_or(Base::N);
        let read_base = Base::try_from(read_base).unwrap_or(Base::N);

        features.push(Feature::Substitution {
            position,
            value: substitution::Value::Bases(reference_base, read_base),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::cigar::Op;

    fn position(n: usize) -> Position {
        Position::new(n).unwrap()
    }

    #[test]
    fn test_build_record_with_matches_only() -> Result<()> {
        let record = alignment::Record {
            alignment_start: Some(position(3)),
            cigar: vec![Op::new(Kind::Match, 4)].into(),
            sequence: b"GTAC".to_vec(),
            ..Default::default()
        };

        let built = build_record(&record, Some(b"ACGTACGT"))?;

        assert!(built.features().is_empty());
        assert_eq!(built.read_length(), 4);

        Ok(())
    }

    #[test]
    fn test_build_record_with_substitutions() -> Result<()> {
        let record = alignment::Record {
            alignment_start: Some(position(1)),
            cigar: vec![Op::new(Kind::Match, 4)].into(),
            sequence: b"ATGT".to_vec(),
            ..Default::default()
        };

        let built = build_record(&record, Some(b"ACGTACGT"))?;

        assert_eq!(
            built.features(),
            [Feature::Substitution {
                position: position(2),
                value: substitution::Value::Bases(Base::C, Base::T),
            }]
        );

        Ok(())
    }

    #[test]
    fn test_build_record_with_clips_and_indels() -> Result<()> {
        let record = alignment::Record {
            alignment_start: Some(position(1)),
            cigar: vec![
                Op::new(Kind::SoftClip, 2),
                Op::new(Kind::Match, 2),
                Op::new(Kind::Deletion, 1),
                Op::new(Kind::Match, 1),
                Op::new(Kind::Insertion, 2),
                Op::new(Kind::HardClip, 3),
            ]
            .into(),
            sequence: b"TTACTGG".to_vec(),
            ..Default::default()
        };

        let built = build_record(&record, Some(b"ACGTACGT"))?;

        assert_eq!(
            built.features(),
            [
                Feature::SoftClip {
                    position: position(1),
                    bases: b"TT".to_vec(),
                },
                Feature::Deletion {
                    position: position(5),
                    len: 1,
                },
                Feature::Insertion {
                    position: position(6),
                    bases: b"GG".to_vec(),
                },
                Feature::HardClip {
                    position: position(8),
                    len: 3,
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn test_build_record_without_reference_stores_bases() -> Result<()> {
        let record = alignment::Record {
            alignment_start: Some(position(1)),
            cigar: vec![Op::new(Kind::Match, 4)].into(),
            sequence: b"ACGT".to_vec(),
            ..Default::default()
        };

        let built = build_record(&record, None)?;

        assert_eq!(
            built.features(),
            [Feature::Bases {
                position: position(1),
                bases: b"ACGT".to_vec(),
            }]
        );

        Ok(())
    }

    #[test]
    fn test_build_record_with_quality_scores_sets_preserve_flag() -> Result<()> {
        let record = alignment::Record {
            flags: crate::record::Flags::UNMAPPED,
            sequence: b"ACGT".to_vec(),
            quality_scores: vec![30; 4],
            ..Default::default()
        };

        let built = build_record(&record, None)?;

        assert!(built.cram_flags().quality_scores_are_preserved());
        assert!(built.features().is_empty());

        Ok(())
    }
}
