//! Reconstruction of bases, quality scores, and CIGARs from read features.

use noodles_core::Position;

use super::{Feature, feature::substitution};
use crate::{
    alignment::cigar::{Cigar, Kind, Op},
    container::compression_header::preservation_map::substitution_matrix::{
        Base, SubstitutionMatrix,
    },
    error::{Error, Result},
};

/// The quality score used for positions with no recorded score.
pub(crate) const MISSING_QUALITY_SCORE: u8 = 0xff;

/// A window of reference bases starting at a known 0-based offset of the
/// full reference sequence.
#[derive(Clone, Copy)]
pub(crate) struct ReferenceSlab<'a> {
    bases: &'a [u8],
    offset: usize,
}

impl<'a> ReferenceSlab<'a> {
    pub(crate) fn new(bases: &'a [u8], offset: usize) -> Self {
        Self { bases, offset }
    }

    fn get(&self, pos: usize) -> Result<u8> {
        pos.checked_sub(self.offset)
            .and_then(|i| self.bases.get(i))
            .copied()
            .ok_or_else(|| {
                Error::RecordValidation(format!("reference position {pos} out of bounds"))
            })
    }

    fn slice(&self, pos: usize, len: usize) -> Result<&'a [u8]> {
        pos.checked_sub(self.offset)
            .and_then(|i| self.bases.get(i..i + len))
            .ok_or_else(|| {
                Error::RecordValidation(format!(
                    "reference interval [{pos}, {}) out of bounds",
                    pos + len
                ))
            })
    }
}

fn feature_index(feature: &Feature, read_pos: usize, read_length: usize) -> Result<usize> {
    let pos = usize::from(feature.position());

    // Non-consuming features (clips, deletions, skips, padding) may sit one
    // past the last base.
    let max = match feature {
        Feature::Deletion { .. }
        | Feature::ReferenceSkip { .. }
        | Feature::Padding { .. }
        | Feature::HardClip { .. } => read_length + 1,
        _ => read_length,
    };

    if pos < read_pos + 1 || pos > max {
        return Err(Error::RecordValidation(format!(
            "feature position {pos} out of range (read length {read_length})"
        )));
    }

    Ok(pos - 1)
}

/// Restores read bases from the reference slab and the feature edit script.
///
/// Positions with no feature are copied from the reference; substitutions are
/// resolved through the substitution matrix.
pub(crate) fn resolve_bases(
    reference: Option<ReferenceSlab<'_>>,
    substitution_matrix: &SubstitutionMatrix,
    features: &[Feature],
    alignment_start: Position,
    read_length: usize,
) -> Result<Vec<u8>> {
    let mut buf = vec![b'N'; read_length];

    // 0-based coordinates
    let mut ref_pos = usize::from(alignment_start) - 1;
    let mut read_pos = 0;

    let reference = |pos, len| {
        reference
            .ok_or(Error::InvalidState(
                "reference required to restore read bases",
            ))
            .and_then(|slab| slab.slice(pos, len))
    };

    for feature in features {
        let i = feature_index(feature, read_pos, read_length)?;

        if i > read_pos {
            let len = i - read_pos;
            buf[read_pos..i].copy_from_slice(reference(ref_pos, len)?);
            ref_pos += len;
            read_pos = i;
        }

        match feature {
            Feature::Bases { bases, .. } => {
                let end = checked_end(read_pos, bases.len(), read_length)?;
                buf[read_pos..end].copy_from_slice(bases);
                read_pos = end;
                ref_pos += bases.len();
            }
            Feature::Scores { .. } | Feature::QualityScore { .. } => {}
            Feature::ReadBase { base, .. } => {
                buf[read_pos] = *base;
                read_pos += 1;
                ref_pos += 1;
            }
            Feature::Substitution { value, .. } => {
                let code = match value {
                    substitution::Value::Code(code) => *code,
                    substitution::Value::Bases(..) => {
                        return Err(Error::InvalidState(
                            "substitution features must be decoded before base restoration",
                        ));
                    }
                };

                let reference_base = reference(ref_pos, 1)?[0];
                let reference_base = Base::try_from(reference_base).unwrap_or(Base::N);
                buf[read_pos] = u8::from(substitution_matrix.get(reference_base, code));
                read_pos += 1;
                ref_pos += 1;
            }
            Feature::Insertion { bases, .. } | Feature::SoftClip { bases, .. } => {
                let end = checked_end(read_pos, bases.len(), read_length)?;
                buf[read_pos..end].copy_from_slice(bases);
                read_pos = end;
            }
            Feature::InsertBase { base, .. } => {
                buf[read_pos] = *base;
                read_pos += 1;
            }
            Feature::Deletion { len, .. } | Feature::ReferenceSkip { len, .. } => {
                ref_pos += len;
            }
            Feature::Padding { .. } | Feature::HardClip { .. } => {}
        }
    }

    if read_pos < read_length {
        let len = read_length - read_pos;
        buf[read_pos..].copy_from_slice(reference(ref_pos, len)?);
    }

    Ok(buf)
}

fn checked_end(read_pos: usize, len: usize, read_length: usize) -> Result<usize> {
    let end = read_pos + len;

    if end > read_length {
        return Err(Error::RecordValidation(format!(
            "feature runs past the read end: {end} > {read_length}"
        )));
    }

    Ok(end)
}

/// Rebuilds per-base quality scores from feature overrides.
///
/// Positions with no recorded score are filled with
/// [`MISSING_QUALITY_SCORE`].
pub(crate) fn resolve_quality_scores(features: &[Feature], read_length: usize) -> Vec<u8> {
    let mut buf = vec![MISSING_QUALITY_SCORE; read_length];

    for feature in features {
        let i = usize::from(feature.position()) - 1;

        match feature {
            Feature::ReadBase { quality_score, .. } | Feature::QualityScore { quality_score, .. } => {
                if let Some(slot) = buf.get_mut(i) {
                    *slot = *quality_score;
                }
            }
            Feature::Scores { quality_scores, .. } => {
                let end = (i + quality_scores.len()).min(read_length);

                if i < end {
                    buf[i..end].copy_from_slice(&quality_scores[..end - i]);
                }
            }
            _ => {}
        }
    }

    buf
}

/// Derives the CIGAR from the feature edit script.
///
/// Feature-free positions are implicit matches.
pub(crate) fn resolve_cigar(features: &[Feature], read_length: usize) -> Cigar {
    let mut ops: Vec<Op> = Vec::new();
    let mut read_pos = 0;

    fn push(ops: &mut Vec<Op>, kind: Kind, len: usize) {
        if len == 0 {
            return;
        }

        if let Some(last) = ops.last_mut() {
            if last.kind() == kind {
                *last = Op::new(kind, last.len() + len);
                return;
            }
        }

        ops.push(Op::new(kind, len));
    }

    for feature in features {
        let i = usize::from(feature.position()) - 1;

        if i > read_pos {
            push(&mut ops, Kind::Match, i - read_pos);
            read_pos = i;
        }

        match feature {
            Feature::Bases { bases, .. } => {
                push(&mut ops, Kind::Match, bases.len());
                read_pos += bases.len();
            }
            Feature::Scores { .. } | Feature::QualityScore { .. } => {}
            Feature::ReadBase { .. } | Feature::Substitution { .. } => {
                push(&mut ops, Kind::Match, 1);
                read_pos += 1;
            }
            Feature::Insertion { bases, .. } => {
                push(&mut ops, Kind::Insertion, bases.len());
                read_pos += bases.len();
            }
            Feature::InsertBase { .. } => {
                push(&mut ops, Kind::Insertion, 1);
                read_pos += 1;
            }
            Feature::SoftClip { bases, .. } => {
                push(&mut ops, Kind::SoftClip, bases.len());
                read_pos += bases.len();
            }
            Feature::Deletion { len, .. } => push(&mut ops, Kind::Deletion, *len),
            Feature::ReferenceSkip { len, .. } => push(&mut ops, Kind::Skip, *len),
            Feature::Padding { len, .. } => push(&mut ops, Kind::Pad, *len),
            Feature::HardClip { len, .. } => push(&mut ops, Kind::HardClip, *len),
        }
    }

    if read_pos < read_length {
        push(&mut ops, Kind::Match, read_length - read_pos);
    }

    ops.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(n: usize) -> Position {
        Position::new(n).unwrap()
    }

    #[test]
    fn test_resolve_bases_all_matches() -> Result<()> {
        let slab = ReferenceSlab::new(b"ACGTACGT", 0);
        let matrix = SubstitutionMatrix::default();

        let bases = resolve_bases(Some(slab), &matrix, &[], position(1), 4)?;
        assert_eq!(bases, b"ACGT");

        let bases = resolve_bases(Some(slab), &matrix, &[], position(3), 4)?;
        assert_eq!(bases, b"GTAC");

        Ok(())
    }

    #[test]
    fn test_resolve_bases_with_substitution() -> Result<()> {
        let slab = ReferenceSlab::new(b"ACGTACGT", 0);
        let matrix = SubstitutionMatrix::default();

        // reference C at read position 2, substituted with T
        let code = matrix.find(Base::C, Base::T);
        let features = [Feature::Substitution {
            position: position(2),
            value: substitution::Value::Code(code),
        }];

        let bases = resolve_bases(Some(slab), &matrix, &features, position(1), 4)?;
        assert_eq!(bases, b"ATGT");

        Ok(())
    }

    #[test]
    fn test_resolve_bases_with_indels_and_clips() -> Result<()> {
        let slab = ReferenceSlab::new(b"ACGTACGT", 0);
        let matrix = SubstitutionMatrix::default();

        // 2S2M1I2M over reference starting at position 3
        let features = [
            Feature::SoftClip {
                position: position(1),
                bases: b"TT".to_vec(),
            },
            Feature::InsertBase {
                position: position(5),
                base: b'G',
            },
        ];

        let bases = resolve_bases(Some(slab), &matrix, &features, position(3), 8)?;
        assert_eq!(bases, b"TTGTGACG");

        // 2M2D2M
        let features = [Feature::Deletion {
            position: position(3),
            len: 2,
        }];

        let bases = resolve_bases(Some(slab), &matrix, &features, position(1), 4)?;
        assert_eq!(bases, b"ACAC");

        Ok(())
    }

    #[test]
    fn test_resolve_bases_with_out_of_range_feature() {
        let slab = ReferenceSlab::new(b"ACGTACGT", 0);
        let matrix = SubstitutionMatrix::default();

        let features = [Feature::ReadBase {
            position: position(9),
            base: b'A',
            quality_score: 0,
        }];

        assert!(matches!(
            resolve_bases(Some(slab), &matrix, &features, position(1), 4),
            Err(Error::RecordValidation(_))
        ));
    }

    #[test]
    fn test_resolve_bases_without_reference() {
        let matrix = SubstitutionMatrix::default();

        assert!(matches!(
            resolve_bases(None, &matrix, &[], position(1), 4),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_resolve_quality_scores() {
        let features = [
            Feature::QualityScore {
                position: position(2),
                quality_score: 30,
            },
            Feature::Scores {
                position: position(3),
                quality_scores: vec![40, 41],
            },
        ];

        let scores = resolve_quality_scores(&features, 5);
        assert_eq!(scores, [0xff, 30, 40, 41, 0xff]);
    }

    #[test]
    fn test_resolve_cigar() {
        fn cigar_string(cigar: &Cigar) -> String {
            cigar
                .as_ref()
                .iter()
                .map(|op| format!("{}{}", op.len(), op.kind().as_char()))
                .collect()
        }

        assert_eq!(cigar_string(&resolve_cigar(&[], 4)), "4M");

        let features = [
            Feature::SoftClip {
                position: position(1),
                bases: b"TT".to_vec(),
            },
            Feature::Deletion {
                position: position(5),
                len: 3,
            },
            Feature::Insertion {
                position: position(7),
                bases: b"AC".to_vec(),
            },
        ];

        assert_eq!(cigar_string(&resolve_cigar(&features, 10)), "2S2M3D2M2I2M");

        let features = [
            Feature::HardClip {
                position: position(1),
                len: 2,
            },
            Feature::Substitution {
                position: position(3),
                value: substitution::Value::Code(0),
            },
        ];

        assert_eq!(cigar_string(&resolve_cigar(&features, 4)), "2H4M");
    }
}
