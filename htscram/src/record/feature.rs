//! Read features: the per-read edit script against the reference.

pub mod substitution;

use noodles_core::Position;

/// A read feature.
///
/// Positions are 1-based within the read. A position with no feature is an
/// implicit match against the reference.
#[derive(Clone, Debug, PartialEq)]
pub enum Feature {
    /// A stretch of read bases (`b`).
    Bases {
        /// The 1-based position in the read.
        position: Position,
        /// The bases.
        bases: Vec<u8>,
    },
    /// A stretch of quality scores (`q`).
    Scores {
        /// The 1-based position in the read.
        position: Position,
        /// The quality scores.
        quality_scores: Vec<u8>,
    },
    /// A single base with its quality score (`B`).
    ReadBase {
        /// The 1-based position in the read.
        position: Position,
        /// The base.
        base: u8,
        /// The quality score.
        quality_score: u8,
    },
    /// A base substitution against the reference (`X`).
    Substitution {
        /// The 1-based position in the read.
        position: Position,
        /// The substitution, as a matrix code or as resolved bases.
        value: substitution::Value,
    },
    /// An insertion (`I`).
    Insertion {
        /// The 1-based position in the read.
        position: Position,
        /// The inserted bases.
        bases: Vec<u8>,
    },
    /// A deletion from the reference (`D`).
    Deletion {
        /// The 1-based position in the read.
        position: Position,
        /// The number of deleted reference bases.
        len: usize,
    },
    /// A single inserted base (`i`).
    InsertBase {
        /// The 1-based position in the read.
        position: Position,
        /// The inserted base.
        base: u8,
    },
    /// A single quality score override (`Q`).
    QualityScore {
        /// The 1-based position in the read.
        position: Position,
        /// The quality score.
        quality_score: u8,
    },
    /// A reference skip (`N`).
    ReferenceSkip {
        /// The 1-based position in the read.
        position: Position,
        /// The number of skipped reference bases.
        len: usize,
    },
    /// A soft clip (`S`).
    SoftClip {
        /// The 1-based position in the read.
        position: Position,
        /// The clipped bases.
        bases: Vec<u8>,
    },
    /// Padding (`P`).
    Padding {
        /// The 1-based position in the read.
        position: Position,
        /// The pad length.
        len: usize,
    },
    /// A hard clip (`H`).
    HardClip {
        /// The 1-based position in the read.
        position: Position,
        /// The clip length.
        len: usize,
    },
}

impl Feature {
    /// Returns the 1-based in-read position.
    pub fn position(&self) -> Position {
        match self {
            Self::Bases { position, .. }
            | Self::Scores { position, .. }
            | Self::ReadBase { position, .. }
            | Self::Substitution { position, .. }
            | Self::Insertion { position, .. }
            | Self::Deletion { position, .. }
            | Self::InsertBase { position, .. }
            | Self::QualityScore { position, .. }
            | Self::ReferenceSkip { position, .. }
            | Self::SoftClip { position, .. }
            | Self::Padding { position, .. }
            | Self::HardClip { position, .. } => *position,
        }
    }

    /// Returns the feature operator code (the FC data series).
    pub(crate) fn code(&self) -> u8 {
        match self {
            Self::Bases { .. } => b'b',
            Self::Scores { .. } => b'q',
            Self::ReadBase { .. } => b'B',
            Self::Substitution { .. } => b'X',
            Self::Insertion { .. } => b'I',
            Self::Deletion { .. } => b'D',
            Self::InsertBase { .. } => b'i',
            Self::QualityScore { .. } => b'Q',
            Self::ReferenceSkip { .. } => b'N',
            Self::SoftClip { .. } => b'S',
            Self::Padding { .. } => b'P',
            Self::HardClip { .. } => b'H',
        }
    }
}
