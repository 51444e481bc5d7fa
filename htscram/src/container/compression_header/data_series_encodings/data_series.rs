use std::{error, fmt};

use crate::container::block::ContentId;

/// A CRAM data series: one of the logical fields extracted across records.
///
/// Each series has a canonical two-letter name and a stable external block
/// content ID (its ordinal plus one). `TC` and `TN` are legacy CRAM 2.x
/// series: they are declared for completeness but never encoded.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DataSeries {
    /// BAM flags (`BF`).
    BamFlags,
    /// CRAM flags (`CF`).
    CramFlags,
    /// Reference sequence IDs (`RI`).
    ReferenceSequenceIds,
    /// Read lengths (`RL`).
    ReadLengths,
    /// Alignment starts, possibly delta-encoded (`AP`).
    AlignmentStarts,
    /// Read group IDs (`RG`).
    ReadGroupIds,
    /// Read names (`RN`).
    Names,
    /// Mate flags (`MF`).
    MateFlags,
    /// Mate reference sequence IDs (`NS`).
    MateReferenceSequenceIds,
    /// Mate alignment starts (`NP`).
    MateAlignmentStarts,
    /// Template lengths (`TS`).
    TemplateLengths,
    /// Distances to the next fragment (`NF`).
    MateDistances,
    /// Tag set IDs (`TL`).
    TagSetIds,
    /// Feature counts (`FN`).
    FeatureCounts,
    /// Feature operator codes (`FC`).
    FeatureCodes,
    /// Feature position deltas (`FP`).
    FeaturePositions,
    /// Deletion lengths (`DL`).
    DeletionLengths,
    /// Stretches of bases (`BB`).
    StretchesOfBases,
    /// Stretches of quality scores (`QQ`).
    StretchesOfQualityScores,
    /// Base substitution codes (`BS`).
    BaseSubstitutionCodes,
    /// Insertion bases (`IN`).
    InsertionBases,
    /// Reference skip lengths (`RS`).
    ReferenceSkipLengths,
    /// Padding lengths (`PD`).
    PaddingLengths,
    /// Hard clip lengths (`HC`).
    HardClipLengths,
    /// Soft clip bases (`SC`).
    SoftClipBases,
    /// Mapping qualities (`MQ`).
    MappingQualities,
    /// Bases (`BA`).
    Bases,
    /// Quality scores (`QS`).
    QualityScores,
    /// Legacy test mark (`TC`).
    ReservedTc,
    /// Legacy test mark (`TN`).
    ReservedTn,
}

/// All data series, in content-ID order.
pub(crate) const ALL_DATA_SERIES: [DataSeries; 30] = [
    DataSeries::BamFlags,
    DataSeries::CramFlags,
    DataSeries::ReferenceSequenceIds,
    DataSeries::ReadLengths,
    DataSeries::AlignmentStarts,
    DataSeries::ReadGroupIds,
    DataSeries::Names,
    DataSeries::MateFlags,
    DataSeries::MateReferenceSequenceIds,
    DataSeries::MateAlignmentStarts,
    DataSeries::TemplateLengths,
    DataSeries::MateDistances,
    DataSeries::TagSetIds,
    DataSeries::FeatureCounts,
    DataSeries::FeatureCodes,
    DataSeries::FeaturePositions,
    DataSeries::DeletionLengths,
    DataSeries::StretchesOfBases,
    DataSeries::StretchesOfQualityScores,
    DataSeries::BaseSubstitutionCodes,
    DataSeries::InsertionBases,
    DataSeries::ReferenceSkipLengths,
    DataSeries::PaddingLengths,
    DataSeries::HardClipLengths,
    DataSeries::SoftClipBases,
    DataSeries::MappingQualities,
    DataSeries::Bases,
    DataSeries::QualityScores,
    DataSeries::ReservedTc,
    DataSeries::ReservedTn,
];

/// The data series written by this crate: everything except the legacy
/// `TC`/`TN` marks.
pub(crate) const STANDARD_DATA_SERIES: [DataSeries; 28] = [
    DataSeries::BamFlags,
    DataSeries::CramFlags,
    DataSeries::ReferenceSequenceIds,
    DataSeries::ReadLengths,
    DataSeries::AlignmentStarts,
    DataSeries::ReadGroupIds,
    DataSeries::Names,
    DataSeries::MateFlags,
    DataSeries::MateReferenceSequenceIds,
    DataSeries::MateAlignmentStarts,
    DataSeries::TemplateLengths,
    DataSeries::MateDistances,
    DataSeries::TagSetIds,
    DataSeries::FeatureCounts,
    DataSeries::FeatureCodes,
    DataSeries::FeaturePositions,
    DataSeries::DeletionLengths,
    DataSeries::StretchesOfBases,
    DataSeries::StretchesOfQualityScores,
    DataSeries::BaseSubstitutionCodes,
    DataSeries::InsertionBases,
    DataSeries::ReferenceSkipLengths,
    DataSeries::PaddingLengths,
    DataSeries::HardClipLengths,
    DataSeries::SoftClipBases,
    DataSeries::MappingQualities,
    DataSeries::Bases,
    DataSeries::QualityScores,
];

impl DataSeries {
    /// Returns the canonical two-letter name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BamFlags => "BF",
            Self::CramFlags => "CF",
            Self::ReferenceSequenceIds => "RI",
            Self::ReadLengths => "RL",
            Self::AlignmentStarts => "AP",
            Self::ReadGroupIds => "RG",
            Self::Names => "RN",
            Self::MateFlags => "MF",
            Self::MateReferenceSequenceIds => "NS",
            Self::MateAlignmentStarts => "NP",
            Self::TemplateLengths => "TS",
            Self::MateDistances => "NF",
            Self::TagSetIds => "TL",
            Self::FeatureCounts => "FN",
            Self::FeatureCodes => "FC",
            Self::FeaturePositions => "FP",
            Self::DeletionLengths => "DL",
            Self::StretchesOfBases => "BB",
            Self::StretchesOfQualityScores => "QQ",
            Self::BaseSubstitutionCodes => "BS",
            Self::InsertionBases => "IN",
            Self::ReferenceSkipLengths => "RS",
            Self::PaddingLengths => "PD",
            Self::HardClipLengths => "HC",
            Self::SoftClipBases => "SC",
            Self::MappingQualities => "MQ",
            Self::Bases => "BA",
            Self::QualityScores => "QS",
            Self::ReservedTc => "TC",
            Self::ReservedTn => "TN",
        }
    }
}

/// An error returned when two bytes are not a data series name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TryFromByteArrayError([u8; 2]);

impl error::Error for TryFromByteArrayError {}

impl fmt::Display for TryFromByteArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid data series: {:#x?}", self.0)
    }
}

impl TryFrom<[u8; 2]> for DataSeries {
    type Error = TryFromByteArrayError;

    fn try_from(b: [u8; 2]) -> Result<Self, Self::Error> {
        ALL_DATA_SERIES
            .into_iter()
            .find(|series| series.name().as_bytes() == b)
            .ok_or(TryFromByteArrayError(b))
    }
}

impl From<DataSeries> for [u8; 2] {
    fn from(series: DataSeries) -> Self {
        let name = series.name().as_bytes();
        [name[0], name[1]]
    }
}

impl From<DataSeries> for ContentId {
    fn from(series: DataSeries) -> Self {
        let i = ALL_DATA_SERIES
            .iter()
            .position(|s| *s == series)
            .expect("all variants are listed");

        (i + 1) as ContentId
    }
}
