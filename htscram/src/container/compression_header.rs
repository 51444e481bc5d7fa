//! The per-container compression header.

pub mod data_series_encodings;
pub mod encoding;
pub mod preservation_map;

use indexmap::IndexMap;

pub use self::{
    data_series_encodings::{DataSeries, DataSeriesEncodings},
    encoding::Encoding,
    preservation_map::{PreservationMap, SubstitutionMatrix, TagSets},
};
use super::block::ContentId;
use self::encoding::codec::ByteArray;

/// Encodings for tag values, keyed by tag block content ID.
///
/// Insertion order is preserved so serialization is deterministic.
pub(crate) type TagEncodings = IndexMap<ContentId, Encoding<ByteArray>>;

/// The per-container schema: preservation flags, the substitution matrix,
/// the tag dictionary, and the mapping from each data series and tag to an
/// encoding.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CompressionHeader {
    pub(crate) preservation_map: PreservationMap,
    pub(crate) data_series_encodings: DataSeriesEncodings,
    pub(crate) tag_encodings: TagEncodings,
}

impl CompressionHeader {
    pub(crate) fn new(
        preservation_map: PreservationMap,
        data_series_encodings: DataSeriesEncodings,
        tag_encodings: TagEncodings,
    ) -> Self {
        Self {
            preservation_map,
            data_series_encodings,
            tag_encodings,
        }
    }

    /// Returns the preservation map.
    pub fn preservation_map(&self) -> &PreservationMap {
        &self.preservation_map
    }

    /// Returns the data series encodings.
    pub fn data_series_encodings(&self) -> &DataSeriesEncodings {
        &self.data_series_encodings
    }

    pub(crate) fn tag_encodings(&self) -> &TagEncodings {
        &self.tag_encodings
    }
}
