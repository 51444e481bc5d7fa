//! Encoding strategy configuration.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    codecs::{Encoder, rans::Order},
    container::{block::ContentId, compression_header::DataSeries},
    error::{Error, Result},
};

fn default_gzip_compression_level() -> u32 {
    6
}

fn default_records_per_slice() -> usize {
    10_000
}

fn default_slices_per_container() -> usize {
    1
}

fn default_min_single_reference_slice_size() -> usize {
    1_000
}

fn default_preserve_read_names() -> bool {
    true
}

/// Tunables governing how records are partitioned and compressed.
///
/// The strategy is JSON-persisted; field names follow the JSON form.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CramEncodingStrategy {
    /// gzip compression level, 0-10 (values above 9 are clamped at use).
    pub gzip_compression_level: u32,
    /// Maximum records per slice.
    pub records_per_slice: usize,
    /// Maximum slices per container.
    pub slices_per_container: usize,
    /// Single-reference slices smaller than this may be coalesced into a
    /// multi-reference slice on a reference change.
    pub min_single_reference_slice_size: usize,
    /// Whether to keep original read names.
    pub preserve_read_names: bool,
    /// Whether to embed reference subsequences in slices.
    pub embed_reference: bool,
    /// Whether to store all read bases verbatim instead of diffing against
    /// the reference.
    pub embed_bases: bool,
    /// Path to a JSON-serialized custom compression map.
    pub custom_compression_map_path: Option<PathBuf>,
}

impl CramEncodingStrategy {
    /// Validates field ranges.
    pub fn validate(&self) -> Result<()> {
        if self.gzip_compression_level > 10 {
            return Err(Error::InvalidState("gzip compression level out of range"));
        }

        if self.records_per_slice == 0 {
            return Err(Error::InvalidState("records per slice must be positive"));
        }

        if self.slices_per_container == 0 {
            return Err(Error::InvalidState("slices per container must be positive"));
        }

        Ok(())
    }

    /// Reads a JSON-serialized strategy.
    pub fn from_json_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let reader = File::open(path).map(BufReader::new)?;

        let strategy: Self = serde_json::from_reader(reader)
            .map_err(|e| Error::Malformed(format!("invalid encoding strategy: {e}")))?;

        strategy.validate()?;

        Ok(strategy)
    }

    /// Writes the strategy as JSON.
    pub fn to_json_path<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let writer = File::create(path).map(BufWriter::new)?;

        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        Ok(())
    }

    /// Resolves the compression map: the custom map when one is configured,
    /// the default map otherwise.
    pub fn compression_map(&self) -> Result<CompressionMap> {
        match &self.custom_compression_map_path {
            Some(path) => CompressionMap::from_json_path(path),
            None => Ok(CompressionMap::new(self.gzip_compression_level.min(9))),
        }
    }
}

impl Default for CramEncodingStrategy {
    fn default() -> Self {
        Self {
            gzip_compression_level: default_gzip_compression_level(),
            records_per_slice: default_records_per_slice(),
            slices_per_container: default_slices_per_container(),
            min_single_reference_slice_size: default_min_single_reference_slice_size(),
            preserve_read_names: default_preserve_read_names(),
            embed_reference: false,
            embed_bases: false,
            custom_compression_map_path: None,
        }
    }
}

/// A serializable compressor assignment.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "method")]
pub enum MethodSpec {
    /// Uncompressed.
    Raw,
    /// gzip with a level.
    Gzip {
        /// The compression level.
        level: u32,
    },
    /// bzip2 with a level.
    Bzip2 {
        /// The compression level.
        level: u32,
    },
    /// xz-framed LZMA with a level.
    Lzma {
        /// The compression level.
        level: u32,
    },
    /// rANS 4x8, order 0.
    RansOrder0,
    /// rANS 4x8, order 1.
    RansOrder1,
}

impl MethodSpec {
    fn encoder(self) -> Option<Encoder> {
        match self {
            Self::Raw => None,
            Self::Gzip { level } => Some(Encoder::Gzip(level.min(9))),
            Self::Bzip2 { level } => Some(Encoder::Bzip2(level.clamp(1, 9))),
            Self::Lzma { level } => Some(Encoder::Lzma(level.min(9))),
            Self::RansOrder0 => Some(Encoder::Rans4x8(Order::Zero)),
            Self::RansOrder1 => Some(Encoder::Rans4x8(Order::One)),
        }
    }
}

/// The mapping from block content to compressor.
///
/// Keys of the per-series map are the two-letter data series names; tag
/// blocks and unlisted series fall back to gzip.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionMap {
    core_data: MethodSpec,
    data_series: indexmap::IndexMap<String, MethodSpec>,
    tag_values: MethodSpec,
    #[serde(skip)]
    gzip_compression_level: u32,
}

impl CompressionMap {
    /// Builds the default map: rANS order-0 for the position-like series,
    /// rANS order-1 for the flag and base series, gzip elsewhere.
    pub fn new(gzip_compression_level: u32) -> Self {
        use DataSeries::*;

        let mut data_series = indexmap::IndexMap::new();

        for series in [AlignmentStarts, ReferenceSequenceIds] {
            data_series.insert(series.name().into(), MethodSpec::RansOrder0);
        }

        for series in [
            BamFlags,
            CramFlags,
            Bases,
            MateReferenceSequenceIds,
            QualityScores,
            ReadGroupIds,
            ReadLengths,
            TemplateLengths,
        ] {
            data_series.insert(series.name().into(), MethodSpec::RansOrder1);
        }

        Self {
            core_data: MethodSpec::Gzip {
                level: gzip_compression_level,
            },
            data_series,
            tag_values: MethodSpec::Gzip {
                level: gzip_compression_level,
            },
            gzip_compression_level,
        }
    }

    /// Reads a JSON-serialized map.
    pub fn from_json_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let reader = File::open(path).map(BufReader::new)?;

        let mut map: Self = serde_json::from_reader(reader)
            .map_err(|e| Error::Malformed(format!("invalid compression map: {e}")))?;

        map.gzip_compression_level = default_gzip_compression_level();

        Ok(map)
    }

    pub(crate) fn core_data_encoder(&self) -> Option<Encoder> {
        self.core_data.encoder()
    }

    pub(crate) fn encoder_for(&self, block_content_id: ContentId) -> Option<Encoder> {
        let spec = crate::container::compression_header::data_series_encodings::ALL_DATA_SERIES
            .into_iter()
            .find(|series| ContentId::from(*series) == block_content_id)
            .and_then(|series| self.data_series.get(series.name()))
            .copied();

        match spec {
            Some(spec) => spec.encoder(),
            // tag blocks and unlisted series
            None if block_content_id > 30 => self.tag_values.encoder(),
            None => Some(Encoder::Gzip(self.gzip_compression_level.min(9))),
        }
    }
}

impl Default for CompressionMap {
    fn default() -> Self {
        Self::new(default_gzip_compression_level())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strategy() {
        let strategy = CramEncodingStrategy::default();

        assert_eq!(strategy.gzip_compression_level, 6);
        assert_eq!(strategy.records_per_slice, 10_000);
        assert_eq!(strategy.slices_per_container, 1);
        assert!(strategy.preserve_read_names);
        assert!(strategy.validate().is_ok());
    }

    #[test]
    fn test_validate() {
        let strategy = CramEncodingStrategy {
            gzip_compression_level: 11,
            ..Default::default()
        };

        assert!(matches!(strategy.validate(), Err(Error::InvalidState(_))));

        let strategy = CramEncodingStrategy {
            records_per_slice: 0,
            ..Default::default()
        };

        assert!(matches!(strategy.validate(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_strategy_json_round_trip() {
        let strategy = CramEncodingStrategy::default();

        let json = serde_json::to_string(&strategy).unwrap();
        assert!(json.contains("\"gzipCompressionLevel\":6"));
        assert!(json.contains("\"recordsPerSlice\":10000"));

        let actual: CramEncodingStrategy = serde_json::from_str(&json).unwrap();
        assert_eq!(actual, strategy);
    }

    #[test]
    fn test_default_compression_map() {
        let map = CompressionMap::default();

        assert_eq!(
            map.encoder_for(ContentId::from(DataSeries::AlignmentStarts)),
            Some(Encoder::Rans4x8(Order::Zero))
        );
        assert_eq!(
            map.encoder_for(ContentId::from(DataSeries::BamFlags)),
            Some(Encoder::Rans4x8(Order::One))
        );
        assert_eq!(
            map.encoder_for(ContentId::from(DataSeries::Names)),
            Some(Encoder::Gzip(6))
        );

        // a tag block content ID
        assert_eq!(
            map.encoder_for((0x58 << 16) | (0x53 << 8) | 0x69),
            Some(Encoder::Gzip(6))
        );
    }
}
