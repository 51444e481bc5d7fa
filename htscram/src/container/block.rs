//! CRAM container blocks.

use crate::{
    codecs::{self, CompressorCache, Encoder},
    error::{Error, Result},
};

/// A block content ID.
///
/// Content IDs are meaningful for external data and core data blocks: each
/// external block is dedicated to one data series or one tag, and records
/// reference them by ID.
pub type ContentId = i32;

/// A block compression method.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CompressionMethod {
    /// Uncompressed.
    #[default]
    None,
    /// gzip (RFC 1952).
    Gzip,
    /// bzip2.
    Bzip2,
    /// xz-framed LZMA.
    Lzma,
    /// rANS 4x8.
    Rans4x8,
}

impl CompressionMethod {
    pub(crate) fn from_id(n: u8) -> Result<Self> {
        match n {
            0 => Ok(Self::None),
            1 => Ok(Self::Gzip),
            2 => Ok(Self::Bzip2),
            3 => Ok(Self::Lzma),
            4 => Ok(Self::Rans4x8),
            _ => Err(Error::Malformed(format!("invalid compression method: {n}"))),
        }
    }

    pub(crate) fn id(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Gzip => 1,
            Self::Bzip2 => 2,
            Self::Lzma => 3,
            Self::Rans4x8 => 4,
        }
    }
}

/// A block content type.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ContentType {
    /// The SAM header (in the header container).
    FileHeader,
    /// A compression header (first block of a data container).
    CompressionHeader,
    /// A slice header.
    SliceHeader,
    /// Reserved.
    Reserved,
    /// External data, dedicated to one data series or tag.
    #[default]
    ExternalData,
    /// Core data, the slice bitstream.
    CoreData,
}

impl ContentType {
    pub(crate) fn from_id(n: u8) -> Result<Self> {
        match n {
            0 => Ok(Self::FileHeader),
            1 => Ok(Self::CompressionHeader),
            2 => Ok(Self::SliceHeader),
            3 => Ok(Self::Reserved),
            4 => Ok(Self::ExternalData),
            5 => Ok(Self::CoreData),
            _ => Err(Error::Malformed(format!("invalid content type: {n}"))),
        }
    }

    pub(crate) fn id(&self) -> u8 {
        match self {
            Self::FileHeader => 0,
            Self::CompressionHeader => 1,
            Self::SliceHeader => 2,
            Self::Reserved => 3,
            Self::ExternalData => 4,
            Self::CoreData => 5,
        }
    }
}

/// A typed, optionally compressed byte buffer: the unit of on-wire I/O
/// within a container.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Block {
    pub(crate) compression_method: CompressionMethod,
    pub(crate) content_type: ContentType,
    pub(crate) content_id: ContentId,
    pub(crate) uncompressed_size: usize,
    pub(crate) data: Vec<u8>,
}

impl Block {
    /// Wraps `src` uncompressed.
    pub fn raw(content_type: ContentType, content_id: ContentId, src: Vec<u8>) -> Self {
        Self {
            compression_method: CompressionMethod::None,
            content_type,
            content_id,
            uncompressed_size: src.len(),
            data: src,
        }
    }

    /// Compresses `src` with the given encoder, or stores it raw when no
    /// encoder is given or the input is empty.
    pub fn compress(
        content_type: ContentType,
        content_id: ContentId,
        encoder: Option<Encoder>,
        cache: &mut CompressorCache,
        src: &[u8],
    ) -> Result<Self> {
        let (compression_method, data) = match encoder {
            Some(encoder) if !src.is_empty() => (encoder.method(), cache.compress(encoder, src)?),
            _ => (CompressionMethod::None, src.to_vec()),
        };

        Ok(Self {
            compression_method,
            content_type,
            content_id,
            uncompressed_size: src.len(),
            data,
        })
    }

    /// Returns the content type.
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Returns the content ID.
    pub fn content_id(&self) -> ContentId {
        self.content_id
    }

    /// Decompresses the block payload.
    pub fn decode(&self) -> Result<Vec<u8>> {
        if self.compression_method == CompressionMethod::None
            && self.data.len() != self.uncompressed_size
        {
            return Err(Error::Malformed(format!(
                "raw block size mismatch: expected {}, got {}",
                self.uncompressed_size,
                self.data.len()
            )));
        }

        let buf = codecs::decode_all(self.compression_method, &self.data, self.uncompressed_size)?;

        if buf.len() != self.uncompressed_size {
            return Err(Error::Malformed(format!(
                "block uncompressed size mismatch: expected {}, got {}",
                self.uncompressed_size,
                buf.len()
            )));
        }

        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_method_ids() -> Result<()> {
        for n in 0..=4 {
            assert_eq!(CompressionMethod::from_id(n)?.id(), n);
        }

        assert!(matches!(
            CompressionMethod::from_id(5),
            Err(Error::Malformed(_))
        ));

        Ok(())
    }

    #[test]
    fn test_content_type_ids() -> Result<()> {
        for n in 0..=5 {
            assert_eq!(ContentType::from_id(n)?.id(), n);
        }

        assert!(matches!(ContentType::from_id(6), Err(Error::Malformed(_))));

        Ok(())
    }

    #[test]
    fn test_decode_raw() -> Result<()> {
        let block = Block::raw(ContentType::ExternalData, 1, b"ndls".to_vec());
        assert_eq!(block.decode()?, b"ndls");
        Ok(())
    }

    #[test]
    fn test_compress_round_trip() -> Result<()> {
        let mut cache = CompressorCache::default();
        let src = b"the quick brown fox jumps over the lazy dog";

        for encoder in [
            Encoder::Gzip(6),
            Encoder::Bzip2(9),
            Encoder::Lzma(6),
            Encoder::Rans4x8(crate::codecs::rans::Order::Zero),
            Encoder::Rans4x8(crate::codecs::rans::Order::One),
        ] {
            let block =
                Block::compress(ContentType::ExternalData, 4, Some(encoder), &mut cache, src)?;

            assert_eq!(block.decode()?, src);
        }

        Ok(())
    }

    #[test]
    fn test_compress_empty_input_stays_raw() -> Result<()> {
        let mut cache = CompressorCache::default();

        let block = Block::compress(
            ContentType::CoreData,
            0,
            Some(Encoder::Rans4x8(crate::codecs::rans::Order::Zero)),
            &mut cache,
            &[],
        )?;

        assert_eq!(block.compression_method, CompressionMethod::None);
        assert!(block.decode()?.is_empty());

        Ok(())
    }
}
