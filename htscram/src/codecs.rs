//! Block compression methods.

pub(crate) mod bzip2;
pub(crate) mod gzip;
pub(crate) mod lzma;
pub mod rans;

use crate::{container::block::CompressionMethod, error::Result};

/// A block content encoder: a compression method with its parameter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Encoder {
    /// gzip (RFC 1952) with a compression level.
    Gzip(u32),
    /// bzip2 with a compression level.
    Bzip2(u32),
    /// xz-framed LZMA with a compression level.
    Lzma(u32),
    /// rANS 4x8 with an order.
    Rans4x8(rans::Order),
}

impl Encoder {
    pub(crate) fn method(&self) -> CompressionMethod {
        match self {
            Self::Gzip(_) => CompressionMethod::Gzip,
            Self::Bzip2(_) => CompressionMethod::Bzip2,
            Self::Lzma(_) => CompressionMethod::Lzma,
            Self::Rans4x8(_) => CompressionMethod::Rans4x8,
        }
    }
}

/// A per-stream cache of reusable compressor state.
///
/// Most methods are parameterized by a level and hold no state worth keeping,
/// but the rANS coder allocates large frequency tables, so a single engine is
/// shared between the order-0 and order-1 entries. The cache is owned by one
/// writer; workers encoding slices in parallel each hold their own.
#[derive(Default)]
pub struct CompressorCache {
    rans: rans::Encoder,
}

impl CompressorCache {
    /// Compresses `src` with the given encoder, reusing cached state.
    pub fn compress(&mut self, encoder: Encoder, src: &[u8]) -> Result<Vec<u8>> {
        let dst = match encoder {
            Encoder::Gzip(level) => gzip::encode(level, src)?,
            Encoder::Bzip2(level) => bzip2::encode(level, src)?,
            Encoder::Lzma(level) => lzma::encode(level, src)?,
            Encoder::Rans4x8(order) => self.rans.encode(order, src)?,
        };

        Ok(dst)
    }
}

pub(crate) fn decode_all(method: CompressionMethod, src: &[u8], dst_len: usize) -> Result<Vec<u8>> {
    match method {
        CompressionMethod::None => Ok(src.to_vec()),
        CompressionMethod::Gzip => {
            let mut dst = vec![0; dst_len];
            gzip::decode(src, &mut dst)?;
            Ok(dst)
        }
        CompressionMethod::Bzip2 => {
            let mut dst = vec![0; dst_len];
            bzip2::decode(src, &mut dst)?;
            Ok(dst)
        }
        CompressionMethod::Lzma => {
            let mut dst = vec![0; dst_len];
            lzma::decode(src, &mut dst)?;
            Ok(dst)
        }
        CompressionMethod::Rans4x8 => {
            let mut src = src;
            let dst = rans::decode(&mut src)?;
            Ok(dst)
        }
    }
}
