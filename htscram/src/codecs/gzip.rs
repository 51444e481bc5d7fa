use std::io;

#[cfg(not(feature = "libdeflate"))]
pub fn encode(compression_level: u32, src: &[u8]) -> io::Result<Vec<u8>> {
    use std::io::Write;

    use flate2::write::GzEncoder;

    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::new(compression_level));
    encoder.write_all(src)?;
    encoder.finish()
}

#[cfg(feature = "libdeflate")]
pub fn encode(compression_level: u32, src: &[u8]) -> io::Result<Vec<u8>> {
    use libdeflater::{CompressionLvl, Compressor};

    let lvl = CompressionLvl::new(compression_level as i32)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{e:?}")))?;

    let mut compressor = Compressor::new(lvl);

    let max_len = compressor.gzip_compress_bound(src.len());
    let mut dst = vec![0; max_len];

    let len = compressor
        .gzip_compress(src, &mut dst)
        .map_err(|e| io::Error::other(format!("{e:?}")))?;

    dst.truncate(len);

    Ok(dst)
}

#[cfg(not(feature = "libdeflate"))]
pub fn decode(src: &[u8], dst: &mut [u8]) -> io::Result<()> {
    use std::io::Read;

    use flate2::read::MultiGzDecoder;

    let mut decoder = MultiGzDecoder::new(src);
    decoder.read_exact(dst)
}

#[cfg(feature = "libdeflate")]
pub fn decode(src: &[u8], dst: &mut [u8]) -> io::Result<()> {
    use libdeflater::Decompressor;

    let mut decompressor = Decompressor::new();

    decompressor
        .gzip_decompress(src, dst)
        .map(|_| ())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{e:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() -> io::Result<()> {
        let src = b"the quick brown fox jumps over the lazy dog";

        let compressed = encode(6, src)?;

        let mut dst = vec![0; src.len()];
        decode(&compressed, &mut dst)?;

        assert_eq!(dst, src);

        Ok(())
    }
}
