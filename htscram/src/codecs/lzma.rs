use std::io::{self, Read, Write};

use liblzma::{read::XzDecoder, write::XzEncoder};

pub fn encode(compression_level: u32, src: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = XzEncoder::new(Vec::new(), compression_level);
    encoder.write_all(src)?;
    encoder.finish()
}

pub fn decode(src: &[u8], dst: &mut [u8]) -> io::Result<()> {
    let mut decoder = XzDecoder::new(src);
    decoder.read_exact(dst)
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
