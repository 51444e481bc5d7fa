use std::io;

use flate2::Crc;

use crate::{
    container::block::{Block, CompressionMethod, ContentType},
    error::{Error, Result},
    file_definition::Version,
    io::reader::num::{read_itf8, read_itf8_as, read_u8, read_u32_le},
};

pub(crate) fn read_block(src: &mut &[u8], version: Version) -> Result<Block> {
    let wire_start = *src;

    let compression_method = read_u8(src).map_err(Error::Io).and_then(|n| {
        CompressionMethod::from_id(n)
    })?;

    let content_type = read_u8(src)
        .map_err(Error::Io)
        .and_then(|n| ContentType::from_id(n))?;

    let content_id = read_itf8(src)?;
    let compressed_size: usize = read_itf8_as(src)?;
    let uncompressed_size: usize = read_itf8_as(src)?;

    if src.len() < compressed_size {
        return Err(Error::Io(io::Error::from(io::ErrorKind::UnexpectedEof)));
    }

    let (data, rest) = src.split_at(compressed_size);
    *src = rest;

    if version.has_crc32() {
        let consumed = wire_start.len() - src.len();

        let mut crc = Crc::new();
        crc.update(&wire_start[..consumed]);
        let actual_crc32 = crc.sum();

        let expected_crc32 = read_u32_le(src)?;

        if actual_crc32 != expected_crc32 {
            return Err(Error::Malformed(format!(
                "block checksum mismatch: expected {expected_crc32:08x}, got {actual_crc32:08x}"
            )));
        }
    }

    if compression_method == CompressionMethod::None && compressed_size != uncompressed_size {
        return Err(Error::Malformed(format!(
            "raw block size mismatch: compressed {compressed_size}, uncompressed {uncompressed_size}"
        )));
    }

    Ok(Block {
        compression_method,
        content_type,
        content_id,
        uncompressed_size,
        data: data.to_vec(),
    })
}

pub(crate) fn read_block_as(
    src: &mut &[u8],
    expected: ContentType,
    version: Version,
) -> Result<Block> {
    let block = read_block(src, version)?;

    if block.content_type() != expected {
        return Err(Error::Malformed(format!(
            "invalid block content type: expected {:?}, got {:?}",
            expected,
            block.content_type()
        )));
    }

    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_block() -> Result<()> {
        let src = [
            0x00, // compression method = none
            0x04, // content type = external data
            0x01, // content ID = 1
            0x04, // compressed size = 4
            0x04, // uncompressed size = 4
            b'n', b'd', b'l', b's', // data
            0xd7, 0x12, 0x46, 0x3e, // CRC32
        ];

        let mut reader = &src[..];
        let block = read_block(&mut reader, Version::V3_0)?;

        assert_eq!(block.compression_method, CompressionMethod::None);
        assert_eq!(block.content_type(), ContentType::ExternalData);
        assert_eq!(block.content_id(), 1);
        assert_eq!(block.decode()?, b"ndls");
        assert!(reader.is_empty());

        Ok(())
    }

    #[test]
    fn test_read_block_with_checksum_mismatch() {
        let src = [
            0x00, 0x04, 0x01, 0x04, 0x04, b'n', b'd', b'l', b's', 0x00, 0x00, 0x00, 0x00,
        ];

        let mut reader = &src[..];

        assert!(matches!(
            read_block(&mut reader, Version::V3_0),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_read_block_without_crc32_for_cram_2() -> Result<()> {
        let src = [
            0x00, // compression method = none
            0x04, // content type = external data
            0x01, // content ID = 1
            0x02, // compressed size = 2
            0x02, // uncompressed size = 2
            b'o', b'k', // data
        ];

        let mut reader = &src[..];
        let block = read_block(&mut reader, Version::V2_1)?;

        assert_eq!(block.decode()?, b"ok");
        assert!(reader.is_empty());

        Ok(())
    }

    #[test]
    fn test_read_block_as_with_wrong_content_type() {
        let src = [
            0x00, 0x04, 0x01, 0x00, 0x00, // empty external data block
            0x8b, 0xaf, 0x8a, 0x1f, // CRC32
        ];

        let mut crc = Crc::new();
        crc.update(&src[..5]);
        let mut wire = src[..5].to_vec();
        wire.extend(crc.sum().to_le_bytes());

        let mut reader = &wire[..];

        assert!(matches!(
            read_block_as(&mut reader, ContentType::CoreData, Version::V3_0),
            Err(Error::Malformed(_))
        ));
    }
}
