use std::io::{self, Write};

use flate2::CrcWriter;

use crate::{
    container::block::Block,
    file_definition::Version,
    io::writer::num::{itf8_size_of, write_itf8, write_u8, write_u32_le},
};

pub(crate) fn write_block<W>(writer: &mut W, block: &Block, version: Version) -> io::Result<()>
where
    W: Write,
{
    if version.has_crc32() {
        let mut crc_writer = CrcWriter::new(writer);
        write_block_body(&mut crc_writer, block)?;

        let crc32 = crc_writer.crc().sum();
        write_u32_le(crc_writer.get_mut(), crc32)?;

        Ok(())
    } else {
        write_block_body(writer, block)
    }
}

fn write_block_body<W>(writer: &mut W, block: &Block) -> io::Result<()>
where
    W: Write,
{
    write_u8(writer, block.compression_method.id())?;
    write_u8(writer, block.content_type.id())?;
    write_itf8(writer, block.content_id)?;

    write_size(writer, block.data.len())?;
    write_size(writer, block.uncompressed_size)?;

    writer.write_all(&block.data)?;

    Ok(())
}

fn write_size<W>(writer: &mut W, size: usize) -> io::Result<()>
where
    W: Write,
{
    let n = i32::try_from(size).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    write_itf8(writer, n)
}

/// Returns the on-wire size of a block.
pub(crate) fn block_size(block: &Block, version: Version) -> usize {
    let mut size = 1 // compression method
        + 1 // content type
        + itf8_size_of(block.content_id)
        + itf8_size_of(block.data.len() as i32)
        + itf8_size_of(block.uncompressed_size as i32)
        + block.data.len();

    if version.has_crc32() {
        size += 4;
    }

    size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::block::ContentType;

    #[test]
    fn test_write_block() -> io::Result<()> {
        let block = Block::raw(ContentType::ExternalData, 1, b"ndls".to_vec());

        let mut buf = Vec::new();
        write_block(&mut buf, &block, Version::V3_0)?;

        let expected = [
            0x00, // compression method = none
            0x04, // content type = external data
            0x01, // content ID = 1
            0x04, // compressed size = 4
            0x04, // uncompressed size = 4
            b'n', b'd', b'l', b's', // data
            0xd7, 0x12, 0x46, 0x3e, // CRC32
        ];

        assert_eq!(buf, expected);
        assert_eq!(block_size(&block, Version::V3_0), buf.len());

        Ok(())
    }

    #[test]
    fn test_wire_round_trip() -> crate::error::Result<()> {
        use crate::io::reader::container::block::read_block;

        let block = Block::raw(ContentType::CoreData, 0, vec![0b10100000]);

        let mut buf = Vec::new();
        write_block(&mut buf, &block, Version::V3_0)?;

        let mut src = &buf[..];
        let actual = read_block(&mut src, Version::V3_0)?;

        assert_eq!(actual, block);
        assert!(src.is_empty());

        Ok(())
    }
}
