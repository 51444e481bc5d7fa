use std::io::{self, Write};

use crate::{
    FileDefinition, SamHeader,
    container::{
        AlignmentContext, Header,
        block::{Block, ContentType},
    },
    error::Result,
    file_definition::MAGIC_NUMBER,
    io::writer::container::{block, header::write_header as write_container_header},
};

pub(crate) fn write_file_definition<W>(
    writer: &mut W,
    file_definition: &FileDefinition,
) -> io::Result<usize>
where
    W: Write,
{
    writer.write_all(&MAGIC_NUMBER)?;

    let version = file_definition.version();
    writer.write_all(&[version.major(), version.minor()])?;

    writer.write_all(file_definition.file_id())?;

    Ok(MAGIC_NUMBER.len() + 2 + file_definition.file_id().len())
}

/// Writes the SAM header container: one raw FILE_HEADER block whose payload
/// is the header text prefixed with its length.
///
/// The block reserves half as much space again as the text needs, so the
/// header can be rewritten in place without moving the containers behind it.
pub(crate) fn write_file_header<W>(
    writer: &mut W,
    header: &SamHeader,
    version: crate::file_definition::Version,
) -> Result<usize>
where
    W: Write,
{
    let text = header.text();

    let mut payload = Vec::new();
    payload.extend(u32::try_from(text.len()).map_err(io::Error::other)?.to_le_bytes());
    payload.extend_from_slice(text);

    let reserved_len = payload.len() + text.len() / 2;
    payload.resize(reserved_len, 0);

    let file_header_block = Block::raw(ContentType::FileHeader, 0, payload);
    let block_size = block::block_size(&file_header_block, version);

    let container_header = Header {
        alignment_context: AlignmentContext::unmapped(),
        record_count: 0,
        record_counter: 0,
        base_count: 0,
        block_count: 1,
        landmarks: Vec::new(),
    };

    let mut buf = Vec::new();
    write_container_header(&mut buf, &container_header, block_size, version)?;
    block::write_block(&mut buf, &file_header_block, version)?;

    writer.write_all(&buf)?;

    Ok(buf.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_definition::Version;

    #[test]
    fn test_write_file_definition() -> io::Result<()> {
        let mut buf = Vec::new();
        let n = write_file_definition(&mut buf, &FileDefinition::default())?;

        assert_eq!(n, 26);
        assert_eq!(&buf[0..4], b"CRAM");
        assert_eq!(&buf[4..6], [3, 0]);
        assert_eq!(&buf[6..], [0; 20]);

        Ok(())
    }

    #[test]
    fn test_write_file_header_reserves_space() -> Result<()> {
        let header = SamHeader::new("@HD\tVN:1.6\n", 0);

        let mut buf = Vec::new();
        write_file_header(&mut buf, &header, Version::V3_0)?;

        // length prefix + text + half the text length again
        let expected_payload_len = 4 + 11 + 5;

        // container length (i32 LE) is the first field
        let container_len = i32::from_le_bytes(buf[0..4].try_into().unwrap());
        let block_overhead = buf.len() - container_len as usize;

        assert!(container_len as usize >= expected_payload_len);
        assert!(block_overhead > 0);

        Ok(())
    }
}
