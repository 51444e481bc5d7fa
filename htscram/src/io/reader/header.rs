use std::io::{self, Read};

use bstr::BString;

use crate::{
    FileDefinition,
    container::block::ContentType,
    error::{Error, Result},
    file_definition::{MAGIC_NUMBER, Version},
    io::reader::container::{block::read_block_as, header::read_header as read_container_header},
};

pub(crate) fn read_file_definition<R>(reader: &mut R) -> Result<FileDefinition>
where
    R: Read,
{
    let mut magic = [0; 4];
    reader.read_exact(&mut magic)?;

    if magic != MAGIC_NUMBER {
        return Err(Error::Malformed(format!("invalid magic number: {magic:x?}")));
    }

    let mut version = [0; 2];
    reader.read_exact(&mut version)?;

    let version = Version::new(version[0], version[1]);
    version.validate()?;

    let mut file_id = [0; 20];
    reader.read_exact(&mut file_id)?;

    Ok(FileDefinition::new(version, file_id))
}

/// Reads the SAM header container, returning the header text.
pub(crate) fn read_file_header<R>(reader: &mut R, version: Version) -> Result<BString>
where
    R: Read,
{
    let Some((_, len)) = read_container_header(reader, version)? else {
        return Err(Error::Malformed("missing SAM header container".into()));
    };

    let mut src = vec![0; len];
    reader.read_exact(&mut src)?;

    let mut buf = &src[..];
    let block = read_block_as(&mut buf, ContentType::FileHeader, version)?;
    let payload = block.decode()?;

    let (len_buf, rest) = payload
        .split_first_chunk::<4>()
        .ok_or_else(|| Error::Malformed("truncated SAM header payload".into()))?;

    let text_len = usize::try_from(u32::from_le_bytes(*len_buf))
        .map_err(|e| Error::Io(io::Error::other(e)))?;

    let text = rest
        .get(..text_len)
        .ok_or_else(|| Error::Malformed("truncated SAM header text".into()))?;

    Ok(BString::from(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_file_definition() -> Result<()> {
        let mut src = Vec::new();
        src.extend_from_slice(b"CRAM");
        src.extend_from_slice(&[3, 0]);
        src.extend_from_slice(&[0; 20]);

        let file_definition = read_file_definition(&mut &src[..])?;

        assert_eq!(file_definition.version(), Version::V3_0);
        assert_eq!(file_definition.file_id(), &[0; 20]);

        Ok(())
    }

    #[test]
    fn test_read_file_definition_with_invalid_magic_number() {
        let src = b"BAM\x01\x03\x00";

        assert!(matches!(
            read_file_definition(&mut &src[..]),
            Err(Error::Malformed(_))
        ));
    }

    #[test]
    fn test_read_file_definition_with_unsupported_version() {
        let mut src = Vec::new();
        src.extend_from_slice(b"CRAM");
        src.extend_from_slice(&[4, 0]);
        src.extend_from_slice(&[0; 20]);

        assert!(matches!(
            read_file_definition(&mut &src[..]),
            Err(Error::UnsupportedVersion(4, 0))
        ));
    }

    #[test]
    fn test_file_header_round_trip() -> Result<()> {
        let header = crate::SamHeader::new("@HD\tVN:1.6\n@SQ\tSN:sq0\tLN:8\n", 1);

        let mut buf = Vec::new();
        crate::io::writer::header::write_file_header(&mut buf, &header, Version::V3_0)?;

        let text = read_file_header(&mut &buf[..], Version::V3_0)?;

        assert_eq!(text, header.text().as_slice());

        Ok(())
    }
}
