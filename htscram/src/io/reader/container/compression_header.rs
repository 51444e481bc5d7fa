mod data_series_encodings;
mod encoding;
mod preservation_map;
mod tag_encodings;

pub(crate) use self::encoding::{
    read_byte_array_encoding, read_byte_encoding, read_integer_encoding,
};
use self::{
    data_series_encodings::read_data_series_encodings, preservation_map::read_preservation_map,
    tag_encodings::read_tag_encodings,
};
use super::block::read_block_as;
use crate::{
    container::{CompressionHeader, block::ContentType},
    error::Result,
    file_definition::Version,
};

pub(crate) fn read_compression_header(
    src: &mut &[u8],
    version: Version,
) -> Result<CompressionHeader> {
    let block = read_block_as(src, ContentType::CompressionHeader, version)?;
    let buf = block.decode()?;
    read_compression_header_body(&mut &buf[..])
}

/// Parses a decompressed compression header block payload.
pub(crate) fn read_compression_header_body(src: &mut &[u8]) -> Result<CompressionHeader> {
    let preservation_map = read_preservation_map(src)?;
    let data_series_encodings = read_data_series_encodings(src)?;
    let tag_encodings = read_tag_encodings(src)?;

    Ok(CompressionHeader::new(
        preservation_map,
        data_series_encodings,
        tag_encodings,
    ))
}
