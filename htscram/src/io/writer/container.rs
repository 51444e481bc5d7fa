pub(crate) mod block;
pub(crate) mod compression_header;
pub(crate) mod header;
pub(crate) mod slice;

use std::io::{self, Write};

use self::{block::write_block, header::write_header};
pub(crate) use self::{
    compression_header::{build_compression_header, write_compression_header},
    slice::build_slice,
};
use crate::{
    codecs::{CompressorCache, Encoder},
    container::{
        Container,
        block::{Block, ContentType},
        slice::SliceIndex,
    },
    error::Result,
    file_definition::Version,
};

// § 9 "End of file container"
pub(crate) static EOF_V3: [u8; 38] = [
    0x0f, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0x0f, 0xe0, 0x45, 0x4f, 0x46, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x05, 0xbd, 0xd9, 0x4f, 0x00, 0x01, 0x00, 0x06, 0x06, 0x01, 0x00,
    0x01, 0x00, 0x01, 0x00, 0xee, 0x63, 0x01, 0x4b,
];

pub(crate) fn write_eof_container<W>(writer: &mut W) -> io::Result<()>
where
    W: Write,
{
    writer.write_all(&EOF_V3)
}

/// Serializes a container, back-filling its landmarks, block count, byte
/// offset, and each slice's indexing parameters.
///
/// Returns the number of bytes written.
pub(crate) fn write_container<W>(
    writer: &mut W,
    container: &mut Container,
    cache: &mut CompressorCache,
    gzip_compression_level: u32,
    version: Version,
    byte_offset: u64,
) -> Result<usize>
where
    W: Write,
{
    let mut compression_header_data = Vec::new();
    write_compression_header(&mut compression_header_data, &container.compression_header)?;

    let compression_header_block = Block::compress(
        ContentType::CompressionHeader,
        0,
        Some(Encoder::Gzip(gzip_compression_level.min(9))),
        cache,
        &compression_header_data,
    )?;

    let mut body = Vec::new();
    let mut block_count = 1;

    write_block(&mut body, &compression_header_block, version)?;

    let mut landmarks = Vec::with_capacity(container.slices.len());

    for (i, current_slice) in container.slices.iter_mut().enumerate() {
        let landmark = body.len();

        let mut slice_header_data = Vec::new();
        slice::header::write_header(&mut slice_header_data, &current_slice.header)?;

        let slice_header_block = Block::raw(ContentType::SliceHeader, 0, slice_header_data);
        write_block(&mut body, &slice_header_block, version)?;

        write_block(&mut body, &current_slice.core_data_block, version)?;

        for external_block in &current_slice.external_blocks {
            write_block(&mut body, external_block, version)?;
        }

        block_count += 2 + current_slice.external_blocks.len();

        current_slice.set_index(SliceIndex {
            landmark_index: i,
            byte_offset: landmark,
            byte_size: body.len() - landmark,
        });

        landmarks.push(landmark);
    }

    container.header.landmarks = landmarks;
    container.header.block_count = block_count;
    container.byte_offset = Some(byte_offset);

    let mut header_data = Vec::new();
    write_header(&mut header_data, &container.header, body.len(), version)?;

    writer.write_all(&header_data)?;
    writer.write_all(&body)?;

    Ok(header_data.len() + body.len())
}
