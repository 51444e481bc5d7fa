pub(crate) mod block;
pub(crate) mod compression_header;
pub(crate) mod header;
pub(crate) mod slice;

use std::io::Read;

use self::{compression_header::read_compression_header, slice::read_slice};
use crate::{
    container::{Container, Header, slice::SliceIndex},
    error::{Error, Result},
    file_definition::Version,
};

/// Reads the next container header and body.
///
/// Returns `None` at the EOF container (or at end of input for CRAM 2.0
/// streams, which have none).
pub(crate) fn read_container<R>(
    reader: &mut R,
    version: Version,
) -> Result<Option<(Header, Vec<u8>)>>
where
    R: Read,
{
    let Some((header, len)) = header::read_header(reader, version)? else {
        return Ok(None);
    };

    let mut src = vec![0; len];
    reader.read_exact(&mut src)?;

    Ok(Some((header, src)))
}

/// Parses a container body: the compression header block followed by each
/// slice's blocks, located by landmark differencing. Slice indexing
/// parameters are filled from the landmarks.
pub(crate) fn parse_container(
    header: Header,
    src: &[u8],
    version: Version,
    byte_offset: u64,
) -> Result<Container> {
    let mut buf = src;
    let compression_header = read_compression_header(&mut buf, version)?;

    let landmarks = header.landmarks().to_vec();
    let mut slices = Vec::with_capacity(landmarks.len());

    for (i, &landmark) in landmarks.iter().enumerate() {
        let end = landmarks.get(i + 1).copied().unwrap_or(src.len());

        if landmark > end || end > src.len() {
            return Err(Error::Malformed(format!(
                "invalid landmark: [{landmark}, {end}) out of {} bytes",
                src.len()
            )));
        }

        let mut slice_src = &src[landmark..end];
        let mut slice = read_slice(&mut slice_src, version)?;

        slice.set_index(SliceIndex {
            landmark_index: i,
            byte_offset: landmark,
            byte_size: end - landmark,
        });

        slices.push(slice);
    }

    Ok(Container {
        header,
        compression_header,
        slices,
        byte_offset: Some(byte_offset),
    })
}
