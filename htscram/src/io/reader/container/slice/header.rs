use std::io;

use crate::{
    container::{
        AlignmentContext,
        block::{ContentId, ContentType},
        slice::Header,
    },
    error::{Error, Result},
    file_definition::Version,
    io::reader::{
        container::block::read_block_as,
        num::{read_itf8, read_itf8_as, read_ltf8_as},
    },
};

pub(super) fn read_header(src: &mut &[u8], version: Version) -> Result<Header> {
    let block = read_block_as(src, ContentType::SliceHeader, version)?;
    let buf = block.decode()?;
    read_header_inner(&mut &buf[..], version)
}

fn read_header_inner(src: &mut &[u8], version: Version) -> Result<Header> {
    let reference_sequence_id = read_itf8(src)?;
    let alignment_start = read_itf8(src).map(i64::from)?;
    let alignment_span = read_itf8(src).map(i64::from)?;

    let alignment_context =
        AlignmentContext::from_wire(reference_sequence_id, alignment_start, alignment_span)?;

    let record_count = read_itf8_as(src)?;

    // CRAM 2.x uses ITF8 for the record counter; 3.x uses LTF8.
    let record_counter = if version.major() >= 3 {
        read_ltf8_as(src)?
    } else {
        read_itf8_as(src)?
    };

    let block_count = read_itf8_as(src)?;
    let block_content_ids = read_block_content_ids(src)?;
    let embedded_reference_content_id = read_embedded_reference_content_id(src)?;
    let reference_md5 = read_reference_md5(src)?;
    let optional_tags = src.to_vec();

    Ok(Header {
        alignment_context,
        record_count,
        record_counter,
        block_count,
        block_content_ids,
        embedded_reference_content_id,
        reference_md5,
        optional_tags,
    })
}

fn read_block_content_ids(src: &mut &[u8]) -> io::Result<Vec<ContentId>> {
    let len: usize = read_itf8_as(src)?;
    (0..len).map(|_| read_itf8(src)).collect()
}

fn read_embedded_reference_content_id(src: &mut &[u8]) -> io::Result<Option<ContentId>> {
    // § 8.5 "Slice header block": -1 for none.
    const MISSING: i32 = -1;

    read_itf8(src).map(|n| match n {
        MISSING => None,
        _ => Some(n),
    })
}

fn read_reference_md5(src: &mut &[u8]) -> Result<Option<[u8; 16]>> {
    let (buf, rest) = src
        .split_first_chunk::<16>()
        .ok_or_else(|| Error::Io(io::Error::from(io::ErrorKind::UnexpectedEof)))?;

    *src = rest;

    if buf.iter().all(|&b| b == 0) {
        Ok(None)
    } else {
        Ok(Some(*buf))
    }
}

#[cfg(test)]
mod tests {
    use noodles_core::Position;

    use super::*;

    #[test]
    fn test_read_header_inner() -> Result<()> {
        let src = [
            0x02, // reference sequence ID = 2
            0x03, // alignment start = 3
            0x05, // alignment span = 5
            0x08, // number of records = 8
            0x0d, // record counter = 13
            0x01, // number of blocks = 1
            0x01, // block content ID count = 1
            0x15, // block content IDs[0] = 21
            0xff, 0xff, 0xff, 0xff, 0x0f, // embedded reference block content ID = -1
            0x57, 0xb2, 0x96, 0xa3, 0x16, 0x0a, 0x2c, 0xac, 0x9c, 0x83, 0x33, 0x12, 0x6f, 0xf2,
            0x7e, 0xf7, // reference MD5
        ];

        let header = read_header_inner(&mut &src[..], Version::V3_0)?;

        assert_eq!(
            header.alignment_context(),
            AlignmentContext::single(
                2,
                Position::try_from(3).unwrap(),
                Position::try_from(7).unwrap()
            )
        );
        assert_eq!(header.record_count(), 8);
        assert_eq!(header.record_counter(), 13);
        assert_eq!(header.block_count(), 1);
        assert_eq!(header.block_content_ids(), [21]);
        assert_eq!(header.embedded_reference_content_id(), None);
        assert_eq!(
            header.reference_md5(),
            Some(&[
                0x57, 0xb2, 0x96, 0xa3, 0x16, 0x0a, 0x2c, 0xac, 0x9c, 0x83, 0x33, 0x12, 0x6f,
                0xf2, 0x7e, 0xf7,
            ])
        );
        assert!(header.optional_tags().is_empty());

        Ok(())
    }

    #[test]
    fn test_read_header_inner_with_zeroed_md5() -> Result<()> {
        let src = [
            0xff, 0xff, 0xff, 0xff, 0x0f, // reference sequence ID = -1
            0x00, // alignment start = 0
            0x00, // alignment span = 0
            0x01, // number of records = 1
            0x00, // record counter = 0
            0x01, // number of blocks = 1
            0x01, // block content ID count = 1
            0x01, // block content IDs[0] = 1
            0xff, 0xff, 0xff, 0xff, 0x0f, // embedded reference block content ID = -1
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, // reference MD5 (absent)
        ];

        let header = read_header_inner(&mut &src[..], Version::V3_0)?;

        assert_eq!(header.alignment_context(), AlignmentContext::unmapped());
        assert!(header.reference_md5().is_none());

        Ok(())
    }
}
