use std::io::{self, Write};

use crate::{
    container::slice::Header,
    io::writer::num::{write_itf8, write_ltf8},
};

pub(crate) fn write_header<W>(writer: &mut W, header: &Header) -> io::Result<()>
where
    W: Write,
{
    const MISSING_EMBEDDED_REFERENCE: i32 = -1;
    const MISSING_MD5: [u8; 16] = [0; 16];

    let (reference_sequence_id, alignment_start, alignment_span) =
        header.alignment_context().to_wire();

    write_itf8(writer, reference_sequence_id)?;
    write_itf8_from(writer, alignment_start)?;
    write_itf8_from(writer, alignment_span)?;

    write_itf8_from(writer, header.record_count() as i64)?;
    write_ltf8(writer, header.record_counter() as i64)?;
    write_itf8_from(writer, header.block_count() as i64)?;

    write_itf8_from(writer, header.block_content_ids().len() as i64)?;

    for &block_content_id in header.block_content_ids() {
        write_itf8(writer, block_content_id)?;
    }

    let embedded = header
        .embedded_reference_content_id()
        .unwrap_or(MISSING_EMBEDDED_REFERENCE);
    write_itf8(writer, embedded)?;

    writer.write_all(header.reference_md5().unwrap_or(&MISSING_MD5))?;

    if !header.optional_tags().is_empty() {
        write_itf8_from(writer, header.optional_tags().len() as i64)?;
        writer.write_all(header.optional_tags())?;
    }

    Ok(())
}

fn write_itf8_from<W>(writer: &mut W, n: i64) -> io::Result<()>
where
    W: Write,
{
    let n = i32::try_from(n).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    write_itf8(writer, n)
}

#[cfg(test)]
mod tests {
    use noodles_core::Position;

    use super::*;
    use crate::container::AlignmentContext;

    #[test]
    fn test_write_header() -> io::Result<()> {
        let header = Header {
            alignment_context: AlignmentContext::single(
                2,
                Position::new(3).unwrap(),
                Position::new(7).unwrap(),
            ),
            record_count: 8,
            record_counter: 13,
            block_count: 1,
            block_content_ids: vec![21],
            embedded_reference_content_id: None,
            reference_md5: Some([
                0x57, 0xb2, 0x96, 0xa3, 0x16, 0x0a, 0x2c, 0xac, 0x9c, 0x83, 0x33, 0x12, 0x6f,
                0xf2, 0x7e, 0xf7,
            ]),
            optional_tags: Vec::new(),
        };

        let mut buf = Vec::new();
        write_header(&mut buf, &header)?;

        let expected = [
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

        assert_eq!(buf, expected);

        Ok(())
    }
}
