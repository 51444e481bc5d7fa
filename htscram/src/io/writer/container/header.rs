use std::io::{self, Write};

use flate2::CrcWriter;

use crate::{
    container::Header,
    file_definition::Version,
    io::writer::num::{write_i32_le, write_itf8, write_ltf8, write_u32_le},
};

pub(crate) fn write_header<W>(
    writer: &mut W,
    header: &Header,
    len: usize,
    version: Version,
) -> io::Result<()>
where
    W: Write,
{
    if version.has_crc32() {
        let mut crc_writer = CrcWriter::new(writer);
        write_header_body(&mut crc_writer, header, len)?;

        let crc32 = crc_writer.crc().sum();
        write_u32_le(crc_writer.get_mut(), crc32)?;

        Ok(())
    } else {
        write_header_body(writer, header, len)
    }
}

fn write_header_body<W>(writer: &mut W, header: &Header, len: usize) -> io::Result<()>
where
    W: Write,
{
    let length = i32::try_from(len).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    write_i32_le(writer, length)?;

    let (reference_sequence_id, alignment_start, alignment_span) =
        header.alignment_context().to_wire();

    write_itf8(writer, reference_sequence_id)?;
    write_itf8_from(writer, alignment_start)?;
    write_itf8_from(writer, alignment_span)?;

    write_itf8_from(writer, header.record_count() as i64)?;
    write_ltf8(writer, header.record_counter() as i64)?;
    write_ltf8(writer, header.base_count() as i64)?;
    write_itf8_from(writer, header.block_count() as i64)?;

    write_itf8_from(writer, header.landmarks().len() as i64)?;

    for &landmark in header.landmarks() {
        write_itf8_from(writer, landmark as i64)?;
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
