use std::io::{self, Read};

use flate2::CrcReader;

use crate::{
    container::{AlignmentContext, Header},
    error::{Error, Result},
    file_definition::Version,
    io::reader::num::{read_i32_le, read_itf8, read_itf8_as, read_ltf8_as, read_u32_le},
};

// § 9 "End of file container"
const EOF_LENGTH: usize = 15;
// CRAM 2.x EOF blocks carry no CRC32: 15 - 4 = 11
const EOF_LENGTH_V2: usize = 11;
const EOF_REFERENCE_SEQUENCE_ID: i32 = -1;
const EOF_ALIGNMENT_START: i64 = 4_542_278; // "EOF"
const EOF_BLOCK_COUNT: usize = 1;
const EOF_CRC32: u32 = 0x4f_d9_bd_05;

/// Reads a container header.
///
/// Returns the header and the container body length, or `None` at the EOF
/// container (or, for CRAM 2.x streams without one, at end of input).
pub(crate) fn read_header<R>(reader: &mut R, version: Version) -> Result<Option<(Header, usize)>>
where
    R: Read,
{
    if version.has_crc32() {
        let mut crc_reader = CrcReader::new(reader);
        read_header_inner(&mut crc_reader, version)
    } else {
        match read_header_fields(reader, version) {
            Ok(Some((fields, len))) => finish_header(fields, len, version).map(Some),
            Ok(None) => Ok(None),
            Err(Error::Io(ref e)) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }
}

struct Fields {
    reference_sequence_id: i32,
    alignment_start: i64,
    alignment_span: i64,
    record_count: usize,
    record_counter: u64,
    base_count: u64,
    block_count: usize,
    landmarks: Vec<usize>,
}

fn read_header_inner<R>(
    crc_reader: &mut CrcReader<R>,
    version: Version,
) -> Result<Option<(Header, usize)>>
where
    R: Read,
{
    let (fields, len) = match read_header_fields(crc_reader, version) {
        Ok(Some(parts)) => parts,
        // No more data: CRAM 2.0 streams have no EOF container, and seeking
        // past the EOF container lands here too.
        Ok(None) => return Ok(None),
        Err(Error::Io(ref e)) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    };

    let actual_crc32 = crc_reader.crc().sum();
    let expected_crc32 = read_u32_le(crc_reader.get_mut())?;

    if actual_crc32 != expected_crc32 {
        return Err(Error::Malformed(format!(
            "container header checksum mismatch: expected {expected_crc32:08x}, got {actual_crc32:08x}"
        )));
    }

    if is_eof(
        len,
        fields.reference_sequence_id,
        fields.alignment_start,
        fields.block_count,
        expected_crc32,
    ) {
        return Ok(None);
    }

    finish_header(fields, len, version).map(Some)
}

fn read_header_fields<R>(reader: &mut R, version: Version) -> Result<Option<(Fields, usize)>>
where
    R: Read,
{
    let len = read_i32_le(reader).and_then(|n| {
        usize::try_from(n).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    })?;

    let reference_sequence_id = read_itf8(reader)?;
    let alignment_start = read_itf8(reader).map(i64::from)?;
    let alignment_span = read_itf8(reader).map(i64::from)?;

    let record_count = read_itf8_as(reader)?;
    let record_counter = if version >= Version::V3_0 {
        read_ltf8_as(reader)?
    } else {
        read_itf8_as(reader)?
    };
    let base_count = if version >= Version::V3_0 {
        read_ltf8_as(reader)?
    } else {
        read_itf8_as(reader)?
    };
    let block_count = read_itf8_as(reader)?;
    let landmarks = read_landmarks(reader)?;

    let fields = Fields {
        reference_sequence_id,
        alignment_start,
        alignment_span,
        record_count,
        record_counter,
        base_count,
        block_count,
        landmarks,
    };

    if !version.has_crc32()
        && is_eof_v2(
            len,
            fields.reference_sequence_id,
            fields.alignment_start,
            fields.block_count,
        )
    {
        return Ok(None);
    }

    Ok(Some((fields, len)))
}

fn finish_header(fields: Fields, len: usize, _version: Version) -> Result<(Header, usize)> {
    // The EOF check comes first: EOF field values do not form a valid
    // alignment context.
    let alignment_context = AlignmentContext::from_wire(
        fields.reference_sequence_id,
        fields.alignment_start,
        fields.alignment_span,
    )?;

    let header = Header {
        alignment_context,
        record_count: fields.record_count,
        record_counter: fields.record_counter,
        base_count: fields.base_count,
        block_count: fields.block_count,
        landmarks: fields.landmarks,
    };

    Ok((header, len))
}

fn read_landmarks<R>(reader: &mut R) -> io::Result<Vec<usize>>
where
    R: Read,
{
    let n: usize = read_itf8_as(reader)?;
    (0..n).map(|_| read_itf8_as(reader)).collect()
}

fn is_eof(
    length: usize,
    reference_sequence_id: i32,
    alignment_start: i64,
    block_count: usize,
    crc32: u32,
) -> bool {
    length == EOF_LENGTH
        && reference_sequence_id == EOF_REFERENCE_SEQUENCE_ID
        && alignment_start == EOF_ALIGNMENT_START
        && block_count == EOF_BLOCK_COUNT
        && crc32 == EOF_CRC32
}

fn is_eof_v2(
    length: usize,
    reference_sequence_id: i32,
    alignment_start: i64,
    block_count: usize,
) -> bool {
    length == EOF_LENGTH_V2
        && reference_sequence_id == EOF_REFERENCE_SEQUENCE_ID
        && alignment_start == EOF_ALIGNMENT_START
        && block_count == EOF_BLOCK_COUNT
}
