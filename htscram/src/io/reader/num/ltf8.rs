use std::io::{self, Read};

use super::read_u8;

/// Reads an LTF8-encoded long.
///
/// LTF8 is the 64-bit analog of ITF8, packing a value into 1–9 bytes. The
/// 9-byte form has a `0xff` prefix byte followed by the value as 8 raw
/// big-endian bytes.
pub fn read_ltf8<R>(reader: &mut R) -> io::Result<i64>
where
    R: Read,
{
    let b0 = read_u8(reader).map(i64::from)?;

    let value = if b0 & 0x80 == 0 {
        b0
    } else if b0 & 0x40 == 0 {
        ((b0 & 0x3f) << 8) | read_be(reader, 1)?
    } else if b0 & 0x20 == 0 {
        ((b0 & 0x1f) << 16) | read_be(reader, 2)?
    } else if b0 & 0x10 == 0 {
        ((b0 & 0x0f) << 24) | read_be(reader, 3)?
    } else if b0 & 0x08 == 0 {
        ((b0 & 0x07) << 32) | read_be(reader, 4)?
    } else if b0 & 0x04 == 0 {
        ((b0 & 0x03) << 40) | read_be(reader, 5)?
    } else if b0 & 0x02 == 0 {
        ((b0 & 0x01) << 48) | read_be(reader, 6)?
    } else if b0 & 0x01 == 0 {
        read_be(reader, 7)?
    } else {
        read_be(reader, 8)?
    };

    Ok(value)
}

/// Reads an LTF8-encoded long, converting it to type `N`.
pub fn read_ltf8_as<R, N>(reader: &mut R) -> io::Result<N>
where
    R: Read,
    N: TryFrom<i64>,
    <N as TryFrom<i64>>::Error: std::error::Error + Send + Sync + 'static,
{
    read_ltf8(reader).and_then(|n| {
        n.try_into()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    })
}

fn read_be<R>(reader: &mut R, n: usize) -> io::Result<i64>
where
    R: Read,
{
    let mut value = 0;

    for _ in 0..n {
        value = (value << 8) | read_u8(reader).map(i64::from)?;
    }

    Ok(value)
}
