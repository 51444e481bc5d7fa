use std::io::{self, Read};

use super::read_u8;

/// Reads an ITF8-encoded integer.
///
/// ITF8 packs an unsigned 32-bit value into 1–5 bytes: the count of leading
/// one bits in the first byte is the count of trailing bytes. The 5-byte form
/// carries the top 4 bits of the value in the low nibble of the first byte
/// and the bottom 4 bits in the low nibble of the last byte.
pub fn read_itf8<R>(reader: &mut R) -> io::Result<i32>
where
    R: Read,
{
    let b0 = read_u8(reader).map(i32::from)?;

    let value = if b0 & 0x80 == 0 {
        b0
    } else if b0 & 0x40 == 0 {
        let b1 = read_u8(reader).map(i32::from)?;
        ((b0 & 0x3f) << 8) | b1
    } else if b0 & 0x20 == 0 {
        let b1 = read_u8(reader).map(i32::from)?;
        let b2 = read_u8(reader).map(i32::from)?;
        ((b0 & 0x1f) << 16) | (b1 << 8) | b2
    } else if b0 & 0x10 == 0 {
        let b1 = read_u8(reader).map(i32::from)?;
        let b2 = read_u8(reader).map(i32::from)?;
        let b3 = read_u8(reader).map(i32::from)?;
        ((b0 & 0x0f) << 24) | (b1 << 16) | (b2 << 8) | b3
    } else {
        let b1 = read_u8(reader).map(i32::from)?;
        let b2 = read_u8(reader).map(i32::from)?;
        let b3 = read_u8(reader).map(i32::from)?;
        let b4 = read_u8(reader).map(i32::from)?;
        ((b0 & 0x0f) << 28) | (b1 << 20) | (b2 << 12) | (b3 << 4) | (b4 & 0x0f)
    };

    Ok(value)
}

/// Reads an ITF8-encoded integer, converting it to type `N`.
pub fn read_itf8_as<R, N>(reader: &mut R) -> io::Result<N>
where
    R: Read,
    N: TryFrom<i32>,
    <N as TryFrom<i32>>::Error: std::error::Error + Send + Sync + 'static,
{
    read_itf8(reader).and_then(|n| {
        n.try_into()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_itf8() -> io::Result<()> {
        fn t(mut src: &[u8], expected: i32) -> io::Result<()> {
            let actual = read_itf8(&mut src)?;
            assert_eq!(actual, expected);
            Ok(())
        }

        t(&[0x00], 0)?;
        t(&[0x57], 87)?;
        t(&[0x80, 0xdd], 221)?;
        t(&[0xc0, 0xbb, 0xcc], 48076)?;
        t(&[0xe0, 0xaa, 0xbb, 0xcc], 11189196)?;
        t(&[0xf7, 0x55, 0x99, 0x66, 0x02], 1968805474)?;
        t(&[0xff, 0xff, 0xff, 0xff, 0x0f], -1)?;

        let mut src = &[][..];
        assert!(matches!(
            read_itf8(&mut src),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof,
        ));

        let mut src = &[0xf0, 0xaa][..];
        assert!(matches!(
            read_itf8(&mut src),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof,
        ));

        Ok(())
    }
}
