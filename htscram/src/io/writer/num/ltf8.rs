use std::io::{self, Write};

/// Writes an LTF8-encoded long.
pub fn write_ltf8<W>(writer: &mut W, value: i64) -> io::Result<()>
where
    W: Write,
{
    let n = value as u64;

    if n >> 7 == 0 {
        writer.write_all(&[n as u8])?;
    } else if n >> 14 == 0 {
        writer.write_all(&[(n >> 8) as u8 | 0x80, n as u8])?;
    } else if n >> 21 == 0 {
        writer.write_all(&[(n >> 16) as u8 | 0xc0, (n >> 8) as u8, n as u8])?;
    } else if n >> 28 == 0 {
        writer.write_all(&[
            (n >> 24) as u8 | 0xe0,
            (n >> 16) as u8,
            (n >> 8) as u8,
            n as u8,
        ])?;
    } else if n >> 35 == 0 {
        writer.write_all(&[(n >> 32) as u8 | 0xf0])?;
        writer.write_all(&(n as u32).to_be_bytes())?;
    } else if n >> 42 == 0 {
        writer.write_all(&[(n >> 40) as u8 | 0xf8, (n >> 32) as u8])?;
        writer.write_all(&(n as u32).to_be_bytes())?;
    } else if n >> 49 == 0 {
        writer.write_all(&[(n >> 48) as u8 | 0xfc, (n >> 40) as u8, (n >> 32) as u8])?;
        writer.write_all(&(n as u32).to_be_bytes())?;
    } else if n >> 56 == 0 {
        writer.write_all(&[0xfe])?;
        writer.write_all(&n.to_be_bytes()[1..])?;
    } else {
        writer.write_all(&[0xff])?;
        writer.write_all(&n.to_be_bytes())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_ltf8() -> io::Result<()> {
        fn t(value: i64, expected: &[u8]) -> io::Result<()> {
            let mut buf = Vec::new();
            write_ltf8(&mut buf, value)?;
            assert_eq!(buf, expected);
            Ok(())
        }

        t(0, &[0x00])?;
        t(85, &[0x55])?;
        t(170, &[0x80, 0xaa])?;
        t(21930, &[0xc0, 0x55, 0xaa])?;
        t(5614284, &[0xe0, 0x55, 0xaa, 0xcc])?;
        t(1437256755, &[0xf0, 0x55, 0xaa, 0xcc, 0x33])?;
        t(367937729507, &[0xf8, 0x55, 0xaa, 0xcc, 0x33, 0xe3])?;
        t(94192058753858, &[0xfc, 0x55, 0xaa, 0xcc, 0x33, 0xe3, 0x42])?;
        t(
            24113167040987681,
            &[0xfe, 0x55, 0xaa, 0xcc, 0x33, 0xe3, 0x42, 0x21],
        )?;
        t(
            6172970762492846367,
            &[0xff, 0x55, 0xaa, 0xcc, 0x33, 0xe3, 0x42, 0x21, 0x1f],
        )?;
        t(-1, &[0xff; 9])?;

        Ok(())
    }

    #[test]
    fn test_round_trip() -> io::Result<()> {
        use crate::io::reader::num::read_ltf8;

        for &value in &[
            0,
            1,
            127,
            128,
            (1 << 35) - 1,
            1 << 35,
            i64::from(i32::MAX),
            i64::MAX,
            -1,
            i64::MIN,
        ] {
            let mut buf = Vec::new();
            write_ltf8(&mut buf, value)?;
            assert_eq!(read_ltf8(&mut &buf[..])?, value);
        }

        Ok(())
    }
}
