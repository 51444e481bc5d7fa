use std::io;

use super::num::read_itf8_as;

/// Reads an ITF8-length-prefixed byte array, returning it as a subslice.
pub(super) fn read_array<'a>(src: &mut &'a [u8]) -> io::Result<&'a [u8]> {
    let len: usize = read_itf8_as(src)?;

    if src.len() < len {
        return Err(io::Error::from(io::ErrorKind::UnexpectedEof));
    }

    let (buf, rest) = src.split_at(len);
    *src = rest;

    Ok(buf)
}

/// Reads an ITF8-length-prefixed map, returning its body and entry count.
pub(super) fn read_map<'a>(src: &mut &'a [u8]) -> io::Result<(&'a [u8], usize)> {
    let mut buf = read_array(src)?;
    let len = read_itf8_as(&mut buf)?;
    Ok((buf, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_array() -> io::Result<()> {
        let mut src = &[0x03, 0x0a, 0x0b, 0x0c, 0xff][..];
        assert_eq!(read_array(&mut src)?, [0x0a, 0x0b, 0x0c]);
        assert_eq!(src, [0xff]);

        let mut src = &[0x05, 0x00][..];
        assert!(read_array(&mut src).is_err());

        Ok(())
    }

    #[test]
    fn test_read_map() -> io::Result<()> {
        let mut src = &[0x03, 0x02, 0x0a, 0x0b][..];
        let (buf, len) = read_map(&mut src)?;
        assert_eq!(len, 2);
        assert_eq!(buf, [0x0a, 0x0b]);

        Ok(())
    }
}
