use super::encoding::read_byte_array_encoding;
use crate::{
    container::compression_header::TagEncodings,
    error::Result,
    io::reader::{collections::read_map, num::read_itf8},
};

pub(super) fn read_tag_encodings(src: &mut &[u8]) -> Result<TagEncodings> {
    let (mut buf, len) = read_map(src)?;
    read_tag_encodings_inner(&mut buf, len)
}

fn read_tag_encodings_inner(src: &mut &[u8], len: usize) -> Result<TagEncodings> {
    let mut encodings = TagEncodings::default();

    for _ in 0..len {
        let block_content_id = read_itf8(src)?;
        let encoding = read_byte_array_encoding(src, "TAG")?;
        encodings.insert(block_content_id, encoding);
    }

    Ok(encodings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::compression_header::{
        Encoding,
        encoding::codec::{Byte, ByteArray, Integer},
    };

    #[test]
    fn test_read_tag_encodings() -> Result<()> {
        let src = [
            0x13, // data.len = 19
            0x01, // map.len = 1
            0xe0, 0x58, 0x53, 0x69, // block content ID = ('X', 'S', 'i')
            0x04, // byte array length
            0x0c, // args.len = 12
            0x01, // len: external
            0x04, // args.len = 4
            0xe0, 0x58, 0x53, 0x69, // block content ID
            0x01, // values: external
            0x04, // args.len = 4
            0xe0, 0x58, 0x53, 0x69, // block content ID
        ];

        let encodings = read_tag_encodings(&mut &src[..])?;

        let id = (0x58 << 16) | (0x53 << 8) | 0x69;

        assert_eq!(
            encodings.get(&id),
            Some(&Encoding::new(ByteArray::ByteArrayLength {
                len_encoding: Encoding::new(Integer::External {
                    block_content_id: id
                }),
                value_encoding: Encoding::new(Byte::External {
                    block_content_id: id
                }),
            }))
        );

        Ok(())
    }
}
