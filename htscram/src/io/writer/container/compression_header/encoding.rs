use std::io::{self, Write};

use crate::{
    container::{
        block::ContentId,
        compression_header::{
            Encoding,
            encoding::{
                Kind,
                codec::{Byte, ByteArray, Integer},
            },
        },
    },
    io::writer::{collections::write_array, num::write_itf8},
};

pub(crate) fn write_byte_encoding<W>(writer: &mut W, encoding: &Encoding<Byte>) -> io::Result<()>
where
    W: Write,
{
    match encoding.get() {
        Byte::Null => write_null_codec(writer),
        Byte::External { block_content_id } => write_external_codec(writer, *block_content_id),
        Byte::Huffman {
            alphabet, bit_lens, ..
        } => write_huffman_codec(writer, alphabet, bit_lens),
    }
}

pub(crate) fn write_integer_encoding<W>(
    writer: &mut W,
    encoding: &Encoding<Integer>,
) -> io::Result<()>
where
    W: Write,
{
    match encoding.get() {
        Integer::Null => write_null_codec(writer),
        Integer::External { block_content_id } => write_external_codec(writer, *block_content_id),
        Integer::Golomb { offset, m } => write_two_arg_codec(writer, Kind::Golomb, *offset, *m),
        Integer::Huffman {
            alphabet, bit_lens, ..
        } => write_huffman_codec(writer, alphabet, bit_lens),
        Integer::Beta { offset, len } => {
            write_two_arg_codec(writer, Kind::Beta, *offset, *len as i32)
        }
        Integer::Subexp { offset, k } => write_two_arg_codec(writer, Kind::Subexp, *offset, *k),
        Integer::GolombRice { offset, log2_m } => {
            write_two_arg_codec(writer, Kind::GolombRice, *offset, *log2_m)
        }
        Integer::Gamma { offset } => {
            let mut args = Vec::new();
            write_itf8(&mut args, *offset)?;

            write_kind(writer, Kind::Gamma)?;
            write_array(writer, &args)
        }
    }
}

pub(crate) fn write_byte_array_encoding<W>(
    writer: &mut W,
    encoding: &Encoding<ByteArray>,
) -> io::Result<()>
where
    W: Write,
{
    match encoding.get() {
        ByteArray::Null => write_null_codec(writer),
        ByteArray::ByteArrayLength {
            len_encoding,
            value_encoding,
        } => {
            let mut args = Vec::new();

            write_integer_encoding(&mut args, len_encoding)?;
            write_byte_encoding(&mut args, value_encoding)?;

            write_kind(writer, Kind::ByteArrayLength)?;
            write_array(writer, &args)
        }
        ByteArray::ByteArrayStop {
            stop_byte,
            block_content_id,
        } => {
            let mut args = vec![*stop_byte];
            write_itf8(&mut args, *block_content_id)?;

            write_kind(writer, Kind::ByteArrayStop)?;
            write_array(writer, &args)
        }
    }
}

fn write_kind<W>(writer: &mut W, kind: Kind) -> io::Result<()>
where
    W: Write,
{
    write_itf8(writer, kind.id())
}

fn write_null_codec<W>(writer: &mut W) -> io::Result<()>
where
    W: Write,
{
    write_kind(writer, Kind::Null)?;
    write_array(writer, &[])
}

fn write_external_codec<W>(writer: &mut W, block_content_id: ContentId) -> io::Result<()>
where
    W: Write,
{
    let mut args = Vec::new();
    write_itf8(&mut args, block_content_id)?;

    write_kind(writer, Kind::External)?;
    write_array(writer, &args)
}

fn write_two_arg_codec<W>(writer: &mut W, kind: Kind, a: i32, b: i32) -> io::Result<()>
where
    W: Write,
{
    let mut args = Vec::new();
    write_itf8(&mut args, a)?;
    write_itf8(&mut args, b)?;

    write_kind(writer, kind)?;
    write_array(writer, &args)
}

fn write_huffman_codec<W>(writer: &mut W, alphabet: &[i32], bit_lens: &[u32]) -> io::Result<()>
where
    W: Write,
{
    let mut args = Vec::new();

    write_itf8(&mut args, alphabet.len() as i32)?;

    for &symbol in alphabet {
        write_itf8(&mut args, symbol)?;
    }

    write_itf8(&mut args, bit_lens.len() as i32)?;

    for &len in bit_lens {
        let len = i32::try_from(len).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        write_itf8(&mut args, len)?;
    }

    write_kind(writer, Kind::Huffman)?;
    write_array(writer, &args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::reader::container::compression_header::{
        read_byte_array_encoding, read_byte_encoding, read_integer_encoding,
    };

    #[test]
    fn test_integer_encoding_round_trip() -> crate::error::Result<()> {
        let encodings = [
            Encoding::new(Integer::Null),
            Encoding::new(Integer::External {
                block_content_id: 5,
            }),
            Encoding::new(Integer::Golomb { offset: 1, m: 10 }),
            Encoding::new(Integer::huffman(vec![-1, 0, 2], vec![1, 2, 2])),
            Encoding::new(Integer::Beta { offset: 0, len: 8 }),
            Encoding::new(Integer::Subexp { offset: 0, k: 1 }),
            Encoding::new(Integer::GolombRice {
                offset: 1,
                log2_m: 3,
            }),
            Encoding::new(Integer::Gamma { offset: 1 }),
        ];

        for expected in encodings {
            let mut buf = Vec::new();
            write_integer_encoding(&mut buf, &expected)?;

            let actual = read_integer_encoding(&mut &buf[..], "BF")?;
            assert_eq!(actual, expected);
        }

        Ok(())
    }

    #[test]
    fn test_byte_encoding_round_trip() -> crate::error::Result<()> {
        let encodings = [
            Encoding::new(Byte::Null),
            Encoding::new(Byte::External {
                block_content_id: 27,
            }),
            Encoding::new(Byte::huffman(vec![0x41, 0x43], vec![1, 1])),
        ];

        for expected in encodings {
            let mut buf = Vec::new();
            write_byte_encoding(&mut buf, &expected)?;

            let actual = read_byte_encoding(&mut &buf[..], "BA")?;
            assert_eq!(actual, expected);
        }

        Ok(())
    }

    #[test]
    fn test_byte_array_encoding_round_trip() -> crate::error::Result<()> {
        let encodings = [
            Encoding::new(ByteArray::Null),
            Encoding::new(ByteArray::ByteArrayStop {
                stop_byte: b'\t',
                block_content_id: 7,
            }),
            Encoding::new(ByteArray::ByteArrayLength {
                len_encoding: Encoding::new(Integer::External {
                    block_content_id: 19,
                }),
                value_encoding: Encoding::new(Byte::External {
                    block_content_id: 19,
                }),
            }),
        ];

        for expected in encodings {
            let mut buf = Vec::new();
            write_byte_array_encoding(&mut buf, &expected)?;

            let actual = read_byte_array_encoding(&mut &buf[..], "RN")?;
            assert_eq!(actual, expected);
        }

        Ok(())
    }
}
