use crate::{
    container::compression_header::{
        Encoding,
        encoding::{
            Kind,
            codec::{Byte, ByteArray, Integer},
        },
    },
    error::{Error, Result},
    io::reader::{
        collections::read_array,
        num::{read_itf8, read_itf8_as},
    },
};

pub(crate) fn read_byte_encoding(
    src: &mut &[u8],
    data_series: &'static str,
) -> Result<Encoding<Byte>> {
    let (kind, encoding_id) = read_kind(src, data_series)?;

    match kind {
        Kind::Null => {
            read_array(src)?;
            Ok(Encoding::new(Byte::Null))
        }
        Kind::External => {
            let block_content_id = read_external_codec(src)?;
            Ok(Encoding::new(Byte::External { block_content_id }))
        }
        Kind::Huffman => {
            let (alphabet, bit_lens) = read_huffman_codec(src)?;
            Ok(Encoding::new(Byte::huffman(alphabet, bit_lens)))
        }
        _ => Err(Error::UnsupportedEncoding {
            data_series,
            encoding_id,
        }),
    }
}

pub(crate) fn read_integer_encoding(
    src: &mut &[u8],
    data_series: &'static str,
) -> Result<Encoding<Integer>> {
    let (kind, encoding_id) = read_kind(src, data_series)?;

    match kind {
        Kind::Null => {
            read_array(src)?;
            Ok(Encoding::new(Integer::Null))
        }
        Kind::External => {
            let block_content_id = read_external_codec(src)?;
            Ok(Encoding::new(Integer::External { block_content_id }))
        }
        Kind::Golomb => {
            let (offset, m) = read_two_args(src)?;
            Ok(Encoding::new(Integer::Golomb { offset, m }))
        }
        Kind::Huffman => {
            let (alphabet, bit_lens) = read_huffman_codec(src)?;
            Ok(Encoding::new(Integer::huffman(alphabet, bit_lens)))
        }
        Kind::Beta => {
            let (offset, len) = read_two_args(src)?;
            let len =
                u32::try_from(len).map_err(|_| Error::Malformed(format!("invalid beta length: {len}")))?;
            Ok(Encoding::new(Integer::Beta { offset, len }))
        }
        Kind::Subexp => {
            let (offset, k) = read_two_args(src)?;
            Ok(Encoding::new(Integer::Subexp { offset, k }))
        }
        Kind::GolombRice => {
            let (offset, log2_m) = read_two_args(src)?;
            Ok(Encoding::new(Integer::GolombRice { offset, log2_m }))
        }
        Kind::Gamma => {
            let mut args = read_array(src)?;
            let offset = read_itf8(&mut args)?;
            Ok(Encoding::new(Integer::Gamma { offset }))
        }
        _ => Err(Error::UnsupportedEncoding {
            data_series,
            encoding_id,
        }),
    }
}

pub(crate) fn read_byte_array_encoding(
    src: &mut &[u8],
    data_series: &'static str,
) -> Result<Encoding<ByteArray>> {
    let (kind, encoding_id) = read_kind(src, data_series)?;

    match kind {
        Kind::Null => {
            read_array(src)?;
            Ok(Encoding::new(ByteArray::Null))
        }
        Kind::ByteArrayLength => {
            let mut args = read_array(src)?;

            let len_encoding = read_integer_encoding(&mut args, data_series)?;
            let value_encoding = read_byte_encoding(&mut args, data_series)?;

            Ok(Encoding::new(ByteArray::ByteArrayLength {
                len_encoding,
                value_encoding,
            }))
        }
        Kind::ByteArrayStop => {
            let args = read_array(src)?;

            let (stop_byte, mut args) = args
                .split_first()
                .ok_or_else(|| Error::Malformed("missing stop byte argument".into()))?;

            let block_content_id = read_itf8(&mut args)?;

            Ok(Encoding::new(ByteArray::ByteArrayStop {
                stop_byte: *stop_byte,
                block_content_id,
            }))
        }
        _ => Err(Error::UnsupportedEncoding {
            data_series,
            encoding_id,
        }),
    }
}

/// Reads and discards one encoding of any value type.
///
/// The args block is length-prefixed and self-contained, even for compound
/// codecs, so kind plus args covers the whole encoding.
pub(super) fn consume_any_encoding(src: &mut &[u8]) -> Result<()> {
    read_itf8(src)?;
    read_array(src)?;
    Ok(())
}

fn read_kind(src: &mut &[u8], data_series: &'static str) -> Result<(Kind, i32)> {
    let n = read_itf8(src)?;

    let kind = Kind::from_id(n).ok_or(Error::UnsupportedEncoding {
        data_series,
        encoding_id: n,
    })?;

    Ok((kind, n))
}

fn read_external_codec(src: &mut &[u8]) -> Result<i32> {
    let mut args = read_array(src)?;
    let block_content_id = read_itf8(&mut args)?;
    Ok(block_content_id)
}

fn read_two_args(src: &mut &[u8]) -> Result<(i32, i32)> {
    let mut args = read_array(src)?;

    let a = read_itf8(&mut args)?;
    let b = read_itf8(&mut args)?;

    Ok((a, b))
}

fn read_huffman_codec(src: &mut &[u8]) -> Result<(Vec<i32>, Vec<u32>)> {
    let mut args = read_array(src)?;

    let alphabet_len: usize = read_itf8_as(&mut args)?;

    let alphabet = (0..alphabet_len)
        .map(|_| read_itf8(&mut args))
        .collect::<std::io::Result<_>>()?;

    let bit_lens_len: usize = read_itf8_as(&mut args)?;

    let bit_lens = (0..bit_lens_len)
        .map(|_| read_itf8_as::<_, u32>(&mut args))
        .collect::<std::io::Result<_>>()?;

    Ok((alphabet, bit_lens))
}
