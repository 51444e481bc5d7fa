use std::io;

use super::{Byte, Integer};
use crate::{
    container::{
        block,
        compression_header::encoding::{
            Decode, Encode, Encoding, ExternalDataReaders, ExternalDataWriters,
            missing_external_block,
        },
    },
    io::{BitReader, BitWriter},
};

/// A byte array codec.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ByteArray {
    /// No data; decodes to an empty array.
    Null,
    /// A length encoding followed by a per-byte value encoding.
    ByteArrayLength {
        /// The array length encoding.
        len_encoding: Encoding<Integer>,
        /// The array value encoding.
        value_encoding: Encoding<Byte>,
    },
    /// Bytes in an external block, terminated by a stop byte.
    ByteArrayStop {
        /// The terminator.
        stop_byte: u8,
        /// The external block content ID.
        block_content_id: block::ContentId,
    },
}

impl<'de> Decode<'de> for ByteArray {
    type Value = Vec<u8>;

    fn decode(
        &self,
        core_data_reader: &mut BitReader<'de>,
        external_data_readers: &mut ExternalDataReaders<'de>,
    ) -> io::Result<Self::Value> {
        match self {
            Self::Null => Ok(Vec::new()),
            Self::ByteArrayLength {
                len_encoding,
                value_encoding,
            } => {
                let len = len_encoding.decode(core_data_reader, external_data_readers)?;
                let len = usize::try_from(len)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

                let mut buf = Vec::with_capacity(len);

                for _ in 0..len {
                    let b = value_encoding.decode(core_data_reader, external_data_readers)?;
                    buf.push(b);
                }

                Ok(buf)
            }
            Self::ByteArrayStop {
                stop_byte,
                block_content_id,
            } => {
                let src = external_data_readers
                    .get_mut(block_content_id)
                    .ok_or_else(|| missing_external_block(*block_content_id))?;

                let i = src.iter().position(|b| b == stop_byte).ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidData, "missing stop byte")
                })?;

                let (buf, rest) = src.split_at(i);
                *src = &rest[1..];

                Ok(buf.to_vec())
            }
        }
    }
}

impl<'en> Encode<'en> for ByteArray {
    type Value = &'en [u8];

    fn encode(
        &self,
        core_data_writer: &mut BitWriter,
        external_data_writers: &mut ExternalDataWriters,
        value: Self::Value,
    ) -> io::Result<()> {
        match self {
            Self::Null => Ok(()),
            Self::ByteArrayLength {
                len_encoding,
                value_encoding,
            } => {
                let len = i32::try_from(value.len())
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

                len_encoding.encode(core_data_writer, external_data_writers, len)?;

                for &b in value {
                    value_encoding.encode(core_data_writer, external_data_writers, b)?;
                }

                Ok(())
            }
            Self::ByteArrayStop {
                stop_byte,
                block_content_id,
            } => {
                let dst = external_data_writers
                    .get_mut(block_content_id)
                    .ok_or_else(|| missing_external_block(*block_content_id))?;

                dst.extend_from_slice(value);
                dst.push(*stop_byte);

                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_array_stop_round_trip() -> io::Result<()> {
        let encoding = Encoding::new(ByteArray::ByteArrayStop {
            stop_byte: b'\t',
            block_content_id: 7,
        });

        let mut core_data_writer = BitWriter::default();
        let mut external_data_writers: ExternalDataWriters =
            [(7, Vec::new())].into_iter().collect();

        encoding.encode(&mut core_data_writer, &mut external_data_writers, b"read1")?;
        encoding.encode(&mut core_data_writer, &mut external_data_writers, b"read2")?;

        assert_eq!(external_data_writers[&7], b"read1\tread2\t");

        let external_data = external_data_writers[&7].clone();
        let mut core_data_reader = BitReader::new(&[][..]);
        let mut external_data_readers = ExternalDataReaders::new();
        external_data_readers.insert(7, &external_data[..]);

        assert_eq!(
            encoding.decode(&mut core_data_reader, &mut external_data_readers)?,
            b"read1"
        );
        assert_eq!(
            encoding.decode(&mut core_data_reader, &mut external_data_readers)?,
            b"read2"
        );

        Ok(())
    }

    #[test]
    fn test_byte_array_length_round_trip() -> io::Result<()> {
        let encoding = Encoding::new(ByteArray::ByteArrayLength {
            len_encoding: Encoding::new(Integer::External {
                block_content_id: 13,
            }),
            value_encoding: Encoding::new(Byte::External {
                block_content_id: 13,
            }),
        });

        let mut core_data_writer = BitWriter::default();
        let mut external_data_writers: ExternalDataWriters =
            [(13, Vec::new())].into_iter().collect();

        encoding.encode(&mut core_data_writer, &mut external_data_writers, b"ndls")?;

        let external_data = external_data_writers[&13].clone();
        assert_eq!(external_data, b"\x04ndls");

        let mut core_data_reader = BitReader::new(&[][..]);
        let mut external_data_readers = ExternalDataReaders::new();
        external_data_readers.insert(13, &external_data[..]);

        assert_eq!(
            encoding.decode(&mut core_data_reader, &mut external_data_readers)?,
            b"ndls"
        );

        Ok(())
    }

    #[test]
    fn test_decode_missing_stop_byte() {
        let encoding = Encoding::new(ByteArray::ByteArrayStop {
            stop_byte: 0x00,
            block_content_id: 7,
        });

        let external_data = [b'n', b'd'];
        let mut core_data_reader = BitReader::new(&[][..]);
        let mut external_data_readers = ExternalDataReaders::new();
        external_data_readers.insert(7, &external_data[..]);

        assert!(matches!(
            encoding.decode(&mut core_data_reader, &mut external_data_readers),
            Err(e) if e.kind() == io::ErrorKind::InvalidData,
        ));
    }
}
