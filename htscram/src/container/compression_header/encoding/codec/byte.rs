use std::io;

use crate::{
    container::{
        block,
        compression_header::encoding::{
            Decode, Encode, ExternalDataReaders, ExternalDataWriters, missing_external_block,
        },
    },
    huffman::{HuffmanDecoder, HuffmanEncoder},
    io::{BitReader, BitWriter},
};

/// A byte codec.
#[derive(Clone, Debug)]
pub enum Byte {
    /// No data; decodes to 0.
    Null,
    /// Raw bytes in an external block.
    External {
        /// The external block content ID.
        block_content_id: block::ContentId,
    },
    /// Canonical Huffman coding over the core bitstream.
    Huffman {
        /// The alphabet.
        alphabet: Vec<i32>,
        /// The code word bit lengths.
        bit_lens: Vec<u32>,
        /// The prepared decoder.
        decoder: HuffmanDecoder,
        /// The prepared encoder.
        encoder: HuffmanEncoder,
    },
}

impl Byte {
    /// Builds a Huffman codec, preparing the code books once.
    pub fn huffman(alphabet: Vec<i32>, bit_lens: Vec<u32>) -> Self {
        let decoder = HuffmanDecoder::new(&alphabet, &bit_lens);
        let encoder = HuffmanEncoder::new(&alphabet, &bit_lens);

        Self::Huffman {
            alphabet,
            bit_lens,
            decoder,
            encoder,
        }
    }
}

impl PartialEq for Byte {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (
                Self::External {
                    block_content_id: a,
                },
                Self::External {
                    block_content_id: b,
                },
            ) => a == b,
            (
                Self::Huffman {
                    alphabet: a1,
                    bit_lens: a2,
                    ..
                },
                Self::Huffman {
                    alphabet: b1,
                    bit_lens: b2,
                    ..
                },
            ) => a1 == b1 && a2 == b2,
            _ => false,
        }
    }
}

impl Eq for Byte {}

impl<'de> Decode<'de> for Byte {
    type Value = u8;

    fn decode(
        &self,
        core_data_reader: &mut BitReader<'de>,
        external_data_readers: &mut ExternalDataReaders<'de>,
    ) -> io::Result<Self::Value> {
        match self {
            Self::Null => Ok(0),
            Self::External { block_content_id } => {
                let src = external_data_readers
                    .get_mut(block_content_id)
                    .ok_or_else(|| missing_external_block(*block_content_id))?;

                let (b, rest) = src
                    .split_first()
                    .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?;

                *src = rest;

                Ok(*b)
            }
            Self::Huffman {
                alphabet, decoder, ..
            } => {
                let value = if alphabet.len() == 1 {
                    alphabet[0]
                } else {
                    decoder.decode(core_data_reader)?
                };

                u8::try_from(value).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            }
        }
    }
}

impl Encode<'_> for Byte {
    type Value = u8;

    fn encode(
        &self,
        core_data_writer: &mut BitWriter,
        external_data_writers: &mut ExternalDataWriters,
        value: Self::Value,
    ) -> io::Result<()> {
        match self {
            Self::Null => Ok(()),
            Self::External { block_content_id } => {
                let dst = external_data_writers
                    .get_mut(block_content_id)
                    .ok_or_else(|| missing_external_block(*block_content_id))?;

                dst.push(value);

                Ok(())
            }
            Self::Huffman {
                alphabet, encoder, ..
            } => {
                if alphabet.len() == 1 {
                    Ok(())
                } else {
                    encoder.encode(core_data_writer, i32::from(value))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::compression_header::Encoding;

    #[test]
    fn test_decode_external() -> io::Result<()> {
        let mut core_data_reader = BitReader::new(&[][..]);

        let external_data = [0x61, 0x62];
        let mut external_data_readers = ExternalDataReaders::new();
        external_data_readers.insert(4, &external_data[..]);

        let encoding = Encoding::new(Byte::External {
            block_content_id: 4,
        });

        assert_eq!(
            encoding.decode(&mut core_data_reader, &mut external_data_readers)?,
            b'a'
        );
        assert_eq!(
            encoding.decode(&mut core_data_reader, &mut external_data_readers)?,
            b'b'
        );

        Ok(())
    }

    #[test]
    fn test_huffman_round_trip() -> io::Result<()> {
        let encoding = Encoding::new(Byte::huffman(
            vec![i32::from(b'A'), i32::from(b'C')],
            vec![1, 1],
        ));

        let mut core_data_writer = BitWriter::default();
        let mut external_data_writers = ExternalDataWriters::default();

        for &b in b"ACCA" {
            encoding.encode(&mut core_data_writer, &mut external_data_writers, b)?;
        }

        let core_data = core_data_writer.finish()?;
        let mut core_data_reader = BitReader::new(&core_data);
        let mut external_data_readers = ExternalDataReaders::new();

        for &expected in b"ACCA" {
            assert_eq!(
                encoding.decode(&mut core_data_reader, &mut external_data_readers)?,
                expected
            );
        }

        Ok(())
    }
}
