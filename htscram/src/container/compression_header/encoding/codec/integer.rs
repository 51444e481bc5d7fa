use std::io;

use crate::{
    container::{
        block,
        compression_header::encoding::{
            Decode, Encode, ExternalDataReaders, ExternalDataWriters, missing_external_block,
        },
    },
    huffman::{HuffmanDecoder, HuffmanEncoder},
    io::{BitReader, BitWriter, reader::num::read_itf8, writer::num::write_itf8},
};

/// An integer codec.
#[derive(Clone, Debug)]
pub enum Integer {
    /// No data; decodes to 0.
    Null,
    /// ITF8 values in an external block.
    External {
        /// The external block content ID.
        block_content_id: block::ContentId,
    },
    /// Golomb coding over the core bitstream.
    Golomb {
        /// The value offset.
        offset: i32,
        /// The Golomb parameter.
        m: i32,
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
    /// Fixed-width binary over the core bitstream.
    Beta {
        /// The value offset.
        offset: i32,
        /// The width in bits.
        len: u32,
    },
    /// Sub-exponential coding over the core bitstream.
    Subexp {
        /// The value offset.
        offset: i32,
        /// The initial group width.
        k: i32,
    },
    /// Golomb-Rice coding over the core bitstream.
    GolombRice {
        /// The value offset.
        offset: i32,
        /// log2 of the Golomb parameter.
        log2_m: i32,
    },
    /// Elias gamma coding over the core bitstream.
    Gamma {
        /// The value offset.
        offset: i32,
    },
}

impl Integer {
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

impl PartialEq for Integer {
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
            (Self::Golomb { offset: a1, m: a2 }, Self::Golomb { offset: b1, m: b2 }) => {
                a1 == b1 && a2 == b2
            }
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
            (
                Self::Beta {
                    offset: a1,
                    len: a2,
                },
                Self::Beta {
                    offset: b1,
                    len: b2,
                },
            ) => a1 == b1 && a2 == b2,
            (Self::Subexp { offset: a1, k: a2 }, Self::Subexp { offset: b1, k: b2 }) => {
                a1 == b1 && a2 == b2
            }
            (
                Self::GolombRice {
                    offset: a1,
                    log2_m: a2,
                },
                Self::GolombRice {
                    offset: b1,
                    log2_m: b2,
                },
            ) => a1 == b1 && a2 == b2,
            (Self::Gamma { offset: a }, Self::Gamma { offset: b }) => a == b,
            _ => false,
        }
    }
}

impl Eq for Integer {}

impl<'de> Decode<'de> for Integer {
    type Value = i32;

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

                read_itf8(src)
            }
            Self::Huffman {
                alphabet, decoder, ..
            } => {
                if alphabet.len() == 1 {
                    Ok(alphabet[0])
                } else {
                    decoder.decode(core_data_reader)
                }
            }
            Self::Beta { offset, len } => {
                core_data_reader.read_i32(*len).map(|n| n - offset)
            }
            Self::Gamma { offset } => {
                let mut n = 0;

                while core_data_reader.read_bit()? == 0 {
                    n += 1;
                }

                let m = core_data_reader.read_i32(n)?;
                let x = (1 << n) + m;

                Ok(x - offset)
            }
            Self::Golomb { offset, m } => {
                if *m <= 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("invalid Golomb parameter: m = {m}"),
                    ));
                }

                let mut q = 0i32;

                while core_data_reader.read_bit()? == 0 {
                    q += 1;
                }

                let b = 32 - (*m - 1).leading_zeros();

                let value = if b == 0 {
                    q
                } else {
                    let r = core_data_reader.read_i32(b - 1)?;
                    let threshold = (1i32 << b) - m;

                    if r < threshold {
                        q * m + r
                    } else {
                        let r = (r << 1) | core_data_reader.read_i32(1)?;
                        q * m + r - threshold
                    }
                };

                Ok(value - offset)
            }
            Self::GolombRice { offset, log2_m } => {
                if !(0..32).contains(log2_m) {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("invalid Golomb-Rice parameter: log2_m = {log2_m}"),
                    ));
                }

                let log2_m = *log2_m as u32;

                let mut q = 0i32;

                while core_data_reader.read_bit()? == 0 {
                    q += 1;
                }

                let r = core_data_reader.read_i32(log2_m)?;
                let value = (q << log2_m) | r;

                Ok(value - offset)
            }
            Self::Subexp { offset, k } => {
                if !(0..32).contains(k) {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("invalid sub-exponential parameter: k = {k}"),
                    ));
                }

                let k = *k as u32;
                let mut i = 0u32;

                while core_data_reader.read_bit()? == 1 {
                    i += 1;
                }

                let value = if i == 0 {
                    core_data_reader.read_i32(k)?
                } else {
                    let b = i + k - 1;
                    (1 << b) + core_data_reader.read_i32(b)?
                };

                Ok(value - offset)
            }
        }
    }
}

impl Encode<'_> for Integer {
    type Value = i32;

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

                write_itf8(dst, value)
            }
            Self::Huffman {
                alphabet, encoder, ..
            } => {
                if alphabet.len() == 1 {
                    Ok(())
                } else {
                    encoder.encode(core_data_writer, value)
                }
            }
            Self::Beta { offset, len } => {
                core_data_writer.write_u32((value + offset) as u32, *len as usize)
            }
            Self::Gamma { offset } => {
                let x = value + offset;

                if x < 1 {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("gamma coding requires x >= 1, got {x}"),
                    ));
                }

                let n = 31 - (x as u32).leading_zeros();

                for _ in 0..n {
                    core_data_writer.write_u32(0, 1)?;
                }

                core_data_writer.write_u32(1, 1)?;

                let m = x - (1 << n);
                core_data_writer.write_u32(m as u32, n as usize)
            }
            Self::Golomb { offset, m } => {
                if *m <= 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("invalid Golomb parameter: m = {m}"),
                    ));
                }

                let n = value + offset;

                if n < 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Golomb coding requires a non-negative value, got {n}"),
                    ));
                }

                let q = n / m;
                let r = n % m;

                for _ in 0..q {
                    core_data_writer.write_u32(0, 1)?;
                }

                core_data_writer.write_u32(1, 1)?;

                let b = 32 - (*m - 1).leading_zeros();

                if b > 0 {
                    let threshold = (1i32 << b) - m;

                    if r < threshold {
                        core_data_writer.write_u32(r as u32, (b - 1) as usize)?;
                    } else {
                        core_data_writer.write_u32((r + threshold) as u32, b as usize)?;
                    }
                }

                Ok(())
            }
            Self::GolombRice { offset, log2_m } => {
                if !(0..32).contains(log2_m) {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("invalid Golomb-Rice parameter: log2_m = {log2_m}"),
                    ));
                }

                let n = value + offset;

                if n < 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Golomb-Rice coding requires a non-negative value, got {n}"),
                    ));
                }

                let log2_m = *log2_m as u32;
                let q = n >> log2_m;
                let r = n & ((1 << log2_m) - 1);

                for _ in 0..q {
                    core_data_writer.write_u32(0, 1)?;
                }

                core_data_writer.write_u32(1, 1)?;
                core_data_writer.write_u32(r as u32, log2_m as usize)
            }
            Self::Subexp { offset, k } => {
                if !(0..32).contains(k) {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("invalid sub-exponential parameter: k = {k}"),
                    ));
                }

                let n = value + offset;
                let k = *k as u32;

                if n < 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("sub-exponential coding requires a non-negative value, got {n}"),
                    ));
                }

                // Group 0 covers [0, 2^k) with k payload bits; group i > 0
                // covers [2^b, 2^(b+1)) with b = i + k - 1 payload bits.
                let (group, payload_bits, base) = if n < (1 << k) {
                    (0, k, 0)
                } else {
                    let b = 31 - (n as u32).leading_zeros();
                    (b - k + 1, b, 1i32 << b)
                };

                for _ in 0..group {
                    core_data_writer.write_u32(1, 1)?;
                }

                core_data_writer.write_u32(0, 1)?;
                core_data_writer.write_u32((n - base) as u32, payload_bits as usize)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::compression_header::Encoding;

    fn decode_one(core_data: &[u8], codec: Integer) -> io::Result<i32> {
        let mut core_data_reader = BitReader::new(core_data);
        let mut external_data_readers = ExternalDataReaders::new();
        Encoding::new(codec).decode(&mut core_data_reader, &mut external_data_readers)
    }

    #[test]
    fn test_decode() -> io::Result<()> {
        let external_data = [0x0d];
        let mut external_data_readers = ExternalDataReaders::new();
        external_data_readers.insert(1, &external_data[..]);

        let mut core_data_reader = BitReader::new(&[][..]);

        let encoding = Encoding::new(Integer::External {
            block_content_id: 1,
        });
        assert_eq!(
            encoding.decode(&mut core_data_reader, &mut external_data_readers)?,
            13
        );

        assert_eq!(decode_one(&[], Integer::Null)?, 0);
        assert_eq!(
            decode_one(&[], Integer::huffman(vec![0x4e], vec![0]))?,
            0x4e
        );
        assert_eq!(
            decode_one(&[0b10000000], Integer::Beta { offset: 1, len: 3 })?,
            3
        );
        assert_eq!(
            decode_one(&[0b00011010], Integer::Gamma { offset: 5 })?,
            8
        );

        Ok(())
    }

    #[test]
    fn test_decode_golomb() -> io::Result<()> {
        // m = 5: q = 2 (00 then 1), b = 3, threshold = 3, r = 1 (< 3)
        // => 2 * 5 + 1 = 11
        assert_eq!(
            decode_one(&[0b00101000], Integer::Golomb { offset: 0, m: 5 })?,
            11
        );

        assert_eq!(
            decode_one(&[0b00101000], Integer::Golomb { offset: 10, m: 5 })?,
            1
        );

        // q = 0, r = 3 >= threshold => r = (3 << 1) | 0 = 6, 6 - 3 = 3
        assert_eq!(
            decode_one(&[0b11100000], Integer::Golomb { offset: 0, m: 5 })?,
            3
        );

        Ok(())
    }

    #[test]
    fn test_decode_golomb_rice() -> io::Result<()> {
        // log2_m = 3: q = 2, r = 0b101 => (2 << 3) | 5 = 21
        assert_eq!(
            decode_one(
                &[0b00110100],
                Integer::GolombRice {
                    offset: 0,
                    log2_m: 3,
                },
            )?,
            21
        );

        Ok(())
    }

    #[test]
    fn test_decode_subexp() -> io::Result<()> {
        // k = 2, n = 0: 2 payload bits => 0b11 = 3
        assert_eq!(
            decode_one(&[0b01100000], Integer::Subexp { offset: 0, k: 2 })?,
            3
        );

        // k = 2, i = 1: b = 2 payload bits, base 4 => 4 + 0b01 = 5
        assert_eq!(
            decode_one(&[0b10010000], Integer::Subexp { offset: 0, k: 2 })?,
            5
        );

        Ok(())
    }

    #[test]
    fn test_encode_external() -> io::Result<()> {
        let mut core_data_writer = BitWriter::default();
        let mut external_data_writers: ExternalDataWriters =
            [(1, Vec::new())].into_iter().collect();

        let encoding = Encoding::new(Integer::External {
            block_content_id: 1,
        });
        encoding.encode(&mut core_data_writer, &mut external_data_writers, 0x0d)?;

        assert!(core_data_writer.finish()?.is_empty());
        assert_eq!(external_data_writers[&1], [0x0d]);

        Ok(())
    }

    #[test]
    fn test_core_codecs_round_trip() -> io::Result<()> {
        fn t(codec: Integer, values: &[i32]) -> io::Result<()> {
            let encoding = Encoding::new(codec);

            let mut core_data_writer = BitWriter::default();
            let mut external_data_writers = ExternalDataWriters::default();

            for &value in values {
                encoding.encode(&mut core_data_writer, &mut external_data_writers, value)?;
            }

            let core_data = core_data_writer.finish()?;
            let mut core_data_reader = BitReader::new(&core_data);
            let mut external_data_readers = ExternalDataReaders::new();

            for &expected in values {
                let actual =
                    encoding.decode(&mut core_data_reader, &mut external_data_readers)?;
                assert_eq!(actual, expected, "{:?}", encoding.get());
            }

            Ok(())
        }

        let values = [0, 1, 2, 3, 7, 8, 100, 1000];

        t(Integer::Beta { offset: 0, len: 16 }, &values)?;
        t(Integer::Gamma { offset: 1 }, &values)?;
        t(Integer::Golomb { offset: 0, m: 5 }, &values)?;
        t(Integer::Golomb { offset: 0, m: 1 }, &[0, 1, 2, 9])?;
        t(
            Integer::GolombRice {
                offset: 0,
                log2_m: 3,
            },
            &values,
        )?;
        t(Integer::Subexp { offset: 0, k: 2 }, &values)?;
        t(Integer::Subexp { offset: 0, k: 0 }, &values)?;
        t(
            Integer::huffman(vec![1, 2, 3], vec![1, 2, 2]),
            &[1, 2, 3, 1, 1],
        )?;

        Ok(())
    }
}
