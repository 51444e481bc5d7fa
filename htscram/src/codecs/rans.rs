//! The rANS 4x8 entropy codec.
//!
//! This is the asymmetric numeral system coder used by CRAM 3.0 block
//! compression method 4: four interleaved rANS states over 12-bit
//! frequencies, with order-0 (context-free) and order-1 (previous byte as
//! context) models.

mod decode;
mod encode;

use std::{error, fmt, io};

pub(crate) use self::decode::decode;

// Renormalization lower bound for a rANS state.
const LOWER_BOUND: u32 = 1 << 23;

// Frequencies are scaled to sum to at most 1 << FREQ_BITS.
const FREQ_BITS: u32 = 12;

/// A frequency model order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Order {
    /// Order-0: symbol frequencies are context-free.
    Zero,
    /// Order-1: symbol frequencies are conditioned on the previous byte.
    One,
}

/// An error returned when a rANS order byte is invalid.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TryFromByteError(u8);

impl error::Error for TryFromByteError {}

impl fmt::Display for TryFromByteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid rANS order: {}", self.0)
    }
}

impl TryFrom<u8> for Order {
    type Error = TryFromByteError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            0 => Ok(Self::Zero),
            1 => Ok(Self::One),
            _ => Err(TryFromByteError(n)),
        }
    }
}

impl From<Order> for u8 {
    fn from(order: Order) -> Self {
        match order {
            Order::Zero => 0,
            Order::One => 1,
        }
    }
}

/// A reusable rANS encoder.
///
/// The order-1 model conditions on the previous byte, so the counting pass
/// uses a 256 x 256 frequency matrix (~256 KiB). The matrix is allocated once
/// and reused across blocks, which is why a single engine is shared between
/// the order-0 and order-1 compressor cache entries.
pub struct Encoder {
    frequencies: Box<[[u32; 256]; 256]>,
}

impl Encoder {
    /// Compresses `src`, producing a self-framed rANS stream.
    pub fn encode(&mut self, order: Order, src: &[u8]) -> io::Result<Vec<u8>> {
        if src.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "rANS input cannot be empty",
            ));
        }

        let payload = match order {
            Order::Zero => encode::encode_order_0(&mut self.frequencies[0], src)?,
            Order::One => encode::encode_order_1(&mut self.frequencies, src)?,
        };

        let mut dst = Vec::with_capacity(payload.len() + 9);
        dst.push(u8::from(order));
        dst.extend((payload.len() as u32).to_le_bytes());
        dst.extend((src.len() as u32).to_le_bytes());
        dst.extend(payload);

        Ok(dst)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            frequencies: Box::new([[0; 256]; 256]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_order_0() -> io::Result<()> {
        let src = b"noodles noodles noodles";

        let mut encoder = Encoder::default();
        let compressed = encoder.encode(Order::Zero, src)?;

        let actual = decode(&mut &compressed[..])?;
        assert_eq!(actual, src);

        Ok(())
    }

    #[test]
    fn test_round_trip_order_1() -> io::Result<()> {
        let src = b"abracadabra abracadabra abracadabra";

        let mut encoder = Encoder::default();
        let compressed = encoder.encode(Order::One, src)?;

        let actual = decode(&mut &compressed[..])?;
        assert_eq!(actual, src);

        Ok(())
    }

    #[test]
    fn test_round_trip_short_inputs() -> io::Result<()> {
        let mut encoder = Encoder::default();

        for src in [&b"n"[..], b"nd", b"ndl", b"ndls", b"ndlss"] {
            for order in [Order::Zero, Order::One] {
                let compressed = encoder.encode(order, src)?;
                let actual = decode(&mut &compressed[..])?;
                assert_eq!(actual, src, "order {order:?}, len {}", src.len());
            }
        }

        Ok(())
    }

    #[test]
    fn test_round_trip_single_symbol() -> io::Result<()> {
        let src = vec![b'A'; 8192];

        let mut encoder = Encoder::default();

        for order in [Order::Zero, Order::One] {
            let compressed = encoder.encode(order, &src)?;
            let actual = decode(&mut &compressed[..])?;
            assert_eq!(actual, src);
        }

        Ok(())
    }

    #[test]
    fn test_encode_empty_input() {
        let mut encoder = Encoder::default();
        assert!(encoder.encode(Order::Zero, &[]).is_err());
    }
}
