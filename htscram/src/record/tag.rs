//! Record tags and their BAM-typed values.

use std::{error, fmt};

use bstr::BString;

/// A two-character tag identifier.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Tag([u8; 2]);

impl Tag {
    /// Read group (`RG`).
    pub const READ_GROUP: Tag = Tag([b'R', b'G']);

    /// Mismatched positions (`MD`).
    pub const MISMATCHED_POSITIONS: Tag = Tag([b'M', b'D']);

    /// Edit distance (`NM`).
    pub const EDIT_DISTANCE: Tag = Tag([b'N', b'M']);

    /// Creates a tag from its two characters.
    pub const fn new(b0: u8, b1: u8) -> Self {
        Self([b0, b1])
    }
}

impl AsRef<[u8; 2]> for Tag {
    fn as_ref(&self) -> &[u8; 2] {
        &self.0
    }
}

impl From<[u8; 2]> for Tag {
    fn from(b: [u8; 2]) -> Self {
        Self(b)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0[0] as char, self.0[1] as char)
    }
}

/// A tag value type, using the BAM type characters.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Type {
    /// A printable character (`A`).
    Character,
    /// An 8-bit signed integer (`c`).
    Int8,
    /// An 8-bit unsigned integer (`C`).
    UInt8,
    /// A 16-bit signed integer (`s`).
    Int16,
    /// A 16-bit unsigned integer (`S`).
    UInt16,
    /// A 32-bit signed integer (`i`).
    Int32,
    /// A 32-bit unsigned integer (`I`).
    UInt32,
    /// A single-precision float (`f`).
    Float,
    /// A NUL-terminated string (`Z`).
    String,
    /// A NUL-terminated hex string (`H`).
    Hex,
    /// A typed numeric array (`B`).
    Array,
}

/// An error returned when a byte is not a tag value type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TryFromByteError(u8);

impl error::Error for TryFromByteError {}

impl fmt::Display for TryFromByteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid tag value type: {:#04x}", self.0)
    }
}

impl TryFrom<u8> for Type {
    type Error = TryFromByteError;

    fn try_from(b: u8) -> Result<Self, Self::Error> {
        match b {
            b'A' => Ok(Self::Character),
            b'c' => Ok(Self::Int8),
            b'C' => Ok(Self::UInt8),
            b's' => Ok(Self::Int16),
            b'S' => Ok(Self::UInt16),
            b'i' => Ok(Self::Int32),
            b'I' => Ok(Self::UInt32),
            b'f' => Ok(Self::Float),
            b'Z' => Ok(Self::String),
            b'H' => Ok(Self::Hex),
            b'B' => Ok(Self::Array),
            _ => Err(TryFromByteError(b)),
        }
    }
}

impl From<Type> for u8 {
    fn from(ty: Type) -> Self {
        match ty {
            Type::Character => b'A',
            Type::Int8 => b'c',
            Type::UInt8 => b'C',
            Type::Int16 => b's',
            Type::UInt16 => b'S',
            Type::Int32 => b'i',
            Type::UInt32 => b'I',
            Type::Float => b'f',
            Type::String => b'Z',
            Type::Hex => b'H',
            Type::Array => b'B',
        }
    }
}

/// A typed numeric array value.
#[derive(Clone, Debug, PartialEq)]
pub enum Array {
    /// 8-bit signed integers.
    Int8(Vec<i8>),
    /// 8-bit unsigned integers.
    UInt8(Vec<u8>),
    /// 16-bit signed integers.
    Int16(Vec<i16>),
    /// 16-bit unsigned integers.
    UInt16(Vec<u16>),
    /// 32-bit signed integers.
    Int32(Vec<i32>),
    /// 32-bit unsigned integers.
    UInt32(Vec<u32>),
    /// Single-precision floats.
    Float(Vec<f32>),
}

impl Array {
    fn subtype(&self) -> u8 {
        match self {
            Self::Int8(_) => b'c',
            Self::UInt8(_) => b'C',
            Self::Int16(_) => b's',
            Self::UInt16(_) => b'S',
            Self::Int32(_) => b'i',
            Self::UInt32(_) => b'I',
            Self::Float(_) => b'f',
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Int8(values) => values.len(),
            Self::UInt8(values) => values.len(),
            Self::Int16(values) => values.len(),
            Self::UInt16(values) => values.len(),
            Self::Int32(values) => values.len(),
            Self::UInt32(values) => values.len(),
            Self::Float(values) => values.len(),
        }
    }
}

/// A tag value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A printable character.
    Character(u8),
    /// An 8-bit signed integer.
    Int8(i8),
    /// An 8-bit unsigned integer.
    UInt8(u8),
    /// A 16-bit signed integer.
    Int16(i16),
    /// A 16-bit unsigned integer.
    UInt16(u16),
    /// A 32-bit signed integer.
    Int32(i32),
    /// A 32-bit unsigned integer.
    UInt32(u32),
    /// A single-precision float.
    Float(f32),
    /// A string.
    String(BString),
    /// A hex string.
    Hex(BString),
    /// A typed numeric array.
    Array(Array),
}

impl Value {
    /// Returns the value type.
    pub fn ty(&self) -> Type {
        match self {
            Self::Character(_) => Type::Character,
            Self::Int8(_) => Type::Int8,
            Self::UInt8(_) => Type::UInt8,
            Self::Int16(_) => Type::Int16,
            Self::UInt16(_) => Type::UInt16,
            Self::Int32(_) => Type::Int32,
            Self::UInt32(_) => Type::UInt32,
            Self::Float(_) => Type::Float,
            Self::String(_) => Type::String,
            Self::Hex(_) => Type::Hex,
            Self::Array(_) => Type::Array,
        }
    }

    /// Serializes the value in BAM form (no tag or type prefix: the tag set
    /// carries both).
    pub(crate) fn encode_into(&self, dst: &mut Vec<u8>) {
        match self {
            Self::Character(b) => dst.push(*b),
            Self::Int8(n) => dst.push(*n as u8),
            Self::UInt8(n) => dst.push(*n),
            Self::Int16(n) => dst.extend(n.to_le_bytes()),
            Self::UInt16(n) => dst.extend(n.to_le_bytes()),
            Self::Int32(n) => dst.extend(n.to_le_bytes()),
            Self::UInt32(n) => dst.extend(n.to_le_bytes()),
            Self::Float(n) => dst.extend(n.to_le_bytes()),
            Self::String(s) | Self::Hex(s) => {
                dst.extend_from_slice(s);
                dst.push(0x00);
            }
            Self::Array(array) => {
                dst.push(array.subtype());
                dst.extend((array.len() as u32).to_le_bytes());

                match array {
                    Array::Int8(values) => dst.extend(values.iter().map(|&n| n as u8)),
                    Array::UInt8(values) => dst.extend_from_slice(values),
                    Array::Int16(values) => {
                        values.iter().for_each(|n| dst.extend(n.to_le_bytes()));
                    }
                    Array::UInt16(values) => {
                        values.iter().for_each(|n| dst.extend(n.to_le_bytes()));
                    }
                    Array::Int32(values) => {
                        values.iter().for_each(|n| dst.extend(n.to_le_bytes()));
                    }
                    Array::UInt32(values) => {
                        values.iter().for_each(|n| dst.extend(n.to_le_bytes()));
                    }
                    Array::Float(values) => {
                        values.iter().for_each(|n| dst.extend(n.to_le_bytes()));
                    }
                }
            }
        }
    }
}

pub(crate) mod value {
    use std::io;

    use bstr::BString;

    use super::{Array, Type, Value};

    /// Deserializes a BAM-form value of the given type, consuming exactly
    /// the value's bytes from `src`.
    pub(crate) fn decode(src: &mut &[u8], ty: Type) -> io::Result<Value> {
        match ty {
            Type::Character => read_u8(src).map(Value::Character),
            Type::Int8 => read_u8(src).map(|n| Value::Int8(n as i8)),
            Type::UInt8 => read_u8(src).map(Value::UInt8),
            Type::Int16 => read_array(src).map(|buf| Value::Int16(i16::from_le_bytes(buf))),
            Type::UInt16 => read_array(src).map(|buf| Value::UInt16(u16::from_le_bytes(buf))),
            Type::Int32 => read_array(src).map(|buf| Value::Int32(i32::from_le_bytes(buf))),
            Type::UInt32 => read_array(src).map(|buf| Value::UInt32(u32::from_le_bytes(buf))),
            Type::Float => read_array(src).map(|buf| Value::Float(f32::from_le_bytes(buf))),
            Type::String => read_string(src).map(Value::String),
            Type::Hex => read_string(src).map(Value::Hex),
            Type::Array => read_value_array(src),
        }
    }

    fn read_u8(src: &mut &[u8]) -> io::Result<u8> {
        let (n, rest) = src
            .split_first()
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?;
        *src = rest;
        Ok(*n)
    }

    fn read_array<const N: usize>(src: &mut &[u8]) -> io::Result<[u8; N]> {
        let (buf, rest) = src
            .split_first_chunk()
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))?;
        *src = rest;
        Ok(*buf)
    }

    fn read_string(src: &mut &[u8]) -> io::Result<BString> {
        const NUL: u8 = 0x00;

        let i = src
            .iter()
            .position(|&b| b == NUL)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "missing NUL terminator"))?;

        let (buf, rest) = src.split_at(i);
        *src = &rest[1..];

        Ok(BString::from(buf))
    }

    fn read_value_array(src: &mut &[u8]) -> io::Result<Value> {
        let subtype = read_u8(src)?;
        let n = read_array(src).map(u32::from_le_bytes)?;
        let len = usize::try_from(n).map_err(io::Error::other)?;

        fn read_values<T, const N: usize>(
            src: &mut &[u8],
            len: usize,
            f: impl Fn([u8; N]) -> T,
        ) -> io::Result<Vec<T>> {
            let mut values = Vec::with_capacity(len);

            for _ in 0..len {
                values.push(f(read_array(src)?));
            }

            Ok(values)
        }

        let array = match subtype {
            b'c' => Array::Int8(read_values(src, len, |[b]| b as i8)?),
            b'C' => Array::UInt8(read_values(src, len, |[b]| b)?),
            b's' => Array::Int16(read_values(src, len, i16::from_le_bytes)?),
            b'S' => Array::UInt16(read_values(src, len, u16::from_le_bytes)?),
            b'i' => Array::Int32(read_values(src, len, i32::from_le_bytes)?),
            b'I' => Array::UInt32(read_values(src, len, u32::from_le_bytes)?),
            b'f' => Array::Float(read_values(src, len, f32::from_le_bytes)?),
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("invalid array subtype: {subtype:#04x}"),
                ));
            }
        };

        Ok(Value::Array(array))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_round_trip() -> std::io::Result<()> {
        fn t(v: Value) -> std::io::Result<()> {
            let mut buf = Vec::new();
            v.encode_into(&mut buf);

            let mut src = &buf[..];
            let actual = value::decode(&mut src, v.ty())?;

            assert_eq!(actual, v);
            assert!(src.is_empty());

            Ok(())
        }

        t(Value::Character(b'q'))?;
        t(Value::Int8(-8))?;
        t(Value::UInt8(250))?;
        t(Value::Int16(-1877))?;
        t(Value::UInt16(48076))?;
        t(Value::Int32(-1197102180))?;
        t(Value::UInt32(3097851461))?;
        t(Value::Float(1.5))?;
        t(Value::String("ndls".into()))?;
        t(Value::Hex("CAFE".into()))?;
        t(Value::Array(Array::Int8(vec![-1, 0, 1])))?;
        t(Value::Array(Array::UInt32(vec![0, 1, u32::MAX])))?;
        t(Value::Array(Array::Float(vec![0.25, -0.5])))?;

        Ok(())
    }

    #[test]
    fn test_type_round_trip() {
        for b in [
            b'A', b'c', b'C', b's', b'S', b'i', b'I', b'f', b'Z', b'H', b'B',
        ] {
            let ty = Type::try_from(b).unwrap();
            assert_eq!(u8::from(ty), b);
        }

        assert!(Type::try_from(b'x').is_err());
    }
}
