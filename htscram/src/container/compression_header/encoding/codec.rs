mod byte;
mod byte_array;
mod integer;

pub use self::{byte::Byte, byte_array::ByteArray, integer::Integer};
