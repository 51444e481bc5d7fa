mod itf8;
mod ltf8;

use std::{
    io::{self, Read},
    mem,
};

pub(crate) use self::{
    itf8::{read_itf8, read_itf8_as},
    ltf8::{read_ltf8, read_ltf8_as},
};

pub(crate) fn read_u8<R>(reader: &mut R) -> io::Result<u8>
where
    R: Read,
{
    let mut buf = [0; mem::size_of::<u8>()];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub(crate) fn read_i32_le<R>(reader: &mut R) -> io::Result<i32>
where
    R: Read,
{
    let mut buf = [0; mem::size_of::<i32>()];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

pub(crate) fn read_u32_le<R>(reader: &mut R) -> io::Result<u32>
where
    R: Read,
{
    let mut buf = [0; mem::size_of::<u32>()];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
