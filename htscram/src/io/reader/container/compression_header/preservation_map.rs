use std::io;

use crate::{
    container::compression_header::{
        PreservationMap, SubstitutionMatrix, TagSets, preservation_map::Key,
    },
    error::{Error, Result},
    io::reader::collections::{read_array, read_map},
};

pub(super) fn read_preservation_map(src: &mut &[u8]) -> Result<PreservationMap> {
    let (mut buf, len) = read_map(src)?;
    read_preservation_map_inner(&mut buf, len)
}

fn read_preservation_map_inner(src: &mut &[u8], len: usize) -> Result<PreservationMap> {
    let mut map = PreservationMap::default();

    for _ in 0..len {
        let key = read_key(src)?;

        match key {
            Key::ReadNamesIncluded => map.read_names_included = read_bool(src)?,
            Key::ApDelta => map.ap_delta = read_bool(src)?,
            Key::ReferenceRequired => map.reference_required = read_bool(src)?,
            Key::SubstitutionMatrix => {
                let buf = read_chunk::<5>(src)?;
                map.substitution_matrix = SubstitutionMatrix::from_wire(buf);
            }
            Key::TagSets => {
                let buf = read_array(src)?;
                map.tag_sets = TagSets::from_wire(buf)?;
            }
        }
    }

    Ok(map)
}

fn read_key(src: &mut &[u8]) -> Result<Key> {
    let buf = read_chunk::<2>(src)?;
    Key::try_from(buf).map_err(|e| Error::Malformed(e.to_string()))
}

fn read_bool(src: &mut &[u8]) -> Result<bool> {
    match read_chunk::<1>(src)? {
        [0x00] => Ok(false),
        [0x01] => Ok(true),
        [n] => Err(Error::Malformed(format!(
            "invalid preservation map boolean: {n:#04x}"
        ))),
    }
}

fn read_chunk<const N: usize>(src: &mut &[u8]) -> Result<[u8; N]> {
    let (buf, rest) = src
        .split_first_chunk()
        .ok_or_else(|| Error::Io(io::Error::from(io::ErrorKind::UnexpectedEof)))?;

    *src = rest;

    Ok(*buf)
}
