//! Per-data-series encodings.

pub(crate) mod codec;
mod kind;

use std::{collections::HashMap, io};

pub use self::kind::Kind;
use crate::{
    container::block::ContentId,
    io::{BitReader, BitWriter},
};

/// An encoding: a codec that maps one data series to and from the core
/// bitstream and external blocks.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Encoding<C>(C);

impl<C> Encoding<C> {
    /// Wraps a codec.
    pub fn new(codec: C) -> Self {
        Self(codec)
    }

    /// Returns the wrapped codec.
    pub fn get(&self) -> &C {
        &self.0
    }
}

impl<'de, C> Encoding<C>
where
    C: Decode<'de>,
{
    pub(crate) fn decode(
        &self,
        core_data_reader: &mut BitReader<'de>,
        external_data_readers: &mut ExternalDataReaders<'de>,
    ) -> io::Result<C::Value> {
        self.0.decode(core_data_reader, external_data_readers)
    }
}

impl<'en, C> Encoding<C>
where
    C: Encode<'en>,
{
    pub(crate) fn encode(
        &self,
        core_data_writer: &mut BitWriter,
        external_data_writers: &mut ExternalDataWriters,
        value: C::Value,
    ) -> io::Result<()> {
        self.0.encode(core_data_writer, external_data_writers, value)
    }
}

pub(crate) trait Decode<'de> {
    type Value;

    fn decode(
        &self,
        core_data_reader: &mut BitReader<'de>,
        external_data_readers: &mut ExternalDataReaders<'de>,
    ) -> io::Result<Self::Value>;
}

pub(crate) trait Encode<'en> {
    type Value;

    fn encode(
        &self,
        core_data_writer: &mut BitWriter,
        external_data_writers: &mut ExternalDataWriters,
        value: Self::Value,
    ) -> io::Result<()>;
}

/// Decompressed external block payloads, keyed by content ID, with per-block
/// read cursors.
#[derive(Default)]
pub(crate) struct ExternalDataReaders<'a> {
    readers: HashMap<ContentId, &'a [u8]>,
}

impl<'a> ExternalDataReaders<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ContentId, reader: &'a [u8]) {
        self.readers.insert(id, reader);
    }

    pub fn get_mut(&mut self, id: &ContentId) -> Option<&mut &'a [u8]> {
        self.readers.get_mut(id)
    }
}

/// External block buffers being built, keyed by content ID.
pub(crate) type ExternalDataWriters = HashMap<ContentId, Vec<u8>>;

pub(crate) fn missing_external_block(id: ContentId) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("missing external block: {id}"),
    )
}
