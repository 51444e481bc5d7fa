use std::{fs::File, io::Write, path::Path, sync::Arc};

use super::Writer;
use crate::{
    error::Result,
    reference::ReferenceSource,
    strategy::{CompressionMap, CramEncodingStrategy},
};

/// A CRAM writer builder.
#[derive(Default)]
pub struct Builder {
    reference_source: Option<Arc<dyn ReferenceSource + Send + Sync>>,
    strategy: CramEncodingStrategy,
}

impl Builder {
    /// Sets the reference sequence source.
    ///
    /// Without one, mapped reads are stored verbatim instead of diffed
    /// against the reference, and slice reference digests are omitted.
    pub fn set_reference_source<S>(mut self, reference_source: S) -> Self
    where
        S: ReferenceSource + Send + Sync + 'static,
    {
        self.reference_source = Some(Arc::new(reference_source));
        self
    }

    /// Sets the encoding strategy.
    pub fn set_encoding_strategy(mut self, strategy: CramEncodingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Builds a writer to a file path.
    pub fn build_from_path<P>(self, dst: P) -> Result<Writer<File>>
    where
        P: AsRef<Path>,
    {
        self.strategy.validate()?;
        let file = File::create(dst).map_err(crate::Error::Io)?;
        Ok(self.build_from_writer(file))
    }

    /// Builds a writer.
    ///
    /// # Panics
    ///
    /// Panics if the encoding strategy is invalid; use
    /// [`CramEncodingStrategy::validate`] first when the strategy is not
    /// trusted.
    pub fn build_from_writer<W>(self, writer: W) -> Writer<W>
    where
        W: Write,
    {
        self.strategy
            .validate()
            .expect("invalid encoding strategy");

        let compression_map = self
            .strategy
            .compression_map()
            .expect("invalid compression map");

        Writer::from_parts(writer, self.reference_source, self.strategy, compression_map)
    }
}
