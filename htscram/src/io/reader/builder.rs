use std::{fs::File, io::Read, path::Path, sync::Arc};

use super::Reader;
use crate::{
    error::{Result, ValidationStringency},
    reference::ReferenceSource,
};

/// A CRAM reader builder.
#[derive(Default)]
pub struct Builder {
    reference_source: Option<Arc<dyn ReferenceSource + Send + Sync>>,
    validation_stringency: ValidationStringency,
}

impl Builder {
    /// Sets the reference sequence source.
    ///
    /// Without one, only streams whose slices embed their references or
    /// store bases verbatim can restore read sequences.
    pub fn set_reference_source<S>(mut self, reference_source: S) -> Self
    where
        S: ReferenceSource + Send + Sync + 'static,
    {
        self.reference_source = Some(Arc::new(reference_source));
        self
    }

    /// Sets how hard to fail on reference digest mismatches.
    ///
    /// The default is [`ValidationStringency::Strict`].
    pub fn set_validation_stringency(mut self, validation_stringency: ValidationStringency) -> Self {
        self.validation_stringency = validation_stringency;
        self
    }

    /// Builds a reader from a file path.
    pub fn build_from_path<P>(self, src: P) -> Result<Reader<File>>
    where
        P: AsRef<Path>,
    {
        let file = File::open(src).map_err(crate::Error::Io)?;
        Ok(self.build_from_reader(file))
    }

    /// Builds a reader.
    pub fn build_from_reader<R>(self, reader: R) -> Reader<R>
    where
        R: Read,
    {
        Reader::from_parts(reader, self.reference_source, self.validation_stringency)
    }
}
