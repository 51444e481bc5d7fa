//! The CRAM reader driver.

mod builder;
pub(crate) mod collections;
pub(crate) mod container;
mod header;
pub(crate) mod num;

use std::{
    collections::{HashMap, VecDeque},
    io::Read,
    sync::Arc,
};

use bstr::BString;

pub use self::builder::Builder;
use self::{
    container::{parse_container, read_container},
    header::{read_file_definition, read_file_header},
};
use crate::{
    FileDefinition, alignment,
    container::{Container, ReferenceContext, Slice},
    error::{Error, Result, ValidationStringency},
    file_definition::Version,
    record::{Record, resolve},
    reference::{ReferenceSource, calculate_normalized_sequence_digest},
};

/// A CRAM reader.
///
/// A reader owns a single input byte stream and steps through containers
/// sequentially, preserving the order records were written.
pub struct Reader<R> {
    inner: R,
    reference_source: Option<Arc<dyn ReferenceSource + Send + Sync>>,
    validation_stringency: ValidationStringency,
    version: Version,
    position: u64,
}

impl<R> Reader<R>
where
    R: Read,
{
    /// Creates a reader with no reference source and strict validation.
    pub fn new(inner: R) -> Self {
        Builder::default().build_from_reader(inner)
    }

    pub(crate) fn from_parts(
        inner: R,
        reference_source: Option<Arc<dyn ReferenceSource + Send + Sync>>,
        validation_stringency: ValidationStringency,
    ) -> Self {
        Self {
            inner,
            reference_source,
            validation_stringency,
            version: Version::default(),
            position: 0,
        }
    }

    /// Returns the absolute byte position in the stream.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Reads the file definition, which must be first in the stream.
    pub fn read_file_definition(&mut self) -> Result<FileDefinition> {
        let mut reader = CountingReader::new(&mut self.inner);
        let file_definition = read_file_definition(&mut reader)?;

        self.position += reader.consumed;
        self.version = file_definition.version();

        Ok(file_definition)
    }

    /// Reads the SAM header container, returning the header text.
    pub fn read_file_header(&mut self) -> Result<BString> {
        let mut reader = CountingReader::new(&mut self.inner);
        let text = read_file_header(&mut reader, self.version)?;

        self.position += reader.consumed;

        Ok(text)
    }

    /// Reads the next container, or `None` at the EOF container.
    pub fn read_container(&mut self) -> Result<Option<Container>> {
        let byte_offset = self.position;

        let mut reader = CountingReader::new(&mut self.inner);
        let parts = read_container(&mut reader, self.version)?;
        self.position += reader.consumed;

        match parts {
            Some((header, src)) => {
                parse_container(header, &src, self.version, byte_offset).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Returns an iterator over all remaining alignment records.
    pub fn records(&mut self) -> Records<'_, R> {
        Records {
            reader: self,
            queue: VecDeque::new(),
            done: false,
        }
    }

    fn container_records(&self, cram_container: &Container) -> Result<Vec<alignment::Record>> {
        let mut out = Vec::with_capacity(cram_container.header().record_count());

        for slice in cram_container.slices() {
            let mut records = slice.records(cram_container.compression_header())?;

            self.restore_sequences(cram_container, slice, &mut records)?;

            out.extend(records.into_iter().map(into_alignment_record));
        }

        Ok(out)
    }

    fn restore_sequences(
        &self,
        cram_container: &Container,
        slice: &Slice,
        records: &mut [Record],
    ) -> Result<()> {
        let substitution_matrix = cram_container
            .compression_header()
            .preservation_map()
            .substitution_matrix()
            .clone();

        let context = slice.header().alignment_context();

        match context.reference_context() {
            ReferenceContext::Single(reference_sequence_id) => {
                let slab = self.single_reference_slab(slice, reference_sequence_id)?;

                if let Some((bases, offset)) = &slab {
                    self.verify_reference_md5(slice, reference_sequence_id, bases, *offset)?;
                }

                for record in records {
                    restore_record_sequence(
                        record,
                        slab.as_ref().map(|(bases, offset)| {
                            resolve::ReferenceSlab::new(bases, *offset)
                        }),
                        &substitution_matrix,
                    )?;
                }
            }
            ReferenceContext::Multi => {
                let mut cache: HashMap<usize, Arc<[u8]>> = HashMap::new();

                for record in records {
                    let slab = match (record.reference_sequence_id(), &self.reference_source) {
                        (Some(id), Some(source)) => {
                            let bases = match cache.get(&id) {
                                Some(bases) => bases.clone(),
                                None => {
                                    let bases = source.bases(id)?;
                                    cache.insert(id, bases.clone());
                                    bases
                                }
                            };

                            Some(bases)
                        }
                        _ => None,
                    };

                    restore_record_sequence(
                        record,
                        slab.as_deref().map(|bases| resolve::ReferenceSlab::new(bases, 0)),
                        &substitution_matrix,
                    )?;
                }
            }
            ReferenceContext::Unmapped => {}
        }

        Ok(())
    }

    /// Returns (bases, 0-based offset of bases[0]) for a single-reference
    /// slice: the embedded reference block when present, the external source
    /// otherwise.
    fn single_reference_slab(
        &self,
        slice: &Slice,
        reference_sequence_id: usize,
    ) -> Result<Option<(Vec<u8>, usize)>> {
        if let Some(id) = slice.header().embedded_reference_content_id() {
            let block = slice
                .external_blocks()
                .iter()
                .find(|block| block.content_id() == id)
                .ok_or_else(|| {
                    Error::Malformed(format!("missing embedded reference block: {id}"))
                })?;

            let offset = slice
                .header()
                .alignment_context()
                .alignment_start()
                .map(|start| usize::from(start) - 1)
                .unwrap_or_default();

            return Ok(Some((block.decode()?, offset)));
        }

        match &self.reference_source {
            Some(source) => {
                let bases = source.bases(reference_sequence_id)?;
                Ok(Some((bases.to_vec(), 0)))
            }
            None => Ok(None),
        }
    }

    fn verify_reference_md5(
        &self,
        slice: &Slice,
        reference_sequence_id: usize,
        bases: &[u8],
        offset: usize,
    ) -> Result<()> {
        let Some(expected) = slice.header().reference_md5() else {
            return Ok(());
        };

        let context = slice.header().alignment_context();

        let (Some(start), span) = (context.alignment_start(), context.alignment_span()) else {
            return Ok(());
        };

        let Some(slab) = (usize::from(start) - 1)
            .checked_sub(offset)
            .and_then(|i| bases.get(i..i + span))
        else {
            return Err(Error::InvalidState(
                "reference is shorter than the slice alignment interval",
            ));
        };

        let actual = calculate_normalized_sequence_digest(slab);

        if actual == *expected {
            return Ok(());
        }

        match self.validation_stringency {
            ValidationStringency::Strict => Err(Error::ReferenceMismatch {
                reference_sequence_id,
                expected: *expected,
                actual,
            }),
            ValidationStringency::Lenient => {
                tracing::warn!(
                    reference_sequence_id,
                    "reference MD5 mismatch; continuing with the supplied reference"
                );
                Ok(())
            }
            ValidationStringency::Silent => Ok(()),
        }
    }
}

fn restore_record_sequence(
    record: &mut Record,
    slab: Option<resolve::ReferenceSlab<'_>>,
    substitution_matrix: &crate::container::compression_header::SubstitutionMatrix,
) -> Result<()> {
    if record.bam_flags().is_unmapped() || record.cram_flags().has_unknown_bases() {
        return Ok(());
    }

    let Some(alignment_start) = record.alignment_start() else {
        tracing::warn!(name = ?record.name(), "record appears mapped but has no valid alignment start");
        return Ok(());
    };

    record.sequence = resolve::resolve_bases(
        slab,
        substitution_matrix,
        &record.features,
        alignment_start,
        record.read_length,
    )?;

    Ok(())
}

fn into_alignment_record(record: Record) -> alignment::Record {
    let cigar = if record.bam_flags().is_unmapped() || !record.is_placed() {
        alignment::Cigar::default()
    } else {
        resolve::resolve_cigar(&record.features, record.read_length)
    };

    alignment::Record {
        name: record.name,
        flags: record.bam_flags,
        reference_sequence_id: record.reference_sequence_id,
        alignment_start: record.alignment_start,
        mapping_quality: record.mapping_quality,
        cigar,
        sequence: record.sequence,
        quality_scores: record.quality_scores,
        mate_reference_sequence_id: record.mate_reference_sequence_id,
        mate_alignment_start: record.mate_alignment_start,
        template_length: record.template_length,
        read_group_id: record.read_group_id,
        tags: record.tags,
    }
}

/// An iterator over all alignment records of a stream.
pub struct Records<'r, R> {
    reader: &'r mut Reader<R>,
    queue: VecDeque<alignment::Record>,
    done: bool,
}

impl<R> Iterator for Records<'_, R>
where
    R: Read,
{
    type Item = Result<alignment::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.queue.pop_front() {
                return Some(Ok(record));
            }

            if self.done {
                return None;
            }

            match self.reader.read_container() {
                Ok(Some(cram_container)) => {
                    match self.reader.container_records(&cram_container) {
                        Ok(records) => self.queue.extend(records),
                        Err(e) => {
                            self.done = true;
                            return Some(Err(e));
                        }
                    }
                }
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

struct CountingReader<'a, R> {
    inner: &'a mut R,
    consumed: u64,
}

impl<'a, R> CountingReader<'a, R> {
    fn new(inner: &'a mut R) -> Self {
        Self { inner, consumed: 0 }
    }
}

impl<R> Read for CountingReader<'_, R>
where
    R: Read,
{
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed += n as u64;
        Ok(n)
    }
}
