//! The CRAM writer driver.

mod builder;
pub(crate) mod collections;
pub(crate) mod container;
mod factory;
pub(crate) mod header;
pub(crate) mod num;
pub(crate) mod record;

use std::{io::Write, sync::Arc};

pub use self::builder::Builder;
use self::{
    container::{build_compression_header, build_slice, write_container, write_eof_container},
    factory::{ContainerBatch, ContainerFactory},
    header::{write_file_definition, write_file_header},
    record::build_record,
};
use crate::{
    FileDefinition, SamHeader, alignment,
    codecs::CompressorCache,
    container::{AlignmentContext, Container, ReferenceContext},
    crai,
    error::{Error, Result},
    reference::ReferenceSource,
    strategy::{CompressionMap, CramEncodingStrategy},
};

/// A CRAM writer.
///
/// Records accumulate into slices and containers per the encoding strategy;
/// dropping the writer (or calling [`Self::try_finish`]) flushes buffered
/// records and terminates the stream with the EOF container, so earlier
/// containers are never left half-written.
pub struct Writer<W>
where
    W: Write,
{
    inner: W,
    reference_source: Option<Arc<dyn ReferenceSource + Send + Sync>>,
    strategy: CramEncodingStrategy,
    compression_map: CompressionMap,
    cache: CompressorCache,
    factory: ContainerFactory,
    record_counter: u64,
    position: u64,
    index: Option<crai::Index>,
    finished: bool,
    reference_cache: Option<(usize, Arc<[u8]>)>,
}

impl<W> Writer<W>
where
    W: Write,
{
    /// Creates a writer with default options and no reference source.
    pub fn new(inner: W) -> Self {
        Builder::default().build_from_writer(inner)
    }

    pub(crate) fn from_parts(
        inner: W,
        reference_source: Option<Arc<dyn ReferenceSource + Send + Sync>>,
        strategy: CramEncodingStrategy,
        compression_map: CompressionMap,
    ) -> Self {
        let factory = ContainerFactory::new(&strategy);

        Self {
            inner,
            reference_source,
            strategy,
            compression_map,
            cache: CompressorCache::default(),
            factory,
            record_counter: 0,
            position: 0,
            index: Some(Vec::new()),
            finished: false,
            reference_cache: None,
        }
    }

    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Writes the file definition.
    pub fn write_file_definition(&mut self) -> Result<()> {
        let n = write_file_definition(&mut self.inner, &FileDefinition::default())?;
        self.position += n as u64;
        Ok(())
    }

    /// Writes the SAM header container.
    pub fn write_file_header(&mut self, header: &SamHeader) -> Result<()> {
        let n = write_file_header(&mut self.inner, header, Default::default())?;
        self.position += n as u64;
        Ok(())
    }

    /// Converts and buffers an alignment record, writing any containers that
    /// became complete.
    pub fn write_alignment_record(&mut self, record: &alignment::Record) -> Result<()> {
        let reference = if self.strategy.embed_bases {
            None
        } else {
            match (record.reference_sequence_id, record.flags.is_unmapped()) {
                (Some(id), false) => self.reference_bases(id)?,
                _ => None,
            }
        };

        let record = build_record(record, reference.as_deref())?;

        let mut ready = Vec::new();
        self.factory.add(record, &mut ready);

        for batch in ready {
            self.write_container_batch(batch)?;
        }

        Ok(())
    }

    /// Flushes buffered records and writes the EOF container.
    ///
    /// This is idempotent; it is also invoked on drop, ignoring errors, so
    /// explicit calls are preferred when failures matter.
    pub fn try_finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }

        let mut ready = Vec::new();
        self.factory.flush(&mut ready);

        // A failed batch is discarded, not half-written: containers buffer
        // fully before touching the stream. The EOF container still goes out
        // so the stream stays terminated at a container boundary.
        let mut result = Ok(());

        for batch in ready {
            if let Err(e) = self.write_container_batch(batch) {
                result = Err(e);
                break;
            }
        }

        self.finished = true;

        write_eof_container(&mut self.inner)?;
        self.position += container::EOF_V3.len() as u64;

        result
    }

    /// Returns the CRAI entries collected so far, in landmark order.
    ///
    /// `None` when entries could not be derived (multi-reference slices over
    /// non-coordinate-sorted records).
    pub fn index(&self) -> Option<&crai::Index> {
        self.index.as_ref()
    }

    fn reference_bases(&mut self, reference_sequence_id: usize) -> Result<Option<Arc<[u8]>>> {
        let Some(source) = &self.reference_source else {
            return Ok(None);
        };

        if let Some((id, bases)) = &self.reference_cache {
            if *id == reference_sequence_id {
                return Ok(Some(bases.clone()));
            }
        }

        let bases = source.bases(reference_sequence_id)?;
        self.reference_cache = Some((reference_sequence_id, bases.clone()));

        Ok(Some(bases))
    }

    fn write_container_batch(&mut self, batch: ContainerBatch) -> Result<()> {
        let reference_required = self.reference_source.is_some()
            && !self.strategy.embed_reference
            && !self.strategy.embed_bases;

        let compression_header = build_compression_header(
            &batch.records,
            self.strategy.preserve_read_names,
            reference_required,
        );

        let ContainerBatch {
            mut records,
            slice_lengths,
        } = batch;

        let base_count: u64 = records.iter().map(|r| r.read_length() as u64).sum();

        let mut slices = Vec::with_capacity(slice_lengths.len());
        let mut slice_record_counter = self.record_counter;
        let mut multi_reference_spans = Vec::with_capacity(slice_lengths.len());
        let mut offset = 0;

        for len in slice_lengths {
            let chunk = &mut records[offset..offset + len];
            offset += len;

            let alignment_context = AlignmentContext::from_placements(chunk.iter().map(|r| {
                (
                    r.reference_sequence_id(),
                    r.alignment_start(),
                    r.alignment_end(),
                )
            }));

            let (reference_md5, embedded_reference) =
                self.slice_reference_parts(alignment_context)?;

            // Spans for CRAI derivation must be taken before encoding, while
            // the records are at hand.
            let spans = if alignment_context.reference_context().is_multi() {
                crate::container::slice::multi_reference_alignment_spans(
                    chunk,
                    compression_header.preservation_map().ap_delta(),
                )
                .ok()
            } else {
                None
            };
            multi_reference_spans.push(spans);

            let slice = build_slice(
                &compression_header,
                &self.compression_map,
                &mut self.cache,
                alignment_context,
                slice_record_counter,
                reference_md5,
                embedded_reference,
                chunk,
            )?;

            slice_record_counter += len as u64;
            slices.push(slice);
        }

        let mut container = Container::try_new(
            compression_header,
            slices,
            self.record_counter,
            base_count,
        )?;

        let used_content_ids = container
            .slices
            .iter()
            .flat_map(|slice| slice.external_blocks().iter().map(|block| block.content_id()))
            .collect();

        container
            .compression_header
            .data_series_encodings
            .retain_used_content_ids(&used_content_ids);

        let byte_offset = self.position;

        let n = write_container(
            &mut self.inner,
            &mut container,
            &mut self.cache,
            self.strategy.gzip_compression_level,
            Default::default(),
            byte_offset,
        )?;

        self.position += n as u64;
        self.record_counter += records.len() as u64;

        self.collect_index_entries(&container, &multi_reference_spans);

        Ok(())
    }

    fn slice_reference_parts(
        &mut self,
        alignment_context: AlignmentContext,
    ) -> Result<(Option<[u8; 16]>, Option<Vec<u8>>)> {
        let ReferenceContext::Single(reference_sequence_id) =
            alignment_context.reference_context()
        else {
            return Ok((None, None));
        };

        let (Some(start), Some(end)) = (
            alignment_context.alignment_start(),
            alignment_context.alignment_end(),
        ) else {
            return Ok((None, None));
        };

        let Some(bases) = self.reference_bases(reference_sequence_id)? else {
            return Ok((None, None));
        };

        let i = usize::from(start) - 1;
        let slab = bases.get(i..usize::from(end)).ok_or(Error::InvalidState(
            "slice alignment interval out of reference bounds",
        ))?;

        if self.strategy.embed_reference {
            // Embedded references are the reference, so no digest is needed.
            Ok((None, Some(slab.to_vec())))
        } else {
            Ok((
                Some(crate::reference::calculate_normalized_sequence_digest(slab)),
                None,
            ))
        }
    }

    fn collect_index_entries(
        &mut self,
        container: &Container,
        multi_reference_spans: &[Option<Vec<(ReferenceContext, crate::container::slice::AlignmentSpan)>>],
    ) {
        let Some(index) = self.index.as_mut() else {
            return;
        };

        let Some(byte_offset) = container.byte_offset() else {
            return;
        };

        for (slice, spans) in container.slices().iter().zip(multi_reference_spans) {
            match slice.crai_entries(byte_offset, spans.as_deref()) {
                Ok(entries) => index.extend(entries),
                Err(e) => {
                    tracing::warn!("index entry derivation disabled: {e}");
                    self.index = None;
                    return;
                }
            }
        }
    }
}

impl<W> Drop for Writer<W>
where
    W: Write,
{
    fn drop(&mut self) {
        let _ = self.try_finish();
    }
}
