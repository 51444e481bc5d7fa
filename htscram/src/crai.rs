//! The CRAM index (CRAI).
//!
//! A CRAI is a gzip-compressed text file with one entry per slice reference
//! context, mapping reference intervals to container and slice byte offsets.

mod record;

use std::{
    cmp,
    io::{BufRead, BufReader, Read, Write},
};

use flate2::{read::MultiGzDecoder, write::GzEncoder};

pub use self::record::Record;
use crate::{
    container::slice,
    error::{Error, Result},
};

/// A CRAM index: a list of entries in query order.
pub type Index = Vec<Record>;

/// Sorts entries into the canonical CRAI total order.
///
/// Entries are grouped by reference sequence ID ascending with unplaced
/// entries last; placed entries order by alignment start, then container
/// offset, then slice offset; unplaced entries ignore the alignment start.
pub fn sort(index: &mut Index) {
    index.sort_by(compare);
}

fn compare(a: &Record, b: &Record) -> cmp::Ordering {
    match (a.reference_sequence_id(), b.reference_sequence_id()) {
        // unplaced sorts last
        (Some(_), None) => cmp::Ordering::Less,
        (None, Some(_)) => cmp::Ordering::Greater,
        (None, None) => a
            .offset()
            .cmp(&b.offset())
            .then(a.landmark().cmp(&b.landmark())),
        (Some(i), Some(j)) => i.cmp(&j).then_with(|| {
            a.alignment_start()
                .cmp(&b.alignment_start())
                .then(a.offset().cmp(&b.offset()))
                .then(a.landmark().cmp(&b.landmark()))
        }),
    }
}

/// Returns whether two entries cover overlapping reference intervals.
///
/// Entries on different references, entries with empty spans, and unplaced
/// entries (including against themselves) never intersect.
pub fn intersects(a: &Record, b: &Record) -> bool {
    let (Some(i), Some(j)) = (a.reference_sequence_id(), b.reference_sequence_id()) else {
        return false;
    };

    if i != j || a.alignment_span() == 0 || b.alignment_span() == 0 {
        return false;
    }

    let (Some(a_start), Some(b_start)) = (a.alignment_start(), b.alignment_start()) else {
        return false;
    };

    let a_start = usize::from(a_start);
    let b_start = usize::from(b_start);

    a_start < b_start + b.alignment_span() && b_start < a_start + a.alignment_span()
}

/// Builds the index of a CRAM stream.
///
/// The reader must be positioned at the file definition. Multi-reference
/// slices are expanded into per-reference entries via their alignment span
/// pass, which requires the stream to be coordinate-sorted.
pub fn index<R>(reader: &mut crate::io::Reader<R>) -> Result<Index>
where
    R: Read,
{
    reader.read_file_definition()?;
    reader.read_file_header()?;

    let mut entries = Index::new();

    while let Some(container) = reader.read_container()? {
        let byte_offset = container
            .byte_offset()
            .ok_or(Error::InvalidState("container has no byte offset"))?;

        for current_slice in container.slices() {
            let spans = if current_slice
                .header()
                .alignment_context()
                .reference_context()
                .is_multi()
            {
                let records = current_slice.records(container.compression_header())?;

                Some(slice::multi_reference_alignment_spans(
                    &records,
                    container.compression_header().preservation_map().ap_delta(),
                )?)
            } else {
                None
            };

            entries.extend(current_slice.crai_entries(byte_offset, spans.as_deref())?);
        }
    }

    sort(&mut entries);

    Ok(entries)
}

/// Writes an index as gzip-compressed tab-separated text.
pub fn write<W>(writer: W, index: &Index) -> Result<()>
where
    W: Write,
{
    let mut encoder = GzEncoder::new(writer, flate2::Compression::default());

    for record in index {
        let reference_sequence_id = record
            .reference_sequence_id()
            .map(|id| id as i64)
            .unwrap_or(-1);

        let alignment_start = record
            .alignment_start()
            .map(usize::from)
            .unwrap_or_default();

        writeln!(
            encoder,
            "{}\t{}\t{}\t{}\t{}\t{}",
            reference_sequence_id,
            alignment_start,
            record.alignment_span(),
            record.offset(),
            record.landmark(),
            record.slice_size(),
        )
        .map_err(Error::Io)?;
    }

    encoder.finish().map_err(Error::Io)?;

    Ok(())
}

/// Reads a gzip-compressed text index.
pub fn read<R>(reader: R) -> Result<Index>
where
    R: Read,
{
    let mut decoder = BufReader::new(MultiGzDecoder::new(reader));

    let mut index = Index::new();
    let mut line = String::new();

    loop {
        line.clear();

        if decoder.read_line(&mut line)? == 0 {
            break;
        }

        index.push(parse_line(line.trim_end())?);
    }

    Ok(index)
}

fn parse_line(line: &str) -> Result<Record> {
    let mut fields = line.split('\t');

    let mut next_field = |name: &str| {
        fields
            .next()
            .ok_or_else(|| Error::Malformed(format!("missing CRAI field: {name}")))
    };

    let reference_sequence_id: i64 = parse_int(next_field("reference sequence ID")?)?;
    let alignment_start: i64 = parse_int(next_field("alignment start")?)?;
    let alignment_span: i64 = parse_int(next_field("alignment span")?)?;
    let offset: u64 = parse_int(next_field("offset")?)?;
    let landmark: u64 = parse_int(next_field("landmark")?)?;
    let slice_size: u64 = parse_int(next_field("slice size")?)?;

    let reference_sequence_id = i32::try_from(reference_sequence_id)
        .map_err(|_| Error::Malformed(format!("invalid reference sequence ID: {reference_sequence_id}")))?;

    Record::try_new(
        reference_sequence_id,
        alignment_start,
        alignment_span,
        offset,
        landmark,
        slice_size,
    )
}

fn parse_int<N: lexical_core::FromLexical>(s: &str) -> Result<N> {
    lexical_core::parse(s.as_bytes())
        .map_err(|e| Error::Malformed(format!("invalid CRAI number {s:?}: {e}")))
}
