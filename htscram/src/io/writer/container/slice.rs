pub(crate) mod header;
mod records;

use std::collections::HashMap;

use self::records::Encoder;
use crate::{
    codecs::CompressorCache,
    container::{
        AlignmentContext, CompressionHeader,
        block::{Block, ContentId, ContentType},
        slice::{Header, Slice},
    },
    error::Result,
    record::{CramFlags, Record},
    strategy::CompressionMap,
};

/// Block content ID used for embedded reference sequences.
///
/// This cannot collide with a data series (1-30) or tag (24-bit) content ID.
pub(crate) const EMBEDDED_REFERENCE_CONTENT_ID: ContentId = i32::MAX;

const CORE_DATA_BLOCK_CONTENT_ID: ContentId = 0;

pub(crate) fn build_slice(
    compression_header: &CompressionHeader,
    compression_map: &CompressionMap,
    cache: &mut CompressorCache,
    alignment_context: AlignmentContext,
    record_counter: u64,
    reference_md5: Option<[u8; 16]>,
    embedded_reference: Option<Vec<u8>>,
    records: &mut [Record],
) -> Result<Slice> {
    set_mates(records);

    let (_, initial_alignment_start, _) = alignment_context.to_wire();

    let mut encoder = Encoder::new(
        compression_header,
        alignment_context.reference_context(),
        initial_alignment_start as i32,
    );

    for record in records.iter() {
        encoder.write_record(record)?;
    }

    let (core_data, external_data) = encoder.finish()?;

    let core_data_block = Block::compress(
        ContentType::CoreData,
        CORE_DATA_BLOCK_CONTENT_ID,
        compression_map.core_data_encoder(),
        cache,
        &core_data,
    )?;

    let mut external_data: Vec<_> = external_data
        .into_iter()
        .filter(|(_, buf)| !buf.is_empty())
        .collect();

    // Deterministic block order for stable output.
    external_data.sort_by_key(|(id, _)| *id);

    let mut external_blocks = external_data
        .into_iter()
        .map(|(block_content_id, buf)| {
            Block::compress(
                ContentType::ExternalData,
                block_content_id,
                compression_map.encoder_for(block_content_id),
                cache,
                &buf,
            )
        })
        .collect::<Result<Vec<_>>>()?;

    let mut embedded_reference_content_id = None;

    if let Some(bases) = embedded_reference {
        embedded_reference_content_id = Some(EMBEDDED_REFERENCE_CONTENT_ID);

        external_blocks.push(Block::compress(
            ContentType::ExternalData,
            EMBEDDED_REFERENCE_CONTENT_ID,
            None,
            cache,
            &bases,
        )?);
    }

    let mut block_content_ids = vec![CORE_DATA_BLOCK_CONTENT_ID];
    block_content_ids.extend(external_blocks.iter().map(|block| block.content_id()));

    let header = Header {
        alignment_context,
        record_count: records.len(),
        record_counter,
        block_count: 1 + external_blocks.len(),
        block_content_ids,
        embedded_reference_content_id,
        // Embedded references are the reference, so no digest is needed.
        reference_md5,
        optional_tags: Vec::new(),
    };

    Ok(Slice::new(header, core_data_block, external_blocks))
}

/// Links mates within the slice.
///
/// Walking backwards, the first fragment seen for a template name becomes
/// the downstream mate of the next one seen; anything unpaired within the
/// slice is marked detached and carries its own mate fields.
fn set_mates(records: &mut [Record]) {
    let mut indices: HashMap<Vec<u8>, usize> = HashMap::new();

    for i in (0..records.len()).rev() {
        let record = &mut records[i];
        let bam_flags = record.bam_flags;

        if bam_flags.is_segmented() && !bam_flags.is_secondary() {
            let Some(name) = record.name.as_ref().map(|name| name.to_vec()) else {
                set_detached(record);
                continue;
            };

            if let Some(j) = indices.insert(name, i) {
                let (left, right) = records.split_at_mut(i + 1);

                let record = &mut left[i];
                let mate = &mut right[j - i - 1];

                record.mate_distance = Some(j - i - 1);
                record.next_mate_index = Some(j);
                record.cram_flags.insert(CramFlags::HAS_MATE_DOWNSTREAM);
                record.cram_flags.remove(CramFlags::DETACHED);
                mate.cram_flags.remove(CramFlags::DETACHED);
            } else {
                set_detached(record);
            }
        } else {
            set_detached(record);
        }
    }
}

fn set_detached(record: &mut Record) {
    record.cram_flags.insert(CramFlags::DETACHED);
}

#[cfg(test)]
mod tests {
    use bstr::BString;

    use super::*;
    use crate::record::Flags;

    fn segmented(name: &str) -> Record {
        Record {
            bam_flags: Flags::SEGMENTED,
            name: Some(BString::from(name)),
            ..Default::default()
        }
    }

    #[test]
    fn test_set_mates() {
        let mut records = vec![
            segmented("q1"),
            segmented("q2"),
            segmented("q1"),
            Record::default(),
        ];

        set_mates(&mut records);

        assert!(records[0].cram_flags().has_mate_downstream());
        assert!(!records[0].cram_flags().is_detached());
        assert_eq!(records[0].mate_distance(), Some(1));
        assert_eq!(records[0].next_mate_index, Some(2));

        assert!(records[1].cram_flags().is_detached());
        assert!(!records[2].cram_flags().is_detached());
        assert!(records[3].cram_flags().is_detached());
    }
}
