use crate::container::{AlignmentContext, block::ContentId};

/// A slice header.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    pub(crate) alignment_context: AlignmentContext,
    pub(crate) record_count: usize,
    pub(crate) record_counter: u64,
    pub(crate) block_count: usize,
    pub(crate) block_content_ids: Vec<ContentId>,
    pub(crate) embedded_reference_content_id: Option<ContentId>,
    pub(crate) reference_md5: Option<[u8; 16]>,
    pub(crate) optional_tags: Vec<u8>,
}

impl Header {
    /// Returns the alignment context.
    pub fn alignment_context(&self) -> AlignmentContext {
        self.alignment_context
    }

    /// Returns the number of records in the slice.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Returns the global counter of the slice's first record.
    pub fn record_counter(&self) -> u64 {
        self.record_counter
    }

    /// Returns the number of blocks in the slice.
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Returns the content IDs of the slice's blocks.
    pub fn block_content_ids(&self) -> &[ContentId] {
        &self.block_content_ids
    }

    /// Returns the content ID of the embedded reference block, if any.
    pub fn embedded_reference_content_id(&self) -> Option<ContentId> {
        self.embedded_reference_content_id
    }

    /// Returns the MD5 digest of the covered reference interval.
    ///
    /// Multi-reference and unmapped slices carry no digest (all zeros on the
    /// wire).
    pub fn reference_md5(&self) -> Option<&[u8; 16]> {
        self.reference_md5.as_ref()
    }

    /// Returns the raw optional tag bytes.
    pub fn optional_tags(&self) -> &[u8] {
        &self.optional_tags
    }
}
