//! The immutable SAM header context.

use bstr::BString;

/// The SAM header context passed into encode and decode drivers.
///
/// The codec treats the header text as opaque: it only needs the text itself
/// (for the file header container) and the reference sequence count (for ID
/// validation). There is no process-wide header state; every operation takes
/// this context explicitly.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SamHeader {
    text: BString,
    reference_sequence_count: usize,
}

impl SamHeader {
    /// Creates a header context.
    pub fn new(text: impl Into<BString>, reference_sequence_count: usize) -> Self {
        Self {
            text: text.into(),
            reference_sequence_count,
        }
    }

    /// Returns the raw SAM header text.
    pub fn text(&self) -> &BString {
        &self.text
    }

    /// Returns the number of reference sequences declared in the header.
    pub fn reference_sequence_count(&self) -> usize {
        self.reference_sequence_count
    }
}
