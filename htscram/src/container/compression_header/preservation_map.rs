//! The compression header preservation map.

pub(crate) mod key;
pub mod substitution_matrix;
pub mod tag_sets;

pub(crate) use self::key::Key;
pub use self::{substitution_matrix::SubstitutionMatrix, tag_sets::TagSets};

/// Preservation flags and shared container state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PreservationMap {
    pub(crate) read_names_included: bool,
    pub(crate) ap_delta: bool,
    pub(crate) reference_required: bool,
    pub(crate) substitution_matrix: SubstitutionMatrix,
    pub(crate) tag_sets: TagSets,
}

impl PreservationMap {
    /// Returns whether records carry their original read names.
    pub fn read_names_included(&self) -> bool {
        self.read_names_included
    }

    /// Returns whether the AP data series holds deltas between successive
    /// alignment starts.
    ///
    /// This is set iff the container's records are coordinate-sorted.
    pub fn ap_delta(&self) -> bool {
        self.ap_delta
    }

    /// Returns whether decoding requires an external reference sequence.
    pub fn reference_required(&self) -> bool {
        self.reference_required
    }

    /// Returns the substitution matrix.
    pub fn substitution_matrix(&self) -> &SubstitutionMatrix {
        &self.substitution_matrix
    }

    /// Returns the tag-ID dictionary.
    pub fn tag_sets(&self) -> &TagSets {
        &self.tag_sets
    }
}

impl Default for PreservationMap {
    fn default() -> Self {
        // § 8.4 "Compression header block": the boolean values default to
        // true when absent.
        Self {
            read_names_included: true,
            ap_delta: true,
            reference_required: true,
            substitution_matrix: SubstitutionMatrix::default(),
            tag_sets: TagSets::default(),
        }
    }
}
