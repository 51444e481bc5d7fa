use bitflags::bitflags;

bitflags! {
    /// SAM alignment flags (the BF data series).
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Flags: u16 {
        /// The read is segmented (paired).
        const SEGMENTED = 0x01;
        /// Each segment is properly aligned.
        const PROPERLY_SEGMENTED = 0x02;
        /// The segment is unmapped.
        const UNMAPPED = 0x04;
        /// The mate is unmapped.
        const MATE_UNMAPPED = 0x08;
        /// The sequence is reverse complemented.
        const REVERSE_COMPLEMENTED = 0x10;
        /// The mate sequence is reverse complemented.
        const MATE_REVERSE_COMPLEMENTED = 0x20;
        /// This is the first segment in the template.
        const FIRST_SEGMENT = 0x40;
        /// This is the last segment in the template.
        const LAST_SEGMENT = 0x80;
        /// This is a secondary alignment.
        const SECONDARY = 0x100;
        /// The read fails quality checks.
        const QC_FAIL = 0x200;
        /// The read is a PCR or optical duplicate.
        const DUPLICATE = 0x400;
        /// This is a supplementary alignment.
        const SUPPLEMENTARY = 0x800;
    }
}

impl Flags {
    /// Returns whether the read is segmented.
    pub fn is_segmented(self) -> bool {
        self.contains(Self::SEGMENTED)
    }

    /// Returns whether the segment is unmapped.
    pub fn is_unmapped(self) -> bool {
        self.contains(Self::UNMAPPED)
    }

    /// Returns whether the mate is unmapped.
    pub fn is_mate_unmapped(self) -> bool {
        self.contains(Self::MATE_UNMAPPED)
    }

    /// Returns whether the sequence is reverse complemented.
    pub fn is_reverse_complemented(self) -> bool {
        self.contains(Self::REVERSE_COMPLEMENTED)
    }

    /// Returns whether the mate sequence is reverse complemented.
    pub fn is_mate_reverse_complemented(self) -> bool {
        self.contains(Self::MATE_REVERSE_COMPLEMENTED)
    }

    /// Returns whether this is a secondary alignment.
    pub fn is_secondary(self) -> bool {
        self.contains(Self::SECONDARY)
    }
}

bitflags! {
    /// CRAM-specific record flags (the CF data series).
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct CramFlags: u8 {
        /// Quality scores are stored verbatim as an array, even for mapped
        /// reads.
        const FORCE_PRESERVE_QUALITY_SCORES = 0x01;
        /// The record carries its own mate fields instead of an in-slice
        /// mate link.
        const DETACHED = 0x02;
        /// The next fragment of this template is downstream in the same
        /// slice.
        const HAS_MATE_DOWNSTREAM = 0x04;
        /// The read bases are unknown and are not stored.
        const UNKNOWN_BASES = 0x08;
    }
}

impl CramFlags {
    /// Returns whether quality scores are stored verbatim.
    pub fn quality_scores_are_preserved(self) -> bool {
        self.contains(Self::FORCE_PRESERVE_QUALITY_SCORES)
    }

    /// Returns whether the record is detached from any in-slice mate.
    pub fn is_detached(self) -> bool {
        self.contains(Self::DETACHED)
    }

    /// Returns whether the next fragment is downstream in the same slice.
    pub fn has_mate_downstream(self) -> bool {
        self.contains(Self::HAS_MATE_DOWNSTREAM)
    }

    /// Returns whether the read bases are unknown.
    pub fn has_unknown_bases(self) -> bool {
        self.contains(Self::UNKNOWN_BASES)
    }
}

bitflags! {
    /// Mate flags (the MF data series).
    ///
    /// Mate strand and mate mapping are kept redundantly here and in the BAM
    /// flags; writers keep the two in sync.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct MateFlags: u8 {
        /// The mate is on the negative strand.
        const ON_NEGATIVE_STRAND = 0x01;
        /// The mate is unmapped.
        const UNMAPPED = 0x02;
    }
}

impl MateFlags {
    /// Returns whether the mate is on the negative strand.
    pub fn is_on_negative_strand(self) -> bool {
        self.contains(Self::ON_NEGATIVE_STRAND)
    }

    /// Returns whether the mate is unmapped.
    pub fn is_unmapped(self) -> bool {
        self.contains(Self::UNMAPPED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags() {
        let flags = Flags::SEGMENTED | Flags::REVERSE_COMPLEMENTED;
        assert!(flags.is_segmented());
        assert!(flags.is_reverse_complemented());
        assert!(!flags.is_unmapped());
        assert_eq!(flags.bits(), 0x11);
    }

    #[test]
    fn test_cram_flags() {
        let flags = CramFlags::DETACHED | CramFlags::UNKNOWN_BASES;
        assert!(flags.is_detached());
        assert!(flags.has_unknown_bases());
        assert!(!flags.has_mate_downstream());
        assert_eq!(flags.bits(), 0x0a);
    }

    #[test]
    fn test_mate_flags() {
        let flags = MateFlags::ON_NEGATIVE_STRAND;
        assert!(flags.is_on_negative_strand());
        assert!(!flags.is_unmapped());
    }
}
