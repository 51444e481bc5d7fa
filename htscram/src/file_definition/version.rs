use std::{cmp::Ordering, fmt};

use crate::{Error, Result};

/// A CRAM file definition version.
///
/// This is also called the format number. CRAM 3.0 is the write target;
/// 2.0 and 2.1 are accepted for reading.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Version {
    major: u8,
    minor: u8,
}

impl Version {
    /// CRAM 2.0
    pub const V2_0: Self = Self::new(2, 0);

    /// CRAM 2.1
    pub const V2_1: Self = Self::new(2, 1);

    /// CRAM 3.0
    pub const V3_0: Self = Self::new(3, 0);

    /// CRAM 3.1
    pub const V3_1: Self = Self::new(3, 1);

    /// Creates a file definition version.
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Returns the major version.
    pub fn major(&self) -> u8 {
        self.major
    }

    /// Returns the minor version.
    pub fn minor(&self) -> u8 {
        self.minor
    }

    /// Returns whether this version carries CRC32 checksums on container
    /// headers and blocks (>= 3.0).
    pub fn has_crc32(&self) -> bool {
        *self >= Self::V3_0
    }

    /// Validates that the version is supported for reading.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::V2_0 | Self::V2_1 | Self::V3_0 | Self::V3_1 => Ok(()),
            _ => Err(Error::UnsupportedVersion(self.major, self.minor)),
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::V3_0
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        assert_eq!(Version::default(), Version::new(3, 0));
    }

    #[test]
    fn test_ordering() {
        assert!(Version::V2_0 < Version::V2_1);
        assert!(Version::V2_1 < Version::V3_0);
        assert!(Version::V3_0 < Version::V3_1);
    }

    #[test]
    fn test_has_crc32() {
        assert!(!Version::V2_0.has_crc32());
        assert!(!Version::V2_1.has_crc32());
        assert!(Version::V3_0.has_crc32());
        assert!(Version::V3_1.has_crc32());
    }

    #[test]
    fn test_validate() {
        assert!(Version::V2_0.validate().is_ok());
        assert!(Version::V3_0.validate().is_ok());
        assert!(Version::V3_1.validate().is_ok());
        assert!(matches!(
            Version::new(4, 0).validate(),
            Err(Error::UnsupportedVersion(4, 0))
        ));
        assert!(Version::new(1, 0).validate().is_err());
    }
}
