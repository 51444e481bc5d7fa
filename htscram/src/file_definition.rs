//! CRAM file definition.

pub(crate) mod version;

pub use self::version::Version;

pub(crate) static MAGIC_NUMBER: [u8; 4] = *b"CRAM";

/// A CRAM file definition.
///
/// The file definition holds the format version and a file ID, typically the
/// file name or a digest of the alignment data.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileDefinition {
    version: Version,
    file_id: [u8; 20],
}

impl FileDefinition {
    /// Creates a file definition.
    ///
    /// # Examples
    ///
    /// ```
    /// use htscram::{file_definition::Version, FileDefinition};
    /// let file_definition = FileDefinition::new(Version::V3_0, [0; 20]);
    /// ```
    pub fn new(version: Version, file_id: [u8; 20]) -> Self {
        Self { version, file_id }
    }

    /// Returns the format version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the file ID.
    pub fn file_id(&self) -> &[u8; 20] {
        &self.file_id
    }
}

impl Default for FileDefinition {
    fn default() -> Self {
        Self::new(Version::default(), [0; 20])
    }
}
