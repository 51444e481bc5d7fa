//! Errors raised while reading or writing CRAM streams.

use std::{error, fmt, io};

/// A specialized result type for CRAM operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error raised while reading or writing CRAM streams.
#[derive(Debug)]
pub enum Error {
    /// The underlying byte stream failed. Fatal for the stream.
    Io(io::Error),
    /// Structural corruption: bad magic, bad variable-length integer, wrong
    /// block content type, checksum mismatch. Fatal for the container.
    Malformed(String),
    /// The file declares a CRAM version this crate cannot read.
    UnsupportedVersion(u8, u8),
    /// A compression header declares an encoding this crate does not support
    /// for the given data series.
    UnsupportedEncoding {
        /// The data series the encoding was declared for (`"TAG"` for tag
        /// value encodings).
        data_series: &'static str,
        /// The encoding ID as written in the compression header.
        encoding_id: i32,
    },
    /// Programmer error: an operation was invoked on a value in the wrong
    /// state. Fatal for the operation.
    InvalidState(&'static str),
    /// The MD5 digest of the supplied reference slab does not match the
    /// digest recorded in a slice header.
    ReferenceMismatch {
        /// The reference sequence ID of the slice.
        reference_sequence_id: usize,
        /// The digest recorded in the slice header.
        expected: [u8; 16],
        /// The digest of the supplied reference slab.
        actual: [u8; 16],
    },
    /// A per-record anomaly, e.g., a read feature position outside the read.
    RecordValidation(String),
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(_) => write!(f, "I/O error"),
            Self::Malformed(s) => write!(f, "malformed input: {s}"),
            Self::UnsupportedVersion(major, minor) => {
                write!(f, "unsupported CRAM version: {major}.{minor}")
            }
            Self::UnsupportedEncoding {
                data_series,
                encoding_id,
            } => write!(
                f,
                "unsupported encoding for data series {data_series}: {encoding_id}"
            ),
            Self::InvalidState(s) => write!(f, "invalid state: {s}"),
            Self::ReferenceMismatch {
                reference_sequence_id,
                ..
            } => write!(
                f,
                "reference MD5 mismatch for sequence {reference_sequence_id}"
            ),
            Self::RecordValidation(s) => write!(f, "invalid record: {s}"),
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// How hard to fail when decoded data disagrees with supplied context.
///
/// This governs reference MD5 verification (§ 8.5 "Slice header block"):
/// `Strict` fails, `Lenient` logs and continues with the supplied reference,
/// and `Silent` continues without logging. Per-record anomalies are always
/// handled leniently.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ValidationStringency {
    /// Fail on mismatch.
    #[default]
    Strict,
    /// Log and continue.
    Lenient,
    /// Continue without logging.
    Silent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::UnsupportedVersion(5, 0).to_string(),
            "unsupported CRAM version: 5.0"
        );

        assert_eq!(
            Error::UnsupportedEncoding {
                data_series: "BF",
                encoding_id: 13,
            }
            .to_string(),
            "unsupported encoding for data series BF: 13"
        );
    }

    #[test]
    fn test_from_io_error() {
        let e = Error::from(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(e, Error::Io(_)));
    }
}
