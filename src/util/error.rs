//! Error types for the Draco decoder.

use thiserror::Error;

/// Coarse classification of an [`Error`], matching the status codes callers
/// usually branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input ended before a fixed-size field could be read.
    Io,
    /// The input is not a valid stream, or the decoder was misused.
    Format,
    /// The stream was written by an incompatible encoder version.
    UnsupportedVersion,
}

/// Main error type for decoding operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Buffer exhausted before a field could be read
    #[error("Unexpected end of buffer at offset {offset} (needed {needed} more bytes)")]
    UnexpectedEof { offset: usize, needed: usize },

    /// The fixed stream header could not be read in full
    #[error("Failed to parse Draco header")]
    TruncatedHeader,

    /// Invalid magic bytes at start of the stream
    #[error("Not a Draco file")]
    InvalidMagic,

    /// Major version outside the range this build decodes
    #[error("Unsupported major version {found} (supported: {supported})")]
    UnsupportedMajorVersion { found: u8, supported: u8 },

    /// Minor version outside the range this build decodes
    #[error("Unsupported minor version {major}.{found} (supported: {major}.{supported})")]
    UnsupportedMinorVersion { major: u8, found: u8, supported: u8 },

    /// Header geometry type does not match the decoder in use
    #[error("Using incompatible decoder for the input geometry: expected {expected}, got {actual}")]
    GeometryTypeMismatch { expected: String, actual: String },

    /// Invalid data structure in the stream
    #[error("Invalid stream structure: {0}")]
    InvalidStructure(String),

    /// A pipeline stage reported failure
    #[error("{0}")]
    DecoderFailed(String),

    /// Calls issued against a session in the wrong order
    #[error("Invalid decoder usage: {0}")]
    SessionMisuse(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(std::path::PathBuf),

    /// Memory mapping failed
    #[error("Memory mapping failed: {0}")]
    MmapFailed(String),

    /// Geometry cannot be written in the requested format
    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 conversion error
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create a stage failure error.
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::DecoderFailed(msg.into())
    }

    /// Create a session misuse error.
    pub fn misuse(msg: impl Into<String>) -> Self {
        Self::SessionMisuse(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnexpectedEof { .. }
            | Self::TruncatedHeader
            | Self::FileNotFound(_)
            | Self::MmapFailed(_)
            | Self::Io(_) => ErrorKind::Io,
            Self::UnsupportedMajorVersion { .. } | Self::UnsupportedMinorVersion { .. } => {
                ErrorKind::UnsupportedVersion
            }
            Self::InvalidMagic
            | Self::GeometryTypeMismatch { .. }
            | Self::InvalidStructure(_)
            | Self::DecoderFailed(_)
            | Self::SessionMisuse(_)
            | Self::ExportFailed(_)
            | Self::Utf8(_) => ErrorKind::Format,
        }
    }

    /// True for version errors raised because of the major field.
    pub fn is_major_version_error(&self) -> bool {
        matches!(self, Self::UnsupportedMajorVersion { .. })
    }

    /// True for version errors raised because of the minor field.
    pub fn is_minor_version_error(&self) -> bool {
        matches!(self, Self::UnsupportedMinorVersion { .. })
    }
}

/// Result type alias for decoding operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::InvalidMagic;
        assert_eq!(e.to_string(), "Not a Draco file");

        let e = Error::UnsupportedMajorVersion { found: 99, supported: 2 };
        assert!(e.to_string().contains("major"));
        assert!(e.to_string().contains("99"));

        let e = Error::UnsupportedMinorVersion { major: 2, found: 9, supported: 3 };
        assert!(e.to_string().contains("minor"));
        assert!(e.to_string().contains("2.9"));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::TruncatedHeader.kind(), ErrorKind::Io);
        assert_eq!(Error::UnexpectedEof { offset: 3, needed: 1 }.kind(), ErrorKind::Io);
        assert_eq!(Error::InvalidMagic.kind(), ErrorKind::Format);
        assert_eq!(Error::misuse("twice").kind(), ErrorKind::Format);
        assert_eq!(
            Error::UnsupportedMinorVersion { major: 2, found: 4, supported: 3 }.kind(),
            ErrorKind::UnsupportedVersion
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
