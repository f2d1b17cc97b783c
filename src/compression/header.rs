//! Fixed-size stream header.

use crate::core::DecoderBuffer;
use crate::util::{Error, Result};

use super::format::*;

/// Parsed stream header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamHeader {
    pub version_major: u8,
    pub version_minor: u8,
    pub encoder_type: EncodedGeometryType,
    /// Encoding method id; not validated by the decoder.
    pub encoder_method: u8,
    pub flags: u8,
}

impl StreamHeader {
    /// Check if the metadata flag is set.
    #[inline]
    pub fn has_metadata(&self) -> bool {
        self.flags & METADATA_FLAG_MASK != 0
    }

    /// Version ordinal of this header.
    #[inline]
    pub fn bitstream_version(&self) -> u16 {
        bitstream_version(self.version_major, self.version_minor)
    }
}

/// Parse and validate the header at the cursor.
///
/// The magic is checked as soon as it is read, so a foreign stream fails
/// without consuming anything past the signature.
pub fn decode_header(buffer: &mut DecoderBuffer<'_>) -> Result<StreamHeader> {
    let magic = buffer.decode_bytes(DRACO_MAGIC.len()).map_err(|_| Error::TruncatedHeader)?;
    if magic != DRACO_MAGIC {
        return Err(Error::InvalidMagic);
    }
    let mut field = || buffer.decode_u8().map_err(|_| Error::TruncatedHeader);
    let version_major = field()?;
    let version_minor = field()?;
    let encoder_type = EncodedGeometryType::from_u8(field()?);
    let encoder_method = field()?;
    let flags = field()?;
    Ok(StreamHeader { version_major, version_minor, encoder_type, encoder_method, flags })
}

/// Parse the header from a copy of the cursor, leaving `buffer` untouched.
pub fn peek_header(buffer: &DecoderBuffer<'_>) -> Result<StreamHeader> {
    decode_header(&mut buffer.clone())
}
