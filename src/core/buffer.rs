//! Read cursor over an encoded stream.

use byteorder::{LittleEndian, ReadBytesExt};

use crate::util::{Error, Result};

/// Maximum encoded length of a u32 varint.
const MAX_VARINT32_BYTES: usize = 5;

/// Maximum encoded length of a u64 varint.
const MAX_VARINT64_BYTES: usize = 10;

/// Borrowing read cursor over an encoded buffer.
///
/// Besides the read position the cursor carries the negotiated bitstream
/// version, so every stage that reads through it can branch on the version
/// without access to the stream header.
#[derive(Clone, Debug)]
pub struct DecoderBuffer<'a> {
    data: &'a [u8],
    pos: usize,
    bitstream_version: u16,
}

impl<'a> DecoderBuffer<'a> {
    /// Create a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0, bitstream_version: 0 }
    }

    /// Total size of the underlying data.
    #[inline]
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// Current read offset.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left to read.
    #[inline]
    pub fn remaining_size(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Unread part of the buffer.
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Negotiated bitstream version, `0` until the header was accepted.
    #[inline]
    pub fn bitstream_version(&self) -> u16 {
        self.bitstream_version
    }

    /// Attach the negotiated bitstream version.
    #[inline]
    pub fn set_bitstream_version(&mut self, version: u16) {
        self.bitstream_version = version;
    }

    fn eof(&self, needed: usize) -> Error {
        Error::UnexpectedEof {
            offset: self.pos,
            needed: needed.saturating_sub(self.remaining_size()).max(1),
        }
    }

    fn read_with<T>(
        &mut self,
        size: usize,
        read: impl FnOnce(&mut &'a [u8]) -> std::io::Result<T>,
    ) -> Result<T> {
        let mut rest = self.remaining();
        let value = read(&mut rest).map_err(|_| self.eof(size))?;
        self.pos += size;
        Ok(value)
    }

    /// Skip `len` bytes.
    pub fn advance(&mut self, len: usize) -> Result<()> {
        if len > self.remaining_size() {
            return Err(self.eof(len));
        }
        self.pos += len;
        Ok(())
    }

    /// Read a u8.
    pub fn decode_u8(&mut self) -> Result<u8> {
        self.read_with(1, |r| r.read_u8())
    }

    /// Read an i8.
    pub fn decode_i8(&mut self) -> Result<i8> {
        self.read_with(1, |r| r.read_i8())
    }

    /// Read a little-endian u16.
    pub fn decode_u16(&mut self) -> Result<u16> {
        self.read_with(2, |r| r.read_u16::<LittleEndian>())
    }

    /// Read a little-endian u32.
    pub fn decode_u32(&mut self) -> Result<u32> {
        self.read_with(4, |r| r.read_u32::<LittleEndian>())
    }

    /// Read a little-endian f32.
    pub fn decode_f32(&mut self) -> Result<f32> {
        self.read_with(4, |r| r.read_f32::<LittleEndian>())
    }

    /// Read a fixed-size byte array.
    pub fn decode_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.decode_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn decode_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining_size() {
            return Err(self.eof(len));
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Read an unsigned LEB128 varint that must fit in 32 bits.
    pub fn decode_varint_u32(&mut self) -> Result<u32> {
        let value = self.decode_varint(MAX_VARINT32_BYTES)?;
        u32::try_from(value).map_err(|_| Error::invalid("varint exceeds 32 bits"))
    }

    /// Read an unsigned LEB128 varint.
    pub fn decode_varint_u64(&mut self) -> Result<u64> {
        self.decode_varint(MAX_VARINT64_BYTES)
    }

    fn decode_varint(&mut self, max_bytes: usize) -> Result<u64> {
        let mut result = 0u64;
        for i in 0..max_bytes {
            let byte = self.decode_u8()?;
            let bits = u64::from(byte & 0x7f);
            let shift = 7 * i as u32;
            if shift == 63 && bits > 1 {
                return Err(Error::invalid("varint overflow"));
            }
            result |= bits << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(Error::invalid("varint too long"))
    }

    /// Read a varint and map it to a signed value (zig-zag).
    pub fn decode_signed_varint(&mut self) -> Result<i64> {
        Ok(zigzag_decode(self.decode_varint_u64()?))
    }
}

/// Map an unsigned zig-zag symbol back to its signed value.
#[inline]
pub const fn zigzag_decode(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}
