//! Decoding of geometry metadata blocks.
//!
//! ```text
//! geometry := varint num_att_metadata
//!             { varint att_unique_id, metadata } * num_att_metadata
//!             metadata
//! metadata := varint num_entries { name, varint size, size bytes } * num_entries
//!             varint num_sub_metadata { name, metadata } * num_sub_metadata
//! name     := u8 len, len bytes
//! ```

use crate::core::{AttributeMetadata, DecoderBuffer, EntryValue, GeometryMetadata, Metadata};
use crate::util::{Error, Result};

/// Nesting limit for sub-metadata blocks.
const MAX_METADATA_DEPTH: usize = 32;

/// Decode geometry metadata (attribute blocks followed by the geometry block).
pub fn decode_geometry_metadata(buffer: &mut DecoderBuffer<'_>) -> Result<GeometryMetadata> {
    let mut geometry = GeometryMetadata::new();
    let num_att_metadata = decode_count(buffer)?;
    for _ in 0..num_att_metadata {
        let att_unique_id = buffer.decode_varint_u32()?;
        let mut att_metadata = AttributeMetadata::new(att_unique_id);
        decode_metadata_into(buffer, att_metadata.metadata_mut(), 0)?;
        geometry.add_attribute_metadata(att_metadata);
    }
    decode_metadata_into(buffer, geometry.metadata_mut(), 0)?;
    Ok(geometry)
}

/// Decode a single metadata block.
pub fn decode_metadata(buffer: &mut DecoderBuffer<'_>) -> Result<Metadata> {
    let mut metadata = Metadata::new();
    decode_metadata_into(buffer, &mut metadata, 0)?;
    Ok(metadata)
}

fn decode_metadata_into(buffer: &mut DecoderBuffer<'_>, metadata: &mut Metadata, depth: usize) -> Result<()> {
    if depth > MAX_METADATA_DEPTH {
        return Err(Error::invalid("metadata nested too deeply"));
    }
    let num_entries = decode_count(buffer)?;
    for _ in 0..num_entries {
        let name = decode_name(buffer)?;
        let size = buffer.decode_varint_u32()? as usize;
        if size == 0 {
            return Err(Error::invalid(format!("metadata entry '{name}' is empty")));
        }
        let value = buffer.decode_bytes(size)?;
        metadata.add_entry(name, EntryValue::from_bytes(value));
    }
    let num_sub_metadata = decode_count(buffer)?;
    for _ in 0..num_sub_metadata {
        let name = decode_name(buffer)?;
        let mut sub = Metadata::new();
        decode_metadata_into(buffer, &mut sub, depth + 1)?;
        metadata.add_sub_metadata(name, sub);
    }
    Ok(())
}

/// Read a count that cannot exceed the remaining bytes (every item takes
/// at least one byte).
fn decode_count(buffer: &mut DecoderBuffer<'_>) -> Result<u32> {
    let count = buffer.decode_varint_u32()?;
    if count as usize > buffer.remaining_size() {
        return Err(Error::invalid(format!(
            "metadata count {count} exceeds remaining {} bytes",
            buffer.remaining_size()
        )));
    }
    Ok(count)
}

fn decode_name(buffer: &mut DecoderBuffer<'_>) -> Result<String> {
    let len = buffer.decode_u8()? as usize;
    let bytes = buffer.decode_bytes(len)?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(out: &mut Vec<u8>, s: &str) {
        out.push(s.len() as u8);
        out.extend_from_slice(s.as_bytes());
    }

    fn string_entry(out: &mut Vec<u8>, key: &str, value: &str) {
        name(out, key);
        out.push(value.len() as u8);
        out.extend_from_slice(value.as_bytes());
    }

    #[test]
    fn test_geometry_metadata() {
        let mut data = vec![2u8];
        // attribute 0: name=position
        data.push(0);
        data.push(1);
        string_entry(&mut data, "name", "position");
        data.push(0);
        // attribute 3: name=color
        data.push(3);
        data.push(1);
        string_entry(&mut data, "name", "color");
        data.push(0);
        // geometry: one entry, one sub block with one entry
        data.push(1);
        string_entry(&mut data, "source", "scan");
        data.push(1);
        name(&mut data, "units");
        data.push(1);
        string_entry(&mut data, "length", "m");
        data.push(0);

        let mut buf = DecoderBuffer::new(&data);
        let geo = decode_geometry_metadata(&mut buf).unwrap();
        assert_eq!(buf.remaining_size(), 0);
        assert_eq!(geo.attribute_metadatas().len(), 2);
        assert_eq!(geo.attribute_metadata(3).unwrap().get_entry_string("name"), Some("color"));
        assert_eq!(geo.get_entry_string("source"), Some("scan"));
        assert_eq!(
            geo.sub_metadata("units").and_then(|m| m.get_entry_string("length")),
            Some("m")
        );
    }

    #[test]
    fn test_truncated_metadata() {
        let mut data = vec![1u8, 0, 1];
        string_entry(&mut data, "name", "position");
        data.truncate(data.len() - 3);
        assert!(decode_geometry_metadata(&mut DecoderBuffer::new(&data)).is_err());
    }

    #[test]
    fn test_count_larger_than_buffer() {
        let data = [0x7fu8, 0, 0];
        assert!(decode_metadata(&mut DecoderBuffer::new(&data)).is_err());
    }

    #[test]
    fn test_nesting_limit() {
        let mut data = Vec::new();
        for _ in 0..=MAX_METADATA_DEPTH + 1 {
            data.push(0);
            data.push(1);
            name(&mut data, "n");
        }
        data.extend_from_slice(&[0, 0]);
        let err = decode_metadata(&mut DecoderBuffer::new(&data)).unwrap_err();
        assert!(err.to_string().contains("nested"));
    }
}
