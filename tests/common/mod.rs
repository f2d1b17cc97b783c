//! Stream builder shared by the integration tests.

#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};

pub const POINT_CLOUD: u8 = 0;
pub const MESH: u8 = 1;
pub const METADATA_FLAG: u8 = 0x80;

// Attribute types
pub const POSITION: u8 = 0;
pub const COLOR: u8 = 2;
pub const GENERIC: u8 = 4;

// Data types
pub const UINT8: u8 = 2;
pub const FLOAT32: u8 = 9;

// Value codecs
pub const CODEC_GENERIC: u8 = 0;
pub const CODEC_INTEGER: u8 = 1;
pub const CODEC_QUANTIZATION: u8 = 2;

/// Little-endian byte writer for hand-built streams.
#[derive(Default)]
pub struct StreamWriter {
    data: Vec<u8>,
}

impl StreamWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a stream with a 10-byte header.
    pub fn header(major: u8, minor: u8, geometry: u8, flags: u8) -> Self {
        let mut w = Self::new();
        w.bytes(b"DRACO").u8(major).u8(minor).u8(geometry).u8(0).u8(flags);
        w
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.data.write_u8(v).unwrap();
        self
    }

    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.data.write_u16::<LittleEndian>(v).unwrap();
        self
    }

    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.data.write_u32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.data.write_f32::<LittleEndian>(v).unwrap();
        self
    }

    pub fn f32s(&mut self, values: &[f32]) -> &mut Self {
        for &v in values {
            self.f32(v);
        }
        self
    }

    pub fn varint(&mut self, mut v: u64) -> &mut Self {
        while v >= 0x80 {
            self.data.push((v as u8 & 0x7f) | 0x80);
            v >>= 7;
        }
        self.data.push(v as u8);
        self
    }

    pub fn signed_varint(&mut self, v: i64) -> &mut Self {
        self.varint(((v << 1) ^ (v >> 63)) as u64)
    }

    pub fn bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Metadata name: u8 length followed by the bytes.
    pub fn name(&mut self, name: &str) -> &mut Self {
        self.u8(name.len() as u8).bytes(name.as_bytes())
    }

    /// Metadata block with string entries and no sub-blocks.
    pub fn string_metadata(&mut self, entries: &[(&str, &str)]) -> &mut Self {
        self.varint(entries.len() as u64);
        for (key, value) in entries {
            self.name(key).varint(value.len() as u64).bytes(value.as_bytes());
        }
        self.varint(0)
    }

    /// Geometry metadata naming attributes by unique id; empty geometry block.
    pub fn attribute_names(&mut self, names: &[(u32, &str)]) -> &mut Self {
        self.varint(names.len() as u64);
        for (unique_id, name) in names {
            self.varint(u64::from(*unique_id)).string_metadata(&[("name", name)]);
        }
        self.string_metadata(&[])
    }

    /// Sequential descriptor with one attribute (varint layout).
    pub fn single_attribute(&mut self, att_type: u8, data_type: u8, components: u8, unique_id: u32, codec: u8) -> &mut Self {
        self.varint(1)
            .u8(att_type)
            .u8(data_type)
            .u8(components)
            .u8(0)
            .varint(u64::from(unique_id))
            .u8(codec)
    }

    /// Generic-codec payload of float values.
    pub fn float_payload(&mut self, num_values: u64, values: &[f32]) -> &mut Self {
        self.varint(num_values).f32s(values)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn finish(&self) -> Vec<u8> {
        self.data.clone()
    }
}

pub const POSITIONS: [f32; 6] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
pub const COLORS: [u8; 6] = [255, 0, 0, 0, 255, 0];

/// Point cloud 2.2 with metadata naming attribute 0 `position` and
/// attribute 1 `color`, one decoder per attribute, no payloads.
pub fn named_point_cloud_base() -> StreamWriter {
    let mut w = StreamWriter::header(2, 2, POINT_CLOUD, METADATA_FLAG);
    w.attribute_names(&[(0, "position"), (1, "color")])
        .u8(2)
        .single_attribute(POSITION, FLOAT32, 3, 0, CODEC_GENERIC)
        .single_attribute(COLOR, UINT8, 3, 1, CODEC_GENERIC);
    w
}

/// Payload of the position decoder of [`named_point_cloud_base`].
pub fn position_payload() -> Vec<u8> {
    StreamWriter::new().float_payload(2, &POSITIONS).finish()
}

/// Payload of the color decoder of [`named_point_cloud_base`].
pub fn color_payload() -> Vec<u8> {
    StreamWriter::new().varint(2).bytes(&COLORS).finish()
}
