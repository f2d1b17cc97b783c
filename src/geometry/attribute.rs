//! Point attributes - typed per-point value arrays.

use bytemuck::Pod;
use std::fmt;

use crate::util::{DataType, Error, Result};

/// Semantic type of an attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum GeometryAttributeType {
    Position = 0,
    Normal = 1,
    Color = 2,
    TexCoord = 3,
    /// Any other per-point data, usually identified by its metadata name.
    Generic = 4,
}

impl GeometryAttributeType {
    /// Number of named attribute types.
    pub const COUNT: u8 = 5;

    /// Convert from the on-wire u8 value.
    pub const fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Position),
            1 => Some(Self::Normal),
            2 => Some(Self::Color),
            3 => Some(Self::TexCoord),
            4 => Some(Self::Generic),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "POSITION",
            Self::Normal => "NORMAL",
            Self::Color => "COLOR",
            Self::TexCoord => "TEX_COORD",
            Self::Generic => "GENERIC",
        }
    }
}

impl fmt::Display for GeometryAttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A per-point attribute: layout description plus a flat little-endian
/// value buffer of `num_values * byte_stride` bytes.
#[derive(Clone, PartialEq)]
pub struct PointAttribute {
    attribute_type: GeometryAttributeType,
    data_type: DataType,
    num_components: u8,
    normalized: bool,
    unique_id: u32,
    buffer: Vec<u8>,
}

impl PointAttribute {
    /// Create an attribute without values.
    pub fn new(
        attribute_type: GeometryAttributeType,
        data_type: DataType,
        num_components: u8,
        normalized: bool,
    ) -> Self {
        Self {
            attribute_type,
            data_type,
            num_components,
            normalized,
            unique_id: 0,
            buffer: Vec::new(),
        }
    }

    /// Create an attribute with the same layout and id but no values.
    pub fn empty_like(other: &PointAttribute) -> Self {
        Self { buffer: Vec::new(), ..other.clone() }
    }

    #[inline]
    pub fn attribute_type(&self) -> GeometryAttributeType {
        self.attribute_type
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    #[inline]
    pub fn num_components(&self) -> u8 {
        self.num_components
    }

    #[inline]
    pub fn normalized(&self) -> bool {
        self.normalized
    }

    /// Id linking the attribute to its metadata block.
    #[inline]
    pub fn unique_id(&self) -> u32 {
        self.unique_id
    }

    #[inline]
    pub fn set_unique_id(&mut self, id: u32) {
        self.unique_id = id;
    }

    /// Size of one value (all components) in bytes.
    #[inline]
    pub fn byte_stride(&self) -> usize {
        self.data_type.num_bytes() * self.num_components as usize
    }

    /// Number of stored values.
    pub fn num_values(&self) -> usize {
        match self.byte_stride() {
            0 => 0,
            stride => self.buffer.len() / stride,
        }
    }

    /// Check if no values are stored.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Raw value bytes.
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Replace all values. The length must be a multiple of the stride.
    pub fn set_data(&mut self, data: Vec<u8>) -> Result<()> {
        let stride = self.byte_stride();
        if stride == 0 || data.len() % stride != 0 {
            return Err(Error::invalid(format!(
                "{} bytes do not form whole {}x{} values",
                data.len(),
                self.num_components,
                self.data_type
            )));
        }
        self.buffer = data;
        Ok(())
    }

    /// Change the value layout; existing values are dropped.
    pub fn reset_layout(&mut self, data_type: DataType, num_components: u8) {
        self.data_type = data_type;
        self.num_components = num_components;
        self.buffer.clear();
    }

    /// Bytes of the value at `index`.
    pub fn value_bytes(&self, index: usize) -> Option<&[u8]> {
        let stride = self.byte_stride();
        let start = index.checked_mul(stride)?;
        self.buffer.get(start..start + stride)
    }

    /// All components as `T`, if `T` has the size of the stored data type.
    pub fn values<T: Pod>(&self) -> Option<Vec<T>> {
        if std::mem::size_of::<T>() != self.data_type.num_bytes() {
            return None;
        }
        Some(bytemuck::pod_collect_to_vec(&self.buffer))
    }

    /// Value at `index` as a Vec3 (float32 attributes with at least 3 components).
    pub fn get_vec3(&self, index: usize) -> Option<glam::Vec3> {
        if self.data_type != DataType::Float32 || self.num_components < 3 {
            return None;
        }
        let bytes = self.value_bytes(index)?;
        let xyz: [f32; 3] = bytemuck::pod_read_unaligned(&bytes[..12]);
        Some(glam::Vec3::from_array(xyz))
    }
}

impl fmt::Debug for PointAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointAttribute")
            .field("type", &self.attribute_type)
            .field("data_type", &self.data_type)
            .field("num_components", &self.num_components)
            .field("unique_id", &self.unique_id)
            .field("num_values", &self.num_values())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let att = PointAttribute::new(GeometryAttributeType::Color, DataType::Uint8, 4, true);
        assert_eq!(att.byte_stride(), 4);
        assert_eq!(att.num_values(), 0);
        assert!(att.is_empty());
    }

    #[test]
    fn test_set_data_checks_stride() {
        let mut att = PointAttribute::new(GeometryAttributeType::Position, DataType::Float32, 3, false);
        assert!(att.set_data(vec![0u8; 13]).is_err());
        att.set_data(bytemuck::cast_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).to_vec()).unwrap();
        assert_eq!(att.num_values(), 2);
        assert_eq!(att.get_vec3(1), Some(glam::Vec3::new(4.0, 5.0, 6.0)));
        assert_eq!(att.get_vec3(2), None);
        assert_eq!(att.values::<f32>().unwrap().len(), 6);
        assert!(att.values::<u8>().is_none());
    }

    #[test]
    fn test_empty_like_keeps_layout() {
        let mut att = PointAttribute::new(GeometryAttributeType::Generic, DataType::Int16, 2, false);
        att.set_unique_id(9);
        att.set_data(vec![0u8; 8]).unwrap();
        let empty = PointAttribute::empty_like(&att);
        assert_eq!(empty.unique_id(), 9);
        assert_eq!(empty.byte_stride(), 4);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_attribute_type_from_u8() {
        assert_eq!(GeometryAttributeType::from_u8(2), Some(GeometryAttributeType::Color));
        assert_eq!(GeometryAttributeType::from_u8(GeometryAttributeType::COUNT), None);
    }
}
