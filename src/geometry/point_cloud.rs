//! Point cloud - a set of points with per-point attributes.

use crate::core::{AttributeMetadata, GeometryMetadata};
use crate::util::{Error, Result};

use super::{GeometryAttributeType, PointAttribute};

/// Decoded point cloud.
///
/// Attribute ids are indices into the attribute list, assigned in the order
/// attributes are added.
#[derive(Clone, Debug, Default)]
pub struct PointCloud {
    num_points: u32,
    attributes: Vec<PointAttribute>,
    metadata: Option<GeometryMetadata>,
}

impl PointCloud {
    /// Create an empty point cloud.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn num_points(&self) -> u32 {
        self.num_points
    }

    #[inline]
    pub fn set_num_points(&mut self, num_points: u32) {
        self.num_points = num_points;
    }

    #[inline]
    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    /// Add an attribute and return its id.
    pub fn add_attribute(&mut self, attribute: PointAttribute) -> usize {
        self.attributes.push(attribute);
        self.attributes.len() - 1
    }

    pub fn attribute(&self, att_id: usize) -> Option<&PointAttribute> {
        self.attributes.get(att_id)
    }

    pub fn attribute_mut(&mut self, att_id: usize) -> Option<&mut PointAttribute> {
        self.attributes.get_mut(att_id)
    }

    pub fn attributes(&self) -> &[PointAttribute] {
        &self.attributes
    }

    /// Id of the first attribute of the given type.
    pub fn named_attribute_id(&self, att_type: GeometryAttributeType) -> Option<usize> {
        self.attributes.iter().position(|a| a.attribute_type() == att_type)
    }

    /// First attribute of the given type.
    pub fn named_attribute(&self, att_type: GeometryAttributeType) -> Option<&PointAttribute> {
        self.named_attribute_id(att_type).and_then(|id| self.attribute(id))
    }

    pub fn metadata(&self) -> Option<&GeometryMetadata> {
        self.metadata.as_ref()
    }

    pub fn metadata_mut(&mut self) -> Option<&mut GeometryMetadata> {
        self.metadata.as_mut()
    }

    /// Attach geometry metadata, replacing any previous block.
    pub fn add_metadata(&mut self, metadata: GeometryMetadata) {
        self.metadata = Some(metadata);
    }

    /// Metadata block of the attribute with id `att_id`.
    pub fn attribute_metadata_by_attribute_id(&self, att_id: usize) -> Option<&AttributeMetadata> {
        let unique_id = self.attribute(att_id)?.unique_id();
        self.metadata.as_ref()?.attribute_metadata(unique_id)
    }

    pub fn attribute_metadata_mut_by_attribute_id(&mut self, att_id: usize) -> Option<&mut AttributeMetadata> {
        let unique_id = self.attributes.get(att_id)?.unique_id();
        self.metadata.as_mut()?.attribute_metadata_mut(unique_id)
    }

    /// String entry `key` of an attribute's metadata.
    pub fn get_metadata_entry_string_by_attribute_id(&self, att_id: usize, key: &str) -> Option<&str> {
        self.attribute_metadata_by_attribute_id(att_id)?.get_entry_string(key)
    }

    /// Integer entry `key` of an attribute's metadata.
    pub fn get_metadata_entry_int_by_attribute_id(&self, att_id: usize, key: &str) -> Option<i32> {
        self.attribute_metadata_by_attribute_id(att_id)?.get_entry_int(key)
    }

    /// Bounding box of the position attribute.
    pub fn compute_bounds(&self) -> Option<(glam::Vec3, glam::Vec3)> {
        let pos = self.named_attribute(GeometryAttributeType::Position)?;
        let mut points = (0..pos.num_values()).filter_map(|i| pos.get_vec3(i));
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }

    /// Settle the point count after attribute payloads were decoded.
    ///
    /// If no count was set by the structural data, it is taken from the
    /// decoded attributes. Every attribute holding values must then hold
    /// exactly one value per point.
    pub fn finalize_point_count(&mut self) -> Result<()> {
        if self.num_points == 0 {
            let max_values = self.attributes.iter().map(PointAttribute::num_values).max().unwrap_or(0);
            self.num_points = u32::try_from(max_values)
                .map_err(|_| Error::invalid("point count exceeds 32 bits"))?;
        }
        for (att_id, att) in self.attributes.iter().enumerate() {
            if !att.is_empty() && att.num_values() != self.num_points as usize {
                return Err(Error::failed(format!(
                    "attribute {att_id} holds {} values for {} points",
                    att.num_values(),
                    self.num_points
                )));
            }
        }
        Ok(())
    }
}

impl AsRef<PointCloud> for PointCloud {
    fn as_ref(&self) -> &PointCloud {
        self
    }
}

impl AsMut<PointCloud> for PointCloud {
    fn as_mut(&mut self) -> &mut PointCloud {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Metadata;
    use crate::util::DataType;

    fn float3(att_type: GeometryAttributeType, values: &[f32]) -> PointAttribute {
        let mut att = PointAttribute::new(att_type, DataType::Float32, 3, false);
        att.set_data(bytemuck::cast_slice(values).to_vec()).unwrap();
        att
    }

    #[test]
    fn test_attribute_ids_are_sequential() {
        let mut pc = PointCloud::new();
        assert_eq!(pc.add_attribute(float3(GeometryAttributeType::Position, &[])), 0);
        assert_eq!(pc.add_attribute(float3(GeometryAttributeType::Normal, &[])), 1);
        assert_eq!(pc.named_attribute_id(GeometryAttributeType::Normal), Some(1));
        assert!(pc.named_attribute(GeometryAttributeType::Color).is_none());
    }

    #[test]
    fn test_metadata_by_attribute_id() {
        let mut pc = PointCloud::new();
        let mut att = float3(GeometryAttributeType::Generic, &[]);
        att.set_unique_id(5);
        let id = pc.add_attribute(att);
        assert!(pc.get_metadata_entry_string_by_attribute_id(id, Metadata::NAME_KEY).is_none());

        let mut geo = GeometryMetadata::new();
        let mut att_md = AttributeMetadata::new(5);
        att_md.add_entry_string(Metadata::NAME_KEY, "intensity");
        geo.add_attribute_metadata(att_md);
        pc.add_metadata(geo);

        assert_eq!(pc.get_metadata_entry_string_by_attribute_id(id, Metadata::NAME_KEY), Some("intensity"));
        pc.attribute_metadata_mut_by_attribute_id(id).unwrap().add_entry_int(Metadata::OUTPUT_KEY, 1);
        assert_eq!(pc.get_metadata_entry_int_by_attribute_id(id, Metadata::OUTPUT_KEY), Some(1));
    }

    #[test]
    fn test_bounds() {
        let mut pc = PointCloud::new();
        pc.add_attribute(float3(GeometryAttributeType::Position, &[0.0, 5.0, -1.0, 2.0, -3.0, 4.0]));
        let (min, max) = pc.compute_bounds().unwrap();
        assert_eq!(min, glam::Vec3::new(0.0, -3.0, -1.0));
        assert_eq!(max, glam::Vec3::new(2.0, 5.0, 4.0));
    }

    #[test]
    fn test_finalize_point_count() {
        let mut pc = PointCloud::new();
        pc.add_attribute(float3(GeometryAttributeType::Position, &[0.0; 6]));
        pc.add_attribute(float3(GeometryAttributeType::Normal, &[]));
        pc.finalize_point_count().unwrap();
        assert_eq!(pc.num_points(), 2);

        pc.add_attribute(float3(GeometryAttributeType::Color, &[0.0; 9]));
        assert!(pc.finalize_point_count().is_err());
    }
}
