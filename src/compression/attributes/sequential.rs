//! Sequential attributes decoder: values are stored one attribute after
//! another, each with its own value codec.

use crate::compression::format::*;
use crate::core::{DecoderBuffer, DecoderOptions, SKIP_ATTRIBUTE_TRANSFORM_KEY};
use crate::geometry::{GeometryAttributeType, PointAttribute, PointCloud};
use crate::util::{DataType, Error, Result};

use super::values::{SequentialAttributeDecoder, SequentialDecoderType};
use super::AttributesDecoder;

/// Smallest encoded size of one attribute description.
const MIN_DESCRIPTION_SIZE: usize = 5;

#[derive(Debug, Default)]
pub struct SequentialAttributesDecoder {
    geometry_type: Option<EncodedGeometryType>,
    attribute_ids: Vec<usize>,
    value_decoders: Vec<SequentialAttributeDecoder>,
}

impl SequentialAttributesDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn decode_description(buffer: &mut DecoderBuffer<'_>) -> Result<PointAttribute> {
        let att_type = buffer.decode_u8()?;
        let attribute_type = GeometryAttributeType::from_u8(att_type)
            .ok_or_else(|| Error::invalid(format!("unknown attribute type {att_type}")))?;
        let dt = buffer.decode_u8()?;
        let data_type = DataType::from_u8(dt);
        if !data_type.is_valid() {
            return Err(Error::invalid(format!("unknown data type {dt}")));
        }
        let num_components = buffer.decode_u8()?;
        if num_components == 0 {
            return Err(Error::invalid("attribute without components"));
        }
        let normalized = buffer.decode_u8()? > 0;
        let unique_id = if buffer.bitstream_version() < VARINT_UNIQUE_ID_VERSION {
            u32::from(buffer.decode_u16()?)
        } else {
            buffer.decode_varint_u32()?
        };

        let mut attribute = PointAttribute::new(attribute_type, data_type, num_components, normalized);
        attribute.set_unique_id(unique_id);
        Ok(attribute)
    }
}

impl AttributesDecoder for SequentialAttributesDecoder {
    fn init(&mut self, geometry_type: EncodedGeometryType, point_cloud: &PointCloud) -> Result<()> {
        if self.geometry_type.is_some() {
            return Err(Error::misuse("attributes decoder initialized twice"));
        }
        tracing::trace!(%geometry_type, existing = point_cloud.num_attributes(), "init sequential attributes decoder");
        self.geometry_type = Some(geometry_type);
        Ok(())
    }

    fn decode_attributes_decoder_data(
        &mut self,
        buffer: &mut DecoderBuffer<'_>,
        point_cloud: &mut PointCloud,
    ) -> Result<()> {
        if self.geometry_type.is_none() {
            return Err(Error::misuse("attributes decoder used before init"));
        }
        let num_attributes = if buffer.bitstream_version() < VARINT_ATTRIBUTE_COUNT_VERSION {
            buffer.decode_u32()?
        } else {
            buffer.decode_varint_u32()?
        } as usize;
        if num_attributes == 0 {
            return Err(Error::invalid("attributes decoder without attributes"));
        }
        if num_attributes > buffer.remaining_size() / MIN_DESCRIPTION_SIZE {
            return Err(Error::invalid(format!(
                "{num_attributes} attributes do not fit in the remaining {} bytes",
                buffer.remaining_size()
            )));
        }

        self.attribute_ids.reserve(num_attributes);
        for _ in 0..num_attributes {
            let attribute = Self::decode_description(buffer)?;
            self.attribute_ids.push(point_cloud.add_attribute(attribute));
        }

        for &att_id in &self.attribute_ids {
            let tag = buffer.decode_u8()?;
            let decoder_type = SequentialDecoderType::from_u8(tag)
                .ok_or_else(|| Error::invalid(format!("unknown value codec {tag}")))?;
            let attribute = point_cloud
                .attribute(att_id)
                .ok_or_else(|| Error::failed(format!("attribute {att_id} missing from geometry")))?;
            self.value_decoders.push(SequentialAttributeDecoder::new(decoder_type, attribute)?);
        }
        tracing::debug!(attribute_ids = ?self.attribute_ids, "decoded attributes decoder data");
        Ok(())
    }

    fn attribute_ids(&self) -> &[usize] {
        &self.attribute_ids
    }

    fn decode_attributes(
        &mut self,
        buffer: &mut DecoderBuffer<'_>,
        point_cloud: &mut PointCloud,
        options: &DecoderOptions,
    ) -> Result<()> {
        for (&att_id, decoder) in self.attribute_ids.iter().zip(self.value_decoders.iter_mut()) {
            let attribute = point_cloud
                .attribute_mut(att_id)
                .ok_or_else(|| Error::failed(format!("attribute {att_id} missing from geometry")))?;
            let skip_transform =
                options.get_attribute_bool(attribute.attribute_type(), SKIP_ATTRIBUTE_TRANSFORM_KEY, false);
            decoder.decode_values(buffer, attribute, skip_transform)?;
        }
        Ok(())
    }

    fn portable_attribute(&self, att_id: usize) -> Option<&PointAttribute> {
        let index = self.attribute_ids.iter().position(|&id| id == att_id)?;
        self.value_decoders.get(index).map(SequentialAttributeDecoder::portable)
    }
}
