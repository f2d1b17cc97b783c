//! Attribute decoders.
//!
//! A stream carries one or more attributes decoders, each owning a subset of
//! the geometry's attributes. A decoder first reads its descriptor (which
//! creates its attributes in the geometry) and later the value payloads.

mod sequential;
mod values;

pub use sequential::SequentialAttributesDecoder;
pub use values::{SequentialAttributeDecoder, SequentialDecoderType};

use crate::compression::format::EncodedGeometryType;
use crate::core::{DecoderBuffer, DecoderOptions};
use crate::geometry::{PointAttribute, PointCloud};
use crate::util::Result;

/// Decoder for a group of attributes.
pub trait AttributesDecoder: std::fmt::Debug {
    /// Bind the decoder to the geometry being decoded. Reads no bytes.
    fn init(&mut self, geometry_type: EncodedGeometryType, point_cloud: &PointCloud) -> Result<()>;

    /// Read the descriptor and create the owned attributes in `point_cloud`.
    fn decode_attributes_decoder_data(
        &mut self,
        buffer: &mut DecoderBuffer<'_>,
        point_cloud: &mut PointCloud,
    ) -> Result<()>;

    /// Ids of the owned attributes, in descriptor order.
    fn attribute_ids(&self) -> &[usize];

    fn num_attributes(&self) -> usize {
        self.attribute_ids().len()
    }

    fn attribute_id(&self, index: usize) -> Option<usize> {
        self.attribute_ids().get(index).copied()
    }

    /// Decode the value payloads of all owned attributes.
    fn decode_attributes(
        &mut self,
        buffer: &mut DecoderBuffer<'_>,
        point_cloud: &mut PointCloud,
        options: &DecoderOptions,
    ) -> Result<()>;

    /// Portable form of an owned attribute.
    fn portable_attribute(&self, att_id: usize) -> Option<&PointAttribute>;
}
