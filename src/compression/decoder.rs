//! Decode session driving the stages of a geometry decode.
//!
//! A session runs the header, version gate, metadata, structural data,
//! attributes decoder registration and attribute payloads in that order.
//! In split mode the same stages are spread over several calls: the first
//! call (attribute name `"base"`) runs everything up to the registration,
//! later calls decode attribute payloads from their own buffers.
//!
//! # Example
//!
//! ```ignore
//! use draco::compression::PointCloudDecoder;
//! use draco::core::{DecoderBuffer, DecoderOptions};
//! use draco::geometry::PointCloud;
//!
//! let mut session = PointCloudDecoder::default();
//! let mut pc = PointCloud::new();
//! session.decode(&DecoderOptions::new(), &mut DecoderBuffer::new(&bytes), &mut pc)?;
//! ```

use crate::core::*;
use crate::geometry::PointAttribute;
use crate::util::{Error, Result};

use super::attributes::AttributesDecoder;
use super::format::*;
use super::header::{decode_header, StreamHeader};
use super::kind::{GeometryKind, MeshKind, PointCloudKind};
use super::metadata_decoder::decode_geometry_metadata;
use super::version::VersionPolicy;

/// Session decoding point clouds.
pub type PointCloudDecoder = DecodeSession<PointCloudKind>;

/// Session decoding triangular meshes.
pub type MeshDecoder = DecodeSession<MeshKind>;

/// Position of a session in its call sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing decoded yet.
    Fresh,
    /// Split mode: structural data and decoders are in place.
    BaseDecoded,
    /// A full decode finished.
    Complete,
    /// A call failed; the session must be discarded.
    Poisoned,
}

/// Maps every attribute id to the index of the decoder owning it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeIndexMap {
    owners: Vec<Option<usize>>,
}

impl AttributeIndexMap {
    /// Build the map from the decoders in registration order.
    pub fn build(decoders: &[Box<dyn AttributesDecoder>]) -> Self {
        let mut owners = Vec::new();
        for (index, decoder) in decoders.iter().enumerate() {
            for &att_id in decoder.attribute_ids() {
                if att_id >= owners.len() {
                    owners.resize(att_id + 1, None);
                }
                owners[att_id] = Some(index);
            }
        }
        Self { owners }
    }

    /// Index of the decoder owning `att_id`.
    #[inline]
    pub fn decoder_index(&self, att_id: usize) -> Option<usize> {
        self.owners.get(att_id).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Check that ids `0..num_attributes` all have an owner.
    pub fn covers(&self, num_attributes: usize) -> bool {
        (0..num_attributes).all(|id| self.decoder_index(id).is_some())
    }
}

/// One decode of one geometry.
#[derive(Debug)]
pub struct DecodeSession<K: GeometryKind> {
    kind: K,
    policy: VersionPolicy,
    header: Option<StreamHeader>,
    version_major: u8,
    version_minor: u8,
    attributes_decoders: Vec<Box<dyn AttributesDecoder>>,
    index_map: AttributeIndexMap,
    num_registered_attributes: usize,
    phase: SessionPhase,
}

impl<K: GeometryKind + Default> Default for DecodeSession<K> {
    fn default() -> Self {
        Self::new(K::default())
    }
}

impl<K: GeometryKind> DecodeSession<K> {
    /// New session using the build's default version policy.
    pub fn new(kind: K) -> Self {
        Self::with_policy(kind, VersionPolicy::default())
    }

    pub fn with_policy(kind: K, policy: VersionPolicy) -> Self {
        Self {
            kind,
            policy,
            header: None,
            version_major: 0,
            version_minor: 0,
            attributes_decoders: Vec::new(),
            index_map: AttributeIndexMap::default(),
            num_registered_attributes: 0,
            phase: SessionPhase::Fresh,
        }
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn policy(&self) -> VersionPolicy {
        self.policy
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Header of the decoded stream, once read.
    pub fn header(&self) -> Option<&StreamHeader> {
        self.header.as_ref()
    }

    /// Negotiated (major, minor) version.
    pub fn version(&self) -> (u8, u8) {
        (self.version_major, self.version_minor)
    }

    pub fn bitstream_version(&self) -> u16 {
        bitstream_version(self.version_major, self.version_minor)
    }

    pub fn num_attributes_decoders(&self) -> usize {
        self.attributes_decoders.len()
    }

    pub fn attributes_decoder(&self, index: usize) -> Option<&dyn AttributesDecoder> {
        self.attributes_decoders.get(index).map(|d| d.as_ref())
    }

    pub fn index_map(&self) -> &AttributeIndexMap {
        &self.index_map
    }

    /// Decode a whole stream into `geometry`.
    #[tracing::instrument(skip_all, fields(geometry = %self.kind.geometry_type()))]
    pub fn decode(
        &mut self,
        options: &DecoderOptions,
        buffer: &mut DecoderBuffer<'_>,
        geometry: &mut K::Geometry,
    ) -> Result<()> {
        let result = self.expect_phase(SessionPhase::Fresh, "decode").and_then(|()| {
            self.decode_structure(buffer, geometry)?;
            self.decode_payloads(options, buffer, geometry)
        });
        self.settle(result, SessionPhase::Complete)
    }

    /// One call of a split decode.
    ///
    /// The attribute name is taken from the `attribute_name` option. The
    /// name `"base"` decodes the header, metadata, structural data and
    /// decoder descriptors; any other name decodes attribute payloads from
    /// `buffer`, restricted to the attribute whose metadata name matches
    /// when `split_attr` is set.
    #[tracing::instrument(skip_all, fields(
        geometry = %self.kind.geometry_type(),
        attribute = options.get_global_string(ATTRIBUTE_NAME_KEY, ""),
    ))]
    pub fn decode_split(
        &mut self,
        options: &DecoderOptions,
        buffer: &mut DecoderBuffer<'_>,
        geometry: &mut K::Geometry,
    ) -> Result<()> {
        let attribute_name = options.get_global_string(ATTRIBUTE_NAME_KEY, "");
        if attribute_name == BASE_ATTRIBUTE_NAME {
            let result = self
                .expect_phase(SessionPhase::Fresh, "base decode")
                .and_then(|()| self.decode_structure(buffer, geometry));
            return self.settle(result, SessionPhase::BaseDecoded);
        }

        let result = self.expect_phase(SessionPhase::BaseDecoded, "attribute decode").and_then(|()| {
            buffer.set_bitstream_version(self.bitstream_version());
            self.decode_payloads(options, buffer, geometry)
        });
        self.settle(result, SessionPhase::BaseDecoded)
    }

    /// Portable form of attribute `att_id`.
    ///
    /// Returns `None` for negative ids and ids past the attributes
    /// registered by this session.
    pub fn portable_attribute(&self, att_id: i32) -> Option<&PointAttribute> {
        let att_id = usize::try_from(att_id).ok()?;
        if att_id >= self.num_registered_attributes {
            return None;
        }
        let index = self.index_map.decoder_index(att_id)?;
        self.attributes_decoders.get(index)?.portable_attribute(att_id)
    }

    fn expect_phase(&self, expected: SessionPhase, call: &str) -> Result<()> {
        if self.phase == expected {
            return Ok(());
        }
        Err(Error::misuse(format!("{call} called in phase {:?}, expected {expected:?}", self.phase)))
    }

    fn settle(&mut self, result: Result<()>, next: SessionPhase) -> Result<()> {
        match &result {
            Ok(()) => self.phase = next,
            Err(err) => {
                tracing::debug!(error = %err, phase = ?self.phase, "decode failed");
                self.phase = SessionPhase::Poisoned;
            }
        }
        result
    }

    /// Header, version gate, metadata, structural data and decoder registration.
    fn decode_structure(&mut self, buffer: &mut DecoderBuffer<'_>, geometry: &mut K::Geometry) -> Result<()> {
        let header = decode_header(buffer)?;
        let expected = self.kind.geometry_type();
        if header.encoder_type != expected {
            return Err(Error::GeometryTypeMismatch {
                expected: expected.to_string(),
                actual: header.encoder_type.to_string(),
            });
        }
        self.policy.check_header(&header)?;
        self.header = Some(header);
        self.version_major = header.version_major;
        self.version_minor = header.version_minor;
        buffer.set_bitstream_version(self.bitstream_version());
        tracing::debug!(
            version = %format_args!("{}.{}", header.version_major, header.version_minor),
            method = header.encoder_method,
            flags = header.flags,
            "decoded header"
        );

        if self.bitstream_version() >= METADATA_MIN_VERSION && header.has_metadata() {
            let metadata = decode_geometry_metadata(buffer)
                .map_err(|e| Error::failed(format!("Failed to decode metadata: {e}")))?;
            tracing::debug!(
                attributes = metadata.attribute_metadatas().len(),
                "decoded geometry metadata"
            );
            geometry.as_mut().add_metadata(metadata);
        }

        self.kind
            .decode_connectivity(buffer, geometry)
            .map_err(|e| Error::failed(format!("Failed to decode geometry data: {e}")))?;
        self.register_attributes_decoders(buffer, geometry)
    }

    fn register_attributes_decoders(
        &mut self,
        buffer: &mut DecoderBuffer<'_>,
        geometry: &mut K::Geometry,
    ) -> Result<()> {
        let num_decoders = buffer.decode_u8()? as usize;
        let geometry_type = self.kind.geometry_type();

        self.attributes_decoders.reserve(num_decoders);
        for index in 0..num_decoders {
            let decoder = self
                .kind
                .create_attributes_decoder(index, buffer, geometry)
                .map_err(|e| Error::failed(format!("Failed to create attributes decoder: {e}")))?;
            self.attributes_decoders.push(decoder);
        }
        for decoder in &mut self.attributes_decoders {
            decoder
                .init(geometry_type, geometry.as_ref())
                .map_err(|e| Error::failed(format!("Failed to initialize all attributes decoders: {e}")))?;
        }
        for decoder in &mut self.attributes_decoders {
            decoder
                .decode_attributes_decoder_data(buffer, geometry.as_mut())
                .map_err(|e| Error::failed(format!("Failed to decode attributes decoder data: {e}")))?;
        }

        self.num_registered_attributes = geometry.as_ref().num_attributes();
        self.index_map = AttributeIndexMap::build(&self.attributes_decoders);
        if !self.index_map.covers(self.num_registered_attributes) {
            return Err(Error::failed("attribute without an owning attributes decoder"));
        }
        tracing::debug!(
            decoders = num_decoders,
            attributes = self.num_registered_attributes,
            "registered attributes decoders"
        );
        Ok(())
    }

    /// Attribute payloads followed by the post-decode hook.
    fn decode_payloads(
        &mut self,
        options: &DecoderOptions,
        buffer: &mut DecoderBuffer<'_>,
        geometry: &mut K::Geometry,
    ) -> Result<()> {
        if options.get_global_bool(SPLIT_ATTR_KEY, false) {
            self.decode_named_payload(options, buffer, geometry)?;
        } else {
            for decoder in &mut self.attributes_decoders {
                decoder
                    .decode_attributes(buffer, geometry.as_mut(), options)
                    .map_err(|e| Error::failed(format!("Failed to decode attributes: {e}")))?;
            }
        }
        self.kind
            .on_attributes_decoded(geometry)
            .map_err(|e| Error::failed(format!("Failed OnAttributesDecoded: {e}")))
    }

    /// Decode only the decoder whose first attribute is named by the
    /// `attribute_name` option, then mark that attribute for output.
    fn decode_named_payload(
        &mut self,
        options: &DecoderOptions,
        buffer: &mut DecoderBuffer<'_>,
        geometry: &mut K::Geometry,
    ) -> Result<()> {
        let wanted = options.get_global_string(ATTRIBUTE_NAME_KEY, "");
        for decoder in &mut self.attributes_decoders {
            let Some(att_id) = decoder.attribute_id(0) else {
                continue;
            };
            let name = geometry
                .as_ref()
                .get_metadata_entry_string_by_attribute_id(att_id, Metadata::NAME_KEY);
            if name != Some(wanted) {
                continue;
            }
            decoder
                .decode_attributes(buffer, geometry.as_mut(), options)
                .map_err(|e| Error::failed(format!("Failed to decode attribute '{wanted}': {e}")))?;
            if let Some(att_metadata) = geometry.as_mut().attribute_metadata_mut_by_attribute_id(att_id) {
                att_metadata.add_entry_int(Metadata::OUTPUT_KEY, 1);
            }
            tracing::debug!(att_id, name = wanted, "decoded split attribute");
            return Ok(());
        }
        tracing::debug!(name = wanted, "no attribute matches the requested name");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::attributes::SequentialAttributesDecoder;
    use crate::geometry::PointCloud;

    fn point_cloud_stream(major: u8, minor: u8, tail: &[u8]) -> Vec<u8> {
        let mut data = DRACO_MAGIC.to_vec();
        data.extend_from_slice(&[major, minor, 0, 0, 0]);
        data.extend_from_slice(tail);
        data
    }

    #[test]
    fn test_empty_point_cloud() {
        let data = point_cloud_stream(1, 0, &[0]);
        let mut session = PointCloudDecoder::with_policy(PointCloudKind, VersionPolicy::BackwardCompatible);
        let mut pc = PointCloud::new();
        session
            .decode(&DecoderOptions::new(), &mut DecoderBuffer::new(&data), &mut pc)
            .unwrap();
        assert_eq!(session.phase(), SessionPhase::Complete);
        assert_eq!(session.num_attributes_decoders(), 0);
        assert_eq!(pc.num_attributes(), 0);
        assert!(session.portable_attribute(0).is_none());
        assert!(session.portable_attribute(-1).is_none());
    }

    #[test]
    fn test_geometry_type_mismatch() {
        let mut data = point_cloud_stream(2, 2, &[0]);
        data[7] = 1;
        let mut session = PointCloudDecoder::default();
        let mut pc = PointCloud::new();
        let err = session
            .decode(&DecoderOptions::new(), &mut DecoderBuffer::new(&data), &mut pc)
            .unwrap_err();
        assert!(matches!(err, Error::GeometryTypeMismatch { .. }));
        assert_eq!(session.phase(), SessionPhase::Poisoned);
    }

    #[test]
    fn test_decode_twice_is_misuse() {
        let data = point_cloud_stream(2, 3, &[0]);
        let mut session = PointCloudDecoder::default();
        let mut pc = PointCloud::new();
        session
            .decode(&DecoderOptions::new(), &mut DecoderBuffer::new(&data), &mut pc)
            .unwrap();
        let err = session
            .decode(&DecoderOptions::new(), &mut DecoderBuffer::new(&data), &mut pc)
            .unwrap_err();
        assert!(matches!(err, Error::SessionMisuse(_)));
    }

    #[test]
    fn test_index_map() {
        let mut pc = PointCloud::new();
        let mut decoders: Vec<Box<dyn AttributesDecoder>> = Vec::new();
        for desc in [[1u8, 0, 9, 3, 0, 0, 0], [1, 4, 2, 1, 0, 1, 0]] {
            let mut dec = SequentialAttributesDecoder::new();
            dec.init(EncodedGeometryType::PointCloud, &pc).unwrap();
            let mut buf = DecoderBuffer::new(&desc);
            buf.set_bitstream_version(bitstream_version(2, 2));
            dec.decode_attributes_decoder_data(&mut buf, &mut pc).unwrap();
            decoders.push(Box::new(dec));
        }
        let map = AttributeIndexMap::build(&decoders);
        assert_eq!(map.len(), 2);
        assert_eq!(map.decoder_index(0), Some(0));
        assert_eq!(map.decoder_index(1), Some(1));
        assert_eq!(map.decoder_index(2), None);
        assert!(map.covers(2));
        assert!(!map.covers(3));
    }

    #[test]
    fn test_metadata_flag_below_min_version_is_ignored() {
        // flags set but 1.2 predates metadata: the next byte is the decoder count
        let mut data = point_cloud_stream(1, 2, &[0]);
        data[9] = METADATA_FLAG_MASK;
        let mut session = PointCloudDecoder::with_policy(PointCloudKind, VersionPolicy::BackwardCompatible);
        let mut pc = PointCloud::new();
        session
            .decode(&DecoderOptions::new(), &mut DecoderBuffer::new(&data), &mut pc)
            .unwrap();
        assert!(pc.metadata().is_none());
    }
}
