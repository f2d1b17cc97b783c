//! High-level decoding entry points.

use crate::core::{DecoderBuffer, DecoderOptions, ATTRIBUTE_NAME_KEY, SPLIT_ATTR_KEY};
use crate::geometry::{Mesh, PointCloud};
use crate::util::{Error, Result};

use super::decoder::{MeshDecoder, PointCloudDecoder};
use super::format::{EncodedGeometryType, BASE_ATTRIBUTE_NAME};
use super::header::{peek_header, StreamHeader};
use super::kind::{MeshKind, PointCloudKind};
use super::version::VersionPolicy;

/// Decoder facade picking the session type from the stream header.
///
/// A split decode keeps its session here between calls: start it with
/// [`Decoder::decode_mesh_from_buffer_attr`] and feed further attribute
/// buffers through [`Decoder::decode_buffer_attr_to_geometry`].
#[derive(Debug, Default)]
pub struct Decoder {
    options: DecoderOptions,
    policy: VersionPolicy,
    split_session: Option<MeshDecoder>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: VersionPolicy) -> Self {
        Self { policy, ..Self::default() }
    }

    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut DecoderOptions {
        &mut self.options
    }

    /// Parse the stream header without consuming it.
    pub fn header(buffer: &DecoderBuffer<'_>) -> Result<StreamHeader> {
        peek_header(buffer)
    }

    /// Geometry type announced by the stream header.
    pub fn encoded_geometry_type(buffer: &DecoderBuffer<'_>) -> Result<EncodedGeometryType> {
        Ok(peek_header(buffer)?.encoder_type)
    }

    /// Decode a point cloud. Meshes are decoded and returned without faces.
    pub fn decode_point_cloud_from_buffer(&self, buffer: &mut DecoderBuffer<'_>) -> Result<PointCloud> {
        match Self::encoded_geometry_type(buffer)? {
            EncodedGeometryType::PointCloud => {
                let mut pc = PointCloud::new();
                PointCloudDecoder::with_policy(PointCloudKind, self.policy).decode(&self.options, buffer, &mut pc)?;
                Ok(pc)
            }
            EncodedGeometryType::TriangularMesh => Ok(self.decode_mesh_from_buffer(buffer)?.into_point_cloud()),
            other => Err(Error::invalid(format!("Unsupported geometry type {other}"))),
        }
    }

    /// Decode a triangular mesh.
    pub fn decode_mesh_from_buffer(&self, buffer: &mut DecoderBuffer<'_>) -> Result<Mesh> {
        let mut mesh = Mesh::new();
        MeshDecoder::with_policy(MeshKind, self.policy).decode(&self.options, buffer, &mut mesh)?;
        Ok(mesh)
    }

    /// Start a split decode with the `"base"` call and return the mesh
    /// holding the structural data and empty attributes.
    pub fn decode_mesh_from_buffer_attr(&mut self, buffer: &mut DecoderBuffer<'_>, attribute_name: &str) -> Result<Mesh> {
        if attribute_name != BASE_ATTRIBUTE_NAME {
            return Err(Error::misuse(format!(
                "split decode must start with '{BASE_ATTRIBUTE_NAME}', got '{attribute_name}'"
            )));
        }
        let mut options = self.options.clone();
        options.set_global_string(ATTRIBUTE_NAME_KEY, BASE_ATTRIBUTE_NAME);

        let mut session = MeshDecoder::with_policy(MeshKind, self.policy);
        let mut mesh = Mesh::new();
        self.split_session = None;
        session.decode_split(&options, buffer, &mut mesh)?;
        self.split_session = Some(session);
        Ok(mesh)
    }

    /// Decode the attribute named `attribute_name` from `buffer` into a mesh
    /// returned by [`Decoder::decode_mesh_from_buffer_attr`].
    pub fn decode_buffer_attr_to_geometry(
        &mut self,
        buffer: &mut DecoderBuffer<'_>,
        attribute_name: &str,
        mesh: &mut Mesh,
    ) -> Result<()> {
        let session = self
            .split_session
            .as_mut()
            .ok_or_else(|| Error::misuse("no split decode in progress"))?;
        let mut options = self.options.clone();
        options.set_global_string(ATTRIBUTE_NAME_KEY, attribute_name);
        options.set_global_bool(SPLIT_ATTR_KEY, true);
        session.decode_split(&options, buffer, mesh)
    }

    /// Session of the split decode in progress.
    pub fn split_session(&self) -> Option<&MeshDecoder> {
        self.split_session.as_ref()
    }
}
