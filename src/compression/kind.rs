//! Geometry-kind hooks plugged into the generic decode session.
//!
//! A kind names the geometry it produces, reads the kind-specific structural
//! data that precedes the attribute section, creates the attributes decoders
//! and finishes the geometry once attribute values are in place.

use std::fmt;

use crate::core::DecoderBuffer;
use crate::geometry::{Face, Mesh, PointCloud};
use crate::util::{Error, Result};

use super::attributes::{AttributesDecoder, SequentialAttributesDecoder};
use super::format::*;

/// Kind-specific steps of a decode.
pub trait GeometryKind: fmt::Debug {
    /// Geometry filled by this kind.
    type Geometry: AsRef<PointCloud> + AsMut<PointCloud> + Default + fmt::Debug;

    /// Geometry type the stream header must announce.
    fn geometry_type(&self) -> EncodedGeometryType;

    /// Read the structural (connectivity) data after the metadata section.
    fn decode_connectivity(&mut self, buffer: &mut DecoderBuffer<'_>, geometry: &mut Self::Geometry) -> Result<()>;

    /// Create the attributes decoder with index `index`.
    fn create_attributes_decoder(
        &mut self,
        index: usize,
        buffer: &mut DecoderBuffer<'_>,
        geometry: &Self::Geometry,
    ) -> Result<Box<dyn AttributesDecoder>>;

    /// Called after attribute values were decoded.
    fn on_attributes_decoded(&mut self, geometry: &mut Self::Geometry) -> Result<()> {
        geometry.as_mut().finalize_point_count()
    }
}

/// Point clouds: no structural data, sequential attributes decoders only.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointCloudKind;

impl GeometryKind for PointCloudKind {
    type Geometry = PointCloud;

    fn geometry_type(&self) -> EncodedGeometryType {
        EncodedGeometryType::PointCloud
    }

    fn decode_connectivity(&mut self, _buffer: &mut DecoderBuffer<'_>, _geometry: &mut PointCloud) -> Result<()> {
        Ok(())
    }

    fn create_attributes_decoder(
        &mut self,
        _index: usize,
        _buffer: &mut DecoderBuffer<'_>,
        _geometry: &PointCloud,
    ) -> Result<Box<dyn AttributesDecoder>> {
        Ok(Box::new(SequentialAttributesDecoder::new()))
    }
}

/// Connectivity coding of a sequential mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ConnectivityMethod {
    /// Zig-zag varint deltas between consecutive indices.
    Compressed,
    /// Fixed-width indices, width chosen from the point count.
    Raw,
}

/// Attributes decoder tags of a sequential mesh.
const MESH_SEQUENTIAL_ATTRIBUTES_DECODER: u8 = 0;

/// Triangular meshes with sequentially coded connectivity.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeshKind;

impl GeometryKind for MeshKind {
    type Geometry = Mesh;

    fn geometry_type(&self) -> EncodedGeometryType {
        EncodedGeometryType::TriangularMesh
    }

    fn decode_connectivity(&mut self, buffer: &mut DecoderBuffer<'_>, mesh: &mut Mesh) -> Result<()> {
        let (num_faces, num_points) = if buffer.bitstream_version() < VARINT_MESH_COUNTS_VERSION {
            (buffer.decode_u32()?, buffer.decode_u32()?)
        } else {
            (buffer.decode_varint_u32()?, buffer.decode_varint_u32()?)
        };
        let num_indices = (num_faces as usize)
            .checked_mul(3)
            .filter(|&n| n <= buffer.remaining_size())
            .ok_or_else(|| Error::invalid(format!("{num_faces} faces do not fit in the remaining data")))?;

        let method = match buffer.decode_u8()? {
            0 => ConnectivityMethod::Compressed,
            1 => ConnectivityMethod::Raw,
            other => return Err(Error::invalid(format!("unknown connectivity method {other}"))),
        };
        let indices = match method {
            ConnectivityMethod::Compressed => decode_delta_indices(buffer, num_indices, num_points)?,
            ConnectivityMethod::Raw => decode_raw_indices(buffer, num_indices, num_points)?,
        };

        let faces: Vec<Face> = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        tracing::debug!(num_faces, num_points, ?method, "decoded mesh connectivity");
        mesh.set_num_points(num_points);
        mesh.set_faces(faces);
        Ok(())
    }

    fn create_attributes_decoder(
        &mut self,
        index: usize,
        buffer: &mut DecoderBuffer<'_>,
        _geometry: &Mesh,
    ) -> Result<Box<dyn AttributesDecoder>> {
        match buffer.decode_u8()? {
            MESH_SEQUENTIAL_ATTRIBUTES_DECODER => Ok(Box::new(SequentialAttributesDecoder::new())),
            other => Err(Error::invalid(format!(
                "Unknown attributes decoder type {other} for decoder {index}"
            ))),
        }
    }
}

fn check_index(index: u32, num_points: u32) -> Result<u32> {
    if index >= num_points {
        return Err(Error::invalid(format!("point index {index} out of range ({num_points} points)")));
    }
    Ok(index)
}

fn decode_delta_indices(buffer: &mut DecoderBuffer<'_>, count: usize, num_points: u32) -> Result<Vec<u32>> {
    let mut indices = Vec::with_capacity(count);
    let mut last = 0i64;
    for _ in 0..count {
        let index = last
            .checked_add(buffer.decode_signed_varint()?)
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| Error::invalid("point index delta out of range"))?;
        indices.push(check_index(index, num_points)?);
        last = i64::from(index);
    }
    Ok(indices)
}

fn decode_raw_indices(buffer: &mut DecoderBuffer<'_>, count: usize, num_points: u32) -> Result<Vec<u32>> {
    let varint_allowed = buffer.bitstream_version() >= VARINT_MESH_COUNTS_VERSION;
    let mut indices = Vec::with_capacity(count);
    for _ in 0..count {
        let index = if num_points < 1 << 8 {
            u32::from(buffer.decode_u8()?)
        } else if num_points < 1 << 16 {
            u32::from(buffer.decode_u16()?)
        } else if num_points < 1 << 21 && varint_allowed {
            buffer.decode_varint_u32()?
        } else {
            buffer.decode_u32()?
        };
        indices.push(check_index(index, num_points)?);
    }
    Ok(indices)
}
