//! Bitstream format constants and structures.

use std::fmt;

/// Magic bytes at the start of every stream.
pub const DRACO_MAGIC: &[u8; 5] = b"DRACO";

/// Size of the fixed stream header in bytes.
pub const HEADER_SIZE: usize = 10;

/// Newest point cloud bitstream version this build decodes.
pub const POINT_CLOUD_VERSION_MAJOR: u8 = 2;
pub const POINT_CLOUD_VERSION_MINOR: u8 = 3;

/// Newest mesh bitstream version this build decodes.
pub const MESH_VERSION_MAJOR: u8 = 2;
pub const MESH_VERSION_MINOR: u8 = 2;

/// Header flag bit signalling that geometry metadata follows the header.
pub const METADATA_FLAG_MASK: u8 = 0x80;

/// Attribute name selecting the structural call of a split decode.
pub const BASE_ATTRIBUTE_NAME: &str = "base";

/// Collapse a (major, minor) pair into one comparable ordinal.
#[inline]
pub const fn bitstream_version(major: u8, minor: u8) -> u16 {
    ((major as u16) << 8) | minor as u16
}

/// First version that may carry geometry metadata.
pub const METADATA_MIN_VERSION: u16 = bitstream_version(1, 3);

/// First version using varints for attribute unique ids.
pub const VARINT_UNIQUE_ID_VERSION: u16 = bitstream_version(1, 3);

/// First version using varints for attribute counts.
pub const VARINT_ATTRIBUTE_COUNT_VERSION: u16 = bitstream_version(2, 0);

/// First version using varints for mesh face/point counts.
pub const VARINT_MESH_COUNTS_VERSION: u16 = bitstream_version(2, 2);

/// Geometry kind stored in the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncodedGeometryType {
    PointCloud,
    TriangularMesh,
    /// Any value this build does not know.
    Invalid(u8),
}

impl EncodedGeometryType {
    pub const fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::PointCloud,
            1 => Self::TriangularMesh,
            other => Self::Invalid(other),
        }
    }

    pub const fn as_u8(self) -> u8 {
        match self {
            Self::PointCloud => 0,
            Self::TriangularMesh => 1,
            Self::Invalid(v) => v,
        }
    }

    /// Newest (major, minor) version this build decodes for this kind.
    pub const fn max_supported_version(self) -> (u8, u8) {
        match self {
            Self::TriangularMesh => (MESH_VERSION_MAJOR, MESH_VERSION_MINOR),
            _ => (POINT_CLOUD_VERSION_MAJOR, POINT_CLOUD_VERSION_MINOR),
        }
    }
}

impl fmt::Display for EncodedGeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PointCloud => f.write_str("POINT_CLOUD"),
            Self::TriangularMesh => f.write_str("TRIANGULAR_MESH"),
            Self::Invalid(v) => write!(f, "INVALID({v})"),
        }
    }
}
