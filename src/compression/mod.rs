//! Stream decoding.
//!
//! - [`header`] - Fixed stream header
//! - [`version`] - Version acceptance policies
//! - [`metadata_decoder`] - Geometry metadata blocks
//! - [`attributes`] - Attributes decoders and value codecs
//! - [`kind`] - Point cloud and mesh specific steps
//! - [`decoder`] - Decode sessions, including split decoding
//! - [`api`] - High-level [`Decoder`] facade

pub mod api;
pub mod attributes;
pub mod decoder;
pub mod format;
pub mod header;
pub mod kind;
pub mod metadata_decoder;
pub mod version;

pub use api::Decoder;
pub use attributes::{AttributesDecoder, SequentialAttributesDecoder};
pub use decoder::{AttributeIndexMap, DecodeSession, MeshDecoder, PointCloudDecoder, SessionPhase};
pub use format::{EncodedGeometryType, BASE_ATTRIBUTE_NAME, DRACO_MAGIC, HEADER_SIZE, METADATA_FLAG_MASK};
pub use header::{decode_header, peek_header, StreamHeader};
pub use kind::{GeometryKind, MeshKind, PointCloudKind};
pub use version::VersionPolicy;
