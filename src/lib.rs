//! # Draco
//!
//! Decoder for Draco compressed point clouds and triangular meshes.
//!
//! Draco and its bitstream format were developed by Google. This is an
//! independent Rust implementation of the decoding pipeline, including the
//! split mode where the structural data and individual attributes arrive in
//! separate buffers.
//!
//! ## Modules
//!
//! - [`util`] - Data types and errors
//! - [`core`] - Read cursor, decoder options and metadata containers
//! - [`geometry`] - Point clouds, meshes and attributes
//! - [`compression`] - Stream header, version gate, sessions and attribute decoders
//! - [`io`] - File loading and PLY export
//!
//! ## Example
//!
//! ```ignore
//! use draco::prelude::*;
//!
//! let input = InputFile::open("bunny.drc")?;
//! let mesh = Decoder::new().decode_mesh_from_buffer(&mut DecoderBuffer::new(&input))?;
//! println!("{} points, {} faces", mesh.num_points(), mesh.num_faces());
//! ```

pub mod util;
pub mod core;
pub mod geometry;
pub mod compression;
pub mod io;

// Re-export commonly used types
pub use util::{DataType, Error, ErrorKind, Result};
pub use compression::Decoder;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{DataType, Error, ErrorKind, Result};
    pub use crate::core::{DecoderBuffer, DecoderOptions, GeometryMetadata, Metadata};
    pub use crate::geometry::{GeometryAttributeType, Mesh, PointAttribute, PointCloud};
    pub use crate::compression::{
        Decoder, EncodedGeometryType, MeshDecoder, PointCloudDecoder, SessionPhase, VersionPolicy,
    };
    pub use crate::io::InputFile;
}
