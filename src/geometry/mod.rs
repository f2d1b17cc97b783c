//! Decoded geometry - point clouds, meshes and their attributes.

mod attribute;
mod mesh;
mod point_cloud;

pub use attribute::{GeometryAttributeType, PointAttribute};
pub use mesh::{Face, Mesh};
pub use point_cloud::PointCloud;
