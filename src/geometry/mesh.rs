//! Triangle mesh - a point cloud plus faces.

use std::ops::{Deref, DerefMut};

use super::PointCloud;

/// A triangle referencing three point indices.
pub type Face = [u32; 3];

/// Decoded triangle mesh.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    point_cloud: PointCloud,
    faces: Vec<Face>,
}

impl Mesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn face(&self, index: usize) -> Option<&Face> {
        self.faces.get(index)
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    pub fn set_faces(&mut self, faces: Vec<Face>) {
        self.faces = faces;
    }

    pub fn point_cloud(&self) -> &PointCloud {
        &self.point_cloud
    }

    /// Drop the connectivity and keep the points.
    pub fn into_point_cloud(self) -> PointCloud {
        self.point_cloud
    }
}

impl Deref for Mesh {
    type Target = PointCloud;

    fn deref(&self) -> &PointCloud {
        &self.point_cloud
    }
}

impl DerefMut for Mesh {
    fn deref_mut(&mut self) -> &mut PointCloud {
        &mut self.point_cloud
    }
}

impl AsRef<PointCloud> for Mesh {
    fn as_ref(&self) -> &PointCloud {
        &self.point_cloud
    }
}

impl AsMut<PointCloud> for Mesh {
    fn as_mut(&mut self) -> &mut PointCloud {
        &mut self.point_cloud
    }
}
