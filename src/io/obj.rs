//! Wavefront OBJ writer for decoded geometry.
//!
//! Writes `v` lines for positions, `vt` for 2-component texture coordinates
//! and `vn` for 3-component normals. Attributes are point-indexed, so every
//! face corner uses the same index for all of them. Point clouds get vertex
//! lines only.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::geometry::{Face, GeometryAttributeType, Mesh, PointAttribute, PointCloud};
use crate::util::{DataType, Error, Result};

pub fn write_point_cloud<W: Write>(pc: &PointCloud, out: W) -> Result<()> {
    write(pc, None, out)
}

pub fn write_mesh<W: Write>(mesh: &Mesh, out: W) -> Result<()> {
    write(mesh.point_cloud(), Some(mesh.faces()), out)
}

/// Write a mesh to an OBJ file.
pub fn write_mesh_file(mesh: &Mesh, path: impl AsRef<Path>) -> Result<()> {
    write_mesh(mesh, File::create(path)?)
}

/// Write a point cloud to an OBJ file.
pub fn write_point_cloud_file(pc: &PointCloud, path: impl AsRef<Path>) -> Result<()> {
    write_point_cloud(pc, File::create(path)?)
}

fn first_of(pc: &PointCloud, ty: GeometryAttributeType, num_components: u8) -> Option<&PointAttribute> {
    pc.attributes()
        .iter()
        .find(|a| a.attribute_type() == ty && !a.is_empty() && a.num_components() == num_components)
}

fn write<W: Write>(pc: &PointCloud, faces: Option<&[Face]>, out: W) -> Result<()> {
    let position = pc
        .attributes()
        .iter()
        .find(|a| a.attribute_type() == GeometryAttributeType::Position && !a.is_empty())
        .ok_or_else(|| Error::ExportFailed("no position attribute".into()))?;
    let tex_coord = faces.and(first_of(pc, GeometryAttributeType::TexCoord, 2));
    let normal = faces.and(first_of(pc, GeometryAttributeType::Normal, 3));

    let mut out = BufWriter::new(out);
    let num_points = pc.num_points() as usize;
    for (tag, att) in [("v", Some(position)), ("vt", tex_coord), ("vn", normal)] {
        let Some(att) = att else { continue };
        for point in 0..num_points {
            write!(out, "{tag}")?;
            for c in components(att, point)? {
                write!(out, " {c}")?;
            }
            writeln!(out)?;
        }
    }

    for face in faces.unwrap_or_default() {
        write!(out, "f")?;
        for &index in face {
            let i = index + 1;
            match (tex_coord.is_some(), normal.is_some()) {
                (true, true) => write!(out, " {i}/{i}/{i}")?,
                (true, false) => write!(out, " {i}/{i}")?,
                (false, true) => write!(out, " {i}//{i}")?,
                (false, false) => write!(out, " {i}")?,
            }
        }
        writeln!(out)?;
    }
    out.flush()?;
    tracing::debug!(points = num_points, faces = faces.map_or(0, |f| f.len()), "wrote obj");
    Ok(())
}

/// Components of the value at `point`, widened to f64.
fn components(att: &PointAttribute, point: usize) -> Result<Vec<f64>> {
    let mut bytes = att.value_bytes(point).ok_or_else(|| {
        Error::ExportFailed(format!("{} attribute has no value for point {point}", att.attribute_type()))
    })?;
    let mut values = Vec::with_capacity(att.num_components() as usize);
    for _ in 0..att.num_components() {
        let v = match att.data_type() {
            DataType::Int8 => f64::from(bytes.read_i8()?),
            DataType::Uint8 | DataType::Bool => f64::from(bytes.read_u8()?),
            DataType::Int16 => f64::from(bytes.read_i16::<LittleEndian>()?),
            DataType::Uint16 => f64::from(bytes.read_u16::<LittleEndian>()?),
            DataType::Int32 => f64::from(bytes.read_i32::<LittleEndian>()?),
            DataType::Uint32 => f64::from(bytes.read_u32::<LittleEndian>()?),
            DataType::Int64 => bytes.read_i64::<LittleEndian>()? as f64,
            DataType::Uint64 => bytes.read_u64::<LittleEndian>()? as f64,
            DataType::Float32 => f64::from(bytes.read_f32::<LittleEndian>()?),
            DataType::Float64 => bytes.read_f64::<LittleEndian>()?,
            DataType::Invalid => {
                return Err(Error::ExportFailed(format!("{} attribute has no data type", att.attribute_type())))
            }
        };
        values.push(v);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute(ty: GeometryAttributeType, dt: DataType, comps: u8, data: Vec<u8>) -> PointAttribute {
        let mut att = PointAttribute::new(ty, dt, comps, false);
        att.set_data(data).unwrap();
        att
    }

    fn triangle() -> Mesh {
        let positions = [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.5, 0.0];
        let mut mesh = Mesh::new();
        mesh.add_attribute(attribute(
            GeometryAttributeType::Position,
            DataType::Float32,
            3,
            bytemuck::cast_slice(&positions).to_vec(),
        ));
        mesh.add_face([0, 1, 2]);
        mesh.finalize_point_count().unwrap();
        mesh
    }

    #[test]
    fn test_mesh() {
        let mut out = Vec::new();
        write_mesh(&triangle(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "v 0 0 0\nv 1 0 0\nv 0 1.5 0\nf 1 2 3\n");
    }

    #[test]
    fn test_mesh_with_tex_coords() {
        let mut mesh = triangle();
        mesh.add_attribute(attribute(GeometryAttributeType::TexCoord, DataType::Uint16, 2, vec![0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 2, 0]));
        let mut out = Vec::new();
        write_mesh(&mesh, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("vt 0 1\nvt 0 0\nvt 0 2\n"));
        assert!(text.ends_with("f 1/1 2/2 3/3\n"));
    }

    #[test]
    fn test_point_cloud_needs_position() {
        let mut pc = PointCloud::new();
        pc.add_attribute(attribute(GeometryAttributeType::Color, DataType::Uint8, 3, vec![1, 2, 3]));
        pc.finalize_point_count().unwrap();
        let err = write_point_cloud(&pc, Vec::new()).unwrap_err();
        assert!(matches!(err, Error::ExportFailed(_)));
    }
}
