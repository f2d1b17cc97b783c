//! Binary little-endian PLY writer for decoded geometry.
//!
//! Positions are required. Normals are written when they have 3 components,
//! colors as `red green blue alpha` up to their component count. Texture
//! coordinates with 2 components go into the face list, one pair per corner.
//! Generic attributes are written when the `to_generic` option is set (the
//! first one only, as property `generic`) or when their metadata carries a
//! non-zero `output` entry and a `name`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::core::{DecoderOptions, Metadata, TO_GENERIC_KEY};
use crate::geometry::{Face, GeometryAttributeType, Mesh, PointAttribute, PointCloud};
use crate::util::{Error, Result};

/// PLY writer configured from decoder options.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlyWriter {
    to_generic: bool,
}

/// Attributes selected for output.
struct Selection<'a> {
    position: &'a PointAttribute,
    normal: Option<&'a PointAttribute>,
    color: Option<&'a PointAttribute>,
    tex_coord: Option<&'a PointAttribute>,
    /// Generic attributes with their property names.
    generic: Vec<(&'a PointAttribute, String)>,
}

impl PlyWriter {
    pub fn new(options: &DecoderOptions) -> Self {
        Self { to_generic: options.get_global_bool(TO_GENERIC_KEY, false) }
    }

    pub fn write_point_cloud<W: Write>(&self, pc: &PointCloud, out: W) -> Result<()> {
        self.write(pc, None, out)
    }

    pub fn write_mesh<W: Write>(&self, mesh: &Mesh, out: W) -> Result<()> {
        self.write(mesh.point_cloud(), Some(mesh.faces()), out)
    }

    fn select<'a>(&self, pc: &'a PointCloud) -> Result<Selection<'a>> {
        let mut position = None;
        let mut normal = None;
        let mut color = None;
        let mut tex_coord = None;
        let mut generic = Vec::new();

        for (att_id, att) in pc.attributes().iter().enumerate() {
            if att.is_empty() {
                continue;
            }
            match att.attribute_type() {
                GeometryAttributeType::Position => position = Some(att),
                GeometryAttributeType::Normal => normal = Some(att),
                GeometryAttributeType::Color => color = Some(att),
                GeometryAttributeType::TexCoord => tex_coord = Some(att),
                GeometryAttributeType::Generic => {
                    let name = pc
                        .get_metadata_entry_string_by_attribute_id(att_id, Metadata::NAME_KEY)
                        .unwrap_or_default();
                    let output = pc
                        .get_metadata_entry_int_by_attribute_id(att_id, Metadata::OUTPUT_KEY)
                        .unwrap_or(0);
                    if self.to_generic {
                        if generic.is_empty() {
                            generic.push((att, "generic".to_string()));
                        }
                    } else if output != 0 && !name.is_empty() {
                        generic.push((att, name.to_string()));
                    }
                }
            }
        }

        let position = position.ok_or_else(|| Error::ExportFailed("no position attribute".into()))?;
        Ok(Selection {
            position,
            normal: normal.filter(|a| a.num_components() == 3),
            color,
            tex_coord: tex_coord.filter(|a| a.num_components() == 2),
            generic,
        })
    }

    fn write<W: Write>(&self, pc: &PointCloud, faces: Option<&[Face]>, out: W) -> Result<()> {
        let sel = self.select(pc)?;
        let mut out = BufWriter::new(out);

        writeln!(out, "ply")?;
        writeln!(out, "format binary_little_endian 1.0")?;
        writeln!(out, "element vertex {}", pc.num_points())?;
        let pos_type = property_type(sel.position)?;
        for axis in ["x", "y", "z"] {
            writeln!(out, "property {pos_type} {axis}")?;
        }
        if let Some(normal) = sel.normal {
            let ty = property_type(normal)?;
            for axis in ["nx", "ny", "nz"] {
                writeln!(out, "property {ty} {axis}")?;
            }
        }
        if let Some(color) = sel.color {
            let ty = property_type(color)?;
            for channel in ["red", "green", "blue", "alpha"].iter().take(color.num_components() as usize) {
                writeln!(out, "property {ty} {channel}")?;
            }
        }
        for (att, name) in &sel.generic {
            writeln!(out, "property {} {name}", property_type(att)?)?;
        }
        if let Some(faces) = faces {
            writeln!(out, "element face {}", faces.len())?;
            writeln!(out, "property list uchar int vertex_indices")?;
            if let Some(tex) = sel.tex_coord {
                writeln!(out, "property list uchar {} texcoord", property_type(tex)?)?;
            }
        }
        writeln!(out, "end_header")?;

        for point in 0..pc.num_points() as usize {
            out.write_all(value(sel.position, point)?)?;
            if let Some(normal) = sel.normal {
                out.write_all(value(normal, point)?)?;
            }
            if let Some(color) = sel.color {
                out.write_all(value(color, point)?)?;
            }
            for (att, _) in &sel.generic {
                out.write_all(value(att, point)?)?;
            }
        }

        for face in faces.unwrap_or_default() {
            out.write_u8(3)?;
            for &index in face {
                out.write_u32::<LittleEndian>(index)?;
            }
            if let Some(tex) = sel.tex_coord {
                out.write_u8(6)?;
                for &index in face {
                    out.write_all(value(tex, index as usize)?)?;
                }
            }
        }
        out.flush()?;
        tracing::debug!(
            points = pc.num_points(),
            faces = faces.map_or(0, |f| f.len()),
            generic = sel.generic.len(),
            "wrote ply"
        );
        Ok(())
    }
}

fn property_type(att: &PointAttribute) -> Result<&'static str> {
    att.data_type().ply_name().ok_or_else(|| {
        Error::ExportFailed(format!("{} values cannot be written to PLY", att.data_type()))
    })
}

fn value(att: &PointAttribute, point: usize) -> Result<&[u8]> {
    att.value_bytes(point).ok_or_else(|| {
        Error::ExportFailed(format!("{} attribute has no value for point {point}", att.attribute_type()))
    })
}

/// Write a mesh to a PLY file.
pub fn write_mesh_file(mesh: &Mesh, path: impl AsRef<Path>, options: &DecoderOptions) -> Result<()> {
    PlyWriter::new(options).write_mesh(mesh, File::create(path)?)
}

/// Write a point cloud to a PLY file.
pub fn write_point_cloud_file(pc: &PointCloud, path: impl AsRef<Path>, options: &DecoderOptions) -> Result<()> {
    PlyWriter::new(options).write_point_cloud(pc, File::create(path)?)
}
