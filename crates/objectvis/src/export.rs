//! PLY export of visualization geometry.
//!
//! Writes points with the point arrays present (colors, owning object row),
//! triangles as faces and polyline segments as edges, so that extracted
//! objects can be opened in external mesh tools.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use objectvis_core::{
    ObjectVisError, PolyData, Result, COLORS_ARRAY_NAME, ORIGINAL_IDS_ARRAY_NAME,
};
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;

fn scalar(name: &str, ty: ScalarType) -> PropertyDef {
    PropertyDef::new(name.to_string(), PropertyType::Scalar(ty))
}

fn build_ply(poly: &PolyData) -> Result<Ply<DefaultElement>> {
    let arrays = poly.point_array_names();
    let with_colors = arrays.contains(&COLORS_ARRAY_NAME);
    let with_ids = arrays.contains(&ORIGINAL_IDS_ARRAY_NAME);
    for (present, len) in [
        (with_colors, poly.colors.len()),
        (with_ids, poly.original_ids.len()),
    ] {
        if present && len != poly.points.len() {
            return Err(ObjectVisError::SizeMismatch {
                expected: poly.points.len(),
                actual: len,
            });
        }
    }

    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::Ascii;
    ply.header
        .comments
        .push("written by objectvis-rs".to_string());

    let mut vertex = ElementDef::new("vertex".to_string());
    for axis in ["x", "y", "z"] {
        vertex.properties.add(scalar(axis, ScalarType::Float));
    }
    if with_colors {
        for channel in ["red", "green", "blue", "alpha"] {
            vertex.properties.add(scalar(channel, ScalarType::UChar));
        }
    }
    if with_ids {
        vertex
            .properties
            .add(scalar(ORIGINAL_IDS_ARRAY_NAME, ScalarType::UInt));
    }
    ply.header.elements.add(vertex);

    let vertices = poly
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut v = DefaultElement::new();
            v.insert("x".to_string(), Property::Float(p.x));
            v.insert("y".to_string(), Property::Float(p.y));
            v.insert("z".to_string(), Property::Float(p.z));
            if with_colors {
                let c = poly.colors[i];
                v.insert("red".to_string(), Property::UChar(c.r));
                v.insert("green".to_string(), Property::UChar(c.g));
                v.insert("blue".to_string(), Property::UChar(c.b));
                v.insert("alpha".to_string(), Property::UChar(c.a));
            }
            if with_ids {
                v.insert(
                    ORIGINAL_IDS_ARRAY_NAME.to_string(),
                    Property::UInt(poly.original_ids[i] as u32),
                );
            }
            v
        })
        .collect();
    ply.payload.insert("vertex".to_string(), vertices);

    if !poly.triangles.is_empty() {
        let mut face = ElementDef::new("face".to_string());
        face.properties.add(PropertyDef::new(
            "vertex_indices".to_string(),
            PropertyType::List(ScalarType::UChar, ScalarType::Int),
        ));
        ply.header.elements.add(face);

        let faces = poly
            .triangles
            .iter()
            .map(|t| {
                let mut f = DefaultElement::new();
                f.insert(
                    "vertex_indices".to_string(),
                    Property::ListInt(t.iter().map(|&i| i as i32).collect()),
                );
                f
            })
            .collect();
        ply.payload.insert("face".to_string(), faces);
    }

    if !poly.lines.is_empty() {
        let mut edge = ElementDef::new("edge".to_string());
        edge.properties.add(scalar("vertex1", ScalarType::Int));
        edge.properties.add(scalar("vertex2", ScalarType::Int));
        ply.header.elements.add(edge);

        let edges = poly
            .lines
            .iter()
            .flat_map(|line| line.windows(2))
            .map(|seg| {
                let mut e = DefaultElement::new();
                e.insert("vertex1".to_string(), Property::Int(seg[0] as i32));
                e.insert("vertex2".to_string(), Property::Int(seg[1] as i32));
                e
            })
            .collect();
        ply.payload.insert("edge".to_string(), edges);
    }

    ply.make_consistent()
        .map_err(|e| ObjectVisError::Export(format!("{e:?}")))?;
    Ok(ply)
}

/// Writes `poly` as ASCII PLY.
pub fn write_ply<W: Write>(poly: &PolyData, out: &mut W) -> Result<()> {
    let mut ply = build_ply(poly)?;
    Writer::new().write_ply(out, &mut ply)?;
    Ok(())
}

/// Writes `poly` as ASCII PLY to a file.
pub fn save_ply(poly: &PolyData, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    write_ply(poly, &mut out)?;
    out.flush()?;
    log::info!(
        "wrote {} points, {} cells to {}",
        poly.num_points(),
        poly.num_cells(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use objectvis_core::Rgba;

    use super::*;

    fn triangle() -> PolyData {
        PolyData {
            points: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            triangles: vec![[0, 1, 2]],
            colors: vec![Rgba::rgb(255, 0, 0); 3],
            ..PolyData::default()
        }
    }

    #[test]
    fn test_write_header_and_body() {
        let mut out = Vec::new();
        write_ply(&triangle(), &mut out).expect("write");
        let text = String::from_utf8(out).expect("ascii");
        assert!(text.starts_with("ply\n"));
        assert!(text.contains("element vertex 3"));
        assert!(text.contains("property uchar red"));
        assert!(!text.contains(ORIGINAL_IDS_ARRAY_NAME));
        assert!(text.contains("element face 1"));
        assert!(!text.contains("element edge"));
    }

    #[test]
    fn test_original_ids_become_vertex_property() {
        let mut poly = triangle();
        poly.original_ids = vec![4, 4, 4];
        let mut out = Vec::new();
        write_ply(&poly, &mut out).expect("write");
        let text = String::from_utf8(out).expect("ascii");
        assert!(text.contains("property uint OriginalIds"));

        poly.original_ids.pop();
        assert!(matches!(
            write_ply(&poly, &mut Vec::new()),
            Err(ObjectVisError::SizeMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_polylines_become_edges() {
        let poly = PolyData {
            points: vec![Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.0, 0.0)],
            lines: vec![vec![0, 1, 2]],
            ..PolyData::default()
        };
        let mut out = Vec::new();
        write_ply(&poly, &mut out).expect("write");
        let text = String::from_utf8(out).expect("ascii");
        assert!(text.contains("element edge 2"));
        assert!(!text.contains("red"));
    }

    #[test]
    fn test_partial_colors_rejected() {
        let mut poly = triangle();
        poly.colors.pop();
        assert!(matches!(
            write_ply(&poly, &mut Vec::new()),
            Err(ObjectVisError::SizeMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }
}
