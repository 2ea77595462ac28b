//! Polygonal geometry with named per-point arrays.

use glam::Vec3;

use crate::color::Rgba;

/// Name of the per-point color array.
pub const COLORS_ARRAY_NAME: &str = "Colors";

/// Name of the per-point array mapping each point back to its object row.
pub const ORIGINAL_IDS_ARRAY_NAME: &str = "OriginalIds";

/// Points, polyline and triangle cells, plus the point arrays a renderer needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolyData {
    pub points: Vec<Vec3>,
    /// Polyline cells as point index lists.
    pub lines: Vec<Vec<u32>>,
    /// Triangle cells.
    pub triangles: Vec<[u32; 3]>,
    /// Owning object row of every point.
    pub original_ids: Vec<u64>,
    /// RGBA color of every point; empty until colors are set up.
    pub colors: Vec<Rgba>,
}

impl PolyData {
    /// Creates empty geometry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of points.
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Number of cells (polylines and triangles).
    pub fn num_cells(&self) -> usize {
        self.lines.len() + self.triangles.len()
    }

    /// Names of the point arrays currently present.
    pub fn point_array_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if !self.original_ids.is_empty() {
            names.push(ORIGINAL_IDS_ARRAY_NAME);
        }
        if !self.colors.is_empty() {
            names.push(COLORS_ARRAY_NAME);
        }
        names
    }

    /// The color array as a flat byte buffer (4 bytes per point).
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    /// Axis-aligned bounds as `[xmin, xmax, ymin, ymax, zmin, zmax]`.
    ///
    /// Returns `None` for geometry without points.
    pub fn bounds(&self) -> Option<[f64; 6]> {
        let first = *self.points.first()?;
        let (min, max) = self
            .points
            .iter()
            .fold((first, first), |(min, max), &p| (min.min(p), max.max(p)));
        Some([
            f64::from(min.x),
            f64::from(max.x),
            f64::from(min.y),
            f64::from(max.y),
            f64::from(min.z),
            f64::from(max.z),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let mut poly = PolyData::new();
        assert_eq!(poly.bounds(), None);
        poly.points = vec![Vec3::new(1.0, -2.0, 3.0), Vec3::new(-1.0, 2.0, 0.0)];
        assert_eq!(poly.bounds(), Some([-1.0, 1.0, -2.0, 2.0, 0.0, 3.0]));
    }

    #[test]
    fn test_point_array_names() {
        let mut poly = PolyData {
            points: vec![Vec3::ZERO, Vec3::X],
            lines: vec![vec![0, 1]],
            ..PolyData::default()
        };
        assert!(poly.point_array_names().is_empty());
        poly.original_ids = vec![0, 0];
        poly.colors = vec![Rgba::WHITE; 2];
        assert_eq!(
            poly.point_array_names(),
            vec![ORIGINAL_IDS_ARRAY_NAME, COLORS_ARRAY_NAME]
        );
        assert_eq!(poly.num_cells(), 1);
        assert_eq!(poly.color_bytes().len(), 8);
    }
}
