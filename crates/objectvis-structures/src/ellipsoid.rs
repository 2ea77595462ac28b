//! Objects drawn as axis-aligned ellipsoids around their center.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use objectvis_core::{IndexType, ObjectsData, PolyData, Result};

use crate::point_map::{PointIndexMap, PointRange};

/// Minimum latitude/longitude resolution of an ellipsoid.
pub const MIN_ELLIPSOID_RESOLUTION: usize = 3;

/// Number of points of a lat-long sphere tessellation.
pub const fn ellipsoid_point_count(phi_res: usize, theta_res: usize) -> usize {
    (phi_res - 2) * theta_res + 2
}

/// One lat-long tessellated ellipsoid per object, all with the same point count.
///
/// Per object the points are the north pole, the south pole, then
/// `theta_res` meridians of `phi_res - 2` points each. Radii are half of the
/// object's dimension columns.
#[derive(Debug, Clone)]
pub struct EllipsoidGeometry {
    phi_res: usize,
    theta_res: usize,
    num_objects: usize,
    poly: PolyData,
}

impl EllipsoidGeometry {
    pub fn new(data: &ObjectsData, phi_res: usize, theta_res: usize) -> Result<Self> {
        let phi_res = clamp_resolution("phi", phi_res);
        let theta_res = clamp_resolution("theta", theta_res);
        let num_objects = data.num_objects();
        let mut poly = PolyData::new();
        for row in 0..num_objects {
            let center = data.center(row)?;
            let radii = data.dimension(row)? / 2.0;
            append_ellipsoid(&mut poly, center, radii, phi_res, theta_res);
            poly.original_ids.extend(
                std::iter::repeat(row as u64).take(ellipsoid_point_count(phi_res, theta_res)),
            );
        }
        log::debug!(
            "built {num_objects} ellipsoids ({phi_res}x{theta_res}) with {} points",
            poly.num_points()
        );
        Ok(Self {
            phi_res,
            theta_res,
            num_objects,
            poly,
        })
    }

    pub fn phi_resolution(&self) -> usize {
        self.phi_res
    }

    pub fn theta_resolution(&self) -> usize {
        self.theta_res
    }

    /// Points per ellipsoid.
    pub fn points_per_ellipsoid(&self) -> usize {
        ellipsoid_point_count(self.phi_res, self.theta_res)
    }

    pub fn poly_data(&self) -> &PolyData {
        &self.poly
    }

    pub(crate) fn poly_data_mut(&mut self) -> &mut PolyData {
        &mut self.poly
    }
}

fn clamp_resolution(name: &str, res: usize) -> usize {
    if res < MIN_ELLIPSOID_RESOLUTION {
        log::warn!("ellipsoid {name} resolution must be at least {MIN_ELLIPSOID_RESOLUTION}, got {res}");
    }
    res.max(MIN_ELLIPSOID_RESOLUTION)
}

fn append_ellipsoid(poly: &mut PolyData, center: Vec3, radii: Vec3, phi_res: usize, theta_res: usize) {
    let start = poly.points.len() as u32;
    poly.points.push(center + Vec3::new(0.0, 0.0, radii.z));
    poly.points.push(center - Vec3::new(0.0, 0.0, radii.z));
    for i in 0..theta_res {
        let theta = TAU * i as f32 / theta_res as f32;
        for j in 1..phi_res - 1 {
            let phi = PI * j as f32 / (phi_res - 1) as f32;
            let unit = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
            poly.points.push(center + unit * radii);
        }
    }

    let north = start;
    let south = start + 1;
    let ring = (phi_res - 2) as u32;
    let base = |i: usize| start + 2 + (i % theta_res) as u32 * ring;
    for i in 0..theta_res {
        let (a, b) = (base(i), base(i + 1));
        poly.triangles.push([north, a, b]);
        poly.triangles.push([south, b + ring - 1, a + ring - 1]);
        for j in 0..ring - 1 {
            poly.triangles.push([a + j, a + j + 1, b + j + 1]);
            poly.triangles.push([a + j, b + j + 1, b + j]);
        }
    }
}

impl PointIndexMap for EllipsoidGeometry {
    fn object_count(&self) -> usize {
        self.num_objects
    }

    fn point_range(&self, obj: IndexType) -> Option<PointRange> {
        let count = self.points_per_ellipsoid();
        (obj < self.num_objects).then(|| PointRange::new(obj * count, count))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use objectvis_core::{ColumnId, ColumnMapping, ObjectTable, ObjectType};

    use super::*;

    fn pores() -> ObjectsData {
        let table = ObjectTable::from_rows(vec![
            vec![0.0, 0.0, 0.0, 2.0, 4.0, 6.0, 0.0],
            vec![10.0, 0.0, 0.0, 2.0, 2.0, 2.0, 1.0],
            vec![20.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0],
        ])
        .expect("valid table");
        let mapping = ColumnMapping::new()
            .with(ColumnId::CenterX, 0)
            .with(ColumnId::CenterY, 1)
            .with(ColumnId::CenterZ, 2)
            .with(ColumnId::DimensionX, 3)
            .with(ColumnId::DimensionY, 4)
            .with(ColumnId::DimensionZ, 5);
        ObjectsData::new(ObjectType::Voids, table, Arc::new(mapping)).expect("valid mapping")
    }

    #[test]
    fn test_uniform_stride() {
        let geometry = EllipsoidGeometry::new(&pores(), 6, 6).expect("geometry");
        assert_eq!(geometry.points_per_ellipsoid(), 26);
        for obj in 0..3 {
            assert_eq!(geometry.object_start_point_idx(obj), obj * 26);
            assert_eq!(geometry.object_point_count(obj), 26);
        }
        assert_eq!(geometry.all_point_count(), geometry.poly_data().num_points());
        assert_eq!(geometry.final_all_point_count(), 78);
        assert_eq!(geometry.poly_data().original_ids[26], 1);
    }

    #[test]
    fn test_points_lie_on_ellipsoid() {
        let geometry = EllipsoidGeometry::new(&pores(), 8, 5).expect("geometry");
        let range = geometry.point_range(0).expect("object exists");
        let radii = Vec3::new(1.0, 2.0, 3.0);
        for p in &geometry.poly_data().points[range.indices()] {
            let q = *p / radii;
            assert!((q.length_squared() - 1.0).abs() < 1e-4);
        }
        assert_eq!(geometry.poly_data().points[0], Vec3::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_triangle_count_and_indices() {
        let geometry = EllipsoidGeometry::new(&pores(), 6, 6).expect("geometry");
        let poly = geometry.poly_data();
        // two pole fans plus (phi_res - 3) bands of quads per meridian
        assert_eq!(poly.triangles.len(), 3 * (2 * 6 + 2 * 6 * 3));
        let max = poly.triangles.iter().flatten().copied().max();
        assert_eq!(max, Some(poly.num_points() as u32 - 1));
    }

    #[test]
    fn test_resolution_clamped() {
        let geometry = EllipsoidGeometry::new(&pores(), 1, 2).expect("geometry");
        assert_eq!(geometry.points_per_ellipsoid(), ellipsoid_point_count(3, 3));
    }
}
