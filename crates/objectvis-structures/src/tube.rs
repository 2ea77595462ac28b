//! Tessellation of polylines into closed tubes.

use std::f32::consts::TAU;

use glam::Vec3;
use objectvis_core::PolyData;

use crate::point_map::PointRange;

/// Minimum number of sides of a tube.
pub const MIN_TUBE_SIDES: usize = 3;

/// Sweeps a circle along each polyline.
///
/// For a polyline of `n` distinct points the tube gets `n * sides` wall
/// points, plus `2 * sides` cap points when capping is on. Consecutive
/// coincident points are merged; polylines with fewer than two distinct
/// points produce no points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TubeTessellator {
    pub sides: usize,
    pub capping: bool,
}

impl Default for TubeTessellator {
    fn default() -> Self {
        Self {
            sides: 12,
            capping: true,
        }
    }
}

impl TubeTessellator {
    pub fn new(sides: usize, capping: bool) -> Self {
        if sides < MIN_TUBE_SIDES {
            log::warn!("tube needs at least {MIN_TUBE_SIDES} sides, got {sides}");
        }
        Self {
            sides: sides.max(MIN_TUBE_SIDES),
            capping,
        }
    }

    /// Tessellates one tube per `(polyline, radius)` pair.
    ///
    /// Returns the tube geometry and, per input polyline, the run of tube
    /// points generated for it. The original id of every tube point is the
    /// position of its polyline in the input.
    pub fn tessellate<'a>(
        &self,
        polylines: impl IntoIterator<Item = (&'a [Vec3], f32)>,
    ) -> (PolyData, Vec<PointRange>) {
        let mut poly = PolyData::new();
        let mut ranges = Vec::new();
        for (obj, (points, radius)) in polylines.into_iter().enumerate() {
            let start = poly.points.len();
            self.append_tube(&mut poly, points, radius);
            let count = poly.points.len() - start;
            poly.original_ids
                .extend(std::iter::repeat(obj as u64).take(count));
            ranges.push(PointRange::new(start, count));
        }
        (poly, ranges)
    }

    fn append_tube(&self, poly: &mut PolyData, points: &[Vec3], radius: f32) {
        let path = dedup(points);
        if path.len() < 2 {
            return;
        }
        let sides = self.sides;
        let base = poly.points.len() as u32;
        let s = sides as u32;

        let mut normal = tangent(&path, 0).any_orthonormal_vector();
        for i in 0..path.len() {
            let t = tangent(&path, i);
            // parallel transport of the previous frame
            let projected = normal - t * normal.dot(t);
            normal = if projected.length_squared() > 1e-12 {
                projected.normalize()
            } else {
                t.any_orthonormal_vector()
            };
            let binormal = t.cross(normal);
            for k in 0..sides {
                let angle = TAU * k as f32 / sides as f32;
                let dir = normal * angle.cos() + binormal * angle.sin();
                poly.points.push(path[i] + dir * radius);
            }
        }

        for i in 0..(path.len() - 1) as u32 {
            for k in 0..s {
                let k1 = (k + 1) % s;
                let a = base + i * s + k;
                let b = base + i * s + k1;
                let c = base + (i + 1) * s + k1;
                let d = base + (i + 1) * s + k;
                poly.triangles.push([a, b, c]);
                poly.triangles.push([a, c, d]);
            }
        }

        if self.capping {
            let ring_len = path.len() * sides;
            let first_ring = poly.points[base as usize..base as usize + sides].to_vec();
            let last_ring_start = base as usize + ring_len - sides;
            let last_ring = poly.points[last_ring_start..last_ring_start + sides].to_vec();

            let start_cap = poly.points.len() as u32;
            poly.points.extend(first_ring);
            for k in 1..s - 1 {
                poly.triangles
                    .push([start_cap, start_cap + k + 1, start_cap + k]);
            }
            let end_cap = poly.points.len() as u32;
            poly.points.extend(last_ring);
            for k in 1..s - 1 {
                poly.triangles.push([end_cap, end_cap + k, end_cap + k + 1]);
            }
        }
    }
}

fn dedup(points: &[Vec3]) -> Vec<Vec3> {
    let mut path: Vec<Vec3> = Vec::with_capacity(points.len());
    for &p in points {
        if path
            .last()
            .map_or(true, |&q| (p - q).length_squared() > 1e-12)
        {
            path.push(p);
        }
    }
    path
}

fn tangent(path: &[Vec3], i: usize) -> Vec3 {
    let last = path.len() - 1;
    if i == 0 {
        return (path[1] - path[0]).normalize();
    }
    let incoming = (path[i] - path[i - 1]).normalize();
    if i == last {
        return incoming;
    }
    let outgoing = (path[i + 1] - path[i]).normalize();
    let sum = incoming + outgoing;
    if sum.length_squared() > 1e-12 {
        sum.normalize()
    } else {
        incoming
    }
}
