//! Objects drawn as straight or curved polylines.

use glam::Vec3;
use objectvis_core::{IndexType, ObjectsData, PolyData, Result};

use crate::point_map::{contiguous_ranges, PointIndexMap, PointRange};

/// Number of points kept from a curved fiber of `available` points when only
/// every `skip`-th point is used; the last point is always kept.
pub fn curved_point_count(available: usize, skip: usize) -> usize {
    match available {
        0 => 0,
        n => (n - 1).div_ceil(skip.max(1)) + 1,
    }
}

/// Every `skip`-th point of a polyline plus its last point.
pub fn sample_curved(points: &[Vec3], skip: usize) -> Vec<Vec3> {
    let Some(&last) = points.last() else {
        return Vec::new();
    };
    let mut sampled: Vec<Vec3> = points[..points.len() - 1]
        .iter()
        .step_by(skip.max(1))
        .copied()
        .collect();
    sampled.push(last);
    sampled
}

/// One polyline per object: start and end point, or its curved fiber points.
#[derive(Debug, Clone)]
pub struct LineGeometry {
    ranges: Vec<PointRange>,
    poly: PolyData,
    segment_skip: usize,
}

impl LineGeometry {
    /// Builds the polylines of all objects.
    ///
    /// Curved fiber points of a row take precedence over its start/end columns.
    pub fn new(data: &ObjectsData, segment_skip: usize) -> Result<Self> {
        let segment_skip = segment_skip.max(1);
        let mut polylines = Vec::with_capacity(data.num_objects());
        for row in 0..data.num_objects() {
            let points = match data.curved_points(row) {
                Some(curved) => sample_curved(curved, segment_skip),
                None => vec![data.start_point(row)?, data.end_point(row)?],
            };
            polylines.push(points);
        }
        let geometry = Self::from_polylines(polylines, segment_skip);
        log::debug!(
            "built {} polylines with {} points",
            geometry.ranges.len(),
            geometry.poly.num_points()
        );
        Ok(geometry)
    }

    /// Builds the geometry from explicit per-object polylines.
    pub fn from_polylines(polylines: Vec<Vec<Vec3>>, segment_skip: usize) -> Self {
        let ranges = contiguous_ranges(polylines.iter().map(Vec::len));
        let mut poly = PolyData::new();
        for (obj, (points, range)) in polylines.into_iter().zip(&ranges).enumerate() {
            poly.lines
                .push(range.indices().map(|i| i as u32).collect());
            poly.original_ids
                .extend(std::iter::repeat(obj as u64).take(points.len()));
            poly.points.extend(points);
        }
        Self {
            ranges,
            poly,
            segment_skip,
        }
    }

    /// The line geometry.
    pub fn poly_data(&self) -> &PolyData {
        &self.poly
    }

    pub(crate) fn poly_data_mut(&mut self) -> &mut PolyData {
        &mut self.poly
    }

    /// Points of one object's polyline.
    pub fn polyline(&self, obj: IndexType) -> Option<&[Vec3]> {
        self.ranges
            .get(obj)
            .map(|r| &self.poly.points[r.indices()])
    }

    pub fn segment_skip(&self) -> usize {
        self.segment_skip
    }
}

impl PointIndexMap for LineGeometry {
    fn object_count(&self) -> usize {
        self.ranges.len()
    }

    fn point_range(&self, obj: IndexType) -> Option<PointRange> {
        self.ranges.get(obj).copied()
    }
}
