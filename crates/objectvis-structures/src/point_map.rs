//! Mapping of object rows to runs of points in a flat point buffer.

use std::ops::Range;

use objectvis_core::IndexType;

/// A contiguous run of points owned by one object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PointRange {
    pub start: IndexType,
    pub count: IndexType,
}

impl PointRange {
    pub const fn new(start: IndexType, count: IndexType) -> Self {
        Self { start, count }
    }

    /// One past the last point.
    pub const fn end(self) -> IndexType {
        self.start + self.count
    }

    /// The point indices of this run.
    pub const fn indices(self) -> Range<IndexType> {
        self.start..self.start + self.count
    }
}

/// Lays out runs of the given sizes back to back, starting at point 0.
pub fn contiguous_ranges(counts: impl IntoIterator<Item = IndexType>) -> Vec<PointRange> {
    let mut start = 0;
    counts
        .into_iter()
        .map(|count| {
            let range = PointRange::new(start, count);
            start += count;
            range
        })
        .collect()
}

/// Where the points of each object live.
///
/// Two layouts exist per object: the logical one (e.g. the two end points of
/// a straight fiber) and the final one produced by tessellation (e.g. the
/// wall points of a tube). Geometries without tessellation use the logical
/// layout for both. Rows outside the table have no range; the count and
/// start accessors report 0 for them.
pub trait PointIndexMap {
    /// Number of objects mapped.
    fn object_count(&self) -> usize;

    /// Logical point run of an object.
    fn point_range(&self, obj: IndexType) -> Option<PointRange>;

    /// Point run of an object in the tessellated geometry.
    fn final_point_range(&self, obj: IndexType) -> Option<PointRange> {
        self.point_range(obj)
    }

    fn object_point_count(&self, obj: IndexType) -> IndexType {
        self.point_range(obj).map_or(0, |r| r.count)
    }

    fn object_start_point_idx(&self, obj: IndexType) -> IndexType {
        self.point_range(obj).map_or(0, |r| r.start)
    }

    fn final_object_point_count(&self, obj: IndexType) -> IndexType {
        self.final_point_range(obj).map_or(0, |r| r.count)
    }

    fn final_object_start_point_idx(&self, obj: IndexType) -> IndexType {
        self.final_point_range(obj).map_or(0, |r| r.start)
    }

    /// Total number of logical points.
    fn all_point_count(&self) -> IndexType {
        (0..self.object_count())
            .map(|i| self.object_point_count(i))
            .sum()
    }

    /// Total number of tessellated points.
    fn final_all_point_count(&self) -> IndexType {
        (0..self.object_count())
            .map(|i| self.final_object_point_count(i))
            .sum()
    }
}
