//! Objects drawn as tubes around their polylines.

use objectvis_core::{
    ColumnId, IndexType, ObjectVisError, ObjectsData, PolyData, Result, VisOptions,
};

use crate::line::LineGeometry;
use crate::point_map::{PointIndexMap, PointRange};
use crate::tube::TubeTessellator;

/// Line geometry plus the tube tessellated around it.
///
/// The final point runs are stored exactly as the tessellation step reported
/// them; they are never derived from the line layout. A tessellation supplied
/// through [`CylinderGeometry::with_tessellation`] is never regenerated.
#[derive(Debug, Clone)]
pub struct CylinderGeometry {
    lines: LineGeometry,
    tessellator: TubeTessellator,
    /// Unscaled radius of each object.
    radii: Vec<f32>,
    diameter_factor: f64,
    context_diameter_factor: f64,
    /// Rows drawn with the context diameter factor, if a selection is shown.
    context_rows: Option<Vec<bool>>,
    tube: PolyData,
    final_ranges: Vec<PointRange>,
    /// The tube came from outside and cannot be tessellated again.
    external: bool,
}

impl CylinderGeometry {
    /// Builds and tessellates the cylinders of all objects.
    pub fn new(data: &ObjectsData, options: &VisOptions) -> Result<Self> {
        let lines = LineGeometry::new(data, options.segment_skip)?;
        let radii = (0..data.num_objects())
            .map(|row| {
                let diameter = match options.fixed_diameter {
                    Some(d) => d,
                    None => data.value(row, ColumnId::Diameter)?,
                };
                Ok((diameter / 2.0) as f32)
            })
            .collect::<Result<Vec<_>>>()?;
        let mut geometry = Self {
            lines,
            tessellator: TubeTessellator::new(options.cylinder_sides, options.cylinder_capping),
            radii,
            diameter_factor: options.diameter_factor,
            context_diameter_factor: options.context_diameter_factor,
            context_rows: None,
            tube: PolyData::new(),
            final_ranges: Vec::new(),
            external: false,
        };
        geometry.tessellate();
        Ok(geometry)
    }

    /// Uses a tessellation produced elsewhere.
    ///
    /// `final_ranges` must hold one run per line object, laid out back to back
    /// from point 0, and cover exactly the points of `tube`. Diameter factors
    /// cannot be changed afterwards.
    pub fn with_tessellation(
        lines: LineGeometry,
        radii: Vec<f32>,
        tube: PolyData,
        final_ranges: Vec<PointRange>,
    ) -> Result<Self> {
        if final_ranges.len() != lines.object_count() {
            return Err(ObjectVisError::SizeMismatch {
                expected: lines.object_count(),
                actual: final_ranges.len(),
            });
        }
        if radii.len() != lines.object_count() {
            return Err(ObjectVisError::SizeMismatch {
                expected: lines.object_count(),
                actual: radii.len(),
            });
        }
        let mut next = 0;
        for (obj, range) in final_ranges.iter().enumerate() {
            if range.start != next {
                return Err(ObjectVisError::InvalidConfig(format!(
                    "point run of object {obj} starts at {} instead of {next}",
                    range.start
                )));
            }
            next = range.end();
        }
        if next != tube.num_points() {
            return Err(ObjectVisError::SizeMismatch {
                expected: tube.num_points(),
                actual: next,
            });
        }
        Ok(Self {
            lines,
            tessellator: TubeTessellator::default(),
            radii,
            diameter_factor: 1.0,
            context_diameter_factor: 1.0,
            context_rows: None,
            tube,
            final_ranges,
            external: true,
        })
    }

    /// Whether the tube was supplied by [`CylinderGeometry::with_tessellation`].
    pub fn is_external(&self) -> bool {
        self.external
    }

    fn check_regenerable(&self) -> Result<()> {
        if self.external {
            return Err(ObjectVisError::InvalidConfig(
                "an externally tessellated tube cannot be rescaled".into(),
            ));
        }
        Ok(())
    }

    fn effective_radius(&self, obj: IndexType) -> f32 {
        let in_context = self
            .context_rows
            .as_ref()
            .is_some_and(|rows| rows[obj]);
        let factor = if in_context {
            self.diameter_factor * self.context_diameter_factor
        } else {
            self.diameter_factor
        };
        self.radii[obj] * factor as f32
    }

    /// Regenerates the tube, keeping existing point colors when the point count is unchanged.
    fn tessellate(&mut self) {
        let radii: Vec<f32> = (0..self.radii.len())
            .map(|obj| self.effective_radius(obj))
            .collect();
        let polylines = (0..self.lines.object_count()).filter_map(|obj| {
            self.lines.polyline(obj).map(|pts| (pts, radii[obj]))
        });
        let (mut tube, ranges) = self.tessellator.tessellate(polylines);
        if tube.num_points() == self.tube.colors.len() {
            tube.colors = std::mem::take(&mut self.tube.colors);
        }
        log::debug!(
            "tessellated {} cylinders into {} points",
            ranges.len(),
            tube.num_points()
        );
        self.tube = tube;
        self.final_ranges = ranges;
    }

    /// Scales all diameters; returns true if the tube was regenerated.
    pub fn set_diameter_factor(&mut self, factor: f64) -> Result<bool> {
        self.check_regenerable()?;
        if (factor - self.diameter_factor).abs() < f64::EPSILON {
            return Ok(false);
        }
        self.diameter_factor = factor;
        self.tessellate();
        Ok(true)
    }

    /// Scales the diameters of non-selected objects while a selection is shown;
    /// returns true if the tube was regenerated.
    pub fn set_context_diameter_factor(&mut self, factor: f64) -> Result<bool> {
        self.check_regenerable()?;
        if (factor - self.context_diameter_factor).abs() < f64::EPSILON {
            return Ok(false);
        }
        self.context_diameter_factor = factor;
        if self.context_rows.is_some() {
            self.tessellate();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Updates which rows count as context; returns true if the tube was regenerated.
    pub(crate) fn set_selection(&mut self, sorted_sel_inds: &[usize], active: bool) -> bool {
        let rows = active.then(|| {
            let mut context = vec![true; self.radii.len()];
            for &i in sorted_sel_inds {
                context[i] = false;
            }
            context
        });
        let unit_factor = (self.context_diameter_factor - 1.0).abs() < f64::EPSILON;
        let changed = rows != self.context_rows;
        self.context_rows = rows;
        if changed && !unit_factor && !self.external {
            self.tessellate();
            true
        } else {
            false
        }
    }

    pub fn diameter_factor(&self) -> f64 {
        self.diameter_factor
    }

    pub fn context_diameter_factor(&self) -> f64 {
        self.context_diameter_factor
    }

    pub fn tessellator(&self) -> TubeTessellator {
        self.tessellator
    }

    /// The untessellated line geometry.
    pub fn lines(&self) -> &LineGeometry {
        &self.lines
    }

    /// The tessellated tubes.
    pub fn tube(&self) -> &PolyData {
        &self.tube
    }

    pub(crate) fn tube_mut(&mut self) -> &mut PolyData {
        &mut self.tube
    }
}

impl PointIndexMap for CylinderGeometry {
    fn object_count(&self) -> usize {
        self.lines.object_count()
    }

    fn point_range(&self, obj: IndexType) -> Option<PointRange> {
        self.lines.point_range(obj)
    }

    fn final_point_range(&self, obj: IndexType) -> Option<PointRange> {
        self.final_ranges.get(obj).copied()
    }
}
