//! Per-point coloring of objects drawn as polygonal geometry.
//!
//! Every coloring operation computes one color per object row and writes it
//! to all points of that row. Colors live in the `Colors` array of the final
//! geometry: the tube for cylinders, the logical geometry otherwise.

use std::sync::Arc;

use image::Rgb32FImage;
use objectvis_core::{
    ColorTransferFunction, ColumnId, IndexType, LookupTable, Notifier, ObjectVisError,
    ObjectVisType, ObjectsData, PolyData, Result, Rgba, VisEvent, VisOptions,
    DEFAULT_CONTEXT_OPACITY, DEFAULT_SELECTION_OPACITY, SELECTED_COLOR, TRANSPARENT_ALPHA,
};

use crate::cylinder::CylinderGeometry;
use crate::ellipsoid::EllipsoidGeometry;
use crate::line::LineGeometry;
use crate::object_vis::{
    length_color, orientation_color, validate_selection, LengthDistribution, ObjectVisualization,
};
use crate::point_map::{PointIndexMap, PointRange};

/// Color of rows outside the highlighted class in [`ObjectVisualization::render_selection`].
const BACK_COLOR: Rgba = Rgba::new(128, 128, 128, 0);

/// The geometry variant of a poly-object visualization.
#[derive(Debug, Clone)]
pub enum PolyShape {
    Line(LineGeometry),
    Cylinder(CylinderGeometry),
    Ellipsoid(EllipsoidGeometry),
}

impl PolyShape {
    fn map(&self) -> &dyn PointIndexMap {
        match self {
            Self::Line(g) => g,
            Self::Cylinder(g) => g,
            Self::Ellipsoid(g) => g,
        }
    }

    pub fn vis_type(&self) -> ObjectVisType {
        match self {
            Self::Line(_) => ObjectVisType::Line,
            Self::Cylinder(_) => ObjectVisType::Cylinder,
            Self::Ellipsoid(_) => ObjectVisType::Ellipsoid,
        }
    }

    /// The untessellated geometry.
    pub fn poly_data(&self) -> &PolyData {
        match self {
            Self::Line(g) => g.poly_data(),
            Self::Cylinder(g) => g.lines().poly_data(),
            Self::Ellipsoid(g) => g.poly_data(),
        }
    }

    /// The tessellated geometry, for variants that tessellate.
    pub fn final_poly_data(&self) -> Option<&PolyData> {
        match self {
            Self::Cylinder(g) => Some(g.tube()),
            _ => None,
        }
    }

    /// Geometry holding the color array.
    fn colored(&self) -> &PolyData {
        self.final_poly_data().unwrap_or_else(|| self.poly_data())
    }

    fn colored_mut(&mut self) -> &mut PolyData {
        match self {
            Self::Line(g) => g.poly_data_mut(),
            Self::Cylinder(g) => g.tube_mut(),
            Self::Ellipsoid(g) => g.poly_data_mut(),
        }
    }

    /// Point run of an object in the colored geometry.
    fn color_range(&self, obj: IndexType) -> Option<PointRange> {
        if self.final_poly_data().is_some() {
            self.map().final_point_range(obj)
        } else {
            self.map().point_range(obj)
        }
    }
}

/// Objects drawn as lines, cylinders or ellipsoids with one color per object.
#[derive(Debug)]
pub struct ColoredPolyObjectVis {
    data: Arc<ObjectsData>,
    shape: PolyShape,
    options: VisOptions,
    base_color: Rgba,
    selection: Vec<usize>,
    selection_active: bool,
    selection_alpha: u8,
    context_alpha: u8,
    lut: Option<(Arc<LookupTable>, usize)>,
    /// Per-row colors looked up through `lut` when it was installed.
    lut_colors: Vec<Rgba>,
    notifier: Notifier,
}

impl ColoredPolyObjectVis {
    /// Wraps a geometry; every point starts out in `color`.
    pub fn new(data: Arc<ObjectsData>, shape: PolyShape, color: Rgba, options: VisOptions) -> Self {
        let mut vis = Self {
            data,
            shape,
            options,
            base_color: color,
            selection: Vec::new(),
            selection_active: false,
            selection_alpha: DEFAULT_SELECTION_OPACITY,
            context_alpha: DEFAULT_CONTEXT_OPACITY,
            lut: None,
            lut_colors: Vec::new(),
            notifier: Notifier::new(),
        };
        vis.setup_colors();
        vis
    }

    pub fn line(data: Arc<ObjectsData>, color: Rgba, options: &VisOptions) -> Result<Self> {
        let geometry = LineGeometry::new(&data, options.segment_skip)?;
        Ok(Self::new(data, PolyShape::Line(geometry), color, options.clone()))
    }

    pub fn cylinder(data: Arc<ObjectsData>, color: Rgba, options: &VisOptions) -> Result<Self> {
        let geometry = CylinderGeometry::new(&data, options)?;
        Ok(Self::new(data, PolyShape::Cylinder(geometry), color, options.clone()))
    }

    pub fn ellipsoid(data: Arc<ObjectsData>, color: Rgba, options: &VisOptions) -> Result<Self> {
        let geometry = EllipsoidGeometry::new(
            &data,
            options.ellipsoid_phi_resolution,
            options.ellipsoid_theta_resolution,
        )?;
        Ok(Self::new(data, PolyShape::Ellipsoid(geometry), color, options.clone()))
    }

    fn setup_colors(&mut self) {
        let count = self.shape.colored().num_points();
        let base = self.base_color;
        let colors = &mut self.shape.colored_mut().colors;
        colors.clear();
        colors.resize(count, base);
    }

    fn num_objects(&self) -> usize {
        self.data.num_objects()
    }

    /// Writes one color to every point of an object, without notifying.
    fn write_object_color(&mut self, obj: IndexType, color: Rgba) {
        let Some(range) = self.shape.color_range(obj) else {
            return;
        };
        if let Some(points) = self.shape.colored_mut().colors.get_mut(range.indices()) {
            points.fill(color);
        }
    }

    fn write_colors(&mut self, colors: &[Rgba]) {
        for (obj, &color) in colors.iter().enumerate() {
            self.write_object_color(obj, color);
        }
    }

    /// Sets the color of all points of one object.
    pub fn set_object_color(&mut self, obj: IndexType, color: Rgba) -> Result<()> {
        if obj >= self.num_objects() {
            return Err(ObjectVisError::ObjectIndexOutOfRange {
                index: obj,
                num_objects: self.num_objects(),
            });
        }
        self.write_object_color(obj, color);
        self.notifier.emit(VisEvent::DataChanged);
        Ok(())
    }

    /// Uses one color for all objects, dropping any lookup table.
    pub fn set_color(&mut self, color: Rgba) {
        self.base_color = color;
        self.lut = None;
        self.lut_colors.clear();
        self.update_color_selection_rendering();
    }

    /// Colors objects by mapping the value of column `param_idx` through `lut`.
    pub fn set_lookup_table(&mut self, lut: Arc<LookupTable>, param_idx: usize) -> Result<()> {
        self.data.table.check_column(param_idx)?;
        self.lut_colors = (0..self.num_objects())
            .map(|row| Ok(lut.color(self.data.table.value(row, param_idx)?)))
            .collect::<Result<_>>()?;
        self.lut = Some((lut, param_idx));
        self.update_color_selection_rendering();
        Ok(())
    }

    /// Replaces the selection and recolors.
    ///
    /// `sorted_sel_inds` must be strictly ascending row indices. Cylinders are
    /// re-tessellated when a context diameter factor applies.
    pub fn set_selection(&mut self, sorted_sel_inds: &[usize], selection_active: bool) -> Result<()> {
        validate_selection(sorted_sel_inds, self.num_objects())?;
        self.selection = sorted_sel_inds.to_vec();
        self.selection_active = selection_active;
        let retessellated = match &mut self.shape {
            PolyShape::Cylinder(g) => g.set_selection(sorted_sel_inds, selection_active),
            _ => false,
        };
        if retessellated {
            self.ensure_color_count();
            self.recolor_selection();
            self.notifier.emit(VisEvent::RenderRequired);
        } else {
            self.update_color_selection_rendering();
        }
        Ok(())
    }

    pub fn selection(&self) -> &[usize] {
        &self.selection
    }

    pub fn selection_active(&self) -> bool {
        self.selection_active
    }

    /// Alpha of selected objects; takes effect on the next recolor.
    pub fn set_selection_opacity(&mut self, alpha: u8) {
        self.selection_alpha = alpha;
    }

    /// Alpha of non-selected objects; takes effect on the next recolor.
    pub fn set_context_opacity(&mut self, alpha: u8) {
        self.context_alpha = alpha;
    }

    pub fn selection_opacity(&self) -> u8 {
        self.selection_alpha
    }

    pub fn context_opacity(&self) -> u8 {
        self.context_alpha
    }

    fn recolor_selection(&mut self) {
        let mut cursor = self.selection.iter().peekable();
        let colors: Vec<Rgba> = (0..self.num_objects())
            .map(|obj| {
                let color = self.lut_colors.get(obj).copied().unwrap_or(self.base_color);
                let alpha = if !self.selection_active {
                    self.selection_alpha
                } else if cursor.next_if(|&&sel| sel == obj).is_some() {
                    self.selection_alpha
                } else {
                    self.context_alpha
                };
                color.with_alpha(alpha)
            })
            .collect();
        self.write_colors(&colors);
    }

    /// Recolors every object from the base color or lookup table and the selection.
    ///
    /// Without an active selection all objects get the selection alpha;
    /// otherwise selected objects get the selection alpha and all others the
    /// context alpha.
    pub fn update_color_selection_rendering(&mut self) {
        self.recolor_selection();
        self.notifier.emit(VisEvent::DataChanged);
    }

    /// Keeps the color array sized to the colored geometry after re-tessellation.
    fn ensure_color_count(&mut self) {
        let count = self.shape.colored().num_points();
        let base = self.base_color;
        self.shape.colored_mut().colors.resize(count, base);
    }

    /// Scales cylinder diameters.
    pub fn set_diameter_factor(&mut self, factor: f64) -> Result<()> {
        let PolyShape::Cylinder(g) = &mut self.shape else {
            return Err(ObjectVisError::InvalidConfig(
                "diameter factor only applies to cylinders".into(),
            ));
        };
        let regenerated = g.set_diameter_factor(factor)?;
        self.options.diameter_factor = factor;
        if regenerated {
            self.ensure_color_count();
            self.notifier.emit(VisEvent::RenderRequired);
        }
        Ok(())
    }

    /// Scales the diameters of non-selected cylinders while a selection is shown.
    pub fn set_context_diameter_factor(&mut self, factor: f64) -> Result<()> {
        let PolyShape::Cylinder(g) = &mut self.shape else {
            return Err(ObjectVisError::InvalidConfig(
                "context diameter factor only applies to cylinders".into(),
            ));
        };
        let regenerated = g.set_context_diameter_factor(factor)?;
        self.options.context_diameter_factor = factor;
        if regenerated {
            self.ensure_color_count();
            self.notifier.emit(VisEvent::RenderRequired);
        }
        Ok(())
    }

    /// Builds a standalone mesh for every selected object.
    ///
    /// Only cylinders support this. Each mesh comes from a one-row copy of
    /// the object (with its id set to 1) run through the cylinder pipeline
    /// and colored with `color`.
    pub fn extract_selected_objects(&self, color: Rgba) -> Result<Vec<PolyData>> {
        if !matches!(self.shape, PolyShape::Cylinder(_)) {
            return Err(ObjectVisError::UnsupportedExtraction(self.type_name()));
        }
        let options = VisOptions {
            context_diameter_factor: 1.0,
            ..self.options.clone()
        };
        self.selection
            .iter()
            .map(|&row| {
                let mut single = self.data.single_object(row)?;
                if let Some(id_column) = single.col_mapping.get(ColumnId::Id) {
                    single.table.set_value(0, id_column, 1.0)?;
                }
                let vis = Self::cylinder(Arc::new(single), color, &options)?;
                Ok(vis.shape.colored().clone())
            })
            .collect()
    }

    pub fn vis_type(&self) -> ObjectVisType {
        self.shape.vis_type()
    }

    pub fn shape(&self) -> &PolyShape {
        &self.shape
    }

    pub fn base_color(&self) -> Rgba {
        self.base_color
    }

    /// The installed lookup table and the column it reads.
    pub fn lookup_table(&self) -> Option<(&Arc<LookupTable>, usize)> {
        self.lut.as_ref().map(|(lut, idx)| (lut, *idx))
    }

    pub fn options(&self) -> &VisOptions {
        &self.options
    }

    pub fn poly_data(&self) -> &PolyData {
        self.shape.poly_data()
    }

    pub fn final_poly_data(&self) -> Option<&PolyData> {
        self.shape.final_poly_data()
    }

    /// Geometry with the color array attached, as handed to a renderer.
    pub fn output(&self) -> &PolyData {
        self.shape.colored()
    }

    /// One color per point of [`Self::output`].
    pub fn colors(&self) -> &[Rgba] {
        &self.shape.colored().colors
    }

    /// The color buffer as 4 bytes per point.
    pub fn color_bytes(&self) -> &[u8] {
        self.shape.colored().color_bytes()
    }

    /// Color of the first point of an object.
    pub fn object_color(&self, obj: IndexType) -> Option<Rgba> {
        let range = self.shape.color_range(obj)?;
        self.colors().get(range.start).copied()
    }

    fn row_class(&self, row: IndexType) -> Result<i64> {
        self.data.class_id(row)
    }

    fn paint(&mut self, colors: &[Rgba]) {
        self.write_colors(colors);
        self.notifier.emit(VisEvent::DataChanged);
    }
}

impl PointIndexMap for ColoredPolyObjectVis {
    fn object_count(&self) -> usize {
        self.shape.map().object_count()
    }

    fn point_range(&self, obj: IndexType) -> Option<PointRange> {
        self.shape.map().point_range(obj)
    }

    fn final_point_range(&self, obj: IndexType) -> Option<PointRange> {
        self.shape.map().final_point_range(obj)
    }
}

impl ObjectVisualization for ColoredPolyObjectVis {
    fn type_name(&self) -> &'static str {
        self.shape.vis_type().as_str()
    }

    fn data(&self) -> &Arc<ObjectsData> {
        &self.data
    }

    fn render_selection(
        &mut self,
        sorted_sel_inds: &[usize],
        class_id: i64,
        class_color: Rgba,
        _class_members: &[usize],
    ) -> Result<()> {
        validate_selection(sorted_sel_inds, self.num_objects())?;
        let class_color = if sorted_sel_inds.is_empty() {
            class_color.with_alpha(255)
        } else {
            class_color.with_alpha(TRANSPARENT_ALPHA)
        };
        let mut cursor = sorted_sel_inds.iter().peekable();
        let colors = (0..self.num_objects())
            .map(|row| {
                let selected = cursor.next_if(|&&sel| sel == row).is_some();
                Ok(if selected {
                    SELECTED_COLOR
                } else if self.row_class(row)? == class_id {
                    class_color
                } else {
                    BACK_COLOR
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.selection = sorted_sel_inds.to_vec();
        self.paint(&colors);
        Ok(())
    }

    fn render_single(
        &mut self,
        selected_obj_id: usize,
        class_id: i64,
        class_color: Rgba,
        _class_members: &[usize],
    ) -> Result<()> {
        if selected_obj_id > self.num_objects() {
            return Err(ObjectVisError::ObjectIndexOutOfRange {
                index: selected_obj_id - 1,
                num_objects: self.num_objects(),
            });
        }
        let class_color = if selected_obj_id > 0 {
            class_color.with_alpha(TRANSPARENT_ALPHA)
        } else {
            class_color
        };
        let colors = (0..self.num_objects())
            .map(|row| {
                Ok(if selected_obj_id > 0 && row + 1 == selected_obj_id {
                    SELECTED_COLOR
                } else if self.row_class(row)? == class_id {
                    class_color
                } else {
                    Rgba::TRANSPARENT
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.paint(&colors);
        Ok(())
    }

    fn multi_class_rendering(
        &mut self,
        class_colors: &[Rgba],
        _class_members: &[Vec<usize>],
        _alpha: f64,
    ) -> Result<()> {
        let colors = (0..self.num_objects())
            .map(|row| {
                let class_id = self.row_class(row)?;
                usize::try_from(class_id)
                    .ok()
                    .and_then(|idx| class_colors.get(idx).copied())
                    .ok_or(ObjectVisError::ClassIndexOutOfRange {
                        row,
                        class_id,
                        num_classes: class_colors.len(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        self.paint(&colors);
        Ok(())
    }

    fn render_orientation_distribution(&mut self, image: &Rgb32FImage) -> Result<()> {
        let colors = (0..self.num_objects())
            .map(|row| orientation_color(&self.data, image, row))
            .collect::<Result<Vec<_>>>()?;
        self.paint(&colors);
        Ok(())
    }

    fn render_length_distribution(
        &mut self,
        ctf: &ColorTransferFunction,
        _distribution: &LengthDistribution,
    ) -> Result<()> {
        let colors = (0..self.num_objects())
            .map(|row| length_color(&self.data, ctf, row))
            .collect::<Result<Vec<_>>>()?;
        self.paint(&colors);
        Ok(())
    }

    fn bounds(&self) -> Option<[f64; 6]> {
        self.shape.poly_data().bounds()
    }

    fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }
}
