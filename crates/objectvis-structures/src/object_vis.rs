//! Operations shared by every object visualization, and the factory choosing
//! a visualization for a configured type.

use std::sync::Arc;

use image::Rgb32FImage;
use objectvis_core::{
    channel_to_u8, ColorTransferFunction, ColumnId, DirtyFlags, IndexType, Notifier, ObjectType,
    ObjectVisError, ObjectVisType, ObjectsData, PolyData, Result, Rgba, VisEvent, VisOptions,
};

use crate::colored_poly::ColoredPolyObjectVis;
use crate::labeled_volume::LabeledVolumeVis;

/// Bucketing of object lengths used by [`ObjectVisualization::render_length_distribution`].
#[derive(Debug, Clone, PartialEq)]
pub struct LengthDistribution {
    /// Bucket centers of the length histogram; at least eight are needed.
    pub extents: Vec<f64>,
    /// Half the width of a bucket.
    pub half_inc: f64,
    pub object_type: ObjectType,
    /// Overall length range.
    pub range: [f64; 2],
}

/// Coloring operations understood by every visualization variant.
///
/// Class membership (`class_members`) lists 1-based object ids in ascending
/// order; point-based variants read class ids from the table instead and
/// ignore it.
pub trait ObjectVisualization {
    /// Short name of the variant.
    fn type_name(&self) -> &'static str;

    /// The dataset this visualization was built from.
    fn data(&self) -> &Arc<ObjectsData>;

    /// Highlights the selected rows on top of one class.
    fn render_selection(
        &mut self,
        sorted_sel_inds: &[usize],
        class_id: i64,
        class_color: Rgba,
        class_members: &[usize],
    ) -> Result<()>;

    /// Highlights one object (1-based id, 0 for none) on top of one class.
    fn render_single(
        &mut self,
        selected_obj_id: usize,
        class_id: i64,
        class_color: Rgba,
        class_members: &[usize],
    ) -> Result<()>;

    /// Colors every object by its class.
    fn multi_class_rendering(
        &mut self,
        class_colors: &[Rgba],
        class_members: &[Vec<usize>],
        alpha: f64,
    ) -> Result<()>;

    /// Colors every object by looking up its orientation in a phi/theta color image.
    fn render_orientation_distribution(&mut self, image: &Rgb32FImage) -> Result<()>;

    /// Colors every object by its length.
    fn render_length_distribution(
        &mut self,
        ctf: &ColorTransferFunction,
        distribution: &LengthDistribution,
    ) -> Result<()>;

    /// Bounds as `[xmin, xmax, ymin, ymax, zmin, zmax]`, if known.
    fn bounds(&self) -> Option<[f64; 6]>;

    fn notifier_mut(&mut self) -> &mut Notifier;

    /// Registers a callback for change events.
    fn subscribe(&mut self, observer: impl FnMut(VisEvent) + 'static)
    where
        Self: Sized,
    {
        self.notifier_mut().subscribe(observer);
    }

    /// Returns and clears pending changes.
    fn take_dirty(&mut self) -> DirtyFlags {
        self.notifier_mut().take_dirty()
    }
}

/// Checks that a selection is strictly ascending and refers to existing rows.
pub fn validate_selection(sorted_sel_inds: &[usize], num_objects: usize) -> Result<()> {
    for (position, pair) in sorted_sel_inds.windows(2).enumerate() {
        if pair[0] >= pair[1] {
            return Err(ObjectVisError::UnsortedSelection {
                position: position + 1,
                previous: pair[0],
                value: pair[1],
            });
        }
    }
    match sorted_sel_inds.last() {
        Some(&index) if index >= num_objects => {
            Err(ObjectVisError::ObjectIndexOutOfRange { index, num_objects })
        }
        _ => Ok(()),
    }
}

/// Checks a list of 1-based object ids the same way.
pub(crate) fn validate_object_ids(ids: &[usize], num_objects: usize) -> Result<()> {
    if ids.contains(&0) {
        return Err(ObjectVisError::ObjectIndexOutOfRange {
            index: 0,
            num_objects,
        });
    }
    let zero_based: Vec<usize> = ids.iter().map(|id| id - 1).collect();
    validate_selection(&zero_based, num_objects)
}

/// Opaque color of one object taken from the orientation image at
/// `(floor(theta), floor(phi))`.
pub fn orientation_color(data: &ObjectsData, image: &Rgb32FImage, row: IndexType) -> Result<Rgba> {
    let phi = data.value(row, ColumnId::Phi)?;
    let theta = data.value(row, ColumnId::Theta)?;
    let out_of_range = || ObjectVisError::OrientationOutOfRange {
        phi,
        theta,
        width: image.width(),
        height: image.height(),
    };
    let (x, y) = (theta.floor(), phi.floor());
    if x < 0.0 || y < 0.0 || x.is_nan() || y.is_nan() {
        return Err(out_of_range());
    }
    let pixel = image
        .get_pixel_checked(x as u32, y as u32)
        .ok_or_else(out_of_range)?;
    let [r, g, b] = pixel.0;
    Ok(Rgba::rgb(
        channel_to_u8(f64::from(r)),
        channel_to_u8(f64::from(g)),
        channel_to_u8(f64::from(b)),
    ))
}

/// Opaque color of one object taken from a color transfer function at its length.
pub fn length_color(
    data: &ObjectsData,
    ctf: &ColorTransferFunction,
    row: IndexType,
) -> Result<Rgba> {
    let length = data.value(row, ColumnId::Length)?;
    let [r, g, b] = ctf.color(length);
    Ok(Rgba::from_rgb_f64(r, g, b))
}

/// Visualization that shows nothing and accepts every operation.
#[derive(Debug)]
pub struct NoObjectVis {
    data: Arc<ObjectsData>,
    notifier: Notifier,
}

impl NoObjectVis {
    pub fn new(data: Arc<ObjectsData>) -> Self {
        Self {
            data,
            notifier: Notifier::new(),
        }
    }
}

impl ObjectVisualization for NoObjectVis {
    fn type_name(&self) -> &'static str {
        ObjectVisType::NoVis.as_str()
    }

    fn data(&self) -> &Arc<ObjectsData> {
        &self.data
    }

    fn render_selection(&mut self, _: &[usize], _: i64, _: Rgba, _: &[usize]) -> Result<()> {
        Ok(())
    }

    fn render_single(&mut self, _: usize, _: i64, _: Rgba, _: &[usize]) -> Result<()> {
        Ok(())
    }

    fn multi_class_rendering(&mut self, _: &[Rgba], _: &[Vec<usize>], _: f64) -> Result<()> {
        Ok(())
    }

    fn render_orientation_distribution(&mut self, _: &Rgb32FImage) -> Result<()> {
        Ok(())
    }

    fn render_length_distribution(
        &mut self,
        _: &ColorTransferFunction,
        _: &LengthDistribution,
    ) -> Result<()> {
        Ok(())
    }

    fn bounds(&self) -> Option<[f64; 6]> {
        None
    }

    fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }
}

/// A visualization of one dataset, chosen by [`ObjectVisType`].
#[derive(Debug)]
pub enum ObjectVis {
    Poly(ColoredPolyObjectVis),
    LabeledVolume(LabeledVolumeVis),
    None(NoObjectVis),
}

impl ObjectVis {
    /// Builds the visualization of `data` for the given type.
    pub fn create(
        data: Arc<ObjectsData>,
        vis_type: ObjectVisType,
        color: Rgba,
        options: &VisOptions,
    ) -> Result<Self> {
        let vis = match vis_type {
            ObjectVisType::UseVolume => {
                Self::LabeledVolume(LabeledVolumeVis::new(data, options.volume_bounds))
            }
            ObjectVisType::Line => Self::Poly(ColoredPolyObjectVis::line(data, color, options)?),
            ObjectVisType::Cylinder => {
                Self::Poly(ColoredPolyObjectVis::cylinder(data, color, options)?)
            }
            ObjectVisType::Ellipsoid => {
                Self::Poly(ColoredPolyObjectVis::ellipsoid(data, color, options)?)
            }
            ObjectVisType::NoVis => Self::None(NoObjectVis::new(data)),
        };
        log::info!(
            "created {} visualization for {} objects",
            vis.type_name(),
            vis.data().num_objects()
        );
        Ok(vis)
    }

    /// The type this visualization was created for.
    pub fn vis_type(&self) -> ObjectVisType {
        match self {
            Self::Poly(poly) => poly.vis_type(),
            Self::LabeledVolume(_) => ObjectVisType::UseVolume,
            Self::None(_) => ObjectVisType::NoVis,
        }
    }

    pub fn as_poly(&self) -> Option<&ColoredPolyObjectVis> {
        match self {
            Self::Poly(poly) => Some(poly),
            _ => None,
        }
    }

    pub fn as_poly_mut(&mut self) -> Option<&mut ColoredPolyObjectVis> {
        match self {
            Self::Poly(poly) => Some(poly),
            _ => None,
        }
    }

    pub fn as_labeled_volume(&self) -> Option<&LabeledVolumeVis> {
        match self {
            Self::LabeledVolume(volume) => Some(volume),
            _ => None,
        }
    }

    /// Isolated meshes of the selected objects, for variants that support it.
    pub fn extract_selected_objects(&self, color: Rgba) -> Result<Vec<PolyData>> {
        match self {
            Self::Poly(poly) => poly.extract_selected_objects(color),
            _ => Err(ObjectVisError::UnsupportedExtraction(self.type_name())),
        }
    }
}

macro_rules! dispatch {
    ($vis:expr, $inner:ident => $call:expr) => {
        match $vis {
            ObjectVis::Poly($inner) => $call,
            ObjectVis::LabeledVolume($inner) => $call,
            ObjectVis::None($inner) => $call,
        }
    };
}

impl ObjectVisualization for ObjectVis {
    fn type_name(&self) -> &'static str {
        dispatch!(self, v => v.type_name())
    }

    fn data(&self) -> &Arc<ObjectsData> {
        dispatch!(self, v => v.data())
    }

    fn render_selection(
        &mut self,
        sorted_sel_inds: &[usize],
        class_id: i64,
        class_color: Rgba,
        class_members: &[usize],
    ) -> Result<()> {
        dispatch!(self, v => v.render_selection(
            sorted_sel_inds,
            class_id,
            class_color,
            class_members
        ))
    }

    fn render_single(
        &mut self,
        selected_obj_id: usize,
        class_id: i64,
        class_color: Rgba,
        class_members: &[usize],
    ) -> Result<()> {
        dispatch!(self, v => v.render_single(
            selected_obj_id,
            class_id,
            class_color,
            class_members
        ))
    }

    fn multi_class_rendering(
        &mut self,
        class_colors: &[Rgba],
        class_members: &[Vec<usize>],
        alpha: f64,
    ) -> Result<()> {
        dispatch!(self, v => v.multi_class_rendering(class_colors, class_members, alpha))
    }

    fn render_orientation_distribution(&mut self, image: &Rgb32FImage) -> Result<()> {
        dispatch!(self, v => v.render_orientation_distribution(image))
    }

    fn render_length_distribution(
        &mut self,
        ctf: &ColorTransferFunction,
        distribution: &LengthDistribution,
    ) -> Result<()> {
        dispatch!(self, v => v.render_length_distribution(ctf, distribution))
    }

    fn bounds(&self) -> Option<[f64; 6]> {
        dispatch!(self, v => v.bounds())
    }

    fn notifier_mut(&mut self) -> &mut Notifier {
        dispatch!(self, v => v.notifier_mut())
    }
}
