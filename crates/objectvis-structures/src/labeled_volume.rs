//! Object highlighting in a labeled volume through its transfer function.
//!
//! Voxels of object `i` (0-based row) carry the label `i + 1`. Instead of
//! coloring points, every operation rebuilds the color and opacity transfer
//! functions so that only the requested labels are visible. Labels are
//! painted as "teeth": a ramp up from `id - 0.5`, the value at `id`, and a
//! ramp down to `id + 0.3`. Runs of consecutive labels share one tooth.

use std::sync::Arc;

use image::Rgb32FImage;
use objectvis_core::{
    ColorTransferFunction, ColumnId, Notifier, ObjectType, ObjectVisError, ObjectVisType,
    ObjectsData, Result, Rgba, TransferFunction, VisEvent, SELECTED_COLOR,
};

use crate::object_vis::{
    length_color, orientation_color, validate_object_ids, validate_selection, LengthDistribution,
    ObjectVisualization,
};

/// Opacity of highlighted labels.
const LABEL_ALPHA: f64 = 0.5;

/// Opacity between class teeth in multi-class rendering.
const MULTI_CLASS_BACK_ALPHA: f64 = 0.00005;

/// Number of length buckets read by the length distribution.
const LENGTH_BUCKETS: usize = 8;

/// Adds step nodes (midpoint 0.5, sharpness 1) to a transfer function.
struct Painter<'a> {
    tf: &'a mut TransferFunction,
}

impl Painter<'_> {
    fn opacity(&mut self, x: f64, alpha: f64) {
        self.tf.opacity.add_point_ext(x, alpha, 0.5, 1.0);
    }

    fn color(&mut self, x: f64, rgb: [f64; 3]) {
        self.tf.color.add_rgb_point_ext(x, rgb, 0.5, 1.0);
    }

    /// One isolated label.
    fn tooth(&mut self, id: f64, rgb: [f64; 3], alpha: f64, back: ([f64; 3], f64)) {
        self.opacity(id - 0.5, back.1);
        self.opacity(id, alpha);
        self.opacity(id + 0.3, back.1);
        self.color(id - 0.5, back.0);
        self.color(id, rgb);
        self.color(id + 0.3, back.0);
    }

    /// Every label in `ids` in one color; returns the last label painted.
    fn class_teeth(
        &mut self,
        ids: &[usize],
        rgb: [f64; 3],
        alpha: f64,
        back: ([f64; 3], f64),
    ) -> usize {
        for run in consecutive_runs(ids) {
            let (first, last) = (run[0] as f64, run[run.len() - 1] as f64);
            if run.len() == 1 {
                self.tooth(first, rgb, alpha, back);
                continue;
            }
            self.opacity(first - 0.5, back.1);
            self.opacity(first, alpha);
            self.color(first - 0.5, back.0);
            self.color(first, rgb);

            self.opacity(last, alpha);
            self.opacity(last + 0.3, back.1);
            self.color(last, rgb);
            self.color(last + 0.3, back.0);
        }
        ids.last().copied().unwrap_or(0)
    }
}

/// Splits ascending ids into runs of consecutive values.
fn consecutive_runs(ids: &[usize]) -> impl Iterator<Item = &[usize]> {
    let mut rest = ids;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let len = rest
            .windows(2)
            .position(|w| w[1] != w[0] + 1)
            .map_or(rest.len(), |p| p + 1);
        let (run, tail) = rest.split_at(len);
        rest = tail;
        Some(run)
    })
}

/// Opacity of an object of the given length, or `None` to leave it invisible.
fn length_opacity(length: f64, distribution: &LengthDistribution) -> Option<f64> {
    let e = |i: usize| distribution.extents[i] + distribution.half_inc;
    let low = distribution.range[0];
    match distribution.object_type {
        ObjectType::Fibers => {
            if length >= low && length < e(0) {
                Some(1.0)
            } else if length >= e(0) && length < e(1) {
                Some(0.03)
            } else if length >= e(1) && length < e(2) {
                Some(0.03)
            } else if length >= e(2) && length < e(5) {
                Some(0.015)
            } else if length >= e(5) && length <= e(7) {
                Some(1.0)
            } else {
                None
            }
        }
        ObjectType::Voids => {
            if (length >= low && length < e(0))
                || (length >= e(0) && length < e(1))
                || (length >= e(5) && length <= e(2))
            {
                Some(0.5)
            } else {
                None
            }
        }
    }
}

/// A labeled volume whose transfer function highlights objects by label.
#[derive(Debug)]
pub struct LabeledVolumeVis {
    data: Arc<ObjectsData>,
    tf: TransferFunction,
    bounds: [f64; 6],
    notifier: Notifier,
}

impl LabeledVolumeVis {
    /// Starts from a grayscale ramp over all labels.
    pub fn new(data: Arc<ObjectsData>, bounds: [f64; 6]) -> Self {
        let tf = TransferFunction::ramp([0.0, data.num_objects() as f64]);
        Self::with_transfer_function(data, tf, bounds)
    }

    /// Uses an existing transfer function, e.g. the one the volume is rendered with.
    pub fn with_transfer_function(
        data: Arc<ObjectsData>,
        tf: TransferFunction,
        bounds: [f64; 6],
    ) -> Self {
        Self {
            data,
            tf,
            bounds,
            notifier: Notifier::new(),
        }
    }

    pub fn transfer_function(&self) -> &TransferFunction {
        &self.tf
    }

    fn num_objects(&self) -> usize {
        self.data.num_objects()
    }

    /// Clears the transfer function and returns its previous range.
    fn reset_tf(&mut self, clamping: Option<bool>) -> [f64; 2] {
        let prev_range = self.tf.color.range();
        self.tf.clear();
        if let Some(clamping) = clamping {
            self.tf.set_clamping(clamping);
        }
        prev_range
    }

    fn finish(&mut self, prev_range: [f64; 2]) {
        self.tf.ensure_validity(prev_range);
        log::debug!(
            "labeled volume transfer function now has {} color / {} opacity nodes",
            self.tf.color.num_points(),
            self.tf.opacity.num_points()
        );
        self.notifier.emit(VisEvent::RenderRequired);
    }
}

impl ObjectVisualization for LabeledVolumeVis {
    fn type_name(&self) -> &'static str {
        ObjectVisType::UseVolume.as_str()
    }

    fn data(&self) -> &Arc<ObjectsData> {
        &self.data
    }

    fn render_selection(
        &mut self,
        sorted_sel_inds: &[usize],
        _class_id: i64,
        class_color: Rgba,
        class_members: &[usize],
    ) -> Result<()> {
        let n = self.num_objects();
        validate_selection(sorted_sel_inds, n)?;
        validate_object_ids(class_members, n)?;

        let back = (Rgba::new(128, 128, 128, 0).rgb_f64(), 0.0);
        let sel_rgb = SELECTED_COLOR.rgb_f64();
        let class_rgb = class_color.rgb_f64();
        let alpha = LABEL_ALPHA;

        let prev_range = self.reset_tf(Some(false));
        let mut p = Painter { tf: &mut self.tf };
        p.opacity(0.0, back.1);
        p.color(0.0, back.0);

        let mut cursor = sorted_sel_inds.iter().peekable();
        let mut starting = false;
        let mut prev_selected = false;
        for (j, &id) in class_members.iter().enumerate() {
            while cursor.next_if(|&&sel| sel + 1 < id).is_some() {}
            let selected = cursor.next_if(|&&sel| sel + 1 == id).is_some();
            let rgb = if selected { sel_rgb } else { class_rgb };
            let prev_rgb = if prev_selected { sel_rgb } else { class_rgb };
            let h = id as f64;

            match class_members.get(j + 1) {
                None if starting => {
                    p.opacity(h - 1.0 + 0.3, alpha);
                    p.opacity(h - 0.5, alpha);
                    p.opacity(h, alpha);
                    p.opacity(h + 0.3, back.1);
                    p.color(h - 0.5, rgb);
                    p.color(h, rgb);
                    p.color(h + 0.3, back.0);
                    p.color(h - 1.0 + 0.3, prev_rgb);
                }
                None => p.tooth(h, rgb, alpha, back),
                Some(&next) if next > id + 1 && !starting => p.tooth(h, rgb, alpha, back),
                Some(_) if !starting => {
                    starting = true;
                    p.opacity(h - 0.5, back.1);
                    p.opacity(h, alpha);
                    p.color(h - 0.5, back.0);
                    p.color(h, rgb);
                }
                Some(&next) if next == id + 1 => {
                    // inside a run, only selection boundaries need nodes
                    if selected != prev_selected {
                        p.color(h - 1.0 + 0.3, prev_rgb);
                        p.color(h - 0.5, rgb);
                        p.color(h + 0.3, rgb);
                        p.opacity(h - 1.0 + 0.3, alpha);
                        p.opacity(h - 0.5, alpha);
                        p.opacity(h + 0.3, alpha);
                    }
                }
                Some(_) => {
                    starting = false;
                    p.opacity(h - 1.0 + 0.3, alpha);
                    p.opacity(h - 0.5, alpha);
                    p.opacity(h, alpha);
                    p.opacity(h + 0.3, back.1);
                    p.color(h - 1.0 + 0.3, prev_rgb);
                    p.color(h - 0.5, rgb);
                    p.color(h, rgb);
                    p.color(h + 0.3, back.0);
                }
            }
            prev_selected = selected;
        }

        let last = class_members.last().copied().unwrap_or(0);
        if last < n {
            p.opacity(n as f64 + 0.3, back.1);
            p.color(n as f64 + 0.3, back.0);
        }
        self.finish(prev_range);
        Ok(())
    }

    fn render_single(
        &mut self,
        selected_obj_id: usize,
        _class_id: i64,
        class_color: Rgba,
        class_members: &[usize],
    ) -> Result<()> {
        let n = self.num_objects();
        if selected_obj_id > n {
            return Err(ObjectVisError::ObjectIndexOutOfRange {
                index: selected_obj_id - 1,
                num_objects: n,
            });
        }
        validate_object_ids(class_members, n)?;

        let rgb = class_color.rgb_f64();
        let back = ([0.0; 3], 0.0);
        let prev_range = self.reset_tf(Some(false));
        self.tf.opacity.add_point(0.0, back.1);
        self.tf.color.add_rgb_point(0.0, 0.0, 0.0, 0.0);

        if selected_obj_id > 0 {
            let id = selected_obj_id as f64;
            let tf = &mut self.tf;
            tf.add_point(id - 0.5, back.1, back.0);
            tf.add_point(id - 0.49, LABEL_ALPHA, rgb);
            tf.add_point(id, LABEL_ALPHA, rgb);
            if selected_obj_id < n {
                tf.add_point(id + 0.3, back.1, back.0);
                tf.add_point(id + 0.29, LABEL_ALPHA, rgb);
            }
        } else {
            let mut p = Painter { tf: &mut self.tf };
            let last = p.class_teeth(class_members, rgb, LABEL_ALPHA, back);
            if last < n {
                p.opacity(n as f64 + 0.3, back.1);
                p.color(n as f64 + 0.3, back.0);
            }
        }
        self.finish(prev_range);
        Ok(())
    }

    fn multi_class_rendering(
        &mut self,
        class_colors: &[Rgba],
        class_members: &[Vec<usize>],
        alpha: f64,
    ) -> Result<()> {
        let n = self.num_objects();
        if class_members.len() != class_colors.len() {
            return Err(ObjectVisError::SizeMismatch {
                expected: class_colors.len(),
                actual: class_members.len(),
            });
        }
        for members in class_members {
            validate_object_ids(members, n)?;
        }

        let back_rgb = class_colors.first().map_or([0.0; 3], |c| c.rgb_f64());
        let back = (back_rgb, MULTI_CLASS_BACK_ALPHA);
        let prev_range = self.reset_tf(Some(false));
        self.tf.add_point(0.0, back.1, back.0);

        let mut p = Painter { tf: &mut self.tf };
        for (color, members) in class_colors.iter().zip(class_members) {
            p.class_teeth(members, color.rgb_f64(), alpha, back);
        }
        p.opacity(n as f64 + 0.3, back.1);
        p.color(n as f64 + 0.3, back.0);
        self.finish(prev_range);
        Ok(())
    }

    fn render_orientation_distribution(&mut self, image: &Rgb32FImage) -> Result<()> {
        let colors = (0..self.num_objects())
            .map(|row| orientation_color(&self.data, image, row))
            .collect::<Result<Vec<_>>>()?;
        let prev_range = self.reset_tf(None);
        self.tf.add_point(0.0, 0.0, [0.0; 3]);
        for (row, color) in colors.iter().enumerate() {
            self.tf
                .add_point(row as f64 + 1.0, LABEL_ALPHA, color.rgb_f64());
        }
        self.finish(prev_range);
        Ok(())
    }

    fn render_length_distribution(
        &mut self,
        ctf: &ColorTransferFunction,
        distribution: &LengthDistribution,
    ) -> Result<()> {
        if distribution.extents.len() < LENGTH_BUCKETS {
            return Err(ObjectVisError::SizeMismatch {
                expected: LENGTH_BUCKETS,
                actual: distribution.extents.len(),
            });
        }
        let objects = (0..self.num_objects())
            .map(|row| {
                let length = self.data.value(row, ColumnId::Length)?;
                Ok((length, length_color(&self.data, ctf, row)?))
            })
            .collect::<Result<Vec<_>>>()?;

        let prev_range = self.reset_tf(None);
        self.tf.add_point(0.0, 0.0, [0.0; 3]);
        for (row, (length, color)) in objects.iter().enumerate() {
            let x = row as f64 + 1.0;
            if let Some(opacity) = length_opacity(*length, distribution) {
                self.tf.opacity.add_point(x - 0.5, 0.0);
                self.tf.opacity.add_point(x + 0.3, 0.0);
                self.tf.opacity.add_point(x, opacity);
            }
            let [r, g, b] = color.rgb_f64();
            for pos in [x, x - 0.5, x + 0.3] {
                self.tf.color.add_rgb_point(pos, r, g, b);
            }
        }
        self.finish(prev_range);
        Ok(())
    }

    fn bounds(&self) -> Option<[f64; 6]> {
        Some(self.bounds)
    }

    fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }
}
