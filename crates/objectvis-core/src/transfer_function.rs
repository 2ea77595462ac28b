//! Piecewise color and opacity functions used to render labeled volumes.

/// A control node of a piecewise function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TfNode<const N: usize> {
    pub x: f64,
    pub value: [f64; N],
    /// Position between this node and the next where the value is halfway.
    pub midpoint: f64,
    /// 0 interpolates linearly, 1 steps at the midpoint.
    pub sharpness: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct Nodes<const N: usize> {
    nodes: Vec<TfNode<N>>,
    clamping: bool,
}

impl<const N: usize> Default for Nodes<N> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            clamping: true,
        }
    }
}

impl<const N: usize> Nodes<N> {
    fn add(&mut self, x: f64, value: [f64; N], midpoint: f64, sharpness: f64) {
        let node = TfNode {
            x,
            value,
            midpoint: midpoint.clamp(0.00001, 0.99999),
            sharpness: sharpness.clamp(0.0, 1.0),
        };
        // an existing node at the same position is replaced
        self.nodes.retain(|n| n.x != x);
        let pos = self.nodes.partition_point(|n| n.x < x);
        self.nodes.insert(pos, node);
    }

    fn range(&self) -> [f64; 2] {
        match (self.nodes.first(), self.nodes.last()) {
            (Some(first), Some(last)) => [first.x, last.x],
            _ => [0.0, 0.0],
        }
    }

    fn evaluate(&self, x: f64) -> [f64; N] {
        let (Some(first), Some(last)) = (self.nodes.first(), self.nodes.last()) else {
            return [0.0; N];
        };
        if x.is_nan() {
            return [0.0; N];
        }
        if x < first.x {
            return if self.clamping { first.value } else { [0.0; N] };
        }
        if x > last.x {
            return if self.clamping { last.value } else { [0.0; N] };
        }
        let upper = self.nodes.partition_point(|n| n.x <= x);
        if upper == self.nodes.len() {
            return last.value;
        }
        let left = &self.nodes[upper - 1];
        let right = &self.nodes[upper];
        let s = (x - left.x) / (right.x - left.x);
        let mut out = [0.0; N];
        for (c, o) in out.iter_mut().enumerate() {
            *o = interpolate(left.value[c], right.value[c], s, left.midpoint, left.sharpness);
        }
        out
    }

    /// Makes sure the nodes span at least `range`.
    fn ensure_covers(&mut self, range: [f64; 2]) {
        if self.nodes.is_empty() {
            self.add(range[0], [0.0; N], 0.5, 0.0);
        }
        let [lo, hi] = self.range();
        if range[0] < lo {
            let v = self.nodes[0].value;
            self.add(range[0], v, 0.5, 0.0);
        }
        if range[1] > hi {
            let v = self.nodes[self.nodes.len() - 1].value;
            self.add(range[1], v, 0.5, 0.0);
        }
    }
}

fn interpolate(y1: f64, y2: f64, s: f64, midpoint: f64, sharpness: f64) -> f64 {
    let s = if s < midpoint {
        0.5 * s / midpoint
    } else {
        0.5 + 0.5 * (s - midpoint) / (1.0 - midpoint)
    };
    if sharpness > 0.99 {
        return if s < 0.5 { y1 } else { y2 };
    }
    if sharpness < 0.01 {
        return y1 + s * (y2 - y1);
    }
    let ss = s * s;
    let sss = ss * s;
    let h1 = 2.0 * sss - 3.0 * ss + 1.0;
    let h2 = -2.0 * sss + 3.0 * ss;
    let h3 = sss - 2.0 * ss + s;
    let h4 = sss - ss;
    let t = (1.0 - sharpness) * (y2 - y1);
    let v = h1 * y1 + h2 * y2 + h3 * t + h4 * t;
    v.clamp(y1.min(y2), y1.max(y2))
}

/// Maps a scalar to an RGB color.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorTransferFunction(Nodes<3>);

impl ColorTransferFunction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a linearly interpolated node.
    pub fn add_rgb_point(&mut self, x: f64, r: f64, g: f64, b: f64) {
        self.0.add(x, [r, g, b], 0.5, 0.0);
    }

    /// Adds a node with explicit midpoint and sharpness.
    pub fn add_rgb_point_ext(&mut self, x: f64, rgb: [f64; 3], midpoint: f64, sharpness: f64) {
        self.0.add(x, rgb, midpoint, sharpness);
    }

    pub fn remove_all_points(&mut self) {
        self.0.nodes.clear();
    }

    pub fn set_clamping(&mut self, clamping: bool) {
        self.0.clamping = clamping;
    }

    pub fn clamping(&self) -> bool {
        self.0.clamping
    }

    pub fn nodes(&self) -> &[TfNode<3>] {
        &self.0.nodes
    }

    pub fn num_points(&self) -> usize {
        self.0.nodes.len()
    }

    /// Position of the first and last node.
    pub fn range(&self) -> [f64; 2] {
        self.0.range()
    }

    /// Color at `x`.
    pub fn color(&self, x: f64) -> [f64; 3] {
        self.0.evaluate(x)
    }
}

/// Maps a scalar to an opacity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PiecewiseFunction(Nodes<1>);

impl PiecewiseFunction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a linearly interpolated node.
    pub fn add_point(&mut self, x: f64, y: f64) {
        self.0.add(x, [y], 0.5, 0.0);
    }

    /// Adds a node with explicit midpoint and sharpness.
    pub fn add_point_ext(&mut self, x: f64, y: f64, midpoint: f64, sharpness: f64) {
        self.0.add(x, [y], midpoint, sharpness);
    }

    pub fn remove_all_points(&mut self) {
        self.0.nodes.clear();
    }

    pub fn set_clamping(&mut self, clamping: bool) {
        self.0.clamping = clamping;
    }

    pub fn clamping(&self) -> bool {
        self.0.clamping
    }

    pub fn nodes(&self) -> &[TfNode<1>] {
        &self.0.nodes
    }

    pub fn num_points(&self) -> usize {
        self.0.nodes.len()
    }

    pub fn range(&self) -> [f64; 2] {
        self.0.range()
    }

    /// Opacity at `x`.
    pub fn value(&self, x: f64) -> f64 {
        self.0.evaluate(x)[0]
    }
}

/// A color function paired with an opacity function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferFunction {
    pub color: ColorTransferFunction,
    pub opacity: PiecewiseFunction,
}

impl TransferFunction {
    /// A grayscale ramp over `range`, fully transparent at the low end.
    pub fn ramp(range: [f64; 2]) -> Self {
        let mut tf = Self::default();
        tf.color.add_rgb_point(range[0], 0.0, 0.0, 0.0);
        tf.color.add_rgb_point(range[1], 1.0, 1.0, 1.0);
        tf.opacity.add_point(range[0], 0.0);
        tf.opacity.add_point(range[1], 1.0);
        tf
    }

    /// Removes all nodes of both functions.
    pub fn clear(&mut self) {
        self.color.remove_all_points();
        self.opacity.remove_all_points();
    }

    /// Sets clamping on both functions.
    pub fn set_clamping(&mut self, clamping: bool) {
        self.color.set_clamping(clamping);
        self.opacity.set_clamping(clamping);
    }

    /// Adds an opacity node and a color node at the same position.
    pub fn add_point(&mut self, x: f64, opacity: f64, rgb: [f64; 3]) {
        self.opacity.add_point(x, opacity);
        self.color.add_rgb_point(x, rgb[0], rgb[1], rgb[2]);
    }

    /// Extends both functions so they span `prev_range`.
    pub fn ensure_validity(&mut self, prev_range: [f64; 2]) {
        self.color.0.ensure_covers(prev_range);
        self.opacity.0.ensure_covers(prev_range);
    }
}
