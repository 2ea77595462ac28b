//! Color maps and lookup tables for scalar-driven object coloring.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::color::Rgba;

/// A color map for mapping normalized scalar values to colors.
#[derive(Debug, Clone)]
pub struct ColorMap {
    /// Color map name.
    pub name: String,
    /// Color samples (evenly spaced from 0 to 1).
    pub colors: Vec<Vec3>,
}

impl ColorMap {
    /// Creates a new color map.
    pub fn new(name: impl Into<String>, colors: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            colors,
        }
    }

    /// Samples the color map at a given value (0 to 1).
    pub fn sample(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);

        match self.colors.len() {
            0 => Vec3::ZERO,
            1 => self.colors[0],
            len => {
                let n = len - 1;
                let idx = ((t * n as f32).floor() as usize).min(n - 1);
                let frac = t * n as f32 - idx as f32;
                self.colors[idx].lerp(self.colors[idx + 1], frac)
            }
        }
    }
}

/// Named color maps, iterated in name order.
#[derive(Debug, Default)]
pub struct ColorMapRegistry {
    color_maps: BTreeMap<String, ColorMap>,
}

impl ColorMapRegistry {
    /// Creates a registry holding the built-in color maps.
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register(ColorMap::new(
            "viridis",
            vec![
                Vec3::new(0.267, 0.004, 0.329),
                Vec3::new(0.253, 0.265, 0.529),
                Vec3::new(0.163, 0.471, 0.558),
                Vec3::new(0.134, 0.658, 0.517),
                Vec3::new(0.477, 0.821, 0.318),
                Vec3::new(0.993, 0.906, 0.144),
            ],
        ));
        registry.register(ColorMap::new("gray", vec![Vec3::ZERO, Vec3::ONE]));
        registry.register(ColorMap::new(
            "rainbow",
            vec![
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(0.0, 1.0, 1.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
            ],
        ));
        registry
    }

    pub fn register(&mut self, color_map: ColorMap) {
        self.color_maps.insert(color_map.name.clone(), color_map);
    }

    pub fn get(&self, name: &str) -> Option<&ColorMap> {
        self.color_maps.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.color_maps.keys().map(String::as_str)
    }
}

/// A discrete table mapping a scalar range onto a list of colors.
///
/// Values below the range map to the first entry, values above to the last.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    range: [f64; 2],
    colors: Vec<Rgba>,
}

impl LookupTable {
    /// Creates a lookup table from explicit colors.
    pub fn new(range: [f64; 2], colors: Vec<Rgba>) -> Self {
        Self { range, colors }
    }

    /// Samples `count` opaque colors from a color map over `range`.
    pub fn from_color_map(color_map: &ColorMap, count: usize, range: [f64; 2]) -> Self {
        let colors = (0..count)
            .map(|i| {
                let t = if count > 1 {
                    i as f32 / (count - 1) as f32
                } else {
                    0.0
                };
                Rgba::from_vec3(color_map.sample(t))
            })
            .collect();
        Self::new(range, colors)
    }

    /// The scalar range covered by this table.
    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    /// The table entries.
    pub fn colors(&self) -> &[Rgba] {
        &self.colors
    }

    /// Number of table entries.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Maps a scalar value to its table entry; an empty table yields transparent black.
    pub fn color(&self, value: f64) -> Rgba {
        let Some(last) = self.colors.len().checked_sub(1) else {
            return Rgba::TRANSPARENT;
        };
        let width = self.range[1] - self.range[0];
        if width <= 0.0 || value.is_nan() {
            return self.colors[0];
        }
        let t = (value - self.range[0]) / width;
        let idx = (t * self.colors.len() as f64).floor();
        if idx <= 0.0 {
            self.colors[0]
        } else {
            self.colors[(idx as usize).min(last)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_map_sample_endpoints() {
        let registry = ColorMapRegistry::new();
        let map = registry.get("rainbow").expect("rainbow missing");
        assert_eq!(map.sample(0.0), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(map.sample(1.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(map.sample(-3.0), map.sample(0.0));
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["gray", "rainbow", "viridis"]
        );
    }

    #[test]
    fn test_lookup_table_buckets() {
        let lut = LookupTable::new(
            [0.0, 10.0],
            vec![Rgba::rgb(1, 0, 0), Rgba::rgb(2, 0, 0), Rgba::rgb(3, 0, 0)],
        );
        assert_eq!(lut.color(-5.0), Rgba::rgb(1, 0, 0));
        assert_eq!(lut.color(0.0), Rgba::rgb(1, 0, 0));
        assert_eq!(lut.color(4.0), Rgba::rgb(2, 0, 0));
        assert_eq!(lut.color(9.9), Rgba::rgb(3, 0, 0));
        assert_eq!(lut.color(10.0), Rgba::rgb(3, 0, 0));
        assert_eq!(lut.color(100.0), Rgba::rgb(3, 0, 0));
    }

    #[test]
    fn test_lookup_table_from_color_map() {
        let map = ColorMap::new("bw", vec![Vec3::ZERO, Vec3::ONE]);
        let lut = LookupTable::from_color_map(&map, 2, [0.0, 1.0]);
        assert_eq!(lut.colors(), &[Rgba::BLACK, Rgba::WHITE]);
    }

    #[test]
    fn test_empty_lookup_table() {
        let lut = LookupTable::new([0.0, 1.0], Vec::new());
        assert!(lut.is_empty());
        assert_eq!(lut.color(0.5), Rgba::TRANSPARENT);
    }

    proptest::proptest! {
        #[test]
        fn lookup_table_is_monotonic(a in -50.0f64..50.0, b in -50.0f64..50.0, n in 1usize..16) {
            let colors: Vec<Rgba> = (0..n).map(|i| Rgba::rgb(i as u8, 0, 0)).collect();
            let lut = LookupTable::new([-10.0, 10.0], colors);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            proptest::prop_assert!(lut.color(lo).r <= lut.color(hi).r);
        }
    }
}
