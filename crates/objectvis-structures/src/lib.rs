//! Object visualizations for objectvis-rs.
//!
//! This crate provides the visualization variants of an object table:
//! - Lines (straight or curved fibers)
//! - Cylinders (tubes tessellated around the fiber polylines)
//! - Ellipsoids (pores around their center)
//! - Labeled volumes (transfer functions keyed by object label)
//!
//! Point-based variants share [`ColoredPolyObjectVis`], which keeps one color
//! per object in a flat per-point buffer addressed through a [`PointIndexMap`].

// Geometry code uses casts for indices, labels, and coordinates
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]

pub mod colored_poly;
pub mod cylinder;
pub mod ellipsoid;
pub mod labeled_volume;
pub mod line;
pub mod object_vis;
pub mod point_map;
pub mod tube;

pub use colored_poly::{ColoredPolyObjectVis, PolyShape};
pub use cylinder::CylinderGeometry;
pub use ellipsoid::{ellipsoid_point_count, EllipsoidGeometry, MIN_ELLIPSOID_RESOLUTION};
pub use labeled_volume::LabeledVolumeVis;
pub use line::{curved_point_count, sample_curved, LineGeometry};
pub use object_vis::{
    length_color, orientation_color, validate_selection, LengthDistribution, NoObjectVis,
    ObjectVis, ObjectVisualization,
};
pub use point_map::{contiguous_ranges, PointIndexMap, PointRange};
pub use tube::{TubeTessellator, MIN_TUBE_SIDES};
