//! objectvis-rs: per-object coloring and selection for fiber and pore visualizations.
//!
//! A table of geometric objects (fibers, pores) is turned into one flat point
//! buffer per visualization. Every coloring operation computes one color per
//! object and writes it to all points belonging to that object.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use objectvis::*;
//!
//! fn main() -> Result<()> {
//!     let table = ObjectTable::from_rows(vec![
//!         vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0],
//!         vec![0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0],
//!     ])?;
//!     let mapping = ColumnMapping::new()
//!         .with(ColumnId::StartX, 0)
//!         .with(ColumnId::StartY, 1)
//!         .with(ColumnId::StartZ, 2)
//!         .with(ColumnId::EndX, 3)
//!         .with(ColumnId::EndY, 4)
//!         .with(ColumnId::EndZ, 5);
//!     let data = ObjectsData::new(ObjectType::Fibers, table, Arc::new(mapping))?;
//!
//!     let mut registry = Registry::new();
//!     let vis = registry.load(
//!         "fibers",
//!         Arc::new(data),
//!         ObjectVisType::Line,
//!         Rgba::rgb(255, 0, 0),
//!         &VisOptions::default(),
//!     )?;
//!     if let Some(lines) = vis.as_poly_mut() {
//!         lines.set_selection(&[1], true)?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Visualizations
//!
//! - [`ColoredPolyObjectVis`] - lines, cylinders and ellipsoids with a per-point color buffer
//! - [`LabeledVolumeVis`] - a transfer function highlighting labels of a labeled volume
//! - [`ObjectVis`] - the variant chosen for an [`ObjectVisType`]

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

pub mod actor;
pub mod export;
pub mod registry;

// Re-export core types
pub use objectvis_core::{
    channel_to_u8, ColorMap, ColorMapRegistry, ColorTransferFunction, ColumnId, ColumnMapping,
    CsvConfig, DirtyFlags, IndexType, LookupTable, Notifier, ObjectTable, ObjectType,
    ObjectVisError, ObjectVisType, ObjectsData, PiecewiseFunction, PolyData, Result, Rgba,
    TransferFunction, Vec3, VisEvent, VisOptions, AUTO_ID_COLUMN_NAME, CLASS_ID_COLUMN_NAME,
    COLORS_ARRAY_NAME, DEFAULT_CONTEXT_OPACITY, DEFAULT_SELECTION_OPACITY,
    ORIGINAL_IDS_ARRAY_NAME, SELECTED_COLOR, TRANSPARENT_ALPHA,
};

// Re-export structures
pub use objectvis_structures::{
    ellipsoid_point_count, ColoredPolyObjectVis, CylinderGeometry, EllipsoidGeometry,
    LabeledVolumeVis, LengthDistribution, LineGeometry, NoObjectVis, ObjectVis,
    ObjectVisualization, PointIndexMap, PointRange, PolyShape, TubeTessellator,
};

// Orientation color images
pub use image::Rgb32FImage;

pub use actor::{PolyObjectActor, Renderer, RendererRef};
pub use export::{save_ply, write_ply};
pub use registry::Registry;

/// Initializes logging from the `RUST_LOG` environment variable.
///
/// Safe to call more than once; later calls keep the first logger.
pub fn init_logging() {
    if env_logger::try_init().is_ok() {
        log::info!("objectvis-rs logging initialized");
    }
}
