//! Core data model for objectvis-rs.
//!
//! This crate provides the types shared by every object visualization:
//! - [`ObjectTable`] and [`ColumnMapping`] describing a table of fibers or pores
//! - [`ObjectsData`], the immutable dataset shared by all visualizations built from it
//! - [`Rgba`] colors, [`LookupTable`]s and [`ColorMap`]s
//! - [`TransferFunction`]s for labeled volume rendering
//! - [`PolyData`] geometry with its named point arrays
//! - [`Notifier`] for change notifications
//! - [`CsvConfig`] and [`VisOptions`] configuration, and loading object tables from csv

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Table values are f64 and get narrowed to indices and color channels
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
// Config structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]

pub mod color;
pub mod color_map;
pub mod column;
pub mod config;
pub mod csv_loader;
pub mod error;
pub mod notify;
pub mod objects_data;
pub mod poly_data;
pub mod table;
pub mod transfer_function;

pub use color::{
    channel_to_u8, Rgba, DEFAULT_CONTEXT_OPACITY, DEFAULT_SELECTION_OPACITY, SELECTED_COLOR,
    TRANSPARENT_ALPHA,
};
pub use color_map::{ColorMap, ColorMapRegistry, LookupTable};
pub use column::{ColumnId, ColumnMapping};
pub use config::{CsvConfig, ObjectVisType, VisOptions};
pub use csv_loader::{AUTO_ID_COLUMN_NAME, CLASS_ID_COLUMN_NAME};
pub use error::{ObjectVisError, Result};
pub use notify::{DirtyFlags, Notifier, VisEvent};
pub use objects_data::{ObjectType, ObjectsData};
pub use poly_data::{PolyData, COLORS_ARRAY_NAME, ORIGINAL_IDS_ARRAY_NAME};
pub use table::ObjectTable;
pub use transfer_function::{ColorTransferFunction, PiecewiseFunction, TransferFunction};

/// Index of an object row in the object table, or of a point in a point buffer.
pub type IndexType = usize;

// Re-export glam types for convenience
pub use glam::Vec3;
