//! Error types for objectvis-rs.

use thiserror::Error;

use crate::column::ColumnId;

/// The main error type for objectvis-rs operations.
///
/// Every variant is recoverable: the failing call leaves the visualization
/// in the state it had before the call.
#[derive(Error, Debug)]
pub enum ObjectVisError {
    /// A column index points outside the object table.
    #[error("column index {column} out of range (table has {num_columns} columns)")]
    InvalidColumnIndex { column: usize, num_columns: usize },

    /// A semantic column required by the operation has no mapping.
    #[error("no column mapped for {0:?}")]
    MissingColumn(ColumnId),

    /// A selection that must be strictly ascending is not.
    #[error("selection not strictly ascending at position {position} ({previous} followed by {value})")]
    UnsortedSelection {
        position: usize,
        previous: usize,
        value: usize,
    },

    /// An object index is outside the object table.
    #[error("object index {index} out of range (table has {num_objects} objects)")]
    ObjectIndexOutOfRange { index: usize, num_objects: usize },

    /// A row's class id has no entry in the supplied class colors.
    #[error("class id {class_id} of object {row} out of range ({num_classes} class colors given)")]
    ClassIndexOutOfRange {
        row: usize,
        class_id: i64,
        num_classes: usize,
    },

    /// Selection extraction is not implemented for this visualization type.
    #[error("extracting selected objects is not supported for {0} visualizations")]
    UnsupportedExtraction(&'static str),

    /// A phi/theta pair falls outside the orientation color image.
    #[error("orientation ({phi}, {theta}) outside orientation image of size {width}x{height}")]
    OrientationOutOfRange {
        phi: f64,
        theta: f64,
        width: u32,
        height: u32,
    },

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A configuration is inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A dataset with the given name is already loaded.
    #[error("dataset '{0}' already loaded")]
    DatasetExists(String),

    /// A dataset with the given name was not found.
    #[error("dataset '{0}' not found")]
    DatasetNotFound(String),

    /// The renderer an actor was created for has been reset or replaced.
    #[error("renderer {renderer} is stale (actor generation {actor_generation}, renderer generation {renderer_generation})")]
    StaleRenderer {
        renderer: u64,
        actor_generation: u64,
        renderer_generation: u64,
    },

    /// Geometry export failed.
    #[error("export error: {0}")]
    Export(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// An object csv file could not be parsed.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// A specialized Result type for objectvis-rs operations.
pub type Result<T> = std::result::Result<T, ObjectVisError>;
