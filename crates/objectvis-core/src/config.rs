//! Configuration for loading object tables and building visualizations.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::column::{ColumnId, ColumnMapping};
use crate::error::{ObjectVisError, Result};
use crate::objects_data::ObjectType;

/// Lines skipped at the start of FCP / feature characteristics csv files.
pub const FCP_FORMAT_START_SKIP_LINES: usize = 5;

/// How a set of objects is visualized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObjectVisType {
    /// Paint a labeled volume through a transfer function keyed by object id.
    #[default]
    UseVolume,
    Line,
    Cylinder,
    Ellipsoid,
    /// No visualization.
    NoVis,
}

impl ObjectVisType {
    pub const ALL: [Self; 5] = [
        Self::UseVolume,
        Self::Line,
        Self::Cylinder,
        Self::Ellipsoid,
        Self::NoVis,
    ];

    /// Human readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UseVolume => "Labeled Volume (if available)",
            Self::Line => "Lines",
            Self::Cylinder => "Cylinders",
            Self::Ellipsoid => "Ellipses",
            Self::NoVis => "No Visualization",
        }
    }

    /// Parses a name produced by [`ObjectVisType::as_str`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

/// Describes the layout of an object csv file and how to visualize it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    pub file_name: String,
    pub encoding: String,
    pub contains_header: bool,
    pub skip_lines_start: usize,
    pub skip_lines_end: usize,
    pub column_separator: String,
    pub decimal_separator: String,
    pub add_auto_id: bool,
    pub object_type: ObjectType,
    pub unit: String,
    pub spacing: f64,
    pub compute_length: bool,
    pub compute_angles: bool,
    pub compute_tensors: bool,
    pub compute_center: bool,
    pub compute_start_end: bool,
    pub offset: [f64; 3],
    pub vis_type: ObjectVisType,
    pub is_diameter_fixed: bool,
    pub fixed_diameter_value: f64,
    pub add_class_id: bool,
    pub current_headers: Vec<String>,
    pub selected_headers: Vec<String>,
    pub column_mapping: ColumnMapping,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            file_name: String::new(),
            encoding: "System".to_string(),
            contains_header: true,
            skip_lines_start: FCP_FORMAT_START_SKIP_LINES,
            skip_lines_end: 0,
            column_separator: ";".to_string(),
            decimal_separator: ".".to_string(),
            add_auto_id: false,
            object_type: ObjectType::Voids,
            unit: "microns".to_string(),
            spacing: 0.0,
            compute_length: false,
            compute_angles: false,
            compute_tensors: false,
            compute_center: false,
            compute_start_end: false,
            offset: [0.0; 3],
            vis_type: ObjectVisType::UseVolume,
            is_diameter_fixed: false,
            fixed_diameter_value: 0.0,
            add_class_id: true,
            current_headers: Vec::new(),
            selected_headers: Vec::new(),
            column_mapping: ColumnMapping::new(),
        }
    }
}

impl CsvConfig {
    /// Checks the mapping requirements of the chosen computations and visualization.
    pub fn is_valid(&self) -> Result<()> {
        let m = &self.column_mapping;
        let has_start_end = m.contains_all(&ColumnId::START) && m.contains_all(&ColumnId::END);
        if self.compute_start_end
            && !(m.contains_all(&ColumnId::CENTER)
                && m.contains_all(&[ColumnId::Phi, ColumnId::Theta, ColumnId::Length]))
        {
            return invalid(
                "cannot compute start/end without center position, phi, theta and length",
            );
        }
        if (self.compute_length || self.compute_angles || self.compute_center) && !has_start_end {
            return invalid(
                "cannot compute length/angles/center without fully defined start and end position",
            );
        }
        if self.compute_tensors
            && !self.compute_angles
            && !m.contains_all(&[ColumnId::Phi, ColumnId::Theta])
        {
            return invalid("cannot compute tensors without angles");
        }
        if matches!(self.vis_type, ObjectVisType::Line | ObjectVisType::Cylinder)
            && !self.compute_start_end
            && !has_start_end
        {
            return invalid("visualization as lines or cylinders requires start and end position columns");
        }
        if self.vis_type == ObjectVisType::Cylinder
            && !m.contains(ColumnId::Diameter)
            && !self.is_diameter_fixed
        {
            return invalid("visualization as cylinders requires a diameter column or a fixed diameter");
        }
        if self.vis_type == ObjectVisType::Ellipsoid
            && !(m.contains_all(&ColumnId::CENTER) && m.contains_all(&ColumnId::DIMENSION))
        {
            return invalid("visualization as ellipsoids requires center and dimension columns");
        }
        if self.selected_headers.is_empty() {
            return invalid("at least one column must be selected");
        }
        Ok(())
    }

    /// Diameter to use for every object when the diameter is fixed.
    pub fn fixed_diameter(&self) -> Option<f64> {
        self.is_diameter_fixed.then_some(self.fixed_diameter_value)
    }

    /// Format of fiber csv files written by FCP.
    pub fn fcp_fiber_format(file_name: impl Into<String>) -> Self {
        let headers: Vec<String> = [
            "Label",
            "X1[µm]",
            "Y1[µm]",
            "Z1[µm]",
            "X2[µm]",
            "Y2[µm]",
            "Z2[µm]",
            "StraightLength[µm]",
            "CurvedLength[µm]",
            "Diameter[µm]",
            "Surface[µm²]",
            "Volume[µm³]",
            "SeperatedFibre",
            "CurvedFibre",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        let column_mapping = ColumnMapping::new()
            .with(ColumnId::StartX, 1)
            .with(ColumnId::StartY, 2)
            .with(ColumnId::StartZ, 3)
            .with(ColumnId::EndX, 4)
            .with(ColumnId::EndY, 5)
            .with(ColumnId::EndZ, 6)
            .with(ColumnId::Length, 7)
            .with(ColumnId::CurvedLength, 8)
            .with(ColumnId::Diameter, 9);
        Self {
            file_name: file_name.into(),
            contains_header: false,
            column_separator: ",".to_string(),
            object_type: ObjectType::Fibers,
            compute_angles: true,
            compute_tensors: true,
            compute_center: true,
            selected_headers: headers.clone(),
            current_headers: headers,
            column_mapping,
            ..Self::default()
        }
    }

    /// Format of pore csv files with feature characteristics.
    pub fn fc_void_format(file_name: impl Into<String>) -> Self {
        let headers: Vec<String> = [
            "Label Id", "X1", "Y1", "Z1", "X2", "Y2", "Z2", "a11", "a22", "a33", "a12", "a13",
            "a23", "DimX", "DimY", "DimZ", "Phi", "Theta", "Xm", "Ym", "Zm", "Volume",
            "Roundness", "FeretDiam", "Flatness", "VoxDimX", "VoxDimY", "VoxDimZ",
            "MajorLength", "MinorLength",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        let column_mapping = ColumnMapping::new()
            .with(ColumnId::StartX, 1)
            .with(ColumnId::StartY, 2)
            .with(ColumnId::StartZ, 3)
            .with(ColumnId::EndX, 4)
            .with(ColumnId::EndY, 5)
            .with(ColumnId::EndZ, 6)
            .with(ColumnId::DimensionX, 13)
            .with(ColumnId::DimensionY, 14)
            .with(ColumnId::DimensionZ, 15)
            .with(ColumnId::Phi, 16)
            .with(ColumnId::Theta, 17)
            .with(ColumnId::CenterX, 18)
            .with(ColumnId::CenterY, 19)
            .with(ColumnId::CenterZ, 20)
            .with(ColumnId::Diameter, 23)
            .with(ColumnId::Length, 28);
        Self {
            file_name: file_name.into(),
            contains_header: false,
            column_separator: ",".to_string(),
            object_type: ObjectType::Voids,
            selected_headers: headers.clone(),
            current_headers: headers,
            column_mapping,
            ..Self::default()
        }
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Writes the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::debug!("saved csv config to {}", path.as_ref().display());
        Ok(())
    }

    /// Reads a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }
}

fn invalid(msg: &str) -> Result<()> {
    Err(ObjectVisError::InvalidConfig(msg.to_string()))
}

/// Parameters of the geometry built for each visualization type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisOptions {
    /// Keep every n-th point of a curved fiber polyline.
    pub segment_skip: usize,
    /// Number of sides of cylinder tubes.
    pub cylinder_sides: usize,
    /// Close cylinder tubes with caps.
    pub cylinder_capping: bool,
    /// Diameter used for every cylinder instead of the diameter column.
    pub fixed_diameter: Option<f64>,
    /// Scale applied to every cylinder diameter.
    pub diameter_factor: f64,
    /// Extra scale applied to non-selected cylinders while a selection is shown.
    pub context_diameter_factor: f64,
    pub ellipsoid_phi_resolution: usize,
    pub ellipsoid_theta_resolution: usize,
    /// Bounds of the labeled volume (xmin, xmax, ymin, ymax, zmin, zmax).
    pub volume_bounds: [f64; 6],
}

impl Default for VisOptions {
    fn default() -> Self {
        Self {
            segment_skip: 1,
            cylinder_sides: 12,
            cylinder_capping: true,
            fixed_diameter: None,
            diameter_factor: 1.0,
            context_diameter_factor: 1.0,
            ellipsoid_phi_resolution: 6,
            ellipsoid_theta_resolution: 6,
            volume_bounds: [0.0; 6],
        }
    }
}

impl VisOptions {
    /// Options matching a csv config (currently its fixed diameter).
    pub fn from_csv_config(config: &CsvConfig) -> Self {
        Self {
            fixed_diameter: config.fixed_diameter(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        let mut fibers = CsvConfig::fcp_fiber_format("fibers.csv");
        fibers.vis_type = ObjectVisType::Cylinder;
        assert!(fibers.is_valid().is_ok());

        let mut voids = CsvConfig::fc_void_format("pores.csv");
        voids.vis_type = ObjectVisType::Ellipsoid;
        assert!(voids.is_valid().is_ok());
    }

    #[test]
    fn test_cylinder_requires_diameter() {
        let mut config = CsvConfig::fcp_fiber_format("fibers.csv");
        config.vis_type = ObjectVisType::Cylinder;
        config.column_mapping = ColumnMapping::new()
            .with(ColumnId::StartX, 1)
            .with(ColumnId::StartY, 2)
            .with(ColumnId::StartZ, 3)
            .with(ColumnId::EndX, 4)
            .with(ColumnId::EndY, 5)
            .with(ColumnId::EndZ, 6);
        assert!(matches!(
            config.is_valid(),
            Err(ObjectVisError::InvalidConfig(_))
        ));

        config.is_diameter_fixed = true;
        config.fixed_diameter_value = 3.0;
        assert!(config.is_valid().is_ok());
        assert_eq!(VisOptions::from_csv_config(&config).fixed_diameter, Some(3.0));
    }

    #[test]
    fn test_ellipsoid_requires_dimensions() {
        let mut config = CsvConfig::fcp_fiber_format("fibers.csv");
        config.vis_type = ObjectVisType::Ellipsoid;
        assert!(config.is_valid().is_err());
    }

    #[test]
    fn test_json_round_trip_with_defaults() {
        let config = CsvConfig::fc_void_format("pores.csv");
        let json = config.to_json().expect("serializable");
        assert_eq!(CsvConfig::from_json(&json).expect("parsable"), config);

        let partial = CsvConfig::from_json(r#"{ "vis_type": "Line" }"#).expect("parsable");
        assert_eq!(partial.vis_type, ObjectVisType::Line);
        assert_eq!(partial.column_separator, ";");
    }

    #[test]
    fn test_vis_type_names() {
        for t in ObjectVisType::ALL {
            assert_eq!(ObjectVisType::from_name(t.as_str()), Some(t));
        }
        assert_eq!(ObjectVisType::from_name("Spheres"), None);
    }
}
