//! Loading object tables from csv files laid out as a [`CsvConfig`] describes.
//!
//! The output table holds, in order: an optional auto id column, the selected
//! file columns, then every column the config asks to compute (start/end,
//! fixed diameter, length, center, angles, orientation tensor) and finally an
//! optional class id column. The column mapping is rewritten to point into
//! this output layout.

use std::f64::consts::PI;
use std::fs::File;
use std::io::Read;
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, Trim};
use glam::{DVec2, DVec3};

use crate::column::{ColumnId, ColumnMapping};
use crate::config::CsvConfig;
use crate::error::{ObjectVisError, Result};
use crate::objects_data::ObjectsData;
use crate::table::ObjectTable;

pub const AUTO_ID_COLUMN_NAME: &str = "Auto_ID";
pub const CLASS_ID_COLUMN_NAME: &str = "Class_ID";

const START_HEADERS: [&str; 3] = ["X1", "Y1", "Z1"];
const END_HEADERS: [&str; 3] = ["X2", "Y2", "Z2"];
const DIAMETER_HEADER: &str = "Diameter";
const LENGTH_HEADER: &str = "StraightLength[µm]";
const CENTER_HEADERS: [&str; 3] = ["Xm[µm]", "Ym[µm]", "Zm[µm]"];
const ANGLE_HEADERS: [&str; 2] = ["Phi[°]", "Theta[°]"];
const TENSOR_HEADERS: [&str; 6] = ["a11", "a22", "a33", "a12", "a13", "a23"];

/// Headers and column mapping of the loaded table.
struct OutputLayout {
    headers: Vec<String>,
    mapping: ColumnMapping,
}

impl OutputLayout {
    fn append(&mut self, id: Option<ColumnId>, name: &str) {
        if let Some(id) = id {
            self.mapping.insert(id, self.headers.len());
        }
        self.headers.push(name.to_string());
    }
}

impl CsvConfig {
    /// Reads the objects stored in `file_name`.
    pub fn load_objects(&self) -> Result<ObjectsData> {
        let file = File::open(&self.file_name)?;
        self.read_objects(file)
    }

    /// Reads objects from csv text.
    ///
    /// Without an auto id, the first column must hold consecutive ids
    /// starting at 1. Rows with fewer fields than the header are skipped.
    pub fn read_objects<R: Read>(&self, mut input: R) -> Result<ObjectsData> {
        let delimiter = match self.column_separator.as_bytes() {
            [b] => *b,
            _ => {
                return Err(ObjectVisError::InvalidConfig(format!(
                    "column separator '{}' must be a single byte",
                    self.column_separator
                )))
            }
        };
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        let text = self.decode(bytes);
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

        let mut lines = text.lines().skip(self.skip_lines_start);
        let header_line = if self.contains_header {
            lines.next()
        } else {
            None
        };
        let mut data: Vec<&str> = lines.collect();
        data.truncate(data.len().saturating_sub(self.skip_lines_end));

        let mut body = String::new();
        for line in header_line.into_iter().chain(data) {
            body.push_str(line);
            body.push('\n');
        }
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.contains_header)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(body.as_bytes());

        let file_headers: Vec<String> = if self.contains_header {
            reader.headers()?.iter().map(str::to_string).collect()
        } else {
            self.current_headers.clone()
        };
        let selected = self.selected_columns(&file_headers);
        let layout = self.output_layout(&file_headers, &selected);

        let mut rows = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() < file_headers.len() {
                log::warn!(
                    "row {row} of '{}' only contains {} entries, expected {}; skipping",
                    self.file_name,
                    record.len(),
                    file_headers.len()
                );
                continue;
            }
            if !self.add_auto_id {
                let id = self.parse_field(record.get(0).unwrap_or_default());
                if id != (row + 1) as f64 {
                    return Err(ObjectVisError::InvalidConfig(format!(
                        "id column: unexpected value {id} in row {row}, ids must be consecutive starting at 1"
                    )));
                }
            }
            rows.push(self.derive_row(&record, &selected, rows.len() + 1)?);
        }
        if rows.is_empty() {
            return Err(ObjectVisError::InvalidConfig(format!(
                "no rows to load from '{}'",
                self.file_name
            )));
        }

        log::info!(
            "loaded {} {} with {} columns from '{}' (unit {}, spacing {})",
            rows.len(),
            self.object_type.as_str(),
            layout.headers.len(),
            self.file_name,
            self.unit,
            self.spacing
        );
        let table = ObjectTable::new(layout.headers, rows)?;
        ObjectsData::new(self.object_type, table, Arc::new(layout.mapping))
    }

    fn decode(&self, bytes: Vec<u8>) -> String {
        match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => {
                log::warn!(
                    "'{}' is not valid UTF-8 (configured encoding '{}'); replacing invalid bytes",
                    self.file_name,
                    self.encoding
                );
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        }
    }

    /// File column indices of the selected headers; all columns if none are selected.
    fn selected_columns(&self, file_headers: &[String]) -> Vec<usize> {
        if self.selected_headers.is_empty() {
            return (0..file_headers.len()).collect();
        }
        self.selected_headers
            .iter()
            .filter_map(|name| {
                let idx = file_headers.iter().position(|h| h == name);
                if idx.is_none() {
                    log::warn!("selected column '{name}' not found in file headers, skipping");
                }
                idx
            })
            .collect()
    }

    fn output_layout(&self, file_headers: &[String], selected: &[usize]) -> OutputLayout {
        let id_offset = usize::from(self.add_auto_id);
        let mut mapping = ColumnMapping::new();
        for (id, column) in self.column_mapping.iter() {
            match selected.iter().position(|&c| c == column) {
                Some(out) => {
                    mapping.insert(id, id_offset + out);
                }
                None => log::warn!("mapped column {id:?} (input column {column}) not selected"),
            }
        }

        let mut layout = OutputLayout {
            headers: Vec::new(),
            mapping,
        };
        if self.add_auto_id {
            layout.append(Some(ColumnId::Id), AUTO_ID_COLUMN_NAME);
        }
        layout
            .headers
            .extend(selected.iter().map(|&c| file_headers[c].clone()));
        if self.compute_start_end {
            for (id, name) in ColumnId::START.into_iter().zip(START_HEADERS) {
                layout.append(Some(id), name);
            }
            for (id, name) in ColumnId::END.into_iter().zip(END_HEADERS) {
                layout.append(Some(id), name);
            }
        }
        if self.is_diameter_fixed {
            layout.append(Some(ColumnId::Diameter), DIAMETER_HEADER);
        }
        if self.compute_length {
            layout.append(Some(ColumnId::Length), LENGTH_HEADER);
        }
        if self.compute_center {
            for (id, name) in ColumnId::CENTER.into_iter().zip(CENTER_HEADERS) {
                layout.append(Some(id), name);
            }
        }
        if self.compute_angles {
            layout.append(Some(ColumnId::Phi), ANGLE_HEADERS[0]);
            layout.append(Some(ColumnId::Theta), ANGLE_HEADERS[1]);
        }
        if self.compute_tensors {
            for name in TENSOR_HEADERS {
                layout.append(None, name);
            }
        }
        if self.add_class_id {
            layout.append(None, CLASS_ID_COLUMN_NAME);
        }
        layout
    }

    /// One output row; `row_id` is the 1-based id given by the auto id column.
    fn derive_row(
        &self,
        record: &StringRecord,
        selected: &[usize],
        row_id: usize,
    ) -> Result<Vec<f64>> {
        let mut entries = Vec::new();
        if self.add_auto_id {
            entries.push(row_id as f64);
        }
        entries.extend(selected.iter().map(|&c| self.field_value(record, c)));

        let mapped = |id: ColumnId| -> Result<f64> {
            Ok(self.field_value(record, self.column_mapping.require(id)?))
        };
        let mapped_vec = |ids: [ColumnId; 3]| -> Result<DVec3> {
            Ok(DVec3::new(mapped(ids[0])?, mapped(ids[1])?, mapped(ids[2])?))
        };

        if self.compute_start_end {
            let center = mapped_vec(ColumnId::CENTER)?;
            let (phi, theta) = (mapped(ColumnId::Phi)?, mapped(ColumnId::Theta)?);
            let radius = mapped(ColumnId::Length)? * 0.5;
            let dir = radius
                * DVec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
            entries.extend((center + dir).to_array());
            entries.extend((center - dir).to_array());
        }
        if let Some(diameter) = self.fixed_diameter() {
            entries.push(diameter);
        }

        let mut angles = None;
        if self.compute_length || self.compute_angles || self.compute_center {
            let start = mapped_vec(ColumnId::START)?;
            let end = mapped_vec(ColumnId::END)?;
            // directions always point into the upper z half space
            let mut dir = start - end;
            if dir.z < 0.0 {
                dir = -dir;
            }
            if self.compute_length {
                entries.push(dir.length());
            }
            if self.compute_center {
                entries.extend(((start + end) / 2.0).to_array());
            }
            if self.compute_angles {
                let (phi, theta) = direction_angles(dir);
                entries.extend([phi, theta]);
                angles = Some((phi, theta));
            }
        }
        if self.compute_tensors {
            let (phi, theta) = match angles {
                Some(angles) => angles,
                None => (mapped(ColumnId::Phi)?, mapped(ColumnId::Theta)?),
            };
            entries.extend(orientation_tensor(phi, theta));
        }
        if self.add_class_id {
            entries.push(0.0);
        }
        Ok(entries)
    }

    /// A file field as a number; fields beyond the record or unparsable read as 0.
    fn field_value(&self, record: &StringRecord, column: usize) -> f64 {
        let value = record.get(column).map_or(0.0, |field| self.parse_field(field));
        self.transform(value, column)
    }

    fn parse_field(&self, field: &str) -> f64 {
        let parsed = if self.decimal_separator == "." {
            field.parse()
        } else {
            field.replace(&self.decimal_separator, ".").parse()
        };
        parsed.unwrap_or_else(|_| {
            log::debug!("unparsable value '{field}' read as 0");
            0.0
        })
    }

    /// Shifts positions by the configured offset and wraps negative theta into `[0, 2π)`.
    fn transform(&self, value: f64, column: usize) -> f64 {
        let m = &self.column_mapping;
        for axis in 0..3 {
            let positional = [ColumnId::START, ColumnId::END, ColumnId::CENTER]
                .iter()
                .any(|ids| m.get(ids[axis]) == Some(column));
            if self.offset[axis] != 0.0 && positional {
                return value + self.offset[axis];
            }
        }
        if m.get(ColumnId::Theta) == Some(column) && value < 0.0 {
            return 2.0 * PI + value;
        }
        value
    }
}

/// Phi and theta in degrees of a direction with non-negative z.
fn direction_angles(dir: DVec3) -> (f64, f64) {
    let xy = dir.truncate();
    if xy == DVec2::ZERO {
        return (0.0, 0.0);
    }
    let mut phi = (dir.y / xy.length()).asin().to_degrees();
    let theta = (dir.z / dir.length()).acos().to_degrees();
    if dir.x < 0.0 {
        phi = 180.0 - phi;
    }
    if phi < 0.0 {
        phi += 360.0;
    }
    (phi, theta)
}

/// Second order orientation tensor (a11, a22, a33, a12, a13, a23) from angles in degrees.
fn orientation_tensor(phi: f64, theta: f64) -> [f64; 6] {
    let (sin_phi, cos_phi) = phi.to_radians().sin_cos();
    let (sin_theta, cos_theta) = theta.to_radians().sin_cos();
    [
        cos_phi * cos_phi * sin_theta * sin_theta,
        sin_phi * sin_phi * sin_theta * sin_theta,
        cos_theta * cos_theta,
        cos_phi * sin_theta * sin_theta * sin_phi,
        cos_phi * sin_theta * cos_theta,
        sin_phi * sin_theta * cos_theta,
    ]
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::config::ObjectVisType;
    use crate::objects_data::ObjectType;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn start_end_mapping(first: usize) -> ColumnMapping {
        ColumnMapping::new()
            .with(ColumnId::StartX, first)
            .with(ColumnId::StartY, first + 1)
            .with(ColumnId::StartZ, first + 2)
            .with(ColumnId::EndX, first + 3)
            .with(ColumnId::EndY, first + 4)
            .with(ColumnId::EndZ, first + 5)
    }

    /// Headerless table with an id column followed by start and end.
    fn id_start_end_config() -> CsvConfig {
        CsvConfig {
            contains_header: false,
            skip_lines_start: 0,
            column_separator: ",".to_string(),
            add_class_id: false,
            current_headers: headers(&["Id", "X1", "Y1", "Z1", "X2", "Y2", "Z2"]),
            column_mapping: start_end_mapping(1).with(ColumnId::Id, 0),
            ..CsvConfig::default()
        }
    }

    #[test]
    fn test_skip_lines_separators_and_generated_ids() {
        let config = CsvConfig {
            skip_lines_start: 2,
            skip_lines_end: 1,
            decimal_separator: ",".to_string(),
            add_auto_id: true,
            add_class_id: true,
            object_type: ObjectType::Fibers,
            column_mapping: start_end_mapping(0),
            ..CsvConfig::default()
        };
        let text = "exported by some tool\n\
                    version;2\n\
                    X1;Y1;Z1;X2;Y2;Z2\n\
                    0,5;0;0;1,5;0;0\n\
                    2;0;0;2;3;0\n\
                    end of table\n";
        let data = config.read_objects(text.as_bytes()).expect("loadable");

        assert_eq!(data.num_objects(), 2);
        let names = data.table.headers();
        assert_eq!(names.first().map(String::as_str), Some(AUTO_ID_COLUMN_NAME));
        assert_eq!(names.last().map(String::as_str), Some(CLASS_ID_COLUMN_NAME));
        assert_eq!(names.len(), 8);
        assert_eq!(data.value(1, ColumnId::Id).ok(), Some(2.0));
        assert_eq!(data.start_point(0).ok(), Some(Vec3::new(0.5, 0.0, 0.0)));
        assert_eq!(data.end_point(1).ok(), Some(Vec3::new(2.0, 3.0, 0.0)));
        assert_eq!(data.class_id(1).ok(), Some(0));
    }

    #[test]
    fn test_offset_and_theta_wrap() {
        let mut config = id_start_end_config();
        config.offset = [10.0, 0.0, -1.0];
        config.current_headers.push("Theta".to_string());
        config.column_mapping.insert(ColumnId::Theta, 7);

        let data = config
            .read_objects("1,1,2,3,4,5,6,-1.0\n".as_bytes())
            .expect("loadable");
        assert_eq!(data.start_point(0).ok(), Some(Vec3::new(11.0, 2.0, 2.0)));
        assert_eq!(data.end_point(0).ok(), Some(Vec3::new(14.0, 5.0, 5.0)));
        let theta = data.value(0, ColumnId::Theta).expect("theta mapped");
        assert!(approx(theta, 2.0 * PI - 1.0));
        assert!(approx(data.value(0, ColumnId::Id).expect("id mapped"), 1.0));
    }

    #[test]
    fn test_computed_length_center_angles_and_tensor() {
        let mut config = id_start_end_config();
        config.compute_length = true;
        config.compute_center = true;
        config.compute_angles = true;
        config.compute_tensors = true;
        config.add_class_id = true;

        let data = config
            .read_objects("1,0,0,0,3,4,0\n2,0,0,2,0,0,0\n".as_bytes())
            .expect("loadable");
        // 7 file columns, length, center, angles, tensor, class
        assert_eq!(data.table.num_columns(), 7 + 1 + 3 + 2 + 6 + 1);

        assert!(approx(data.value(0, ColumnId::Length).expect("length"), 5.0));
        assert_eq!(data.center(0).ok(), Some(Vec3::new(1.5, 2.0, 0.0)));
        let phi = data.value(0, ColumnId::Phi).expect("phi");
        let theta = data.value(0, ColumnId::Theta).expect("theta");
        assert!(approx(phi, 180.0 + 0.8f64.asin().to_degrees()));
        assert!(approx(theta, 90.0));

        let tensor_start = data.col_mapping.require(ColumnId::Theta).expect("theta") + 1;
        let tensor: Vec<f64> = (0..6)
            .map(|i| data.table.value(0, tensor_start + i).expect("tensor column"))
            .collect();
        for (value, expected) in tensor.iter().zip([0.36, 0.64, 0.0, 0.48, 0.0, 0.0]) {
            assert!((value - expected).abs() < 1e-9, "{value} != {expected}");
        }

        // a fiber along z has no azimuth
        assert!(approx(data.value(1, ColumnId::Length).expect("length"), 2.0));
        assert_eq!(data.value(1, ColumnId::Phi).ok(), Some(0.0));
        assert_eq!(data.value(1, ColumnId::Theta).ok(), Some(0.0));
        assert_eq!(data.class_id(1).ok(), Some(0));
    }

    #[test]
    fn test_computed_start_end_and_fixed_diameter() {
        let config = CsvConfig {
            contains_header: false,
            skip_lines_start: 0,
            column_separator: ",".to_string(),
            add_class_id: false,
            compute_start_end: true,
            is_diameter_fixed: true,
            fixed_diameter_value: 3.0,
            vis_type: ObjectVisType::Cylinder,
            current_headers: headers(&["Id", "Xm", "Ym", "Zm", "Phi", "Theta", "Length"]),
            column_mapping: ColumnMapping::new()
                .with(ColumnId::Id, 0)
                .with(ColumnId::CenterX, 1)
                .with(ColumnId::CenterY, 2)
                .with(ColumnId::CenterZ, 3)
                .with(ColumnId::Phi, 4)
                .with(ColumnId::Theta, 5)
                .with(ColumnId::Length, 6),
            ..CsvConfig::default()
        };
        let data = config
            .read_objects("1,1,1,1,0,0,4\n".as_bytes())
            .expect("loadable");

        assert_eq!(data.start_point(0).ok(), Some(Vec3::new(1.0, 1.0, 3.0)));
        assert_eq!(data.end_point(0).ok(), Some(Vec3::new(1.0, 1.0, -1.0)));
        assert_eq!(data.value(0, ColumnId::Diameter).ok(), Some(3.0));
        assert_eq!(data.table.headers().last().map(String::as_str), Some(DIAMETER_HEADER));
    }

    #[test]
    fn test_selected_headers_and_short_rows() {
        let config = CsvConfig {
            skip_lines_start: 0,
            column_separator: ",".to_string(),
            add_auto_id: true,
            add_class_id: false,
            selected_headers: headers(&["X1", "Y1", "Z1", "X2", "Y2", "Z2", "Missing"]),
            column_mapping: start_end_mapping(1),
            ..CsvConfig::default()
        };
        let text = "Volume,X1,Y1,Z1,X2,Y2,Z2\n\
                    9,0,0,0,1,1,1\n\
                    9,0,0\n\
                    9,2,2,2,3,3,3\n";
        let data = config.read_objects(text.as_bytes()).expect("loadable");

        assert_eq!(data.num_objects(), 2);
        assert_eq!(data.table.num_columns(), 7);
        assert_eq!(data.table.headers()[1], "X1");
        assert_eq!(data.col_mapping.get(ColumnId::StartX), Some(1));
        assert_eq!(data.start_point(1).ok(), Some(Vec3::new(2.0, 2.0, 2.0)));
        assert_eq!(data.value(1, ColumnId::Id).ok(), Some(2.0));
    }

    #[test]
    fn test_non_consecutive_ids_rejected() {
        let result = id_start_end_config().read_objects("1,0,0,0,1,1,1\n3,0,0,0,1,1,1\n".as_bytes());
        assert!(matches!(result, Err(ObjectVisError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_computation_input_rejected() {
        let mut config = id_start_end_config();
        config.compute_tensors = true;
        let result = config.read_objects("1,0,0,0,1,1,1\n".as_bytes());
        assert!(matches!(
            result,
            Err(ObjectVisError::MissingColumn(ColumnId::Phi))
        ));
    }

    #[test]
    fn test_invalid_separator_and_empty_input() {
        let mut config = id_start_end_config();
        assert!(matches!(
            config.read_objects("".as_bytes()),
            Err(ObjectVisError::InvalidConfig(_))
        ));
        config.column_separator = "::".to_string();
        assert!(matches!(
            config.read_objects("1::0\n".as_bytes()),
            Err(ObjectVisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_load_fcp_fiber_file() {
        let path = std::env::temp_dir().join("objectvis_fcp_fibers.csv");
        let mut text = String::from("FCP export\n\n\n\nLabel,...\n");
        for id in 1..=3 {
            let y = f64::from(id) * 2.0;
            text.push_str(&format!("{id},0,{y},0,0,{y},5,5,5.5,1.5,10,20,0,0\n"));
        }
        std::fs::write(&path, text).expect("write csv");

        let data = CsvConfig::fcp_fiber_format(path.to_string_lossy())
            .load_objects()
            .expect("loadable");
        let _ = std::fs::remove_file(&path);

        assert_eq!(data.object_type, ObjectType::Fibers);
        assert_eq!(data.num_objects(), 3);
        // 14 file columns, center, angles, tensor, class
        assert_eq!(data.table.num_columns(), 14 + 3 + 2 + 6 + 1);
        assert_eq!(data.center(2).ok(), Some(Vec3::new(0.0, 6.0, 2.5)));
        assert_eq!(data.value(0, ColumnId::Diameter).ok(), Some(1.5));
        assert!(approx(data.value(0, ColumnId::Theta).expect("theta"), 0.0));
    }
}
