//! The immutable dataset shared by all visualizations of one object table.

use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::column::{ColumnId, ColumnMapping};
use crate::error::Result;
use crate::table::ObjectTable;

/// Kind of objects described by a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObjectType {
    Fibers,
    #[default]
    Voids,
}

impl ObjectType {
    /// Human readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fibers => "Fibers",
            Self::Voids => "Voids",
        }
    }
}

/// A loaded object table together with everything needed to visualize it.
///
/// Built once per loaded table and shared as `Arc<ObjectsData>`; a
/// visualization never mutates it.
#[derive(Debug, Clone)]
pub struct ObjectsData {
    pub object_type: ObjectType,
    pub table: ObjectTable,
    pub col_mapping: Arc<ColumnMapping>,
    /// Polyline points overriding the straight start/end of a row.
    pub curved_fiber_data: HashMap<usize, Vec<Vec3>>,
}

impl ObjectsData {
    /// Creates a dataset after checking that the column mapping fits the table.
    pub fn new(
        object_type: ObjectType,
        table: ObjectTable,
        col_mapping: Arc<ColumnMapping>,
    ) -> Result<Self> {
        col_mapping.validate(table.num_columns())?;
        Ok(Self {
            object_type,
            table,
            col_mapping,
            curved_fiber_data: HashMap::new(),
        })
    }

    /// Attaches curved fiber polylines, keyed by row index.
    #[must_use]
    pub fn with_curved_fiber_data(mut self, curved: HashMap<usize, Vec<Vec3>>) -> Self {
        self.curved_fiber_data = curved;
        self
    }

    /// Number of objects.
    pub fn num_objects(&self) -> usize {
        self.table.num_rows()
    }

    /// Reads the value of a semantic column for one object.
    pub fn value(&self, row: usize, id: ColumnId) -> Result<f64> {
        let column = self.col_mapping.require(id)?;
        self.table.value(row, column)
    }

    fn vec3(&self, row: usize, ids: [ColumnId; 3]) -> Result<Vec3> {
        Ok(Vec3::new(
            self.value(row, ids[0])? as f32,
            self.value(row, ids[1])? as f32,
            self.value(row, ids[2])? as f32,
        ))
    }

    /// Start point of a straight fiber.
    pub fn start_point(&self, row: usize) -> Result<Vec3> {
        self.vec3(row, ColumnId::START)
    }

    /// End point of a straight fiber.
    pub fn end_point(&self, row: usize) -> Result<Vec3> {
        self.vec3(row, ColumnId::END)
    }

    /// Center of an object.
    pub fn center(&self, row: usize) -> Result<Vec3> {
        self.vec3(row, ColumnId::CENTER)
    }

    /// Bounding dimensions of an object.
    pub fn dimension(&self, row: usize) -> Result<Vec3> {
        self.vec3(row, ColumnId::DIMENSION)
    }

    /// Curved fiber polyline of a row, if one with at least one point is present.
    pub fn curved_points(&self, row: usize) -> Option<&[Vec3]> {
        self.curved_fiber_data
            .get(&row)
            .filter(|pts| !pts.is_empty())
            .map(Vec::as_slice)
    }

    /// Class id of an object (last table column).
    pub fn class_id(&self, row: usize) -> Result<i64> {
        self.table.class_id(row)
    }

    /// Builds a one-object dataset from `row`, keeping its curved fiber data.
    pub fn single_object(&self, row: usize) -> Result<Self> {
        let table = self.table.select_rows(&[row])?;
        let mut curved = HashMap::new();
        if let Some(points) = self.curved_fiber_data.get(&row) {
            curved.insert(0, points.clone());
        }
        Ok(Self {
            object_type: self.object_type,
            table,
            col_mapping: Arc::clone(&self.col_mapping),
            curved_fiber_data: curved,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ObjectVisError;

    fn data() -> ObjectsData {
        let table = ObjectTable::from_rows(vec![
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 0.0],
            vec![2.0, 5.0, 5.0, 5.0, 6.0, 6.0, 6.0, 1.0],
        ])
        .expect("valid table");
        let mapping = ColumnMapping::new()
            .with(ColumnId::Id, 0)
            .with(ColumnId::StartX, 1)
            .with(ColumnId::StartY, 2)
            .with(ColumnId::StartZ, 3)
            .with(ColumnId::EndX, 4)
            .with(ColumnId::EndY, 5)
            .with(ColumnId::EndZ, 6);
        ObjectsData::new(ObjectType::Fibers, table, Arc::new(mapping)).expect("valid mapping")
    }

    #[test]
    fn test_point_accessors() {
        let d = data();
        assert_eq!(d.num_objects(), 2);
        assert_eq!(d.end_point(0).ok(), Some(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(d.start_point(1).ok(), Some(Vec3::splat(5.0)));
        assert!(matches!(
            d.center(0),
            Err(ObjectVisError::MissingColumn(ColumnId::CenterX))
        ));
    }

    #[test]
    fn test_mapping_outside_table_rejected() {
        let table = ObjectTable::from_rows(vec![vec![0.0, 1.0]]).expect("valid table");
        let mapping = ColumnMapping::new().with(ColumnId::Diameter, 2);
        let result = ObjectsData::new(ObjectType::Voids, table, Arc::new(mapping));
        assert!(matches!(
            result,
            Err(ObjectVisError::InvalidColumnIndex { column: 2, .. })
        ));
    }

    #[test]
    fn test_single_object_keeps_curved_points() {
        let mut curved = HashMap::new();
        curved.insert(1, vec![Vec3::ZERO, Vec3::X]);
        let d = data().with_curved_fiber_data(curved);
        let single = d.single_object(1).expect("row exists");
        assert_eq!(single.num_objects(), 1);
        assert_eq!(single.curved_points(0), Some(&[Vec3::ZERO, Vec3::X][..]));
        assert!(Arc::ptr_eq(&single.col_mapping, &d.col_mapping));
    }
}
