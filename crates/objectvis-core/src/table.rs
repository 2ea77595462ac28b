//! Row-per-object attribute table.

use crate::error::{ObjectVisError, Result};

/// A table with one row per object (fiber, pore) and one column per attribute.
///
/// The last column holds the object's class id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectTable {
    headers: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl ObjectTable {
    /// Creates a table; every row must have one value per header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|r| r.len() != headers.len()) {
            return Err(ObjectVisError::SizeMismatch {
                expected: headers.len(),
                actual: bad.len(),
            });
        }
        Ok(Self { headers, rows })
    }

    /// Creates a table with headers generated as `Column 0`, `Column 1`, ...
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let width = rows.first().map_or(0, Vec::len);
        let headers = (0..width).map(|i| format!("Column {i}")).collect();
        Self::new(headers, rows)
    }

    /// Column headers.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of objects.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of attribute columns, including the class column.
    pub fn num_columns(&self) -> usize {
        self.headers.len()
    }

    /// Returns the full attribute row of an object.
    pub fn row(&self, row: usize) -> Result<&[f64]> {
        self.rows
            .get(row)
            .map(Vec::as_slice)
            .ok_or(ObjectVisError::ObjectIndexOutOfRange {
                index: row,
                num_objects: self.rows.len(),
            })
    }

    /// Returns a single cell.
    pub fn value(&self, row: usize, column: usize) -> Result<f64> {
        self.row(row)?
            .get(column)
            .copied()
            .ok_or(ObjectVisError::InvalidColumnIndex {
                column,
                num_columns: self.headers.len(),
            })
    }

    /// Checks that `column` addresses an existing column.
    pub fn check_column(&self, column: usize) -> Result<()> {
        if column < self.headers.len() {
            Ok(())
        } else {
            Err(ObjectVisError::InvalidColumnIndex {
                column,
                num_columns: self.headers.len(),
            })
        }
    }

    /// Class id of an object, read from the last column.
    pub fn class_id(&self, row: usize) -> Result<i64> {
        let last = self.headers.len().checked_sub(1).ok_or(
            ObjectVisError::InvalidColumnIndex {
                column: 0,
                num_columns: 0,
            },
        )?;
        Ok(self.value(row, last)? as i64)
    }

    /// Overwrites a single cell.
    pub fn set_value(&mut self, row: usize, column: usize, value: f64) -> Result<()> {
        self.check_column(column)?;
        let num_objects = self.rows.len();
        let cells = self
            .rows
            .get_mut(row)
            .ok_or(ObjectVisError::ObjectIndexOutOfRange {
                index: row,
                num_objects,
            })?;
        cells[column] = value;
        Ok(())
    }

    /// Copies a subset of rows into a new table with the same headers.
    pub fn select_rows(&self, rows: &[usize]) -> Result<Self> {
        let rows = rows
            .iter()
            .map(|&r| self.row(r).map(<[f64]>::to_vec))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            headers: self.headers.clone(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ObjectTable {
        ObjectTable::new(
            vec!["id".into(), "len".into(), "class".into()],
            vec![vec![1.0, 4.5, 0.0], vec![2.0, 7.0, 2.0]],
        )
        .expect("valid table")
    }

    #[test]
    fn test_value_access() {
        let t = table();
        assert_eq!(t.num_rows(), 2);
        assert_eq!(t.num_columns(), 3);
        assert_eq!(t.value(1, 1).ok(), Some(7.0));
        assert_eq!(t.class_id(1).ok(), Some(2));
    }

    #[test]
    fn test_out_of_range_access() {
        let t = table();
        assert!(matches!(
            t.value(0, 3),
            Err(ObjectVisError::InvalidColumnIndex { column: 3, .. })
        ));
        assert!(matches!(
            t.value(5, 0),
            Err(ObjectVisError::ObjectIndexOutOfRange { index: 5, .. })
        ));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let result = ObjectTable::new(vec!["a".into()], vec![vec![1.0, 2.0]]);
        assert!(matches!(
            result,
            Err(ObjectVisError::SizeMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_select_rows() {
        let mut t = table().select_rows(&[1]).expect("row exists");
        assert_eq!(t.num_rows(), 1);
        t.set_value(0, 0, 1.0).expect("cell exists");
        assert_eq!(t.row(0).ok(), Some(&[1.0, 7.0, 2.0][..]));
    }
}
