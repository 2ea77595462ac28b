//! Semantic column ids and their mapping onto object table columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ObjectVisError, Result};

/// Semantic meaning of an object table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColumnId {
    Id,
    StartX,
    StartY,
    StartZ,
    EndX,
    EndY,
    EndZ,
    CenterX,
    CenterY,
    CenterZ,
    Length,
    Diameter,
    Phi,
    Theta,
    DimensionX,
    DimensionY,
    DimensionZ,
    CurvedLength,
}

impl ColumnId {
    pub const START: [Self; 3] = [Self::StartX, Self::StartY, Self::StartZ];
    pub const END: [Self; 3] = [Self::EndX, Self::EndY, Self::EndZ];
    pub const CENTER: [Self; 3] = [Self::CenterX, Self::CenterY, Self::CenterZ];
    pub const DIMENSION: [Self; 3] = [Self::DimensionX, Self::DimensionY, Self::DimensionZ];
}

/// Maps semantic column ids to table column indices.
///
/// Shared read-only between the table loader and every visualization built
/// from the same table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    columns: BTreeMap<ColumnId, usize>,
}

impl ColumnMapping {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `id` to table column `column`, replacing a previous entry.
    pub fn insert(&mut self, id: ColumnId, column: usize) -> &mut Self {
        self.columns.insert(id, column);
        self
    }

    /// Builder-style variant of [`ColumnMapping::insert`].
    #[must_use]
    pub fn with(mut self, id: ColumnId, column: usize) -> Self {
        self.insert(id, column);
        self
    }

    /// Returns the table column mapped to `id`, if any.
    pub fn get(&self, id: ColumnId) -> Option<usize> {
        self.columns.get(&id).copied()
    }

    /// Returns the table column mapped to `id`, or [`ObjectVisError::MissingColumn`].
    pub fn require(&self, id: ColumnId) -> Result<usize> {
        self.get(id).ok_or(ObjectVisError::MissingColumn(id))
    }

    /// Returns true if `id` is mapped.
    pub fn contains(&self, id: ColumnId) -> bool {
        self.columns.contains_key(&id)
    }

    /// Returns true if every id in `ids` is mapped.
    pub fn contains_all(&self, ids: &[ColumnId]) -> bool {
        ids.iter().all(|&id| self.contains(id))
    }

    /// Iterates over all entries in column id order.
    pub fn iter(&self) -> impl Iterator<Item = (ColumnId, usize)> + '_ {
        self.columns.iter().map(|(&id, &col)| (id, col))
    }

    /// Number of mapped ids.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Checks that every entry points inside a table with `num_columns` columns.
    pub fn validate(&self, num_columns: usize) -> Result<()> {
        match self.columns.values().find(|&&col| col >= num_columns) {
            Some(&column) => Err(ObjectVisError::InvalidColumnIndex {
                column,
                num_columns,
            }),
            None => Ok(()),
        }
    }
}
