//! Loaded datasets and their current visualization.

use std::collections::BTreeMap;
use std::sync::Arc;

use objectvis_core::{ObjectVisError, ObjectVisType, ObjectsData, Result, Rgba, VisOptions};
use objectvis_structures::{ObjectVis, ObjectVisualization};

/// A dataset together with the parameters its visualization was built with.
#[derive(Debug)]
struct Entry {
    vis: ObjectVis,
    color: Rgba,
    options: VisOptions,
}

/// Registry of loaded datasets, keyed by name.
///
/// Each dataset has exactly one visualization at a time. Switching the
/// visualization type discards the old one and builds a new one from the
/// same shared dataset.
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<String, Entry>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a visualization for `data` and registers it under `name`.
    ///
    /// Returns an error if a dataset with the same name is already loaded.
    pub fn load(
        &mut self,
        name: impl Into<String>,
        data: Arc<ObjectsData>,
        vis_type: ObjectVisType,
        color: Rgba,
        options: &VisOptions,
    ) -> Result<&mut ObjectVis> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(ObjectVisError::DatasetExists(name));
        }
        let vis = ObjectVis::create(data, vis_type, color, options)?;
        log::info!("loaded dataset '{name}' as {}", vis.type_name());
        let entry = self.entries.entry(name).or_insert(Entry {
            vis,
            color,
            options: options.clone(),
        });
        Ok(&mut entry.vis)
    }

    /// Replaces the visualization of a dataset by one of another type.
    ///
    /// On error the previous visualization stays in place.
    pub fn switch_vis_type(&mut self, name: &str, vis_type: ObjectVisType) -> Result<&mut ObjectVis> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| ObjectVisError::DatasetNotFound(name.to_string()))?;
        let data = Arc::clone(entry.vis.data());
        entry.vis = ObjectVis::create(data, vis_type, entry.color, &entry.options)?;
        log::info!("switched dataset '{name}' to {}", entry.vis.type_name());
        Ok(&mut entry.vis)
    }

    /// Removes a dataset and returns its visualization.
    pub fn unload(&mut self, name: &str) -> Result<ObjectVis> {
        let entry = self
            .entries
            .remove(name)
            .ok_or_else(|| ObjectVisError::DatasetNotFound(name.to_string()))?;
        log::info!("unloaded dataset '{name}'");
        Ok(entry.vis)
    }

    pub fn get(&self, name: &str) -> Option<&ObjectVis> {
        self.entries.get(name).map(|e| &e.vis)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ObjectVis> {
        self.entries.get_mut(name).map(|e| &mut e.vis)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names of all loaded datasets, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use objectvis_core::{ColumnId, ColumnMapping, ObjectTable, ObjectType};

    use super::*;

    fn data() -> Arc<ObjectsData> {
        let table = ObjectTable::from_rows(vec![
            vec![0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 1.0, 0.0],
            vec![0.0, 3.0, 0.0, 2.0, 3.0, 0.0, 1.0, 1.0],
        ])
        .expect("valid table");
        let mapping = ColumnMapping::new()
            .with(ColumnId::StartX, 0)
            .with(ColumnId::StartY, 1)
            .with(ColumnId::StartZ, 2)
            .with(ColumnId::EndX, 3)
            .with(ColumnId::EndY, 4)
            .with(ColumnId::EndZ, 5)
            .with(ColumnId::Diameter, 6);
        Arc::new(ObjectsData::new(ObjectType::Fibers, table, Arc::new(mapping)).expect("valid"))
    }

    #[test]
    fn test_load_and_duplicate_name() {
        let mut registry = Registry::new();
        let options = VisOptions::default();
        registry
            .load("a", data(), ObjectVisType::Line, Rgba::WHITE, &options)
            .expect("first load");
        assert!(matches!(
            registry.load("a", data(), ObjectVisType::Line, Rgba::WHITE, &options),
            Err(ObjectVisError::DatasetExists(_))
        ));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("a"));
    }

    #[test]
    fn test_switch_keeps_shared_data() {
        let mut registry = Registry::new();
        let shared = data();
        registry
            .load(
                "fibers",
                Arc::clone(&shared),
                ObjectVisType::Line,
                Rgba::WHITE,
                &VisOptions::default(),
            )
            .expect("load");
        let vis = registry
            .switch_vis_type("fibers", ObjectVisType::Cylinder)
            .expect("diameter column mapped");
        assert_eq!(vis.vis_type(), ObjectVisType::Cylinder);
        assert!(Arc::ptr_eq(vis.data(), &shared));

        // ellipsoids need center columns, so the cylinders stay
        assert!(registry
            .switch_vis_type("fibers", ObjectVisType::Ellipsoid)
            .is_err());
        assert_eq!(
            registry.get("fibers").map(ObjectVis::vis_type),
            Some(ObjectVisType::Cylinder)
        );
    }

    #[test]
    fn test_unload() {
        let mut registry = Registry::new();
        registry
            .load("x", data(), ObjectVisType::NoVis, Rgba::WHITE, &VisOptions::default())
            .expect("load");
        assert!(registry.unload("x").is_ok());
        assert!(registry.is_empty());
        assert!(matches!(
            registry.unload("x"),
            Err(ObjectVisError::DatasetNotFound(_))
        ));
        assert_eq!(registry.names().count(), 0);
    }
}
