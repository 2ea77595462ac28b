//! Renderer-side snapshots of poly object visualizations.
//!
//! An actor holds the geometry last handed to a renderer and refreshes it from
//! the visualization's dirty flags: color-only changes copy the color buffer,
//! anything else replaces the whole geometry. An actor is bound to one
//! renderer; once the renderer is reset, the actor has to be rebuilt.

use objectvis_core::{ObjectVisError, PolyData, Result};
use objectvis_structures::{ColoredPolyObjectVis, ObjectVisualization};

/// A render target that actors are attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renderer {
    id: u64,
    generation: u64,
}

impl Renderer {
    pub fn new(id: u64) -> Self {
        Self { id, generation: 0 }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Drops everything uploaded so far; existing actors become stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        log::debug!("renderer {} reset to generation {}", self.id, self.generation);
    }

    pub fn handle(&self) -> RendererRef {
        RendererRef {
            id: self.id,
            generation: self.generation,
        }
    }
}

/// Identifies a renderer at one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RendererRef {
    pub id: u64,
    pub generation: u64,
}

/// Geometry of a poly visualization as currently shown by a renderer.
#[derive(Debug, Clone)]
pub struct PolyObjectActor {
    renderer: RendererRef,
    geometry: PolyData,
}

impl PolyObjectActor {
    /// Attaches the current output of `vis` to `renderer`.
    ///
    /// Pending changes of `vis` are consumed, since the snapshot already
    /// contains them.
    pub fn new(renderer: &Renderer, vis: &mut ColoredPolyObjectVis) -> Self {
        vis.take_dirty();
        Self {
            renderer: renderer.handle(),
            geometry: vis.output().clone(),
        }
    }

    pub fn renderer(&self) -> RendererRef {
        self.renderer
    }

    pub fn geometry(&self) -> &PolyData {
        &self.geometry
    }

    /// Brings the snapshot up to date with `vis`.
    ///
    /// Returns whether anything was refreshed. Fails without consuming any
    /// change if the actor does not belong to the current state of `renderer`.
    pub fn sync(&mut self, renderer: &Renderer, vis: &mut ColoredPolyObjectVis) -> Result<bool> {
        let current = renderer.handle();
        if current != self.renderer {
            return Err(ObjectVisError::StaleRenderer {
                renderer: current.id,
                actor_generation: self.renderer.generation,
                renderer_generation: current.generation,
            });
        }

        let flags = vis.take_dirty();
        if flags.render || vis.output().num_points() != self.geometry.num_points() {
            self.geometry = vis.output().clone();
        } else if flags.colors {
            self.geometry.colors.clone_from(&vis.output().colors);
        }
        Ok(flags.any())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use objectvis_core::{
        ColumnId, ColumnMapping, ObjectTable, ObjectType, ObjectsData, Rgba, VisOptions,
    };

    use super::*;

    fn cylinders() -> ColoredPolyObjectVis {
        let table = ObjectTable::from_rows(vec![
            vec![0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 1.0],
            vec![0.0, 2.0, 0.0, 4.0, 2.0, 0.0, 1.0],
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
        let data = ObjectsData::new(ObjectType::Fibers, table, Arc::new(mapping)).expect("valid");
        ColoredPolyObjectVis::cylinder(Arc::new(data), Rgba::WHITE, &VisOptions::default())
            .expect("cylinders")
    }

    #[test]
    fn test_sync_copies_colors() {
        let renderer = Renderer::new(1);
        let mut vis = cylinders();
        let mut actor = PolyObjectActor::new(&renderer, &mut vis);
        assert!(!actor.sync(&renderer, &mut vis).expect("fresh"));

        vis.set_color(Rgba::rgb(0, 0, 255));
        assert!(actor.sync(&renderer, &mut vis).expect("fresh"));
        assert_eq!(actor.geometry().colors, vis.colors());
    }

    #[test]
    fn test_sync_replaces_geometry() {
        let renderer = Renderer::new(1);
        let mut vis = cylinders();
        let mut actor = PolyObjectActor::new(&renderer, &mut vis);
        let before = actor.geometry().bounds();

        vis.set_diameter_factor(3.0).expect("cylinders");
        assert!(actor.sync(&renderer, &mut vis).expect("fresh"));
        assert_eq!(actor.geometry(), vis.output());
        assert_ne!(actor.geometry().bounds(), before);
    }

    #[test]
    fn test_stale_after_reset() {
        let mut renderer = Renderer::new(7);
        let mut vis = cylinders();
        let mut actor = PolyObjectActor::new(&renderer, &mut vis);
        renderer.reset();
        vis.set_color(Rgba::BLACK);

        let err = actor.sync(&renderer, &mut vis).unwrap_err();
        assert!(matches!(
            err,
            ObjectVisError::StaleRenderer {
                renderer: 7,
                actor_generation: 0,
                renderer_generation: 1
            }
        ));
        // the change is still pending for a rebuilt actor
        assert!(vis.take_dirty().colors);
    }
}
