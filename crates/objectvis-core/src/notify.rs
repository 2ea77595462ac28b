//! Change notification for visualizations.
//!
//! A visualization emits at most one event per logical operation, after all
//! of that operation's buffer writes are done. Consumers either subscribe a
//! callback or poll the dirty flags before their next draw.

use std::fmt;

/// What changed in a visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisEvent {
    /// Only point colors changed; existing geometry can be re-mapped.
    DataChanged,
    /// Geometry or transfer function changed; re-fetch and re-render.
    RenderRequired,
}

/// Pending changes not yet consumed by a renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyFlags {
    pub colors: bool,
    pub render: bool,
}

impl DirtyFlags {
    /// Returns true if anything changed.
    pub fn any(self) -> bool {
        self.colors || self.render
    }
}

type Observer = Box<dyn FnMut(VisEvent)>;

/// Observer list plus dirty flags.
#[derive(Default)]
pub struct Notifier {
    observers: Vec<Observer>,
    dirty: DirtyFlags,
}

impl Notifier {
    /// Creates a notifier without observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback invoked synchronously for every event.
    pub fn subscribe(&mut self, observer: impl FnMut(VisEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Marks the change and informs all observers.
    pub fn emit(&mut self, event: VisEvent) {
        match event {
            VisEvent::DataChanged => self.dirty.colors = true,
            VisEvent::RenderRequired => self.dirty.render = true,
        }
        for observer in &mut self.observers {
            observer(event);
        }
    }

    /// Pending changes, without clearing them.
    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    /// Returns and clears the pending changes.
    pub fn take_dirty(&mut self) -> DirtyFlags {
        std::mem::take(&mut self.dirty)
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observers.len())
            .field("dirty", &self.dirty)
            .finish()
    }
}
