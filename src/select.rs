//! Detail drill-down cursor.
//!
//! Tracks the one cell the user has picked out of the activity grid so the
//! detail pane can render its datapoints. Replace-only: no merging, no
//! history.

use crate::index::Datapoint;

#[derive(Debug, Clone, Default)]
pub struct DetailSelection {
    items: Vec<Datapoint>,
}

impl DetailSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with the contents of one grid cell.
    pub fn select(&mut self, cell: &[Datapoint]) {
        self.items = cell.to_vec();
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[Datapoint] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
