//! Uniform spatial grid for broad-phase neighbor queries
//!
//! Buckets entry indices by cell. With the cell size set to the query radius,
//! every pair closer than the radius lies in the same or an adjacent cell.

use std::collections::HashMap;

use glam::Vec2;

#[derive(Debug, Default)]
pub struct SpatialGrid {
    cell: f32,
    buckets: HashMap<(i32, i32), Vec<usize>>,
}

impl SpatialGrid {
    pub fn new(cell: f32) -> Self {
        Self {
            cell: cell.max(1.0),
            buckets: HashMap::new(),
        }
    }

    /// Rebuild from `(index, position)` pairs
    pub fn rebuild(&mut self, cell: f32, entries: impl IntoIterator<Item = (usize, Vec2)>) {
        self.cell = cell.max(1.0);
        self.buckets.clear();
        for (index, pos) in entries {
            let key = self.key(pos);
            self.buckets.entry(key).or_default().push(index);
        }
    }

    fn key(&self, pos: Vec2) -> (i32, i32) {
        (
            (pos.x / self.cell).floor() as i32,
            (pos.y / self.cell).floor() as i32,
        )
    }

    /// Occupied cells
    pub fn cell_count(&self) -> usize {
        self.buckets.len()
    }

    /// Indices in the 3x3 block of cells around `pos`
    pub fn neighbors(&self, pos: Vec2) -> impl Iterator<Item = usize> + '_ {
        let (cx, cy) = self.key(pos);
        (-1..=1)
            .flat_map(move |dx| (-1..=1).map(move |dy| (cx + dx, cy + dy)))
            .filter_map(|key| self.buckets.get(&key))
            .flat_map(|bucket| bucket.iter().copied())
    }
}
