//! World Map Accumulator.
//!
//! A fixed square grid of additive evidence, one counter per channel per
//! cell. Sightings only ever add; nothing decays and nothing is overwritten,
//! so a transient misclassification never erases earlier evidence. Turning
//! magnitudes into confidence is left to consumers.

use crate::transform::GridCell;

/// Evidence added per sighting unless configured otherwise.
pub const DEFAULT_INCREMENT: u32 = 255;

/// The evidence channels, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapChannel {
    Obstacle = 0,
    Rock = 1,
    Navigable = 2,
}

/// Additive per-channel evidence grid indexed by world cell.
///
/// Row index is world `y`, column index is world `x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldMap {
    dimension: usize,
    increment: u32,
    cells: Vec<[u32; 3]>,
}

impl WorldMap {
    /// An empty `dimension × dimension` map adding [`DEFAULT_INCREMENT`] per
    /// sighting.
    pub fn new(dimension: usize) -> Self {
        Self::with_increment(dimension, DEFAULT_INCREMENT)
    }

    pub fn with_increment(dimension: usize, increment: u32) -> Self {
        Self {
            dimension,
            increment,
            cells: vec![[0; 3]; dimension * dimension],
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Add one increment to `channel` for every cell in `cells`.
    ///
    /// Duplicates are counted once per occurrence. Counters saturate at
    /// `u32::MAX` rather than wrap.
    pub fn accumulate(&mut self, cells: &[GridCell], channel: MapChannel) {
        let ch = channel as usize;
        for cell in cells {
            debug_assert!(cell.x < self.dimension && cell.y < self.dimension);
            let slot = &mut self.cells[cell.y * self.dimension + cell.x][ch];
            *slot = slot.saturating_add(self.increment);
        }
    }

    /// Evidence recorded for world cell `(x, y)` on `channel`.
    pub fn value(&self, x: usize, y: usize, channel: MapChannel) -> u32 {
        self.cells[y * self.dimension + x][channel as usize]
    }

    /// Sum of all evidence on `channel`.
    pub fn channel_total(&self, channel: MapChannel) -> u64 {
        self.cells.iter().map(|c| u64::from(c[channel as usize])).sum()
    }

    /// Number of cells with any evidence on `channel`.
    pub fn cells_seen(&self, channel: MapChannel) -> usize {
        self.cells.iter().filter(|c| c[channel as usize] > 0).count()
    }
}
