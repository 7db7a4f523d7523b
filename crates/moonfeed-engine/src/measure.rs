/// Measured heights of feed rows.
///
/// Rows are indexed by their position in the filtered feed. That list only
/// grows at the end, so an index keeps its content until the whole cache is
/// reset, and entries are never invalidated one by one.

/// Layout progress of a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    /// Rendered with the default estimate; real height not observed yet.
    PendingFirstMeasure,
    /// Height recorded from an observed layout. Never goes back to pending.
    Measured,
}

#[derive(Debug, Clone)]
pub struct RowMeasurementCache {
    heights: Vec<Option<u32>>,
    default_height: u32,
    measured: usize,
}

impl RowMeasurementCache {
    pub fn new(default_height: u32) -> Self {
        Self {
            heights: Vec::new(),
            default_height,
            measured: 0,
        }
    }

    pub fn default_height(&self) -> u32 {
        self.default_height
    }

    /// Height of `row`, or the default estimate if it was never measured
    /// (including any index past the end).
    #[inline]
    pub fn get(&self, row: usize) -> u32 {
        self.heights
            .get(row)
            .copied()
            .flatten()
            .unwrap_or(self.default_height)
    }

    /// Record an observed height. Returns the previous effective height.
    pub fn set(&mut self, row: usize, height: u32) -> u32 {
        if row >= self.heights.len() {
            self.heights.resize(row + 1, None);
        }
        match self.heights[row].replace(height) {
            Some(prev) => prev,
            None => {
                self.measured += 1;
                self.default_height
            }
        }
    }

    #[inline]
    pub fn row_state(&self, row: usize) -> RowState {
        match self.heights.get(row) {
            Some(Some(_)) => RowState::Measured,
            _ => RowState::PendingFirstMeasure,
        }
    }

    /// Number of rows with a recorded height.
    pub fn measured_count(&self) -> usize {
        self.measured
    }

    /// Drop every measurement, e.g. when the wrap width changes.
    pub fn invalidate_all(&mut self) {
        self.heights.clear();
        self.measured = 0;
    }
}
