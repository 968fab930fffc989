//! Grid configuration.

/// Tunables for grid materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    /// Rows materialized even when the table has fewer records.
    pub min_rows: u32,
}

impl GridConfig {
    /// Default densification floor.
    pub const DEFAULT_MIN_ROWS: u32 = 5;

    /// Rows never materialized past this count. Records at or beyond it are
    /// skipped.
    pub const MAX_ROWS: u32 = 100_000;

    pub fn with_min_rows(mut self, min_rows: u32) -> Self {
        self.min_rows = min_rows;
        self
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_rows: Self::DEFAULT_MIN_ROWS,
        }
    }
}
