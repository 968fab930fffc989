//! Version-tagged snapshots of derived state.

/// Data paired with the view version it was taken at.
///
/// A renderer keeps the last snapshot and compares its `source_version`
/// with [`TableView::version`](crate::TableView::version) to decide whether
/// to redraw.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    /// The snapshot.
    pub data: T,
    /// View version when the snapshot was taken.
    pub source_version: u64,
}

impl<T> Versioned<T> {
    /// Whether the view has changed since this snapshot was taken.
    #[inline]
    pub fn is_stale(&self, current_version: u64) -> bool {
        self.source_version != current_version
    }
}
