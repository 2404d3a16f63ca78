use std::fmt;

use thiserror::Error;

/// Traversal state captured when a draw callback fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Row being drawn when the callback failed.
    pub index: usize,
    /// Depth of that row.
    pub depth: usize,
    /// Exclusive end of the window being drawn.
    pub end: usize,
    /// Length of the flattened view.
    pub row_count: usize,
    /// Whether a filter change was still waiting for a rebuild.
    pub filter_dirty: bool,
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} depth {} end {} of {} rows, filter dirty: {}",
            self.index,
            self.depth,
            self.end,
            self.row_count,
            self.filter_dirty
        )
    }
}

/// A draw callback error, augmented with the traversal snapshot.
#[derive(Debug, Error)]
#[error("tree draw callback failed at {snapshot}: {source}")]
pub struct RenderFault<E>
where
    E: std::error::Error + 'static,
{
    pub snapshot: Diagnostics,
    pub source: E,
}

/// Errors emitted while reading or writing selector settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("selector settings JSON failed: {0}")]
    Json(#[from] serde_json::Error),
}
