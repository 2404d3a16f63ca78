use std::hash::Hash;

use crate::event::ScrollRequest;
use crate::view::FlattenedView;

/// Pending "scroll to" target.
///
/// A target lives for exactly one resolution attempt: [`JumpController::take`]
/// hands it to the caller and forgets it whether or not it is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpController<Id> {
    target: Option<Id>,
}

impl<Id> Default for JumpController<Id> {
    fn default() -> Self {
        Self { target: None }
    }
}

impl<Id: Copy + Eq + Hash + std::fmt::Debug> JumpController<Id> {
    /// Replace the pending target. Last request wins.
    pub fn request(&mut self, id: Id) {
        if let Some(previous) = self.target.replace(id) {
            if previous != id {
                log::debug!("jump to {previous:?} superseded by {id:?}");
            }
        }
    }

    pub fn pending(&self) -> Option<Id> {
        self.target
    }

    pub fn take(&mut self) -> Option<Id> {
        self.target.take()
    }

    /// Locate `target` in `view` and size the scroll offset.
    pub fn resolve(
        view: &FlattenedView<Id>,
        target: Id,
        row_height: f32,
    ) -> Option<ScrollRequest> {
        let Some(row) = view.position(target) else {
            log::debug!("jump target {target:?} is not in the view, dropping");
            return None;
        };

        Some(ScrollRequest {
            row,
            offset: row as f32 * row_height,
        })
    }
}
