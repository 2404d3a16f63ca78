use std::hash::Hash;
use std::ops::Range;

use crate::view::FlattenedView;

/// Slice of the flattened view drawn in the current frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Window {
    start: usize,
    end: usize,
    headers: Vec<usize>,
}

impl Window {
    /// Map a clipper's visible-range hint onto `view`.
    ///
    /// The hint is clamped to the view; a hint that no longer fits (the view
    /// was rebuilt after the clipper ran) is trimmed rather than rejected.
    pub fn new<Id: Copy + Eq + Hash>(
        view: &FlattenedView<Id>,
        hint: Range<usize>,
    ) -> Self {
        let len = view.len();
        let end = hint.end.min(len);
        let start = hint.start.min(end);
        if hint.start > end {
            log::warn!(
                "visible range {}..{} starts past the view, clamped to \
                 {start}..{end} ({len} rows)",
                hint.start,
                hint.end
            );
        } else if end != hint.end {
            log::debug!(
                "visible range {}..{} clamped to {start}..{end} ({len} rows)",
                hint.start,
                hint.end
            );
        }

        Self {
            start,
            end,
            headers: ancestor_headers(view, start),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Rows of the folders enclosing the first visible row, outermost first.
    ///
    /// Non-empty when the window opens mid-subtree; hosts draw these as
    /// synthetic header rows so the indentation has context.
    pub fn headers(&self) -> &[usize] {
        &self.headers
    }

    pub fn needs_headers(&self) -> bool {
        !self.headers.is_empty()
    }
}

/// Traversal position reported in diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub index: usize,
    pub depth: usize,
    pub end: usize,
}

fn ancestor_headers<Id: Copy + Eq + Hash>(
    view: &FlattenedView<Id>,
    start: usize,
) -> Vec<usize> {
    let Some(first) = view.get(start) else {
        return Vec::new();
    };

    let mut headers = Vec::with_capacity(first.depth);
    let mut wanted = first.depth;
    for index in (0..start).rev() {
        if wanted == 0 {
            break;
        }
        if view.rows()[index].depth == wanted - 1 {
            headers.push(index);
            wanted -= 1;
        }
    }

    headers.reverse();
    headers
}

/// Rows intersecting a viewport, for hosts without their own clipper.
///
/// All rows share `row_height`. Non-finite or non-positive geometry yields
/// an empty range.
pub fn visible_range(
    scroll_offset: f32,
    viewport_height: f32,
    row_height: f32,
    len: usize,
) -> Range<usize> {
    if !(row_height > 0.0) || !viewport_height.is_finite() || len == 0 {
        return 0..0;
    }

    let offset = if scroll_offset.is_finite() {
        scroll_offset.max(0.0)
    } else {
        0.0
    };
    let start = ((offset / row_height).floor() as usize).min(len);
    let end = (((offset + viewport_height.max(0.0)) / row_height).ceil()
        as usize)
        .min(len);

    start..end.max(start)
}
