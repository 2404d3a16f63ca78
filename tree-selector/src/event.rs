use crate::selection::PayloadChange;

/// Notifications produced by a [`Selector`](crate::Selector) and drained by
/// the host with [`Selector::take_events`](crate::Selector::take_events).
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorEvent<V, U = ()> {
    /// The resolved primary leaf payload changed.
    SelectionChanged(SelectionChange<V, U>),
    /// A jump target was found; the host should scroll to it.
    ScrollTo(ScrollRequest),
}

/// Payload transition reported after a selection operation.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionChange<V, U = ()> {
    pub previous: Option<V>,
    pub current: Option<V>,
    /// Host state attached to the selector when the change happened.
    pub user_state: U,
}

impl<V, U> SelectionChange<V, U> {
    pub(crate) fn new(change: PayloadChange<V>, user_state: U) -> Self {
        Self {
            previous: change.previous,
            current: change.current,
            user_state,
        }
    }
}

/// Scroll instruction for a resolved jump.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRequest {
    /// Index of the target row in the flattened view.
    pub row: usize,
    /// Vertical offset of the row, `row * row_height`.
    pub offset: f32,
}
