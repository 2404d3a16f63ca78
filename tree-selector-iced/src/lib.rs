//! [`iced`] rendering for a [`tree_selector::Selector`].
//!
//! [`TreeView`] draws the virtualized window of a selector: ancestor header
//! rows first, then the visible rows, each indented by depth and highlighted
//! from the selection. Presses are turned into messages; the application
//! applies them to the selector in `update` and calls
//! [`Selector::sync`](tree_selector::Selector::sync) before the next view.
//!
//! See `examples/explorer.rs` for a complete runnable example.

mod view;

pub use view::{TreeRowContext, TreeView};
