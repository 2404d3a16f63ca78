//! View, selection and deferred-action engine for virtualized tree widgets.
//!
//! The crate is UI-agnostic. It owns:
//! - a flattened, sorted and filtered projection of an external tree
//!   ([`FlattenedView`], rebuilt wholesale whenever it goes stale);
//! - a selection model with single, additive and range selection
//!   ([`SelectionState`]);
//! - a FIFO queue of mutations requested while rows are being drawn
//!   ([`ActionQueue`]), replayed only after the walk ends;
//! - virtualized window and jump tracking ([`Window`], [`JumpController`]).
//!
//! [`Selector`] ties these together for one widget. The tree itself stays
//! with the host behind the [`TreeSource`] trait; [`Tree`] is a ready-made
//! arena implementation.
//!
//! # Quick Example
//!
//! ```
//! use std::convert::Infallible;
//! use tree_selector::{SelectMode, Selector, SelectorSettings, Tree};
//!
//! let mut tree = Tree::new();
//! let docs = tree.insert_folder(None, "docs").unwrap();
//! let readme = tree.insert_leaf(Some(docs), "README.md", 1_u32).unwrap();
//!
//! let mut selector: Selector<Tree<u32>> =
//!     Selector::new(SelectorSettings::default());
//! let flag = selector.dirty_flag();
//! tree.on_change(move |_| flag.mark());
//! selector.expand(docs);
//!
//! selector
//!     .draw(&tree, 0..10, |row| {
//!         if row.id() == readme {
//!             row.request_select(Some(readme), SelectMode::REPLACE);
//!         }
//!         Ok::<(), Infallible>(())
//!     })
//!     .unwrap();
//!
//! assert_eq!(selector.selected_index(), Some(1));
//! assert_eq!(selector.take_events().len(), 1);
//! ```

mod actions;
mod arena;
mod dirty;
mod error;
mod event;
mod filter;
mod jump;
mod selection;
mod selector;
mod settings;
mod sort;
mod source;
mod view;
mod window;

pub use actions::{Action, ActionBatch, ActionQueue};
pub use arena::{NodeId, Tree, TreeChange};
pub use dirty::DirtyFlag;
pub use error::{Diagnostics, RenderFault, SettingsError};
pub use event::{ScrollRequest, SelectionChange, SelectorEvent};
pub use filter::{Filter, LeafPredicate, TextFilter};
pub use jump::JumpController;
pub use selection::{PayloadChange, PrimaryLeaf, SelectMode, SelectionState};
pub use selector::{FrameReport, RowContext, Selector};
pub use settings::SelectorSettings;
pub use sort::{SortMode, compare_titles};
pub use source::{Node, TreeSource};
pub use view::{
    Expansion, FlattenedView, RebuildParams, Row, ancestors_of, rebuild,
};
pub use window::{Cursor, Window, visible_range};
