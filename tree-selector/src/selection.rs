//! Selection algebra: single, additive (toggle) and contiguous range
//! selection over the flattened view.
//!
//! The state has two forms. With an empty additional set the primary leaf
//! is the selection. Once the set is non-empty it is authoritative and the
//! primary leaf is cleared; removing members until one remains collapses it
//! back into the primary form.

use std::collections::HashSet;
use std::hash::Hash;

use crate::source::{Node, TreeSource};
use crate::view::FlattenedView;

/// The primary selected leaf with a copy of its payload.
///
/// The payload is kept so change notifications can compare values even after
/// the leaf was edited or removed from the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryLeaf<Id, V> {
    pub id: Id,
    pub value: V,
}

/// Resolved leaf payload before and after a selection operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadChange<V> {
    pub previous: Option<V>,
    pub current: Option<V>,
}

/// How a selection request combines with the current selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectMode {
    /// Toggle membership instead of replacing the selection.
    pub additive: bool,
    /// Select the contiguous run between the primary leaf and the target.
    pub range: bool,
}

impl SelectMode {
    pub const REPLACE: Self = Self {
        additive: false,
        range: false,
    };

    pub const TOGGLE: Self = Self {
        additive: true,
        range: false,
    };

    pub const RANGE: Self = Self {
        additive: false,
        range: true,
    };
}

#[derive(Debug, Clone)]
pub struct SelectionState<Id, V> {
    primary: Option<PrimaryLeaf<Id, V>>,
    additional: HashSet<Id>,
}

impl<Id, V> Default for SelectionState<Id, V> {
    fn default() -> Self {
        Self {
            primary: None,
            additional: HashSet::new(),
        }
    }
}

impl<Id, V> SelectionState<Id, V>
where
    Id: Copy + Eq + Hash + std::fmt::Debug,
    V: Clone + PartialEq,
{
    pub fn primary(&self) -> Option<&PrimaryLeaf<Id, V>> {
        self.primary.as_ref()
    }

    pub fn primary_id(&self) -> Option<Id> {
        self.primary.as_ref().map(|leaf| leaf.id)
    }

    pub fn primary_value(&self) -> Option<&V> {
        self.primary.as_ref().map(|leaf| &leaf.value)
    }

    /// Members of the multi-selection, in no particular order.
    pub fn additional(&self) -> impl Iterator<Item = Id> + '_ {
        self.additional.iter().copied()
    }

    pub fn additional_len(&self) -> usize {
        self.additional.len()
    }

    pub fn is_multi(&self) -> bool {
        !self.additional.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.additional.is_empty()
    }

    /// Whether a row showing `id` should be highlighted.
    pub fn is_selected(&self, id: Id) -> bool {
        if self.additional.is_empty() {
            self.primary_id() == Some(id)
        } else {
            self.additional.contains(&id)
        }
    }

    /// Apply a selection request.
    ///
    /// `target` of `None` clears a plain selection and is ignored by additive
    /// and range requests. Requests that cannot be honored leave the state
    /// untouched. Returns the payload change when the resolved leaf value
    /// differs from the one before the call.
    pub fn select<S>(
        &mut self,
        source: &S,
        view: &FlattenedView<Id>,
        target: Option<Id>,
        mode: SelectMode,
    ) -> Option<PayloadChange<V>>
    where
        S: TreeSource<Id = Id, Value = V>,
    {
        let previous = self.primary_value().cloned();

        if mode.range {
            self.select_range(view, target);
        } else if mode.additive {
            if let Some(target) = target {
                self.toggle(source, target);
            }
        } else {
            self.select_single(source, target);
        }

        self.change_since(previous)
    }

    /// Drop everything.
    pub fn clear(&mut self) -> Option<PayloadChange<V>> {
        let previous = self.primary_value().cloned();
        self.primary = None;
        self.additional.clear();
        self.change_since(previous)
    }

    /// Remove one member of the multi-selection, collapsing a single
    /// remaining leaf back into the primary form.
    pub fn remove_from_additional<S>(
        &mut self,
        source: &S,
        id: Id,
    ) -> Option<PayloadChange<V>>
    where
        S: TreeSource<Id = Id, Value = V>,
    {
        let previous = self.primary_value().cloned();
        if self.additional.remove(&id) {
            self.collapse(source);
        }
        self.change_since(previous)
    }

    /// Forget nodes that no longer exist in `source`.
    pub fn prune_missing<S>(&mut self, source: &S) -> Option<PayloadChange<V>>
    where
        S: TreeSource<Id = Id, Value = V>,
    {
        let previous = self.primary_value().cloned();

        if let Some(id) = self.primary_id() {
            if source.node(id).is_none() {
                self.primary = None;
            }
        }

        let before = self.additional.len();
        self.additional.retain(|id| source.node(*id).is_some());
        if self.additional.len() != before {
            self.collapse(source);
        }

        self.change_since(previous)
    }

    fn select_single<S>(&mut self, source: &S, target: Option<Id>)
    where
        S: TreeSource<Id = Id, Value = V>,
    {
        let Some(target) = target else {
            self.primary = None;
            self.additional.clear();
            return;
        };

        match source.node(target) {
            None => {
                log::debug!("select ignored: node {target:?} is gone");
            },
            Some(Node::Folder { .. }) => self.additional.clear(),
            Some(Node::Leaf { value, .. }) => {
                self.additional.clear();
                self.primary = Some(PrimaryLeaf {
                    id: target,
                    value: value.clone(),
                });
            },
        }
    }

    fn toggle<S>(&mut self, source: &S, target: Id)
    where
        S: TreeSource<Id = Id, Value = V>,
    {
        if source.node(target).is_none() {
            log::debug!("toggle ignored: node {target:?} is gone");
            return;
        }

        if self.additional.is_empty() {
            if let Some(primary) = self.primary.take() {
                self.additional.insert(primary.id);
            }
        }

        if !self.additional.insert(target) {
            self.additional.remove(&target);
        }
        self.primary = None;
        self.collapse(source);
    }

    fn select_range(&mut self, view: &FlattenedView<Id>, target: Option<Id>) {
        if !self.additional.is_empty() {
            log::debug!("range select ignored: multi-selection is active");
            return;
        }

        let (Some(anchor), Some(target)) = (self.primary_id(), target) else {
            return;
        };

        let (Some(from), Some(to)) = (view.position(anchor), view.position(target))
        else {
            log::debug!("range select ignored: endpoint is not visible");
            return;
        };

        let (start, end) = if from <= to { (from, to) } else { (to, from) };
        if start == end {
            return;
        }

        let span = &view.rows()[start..=end];
        let depth = span[0].depth;
        if span.iter().any(|row| row.depth != depth) {
            log::debug!("range select ignored: rows {start}..={end} mix depths");
            return;
        }

        self.additional.extend(span.iter().map(|row| row.id));
        self.primary = None;
    }

    /// A set reduced to one resolvable leaf becomes the primary selection.
    fn collapse<S>(&mut self, source: &S)
    where
        S: TreeSource<Id = Id, Value = V>,
    {
        if self.additional.len() != 1 {
            return;
        }

        let Some(id) = self.additional.iter().next().copied() else {
            return;
        };

        if let Some(Node::Leaf { value, .. }) = source.node(id) {
            self.primary = Some(PrimaryLeaf {
                id,
                value: value.clone(),
            });
            self.additional.clear();
        }
    }

    fn change_since(&self, previous: Option<V>) -> Option<PayloadChange<V>> {
        let current = self.primary_value().cloned();
        if previous == current {
            None
        } else {
            Some(PayloadChange { previous, current })
        }
    }
}
