//! Arena-backed reference implementation of [`TreeSource`].
//!
//! Node identifiers are generational keys: once a node is removed its
//! [`NodeId`] stops resolving, which is exactly what the selector expects
//! from a host tree that deletes nodes between frames.

use slotmap::{SlotMap, new_key_type};

use crate::source::{Node, TreeSource};

new_key_type! {
    /// Identifier of a node stored in a [`Tree`].
    pub struct NodeId;
}

/// Structural change reported to listeners registered with
/// [`Tree::on_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeChange {
    Inserted(NodeId),
    Removed(NodeId),
    Renamed(NodeId),
    ValueChanged(NodeId),
    Moved(NodeId),
}

type ChangeListener = dyn FnMut(&TreeChange);

#[derive(Debug)]
enum Entry<V> {
    Folder { name: String, children: Vec<NodeId> },
    Leaf { name: String, value: V },
}

#[derive(Debug)]
struct Slot<V> {
    parent: Option<NodeId>,
    entry: Entry<V>,
}

/// Mutable folder/leaf hierarchy with change notifications.
pub struct Tree<V> {
    nodes: SlotMap<NodeId, Slot<V>>,
    roots: Vec<NodeId>,
    listeners: Vec<Box<ChangeListener>>,
}

impl<V> Default for Tree<V> {
    fn default() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            roots: Vec::new(),
            listeners: Vec::new(),
        }
    }
}

impl<V> Tree<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener invoked after every structural or payload change.
    pub fn on_change(&mut self, listener: impl FnMut(&TreeChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Parent folder of a node, `None` for top-level or missing nodes.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|slot| slot.parent)
    }

    /// Insert a folder under `parent` (or at the top level).
    ///
    /// Returns `None` when `parent` is missing or is a leaf.
    pub fn insert_folder(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
    ) -> Option<NodeId> {
        self.insert(
            parent,
            Entry::Folder {
                name: name.into(),
                children: Vec::new(),
            },
        )
    }

    /// Insert a leaf under `parent` (or at the top level).
    ///
    /// Returns `None` when `parent` is missing or is a leaf.
    pub fn insert_leaf(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        value: V,
    ) -> Option<NodeId> {
        self.insert(
            parent,
            Entry::Leaf {
                name: name.into(),
                value,
            },
        )
    }

    /// Remove a node together with its whole subtree.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes.get(id).map(|slot| slot.parent) else {
            return false;
        };

        self.detach(id, parent);

        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(slot) = self.nodes.remove(current) {
                if let Entry::Folder { children, .. } = slot.entry {
                    pending.extend(children);
                }
            }
        }

        self.notify(TreeChange::Removed(id));
        true
    }

    pub fn rename(&mut self, id: NodeId, new_name: impl Into<String>) -> bool {
        let Some(slot) = self.nodes.get_mut(id) else {
            return false;
        };

        match &mut slot.entry {
            Entry::Folder { name, .. } | Entry::Leaf { name, .. } => {
                *name = new_name.into();
            },
        }

        self.notify(TreeChange::Renamed(id));
        true
    }

    /// Replace the payload of a leaf. Folders are left untouched.
    pub fn set_value(&mut self, id: NodeId, new_value: V) -> bool {
        let Some(Slot {
            entry: Entry::Leaf { value, .. },
            ..
        }) = self.nodes.get_mut(id)
        else {
            return false;
        };

        *value = new_value;
        self.notify(TreeChange::ValueChanged(id));
        true
    }

    /// Move a node under a new parent, appending it to the parent's children.
    ///
    /// Moving a folder into its own subtree is rejected.
    pub fn move_node(
        &mut self,
        id: NodeId,
        new_parent: Option<NodeId>,
    ) -> bool {
        let Some(old_parent) = self.nodes.get(id).map(|slot| slot.parent)
        else {
            return false;
        };

        if let Some(target) = new_parent {
            if !self.is_folder(target) || self.is_ancestor_or_self(id, target)
            {
                return false;
            }
        }

        self.detach(id, old_parent);
        self.attach(id, new_parent);
        if let Some(slot) = self.nodes.get_mut(id) {
            slot.parent = new_parent;
        }

        self.notify(TreeChange::Moved(id));
        true
    }

    fn insert(
        &mut self,
        parent: Option<NodeId>,
        entry: Entry<V>,
    ) -> Option<NodeId> {
        if let Some(parent) = parent {
            if !self.is_folder(parent) {
                return None;
            }
        }

        let id = self.nodes.insert(Slot { parent, entry });
        self.attach(id, parent);
        self.notify(TreeChange::Inserted(id));
        Some(id)
    }

    fn is_folder(&self, id: NodeId) -> bool {
        matches!(
            self.nodes.get(id),
            Some(Slot {
                entry: Entry::Folder { .. },
                ..
            })
        )
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn attach(&mut self, id: NodeId, parent: Option<NodeId>) {
        match parent {
            None => self.roots.push(id),
            Some(parent) => {
                if let Some(Slot {
                    entry: Entry::Folder { children, .. },
                    ..
                }) = self.nodes.get_mut(parent)
                {
                    children.push(id);
                }
            },
        }
    }

    fn detach(&mut self, id: NodeId, parent: Option<NodeId>) {
        match parent {
            None => self.roots.retain(|root| *root != id),
            Some(parent) => {
                if let Some(Slot {
                    entry: Entry::Folder { children, .. },
                    ..
                }) = self.nodes.get_mut(parent)
                {
                    children.retain(|child| *child != id);
                }
            },
        }
    }

    fn notify(&mut self, change: TreeChange) {
        for listener in &mut self.listeners {
            listener(&change);
        }
    }
}

impl<V: Clone + PartialEq> TreeSource for Tree<V> {
    type Id = NodeId;
    type Value = V;

    fn children(&self, parent: Option<NodeId>) -> &[NodeId] {
        match parent {
            None => &self.roots,
            Some(id) => match self.nodes.get(id) {
                Some(Slot {
                    entry: Entry::Folder { children, .. },
                    ..
                }) => children,
                _ => &[],
            },
        }
    }

    fn node(&self, id: NodeId) -> Option<Node<'_, V>> {
        self.nodes.get(id).map(|slot| match &slot.entry {
            Entry::Folder { name, .. } => Node::Folder { name },
            Entry::Leaf { name, value } => Node::Leaf { name, value },
        })
    }

    fn descendant_count(&self) -> usize {
        self.nodes.len()
    }
}
