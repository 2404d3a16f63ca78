//! Flattened projection of an external tree.
//!
//! The projection is rebuilt wholesale from the [`TreeSource`] whenever the
//! selector is dirty; it is never patched in place. A rebuild walks every
//! node once to decide which subtrees contain a matching leaf, then emits
//! rows depth first in sort order.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use crate::filter::Filter;
use crate::sort::SortMode;
use crate::source::{Node, TreeSource};

/// One visible entry of the flattened tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row<Id> {
    pub id: Id,
    /// Distance from the top level (`0` for top-level rows).
    pub depth: usize,
    pub is_folder: bool,
}

/// Ordered rows currently eligible for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedView<Id: Eq + Hash> {
    rows: Vec<Row<Id>>,
    positions: HashMap<Id, usize>,
}

impl<Id: Copy + Eq + Hash> Default for FlattenedView<Id> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<Id: Copy + Eq + Hash> FlattenedView<Id> {
    fn from_rows(rows: Vec<Row<Id>>) -> Self {
        let positions = rows
            .iter()
            .enumerate()
            .map(|(index, row)| (row.id, index))
            .collect();
        Self { rows, positions }
    }

    pub fn rows(&self) -> &[Row<Id>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Row<Id>> {
        self.rows.get(index)
    }

    /// Index of the row showing `id`, if it is visible.
    pub fn position(&self, id: Id) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn contains(&self, id: Id) -> bool {
        self.positions.contains_key(&id)
    }
}

/// Folders the user has opened.
#[derive(Debug, Clone)]
pub struct Expansion<Id> {
    open: HashSet<Id>,
}

impl<Id> Default for Expansion<Id> {
    fn default() -> Self {
        Self {
            open: HashSet::new(),
        }
    }
}

impl<Id: Copy + Eq + Hash> Expansion<Id> {
    pub fn is_open(&self, id: Id) -> bool {
        self.open.contains(&id)
    }

    /// Open or close a folder, returning whether the state changed.
    pub fn set(&mut self, id: Id, open: bool) -> bool {
        if open {
            self.open.insert(id)
        } else {
            self.open.remove(&id)
        }
    }

    /// Flip a folder and return its new state.
    pub fn toggle(&mut self, id: Id) -> bool {
        let open = !self.is_open(id);
        self.set(id, open);
        open
    }

    /// Keep only the open ids accepted by `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(Id) -> bool) {
        self.open.retain(|id| keep(*id));
    }

    pub fn clear(&mut self) -> bool {
        let changed = !self.open.is_empty();
        self.open.clear();
        changed
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }
}

/// Inputs of a single rebuild besides the tree itself.
pub struct RebuildParams<'a, S: TreeSource> {
    pub sort: SortMode,
    pub filter: Filter<'a, S::Value>,
    pub expansion: &'a Expansion<S::Id>,
    /// Show matching subtrees open while a filter is active.
    pub expand_matches: bool,
}

/// Project `source` into a flattened, sorted, filtered view.
///
/// A row is emitted for every leaf accepted by the filter and every folder
/// whose subtree holds at least one such leaf. Children of closed folders
/// are skipped unless the filter is active and `expand_matches` is set.
pub fn rebuild<S: TreeSource>(
    source: &S,
    params: &RebuildParams<'_, S>,
) -> FlattenedView<S::Id> {
    let mut walk = Walk {
        source,
        params,
        force_open: params.expand_matches && params.filter.is_active(),
        matches: HashMap::new(),
        emitted: HashSet::new(),
        rows: Vec::with_capacity(source.descendant_count()),
    };

    walk.emit_children(None, 0);
    log::trace!(
        "tree view rebuilt: {} rows from {} nodes",
        walk.rows.len(),
        walk.matches.len()
    );
    FlattenedView::from_rows(walk.rows)
}

struct Walk<'a, S: TreeSource> {
    source: &'a S,
    params: &'a RebuildParams<'a, S>,
    force_open: bool,
    matches: HashMap<S::Id, bool>,
    emitted: HashSet<S::Id>,
    rows: Vec<Row<S::Id>>,
}

impl<S: TreeSource> Walk<'_, S> {
    fn emit_children(&mut self, parent: Option<S::Id>, depth: usize) {
        let source = self.source;
        let mut visible: Vec<(S::Id, bool, &str)> = Vec::new();
        for &child in source.children(parent) {
            if !self.subtree_matches(child) {
                continue;
            }
            if let Some(node) = source.node(child) {
                visible.push((child, node.is_folder(), node.name()));
            }
        }

        let sort = self.params.sort;
        visible.sort_by(|left, right| {
            sort.compare((left.1, left.2), (right.1, right.2))
        });

        for (id, is_folder, _) in visible {
            // A node reachable twice (malformed source) is shown once.
            if !self.emitted.insert(id) {
                continue;
            }

            self.rows.push(Row {
                id,
                depth,
                is_folder,
            });

            if is_folder
                && (self.force_open || self.params.expansion.is_open(id))
            {
                self.emit_children(Some(id), depth + 1);
            }
        }
    }

    fn subtree_matches(&mut self, id: S::Id) -> bool {
        if let Some(&cached) = self.matches.get(&id) {
            return cached;
        }

        // Seeded before descending so a cycle terminates as "no match".
        self.matches.insert(id, false);

        let matched = match self.source.node(id) {
            None => false,
            Some(Node::Leaf { name, value }) => {
                self.params.filter.matches(name, value)
            },
            Some(Node::Folder { .. }) => {
                let source = self.source;
                let mut any = false;
                for &child in source.children(Some(id)) {
                    if self.subtree_matches(child) {
                        any = true;
                    }
                }
                any
            },
        };

        self.matches.insert(id, matched);
        matched
    }
}

/// Folders on the path from the top level down to `target`'s parent.
///
/// Returns `None` when `target` is not reachable from the top level.
pub fn ancestors_of<S: TreeSource>(
    source: &S,
    target: S::Id,
) -> Option<Vec<S::Id>> {
    let mut path = Vec::new();
    let mut visited = HashSet::new();
    if find_path(source, None, target, &mut path, &mut visited) {
        Some(path)
    } else {
        None
    }
}

fn find_path<S: TreeSource>(
    source: &S,
    parent: Option<S::Id>,
    target: S::Id,
    path: &mut Vec<S::Id>,
    visited: &mut HashSet<S::Id>,
) -> bool {
    for &child in source.children(parent) {
        if child == target {
            return true;
        }
        if !visited.insert(child) {
            continue;
        }
        if !matches!(source.node(child), Some(Node::Folder { .. })) {
            continue;
        }

        path.push(child);
        if find_path(source, Some(child), target, path, visited) {
            return true;
        }
        path.pop();
    }
    false
}
