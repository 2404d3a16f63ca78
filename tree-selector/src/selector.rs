//! Frame-driven owner of the flattened view, selection and deferred actions.
//!
//! A host keeps one [`Selector`] per tree widget and calls
//! [`Selector::draw`] once per frame. The selector rebuilds its view when
//! something marked it stale, walks the visible window, and replays every
//! mutation the row callback asked for only after the walk is over.

use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use crate::actions::ActionQueue;
use crate::dirty::DirtyFlag;
use crate::error::{Diagnostics, RenderFault};
use crate::event::{SelectionChange, SelectorEvent};
use crate::filter::{Filter, LeafPredicate, TextFilter};
use crate::jump::JumpController;
use crate::selection::{PayloadChange, SelectMode, SelectionState};
use crate::settings::SelectorSettings;
use crate::sort::SortMode;
use crate::source::{Node, TreeSource};
use crate::view::{self, Expansion, FlattenedView, RebuildParams, Row};
use crate::window::{Cursor, Window};

type SelectorQueue<S, U> = ActionQueue<Selector<S, U>, S>;

/// Outcome of a successful [`Selector::draw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    pub window: Window,
    /// Whether the view was rebuilt before drawing.
    pub rebuilt: bool,
    /// Rows handed to the callback, headers included.
    pub drawn: usize,
    /// Deferred actions replayed after the walk.
    pub drained: usize,
}

/// View, selection and deferred-action state of one tree widget.
///
/// `U` is opaque host state cloned into every
/// [`SelectionChange`](crate::SelectionChange).
pub struct Selector<S: TreeSource, U = ()> {
    settings: SelectorSettings,
    view: FlattenedView<S::Id>,
    selection: SelectionState<S::Id, S::Value>,
    expansion: Expansion<S::Id>,
    filter: TextFilter,
    predicate: Option<Box<LeafPredicate<S::Value>>>,
    sort_mode: SortMode,
    dirty: DirtyFlag,
    filter_dirty: bool,
    layout_dirty: bool,
    jump: JumpController<S::Id>,
    queue: SelectorQueue<S, U>,
    events: Vec<SelectorEvent<S::Value, U>>,
    user_state: U,
    cursor: Cursor,
}

impl<S: TreeSource, U> fmt::Debug for Selector<S, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("rows", &self.view.len())
            .field("filter", &self.filter.text())
            .field("sort_mode", &self.sort_mode)
            .field("primary", &self.selection.primary_id())
            .field("additional", &self.selection.additional_len())
            .field("pending_actions", &self.queue.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

impl<S: TreeSource, U: Clone + Default> Selector<S, U> {
    pub fn new(settings: SelectorSettings) -> Self {
        Self::with_user_state(settings, U::default())
    }
}

impl<S: TreeSource, U: Clone> Selector<S, U> {
    pub fn with_user_state(settings: SelectorSettings, user_state: U) -> Self {
        let filter = TextFilter::new(
            settings.initial_filter(),
            settings.case_sensitive(),
        );

        Self {
            sort_mode: settings.sort_mode(),
            settings,
            view: FlattenedView::default(),
            selection: SelectionState::default(),
            expansion: Expansion::default(),
            filter,
            predicate: None,
            dirty: DirtyFlag::new(),
            filter_dirty: false,
            layout_dirty: true,
            jump: JumpController::default(),
            queue: ActionQueue::new(),
            events: Vec::new(),
            user_state,
            cursor: Cursor::default(),
        }
    }

    pub fn settings(&self) -> &SelectorSettings {
        &self.settings
    }

    /// The flattened view as of the last [`sync`](Self::sync).
    pub fn view(&self) -> &FlattenedView<S::Id> {
        &self.view
    }

    pub fn selection(&self) -> &SelectionState<S::Id, S::Value> {
        &self.selection
    }

    /// Handle for the tree's change hook.
    ///
    /// Marking it schedules a full rebuild before the next read.
    pub fn dirty_flag(&self) -> DirtyFlag {
        self.dirty.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_marked() || self.filter_dirty || self.layout_dirty
    }

    /// Force a rebuild on the next [`sync`](Self::sync).
    pub fn invalidate(&mut self) {
        self.layout_dirty = true;
    }

    pub fn user_state(&self) -> &U {
        &self.user_state
    }

    pub fn set_user_state(&mut self, user_state: U) {
        self.user_state = user_state;
    }

    /// Position of the last row visited by [`draw`](Self::draw).
    pub fn diagnostics(&self) -> Diagnostics {
        snapshot(self.cursor, self.view.len(), self.filter_dirty)
    }

    pub fn filter_text(&self) -> &str {
        self.filter.text()
    }

    pub fn set_filter_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.filter.text() {
            return;
        }

        self.filter = TextFilter::new(text, self.settings.case_sensitive());
        self.filter_dirty = true;
    }

    /// Filter leaves with `predicate` instead of the filter text.
    pub fn set_leaf_predicate(
        &mut self,
        predicate: impl Fn(&str, &S::Value) -> bool + 'static,
    ) {
        self.predicate = Some(Box::new(predicate));
        self.filter_dirty = true;
    }

    pub fn clear_leaf_predicate(&mut self) {
        if self.predicate.take().is_some() {
            self.filter_dirty = true;
        }
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn set_sort_mode(&mut self, sort_mode: SortMode) {
        if self.sort_mode != sort_mode {
            self.sort_mode = sort_mode;
            self.layout_dirty = true;
        }
    }

    pub fn is_expanded(&self, id: S::Id) -> bool {
        self.expansion.is_open(id)
    }

    pub fn expand(&mut self, id: S::Id) {
        self.set_expanded(id, true);
    }

    pub fn collapse(&mut self, id: S::Id) {
        self.set_expanded(id, false);
    }

    pub fn set_expanded(&mut self, id: S::Id, open: bool) {
        if self.expansion.set(id, open) {
            self.layout_dirty = true;
        }
    }

    /// Flip a folder open or closed, returning the new state.
    ///
    /// Leaves and removed nodes are ignored and report `false`.
    pub fn toggle(&mut self, source: &S, id: S::Id) -> bool {
        if !matches!(source.node(id), Some(Node::Folder { .. })) {
            log::debug!("toggle of non-folder {id:?} ignored");
            return false;
        }

        self.layout_dirty = true;
        self.expansion.toggle(id)
    }

    /// Open every folder currently reachable in `source`.
    pub fn expand_all(&mut self, source: &S) {
        let mut pending = source.children(None).to_vec();
        let mut seen = HashSet::new();
        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            if matches!(source.node(id), Some(Node::Folder { .. })) {
                if self.expansion.set(id, true) {
                    self.layout_dirty = true;
                }
                pending.extend_from_slice(source.children(Some(id)));
            }
        }
    }

    pub fn collapse_all(&mut self) {
        if self.expansion.clear() {
            self.layout_dirty = true;
        }
    }

    /// Bring the view up to date and resolve a pending jump.
    ///
    /// Any number of tree changes, filter edits, sort changes and expansion
    /// changes since the last sync result in a single rebuild. Folders opened
    /// for a pending jump join the same rebuild. Returns whether a rebuild
    /// happened.
    pub fn sync(&mut self, source: &S) -> bool {
        let target = self.jump.take();
        if let Some(target) = target {
            self.open_ancestors(source, target);
        }

        let rebuilt = self.refresh(source);

        if let Some(target) = target {
            if let Some(request) = JumpController::resolve(
                &self.view,
                target,
                self.settings.row_height(),
            ) {
                self.events.push(SelectorEvent::ScrollTo(request));
            }
        }
        rebuilt
    }

    /// Rebuild the view if anything marked it stale.
    fn refresh(&mut self, source: &S) -> bool {
        let tree_changed = self.dirty.take();
        if tree_changed {
            let change = self.selection.prune_missing(source);
            self.notify(change);
            self.prune_expansion(source);
        }

        let stale = tree_changed || self.filter_dirty || self.layout_dirty;
        if stale {
            self.rebuild(source);
        }
        stale
    }

    fn rebuild(&mut self, source: &S) {
        let filter = match &self.predicate {
            Some(predicate) => Filter::Predicate(&**predicate),
            None => Filter::Text(&self.filter),
        };

        self.view = view::rebuild(
            source,
            &RebuildParams {
                sort: self.sort_mode,
                filter,
                expansion: &self.expansion,
                expand_matches: self.settings.expand_matches(),
            },
        );
        self.filter_dirty = false;
        self.layout_dirty = false;
    }

    fn open_ancestors(&mut self, source: &S, target: S::Id) {
        let Some(folders) = view::ancestors_of(source, target) else {
            return;
        };

        let mut opened = false;
        for folder in folders {
            opened |= self.expansion.set(folder, true);
        }
        if opened {
            self.filter_dirty = true;
        }
    }

    fn prune_expansion(&mut self, source: &S) {
        let before = self.expansion.len();
        self.expansion
            .retain(|id| matches!(source.node(id), Some(Node::Folder { .. })));
        let pruned = before - self.expansion.len();
        if pruned > 0 {
            log::debug!("forgot {pruned} expanded folders no longer present");
        }
    }

    /// Rows of the flattened view inside `range`, clamped to its bounds.
    ///
    /// Reads the view as of the last [`sync`](Self::sync).
    pub fn visible_rows(&self, range: Range<usize>) -> &[Row<S::Id>] {
        let window = Window::new(&self.view, range);
        &self.view.rows()[window.range()]
    }

    pub fn window(&self, range: Range<usize>) -> Window {
        Window::new(&self.view, range)
    }

    /// Row index of the primary selected leaf, if it is visible.
    ///
    /// Reads the view as of the last [`sync`](Self::sync).
    pub fn selected_index(&self) -> Option<usize> {
        self.selection
            .primary_id()
            .and_then(|id| self.view.position(id))
    }

    pub fn is_selected(&self, id: S::Id) -> bool {
        self.selection.is_selected(id)
    }

    /// Apply a selection request immediately.
    ///
    /// A stale view is rebuilt first, so range positions come from the
    /// current filter, sort and expansion. Only call this between frames;
    /// draw callbacks go through [`RowContext::request_select`].
    pub fn select(
        &mut self,
        source: &S,
        target: Option<S::Id>,
        mode: SelectMode,
    ) {
        self.refresh(source);
        let change = self.selection.select(source, &self.view, target, mode);
        if change.is_none() {
            log::debug!(
                "select {target:?} ({mode:?}) kept the primary payload"
            );
        }
        self.notify(change);
    }

    pub fn clear_selection(&mut self) {
        let change = self.selection.clear();
        self.notify(change);
    }

    pub fn remove_from_additional(&mut self, source: &S, id: S::Id) {
        self.refresh(source);
        let change = self.selection.remove_from_additional(source, id);
        self.notify(change);
    }

    /// Scroll to `id` on the next sync, opening its folders first.
    pub fn request_jump(&mut self, id: S::Id) {
        self.jump.request(id);
    }

    pub fn pending_jump(&self) -> Option<S::Id> {
        self.jump.pending()
    }

    pub fn enqueue_action(
        &mut self,
        action: impl FnOnce(&mut Self, &S) + 'static,
    ) {
        self.queue.enqueue(action);
    }

    pub fn pending_actions(&self) -> usize {
        self.queue.len()
    }

    /// Replay the actions queued so far.
    ///
    /// Actions they enqueue wait for the next drain.
    pub fn drain_actions(&mut self, source: &S) -> usize {
        let drained = self.queue.take().run(self, source);
        if drained > 0 {
            log::debug!("drained {drained} deferred actions");
        }
        drained
    }

    pub fn take_events(&mut self) -> Vec<SelectorEvent<S::Value, U>> {
        std::mem::take(&mut self.events)
    }

    /// Render one frame.
    ///
    /// `range` is the clipper's visible-range hint. Header rows for the
    /// folders enclosing the first visible row are passed to `draw_row`
    /// first. Requests made through the [`RowContext`] run after the walk.
    ///
    /// An error from `draw_row` stops the walk and discards the actions it
    /// queued; view and selection are left as they were before the frame.
    pub fn draw<E, F>(
        &mut self,
        source: &S,
        range: Range<usize>,
        mut draw_row: F,
    ) -> Result<FrameReport, RenderFault<E>>
    where
        E: std::error::Error + 'static,
        F: FnMut(&mut RowContext<'_, S, U>) -> Result<(), E>,
    {
        let rebuilt = self.sync(source);
        let window = Window::new(&self.view, range);
        let queued = self.queue.len();

        let drawn = match self.traverse(source, &window, &mut draw_row) {
            Ok(drawn) => drawn,
            Err(fault) => {
                let dropped = self.queue.truncate(queued);
                log::warn!("{fault} ({dropped} deferred actions discarded)");
                return Err(fault);
            },
        };

        let drained = self.drain_actions(source);
        Ok(FrameReport {
            window,
            rebuilt,
            drawn,
            drained,
        })
    }

    fn traverse<E, F>(
        &mut self,
        source: &S,
        window: &Window,
        draw_row: &mut F,
    ) -> Result<usize, RenderFault<E>>
    where
        E: std::error::Error + 'static,
        F: FnMut(&mut RowContext<'_, S, U>) -> Result<(), E>,
    {
        let Self {
            view,
            selection,
            expansion,
            queue,
            cursor,
            filter_dirty,
            ..
        } = self;

        let mut drawn = 0;
        for index in window.headers().iter().copied().chain(window.range()) {
            let Some(row) = view.get(index).copied() else {
                continue;
            };
            *cursor = Cursor {
                index,
                depth: row.depth,
                end: window.end(),
            };
            let Some(node) = source.node(row.id) else {
                log::debug!("row {index} points at a removed node, skipping");
                continue;
            };

            let mut context = RowContext {
                index,
                row,
                node,
                is_header: index < window.start(),
                is_selected: selection.is_selected(row.id),
                is_expanded: expansion.is_open(row.id),
                queue: &mut *queue,
            };
            if let Err(error) = draw_row(&mut context) {
                return Err(RenderFault {
                    snapshot: snapshot(*cursor, view.len(), *filter_dirty),
                    source: error,
                });
            }
            drawn += 1;
        }

        Ok(drawn)
    }

    fn notify(&mut self, change: Option<PayloadChange<S::Value>>) {
        if let Some(change) = change {
            let change = SelectionChange::new(change, self.user_state.clone());
            self.events.push(SelectorEvent::SelectionChanged(change));
        }
    }
}

fn snapshot(cursor: Cursor, row_count: usize, filter_dirty: bool) -> Diagnostics {
    Diagnostics {
        index: cursor.index,
        depth: cursor.depth,
        end: cursor.end,
        row_count,
        filter_dirty,
    }
}

/// What a draw callback sees of the row being drawn.
///
/// The request methods are the only way to change selector state from inside
/// a frame; they are replayed in order once the walk ends.
pub struct RowContext<'a, S: TreeSource, U> {
    index: usize,
    row: Row<S::Id>,
    node: Node<'a, S::Value>,
    is_header: bool,
    is_selected: bool,
    is_expanded: bool,
    queue: &'a mut SelectorQueue<S, U>,
}

impl<'a, S: TreeSource, U: Clone> RowContext<'a, S, U> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn row(&self) -> Row<S::Id> {
        self.row
    }

    pub fn id(&self) -> S::Id {
        self.row.id
    }

    pub fn depth(&self) -> usize {
        self.row.depth
    }

    pub fn node(&self) -> Node<'a, S::Value> {
        self.node
    }

    pub fn name(&self) -> &'a str {
        self.node.name()
    }

    /// Synthetic ancestor row drawn above a window that opens mid-subtree.
    pub fn is_header(&self) -> bool {
        self.is_header
    }

    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    pub fn is_expanded(&self) -> bool {
        self.is_expanded
    }

    pub fn request_select(&mut self, target: Option<S::Id>, mode: SelectMode) {
        self.queue.enqueue(move |selector, source| {
            selector.select(source, target, mode);
        });
    }

    pub fn request_jump(&mut self, id: S::Id) {
        self.queue
            .enqueue(move |selector, _| selector.request_jump(id));
    }

    pub fn request_toggle(&mut self, id: S::Id) {
        self.queue.enqueue(move |selector, source| {
            selector.toggle(source, id);
        });
    }

    pub fn request_rebuild(&mut self) {
        self.queue.enqueue(|selector, _| selector.invalidate());
    }

    pub fn enqueue_action(
        &mut self,
        action: impl FnOnce(&mut Selector<S, U>, &S) + 'static,
    ) {
        self.queue.enqueue(action);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;
    use std::convert::Infallible;
    use std::ops::Range;
    use std::rc::Rc;

    use super::{RowContext, Selector};
    use crate::arena::{NodeId, Tree};
    use crate::event::{ScrollRequest, SelectorEvent};
    use crate::selection::SelectMode;
    use crate::settings::SelectorSettings;
    use crate::sort::SortMode;
    use crate::source::{Node, TreeSource};

    type Names = Tree<&'static str>;
    type TestSelector = Selector<Names>;

    /// Fully expanded rows: A@0 u@1 x@2 xa@3 y@4 z@5 B@6 C@7 q@8
    struct Fixture {
        tree: Names,
        selector: TestSelector,
        a: NodeId,
        x: NodeId,
        xa: NodeId,
        y: NodeId,
        z: NodeId,
        b: NodeId,
        c: NodeId,
        q: NodeId,
    }

    impl Fixture {
        fn new() -> Self {
            let mut tree = Tree::new();
            let a = tree.insert_folder(None, "A").expect("folder A");
            let z = tree.insert_leaf(Some(a), "z", "z").expect("leaf z");
            let x = tree.insert_leaf(Some(a), "x", "x").expect("leaf x");
            let y = tree.insert_leaf(Some(a), "y", "y").expect("leaf y");
            let xa = tree.insert_leaf(Some(a), "xa", "xa").expect("leaf xa");
            tree.insert_leaf(Some(a), "u", "u").expect("leaf u");
            let b = tree.insert_folder(None, "B").expect("folder B");
            let c = tree.insert_folder(Some(b), "C").expect("folder C");
            let q = tree.insert_leaf(Some(c), "q", "q").expect("leaf q");

            let mut selector = TestSelector::new(SelectorSettings::default());
            selector.expand_all(&tree);
            selector.sync(&tree);

            Self {
                tree,
                selector,
                a,
                x,
                xa,
                y,
                z,
                b,
                c,
                q,
            }
        }

        fn rows(&self) -> Vec<String> {
            self.selector
                .view()
                .rows()
                .iter()
                .map(|row| {
                    let node = self.tree.node(row.id).expect("row node");
                    format!("{}@{}", node.name(), row.depth)
                })
                .collect()
        }

        fn additional(&self) -> HashSet<NodeId> {
            self.selector.selection().additional().collect()
        }

        fn select(&mut self, target: NodeId, mode: SelectMode) {
            self.selector.select(&self.tree, Some(target), mode);
        }

        /// Draw `range`, recording each visited row and running `on_row`.
        fn draw(
            &mut self,
            range: Range<usize>,
            mut on_row: impl FnMut(&mut RowContext<'_, Names, ()>),
        ) -> Vec<String> {
            let mut seen = Vec::new();
            self.selector
                .draw(&self.tree, range, |row| {
                    let marker = if row.is_header() { "^" } else { "" };
                    seen.push(format!("{marker}{}", row.name()));
                    on_row(row);
                    Ok::<(), Infallible>(())
                })
                .expect("infallible draw");
            seen
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("row widget exploded")]
    struct Boom;

    /// Counts view rebuilds through the buffer pre-sizing hook.
    struct Counting {
        tree: Names,
        rebuilds: Cell<usize>,
    }

    impl TreeSource for Counting {
        type Id = NodeId;
        type Value = &'static str;

        fn children(&self, parent: Option<NodeId>) -> &[NodeId] {
            self.tree.children(parent)
        }

        fn node(&self, id: NodeId) -> Option<Node<'_, &'static str>> {
            self.tree.node(id)
        }

        fn descendant_count(&self) -> usize {
            self.rebuilds.set(self.rebuilds.get() + 1);
            self.tree.descendant_count()
        }
    }

    #[test]
    fn given_filter_text_when_syncing_then_only_matching_branch_remains() {
        let mut fx = Fixture::new();

        fx.selector.set_filter_text("y");
        assert!(fx.selector.sync(&fx.tree));

        assert_eq!(fx.rows(), vec!["A@0", "y@1"]);
    }

    #[test]
    fn filtered_views_keep_closure_and_ancestor_invariants() {
        let mut fx = Fixture::new();

        for text in ["x", "q", "", "zzz", " A "] {
            fx.selector.set_filter_text(text);
            fx.selector.sync(&fx.tree);
            let rows = fx.selector.view().rows().to_vec();

            for (index, row) in rows.iter().enumerate() {
                let node = fx.tree.node(row.id).expect("row node");
                if node.is_leaf() {
                    let needle = text.trim().to_lowercase();
                    assert!(
                        node.name().to_lowercase().contains(&needle),
                        "{text:?} kept leaf {}",
                        node.name()
                    );
                } else {
                    let next = rows.get(index + 1);
                    assert!(
                        next.is_some_and(|next| next.depth == row.depth + 1),
                        "{text:?} kept empty folder {}",
                        node.name()
                    );
                }
                if row.depth > 0 {
                    assert!(
                        rows[..index]
                            .iter()
                            .any(|earlier| earlier.depth == row.depth - 1),
                        "{text:?} orphaned {}",
                        node.name()
                    );
                }
            }
        }
    }

    #[test]
    fn filter_matching_nothing_keeps_selection() {
        let mut fx = Fixture::new();
        fx.select(fx.x, SelectMode::REPLACE);

        fx.selector.set_filter_text("nothing matches this");
        fx.selector.sync(&fx.tree);

        assert!(fx.selector.view().is_empty());
        assert_eq!(fx.selector.selection().primary_id(), Some(fx.x));
        assert_eq!(fx.selector.selected_index(), None);

        fx.selector.set_filter_text("");
        fx.selector.sync(&fx.tree);
        assert_eq!(fx.selector.selected_index(), Some(2));
    }

    #[test]
    fn additive_select_twice_restores_single_selection() {
        let mut fx = Fixture::new();
        fx.select(fx.x, SelectMode::REPLACE);

        fx.select(fx.y, SelectMode::TOGGLE);
        assert_eq!(fx.additional(), HashSet::from([fx.x, fx.y]));
        assert_eq!(fx.selector.selection().primary_id(), None);

        fx.select(fx.y, SelectMode::TOGGLE);
        assert_eq!(fx.selector.selection().primary_id(), Some(fx.x));
        assert!(fx.additional().is_empty());
    }

    #[test]
    fn range_select_spans_flat_run() {
        let mut fx = Fixture::new();
        fx.select(fx.x, SelectMode::REPLACE);
        assert_eq!(fx.selector.selected_index(), Some(2));
        assert_eq!(fx.selector.view().position(fx.z), Some(5));

        fx.select(fx.z, SelectMode::RANGE);

        assert_eq!(fx.additional(), HashSet::from([fx.x, fx.xa, fx.y, fx.z]));
        assert_eq!(fx.selector.selection().primary_id(), None);
    }

    #[test]
    fn range_select_across_depths_is_noop() {
        let mut fx = Fixture::new();
        fx.select(fx.x, SelectMode::REPLACE);
        fx.selector.take_events();

        fx.select(fx.q, SelectMode::RANGE);

        assert_eq!(fx.selector.selection().primary_id(), Some(fx.x));
        assert!(fx.additional().is_empty());
        assert!(fx.selector.take_events().is_empty());
    }

    #[test]
    fn reselecting_same_value_fires_no_event() {
        let mut fx = Fixture::new();

        fx.select(fx.x, SelectMode::REPLACE);
        fx.select(fx.x, SelectMode::REPLACE);

        let events = fx.selector.take_events();
        assert_eq!(events.len(), 1);
        let SelectorEvent::SelectionChanged(change) = &events[0] else {
            panic!("expected a selection change, got {events:?}");
        };
        assert_eq!(change.previous, None);
        assert_eq!(change.current, Some("x"));
    }

    #[test]
    fn selection_change_carries_user_state() {
        let mut tree = Tree::new();
        let leaf = tree.insert_leaf(None, "leaf", 7_u32).expect("leaf");
        let mut selector: Selector<Tree<u32>, &'static str> =
            Selector::with_user_state(SelectorSettings::default(), "panel-1");
        selector.sync(&tree);

        selector.select(&tree, Some(leaf), SelectMode::REPLACE);
        selector.set_user_state("panel-2");
        selector.clear_selection();

        let states: Vec<_> = selector
            .take_events()
            .into_iter()
            .filter_map(|event| match event {
                SelectorEvent::SelectionChanged(change) => {
                    Some((change.current, change.user_state))
                },
                SelectorEvent::ScrollTo(_) => None,
            })
            .collect();
        assert_eq!(states, vec![(Some(7), "panel-1"), (None, "panel-2")]);
    }

    #[test]
    fn rebuild_without_changes_is_idempotent() {
        let mut fx = Fixture::new();
        let before = fx.selector.view().clone();

        assert!(!fx.selector.sync(&fx.tree));
        fx.selector.invalidate();
        assert!(fx.selector.sync(&fx.tree));

        assert_eq!(fx.selector.view(), &before);
    }

    #[test]
    fn given_select_request_in_draw_when_walking_then_state_changes_after() {
        let mut fx = Fixture::new();
        let x = fx.x;
        let mut highlighted = Vec::new();

        fx.draw(0..9, |row| {
            if row.id() == x {
                row.request_select(Some(x), SelectMode::REPLACE);
            }
            highlighted.push(row.is_selected());
        });

        assert!(highlighted.iter().all(|selected| !selected));
        assert_eq!(fx.selector.selection().primary_id(), Some(x));
        assert_eq!(fx.selector.pending_actions(), 0);

        let mut highlighted = Vec::new();
        fx.draw(0..9, |row| highlighted.push(row.is_selected()));
        assert_eq!(highlighted.iter().filter(|selected| **selected).count(), 1);
        assert!(highlighted[2]);
    }

    #[test]
    fn actions_enqueued_while_draining_wait_for_next_drain() {
        let mut fx = Fixture::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let outer = Rc::clone(&log);
        fx.selector.enqueue_action(move |selector, _| {
            for name in ["a", "b", "c"] {
                let log = Rc::clone(&outer);
                selector.enqueue_action(move |selector, _| {
                    log.borrow_mut().push(name);
                    if name == "a" {
                        let log = Rc::clone(&log);
                        selector.enqueue_action(move |_, _| {
                            log.borrow_mut().push("late");
                        });
                    }
                });
            }
        });

        assert_eq!(fx.selector.drain_actions(&fx.tree), 1);
        assert!(log.borrow().is_empty());
        assert_eq!(fx.selector.pending_actions(), 3);

        assert_eq!(fx.selector.drain_actions(&fx.tree), 3);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(fx.selector.pending_actions(), 1);

        assert_eq!(fx.selector.drain_actions(&fx.tree), 1);
        assert_eq!(*log.borrow(), vec!["a", "b", "c", "late"]);
    }

    #[test]
    fn window_opening_mid_subtree_draws_headers_first() {
        let mut fx = Fixture::new();

        let seen = fx.draw(8..9, |_| {});

        assert_eq!(seen, vec!["^B", "^C", "q"]);
    }

    #[test]
    fn out_of_range_hint_is_clamped() {
        let mut fx = Fixture::new();

        let report = fx
            .selector
            .draw(&fx.tree, 7..40, |_| Ok::<(), Infallible>(()))
            .expect("infallible draw");

        assert_eq!(report.window.range(), 7..9);
        assert_eq!(report.drawn, 3);
        assert_eq!(fx.selector.visible_rows(5..40).len(), 4);
    }

    #[test]
    fn given_collapsed_ancestors_when_jumping_then_folders_open_and_scroll() {
        let mut fx = Fixture::new();
        fx.selector.collapse_all();
        fx.selector.sync(&fx.tree);
        assert_eq!(fx.rows(), vec!["A@0", "B@0"]);

        fx.selector.request_jump(fx.q);
        fx.selector.sync(&fx.tree);

        assert!(fx.selector.is_expanded(fx.b));
        assert!(fx.selector.is_expanded(fx.c));
        assert!(!fx.selector.is_expanded(fx.a));
        assert_eq!(fx.rows(), vec!["A@0", "B@0", "C@1", "q@2"]);
        assert_eq!(
            fx.selector.take_events(),
            vec![SelectorEvent::ScrollTo(ScrollRequest {
                row: 3,
                offset: 60.0,
            })]
        );
        assert_eq!(fx.selector.pending_jump(), None);
    }

    #[test]
    fn jump_requested_in_draw_resolves_next_frame() {
        let mut fx = Fixture::new();
        let y = fx.y;

        fx.draw(0..1, |row| row.request_jump(y));
        assert_eq!(fx.selector.pending_jump(), Some(y));
        assert!(fx.selector.take_events().is_empty());

        fx.draw(0..1, |_| {});
        assert_eq!(
            fx.selector.take_events(),
            vec![SelectorEvent::ScrollTo(ScrollRequest {
                row: 4,
                offset: 80.0,
            })]
        );
    }

    #[test]
    fn jump_to_removed_node_is_dropped_silently() {
        let mut fx = Fixture::new();
        let gone = fx.tree.insert_leaf(None, "gone", "gone").expect("leaf");
        fx.tree.remove(gone);

        fx.selector.request_jump(gone);
        fx.selector.sync(&fx.tree);

        assert_eq!(fx.selector.pending_jump(), None);
        assert!(fx.selector.take_events().is_empty());
    }

    #[test]
    fn render_fault_carries_snapshot_and_discards_frame_actions() {
        let mut fx = Fixture::new();
        let (a, y) = (fx.a, fx.y);
        fx.selector.enqueue_action(move |selector, _| selector.collapse(a));

        let fault = fx
            .selector
            .draw(&fx.tree, 2..6, |row| {
                row.request_select(Some(y), SelectMode::REPLACE);
                if row.index() == 4 {
                    return Err(Boom);
                }
                Ok(())
            })
            .expect_err("callback failure should surface");

        assert_eq!(fault.snapshot.index, 4);
        assert_eq!(fault.snapshot.depth, 1);
        assert_eq!(fault.snapshot.end, 6);
        assert_eq!(fault.snapshot.row_count, 9);
        assert!(!fault.snapshot.filter_dirty);
        assert!(fault.to_string().ends_with("row widget exploded"));
        assert_eq!(fx.selector.diagnostics(), fault.snapshot);

        assert_eq!(fx.selector.pending_actions(), 1);
        assert!(fx.selector.selection().is_empty());
        assert_eq!(fx.selector.view().len(), 9);

        fx.draw(0..1, |_| {});
        assert!(!fx.selector.is_expanded(a));
        assert!(fx.selector.selection().is_empty());
    }

    #[test]
    fn tree_changes_marked_through_hook_trigger_one_rebuild() {
        let mut fx = Fixture::new();
        let flag = fx.selector.dirty_flag();
        fx.tree.on_change(move |_| flag.mark());
        fx.select(fx.x, SelectMode::REPLACE);
        fx.selector.take_events();

        fx.tree.insert_leaf(Some(fx.a), "w", "w").expect("leaf w");
        fx.tree.remove(fx.x);
        assert!(fx.selector.is_dirty());

        assert!(fx.selector.sync(&fx.tree));
        assert!(!fx.selector.sync(&fx.tree));
        assert_eq!(
            fx.rows(),
            vec![
                "A@0", "u@1", "w@1", "xa@1", "y@1", "z@1", "B@0", "C@1", "q@2"
            ]
        );

        let events = fx.selector.take_events();
        let [SelectorEvent::SelectionChanged(change)] = events.as_slice() else {
            panic!("expected one selection change, got {events:?}");
        };
        assert_eq!(change.previous, Some("x"));
        assert_eq!(change.current, None);
    }

    #[test]
    fn toggle_request_in_draw_collapses_folder_next_frame() {
        let mut fx = Fixture::new();
        let a = fx.a;

        fx.draw(0..1, |row| row.request_toggle(a));
        let seen = fx.draw(0..3, |_| {});

        assert_eq!(seen, vec!["A", "B", "C"]);
        assert!(!fx.selector.is_expanded(a));
    }

    #[test]
    fn sort_mode_change_reorders_rows() {
        let mut fx = Fixture::new();
        fx.select(fx.x, SelectMode::REPLACE);

        fx.selector.set_sort_mode(SortMode::NaturalDescending);
        fx.selector.sync(&fx.tree);

        assert_eq!(
            fx.rows(),
            vec![
                "B@0", "C@1", "q@2", "A@0", "z@1", "y@1", "xa@1", "x@1", "u@1"
            ]
        );
        assert_eq!(fx.selector.selected_index(), Some(7));
    }

    #[test]
    fn leaf_predicate_replaces_text_filter() {
        let mut fx = Fixture::new();
        fx.selector.set_filter_text("x");
        fx.selector.set_leaf_predicate(|_, value| value.len() == 2);
        fx.selector.sync(&fx.tree);
        assert_eq!(fx.rows(), vec!["A@0", "xa@1"]);

        fx.selector.clear_leaf_predicate();
        fx.selector.sync(&fx.tree);
        assert_eq!(fx.rows(), vec!["A@0", "x@1", "xa@1"]);
    }

    #[test]
    fn initial_filter_comes_from_settings() {
        let fx = Fixture::new();
        let settings =
            SelectorSettings::from_json(r#"{ "initial_filter": "q" }"#)
                .expect("valid settings");
        let mut selector = TestSelector::new(settings);

        selector.sync(&fx.tree);

        assert_eq!(selector.filter_text(), "q");
        assert_eq!(selector.view().len(), 3);
    }

    #[test]
    fn given_pending_filter_when_range_selecting_then_filtered_rows_are_used() {
        let mut fx = Fixture::new();
        fx.select(fx.x, SelectMode::REPLACE);
        fx.selector.take_events();

        fx.selector.set_filter_text("x");
        fx.select(fx.z, SelectMode::RANGE);

        assert!(!fx.selector.is_dirty());
        assert_eq!(fx.rows(), vec!["A@0", "x@1", "xa@1"]);
        assert_eq!(fx.selector.selection().primary_id(), Some(fx.x));
        assert!(fx.additional().is_empty());
        assert!(fx.selector.take_events().is_empty());
    }

    #[test]
    fn toggling_a_leaf_is_ignored() {
        let mut fx = Fixture::new();

        assert!(!fx.selector.toggle(&fx.tree, fx.x));

        assert!(!fx.selector.is_expanded(fx.x));
        assert!(!fx.selector.is_dirty());
    }

    #[test]
    fn removed_folders_are_forgotten_by_expansion() {
        let mut fx = Fixture::new();
        let flag = fx.selector.dirty_flag();
        fx.tree.on_change(move |_| flag.mark());
        assert!(fx.selector.is_expanded(fx.c));

        assert!(fx.tree.remove(fx.c));
        fx.selector.sync(&fx.tree);

        assert!(!fx.selector.is_expanded(fx.c));
        assert!(fx.selector.is_expanded(fx.b));
        assert_eq!(fx.rows(), vec!["A@0", "u@1", "x@1", "xa@1", "y@1", "z@1"]);
    }

    #[test]
    fn jump_through_collapsed_folders_costs_one_rebuild() {
        let Fixture { tree, q, b, c, .. } = Fixture::new();
        let source = Counting {
            tree,
            rebuilds: Cell::new(0),
        };
        let mut selector: Selector<Counting> =
            Selector::new(SelectorSettings::default());
        assert!(selector.sync(&source));
        assert_eq!(source.rebuilds.get(), 1);

        selector.set_sort_mode(SortMode::NaturalDescending);
        selector.request_jump(q);
        assert!(selector.sync(&source));

        assert_eq!(source.rebuilds.get(), 2);
        assert!(selector.is_expanded(b));
        assert!(selector.is_expanded(c));
        assert_eq!(selector.view().position(q), Some(2));
        assert_eq!(
            selector.take_events(),
            vec![SelectorEvent::ScrollTo(ScrollRequest {
                row: 2,
                offset: 40.0,
            })]
        );
    }
}
