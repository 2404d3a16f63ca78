use std::ops::Range;

use iced::alignment;
use iced::widget::{Column, Row, Space, container, mouse_area};
use iced::{Element, Length, mouse};
use tree_selector::{Node, Row as TreeRow, Selector, TreeSource};

/// Rendering context passed to row callbacks.
pub struct TreeRowContext<'a, S: TreeSource> {
    pub row: TreeRow<S::Id>,
    pub node: Node<'a, S::Value>,
    pub is_selected: bool,
    pub is_expanded: bool,
    /// Ancestor of the first visible row, drawn above the window.
    pub is_header: bool,
}

type RowRenderer<'a, S, Message> =
    dyn Fn(&TreeRowContext<'a, S>) -> Element<'a, Message> + 'a;
type RowStyle<'a, S> = dyn Fn(&TreeRowContext<'a, S>) -> container::Style + 'a;
type RowAction<'a, Id, Message> = dyn Fn(Id) -> Message + 'a;

/// Tree widget over the visible window of a [`Selector`].
pub struct TreeView<'a, S: TreeSource, U, Message: Clone + 'a> {
    selector: &'a Selector<S, U>,
    source: &'a S,
    range: Range<usize>,
    on_press: Option<Box<RowAction<'a, S::Id, Message>>>,
    on_toggle_folder: Option<Box<RowAction<'a, S::Id, Message>>>,
    render_row: Box<RowRenderer<'a, S, Message>>,
    row_style: Option<Box<RowStyle<'a, S>>>,
    toggle_content: Option<Box<RowRenderer<'a, S, Message>>>,
    spacing: f32,
    indent_width: f32,
    toggle_width: f32,
}

impl<'a, S, U, Message> TreeView<'a, S, U, Message>
where
    S: TreeSource + 'a,
    U: Clone + 'a,
    Message: Clone + 'a,
{
    /// Create a view of every row of `selector`, rendered by `render_row`.
    pub fn new(
        selector: &'a Selector<S, U>,
        source: &'a S,
        render_row: impl Fn(&TreeRowContext<'a, S>) -> Element<'a, Message> + 'a,
    ) -> Self {
        Self {
            range: 0..selector.view().len(),
            selector,
            source,
            on_press: None,
            on_toggle_folder: None,
            render_row: Box::new(render_row),
            row_style: None,
            toggle_content: None,
            spacing: 0.0,
            indent_width: 0.0,
            toggle_width: 0.0,
        }
    }

    /// Restrict drawing to the clipper's visible range.
    pub fn range(mut self, range: Range<usize>) -> Self {
        self.range = range;
        self
    }

    /// Emit a message when a row receives a left press.
    pub fn on_press(
        mut self,
        on_press: impl Fn(S::Id) -> Message + 'a,
    ) -> Self {
        self.on_press = Some(Box::new(on_press));
        self
    }

    /// Emit a message when a folder toggle is clicked.
    pub fn on_toggle_folder(
        mut self,
        on_toggle: impl Fn(S::Id) -> Message + 'a,
    ) -> Self {
        self.on_toggle_folder = Some(Box::new(on_toggle));
        self
    }

    /// Provide a row style callback for background/text styling.
    pub fn row_style(
        mut self,
        row_style: impl Fn(&TreeRowContext<'a, S>) -> container::Style + 'a,
    ) -> Self {
        self.row_style = Some(Box::new(row_style));
        self
    }

    /// Provide content to render inside the toggle area.
    pub fn toggle_content(
        mut self,
        toggle_content: impl Fn(&TreeRowContext<'a, S>) -> Element<'a, Message>
        + 'a,
    ) -> Self {
        self.toggle_content = Some(Box::new(toggle_content));
        self
    }

    /// Set indentation width per tree depth level.
    pub fn indent_width(mut self, width: f32) -> Self {
        self.indent_width = width.max(0.0);
        self
    }

    /// Set the width reserved for the toggle area.
    pub fn toggle_width(mut self, width: f32) -> Self {
        self.toggle_width = width.max(0.0);
        self
    }

    /// Vertical spacing between rows.
    pub fn spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Build the `Element` for the tree view.
    pub fn view(self) -> Element<'a, Message> {
        let window = self.selector.window(self.range.clone());
        let mut column = Column::new().spacing(self.spacing);
        let mut drawn = 0;

        for index in window.headers().iter().copied().chain(window.range()) {
            let Some(row) = self.selector.view().get(index).copied() else {
                continue;
            };
            let Some(node) = self.source.node(row.id) else {
                log::debug!("row {index} points at a removed node, skipping");
                continue;
            };

            let context = TreeRowContext {
                row,
                node,
                is_selected: self.selector.is_selected(row.id),
                is_expanded: self.selector.is_expanded(row.id),
                is_header: index < window.start(),
            };
            column = column.push(self.build_row(&context));
            drawn += 1;
        }

        log::trace!(
            "tree view drew {drawn} rows ({} headers) of {}",
            window.headers().len(),
            self.selector.view().len()
        );
        column.into()
    }

    fn build_row(&self, context: &TreeRowContext<'a, S>) -> Element<'a, Message> {
        let id = context.row.id;
        let content = (self.render_row)(context);
        let content = match self.on_press.as_deref() {
            Some(on_press) => pointer_area(content, on_press(id)),
            None => content,
        };

        let mut row = Row::new().spacing(0.0);

        let indent = context.row.depth as f32 * self.indent_width;
        if indent > 0.0 {
            row = row.push(Space::new().width(Length::Fixed(indent)));
        }

        if self.toggle_width > 0.0 || self.toggle_content.is_some() {
            row = row.push(self.build_toggle_slot(context));
        }

        row = row.push(content);

        let mut element: Element<'a, Message> = row.into();
        if let Some(ref row_style) = self.row_style {
            let style = row_style(context);
            element = container(element).style(move |_| style).into();
        }
        element
    }

    fn build_toggle_slot(
        &self,
        context: &TreeRowContext<'a, S>,
    ) -> Element<'a, Message> {
        let content = self
            .toggle_content
            .as_ref()
            .map(|toggle| toggle(context))
            .unwrap_or_else(|| Space::new().into());

        let content: Element<'a, Message> = container(content)
            .width(Length::Fixed(self.toggle_width))
            .height(Length::Fill)
            .align_x(alignment::Horizontal::Center)
            .align_y(alignment::Vertical::Center)
            .into();

        match self.on_toggle_folder.as_deref() {
            Some(on_toggle) if context.node.is_folder() => {
                pointer_area(content, on_toggle(context.row.id))
            },
            _ => content,
        }
    }
}

fn pointer_area<'a, Message: Clone + 'a>(
    element: Element<'a, Message>,
    on_press: Message,
) -> Element<'a, Message> {
    mouse_area(element)
        .on_press(on_press)
        .interaction(mouse::Interaction::Pointer)
        .into()
}
