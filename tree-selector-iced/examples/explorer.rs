use env_logger::Env;
use iced::widget::{Space, button, column, container, row, text, text_input};
use iced::{Color, Element, Length};
use tree_selector::{
    NodeId, SelectMode, Selector, SelectorEvent, SelectorSettings, Tree,
    TreeSource, visible_range,
};
use tree_selector_iced::{TreeRowContext, TreeView};

const VISIBLE_ROWS: usize = 12;

type Files = Tree<u64>;

#[derive(Debug, Clone)]
enum Message {
    FilterChanged(String),
    Pressed(NodeId),
    Toggle(NodeId),
    ScrollUp,
    ScrollDown,
    Reveal,
}

struct AppState {
    tree: Files,
    selector: Selector<Files>,
    first_row: usize,
    reveal: Option<NodeId>,
    status: String,
}

impl Default for AppState {
    fn default() -> Self {
        let mut tree = Files::new();
        let mut reveal = None;

        if let Some(src) = tree.insert_folder(None, "src") {
            tree.insert_leaf(Some(src), "main.rs", 1_204);
            tree.insert_leaf(Some(src), "lib.rs", 3_310);
            if let Some(ui) = tree.insert_folder(Some(src), "ui") {
                for index in 1..=12 {
                    let name = format!("panel{index}.rs");
                    tree.insert_leaf(Some(ui), name, 512);
                }
                reveal = tree.insert_leaf(Some(ui), "theme.rs", 2_048);
            }
        }
        if let Some(docs) = tree.insert_folder(None, "docs") {
            tree.insert_leaf(Some(docs), "guide.md", 8_192);
            tree.insert_leaf(Some(docs), "changelog.md", 640);
        }
        tree.insert_leaf(None, "Cargo.toml", 412);

        let settings = SelectorSettings::default().with_row_height(22.0);
        let mut selector: Selector<Files> = Selector::new(settings);
        let flag = selector.dirty_flag();
        tree.on_change(move |_| flag.mark());
        selector.sync(&tree);

        Self {
            tree,
            selector,
            first_row: 0,
            reveal,
            status: String::from("nothing selected"),
        }
    }
}

fn update(state: &mut AppState, message: Message) {
    match message {
        Message::FilterChanged(filter) => {
            state.selector.set_filter_text(filter);
            state.first_row = 0;
        },
        Message::Pressed(id) => {
            let is_folder = state
                .tree
                .node(id)
                .is_some_and(|node| node.is_folder());
            if is_folder {
                state.selector.toggle(&state.tree, id);
            } else {
                state.selector.select(
                    &state.tree,
                    Some(id),
                    SelectMode::REPLACE,
                );
            }
        },
        Message::Toggle(id) => {
            state.selector.toggle(&state.tree, id);
        },
        Message::ScrollUp => {
            state.first_row = state.first_row.saturating_sub(1);
        },
        Message::ScrollDown => {
            state.first_row += 1;
        },
        Message::Reveal => {
            if let Some(id) = state.reveal {
                state.selector.request_jump(id);
                state.selector.select(
                    &state.tree,
                    Some(id),
                    SelectMode::REPLACE,
                );
            }
        },
    }

    state.selector.sync(&state.tree);
    state.first_row = state
        .first_row
        .min(state.selector.view().len().saturating_sub(1));

    for event in state.selector.take_events() {
        match event {
            SelectorEvent::SelectionChanged(change) => {
                state.status = match change.current {
                    Some(size) => format!("selected {size} bytes"),
                    None => String::from("nothing selected"),
                };
            },
            SelectorEvent::ScrollTo(request) => {
                state.first_row = request.row;
            },
        }
    }
}

fn view(state: &AppState) -> Element<'_, Message> {
    let row_height = state.selector.settings().row_height();
    let range = visible_range(
        state.first_row as f32 * row_height,
        VISIBLE_ROWS as f32 * row_height,
        row_height,
        state.selector.view().len(),
    );

    let filter = text_input("filter", state.selector.filter_text())
        .on_input(Message::FilterChanged)
        .padding([4, 8]);

    let tree = TreeView::new(&state.selector, &state.tree, render_row)
        .range(range)
        .on_press(Message::Pressed)
        .on_toggle_folder(Message::Toggle)
        .row_style(row_style)
        .toggle_content(toggle_icon)
        .toggle_width(16.0)
        .indent_width(14.0)
        .view();

    let controls = row![
        button(text("up")).on_press(Message::ScrollUp),
        button(text("down")).on_press(Message::ScrollDown),
        button(text("reveal theme.rs")).on_press(Message::Reveal),
    ]
    .spacing(6);

    column![filter, controls, tree, text(&state.status)]
        .spacing(8)
        .padding(8)
        .into()
}

fn render_row<'a>(context: &TreeRowContext<'a, Files>) -> Element<'a, Message> {
    let label = match context.node.value() {
        Some(size) => format!("{} ({size} B)", context.node.name()),
        None => context.node.name().to_owned(),
    };

    container(text(label))
        .padding([2, 8])
        .width(Length::Fill)
        .into()
}

fn row_style(context: &TreeRowContext<'_, Files>) -> container::Style {
    let background = if context.is_selected {
        Some(Color::from_rgb(0.12, 0.26, 0.46).into())
    } else if context.is_header {
        Some(Color::from_rgb(0.16, 0.16, 0.16).into())
    } else {
        None
    };

    container::Style {
        background,
        text_color: Some(Color::from_rgb(0.9, 0.9, 0.9)),
        ..Default::default()
    }
}

fn toggle_icon<'a>(context: &TreeRowContext<'a, Files>) -> Element<'a, Message> {
    if context.node.is_folder() {
        let label = if context.is_expanded { "[-]" } else { "[+]" };
        text(label).into()
    } else {
        Space::new().width(Length::Fixed(16.0)).into()
    }
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .init();

    iced::run(update, view)
}
