use ratatui::layout::{Constraint, Layout};
use ratatui::prelude::{Frame, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    StatusBar, StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::{CityTable, CityTableProps, Component, SearchBar, SearchBarProps};
use crate::action::Action;
use crate::state::{AppState, Focus};

/// Props for CitiesView - read-only view of state
pub struct CitiesViewProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

/// Search box, city table and key hints
#[derive(Default)]
pub struct CitiesView {
    search: SearchBar,
    table: CityTable,
}

impl CitiesView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component<Action> for CitiesView {
    type Props<'a> = CitiesViewProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }

        let state = props.state;
        // Header clicks sort whichever widget has the keyboard.
        let focus = match event {
            EventKind::Mouse(_) => Focus::Table,
            _ => state.focus,
        };
        match focus {
            Focus::Search => self
                .search
                .handle_event(
                    event,
                    SearchBarProps {
                        query: &state.query,
                        is_focused: true,
                        on_query_change: Action::SearchQueryChange,
                    },
                )
                .into_iter()
                .collect::<Vec<_>>(),
            Focus::Table => self
                .table
                .handle_event(
                    event,
                    CityTableProps {
                        state,
                        is_focused: true,
                    },
                )
                .into_iter()
                .collect::<Vec<_>>(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: CitiesViewProps<'_>) {
        let state = props.state;
        let chunks = Layout::vertical([
            Constraint::Length(3), // Search
            Constraint::Min(3),    // Table
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        self.search.render(
            frame,
            chunks[0],
            SearchBarProps {
                query: &state.query,
                is_focused: props.is_focused && state.focus == Focus::Search,
                on_query_change: Action::SearchQueryChange,
            },
        );

        self.table.render(
            frame,
            chunks[1],
            CityTableProps {
                state,
                is_focused: props.is_focused && state.focus == Focus::Table,
            },
        );

        let hints = match state.focus {
            Focus::Search => vec![
                StatusBarHint::new("enter", "done"),
                StatusBarHint::new("esc", "clear"),
            ],
            Focus::Table => vec![
                StatusBarHint::new("/", "search"),
                StatusBarHint::new("1-3", "sort"),
                StatusBarHint::new("enter", "weather"),
                StatusBarHint::new("q", "quit"),
            ],
        };
        let route = state
            .route
            .as_deref()
            .map(|route| format!("\u{2192} {route}"))
            .unwrap_or_default();
        let route_items = [StatusBarItem::span(Span::styled(
            route.as_str(),
            Style::default().fg(Color::Cyan),
        ))];

        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[2],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&hints),
                right: StatusBarSection::items(&route_items),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}
