use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
};
use tui_dispatch::EventKind;

use super::{Component, InfiniteScroll};
use crate::action::Action;
use crate::state::{AppState, SortColumn};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Rows scrolled per mouse wheel notch.
const WHEEL_ROWS: i16 = 3;

const HIGHLIGHT_SYMBOL: &str = "> ";

const COLUMN_WIDTHS: [Constraint; 3] = [
    Constraint::Percentage(40),
    Constraint::Percentage(30),
    Constraint::Percentage(30),
];

pub const LOADING_LABEL: &str = "Loading...";
pub const END_LABEL: &str = "No more cities";

/// Scrollable city table with a near-end trigger for the next page
pub struct CityTable {
    table_state: TableState,
    scroll: InfiniteScroll,
    /// Body rows that fit on screen, updated on every render
    viewport_rows: u16,
    /// Header cell areas from the last render, in column order
    header_cells: Vec<Rect>,
}

pub struct CityTableProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

impl Default for CityTable {
    fn default() -> Self {
        Self {
            table_state: TableState::default(),
            scroll: InfiniteScroll::default(),
            viewport_rows: 10,
            header_cells: Vec::new(),
        }
    }
}

impl CityTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn page_rows(&self) -> i16 {
        i16::try_from(self.viewport_rows.max(1)).unwrap_or(i16::MAX)
    }

    fn key_action(&self, code: KeyCode) -> Option<Action> {
        let action = match code {
            KeyCode::Down | KeyCode::Char('j') => Action::SelectionMove(1),
            KeyCode::Up | KeyCode::Char('k') => Action::SelectionMove(-1),
            KeyCode::PageDown => Action::SelectionMove(self.page_rows()),
            KeyCode::PageUp => Action::SelectionMove(-self.page_rows()),
            KeyCode::Home | KeyCode::Char('g') => Action::SelectionJumpTop,
            KeyCode::End | KeyCode::Char('G') => Action::SelectionJumpBottom,
            KeyCode::Enter => Action::CityOpen,
            KeyCode::Char('/') => Action::SearchFocus,
            KeyCode::Char('1') => Action::SortBy(SortColumn::Name),
            KeyCode::Char('2') => Action::SortBy(SortColumn::Country),
            KeyCode::Char('3') => Action::SortBy(SortColumn::Timezone),
            KeyCode::Esc => Action::SearchClear,
            KeyCode::Char('q') => Action::Quit,
            _ => return None,
        };
        Some(action)
    }

    fn mouse_action(&self, mouse: &MouseEvent) -> Option<Action> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return None;
        }
        let position = Position::new(mouse.column, mouse.row);
        self.header_cells
            .iter()
            .position(|cell| cell.contains(position))
            .and_then(SortColumn::from_index)
            .map(Action::SortBy)
    }

    /// Row the selection lands on once `action` is applied.
    fn target_position(action: &Action, state: &AppState) -> Option<usize> {
        match action {
            Action::SelectionMove(delta) => Some(state.selection_target(*delta)),
            Action::SelectionJumpBottom => Some(state.visible_len().saturating_sub(1)),
            _ => None,
        }
    }

    /// Mirror the table's column layout so header clicks can be hit-tested.
    fn layout_header(&mut self, inner: Rect, has_selection: bool) {
        let selection_width = if has_selection {
            HIGHLIGHT_SYMBOL.chars().count() as u16
        } else {
            0
        };
        let [_, columns] =
            Layout::horizontal([Constraint::Length(selection_width), Constraint::Fill(0)])
                .areas(Rect { height: 1, ..inner });
        self.header_cells = Layout::horizontal(COLUMN_WIDTHS)
            .spacing(1)
            .split(columns)
            .to_vec();
    }

    fn header(sort: Option<SortColumn>) -> Row<'static> {
        let cells = SortColumn::ALL.iter().map(|column| {
            let marker = if sort == Some(*column) { " ▲" } else { "" };
            Cell::from(Line::from(vec![
                Span::styled(
                    format!("{}", column.index() + 1),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{}{}", column.title(), marker),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]))
        });
        Row::new(cells).style(Style::default().fg(Color::Yellow))
    }

    fn status_row(state: &AppState) -> Option<Row<'static>> {
        let label = if state.is_loading() {
            let frame = SPINNER[state.tick_count as usize % SPINNER.len()];
            format!("{frame} {LOADING_LABEL}")
        } else if state.end_of_data {
            END_LABEL.to_string()
        } else {
            return None;
        };
        Some(Row::new(vec![Cell::from(label)]).style(Style::default().fg(Color::DarkGray)))
    }
}

impl Component<Action> for CityTable {
    type Props<'a> = CityTableProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }

        let action = match event {
            EventKind::Key(key) => self.key_action(key.code),
            EventKind::Mouse(mouse) => self.mouse_action(mouse),
            EventKind::Scroll { delta, .. } if *delta != 0 => {
                Some(Action::SelectionMove((*delta as i16).saturating_mul(WHEEL_ROWS)))
            }
            _ => None,
        };
        let Some(action) = action else {
            return Vec::new();
        };

        let state = props.state;
        let more = Self::target_position(&action, state).and_then(|position| {
            self.scroll
                .on_near_end(position, state.visible_len(), !state.end_of_data, || {
                    Action::PageRequestNext
                })
        });

        let mut actions = vec![action];
        actions.extend(more);
        actions
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let visible = state.visible();

        let title = if state.has_query() {
            format!(" Cities {}/{} ", visible.len(), state.cities.len())
        } else {
            format!(" Cities {} ", state.cities.len())
        };
        let border_color = if props.is_focused {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(title);

        // Border plus header row.
        self.viewport_rows = area.height.saturating_sub(3);
        let inner = block.inner(area);

        if visible.is_empty() && !state.is_loading() {
            let message = if state.has_query() {
                format!("No cities match \"{}\"", state.query)
            } else if state.end_of_data {
                END_LABEL.to_string()
            } else {
                "No cities loaded yet".to_string()
            };
            let body = Paragraph::new(Line::from(Span::styled(
                message,
                Style::default().fg(Color::DarkGray),
            )))
            .block(block);
            frame.render_widget(body, area);
            self.header_cells.clear();
            return;
        }

        let mut rows: Vec<Row> = visible
            .iter()
            .map(|city| {
                Row::new([
                    Cell::from(city.name.as_str()),
                    Cell::from(city.country.as_str()),
                    Cell::from(city.timezone.as_str()),
                ])
            })
            .collect();
        rows.extend(Self::status_row(state));

        let table = Table::new(rows, COLUMN_WIDTHS)
            .header(Self::header(state.sort))
            .block(block)
            .row_highlight_style(
                Style::default()
                    .bg(Color::Rgb(50, 50, 60))
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(HIGHLIGHT_SYMBOL);

        if visible.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state
                .select(Some(state.selected.min(visible.len() - 1)));
        }
        self.layout_header(inner, !visible.is_empty());
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CityRecord;
    use crossterm::event::KeyModifiers;
    use tui_dispatch::testing::*;

    fn state_with(len: usize) -> AppState {
        AppState {
            cities: (0..len)
                .map(|i| CityRecord {
                    id: i.to_string(),
                    name: format!("City {i}"),
                    country: "Country".into(),
                    timezone: "UTC".into(),
                })
                .collect(),
            ..Default::default()
        }
    }

    fn events(component: &mut CityTable, state: &AppState, name: &str) -> Vec<Action> {
        component
            .handle_event(
                &EventKind::Key(key(name)),
                CityTableProps {
                    state,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect()
    }

    #[test]
    fn test_sort_keys() {
        let mut component = CityTable::new();
        let state = state_with(3);

        events(&mut component, &state, "2").assert_first(Action::SortBy(SortColumn::Country));
        events(&mut component, &state, "3").assert_first(Action::SortBy(SortColumn::Timezone));
    }

    #[test]
    fn test_move_far_from_end_does_not_request() {
        let mut component = CityTable::new();
        let state = state_with(50);

        let actions = events(&mut component, &state, "j");
        actions.assert_count(1);
        actions.assert_first(Action::SelectionMove(1));
    }

    #[test]
    fn test_move_near_end_requests_next_page() {
        let mut component = CityTable::new();
        let state = AppState {
            selected: 46,
            ..state_with(50)
        };

        let actions = events(&mut component, &state, "j");
        actions.assert_count(2);
        actions.assert_first(Action::SelectionMove(1));
        assert_eq!(actions[1], Action::PageRequestNext);
    }

    #[test]
    fn test_no_request_after_end_of_data() {
        let mut component = CityTable::new();
        let state = AppState {
            selected: 49,
            end_of_data: true,
            ..state_with(50)
        };

        let actions = events(&mut component, &state, "j");
        actions.assert_count(1);
    }

    #[test]
    fn test_render_loading_row() {
        let mut render = RenderHarness::new(60, 12);
        let mut component = CityTable::new();
        let state = AppState {
            in_flight: Some(0),
            ..state_with(2)
        };

        let output = render.render_to_string_plain(|frame| {
            component.render(
                frame,
                frame.area(),
                CityTableProps {
                    state: &state,
                    is_focused: true,
                },
            );
        });

        assert!(output.contains("City 1"));
        assert!(output.contains(LOADING_LABEL));
    }

    fn render_plain(component: &mut CityTable, state: &AppState) -> String {
        let mut render = RenderHarness::new(60, 12);
        render.render_to_string_plain(|frame| {
            component.render(
                frame,
                frame.area(),
                CityTableProps {
                    state,
                    is_focused: true,
                },
            );
        })
    }

    /// Screen cell where `needle` is drawn in a plain render.
    fn locate(output: &str, needle: &str) -> (u16, u16) {
        output
            .lines()
            .enumerate()
            .find_map(|(row, line)| {
                line.find(needle)
                    .map(|byte| (line[..byte].chars().count() as u16, row as u16))
            })
            .unwrap_or_else(|| panic!("{needle:?} not rendered:\n{output}"))
    }

    fn click(component: &mut CityTable, state: &AppState, column: u16, row: u16) -> Vec<Action> {
        let event = EventKind::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        });
        component
            .handle_event(
                &event,
                CityTableProps {
                    state,
                    is_focused: true,
                },
            )
            .into_iter()
            .collect()
    }

    #[test]
    fn test_click_header_sorts_by_column() {
        let mut component = CityTable::new();
        let state = state_with(3);
        let output = render_plain(&mut component, &state);

        let (column, row) = locate(&output, "Country");
        let actions = click(&mut component, &state, column + 2, row);
        actions.assert_count(1);
        actions.assert_first(Action::SortBy(SortColumn::Country));

        let (column, row) = locate(&output, "Timezone");
        click(&mut component, &state, column, row)
            .assert_first(Action::SortBy(SortColumn::Timezone));
    }

    #[test]
    fn test_click_outside_header_does_nothing() {
        let mut component = CityTable::new();
        let state = state_with(3);
        let output = render_plain(&mut component, &state);

        let (column, row) = locate(&output, "City 1");
        click(&mut component, &state, column, row).assert_empty();
    }

    #[test]
    fn test_click_before_first_render_does_nothing() {
        let mut component = CityTable::new();
        let state = state_with(3);

        click(&mut component, &state, 5, 1).assert_empty();
    }
}
