//! Terminal rendering of the element tree
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout},
    prelude::{Frame, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    StatusBar, StatusBarHint, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use super::Component;
use crate::action::Action;
use crate::dom::{Element, Node};

const COLUMN_SEPARATOR: &str = " │ ";

/// Props for DocumentView - the page to draw and which button has focus
pub struct DocumentViewProps<'a> {
    pub document: &'a Element,
    pub focused: usize,
    pub is_focused: bool,
}

/// Draws an element tree as terminal text
#[derive(Default)]
pub struct DocumentView;

impl Component<Action> for DocumentView {
    type Props<'a> = DocumentViewProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return None;
        }

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Down | KeyCode::Tab | KeyCode::Char('j') => Some(Action::FocusNext),
                KeyCode::Up | KeyCode::BackTab | KeyCode::Char('k') => Some(Action::FocusPrev),
                KeyCode::Enter | KeyCode::Char(' ') => Some(Action::Activate),
                KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
                _ => None,
            },
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: DocumentViewProps<'_>) {
        let chunks = Layout::vertical([
            Constraint::Min(1),    // Page
            Constraint::Length(1), // Help bar
        ])
        .split(area);

        let page = Paragraph::new(document_lines(props.document, props.focused))
            .block(Block::bordered());
        frame.render_widget(page, chunks[0]);

        let mut status_bar = StatusBar::new();
        <StatusBar as Component<Action>>::render(
            &mut status_bar,
            frame,
            chunks[1],
            StatusBarProps {
                left: StatusBarSection::empty(),
                center: StatusBarSection::hints(&[
                    StatusBarHint::new("↑/↓", "move"),
                    StatusBarHint::new("enter", "search"),
                    StatusBarHint::new("q", "quit"),
                ]),
                right: StatusBarSection::empty(),
                style: StatusBarStyle::default(),
                is_focused: false,
            },
        );
    }
}

/// Lay the tree out top to bottom. `focused` indexes buttons in document order.
pub fn document_lines(root: &Element, focused: usize) -> Vec<Line<'static>> {
    let mut flow = Flow {
        lines: Vec::new(),
        focused,
        next_button: 0,
    };
    flow.element(root);
    flow.lines
}

struct Flow {
    lines: Vec<Line<'static>>,
    focused: usize,
    next_button: usize,
}

impl Flow {
    fn element(&mut self, element: &Element) {
        let tag = element.tag();
        match tag.as_str() {
            "h1" => {
                self.lines.push(Line::styled(
                    element.text_content(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ));
            }
            "h2" => {
                self.lines.push(Line::styled(
                    element.text_content(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            }
            "p" => {
                let style = if element.has_class("error") {
                    Style::default().fg(Color::Red)
                } else if element.has_class("loading") {
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC)
                } else {
                    Style::default()
                };
                self.lines.push(Line::styled(element.text_content(), style));
            }
            "button" => self.button(element),
            "table" => self.table(element),
            _ => self.children(element),
        }

        if matches!(tag.as_str(), "header" | "ul") {
            self.lines.push(Line::default());
        }
    }

    fn children(&mut self, element: &Element) {
        for node in element.children() {
            match node {
                Node::Element(child) => self.element(&child),
                Node::Text(text) if !text.trim().is_empty() => self.lines.push(Line::from(text)),
                Node::Text(_) => {}
            }
        }
    }

    fn button(&mut self, button: &Element) {
        let is_focused = self.next_button == self.focused;
        self.next_button += 1;

        let (marker, style) = if is_focused {
            (
                "▸ ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            ("  ", Style::default().fg(Color::Cyan))
        };
        self.lines.push(Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("[ {} ]", button.text_content()), style),
        ]));
    }

    fn table(&mut self, table: &Element) {
        let rows: Vec<(bool, Vec<String>)> = table
            .find_all("tr")
            .iter()
            .map(|row| {
                let cells = row.child_elements();
                let is_header = cells.iter().any(|cell| cell.tag() == "th");
                (is_header, cells.iter().map(Element::text_content).collect())
            })
            .collect();

        let columns = rows.iter().map(|(_, cells)| cells.len()).max().unwrap_or(0);
        let widths: Vec<usize> = (0..columns)
            .map(|i| {
                rows.iter()
                    .filter_map(|(_, cells)| cells.get(i))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for (is_header, cells) in rows {
            let text = cells
                .iter()
                .zip(widths.iter().copied())
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join(COLUMN_SEPARATOR);

            if is_header {
                let rule_width =
                    widths.iter().sum::<usize>() + COLUMN_SEPARATOR.chars().count() * (columns - 1);
                self.lines.push(Line::styled(
                    text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                self.lines.push(Line::styled(
                    "─".repeat(rule_width),
                    Style::default().fg(Color::DarkGray),
                ));
            } else {
                self.lines.push(Line::from(text));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{el, Attrs};
    use tui_dispatch::testing::*;

    fn page() -> Element {
        el(
            "main",
            Attrs::new(),
            [
                el("header", Attrs::new(), [el("h1", Attrs::new(), ["Veðurspá"])]),
                el(
                    "ul",
                    Attrs::new(),
                    [
                        el("li", Attrs::new(), [el("button", Attrs::new(), ["Reykjavík"])]),
                        el("li", Attrs::new(), [el("button", Attrs::new(), ["Akureyri"])]),
                    ],
                ),
            ],
        )
    }

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn test_lines_mark_focused_button() {
        let lines = plain(&document_lines(&page(), 1));

        assert_eq!(lines[0], "Veðurspá");
        assert!(lines.contains(&"  [ Reykjavík ]".to_string()));
        assert!(lines.contains(&"▸ [ Akureyri ]".to_string()));
    }

    #[test]
    fn test_table_columns_are_aligned() {
        let table = el(
            "table",
            Attrs::new(),
            [
                el(
                    "tr",
                    Attrs::new(),
                    [el("th", Attrs::new(), ["Tími"]), el("th", Attrs::new(), ["Hiti"])],
                ),
                el(
                    "tr",
                    Attrs::new(),
                    [el("td", Attrs::new(), ["1.1.2024, 12:00"]), el("td", Attrs::new(), ["5 °C"])],
                ),
            ],
        );

        let lines = plain(&document_lines(&el("div", Attrs::new(), [table]), 0));

        assert_eq!(lines[0], "Tími            │ Hiti");
        assert_eq!(lines[1], "─".repeat(22));
        assert_eq!(lines[2], "1.1.2024, 12:00 │ 5 °C");
    }

    #[test]
    fn test_handle_event_navigation() {
        let mut component = DocumentView;
        let document = page();

        for (keys, expected) in [
            ("j", Action::FocusNext),
            ("k", Action::FocusPrev),
            ("q", Action::Quit),
        ] {
            let props = DocumentViewProps {
                document: &document,
                focused: 0,
                is_focused: true,
            };
            let actions: Vec<_> = component
                .handle_event(&EventKind::Key(key(keys)), props)
                .into_iter()
                .collect();
            actions.assert_count(1);
            actions.assert_first(expected);
        }
    }

    #[test]
    fn test_handle_event_unfocused_ignores() {
        let mut component = DocumentView;
        let document = page();
        let props = DocumentViewProps {
            document: &document,
            focused: 0,
            is_focused: false,
        };

        let actions: Vec<_> = component
            .handle_event(&EventKind::Key(key("j")), props)
            .into_iter()
            .collect();
        actions.assert_empty();
    }

    #[test]
    fn test_render_page() {
        let mut render = RenderHarness::new(60, 12);
        let mut component = DocumentView;
        let document = page();

        let output = render.render_to_string_plain(|frame| {
            let props = DocumentViewProps {
                document: &document,
                focused: 0,
                is_focused: true,
            };
            component.render(frame, frame.area(), props);
        });

        assert!(output.contains("Veðurspá"));
        assert!(output.contains("[ Reykjavík ]"));
        assert!(output.contains("quit"));
    }
}
