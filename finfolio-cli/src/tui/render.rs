//! Stateless drawing of the investment form. Everything shown is read from
//! the [`FormState`] and the optional error message passed in.

use finfolio_core::form::{FormState, InputField};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
};

const TITLE: &str = "New Investment";
const EDIT_HELP: &str = "Enter: next / submit | Tab/Shift-Tab: move | Esc: cancel";
const SUBMITTED_HELP: &str = "Press any key to save";

/// Style of a field's text, chosen only from its focus and whether the user
/// has typed anything (placeholders are dimmed).
pub fn field_style(
    is_focused: bool,
    has_value: bool,
) -> Style {
    match (is_focused, has_value) {
        (true, true) => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        (false, true) => Style::default().fg(Color::White),
        (false, false) => Style::default().fg(Color::DarkGray),
    }
}

fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

/// Progress line, e.g. `Step 2 of 5  ● ● ○ ○ ○`.
pub fn progress_text(
    focus_index: usize,
    total: usize,
) -> String {
    let step = (focus_index + 1).min(total);
    let dots: Vec<&str> = (0..total)
        .map(|i| if i < step { "●" } else { "○" })
        .collect();
    format!("Step {step} of {total}  {}", dots.join(" "))
}

/// Text shown inside a field: what was typed, or the placeholder.
pub fn field_text(field: &InputField) -> &str {
    if field.has_value() {
        field.value()
    } else {
        field.placeholder()
    }
}

pub fn render_form(
    f: &mut Frame,
    form: &FormState,
    error: Option<&str>,
) {
    let fields = form.fields();

    let mut constraints = vec![Constraint::Length(3), Constraint::Length(1)];
    constraints.extend(fields.iter().map(|_| Constraint::Length(3)));
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(1));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(f.size());

    let title = Paragraph::new(TITLE)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(title, chunks[0]);

    let reached = if form.is_submitted() {
        fields.len().saturating_sub(1)
    } else {
        form.focus_index()
    };
    let progress = Paragraph::new(progress_text(reached, fields.len()))
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);
    f.render_widget(progress, chunks[1]);

    for (i, field) in fields.iter().enumerate() {
        let is_focused = !form.is_submitted() && i == form.focus_index();
        let area = chunks[i + 2];

        let input = Paragraph::new(field_text(field))
            .style(field_style(is_focused, field.has_value()))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style(is_focused))
                    .title(field.label()),
            );
        f.render_widget(input, area);

        if is_focused {
            place_cursor(f, area, field);
        }
    }

    let status_area = chunks[fields.len() + 2];
    if let Some(message) = error {
        let error = Paragraph::new(message).style(Style::default().fg(Color::Red));
        f.render_widget(error, status_area);
    }

    let help_text = if form.is_submitted() {
        SUBMITTED_HELP
    } else {
        EDIT_HELP
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(help, chunks[fields.len() + 3]);
}

fn place_cursor(
    f: &mut Frame,
    area: Rect,
    field: &InputField,
) {
    let typed = u16::try_from(field.value().chars().count()).unwrap_or(u16::MAX);
    let max_x = area.right().saturating_sub(2);
    let x = area.x.saturating_add(1).saturating_add(typed).min(max_x);
    f.set_cursor(x, area.y + 1);
}
