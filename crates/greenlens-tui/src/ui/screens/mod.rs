//! One renderer per navigable screen, plus the form widgets they share.

pub mod forgot_password;
pub mod home;
pub mod login;
pub mod register;

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use greenlens_core::validation::Field;

use crate::forms::FormErrors;
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

/// Width of the form dialogs
const FORM_WIDTH: u16 = 56;

/// Visible characters inside a text field
const FIELD_WIDTH: usize = 28;

/// Width of the label column, "Confirm password" plus padding
const LABEL_WIDTH: usize = 17;

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

pub(crate) fn logo_lines() -> Vec<Line<'static>> {
    vec![
        Line::from(Span::styled(
            "        ╔═╗╦═╗╔═╗╔═╗╔╗╔  ╦  ╔═╗╔╗╔╔═╗",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "        ║ ╦╠╦╝║╣ ║╣ ║║║  ║  ║╣ ║║║╚═╗",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "        ╚═╝╩╚═╚═╝╚═╝╝╚╝  ╩═╝╚═╝╝╚╝╚═╝",
            styles::title_style(),
        )),
    ]
}

/// A labelled input box. Long values scroll so the cursor stays visible.
pub(crate) fn field_line(field: Field, value: &str, focused: bool, secret: bool) -> Line<'static> {
    let shown: String = if secret {
        "*".repeat(value.chars().count().min(FIELD_WIDTH))
    } else {
        let skip = value.chars().count().saturating_sub(FIELD_WIDTH);
        value.chars().skip(skip).collect()
    };
    let cursor = if focused { "▌" } else { " " };
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };

    Line::from(vec![
        Span::styled(format!(" {:>width$} [", field.label(), width = LABEL_WIDTH), styles::muted_style()),
        Span::styled(format!("{:<width$}{}", shown, cursor, width = FIELD_WIDTH), style),
        Span::styled("]", styles::muted_style()),
    ])
}

/// The inline error under a field, if any.
pub(crate) fn field_error_line(errors: &FormErrors, field: Field) -> Option<Line<'static>> {
    errors.field(field).map(|message| {
        Line::from(Span::styled(
            format!("{:width$}{}", "", message, width = LABEL_WIDTH + 4),
            styles::error_style(),
        ))
    })
}

/// Field plus its error line.
pub(crate) fn push_field(
    lines: &mut Vec<Line<'static>>,
    errors: &FormErrors,
    field: Field,
    value: &str,
    focused: bool,
    secret: bool,
) {
    lines.push(field_line(field, value, focused, secret));
    if let Some(line) = field_error_line(errors, field) {
        lines.push(line);
    }
}

/// The submit button, replaced by a wait indicator while a request runs.
pub(crate) fn button_line(label: &str, focused: bool, pending: bool, tick: u64) -> Line<'static> {
    if pending {
        let frame = SPINNER_FRAMES[(tick as usize) % SPINNER_FRAMES.len()];
        return Line::from(vec![
            Span::raw("              "),
            Span::styled(format!("{} Please wait…", frame), styles::highlight_style()),
        ]);
    }

    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    Line::from(vec![
        Span::raw("              ["),
        Span::styled(text, style),
        Span::raw("]"),
    ])
}

pub(crate) fn link_line(label: &str, focused: bool) -> Line<'static> {
    let marker = if focused { "▸ " } else { "  " };
    Line::from(vec![
        Span::raw("              "),
        Span::styled(marker, styles::link_style(focused)),
        Span::styled(label.to_string(), styles::link_style(focused)),
    ])
}

pub(crate) fn message_line(message: &str, style: Style) -> Line<'static> {
    Line::from(Span::styled(format!(" {}", message), style))
}

/// The form's general error, one line per message, followed by a spacer.
pub(crate) fn push_general_error(lines: &mut Vec<Line<'static>>, errors: &FormErrors) {
    if let Some(ref message) = errors.general {
        for part in message.lines().filter(|part| !part.trim().is_empty()) {
            lines.push(message_line(part.trim(), styles::error_style()));
        }
        lines.push(Line::from(""));
    }
}

/// Draw `lines` in a bordered box centered in `area`.
pub(crate) fn render_form(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line<'static>>) {
    let height = lines.len() as u16 + 2;
    let rect = centered_rect_fixed(FORM_WIDTH, height, area);

    let block = Block::default()
        .title(format!(" {} ", title))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), rect);
}
