use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use greenlens_core::navigation::Screen;

use crate::app::{App, AppState};

use super::screens::{forgot_password, home, login, logo_lines, register};
use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let Some(screen) = app.current_screen() else {
        render_loading(frame, app);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, screen, chunks[0]);
    render_main_content(frame, app, screen, chunks[1]);
    render_status_bar(frame, app, screen, chunks[2]);

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

/// Shown while the stored session is being read
fn render_loading(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(46, 7, frame.area());
    let dots = ".".repeat((app.tick as usize) % 4);

    let mut lines = logo_lines();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("               Loading{:<3}", dots),
        styles::muted_style(),
    )));

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_title_bar(frame: &mut Frame, screen: Screen, area: Rect) {
    let title = "  Green Lens";
    let screen_title = screen.title();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.len() + screen_title.len() + 2),
        )),
        Span::styled(screen_title, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, screen: Screen, area: Rect) {
    match screen {
        Screen::Login => login::render(frame, app, area),
        Screen::Register => register::render(frame, app, area),
        Screen::ForgotPassword => forgot_password::render(frame, app, area),
        Screen::Home => home::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, screen: Screen, area: Rect) {
    let shortcuts = match screen {
        Screen::Login => "Tab next | Enter select | Esc quit",
        Screen::Register | Screen::ForgotPassword => "Tab next | Enter select | Esc back",
        Screen::Home if app.home.searching => "Enter done | Esc clear",
        Screen::Home => "[/] search | ←/→ tabs | [l]ogout | [q]uit",
    };

    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else if let Some(at) = app.signed_in_at {
        format!(" Signed in at {} ", at.format("%H:%M"))
    } else {
        format!(" {} ", app.client.base_url())
    };

    let right_text = format!(" {} ", shortcuts);
    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());

    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(56, 10, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "        Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("        Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fixed_centers() {
        let rect = centered_rect_fixed(20, 10, Rect::new(0, 0, 100, 50));
        assert_eq!(rect, Rect::new(40, 20, 20, 10));
    }

    #[test]
    fn test_centered_rect_fixed_clamps_to_area() {
        let rect = centered_rect_fixed(80, 40, Rect::new(5, 5, 30, 20));
        assert_eq!(rect, Rect::new(5, 5, 30, 20));
    }
}
