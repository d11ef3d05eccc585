use ratatui::{layout::Rect, text::Line, Frame};

use greenlens_core::navigation::Screen;
use greenlens_core::validation::Field;

use crate::app::App;
use crate::forms::LoginFocus;
use crate::ui::styles;

use super::{button_line, link_line, logo_lines, message_line, push_field, push_general_error, render_form};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    render_form(frame, area, Screen::Login.title(), lines(app));
}

pub(crate) fn lines(app: &App) -> Vec<Line<'static>> {
    let form = &app.login;
    let pending = app.pending == Some(Screen::Login);

    let mut lines = logo_lines();
    lines.push(Line::from(""));

    if let Some(ref notice) = app.notice {
        lines.push(message_line(notice, styles::success_style()));
        lines.push(Line::from(""));
    }
    push_general_error(&mut lines, &form.errors);

    push_field(
        &mut lines,
        &form.errors,
        Field::Email,
        &form.email,
        form.focus == LoginFocus::Email,
        false,
    );
    push_field(
        &mut lines,
        &form.errors,
        Field::Password,
        &form.password,
        form.focus == LoginFocus::Password,
        true,
    );

    lines.push(Line::from(""));
    lines.push(button_line("Sign in", form.focus == LoginFocus::Submit, pending, app.tick));
    lines.push(Line::from(""));
    lines.push(link_line(
        "Create an account",
        form.focus == LoginFocus::RegisterLink,
    ));
    lines.push(link_line("Forgot password?", form.focus == LoginFocus::ForgotLink));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FormErrors;
    use crate::ui::screens::test_support::{app, position, text};

    #[test]
    fn test_general_error_shown_above_fields() {
        let mut app = app();
        app.login.errors = FormErrors::general("Invalid credentials\nAccount locked");

        let lines = lines(&app);
        let first = position(&lines, "Invalid credentials").unwrap();
        let second = position(&lines, "Account locked").unwrap();
        let email = position(&lines, "Email").unwrap();

        assert_eq!(second, first + 1);
        assert!(second < email);
        assert!(!text(&lines[first]).contains("Account locked"));
    }

    #[test]
    fn test_no_error_lines_without_errors() {
        let app = app();
        let lines = lines(&app);
        let email = position(&lines, "Email").unwrap();
        // Logo, then one spacer
        assert_eq!(email, logo_lines().len() + 1);
    }
}
