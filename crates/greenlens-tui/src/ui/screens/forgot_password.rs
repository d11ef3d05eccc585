use ratatui::{layout::Rect, text::Line, Frame};

use greenlens_core::navigation::Screen;
use greenlens_core::validation::Field;

use crate::app::App;
use crate::forms::ForgotFocus;
use crate::ui::styles;

use super::{button_line, link_line, message_line, push_field, push_general_error, render_form};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    render_form(frame, area, Screen::ForgotPassword.title(), lines(app));
}

pub(crate) fn lines(app: &App) -> Vec<Line<'static>> {
    let form = &app.forgot;
    let pending = app.pending == Some(Screen::ForgotPassword);

    let mut lines = vec![
        message_line("Enter your email and we will send", styles::muted_style()),
        message_line("you a link to reset your password.", styles::muted_style()),
        Line::from(""),
    ];
    push_general_error(&mut lines, &form.errors);

    push_field(
        &mut lines,
        &form.errors,
        Field::Email,
        &form.email,
        form.focus == ForgotFocus::Email,
        false,
    );

    lines.push(Line::from(""));
    lines.push(button_line(
        "Send reset link",
        form.focus == ForgotFocus::Submit,
        pending,
        app.tick,
    ));
    lines.push(Line::from(""));
    lines.push(link_line("Back to sign in", form.focus == ForgotFocus::BackLink));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::FormErrors;
    use crate::ui::screens::test_support::{app, position};

    #[test]
    fn test_general_error_shown_above_email() {
        let mut app = app();
        app.forgot.errors = FormErrors::general("Something went wrong");

        let lines = lines(&app);
        let error = position(&lines, "Something went wrong").unwrap();
        let email = position(&lines, "Email [").unwrap();
        assert!(error < email);
    }
}
