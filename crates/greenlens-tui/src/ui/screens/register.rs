use ratatui::{
    layout::Rect,
    text::{Line, Span},
    Frame,
};

use greenlens_core::navigation::Screen;
use greenlens_core::validation::Field;

use crate::app::App;
use crate::forms::RegisterFocus;
use crate::ui::styles;

use super::{button_line, link_line, message_line, push_field, push_general_error, render_form};

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    render_form(frame, area, Screen::Register.title(), lines(app));
}

pub(crate) fn lines(app: &App) -> Vec<Line<'static>> {
    let form = &app.register;
    let pending = app.pending == Some(Screen::Register);

    let mut lines = vec![
        message_line("Join Green Lens to buy, sell and talk plants.", styles::muted_style()),
        Line::from(""),
    ];
    push_general_error(&mut lines, &form.errors);

    push_field(
        &mut lines,
        &form.errors,
        Field::Email,
        &form.email,
        form.focus == RegisterFocus::Email,
        false,
    );
    push_field(
        &mut lines,
        &form.errors,
        Field::Username,
        &form.username,
        form.focus == RegisterFocus::Username,
        false,
    );
    push_field(
        &mut lines,
        &form.errors,
        Field::Password,
        &form.password,
        form.focus == RegisterFocus::Password,
        true,
    );
    push_field(
        &mut lines,
        &form.errors,
        Field::ConfirmPassword,
        &form.confirm_password,
        form.focus == RegisterFocus::ConfirmPassword,
        true,
    );

    let role_focused = form.focus == RegisterFocus::Role;
    let role_style = if role_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(vec![
        Span::styled(format!(" {:>17} [", "I am a"), styles::muted_style()),
        Span::styled(format!("◀ {:^12} ▶", form.role.label()), role_style),
        Span::styled("]", styles::muted_style()),
    ]));

    lines.push(Line::from(""));
    lines.push(button_line(
        "Create account",
        form.focus == RegisterFocus::Submit,
        pending,
        app.tick,
    ));
    lines.push(Line::from(""));
    lines.push(link_line("Back to sign in", form.focus == RegisterFocus::BackLink));
    lines
}
