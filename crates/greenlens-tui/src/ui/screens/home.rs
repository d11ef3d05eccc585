use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use greenlens_core::catalog::featured_plants;
use greenlens_core::utils::truncate_string;

use crate::app::{App, HomeTab};
use crate::ui::styles;

/// Longest username shown in the greeting
const MAX_GREETING_NAME: usize = 24;

/// Render the Home screen - greeting, search box, tabs and the plant list
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Greeting
            Constraint::Length(3), // Search
            Constraint::Length(2), // Tabs
            Constraint::Min(4),    // Plants
        ])
        .split(area);

    render_greeting(frame, app, chunks[0]);
    render_search(frame, app, chunks[1]);
    render_tabs(frame, app, chunks[2]);
    render_plants(frame, app, chunks[3]);
}

fn render_greeting(frame: &mut Frame, app: &App, area: Rect) {
    let greeting = match app.user.as_ref().map(|u| u.display_name()) {
        Some(name) if !name.is_empty() => {
            format!("Hello, {}", truncate_string(name, MAX_GREETING_NAME))
        }
        _ => "Hello".to_string(),
    };

    let lines = vec![
        Line::from(Span::styled(format!(" {}", greeting), styles::title_style())),
        Line::from(Span::styled(
            " Find the plant that fits your space",
            styles::muted_style(),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_search(frame: &mut Frame, app: &App, area: Rect) {
    let home = &app.home;
    let text = if home.searching {
        Line::from(vec![
            Span::styled(home.search_query.clone(), styles::search_style()),
            Span::styled("▌", styles::search_style()),
        ])
    } else if home.search_query.is_empty() {
        Line::from(Span::styled("Search plants", styles::muted_style()))
    } else {
        Line::from(Span::styled(home.search_query.clone(), styles::list_item_style()))
    };

    let block = Block::default()
        .title(" Search [/] ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(home.searching));

    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in HomeTab::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(tab.title(), styles::tab_style(*tab == app.home.tab)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_plants(frame: &mut Frame, app: &App, area: Rect) {
    let plants = app.home.visible_plants();

    if plants.is_empty() {
        let message = format!(" No plants match \"{}\"", app.home.search_query.trim());
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(message, styles::muted_style()))),
            area,
        );
        return;
    }

    let rows: Vec<Row> = plants
        .iter()
        .map(|plant| {
            Row::new(vec![
                Cell::from(plant.name),
                Cell::from(Span::styled(plant.image_url, styles::muted_style())),
            ])
        })
        .collect();

    let widths = [Constraint::Percentage(40), Constraint::Fill(1)];
    let title = featured_title(plants.len());

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Name", "Image"]).style(styles::title_style()))
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(!app.home.searching)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.home.selection));

    frame.render_stateful_widget(table, area, &mut state);
}

/// Table title, showing how many plants survive the search filter.
fn featured_title(shown: usize) -> String {
    let total = featured_plants().len();
    if shown == total {
        format!(" Featured ({}) ", total)
    } else {
        format!(" Featured ({} of {}) ", shown, total)
    }
}
