use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::truncate_string;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_perfume_table(frame, app, chunks[0]);
    render_perfume_detail(frame, app, chunks[1]);
}

fn render_perfume_table(frame: &mut Frame, app: &App, area: Rect) {
    // Header row
    let header_cells = [
        Cell::from("Name"),
        Cell::from("Brand"),
        Cell::from("Description"),
    ];
    let header = Row::new(header_cells)
        .style(styles::title_style())
        .height(1);

    // Data rows
    let rows: Vec<Row> = app
        .perfumes
        .rows
        .iter()
        .enumerate()
        .map(|(i, perfume)| {
            let style = if i == app.perfumes.selected {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(perfume.name.as_str()),
                Cell::from(perfume.brand_name()),
                Cell::from(truncate_string(&perfume.description, 40)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(35), // Name
        Constraint::Length(16),     // Brand
        Constraint::Fill(1),        // Description
    ];

    let title = format!(" Perfumes ({}) ", app.perfumes.rows.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::title_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.perfumes.selected));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_perfume_detail(frame: &mut Frame, app: &App, area: Rect) {
    let selected = app.perfumes.selected_row();

    let content = match selected {
        Some(perfume) => {
            let mut lines = vec![];

            lines.push(Line::from(Span::styled(
                perfume.name.as_str(),
                styles::title_style(),
            )));
            lines.push(Line::from(""));

            lines.push(Line::from(vec![
                Span::styled("Brand: ", styles::muted_style()),
                Span::raw(perfume.brand_name()),
            ]));

            let image = perfume.logo.as_deref().unwrap_or("-");
            lines.push(Line::from(vec![
                Span::styled("Image: ", styles::muted_style()),
                Span::raw(truncate_string(image, 40)),
            ]));

            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Description",
                styles::highlight_style(),
            )));
            for line in wrap_text(&perfume.description, (area.width as usize).saturating_sub(4)) {
                lines.push(Line::from(line));
            }

            lines
        }
        None => vec![Line::from(Span::styled(
            "Select a perfume from the list",
            styles::muted_style(),
        ))],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in s.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}
