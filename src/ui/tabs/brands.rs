use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::truncate_string;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if app.brands.rows.is_empty() && app.brands.query.loading {
        let loading = Paragraph::new(Line::from(Span::styled(
            "Loading brands...",
            styles::muted_style(),
        )))
        .block(
            Block::default()
                .title(" Brands ")
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        );
        frame.render_widget(loading, area);
        return;
    }

    let header_cells = [Cell::from("Name"), Cell::from("Logo")];
    let header = Row::new(header_cells)
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .brands
        .rows
        .iter()
        .enumerate()
        .map(|(i, brand)| {
            let style = if i == app.brands.selected {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            Row::new(vec![
                Cell::from(brand.name.as_str()),
                Cell::from(truncate_string(&brand.logo_display(), 60)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(35), // Name
        Constraint::Fill(1),        // Logo URL
    ];

    let title = format!(" Brands ({}) ", app.brands.rows.len());

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
    state.select(Some(app.brands.selected));

    frame.render_stateful_widget(table, area, &mut state);
}
