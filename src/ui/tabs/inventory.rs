use ratatui::{
    layout::{Constraint, Rect},
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::{format_date, format_price};

/// Render the Inventory tab. Rows are created by the stock pipeline, so
/// this screen only edits and deletes.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let header_cells = [
        Cell::from("Perfume"),
        Cell::from("Brand"),
        Cell::from("Size"),
        Cell::from("Price"),
        Cell::from("Stock"),
        Cell::from("Updated"),
    ];
    let header = Row::new(header_cells)
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = app
        .inventory
        .rows
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == app.inventory.selected {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };

            let stock_cell = if item.in_stock() {
                Cell::from(format!("{:>5}", item.stock)).style(styles::stock_style(true))
            } else {
                Cell::from("  Out").style(styles::stock_style(false))
            };

            Row::new(vec![
                Cell::from(item.perfume_name()),
                Cell::from(item.brand_name()),
                Cell::from(item.size.to_string()),
                Cell::from(format!("{:>9}", format_price(item.price))),
                stock_cell,
                Cell::from(format_date(&item.updated_at)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(28), // Perfume
        Constraint::Length(16),     // Brand
        Constraint::Length(7),      // Size: "200 ml"
        Constraint::Length(10),     // Price
        Constraint::Length(6),      // Stock
        Constraint::Fill(1),        // Updated
    ];

    let title = format!(" Inventory ({}) ", app.inventory.rows.len());

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
    state.select(Some(app.inventory.selected));

    frame.render_stateful_widget(table, area, &mut state);
}
