use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, LoginFocus, Tab};

use super::styles;
use super::tabs::{brands, inventory, perfumes};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame, app);
    }

    if matches!(app.state, AppState::LoggingIn) {
        render_login_overlay(frame, app);
    }

    if matches!(app.state, AppState::Editing) {
        render_form_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingDelete) {
        render_delete_overlay(frame, app);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, _app: &App, area: Rect) {
    let title = "  Scentdesk";
    let help_hint = "[?] Help";
    let title_len = title.len();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title_len as u16 + help_hint.len() as u16 + 4)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(title_line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let main_tabs = vec![
        ("[1] Brands", app.current_tab == Tab::Brands),
        ("[2] Perfumes", app.current_tab == Tab::Perfumes),
        ("[3] Inventory", app.current_tab == Tab::Inventory),
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in main_tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        if *selected {
            spans.push(Span::styled(*label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(*label, styles::muted_style()));
        }
    }

    let line = Line::from(spans);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.current_tab {
        Tab::Brands => brands::render(frame, app, area),
        Tab::Perfumes => perfumes::render(frame, app, area),
        Tab::Inventory => inventory::render(frame, app, area),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[r]efresh | [q]uit";

    // Failed reads land here and stay visible alongside the last good rows
    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        format!(" {} ", app.config.api_url())
    };

    let right_text = format!(" {} ", shortcuts);

    let width = area.width as usize;
    let padding_len = width
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());

    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    let paragraph = Paragraph::new(status_line).style(styles::status_bar_style());
    frame.render_widget(paragraph, area);
}

fn render_help_overlay(frame: &mut Frame, _app: &App) {
    let area = centered_rect_fixed(52, 25, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        // ASCII Art Logo (centered for 52-width box, 50 interior)
        Line::from(Span::styled(
            "           ╔═╗╔═╗╔═╗╔╗╔╔╦╗╔╦╗╔═╗╔═╗╦╔═",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "           ╚═╗║  ║╣ ║║║ ║  ║║║╣ ╚═╗╠╩╗",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "           ╚═╝╚═╝╚═╝╝╚╝ ╩ ╚╩╝╚═╝╚═╝╩ ╩",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            format!("                version {}", version),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  1-3       ", styles::help_key_style()),
            Span::styled("Switch tabs", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Tab       ", styles::help_key_style()),
            Span::styled("Next/prev tab", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  ↑/↓       ", styles::help_key_style()),
            Span::styled("Navigate list", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  PgUp/PgDn ", styles::help_key_style()),
            Span::styled("Scroll by page", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  Esc       ", styles::help_key_style()),
            Span::styled("Go back", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        Line::from(vec![
            Span::styled("  r         ", styles::help_key_style()),
            Span::styled("Refresh current tab", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  n         ", styles::help_key_style()),
            Span::styled("New record (brands, perfumes)", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  e         ", styles::help_key_style()),
            Span::styled("Edit selected record", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  d         ", styles::help_key_style()),
            Span::styled("Delete selected record", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  o         ", styles::help_key_style()),
            Span::styled("Sign out", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  q         ", styles::help_key_style()),
            Span::styled("Quit", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(help_text).block(block);

    frame.render_widget(paragraph, area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    // Fixed size dialog - compact
    let height = if app.login_error.is_some() { 14 } else { 12 };
    let area = centered_rect_fixed(46, height, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let mut lines = vec![];

    // ASCII Art Logo (centered)
    lines.push(Line::from(Span::styled(
        "        ╔═╗╔═╗╔═╗╔╗╔╔╦╗╔╦╗╔═╗╔═╗╦╔═",
        styles::title_style(),
    )));
    lines.push(Line::from(Span::styled(
        "        ╚═╗║  ║╣ ║║║ ║  ║║║╣ ╚═╗╠╩╗",
        styles::title_style(),
    )));
    lines.push(Line::from(Span::styled(
        "        ╚═╝╚═╝╚═╝╝╚╝ ╩ ╚╩╝╚═╝╚═╝╩ ╩",
        styles::title_style(),
    )));
    lines.push(Line::from(""));

    // Email field (46 width - 2 borders = 44 interior, field window 22 chars)
    let email_focused = app.login_focus == LoginFocus::Email;
    let email_style = if email_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    // Long addresses scroll: show the tail of the input
    let email_chars = app.login_email.chars().count();
    let email_tail: String = app
        .login_email
        .chars()
        .skip(email_chars.saturating_sub(22))
        .collect();
    let email_display = format!("{:<22}", email_tail);
    let cursor = if email_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled("Email:    [", styles::muted_style()),
        Span::styled(format!("{}{}", email_display, cursor), email_style),
        Span::styled("]", styles::muted_style()),
    ]));

    // Password field
    let password_focused = app.login_focus == LoginFocus::Password;
    let password_style = if password_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let password_masked: String = "*".repeat(app.login_password.len().min(22));
    let password_display = format!("{:<22}", password_masked);
    let cursor = if password_focused { "▌" } else { "" };
    lines.push(Line::from(vec![
        Span::raw("   "),
        Span::styled("Password: [", styles::muted_style()),
        Span::styled(format!("{}{}", password_display, cursor), password_style),
        Span::styled("]", styles::muted_style()),
    ]));

    // Login button
    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    lines.push(Line::from(""));
    if button_focused {
        lines.push(Line::from(vec![
            Span::raw("            ["),
            Span::styled(" ▶ Login ◀ ", button_style),
            Span::raw("]"),
        ]));
    } else {
        lines.push(Line::from(vec![
            Span::raw("            ["),
            Span::styled("   Login   ", button_style),
            Span::raw("]"),
        ]));
    }

    // Error message
    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

fn render_form_overlay(frame: &mut Frame, app: &App) {
    let form = match app.form.as_ref() {
        Some(form) => form,
        None => return,
    };

    let extra = if form.error.is_some() { 2 } else { 0 };
    let height = (form.fields.len() as u16) + 6 + extra;
    let area = centered_rect_fixed(56, height, frame.area());

    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let value_style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };

        let label = format!("{:<12}", format!("{}:", field.label));

        if field.is_choice() {
            // Choice fields cycle with Left/Right
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(label, styles::muted_style()),
                Span::styled("◀ ", styles::muted_style()),
                Span::styled(format!("{:<24}", field.display()), value_style),
                Span::styled(" ▶", styles::muted_style()),
            ]));
        } else {
            let value_chars = field.value.chars().count();
            let tail: String = field
                .value
                .chars()
                .skip(value_chars.saturating_sub(26))
                .collect();
            let cursor = if focused { "▌" } else { "" };
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(label, styles::muted_style()),
                Span::styled("[", styles::muted_style()),
                Span::styled(format!("{:<26}{}", tail, cursor), value_style),
                Span::styled("]", styles::muted_style()),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("  [Enter]", styles::help_key_style()),
        Span::styled(" Save   ", styles::help_desc_style()),
        Span::styled("[Tab]", styles::help_key_style()),
        Span::styled(" Next field   ", styles::help_desc_style()),
        Span::styled("[Esc]", styles::help_key_style()),
        Span::styled(" Cancel", styles::help_desc_style()),
    ]));

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .title(format!(" {} ", form.title))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let label = app
        .pending_delete
        .as_ref()
        .map(|p| p.label.as_str())
        .unwrap_or("this record");

    let area = centered_rect_fixed(50, 9, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("   Delete {}?", crate::utils::truncate_string(label, 34)),
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "   The record is removed on the server.",
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to delete, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Confirm Delete ")
        .title_style(styles::error_style())
        .borders(Borders::ALL)
        .border_style(styles::error_style())
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    // Fixed size dialog matching login screen
    let area = centered_rect_fixed(46, 10, frame.area());

    // Clear the area
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(Span::styled(
            "        ╔═╗╔═╗╔═╗╔╗╔╔╦╗╔╦╗╔═╗╔═╗╦╔═",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "        ╚═╗║  ║╣ ║║║ ║  ║║║╣ ╚═╗╠╩╗",
            styles::title_style(),
        )),
        Line::from(Span::styled(
            "        ╚═╝╚═╝╚═╝╝╚╝ ╩ ╚╩╝╚═╝╚═╝╩ ╩",
            styles::title_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines).block(block);

    frame.render_widget(paragraph, area);
}
