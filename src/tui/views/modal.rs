// Modal overlay rendering
//
// Modals are rendered on top of the main content:
// - Help modal: keyboard shortcuts and current config
// - Confirm modal: yes/no before deletes and history clears

use crate::tui::app::App;
use crate::tui::modal::Modal;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render a modal dialog as a centered overlay
pub fn render(f: &mut Frame, modal: &Modal, app: &App) {
    match modal {
        Modal::Help => render_help(f, app),
        Modal::Confirm { prompt, .. } => render_confirm(f, app, prompt),
    }
}

/// Calculate centered rect for modal dialog
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Render the help modal overlay
fn render_help(f: &mut Frame, app: &App) {
    let key_style = Style::default().fg(app.theme.key);
    let desc_style = Style::default().fg(app.theme.foreground);
    let header_style = Style::default()
        .fg(app.theme.highlight)
        .add_modifier(Modifier::BOLD);
    let divider_style = Style::default().fg(app.theme.border);

    // Helper to create a keybind line: "    key         description"
    let kb = |key: &str, desc: &str| -> Line {
        Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("{:<12}", key), key_style),
            Span::styled(desc.to_string(), desc_style),
        ])
    };

    let content = Text::from(vec![
        Line::raw(""),
        Line::from(Span::styled("  Screens", header_style)),
        kb("F1, h", "Vehicles"),
        kb("F2, p", "Parts"),
        kb("F3, t", "Part types"),
        kb("F4, e", "Events"),
        kb("F5, m", "Add mileage"),
        kb("Esc", "Close / go back"),
        Line::raw(""),
        Line::from(Span::styled("  Lists", header_style)),
        kb("↑/↓, j/k", "Move selection"),
        kb("Enter", "Open / edit"),
        kb("n", "New record"),
        kb("d", "Delete selected"),
        kb("/", "Filter"),
        kb("1 2 3", "Sort by column (again flips)"),
        kb("H", "Change history"),
        kb("a", "Vehicles at event"),
        kb("r", "Reload"),
        Line::raw(""),
        Line::from(Span::styled("  Forms", header_style)),
        kb("Tab/↓", "Next field"),
        kb("←/→", "Choose option"),
        kb("Enter", "Save"),
        Line::raw(""),
        Line::from(Span::styled("  General", header_style)),
        kb("y", "Copy to clipboard"),
        kb("?, F6", "Toggle this help"),
        kb("q, Ctrl+C", "Quit"),
        Line::raw(""),
        Line::from(Span::styled(
            "  ──────────────────────────────────",
            divider_style,
        )),
        Line::from(vec![
            Span::styled("  Theme: ", desc_style),
            Span::styled(&app.theme.name, key_style),
        ]),
    ]);

    let width = 46;
    let height = 36;
    let area = centered_rect(width, height, f.area());

    f.render_widget(Clear, area);

    let paragraph = Paragraph::new(content)
        .style(Style::default().bg(app.theme.background))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.highlight))
                .border_type(app.theme.border_type)
                .title(" Help ")
                .title_bottom(Line::from(" Press ? or Esc to close ").centered()),
        );

    f.render_widget(paragraph, area);
}

fn render_confirm(f: &mut Frame, app: &App, prompt: &str) {
    let width = 50;
    let height = 7;
    let area = centered_rect(width, height, f.area());

    f.render_widget(Clear, area);

    let content = Text::from(vec![
        Line::raw(""),
        Line::from(Span::styled(
            prompt.to_string(),
            Style::default().fg(app.theme.foreground),
        ))
        .centered(),
        Line::raw(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(app.theme.key)),
            Span::styled(" yes   ", app.theme.muted_style()),
            Span::styled("n", Style::default().fg(app.theme.key)),
            Span::styled(" no", app.theme.muted_style()),
        ])
        .centered(),
    ]);

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(app.theme.background))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.warn))
                .border_type(app.theme.border_type)
                .title(" Confirm "),
        );

    f.render_widget(paragraph, area);
}
