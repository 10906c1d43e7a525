use super::components::{centered_rect, truncate_to_width};
use crate::app::App;
use crate::ui::theme::ThemeTokens;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

pub fn render_help_popup(f: &mut Frame, app: &App, tokens: &ThemeTokens) {
    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(tokens.accent))
        .style(Style::default().fg(tokens.fg).bg(tokens.bg));
    let area = centered_rect(70, 70, f.area());
    f.render_widget(Clear, area);

    let keys = &app.config.keybindings;
    let rows: Vec<(&str, &Vec<String>)> = vec![
        ("Next / previous day", &keys.tabs.next),
        ("", &keys.tabs.prev),
        ("Move selection", &keys.tasks.down),
        ("", &keys.tasks.up),
        ("Toggle done", &keys.tasks.toggle),
        ("Hop to next day", &keys.tasks.duplicate),
        ("Delete", &keys.tasks.delete),
        ("New task", &keys.global.focus_composer),
        ("Save task", &keys.composer.submit),
        ("Leave composer", &keys.composer.cancel),
        ("Dark / light", &keys.global.toggle_theme),
        ("Quit", &keys.global.quit),
    ];

    let mut lines: Vec<Line> = rows
        .into_iter()
        .map(|(label, bindings)| {
            Line::from(vec![
                Span::styled(format!("{label:<22}"), Style::default().fg(tokens.muted)),
                Span::styled(
                    bindings.join(" / "),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "1-7 jump to a day. Mouse: click ( ) to toggle, ⏩ to hop, drag left to delete.",
        Style::default().fg(tokens.muted),
    )));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(ratatui::widgets::Wrap { trim: false });
    f.render_widget(paragraph, area);
}

pub fn render_delete_popup(f: &mut Frame, app: &App, tokens: &ThemeTokens) {
    let Some(task) = app.delete_target.as_ref() else {
        return;
    };

    let block = Block::default()
        .title(" Delete task? ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(tokens.danger))
        .style(Style::default().fg(tokens.fg).bg(tokens.bg));
    let area = centered_rect(60, 30, f.area());
    f.render_widget(Clear, area);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let description = truncate_to_width(&task.description, inner.width as usize);
    f.render_widget(
        Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                description,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("from {}", task.day),
                Style::default().fg(tokens.muted),
            )),
        ])
        .alignment(Alignment::Center),
        chunks[0],
    );

    let confirm = app.config.keybindings.popup.confirm.join("/");
    let cancel = app.config.keybindings.popup.cancel.join("/");
    f.render_widget(
        Paragraph::new(format!("{confirm}: delete   {cancel}: keep"))
            .alignment(Alignment::Center)
            .style(Style::default().fg(tokens.muted)),
        chunks[1],
    );
}
