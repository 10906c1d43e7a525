use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, TaskRowHit};
use crate::models::{Day, InputMode, Phase};

pub mod color_parser;
pub mod components;
pub mod popups;
pub mod theme;

use components::{pad_to_width, truncate_to_width, wrap_lines};
use popups::{render_delete_popup, render_help_popup};
use theme::ThemeTokens;

const TOGGLE_OPEN: &str = "( ) ";
const TOGGLE_DONE: &str = "(✓) ";
const DUPLICATE_CONTROL: &str = " ⏩ ";
const TAB_GAP: u16 = 1;

pub fn ui(f: &mut Frame, app: &mut App) {
    let tokens = ThemeTokens::resolve(&app.config.theme, app.is_dark);
    app.hit_map.clear();

    f.render_widget(
        Block::default().style(Style::default().fg(tokens.fg).bg(tokens.bg)),
        f.area(),
    );

    if app.phase == Phase::Loading {
        render_splash(f, &tokens);
        return;
    }

    let banner_lines = app
        .store_error
        .as_deref()
        .map(|err| {
            let width = f.area().width.saturating_sub(4) as usize;
            wrap_lines(&format!("⚠ Storage unavailable: {err}"), width)
        })
        .unwrap_or_default();
    let banner_height = if banner_lines.is_empty() {
        0
    } else {
        (banner_lines.len() as u16).min(3) + 2
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(banner_height),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_header(f, app, &tokens, chunks[0]);
    render_tabs(f, app, &tokens, chunks[1]);
    render_task_list(f, app, &tokens, chunks[2]);
    if banner_height > 0 {
        render_banner(f, &banner_lines, &tokens, chunks[3]);
    }
    render_composer(f, app, &tokens, chunks[4]);
    render_status(f, app, &tokens, chunks[5]);

    if app.show_help_popup {
        render_help_popup(f, app, &tokens);
    }
    if app.delete_target.is_some() {
        render_delete_popup(f, app, &tokens);
    }
}

fn render_splash(f: &mut Frame, tokens: &ThemeTokens) {
    let area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(5),
            Constraint::Fill(1),
        ])
        .split(area);

    let lines = vec![
        Line::from("🐸"),
        Line::from(""),
        Line::from(Span::styled(
            "Frog Hop",
            Style::default()
                .fg(tokens.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "press any key",
            Style::default().fg(tokens.muted),
        )),
    ];
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        chunks[1],
    );
}

fn bordered(tokens: &ThemeTokens) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(tokens.border))
}

fn render_header(f: &mut Frame, app: &mut App, tokens: &ThemeTokens, area: Rect) {
    let block = bordered(tokens);
    let inner = block.inner(area);
    f.render_widget(block, area);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw("🐸 "),
            Span::styled(
                "Frog Hop",
                Style::default()
                    .fg(tokens.accent)
                    .add_modifier(Modifier::BOLD),
            ),
        ])),
        inner,
    );

    // The button names the mode it switches to.
    let label = if app.is_dark { " ☀ Light " } else { " ☾ Dark " };
    let width = (label.width() as u16).min(inner.width);
    let button = Rect {
        x: inner.x + inner.width.saturating_sub(width),
        y: inner.y,
        width,
        height: inner.height.min(1),
    };
    f.render_widget(
        Paragraph::new(Span::styled(
            label,
            Style::default().fg(tokens.muted).add_modifier(Modifier::BOLD),
        )),
        button,
    );
    app.hit_map.theme_button = Some(button);
}

fn render_tabs(f: &mut Frame, app: &mut App, tokens: &ThemeTokens, area: Rect) {
    let block = bordered(tokens);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut spans = Vec::new();
    let mut x = inner.x;
    let right = inner.x + inner.width;
    for day in Day::ALL {
        let label = format!(" {day} ");
        let width = label.width() as u16;
        let style = if day == app.selected_day {
            Style::default()
                .fg(tokens.tab_active_fg)
                .bg(tokens.tab_active_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(tokens.muted)
        };

        if x < right {
            let visible = width.min(right - x);
            app.hit_map
                .tabs
                .push((Rect::new(x, inner.y, visible, 1), day));
        }
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" ".repeat(TAB_GAP as usize)));
        x = x.saturating_add(width + TAB_GAP);
    }

    f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn render_task_list(f: &mut Frame, app: &mut App, tokens: &ThemeTokens, area: Rect) {
    let border_color = if app.input_mode == InputMode::Navigate {
        tokens.accent
    } else {
        tokens.border
    };
    let block = bordered(tokens)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", app.selected_day));
    let inner = block.inner(area);

    if app.tasks.is_empty() {
        f.render_widget(block, area);
        let lines = vec![
            Line::from(""),
            Line::from("🪷"),
            Line::from(format!("No hops for {}!", app.selected_day)),
        ];
        f.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .style(Style::default().fg(tokens.muted)),
            inner,
        );
        return;
    }

    let toggle_width = TOGGLE_OPEN.width() as u16;
    let duplicate_width = DUPLICATE_CONTROL.width() as u16;
    let text_width = inner
        .width
        .saturating_sub(toggle_width + duplicate_width) as usize;
    let threshold = app.config.gestures.swipe_threshold;

    let items: Vec<ListItem> = app
        .tasks
        .iter()
        .map(|task| {
            let (toggle, toggle_style, text_style) = if task.is_completed {
                (
                    TOGGLE_DONE,
                    Style::default().fg(tokens.done),
                    Style::default()
                        .fg(tokens.muted)
                        .add_modifier(Modifier::CROSSED_OUT),
                )
            } else {
                (
                    TOGGLE_OPEN,
                    Style::default().fg(tokens.muted),
                    Style::default().fg(tokens.fg),
                )
            };
            let description = pad_to_width(
                &truncate_to_width(&task.description, text_width),
                text_width,
            );

            let mut item = ListItem::new(Line::from(vec![
                Span::styled(toggle, toggle_style),
                Span::styled(description, text_style),
                Span::styled(DUPLICATE_CONTROL, Style::default().fg(tokens.accent)),
            ]));

            // Reveal the delete affordance while a row is dragged left.
            if let Some(drag) = app.drag
                && drag.task_id == Some(task.id)
                && drag.leftward_distance() > 0
            {
                let bg = if drag.leftward_distance() >= threshold {
                    tokens.danger
                } else {
                    tokens.border
                };
                item = item.style(Style::default().bg(bg));
            }
            item
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(tokens.border).add_modifier(Modifier::BOLD));
    f.render_stateful_widget(list, area, &mut app.tasks_state);

    let offset = app.tasks_state.offset();
    for (index, task) in app
        .tasks
        .iter()
        .enumerate()
        .skip(offset)
        .take(inner.height as usize)
    {
        let y = inner.y + (index - offset) as u16;
        let row = Rect::new(inner.x, y, inner.width, 1);
        app.hit_map.rows.push(TaskRowHit {
            task_id: task.id,
            row,
            toggle: Rect::new(inner.x, y, toggle_width.min(inner.width), 1),
            duplicate: Rect::new(
                inner.x + inner.width.saturating_sub(duplicate_width),
                y,
                duplicate_width.min(inner.width),
                1,
            ),
        });
    }
}

fn render_banner(f: &mut Frame, lines: &[String], tokens: &ThemeTokens, area: Rect) {
    let block = bordered(tokens).border_style(Style::default().fg(tokens.danger));
    let text: Vec<Line> = lines
        .iter()
        .map(|line| Line::from(Span::styled(line.clone(), Style::default().fg(tokens.danger))))
        .collect();
    f.render_widget(Paragraph::new(text).block(block), area);
}

fn render_composer(f: &mut Frame, app: &mut App, tokens: &ThemeTokens, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { tokens.accent } else { tokens.border };
    let block = bordered(tokens)
        .border_style(Style::default().fg(border_color))
        .title(" + ");

    app.textarea.set_block(block);
    app.textarea.set_style(Style::default().fg(tokens.fg));
    app.textarea
        .set_placeholder_style(Style::default().fg(tokens.muted));
    app.textarea.set_cursor_line_style(Style::default());
    if editing {
        app.textarea
            .set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
    } else {
        app.textarea.set_cursor_style(Style::default());
    }
    f.render_widget(&app.textarea, area);
    app.hit_map.composer = Some(area);
}

fn render_status(f: &mut Frame, app: &App, tokens: &ThemeTokens, area: Rect) {
    let (text, style) = if let Some(message) = app.toast_message.as_deref() {
        (
            message,
            Style::default()
                .fg(tokens.toast)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        let hint = match app.input_mode {
            InputMode::Editing => "Enter save · Esc back · Ctrl+L clear",
            InputMode::Navigate => {
                "i add · space done · n hop · d delete · h/l day · t theme · ? help · q quit"
            }
        };
        (hint, Style::default().fg(tokens.muted))
    };
    f.render_widget(
        Paragraph::new(Span::styled(
            truncate_to_width(text, area.width as usize),
            style,
        )),
        area,
    );
}
