/// Ratatui draw entry-point for CityPlan.
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::{AppState, FIELD_ORDER, FormField};
use crate::controller::Phase;
use crate::form::GOAL_CATALOG;
use crate::notify::NoticeKind;

pub const SPINNER_GLYPHS: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

// ── Main draw entry point ─────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, state: &AppState) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Min(0),    // form or plan text
            Constraint::Length(1), // status bar
            Constraint::Length(1), // key hints
        ])
        .split(area);

    draw_header(f, state, chunks[0]);

    // The result area is shown as soon as a submit goes out, before the
    // response resolves; the spinner and empty placeholder cover the wait.
    match state.controller.phase() {
        Phase::AwaitingInput => draw_form(f, state, chunks[1]),
        Phase::Submitting | Phase::ShowingResult => draw_result(f, state, chunks[1]),
    }

    draw_status_bar(f, state, chunks[2]);
    draw_hints(f, state, chunks[3]);
}

// ── Header ────────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, state: &AppState, area: Rect) {
    let title = match state.controller.phase() {
        Phase::AwaitingInput => "Describe your development scenario",
        Phase::Submitting => "Generating plan…",
        Phase::ShowingResult => "Urban development plan",
    };
    let line = Line::from(vec![
        Span::styled(" ⌂ cityplan", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::styled("  ·  ", Style::default().fg(Color::DarkGray)),
        Span::styled(title, Style::default().fg(Color::Cyan)),
    ]);
    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(Color::Rgb(6, 6, 12))),
        area,
    );
}

// ── Form view ─────────────────────────────────────────────────────────────────

fn draw_form(f: &mut Frame, state: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Rgb(60, 60, 80)))
        .title(" scenario ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    // One label line + one value line per field, blank line between
    let mut lines: Vec<Line> = Vec::new();
    let mut cursor_pos: Option<(u16, u16)> = None;

    for field in FIELD_ORDER {
        let focused = state.focus == field;
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let required = if field.required() { " *" } else { "" };
        lines.push(Line::from(Span::styled(
            format!("  {}{required}", field.label()),
            label_style,
        )));

        if field == FormField::Goals {
            lines.push(goal_row(state, focused));
        } else {
            let value = field_value(state, field);
            let marker = if focused { "❯ " } else { "  " };
            let value_style = if focused {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::Rgb(150, 150, 170))
            };
            if focused && state.controller.phase() == Phase::AwaitingInput {
                let before = &value[..state.cursor.min(value.len())];
                let x = inner.x + 4 + before.width() as u16;
                let y = inner.y + lines.len() as u16;
                if x < inner.x + inner.width && y < inner.y + inner.height {
                    cursor_pos = Some((x, y));
                }
            }
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::styled(value.to_string(), value_style),
            ]));
        }
        lines.push(Line::default());
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);

    if let Some(pos) = cursor_pos {
        f.set_cursor_position(pos);
    }
}

fn goal_row(state: &AppState, focused: bool) -> Line<'static> {
    let mut spans = vec![Span::raw("    ")];
    for (i, goal) in GOAL_CATALOG.iter().enumerate() {
        let selected = state.controller.form().has_goal(*goal);
        let highlighted = focused && i == state.goal_cursor % GOAL_CATALOG.len();
        let mark = if selected { "■" } else { "□" };
        let style = match (highlighted, selected) {
            (true, _) => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            (false, true) => Style::default().fg(Color::Green),
            (false, false) => Style::default().fg(Color::Rgb(120, 120, 140)),
        };
        spans.push(Span::styled(format!("{mark} {}", goal.label()), style));
        spans.push(Span::raw("   "));
    }
    Line::from(spans)
}

fn field_value(state: &AppState, field: FormField) -> &str {
    let form = state.controller.form();
    match field {
        FormField::LandArea => form.land_area(),
        FormField::Population => form.population(),
        FormField::Zoning => form.zoning(),
        FormField::Infrastructure => form.infrastructure(),
        FormField::Budget => form.budget(),
        FormField::Goals => "",
    }
}

// ── Result view ───────────────────────────────────────────────────────────────

fn draw_result(f: &mut Frame, state: &AppState, area: Rect) {
    let mut title = String::from(" plan");
    if let Some(at) = state.generated_at {
        title.push_str(&format!(" · generated {}", at.format("%H:%M:%S")));
    }
    if let Some(score) = state.controller.sustainability_score() {
        title.push_str(&format!(" · sustainability {score:.1}"));
    }
    title.push(' ');
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Rgb(60, 60, 80)))
        .title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let text = state.controller.plan_text();
    let lines: Vec<Line> = if text.is_empty() {
        let placeholder = if state.controller.request_in_flight() {
            "  waiting for the plan service…"
        } else {
            "  (no plan text)"
        };
        vec![Line::from(Span::styled(
            placeholder,
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        text.lines()
            .map(|l| Line::from(Span::raw(format!("  {l}"))))
            .collect()
    };

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((state.result_scroll as u16, 0)),
        inner,
    );
}

// ── Status bar ────────────────────────────────────────────────────────────────

fn draw_status_bar(f: &mut Frame, state: &AppState, area: Rect) {
    let (glyph, glyph_color) = if state.controller.request_in_flight() {
        let g = SPINNER_GLYPHS[(state.spinner_tick as usize) % SPINNER_GLYPHS.len()];
        (g, Color::Cyan)
    } else {
        ("⌂", Color::White)
    };

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(glyph, Style::default().fg(glyph_color).add_modifier(Modifier::BOLD)),
        Span::styled(
            format!(" {}", state.profile),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ·  ", Style::default().fg(Color::DarkGray)),
        Span::styled(state.endpoint.clone(), Style::default().fg(Color::Rgb(100, 180, 220))),
    ];

    if let Some(notice) = state.toasts.current() {
        let color = match notice.kind {
            NoticeKind::Success => Color::Green,
            NoticeKind::Error => Color::Red,
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            notice.message.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Rgb(10, 10, 18))),
        area,
    );
}

// ── Key hints ─────────────────────────────────────────────────────────────────

fn draw_hints(f: &mut Frame, state: &AppState, area: Rect) {
    let hints = match state.controller.phase() {
        Phase::AwaitingInput => {
            if state.focus == FormField::Goals {
                " ←→ pick goal  Space toggle  Tab next field  Enter generate  Esc cancel"
            } else {
                " Tab/↑↓ fields  Enter generate  Esc cancel  Ctrl+C quit"
            }
        }
        Phase::Submitting => " waiting for the plan service…  Ctrl+C quit",
        Phase::ShowingResult => " r regenerate  c copy  n new scenario  ↑↓ scroll  Ctrl+C quit",
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            hints,
            Style::default().fg(Color::Rgb(70, 70, 90)),
        )))
        .style(Style::default().bg(Color::Rgb(8, 8, 14))),
        area,
    );
}
