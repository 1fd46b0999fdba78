//! TUI rendering for smelter using ratatui.
//!
//! Rendering reads the session [`App`] and draws; it never mutates state.
//! Key handling lives in [`input`] and talks to the app only through its
//! public methods.

mod input;

pub use input::handle_key;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use smelter_session::{App, AuthField, HistoryView, Screen};
use smelter_types::AnalysisOutcome;

const ACCENT: Color = Color::Cyan;
const ERROR: Color = Color::Red;
const OK: Color = Color::Green;
const DIM: Color = Color::DarkGray;

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &App) {
    match app.screen {
        Screen::Login | Screen::Signup => draw_auth(frame, app),
        Screen::Dashboard => draw_dashboard(frame, app),
    }

    if app.history.is_open() {
        draw_history_overlay(frame, app);
    }
}

// ============================================================================
// Auth screens
// ============================================================================

fn draw_auth(frame: &mut Frame, app: &App) {
    let is_signup = app.screen == Screen::Signup;
    let area = centered_rect(frame.area(), 52, if is_signup { 14 } else { 12 });

    let title = if is_signup { " Create account " } else { " Sign in " };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(title);
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "smelter",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        field_line("Username", &app.form.username, false, is_focused(app, AuthField::Username)),
    ];
    if is_signup {
        lines.push(field_line(
            "Email   ",
            &app.form.email,
            false,
            is_focused(app, AuthField::Email),
        ));
    }
    lines.push(field_line(
        "Password",
        &app.form.password,
        true,
        is_focused(app, AuthField::Password),
    ));
    lines.push(Line::default());

    if app.form.busy {
        lines.push(Line::from(Span::styled(
            if is_signup { "Creating account..." } else { "Signing in..." },
            Style::default().fg(DIM),
        )));
    } else if let Some(error) = &app.form.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(ERROR),
        )));
    } else {
        lines.push(Line::default());
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        if is_signup {
            "Tab fields · Enter sign up · Ctrl+N sign in instead · Esc quit"
        } else {
            "Tab fields · Enter sign in · Ctrl+N create account · Esc quit"
        },
        Style::default().fg(DIM),
    )));

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }),
        inner,
    );
}

fn is_focused(app: &App, field: AuthField) -> bool {
    app.form.focus.unwrap_or(AuthField::Username) == field
}

fn field_line<'a>(label: &'a str, value: &str, mask: bool, focused: bool) -> Line<'a> {
    let shown = if mask {
        "•".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let marker = if focused { "> " } else { "  " };
    let value_style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(marker, Style::default().fg(ACCENT)),
        Span::styled(format!("{label}: "), Style::default().fg(DIM)),
        Span::styled(shown, value_style),
    ])
}

// ============================================================================
// Dashboard
// ============================================================================

fn draw_dashboard(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Editor + results
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    draw_editor(frame, app, panes[0]);
    draw_results(frame, app, panes[1]);

    draw_status_bar(frame, app, chunks[2]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let user = app.session.username().unwrap_or("anonymous");
    let line = Line::from(vec![
        Span::styled("smelter", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::raw(user),
        Span::styled(format!("  {}", app.base_url()), Style::default().fg(DIM)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_editor(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Source ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (cursor_line, cursor_col) = app.controller.cursor_position();
    let visible = (inner.height as usize).max(1);
    let scroll = (cursor_line + 1).saturating_sub(visible);

    frame.render_widget(
        Paragraph::new(app.controller.source()).scroll((scroll as u16, 0)),
        inner,
    );

    // Place the terminal cursor in the buffer, clamped to the pane.
    let x = inner.x + (cursor_col as u16).min(inner.width.saturating_sub(1));
    let y = inner.y + (cursor_line - scroll) as u16;
    if y < inner.y + inner.height {
        frame.set_cursor_position((x, y));
    }
}

fn draw_results(frame: &mut Frame, app: &App, area: Rect) {
    let running = app.controller.is_running();
    let title = if running { " Results (analyzing...) " } else { " Results " };
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = match app.controller.outcome() {
        AnalysisOutcome::Empty => vec![
            Line::default(),
            Line::from(Span::styled("No analysis yet", Style::default().fg(DIM))),
            Line::from(Span::styled(
                "Press F5 to analyze & refactor",
                Style::default().fg(DIM),
            )),
        ],
        AnalysisOutcome::Running { .. } => vec![
            Line::default(),
            Line::from(Span::styled("Analyzing...", Style::default().fg(ACCENT))),
        ],
        AnalysisOutcome::Error { message } => vec![
            Line::default(),
            Line::from(Span::styled(
                message.clone(),
                Style::default().fg(ERROR),
            )),
            Line::default(),
            Line::from(Span::styled("Press F5 to retry", Style::default().fg(DIM))),
        ],
        AnalysisOutcome::Completed(result) => {
            let mut lines = vec![Line::from(Span::styled(
                format!("Detected issues ({})", result.smells.len()),
                Style::default().add_modifier(Modifier::BOLD),
            ))];
            for smell in &result.smells {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {} ", smell.kind), Style::default().fg(ERROR)),
                    Span::styled(smell.location.clone(), Style::default().fg(DIM)),
                ]));
                lines.push(Line::from(Span::raw(format!("    {}", smell.description))));
            }
            if let Some(code) = &result.refactored_code
                && !code.is_empty()
            {
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    "Refactored code",
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                for text in code.lines() {
                    lines.push(Line::from(Span::raw(format!("  {text}"))));
                }
            }
            if result.saved_to_history {
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    "✓ Saved to history",
                    Style::default().fg(OK),
                )));
            }
            lines
        }
    };

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let text = app.status_line().map_or_else(
        || "F5 analyze · F2 history · F3 sample · F8 logout · Esc quit".to_string(),
        ToString::to_string,
    );
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(text, Style::default().fg(DIM)))),
        area,
    );
}

// ============================================================================
// History overlay
// ============================================================================

fn draw_history_overlay(frame: &mut Frame, app: &App) {
    let area = percent_rect(frame.area(), 80, 70);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(" Analysis History ");
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let lines = match app.history.view() {
        HistoryView::Closed => return,
        HistoryView::Loading => vec![
            Line::default(),
            Line::from(Span::styled("Loading...", Style::default().fg(DIM))),
        ],
        HistoryView::Loaded(records) if records.is_empty() => vec![
            Line::default(),
            Line::from(Span::styled("No history yet", Style::default().fg(DIM))),
            Line::from(Span::styled(
                "Your analyses will appear here",
                Style::default().fg(DIM),
            )),
        ],
        HistoryView::Loaded(records) => {
            let mut lines = Vec::with_capacity(records.len() * 3 + 1);
            for (idx, record) in records.iter().enumerate() {
                let selected = idx == app.history.selected();
                let marker = if selected { "> " } else { "  " };
                let style = if selected {
                    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                lines.push(Line::from(vec![
                    Span::styled(marker, style),
                    Span::styled(format!("{} issues", record.smells_count), style),
                    Span::styled(
                        format!("  {}", record.created_label()),
                        Style::default().fg(DIM),
                    ),
                ]));
                if !record.smell_types.is_empty() {
                    lines.push(Line::from(Span::styled(
                        format!("    Types: {}", record.smell_types),
                        Style::default().fg(DIM),
                    )));
                }
                lines.push(Line::from(Span::styled(
                    format!("    {}", record.code_preview(60)),
                    Style::default().fg(DIM),
                )));
            }
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "↑/↓ select · Enter restore · Esc close",
                Style::default().fg(DIM),
            )));
            lines
        }
    };

    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
}

// ============================================================================
// Layout helpers
// ============================================================================

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn percent_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(percent_y) / 100) as u16;
    centered_rect(area, width, height)
}
