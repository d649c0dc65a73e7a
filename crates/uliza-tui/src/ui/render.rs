use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, AuthField, AuthMode, Pane};

use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_main_content(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    // Render overlays
    if matches!(app.state, AppState::AuthModal) {
        render_auth_overlay(frame, app);
    }

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let right = match app.session.identity() {
        Some(identity) => format!("Welcome, {}  [o] logout", identity.username),
        None => "[l] login  [r] register".to_string(),
    };

    let title = "  ULIZA";
    let subtitle = " Q&A";
    let left_len = title.len() + subtitle.len();

    let line = Line::from(vec![
        Span::styled(title, styles::accent_style()),
        Span::styled(subtitle, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(left_len + right.len() + 2),
        )),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(28),
            Constraint::Percentage(38),
            Constraint::Percentage(34),
        ])
        .split(area);

    render_history_pane(frame, app, columns[0]);
    render_question_pane(frame, app, columns[1]);
    render_answer_pane(frame, app, columns[2]);
}

fn render_history_pane(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" History ")
        .border_style(styles::border_style(app.pane == Pane::History));

    if app.ledger.is_empty() {
        let placeholder = Paragraph::new("\nNo queries yet")
            .alignment(Alignment::Center)
            .style(styles::muted_style())
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = app
        .ledger
        .records()
        .iter()
        .map(|record| {
            let question = truncate(&record.question, width);
            let stamp = record.asked_at.format("%H:%M:%S").to_string();
            ListItem::new(vec![
                Line::from(question),
                Line::from(Span::styled(stamp, styles::muted_style())),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(styles::selected_style());

    let mut state = ListState::default();
    state.select(Some(app.history_selection));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_question_pane(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Your Question ")
        .border_style(styles::border_style(app.pane == Pane::Question));

    if !app.is_authenticated() {
        let lines = vec![
            Line::from(""),
            Line::from("Please login to ask questions"),
            Line::from(""),
            Line::from(vec![
                Span::styled("[l]", styles::help_key_style()),
                Span::raw(" Login    "),
                Span::styled("[r]", styles::help_key_style()),
                Span::raw(" Create Account"),
            ]),
        ];
        let placeholder = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let mut lines = Vec::new();
    if app.question_input.is_empty() {
        lines.push(Line::from(Span::styled(
            "Ask me anything...",
            styles::muted_style(),
        )));
    } else {
        lines.push(Line::from(app.question_input.as_str()));
    }
    lines.push(Line::from(""));
    if app.ask_in_flight {
        lines.push(Line::from(Span::styled(
            "Processing...",
            styles::muted_style(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Enter to submit",
            styles::muted_style(),
        )));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    frame.render_widget(paragraph, area);
}

fn render_answer_pane(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Answer ")
        .border_style(styles::border_style(app.pane == Pane::Answer));

    let paragraph = if app.ask_in_flight {
        Paragraph::new("\nThinking...")
            .alignment(Alignment::Center)
            .style(styles::muted_style())
            .block(block)
    } else if let Some(ref answer) = app.answer {
        Paragraph::new(answer.as_str())
            .wrap(Wrap { trim: false })
            .scroll((app.answer_scroll, 0))
            .block(block)
    } else {
        Paragraph::new("\nSubmit a question to see answers here")
            .alignment(Alignment::Center)
            .style(styles::muted_style())
            .block(block)
    };

    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = if let Some(ref msg) = app.status_message {
        format!(" {} ", msg)
    } else {
        " Ready ".to_string()
    };
    let right_text = " Tab panes | [?] help | [q] quit ";

    let padding = (area.width as usize)
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());

    let line = Line::from(vec![
        Span::raw(left_text),
        Span::raw(" ".repeat(padding)),
        Span::styled(right_text, styles::muted_style()),
    ]);

    frame.render_widget(Paragraph::new(line).style(styles::status_bar_style()), area);
}

fn render_auth_overlay(frame: &mut Frame, app: &App) {
    let height = match app.auth_mode {
        AuthMode::Login => 11,
        AuthMode::Register => 15,
    };
    let area = centered_rect(46, height, frame.area());

    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", app.auth_mode.title()))
        .border_style(styles::border_style(true));

    let mut lines = Vec::new();

    if let Some(ref error) = app.auth_error {
        lines.push(Line::from(Span::styled(
            truncate(error, area.width.saturating_sub(4) as usize),
            styles::error_style(),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(""));

    if app.auth_mode == AuthMode::Register {
        push_field(
            &mut lines,
            "Full Name",
            &app.auth_full_name,
            app.auth_focus == AuthField::FullName,
        );
        push_field(
            &mut lines,
            "Email",
            &app.auth_email,
            app.auth_focus == AuthField::Email,
        );
    }
    push_field(
        &mut lines,
        "Username",
        &app.auth_username,
        app.auth_focus == AuthField::Username,
    );
    let masked = "\u{2022}".repeat(app.auth_password.chars().count());
    push_field(
        &mut lines,
        "Password",
        &masked,
        app.auth_focus == AuthField::Password,
    );

    lines.push(Line::from(""));
    if app.auth_in_flight {
        lines.push(Line::from(Span::styled(
            "  Processing...",
            styles::muted_style(),
        )));
    } else {
        let submit = format!("[ {} ]", app.auth_mode.title());
        lines.push(Line::from(Span::styled(
            format!("  {}", submit),
            styles::field_label_style(app.auth_focus == AuthField::Submit),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Tab next field | Enter submit | Esc close",
        styles::muted_style(),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn push_field(lines: &mut Vec<Line>, label: &str, value: &str, focused: bool) {
    let cursor = if focused { "_" } else { "" };
    lines.push(Line::from(vec![
        Span::styled(format!("  {:<10}", label), styles::field_label_style(focused)),
        Span::raw(format!("{}{}", value, cursor)),
    ]));
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(52, 14, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .border_style(styles::border_style(true));

    let entries: [(&str, &str); 9] = [
        ("Tab / Shift-Tab", "switch pane"),
        ("Enter (question)", "submit question"),
        ("Enter (history)", "re-display stored answer"),
        ("Up/Down, j/k", "navigate / scroll"),
        ("l", "open login"),
        ("r", "open registration"),
        ("o", "logout"),
        ("q", "quit"),
        ("Esc / ?", "close this help"),
    ];

    let lines: Vec<Line> = entries
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(format!("  {:<18}", key), styles::help_key_style()),
                Span::styled(*desc, styles::help_desc_style()),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect(34, 5, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Quit ")
        .border_style(styles::border_style(true));

    let lines = vec![
        Line::from(""),
        Line::from(Span::raw("  Quit? [y]es / [n]o")),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Center a fixed-size rect within the given area
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Truncate a string to a maximum display length, adding ellipsis if needed
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{}...", cut)
    }
}
