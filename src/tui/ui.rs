use crate::output::{format_score, format_submitted, truncate_name};
use crate::ranking::breakdown;
use crate::tui::app::{App, FlashKind, InputMode, Pane, FORM_LABELS};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, List, ListItem, Paragraph, Row, Table};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    if area.height < 8 || area.width < 50 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Title bar
        Constraint::Fill(1),   // Panes
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    let panes = Layout::horizontal([
        Constraint::Length(16),
        Constraint::Fill(3),
        Constraint::Fill(2),
    ])
    .split(chunks[1]);

    render_title(frame, chunks[0], app);
    render_sites(frame, panes[0], app);
    render_ranking(frame, panes[1], app);
    render_history(frame, panes[2], app);
    render_status_bar(frame, chunks[2], app);

    match app.input_mode {
        InputMode::RatingForm => render_rating_popup(frame, app),
        InputMode::Help => render_help_popup(frame, app),
        InputMode::Normal => {}
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let left = format!("Tech Rater [{}]", app.current_label());
    let mut right = app.session.store().location().display().to_string();
    if app.session.store().is_read_only() {
        right.push_str(" (read-only)");
    }

    let padding = (area.width as usize).saturating_sub(left.len() + right.len());
    let right_style = if app.session.store().is_read_only() {
        Style::default().fg(theme.flash_error)
    } else {
        Style::default().fg(theme.muted)
    };

    let title = Line::from(vec![
        Span::styled(left, Style::default().fg(theme.title_color).bold()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, right_style),
    ]);
    frame.render_widget(Paragraph::new(title), area);
}

fn pane_block(app: &App, title: &str, pane: Option<Pane>) -> Block<'static> {
    let color = if pane == Some(app.focus) {
        app.theme.pane_focused
    } else {
        app.theme.pane_unfocused
    };
    Block::bordered()
        .title(format!(" {} ", title))
        .border_style(Style::default().fg(color))
}

fn render_sites(frame: &mut Frame, area: Rect, app: &mut App) {
    let block = pane_block(app, "Sites", Some(Pane::Sites));

    if app.sites.is_empty() {
        let msg = Paragraph::new("No sites")
            .style(Style::default().fg(app.theme.muted))
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    let items: Vec<ListItem> = app
        .sites
        .iter()
        .map(|site| ListItem::new(site.clone()))
        .collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(app.theme.row_selected);

    frame.render_stateful_widget(list, area, &mut app.site_state);
}

fn render_ranking(frame: &mut Frame, area: Rect, app: &mut App) {
    let title = match app.selected_site() {
        Some(site) => format!("Technicians at {}", site),
        None => "Technicians".to_string(),
    };
    let block = pane_block(app, &title, Some(Pane::Technicians));

    if let Some(err) = &app.ranking_error {
        let msg = Paragraph::new(err.clone())
            .style(Style::default().fg(app.theme.flash_error))
            .wrap(ratatui::widgets::Wrap { trim: true })
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    if app.ranking.is_empty() {
        let msg = Paragraph::new("No technicians at this site")
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.muted))
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    let theme = &app.theme;
    let rows: Vec<Row> = app
        .ranking
        .iter()
        .enumerate()
        .map(|(idx, tech)| {
            let rated = tech.num_ratings > 0;
            let row_style = if idx % 2 == 1 {
                Style::default().bg(theme.row_alt_bg)
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(format!("{}.", idx + 1)).style(Style::default().fg(theme.index_color)),
                Cell::from(format!("{:>5}", format_score(tech.average_score, rated)))
                    .style(Style::default().fg(theme.score_color(tech.average_score, rated))),
                Cell::from(format!("{:>3}", tech.num_ratings))
                    .style(Style::default().fg(theme.muted)),
                Cell::from(truncate_name(&tech.name, 40)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4), // Index: "99."
        Constraint::Length(6), // Average: "10.00"
        Constraint::Length(4), // Count
        Constraint::Fill(1),   // Name
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Avg", "N", "Technician"])
                .style(theme.header_style)
                .bottom_margin(1),
        )
        .block(block)
        .row_highlight_style(theme.row_selected);

    frame.render_stateful_widget(table, area, &mut app.tech_state);
}

fn render_history(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let title = match app.selected_tech() {
        Some(tech) => format!("History: {}", truncate_name(&tech.name, 24)),
        None => "History".to_string(),
    };
    let block = pane_block(app, &title, None);

    let ratings = app.selected_history();
    if ratings.is_empty() {
        let msg = Paragraph::new("No ratings yet")
            .style(Style::default().fg(theme.muted))
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    let totals = breakdown(ratings);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Overall  ", theme.header_style),
            Span::styled(
                format_score(totals.average, true),
                Style::default().fg(theme.score_color(totals.average, true)).bold(),
            ),
            Span::styled(
                format!("  ({} ratings)", totals.num_ratings),
                Style::default().fg(theme.muted),
            ),
        ]),
        Line::from(Span::styled(
            format!(
                "R {:.2}  Q {:.2}  T {:.2}",
                totals.responsiveness, totals.quality_of_work, totals.timeliness
            ),
            Style::default().fg(theme.muted),
        )),
        Line::from(""),
    ];

    // Newest first so the latest rating stays visible in short panes
    for (idx, rating) in ratings.iter().enumerate().rev() {
        lines.push(Line::from(vec![
            Span::styled(format!("{:>2}. ", idx + 1), Style::default().fg(theme.index_color)),
            Span::raw(format!(
                "R {:>2} Q {:>2} T {:>2} ",
                rating.responsiveness, rating.quality_of_work, rating.timeliness
            )),
            Span::styled(
                format!("{:.2}", rating.average),
                Style::default().fg(theme.score_color(rating.average, true)),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!("    {}", format_submitted(rating.submitted_at)),
            Style::default().fg(theme.muted),
        )));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let text = if let Some((ref msg, _, kind)) = app.flash_message {
        let msg_color = match kind {
            FlashKind::Success => theme.flash_success,
            FlashKind::Error => theme.flash_error,
            FlashKind::Info => theme.muted,
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let count = format!("{} technicians", app.ranking.len());
        let hints = [
            ("j/k", ":nav "),
            ("Tab", ":pane "),
            ("Enter", ":rate "),
            ("L", ":label "),
            ("r", ":reload "),
            ("?", ":help "),
            ("q", ":quit"),
        ];

        let mut spans = vec![
            Span::styled(count, Style::default().fg(theme.muted)),
            Span::raw("  "),
        ];
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(theme.status_key_color)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(theme.status_bar_bg)),
        area,
    );
}

fn render_rating_popup(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let popup_area = centered_rect_fixed(44, 9, frame.area());
    frame.render_widget(Clear, popup_area);

    let title = match app.selected_tech() {
        Some(tech) => format!(" Rate {} ", truncate_name(&tech.name, 30)),
        None => " Rate ".to_string(),
    };
    let block = Block::bordered()
        .title(Span::styled(title, theme.popup_title))
        .border_style(Style::default().fg(theme.popup_border))
        .style(Style::default().bg(theme.popup_bg));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .split(inner);

    for (i, label) in FORM_LABELS.iter().enumerate() {
        let value = &app.form.values[i];
        let input = if i == app.form.focus {
            Span::styled(format!(" {:<2}| ", value), theme.input_focused)
        } else {
            Span::raw(format!(" {:<2}  ", value))
        };
        let line = Line::from(vec![Span::raw(format!("{:<17}", label)), input]);
        frame.render_widget(Paragraph::new(line), chunks[i]);
    }

    if let Some(err) = &app.form.error {
        let error = Paragraph::new(err.clone()).style(Style::default().fg(theme.flash_error));
        frame.render_widget(error, chunks[4]);
    }

    let help = Paragraph::new("1-10 each | Tab: next | Enter: save | Esc: cancel")
        .style(Style::default().fg(theme.muted));
    frame.render_widget(help, chunks[5]);
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

fn render_help_popup(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let popup_area = centered_rect_fixed(50, 15, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Keyboard Shortcuts ", theme.popup_title))
        .border_style(Style::default().fg(theme.popup_border))
        .style(Style::default().bg(theme.popup_bg));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(theme.status_key_color).bold();
    let entries = [
        ("j / Down", "Move down"),
        ("k / Up", "Move up"),
        ("Tab / h / l", "Switch pane"),
        ("Enter / a", "Rate selected technician"),
        ("L", "Next rating label"),
        ("r", "Reload ratings from disk"),
        ("?", "Show/hide this help"),
        ("q / Ctrl-c", "Quit"),
    ];

    let mut help_lines: Vec<Line> = entries
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("{:<14}", key), key_style),
                Span::raw(*action),
            ])
        })
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(theme.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}
