use crate::app::{App, Control, FormField, FormState, ListMode};
use crate::filter::FilterKey;
use crate::storage::Storage;
use crate::task::TaskStatus;
use crate::validation::Field;
use crossterm::event::{self, Event};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;

pub fn run_app<B: Backend, S: Storage>(terminal: &mut Terminal<B>, app: &mut App<S>) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if app.handle_key(key) == Control::Quit {
                return Ok(());
            }
        }
    }
}

pub fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Todo => Color::Red,
        TaskStatus::InProgress => Color::Yellow,
        TaskStatus::Done => Color::Green,
    }
}

pub fn draw<S: Storage>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    let title = format!(" Task Manager  {}", app.route.path());
    f.render_widget(
        Paragraph::new(title).style(Style::default().fg(Color::White).bg(Color::DarkGray)),
        chunks[0],
    );

    match &app.form {
        Some(form) => draw_form(f, form, chunks[1]),
        None => draw_list(f, app, chunks[1]),
    }

    let status = match &app.status {
        Some(line) => Span::styled(
            line.text.clone(),
            Style::default().fg(if line.is_error { Color::Red } else { Color::Green }),
        ),
        None => Span::raw(format!("{} task(s)", app.store.len())),
    };
    f.render_widget(Paragraph::new(Line::from(status)), chunks[2]);
    f.render_widget(
        Paragraph::new(help_text(app)).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );

    if let ListMode::ConfirmDelete { title, .. } = &app.list_mode {
        draw_confirm(f, title, f.area());
    }
}

fn help_text<S: Storage>(app: &App<S>) -> &'static str {
    if app.form.is_some() {
        return "Tab/↑↓ field  ←→ status  Enter submit  Esc cancel";
    }
    match app.list_mode {
        ListMode::Browse => "a add  e edit  s/S status  d delete  / filter  c clear  q quit",
        ListMode::Filtering(_) => "Tab next filter  ←→ status  Esc done",
        ListMode::ConfirmDelete { .. } => "y confirm  n cancel",
    }
}

fn draw_list<S: Storage>(f: &mut Frame, app: &App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(3), Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let legend: Vec<Span> = TaskStatus::ALL
        .iter()
        .flat_map(|s| {
            vec![
                Span::styled("    ", Style::default().bg(status_color(*s))),
                Span::raw(format!(
                    " {} ({})   ",
                    s.label(),
                    app.store.get_tasks_by_status(*s).len()
                )),
            ]
        })
        .collect();
    f.render_widget(
        Paragraph::new(Line::from(legend)).block(Block::default().title("Legend").borders(Borders::ALL)),
        chunks[0],
    );

    draw_filters(f, app, chunks[1]);

    let tasks = app.visible_tasks();
    let block = Block::default().title("Task List").borders(Borders::ALL);
    if tasks.is_empty() {
        f.render_widget(
            Paragraph::new(app.filters.empty_message())
                .style(Style::default().fg(Color::Cyan))
                .block(block),
            chunks[2],
        );
        return;
    }

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|t| {
            let color = status_color(t.status);
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("[{}] ", t.status.label()), Style::default().fg(color)),
                    Span::styled(&t.title, Style::default().add_modifier(Modifier::BOLD)),
                ]),
                Line::from(Span::styled(format!("    {}", t.desc), Style::default().fg(Color::Gray))),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(list, chunks[2], &mut state);
}

fn draw_filters<S: Storage>(f: &mut Frame, app: &App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(25); 4])
        .split(area);

    let active = match app.list_mode {
        ListMode::Filtering(key) => Some(key),
        _ => None,
    };

    for (i, key) in FilterKey::ALL.iter().enumerate() {
        let value = match key {
            FilterKey::Title => app.filters.title.clone(),
            FilterKey::Desc => app.filters.desc.clone(),
            FilterKey::Both => app.filters.both.clone(),
            FilterKey::Status => app
                .filters
                .status
                .map(|s| s.label().to_string())
                .unwrap_or_default(),
        };
        let text = if value.is_empty() {
            Span::styled(key.placeholder(), Style::default().fg(Color::DarkGray))
        } else {
            Span::raw(value)
        };
        let border = if active == Some(*key) {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        f.render_widget(
            Paragraph::new(Line::from(text)).block(Block::default().borders(Borders::ALL).border_style(border)),
            chunks[i],
        );
    }
}

fn draw_form(f: &mut Frame, form: &FormState, area: Rect) {
    let outer = Block::default().title(form.heading()).borders(Borders::ALL);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    let field_block = |title: &'static str, field: FormField| {
        let style = if form.focus == field {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        Block::default().title(title).borders(Borders::ALL).border_style(style)
    };
    let error_line = |field: Field| {
        Paragraph::new(form.errors.get(field).unwrap_or_default()).style(Style::default().fg(Color::Red))
    };

    f.render_widget(
        Paragraph::new(form.form.title.as_str()).block(field_block("Title", FormField::Title)),
        chunks[0],
    );
    f.render_widget(error_line(Field::Title), chunks[1]);

    f.render_widget(
        Paragraph::new(form.form.desc.as_str())
            .wrap(Wrap { trim: false })
            .block(field_block("Description", FormField::Desc)),
        chunks[2],
    );
    f.render_widget(error_line(Field::Desc), chunks[3]);

    let allowed = form.mode.allowed_statuses();
    let options: Vec<Span> = TaskStatus::ALL
        .iter()
        .map(|s| {
            let selected = form.form.status == s.as_str();
            let mut style = Style::default().fg(status_color(*s));
            if !allowed.contains(s) {
                style = Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT);
            } else if selected {
                style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
            }
            Span::styled(format!(" {} ", s.label()), style)
        })
        .collect();
    f.render_widget(
        Paragraph::new(Line::from(options)).block(field_block("Status", FormField::Status)),
        chunks[4],
    );
    f.render_widget(error_line(Field::Status), chunks[5]);

    f.render_widget(
        Paragraph::new(form.submit_label()).block(field_block("", FormField::Submit)),
        chunks[6],
    );
}

fn draw_confirm(f: &mut Frame, title: &str, area: Rect) {
    let width = area.width.min(60);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + area.height.saturating_sub(5) / 2,
        width,
        height: 5.min(area.height),
    };
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(vec![
            Line::from(format!("Are you sure you want to delete \"{title}\"?")),
            Line::from(""),
            Line::from(Span::styled("[y] Yes   [n] No", Style::default().add_modifier(Modifier::BOLD))),
        ])
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Delete").borders(Borders::ALL).border_style(Style::default().fg(Color::Red))),
        popup,
    );
}
