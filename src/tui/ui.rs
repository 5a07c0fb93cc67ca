use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};

use crate::models::{Priority, Recurrence};
use crate::query::{is_overdue, ListKind, QuickRange, SortOrder};
use crate::storage::Persistence;
use crate::tui::app::{App, InputField, InputMode};

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Red => Color::Rgb(0xff, 0x40, 0x40),
        Priority::Blue => Color::Rgb(0x01, 0xb3, 0xfa),
        Priority::Green => Color::Rgb(0x28, 0xa7, 0x45),
    }
}

const OVERDUE_COLOR: Color = Color::Rgb(0xff, 0x00, 0x00);

pub fn ui<P: Persistence>(f: &mut Frame, app: &mut App<P>) {
    if app.minimized {
        indicator(f, app);
        render_popup(f, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Length(3), // Filters
            Constraint::Min(0),    // Table
            Constraint::Length(6), // Details
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    let selected_tab = match app.view {
        ListKind::Active => 0,
        ListKind::Finished => 1,
    };
    let tabs = Tabs::new(vec![
        format!("Active Tasks ({})", app.store.active().len()),
        format!("Finished Tasks ({})", app.store.finished().len()),
    ])
    .select(selected_tab)
    .block(Block::default().borders(Borders::ALL).title("Tasknote"))
    .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[0]);

    f.render_widget(filter_bar(app), chunks[1]);

    let today = app.today();
    let (header, widths, rows): (Vec<&str>, Vec<Constraint>, Vec<Row>) = match app.view {
        ListKind::Active => {
            let rows = app
                .rows()
                .into_iter()
                .map(|t| {
                    let overdue = is_overdue(t, today);
                    let color = if overdue { OVERDUE_COLOR } else { priority_color(t.priority) };
                    let marker = if overdue { "⚠ ●" } else { "●" };
                    Row::new(vec![
                        Cell::from(format!("{} {}", marker, t.name)),
                        Cell::from(t.date.clone()),
                        Cell::from(Recurrence::label(t.recurrence)),
                    ])
                    .style(Style::default().fg(color))
                })
                .collect();
            (
                vec!["Name", "Due", "Recurs"],
                vec![Constraint::Min(20), Constraint::Length(12), Constraint::Length(8)],
                rows,
            )
        }
        ListKind::Finished => {
            let rows = app
                .rows()
                .into_iter()
                .map(|t| {
                    Row::new(vec![
                        Cell::from(format!("↩ ● {}", t.name)),
                        Cell::from(t.date.clone()),
                        Cell::from(t.finished_date.clone().unwrap_or_else(|| "?".into())),
                    ])
                    .style(Style::default().fg(priority_color(t.priority)))
                })
                .collect();
            (
                vec!["Name", "Due", "Finished"],
                vec![Constraint::Min(20), Constraint::Length(12), Constraint::Length(12)],
                rows,
            )
        }
    };

    let table = Table::new(rows, widths)
        .header(Row::new(header)
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol(">> ");
    f.render_stateful_widget(table, chunks[2], &mut app.state);

    f.render_widget(details(app), chunks[3]);

    let help_text = match app.input_mode {
        InputMode::Normal => match app.view {
            ListKind::Active => "q: Quit | Esc: Hide | Tab: Finished | a: Add | Space: Complete | n/t/i: Edit Name/Due/Info | p: Prio | r: Recur | f: Filter | /: Search | D: From | 1: Today | w: Week | 0: No Range | s: Sort | x: Clear",
            ListKind::Finished => "q: Quit | Esc: Hide | Tab: Active | R: Reactivate | f: Filter | /: Search | D: From | s: Sort | x: Clear",
        },
        InputMode::Editing | InputMode::Filtering => "Enter: Save | Esc: Cancel",
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
    };
    let mut help_lines = vec![Line::from(Span::styled(help_text, Style::default().fg(Color::Gray)))];
    if let Some(status) = &app.status {
        help_lines.insert(0, Line::from(Span::styled(status.as_str(), Style::default().fg(Color::Yellow))));
    }
    let help = Paragraph::new(help_lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[4]);

    if app.input_mode != InputMode::Normal {
        let area = centered_rect(60, 3, f.area());
        f.render_widget(Clear, area);
        let input = Paragraph::new(app.input_buffer.as_str())
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title(input_title(app)));
        f.render_widget(input, area);
    }

    render_popup(f, app);
}

fn filter_bar<P: Persistence>(app: &App<P>) -> Paragraph<'static> {
    let form = app.filter_form();
    let mut parts = vec![format!("Priority: {}", form.priority.label())];
    if !form.from_text.is_empty() {
        parts.push(format!("From: {}", form.from_text));
    }
    if app.view == ListKind::Active {
        parts.push(match form.quick_range {
            None => "Range: any".to_string(),
            Some(QuickRange::Today) => "Range: today".to_string(),
            Some(QuickRange::ThisWeek) => "Range: this week".to_string(),
        });
    }
    if !form.search.is_empty() {
        parts.push(format!("Search: {}", form.search));
    }
    parts.push(match form.order {
        SortOrder::Ascending => "Date ascending (earliest first)".to_string(),
        SortOrder::Descending => "Date descending (latest first)".to_string(),
    });
    Paragraph::new(parts.join(" | "))
        .block(Block::default().borders(Borders::ALL).title("Filter / Sorting"))
}

fn details<P: Persistence>(app: &App<P>) -> Paragraph<'static> {
    let block = Block::default().borders(Borders::ALL).title("Details");
    let Some(t) = app.selected_task() else {
        return Paragraph::new("").block(block);
    };
    let today = app.today();
    let due_style = if app.view == ListKind::Active && is_overdue(t, today) {
        Style::default().fg(OVERDUE_COLOR)
    } else {
        Style::default()
    };
    let created = if t.created_date.is_empty() { "?" } else { t.created_date.as_str() };
    let extra = match app.view {
        ListKind::Active => format!("Created: {} | Recurrence: {}", created, Recurrence::label(t.recurrence)),
        ListKind::Finished => format!(
            "Created: {} | Finished: {} | Recurrence: {}",
            created,
            t.finished_date.as_deref().unwrap_or("?"),
            Recurrence::label(t.recurrence)
        ),
    };
    let lines = vec![
        Line::from(Span::styled(
            format!("{} [{}]", t.name, t.priority.label()),
            Style::default().fg(priority_color(t.priority)).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(format!("Due: {}", t.date), due_style)),
        Line::from(t.info.clone()),
        Line::from(extra),
    ];
    Paragraph::new(lines).wrap(Wrap { trim: true }).block(block)
}

fn input_title<P: Persistence>(app: &App<P>) -> &'static str {
    match app.input_mode {
        InputMode::Adding => match app.add_state.step {
            0 => "Add Task: Enter Name",
            1 => "Add Task: Enter Due Date (DD.MM.YYYY)",
            2 => "Add Task: Enter Info (Optional)",
            3 => "Add Task: Enter Priority (red/blue/green, default green)",
            4 => "Add Task: Enter Recurrence (none/daily/weekly/monthly)",
            _ => "Add Task",
        },
        InputMode::Editing => match app.input_field {
            InputField::Name => "Edit Name",
            InputField::Due => "Edit Due Date (DD.MM.YYYY)",
            InputField::Info => "Edit Info",
            _ => "Edit",
        },
        InputMode::Filtering => match app.input_field {
            InputField::Search => "Search (name)",
            InputField::FromDate => "From date (DD.MM.YYYY)",
            _ => "Filter",
        },
        InputMode::Normal => "",
    }
}

/// One-line stand-in for the hidden window, with due counts.
fn indicator<P: Persistence>(f: &mut Frame, app: &App<P>) {
    let today = app.today();
    let overdue = app.store.active().iter().filter(|t| is_overdue(t, today)).count();
    let due_today = app.store.active().iter().filter(|t| t.due() == Some(today)).count();
    let text = format!(
        "Tasknote: {} active, {} overdue, {} due today | o: Open | q: Quit",
        app.store.active().len(),
        overdue,
        due_today
    );
    let area = Rect { height: f.area().height.min(3), ..f.area() };
    f.render_widget(
        Paragraph::new(text).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_popup<P: Persistence>(f: &mut Frame, app: &App<P>) {
    let Some(popup) = &app.popup else { return; };
    let height = (popup.message.lines().count() as u16 + 3).min(f.area().height);
    let area = centered_rect(70, height, f.area());
    f.render_widget(Clear, area);
    let mut lines: Vec<Line> = popup.message.lines().map(|l| Line::from(l.to_string())).collect();
    lines.push(Line::from(Span::styled("Press any key to dismiss", Style::default().fg(Color::Gray))));
    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(popup.title.clone()));
    f.render_widget(widget, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let height = height.min(r.height);
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((r.height - height) / 2),
            Constraint::Length(height),
            Constraint::Length((r.height - height) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
