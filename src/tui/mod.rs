pub mod app;
pub mod events;
pub mod ui;

use std::time::{Duration, Instant};
use std::{error::Error, io};

use crossterm::{
    event::{KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::config::Config;
use crate::query::{ListKind, QuickRange};
use crate::storage::{JsonFile, Persistence, TaskStore};
use app::{App, InputField, InputMode};
use events::{EventPump, InputEvent};
use ui::ui;

const TICK: Duration = Duration::from_millis(250);

pub fn run_tui(config: &Config) -> Result<(), Box<dyn Error>> {
    let store = TaskStore::open(JsonFile::new(&config.db_path));
    let mut app = App::new(store, config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn run_app<B: Backend, P: Persistence>(terminal: &mut Terminal<B>, app: &mut App<P>) -> io::Result<()> {
    let events = EventPump::start();
    app.scheduler.start(Instant::now());

    while !app.should_quit {
        terminal.draw(|f| ui(f, app))?;

        match events.next(TICK) {
            Some(InputEvent::Key(key)) => handle_key(app, key),
            Some(InputEvent::Resize) | None => {}
        }
        app.on_tick(Instant::now());
    }
    Ok(())
}

pub fn handle_key<P: Persistence>(app: &mut App<P>, key: KeyEvent) {
    if app.popup.is_some() {
        app.dismiss_popup();
        return;
    }

    if app.minimized {
        match key.code {
            KeyCode::Char('o') | KeyCode::Enter => app.show(),
            KeyCode::Char('q') => app.quit(),
            _ => {}
        }
        return;
    }

    match app.input_mode {
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => app.quit(),
            KeyCode::Esc => app.minimize(),
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::Tab | KeyCode::Char('v') => app.toggle_view(),
            KeyCode::Char('a') => app.start_add(),
            KeyCode::Char(' ') => app.complete_selected(),
            KeyCode::Char('R') => app.reactivate_selected(),
            KeyCode::Char('n') => app.start_edit(InputField::Name),
            KeyCode::Char('t') => app.start_edit(InputField::Due), // 't' for Time/Date
            KeyCode::Char('i') => app.start_edit(InputField::Info),
            KeyCode::Char('p') if app.view == ListKind::Active => app.cycle_priority(),
            KeyCode::Char('r') if app.view == ListKind::Active => app.cycle_recurrence(),
            KeyCode::Char('f') => app.cycle_priority_filter(),
            KeyCode::Char('/') => app.start_filter(InputField::Search),
            KeyCode::Char('D') => app.start_filter(InputField::FromDate),
            KeyCode::Char('1') => app.set_quick_range(Some(QuickRange::Today)),
            KeyCode::Char('w') => app.set_quick_range(Some(QuickRange::ThisWeek)),
            KeyCode::Char('0') => app.set_quick_range(None),
            KeyCode::Char('s') => app.toggle_sort(),
            KeyCode::Char('x') => app.clear_filters(),
            _ => {}
        },
        InputMode::Editing | InputMode::Adding | InputMode::Filtering => match key.code {
            KeyCode::Enter => app.handle_input(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Char(c) => app.input_buffer.push(c),
            KeyCode::Backspace => {
                app.input_buffer.pop();
            }
            _ => {}
        },
    }
}
