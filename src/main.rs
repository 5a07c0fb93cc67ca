//! # Tasknote
//!
//! A small personal task and reminder manager for the terminal. Tasks carry a due
//! date, a colour priority and an optional recurrence; they live in an active list
//! until completed and can be set active again from the finished list.
//!
//! ## Usage
//!
//! Run without arguments to open the interactive UI:
//!
//! ```bash
//! tasknote
//! ```
//!
//! #### TUI Key Bindings
//!
//! *   `q`: Quit, `Esc`: hide to the indicator line (`o` reopens)
//! *   `Tab`: switch between Active and Finished tasks
//! *   `a`: Add a task, `Space`: complete, `R`: reactivate a finished task
//! *   `n` / `t` / `i`: edit name, due date, info; `p` / `r`: cycle priority, recurrence
//! *   `f`: cycle priority filter, `/`: search, `D`: from-date, `1` / `w` / `0`: today, this week, any
//! *   `s`: toggle sort order, `x`: clear filters
//!
//! A reminder popup lists overdue and due-today tasks shortly after startup and every
//! six hours after that.
//!
//! ### Command Line Interface (CLI)
//!
//! ```bash
//! tasknote add "Pay rent" --due 01.06.2025 --priority red --recur monthly
//! tasknote list --today
//! tasknote complete 3
//! tasknote finished --search rent
//! tasknote reactivate 7
//! ```
//!
//! ## Data Storage
//!
//! Tasks are saved as JSON in your local data directory
//! (`~/.local/share/tasknote/tasks.json` on Linux). Override it with the
//! `TASKNOTE_DB` environment variable or `--db`.

use std::io;
use std::path::PathBuf;

use chrono::Local;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use tasknote::commands::*;
use tasknote::config::Config;
use tasknote::error::TaskError;
use tasknote::models::{Priority, Recurrence, TaskDraft, TaskId};
use tasknote::query::QuickRange;
use tasknote::storage::{JsonFile, TaskStore};
use tasknote::tui::run_tui;

#[derive(Parser)]
#[command(name = "tasknote")]
#[command(about = "Personal task and reminder manager", long_about = None)]
struct Cli {
    /// Path to the tasks data file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task name (quoted if it has spaces)
        name: String,
        /// Due date in DD.MM.YYYY
        #[arg(short, long)]
        due: String,
        /// Free text notes
        #[arg(short, long, default_value = "")]
        info: String,
        /// Priority (red, blue, green)
        #[arg(short, long, default_value = "green")]
        priority: Priority,
        /// Recurrence (none, daily, weekly, monthly)
        #[arg(short, long, value_parser = parse_recur)]
        recur: Option<RecurArg>,
    },
    /// Edit an active task
    Edit {
        id: TaskId,
        /// New task name
        #[arg(short, long)]
        name: Option<String>,
        /// New due date (DD.MM.YYYY)
        #[arg(short, long)]
        due: Option<String>,
        /// New notes
        #[arg(short, long)]
        info: Option<String>,
        /// New priority
        #[arg(short, long)]
        priority: Option<Priority>,
        /// New recurrence (none clears it)
        #[arg(short, long, value_parser = parse_recur)]
        recur: Option<RecurArg>,
    },
    /// List active tasks
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Only overdue tasks
        #[arg(long)]
        overdue: bool,
        /// Only tasks due today
        #[arg(long, conflicts_with = "week")]
        today: bool,
        /// Only tasks due within the next seven days
        #[arg(long)]
        week: bool,
    },
    /// List finished tasks
    Finished {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show all details of a task
    Show {
        id: TaskId,
    },
    /// Mark a task as complete
    Complete {
        id: TaskId,
    },
    /// Set a finished task active again
    Reactivate {
        id: TaskId,
    },
    /// Print overdue and due-today tasks
    Remind,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        shell: Shell,
    },
    /// Open interactive TUI
    Ui,
}

/// `--recur` value; `none` is a real choice that clears the recurrence.
#[derive(Clone, Copy)]
struct RecurArg(Option<Recurrence>);

fn parse_recur(s: &str) -> Result<RecurArg, String> {
    Recurrence::parse_option(s).map(RecurArg)
}

#[derive(Args)]
struct FilterArgs {
    /// Only this priority (red, blue, green)
    #[arg(short, long)]
    priority: Option<Priority>,
    /// Only tasks dated on or after this date (DD.MM.YYYY or YYYY-MM-DD)
    #[arg(short, long)]
    from: Option<String>,
    /// Case-insensitive name search
    #[arg(short, long)]
    search: Option<String>,
    /// Latest first
    #[arg(long)]
    desc: bool,
}

impl FilterArgs {
    fn into_options(self) -> ListOptions {
        ListOptions {
            priority: self.priority,
            from: self.from,
            search: self.search,
            descending: self.desc,
            ..ListOptions::default()
        }
    }
}

fn init_logging(config: &Config, tui: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tasknote=warn"));
    if tui {
        // Keep log output off the alternate screen.
        if let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(config.log_path()) {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}

fn run(cli: Cli, config: &Config) -> Result<(), TaskError> {
    let mut store = TaskStore::open(JsonFile::new(&config.db_path));
    let today = Local::now().date_naive();
    match cli.command {
        Some(Commands::Add { name, due, info, priority, recur }) => {
            let draft = TaskDraft {
                name,
                date: due,
                info,
                priority,
                recurrence: recur.and_then(|r| r.0),
            };
            cmd_add(&mut store, draft, today).map(|_| ())
        }
        Some(Commands::Edit { id, name, due, info, priority, recur }) => {
            cmd_edit(&mut store, id, EditOptions { name, due, info, priority, recurrence: recur.map(|r| r.0) })
        }
        Some(Commands::List { filter, overdue, today: only_today, week }) => {
            let quick_range = if only_today {
                Some(QuickRange::Today)
            } else if week {
                Some(QuickRange::ThisWeek)
            } else {
                None
            };
            let options = ListOptions { overdue, quick_range, ..filter.into_options() };
            cmd_list(&store, &options, today);
            Ok(())
        }
        Some(Commands::Finished { filter }) => {
            cmd_finished(&store, &filter.into_options(), today);
            Ok(())
        }
        Some(Commands::Show { id }) => cmd_show(&store, id, today),
        Some(Commands::Complete { id }) => cmd_complete(&mut store, id, today).map(|_| ()),
        Some(Commands::Reactivate { id }) => cmd_reactivate(&mut store, id),
        Some(Commands::Remind) => {
            cmd_remind(&store, today);
            Ok(())
        }
        Some(Commands::Completions { .. }) | Some(Commands::Ui) | None => Ok(()),
    }
}

fn main() {
    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(db) = cli.db.clone() {
        config = config.with_db_path(db);
    }

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "tasknote", &mut io::stdout());
        }
        Some(Commands::Ui) | None => {
            init_logging(&config, true);
            if let Err(e) = run_tui(&config) {
                eprintln!("Error running TUI: {}", e);
                std::process::exit(1);
            }
        }
        Some(_) => {
            init_logging(&config, false);
            if let Err(e) = run(cli, &config) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
