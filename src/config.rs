use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "tasknote";
const DB_FILE: &str = "tasks.json";
const LOG_FILE: &str = "tasknote.log";
const DEFAULT_REMIND_HOURS: u64 = 6;
const MAX_REMIND_HOURS: u64 = 24 * 366;
const INITIAL_REMINDER_DELAY: Duration = Duration::from_millis(800);

/// Runtime settings, resolved from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the tasks data file.
    pub db_path: PathBuf,
    /// Delay before the first reminder check after startup.
    pub reminder_delay: Duration,
    /// Interval between reminder checks.
    pub reminder_interval: Duration,
}

impl Config {
    /// Builds the configuration.
    ///
    /// The data path is determined in the following order:
    /// 1. `TASKNOTE_DB` environment variable.
    /// 2. `~/.local/share/tasknote/tasks.json` (on Linux).
    /// 3. `./tasks.json` (fallback).
    ///
    /// `TASKNOTE_REMIND_HOURS` overrides the reminder interval.
    pub fn from_env() -> Config {
        let db_path = std::env::var("TASKNOTE_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_db_path());
        let hours = std::env::var("TASKNOTE_REMIND_HOURS").ok();
        Config {
            db_path,
            reminder_delay: INITIAL_REMINDER_DELAY,
            reminder_interval: reminder_interval(hours.as_deref()),
        }
    }

    pub fn with_db_path(mut self, path: PathBuf) -> Config {
        self.db_path = path;
        self
    }

    /// Log file used while the TUI owns the terminal. Lives next to the data file.
    pub fn log_path(&self) -> PathBuf {
        let mut p = self.db_path.clone();
        p.set_file_name(LOG_FILE);
        p
    }
}

/// Interval for a `TASKNOTE_REMIND_HOURS` value. Values above a year are capped;
/// missing, zero or unreadable values give the default.
pub fn reminder_interval(raw: Option<&str>) -> Duration {
    let hours = match raw.map(|h| h.trim().parse::<u64>()) {
        None => DEFAULT_REMIND_HOURS,
        Some(Ok(h)) if h > 0 => h,
        Some(_) => {
            tracing::warn!(value = raw.unwrap_or_default(), "invalid TASKNOTE_REMIND_HOURS, using default");
            DEFAULT_REMIND_HOURS
        }
    };
    if hours > MAX_REMIND_HOURS {
        tracing::warn!(hours, max = MAX_REMIND_HOURS, "TASKNOTE_REMIND_HOURS too large, capping");
    }
    Duration::from_secs(hours.min(MAX_REMIND_HOURS) * 60 * 60)
}

fn default_db_path() -> PathBuf {
    match dirs::data_local_dir() {
        Some(mut p) => {
            p.push(APP_DIR);
            if !p.exists() {
                if let Err(e) = fs::create_dir_all(&p) {
                    tracing::warn!(path = %p.display(), error = %e, "could not create data directory");
                }
            }
            p.push(DB_FILE);
            p
        }
        None => PathBuf::from(DB_FILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reminder_interval_defaults() {
        let six = Duration::from_secs(6 * 60 * 60);
        assert_eq!(reminder_interval(None), six);
        assert_eq!(reminder_interval(Some("0")), six);
        assert_eq!(reminder_interval(Some("often")), six);
        assert_eq!(reminder_interval(Some(" 2 ")), Duration::from_secs(2 * 60 * 60));
    }

    #[test]
    fn test_reminder_interval_is_capped() {
        let cap = Duration::from_secs(MAX_REMIND_HOURS * 60 * 60);
        assert_eq!(reminder_interval(Some("5000000000000000")), cap);
        assert_eq!(reminder_interval(Some(&u64::MAX.to_string())), cap);
    }
}
