//! Periodic due-date reminders.
//!
//! The scheduler never owns a thread. The host loop calls [`ReminderScheduler::tick`]
//! with the current instant and the scheduler decides whether a check is due.

use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::config::Config;
use crate::models::Task;

pub const REMINDER_TITLE: &str = "Reminder – due tasks";

/// Receives the preformatted reminder text.
pub trait Notifier {
    fn notify(&mut self, title: &str, message: &str);
}

/// Prints reminders to stdout.
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&mut self, title: &str, message: &str) {
        println!("{}\n\n{}", title, message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderEntry {
    pub name: String,
    pub date: String,
}

impl ReminderEntry {
    fn from_task(task: &Task) -> Self {
        ReminderEntry {
            name: task.name.clone(),
            date: task.date.clone(),
        }
    }
}

/// Active tasks that need attention, split by urgency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReminderDigest {
    pub overdue: Vec<ReminderEntry>,
    pub due_today: Vec<ReminderEntry>,
}

impl ReminderDigest {
    /// Partitions active tasks into overdue and due today. Tasks without a parseable date are skipped.
    pub fn scan(active: &[Task], today: NaiveDate) -> Self {
        let mut digest = ReminderDigest::default();
        for task in active {
            match task.due() {
                Some(d) if d < today => digest.overdue.push(ReminderEntry::from_task(task)),
                Some(d) if d == today => digest.due_today.push(ReminderEntry::from_task(task)),
                _ => {}
            }
        }
        digest
    }

    pub fn is_empty(&self) -> bool {
        self.overdue.is_empty() && self.due_today.is_empty()
    }

    /// Multi-line message, overdue section first.
    pub fn message(&self) -> String {
        let line = |e: &ReminderEntry| format!("- {} (Due: {})", e.name, e.date);
        let mut lines = Vec::new();
        if !self.overdue.is_empty() {
            lines.push("⚠ Overdue:".to_string());
            lines.extend(self.overdue.iter().map(line));
            lines.push(String::new());
        }
        if !self.due_today.is_empty() {
            lines.push("⭐ Due today:".to_string());
            lines.extend(self.due_today.iter().map(line));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Scheduled { deadline: Instant },
}

/// Two-state timer: idle, or scheduled with a single pending deadline.
#[derive(Debug, Clone)]
pub struct ReminderScheduler {
    state: SchedulerState,
    delay: Duration,
    interval: Duration,
}

impl ReminderScheduler {
    pub fn new(delay: Duration, interval: Duration) -> Self {
        ReminderScheduler {
            state: SchedulerState::Idle,
            delay,
            interval,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        ReminderScheduler::new(config.reminder_delay, config.reminder_interval)
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Arms the first check, `delay` after `now`. Does nothing if already scheduled.
    pub fn start(&mut self, now: Instant) {
        if self.state == SchedulerState::Idle {
            self.arm(now, self.delay);
        }
    }

    /// Stops scheduling further checks.
    pub fn cancel(&mut self) {
        self.state = SchedulerState::Idle;
    }

    /// Runs a check if the deadline has passed.
    ///
    /// After every check the next one is armed `interval` later, whether or not
    /// anything was found. Returns the digest only when it is non-empty.
    pub fn poll(&mut self, now: Instant, active: &[Task], today: NaiveDate) -> Option<ReminderDigest> {
        let SchedulerState::Scheduled { deadline } = self.state else {
            return None;
        };
        if now < deadline {
            return None;
        }
        self.arm(now, self.interval);
        let digest = ReminderDigest::scan(active, today);
        tracing::debug!(
            overdue = digest.overdue.len(),
            due_today = digest.due_today.len(),
            "reminder check"
        );
        (!digest.is_empty()).then_some(digest)
    }

    /// Schedules the next check `after` from `now`. A deadline past the clock's range leaves the scheduler idle.
    fn arm(&mut self, now: Instant, after: Duration) {
        self.state = match now.checked_add(after) {
            Some(deadline) => SchedulerState::Scheduled { deadline },
            None => {
                tracing::warn!(?after, "reminder deadline out of range, no further checks");
                SchedulerState::Idle
            }
        };
    }

    /// [`poll`](Self::poll), forwarding a non-empty digest to `notifier`. Returns whether it notified.
    pub fn tick(
        &mut self,
        now: Instant,
        active: &[Task],
        today: NaiveDate,
        notifier: &mut dyn Notifier,
    ) -> bool {
        match self.poll(now, active, today) {
            Some(digest) => {
                notifier.notify(REMINDER_TITLE, &digest.message());
                true
            }
            None => false,
        }
    }
}
