use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::dates::parse_date;

/// Identity of a task, stored alongside it. `0` means not yet assigned.
pub type TaskId = u64;

/// Task priority. `yellow` from older data files is read as `Blue` and never written back.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Red,
    Blue,
    #[default]
    Green,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Red => "red",
            Priority::Blue => "blue",
            Priority::Green => "green",
        }
    }

    /// Human label shown next to the colour.
    pub fn label(self) -> &'static str {
        match self {
            Priority::Red => "Important",
            Priority::Blue => "Medium",
            Priority::Green => "Not urgent",
        }
    }

    /// Normalises a stored value. Unknown values fall back to the default.
    fn from_stored(value: &str) -> Priority {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(value, "unknown priority in data file, using green");
            Priority::default()
        })
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "red" => Ok(Priority::Red),
            "blue" | "yellow" => Ok(Priority::Blue),
            "green" => Ok(Priority::Green),
            other => Err(format!("unknown priority '{}'. Supported: red, blue, green.", other)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| Priority::from_stored(&s)).unwrap_or_default())
    }
}

/// How a task regenerates itself when completed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    pub fn label(recurrence: Option<Recurrence>) -> &'static str {
        match recurrence {
            None => "None",
            Some(Recurrence::Daily) => "Daily",
            Some(Recurrence::Weekly) => "Weekly",
            Some(Recurrence::Monthly) => "Monthly",
        }
    }

    /// Parses a recurrence option, where `none` (or an empty string) means no recurrence.
    pub fn parse_option(s: &str) -> Result<Option<Recurrence>, String> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(None),
            "daily" => Ok(Some(Recurrence::Daily)),
            "weekly" => Ok(Some(Recurrence::Weekly)),
            "monthly" => Ok(Some(Recurrence::Monthly)),
            other => Err(format!(
                "unknown recurrence '{}'. Supported: none, daily, weekly, monthly.",
                other
            )),
        }
    }
}

fn lenient_recurrence<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Recurrence>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        Recurrence::parse_option(&s).unwrap_or_else(|_| {
            tracing::warn!(value = %s, "unknown recurrence in data file, ignoring");
            None
        })
    }))
}

/// A single task, active or finished.
///
/// Which list holds the task decides whether it is active; `finished_date`
/// may linger on a reactivated task and says nothing about liveness.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub name: String,
    /// Due date as stored, normally `DD.MM.YYYY`.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub created_date: String,
    #[serde(default, deserialize_with = "lenient_recurrence")]
    pub recurrence: Option<Recurrence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_date: Option<String>,
    #[serde(default)]
    pub id: TaskId,
}

impl Task {
    pub fn due(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    pub fn finished_on(&self) -> Option<NaiveDate> {
        self.finished_date.as_deref().and_then(parse_date)
    }
}

/// The persisted document: `{ "active": [...], "finished": [...] }`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TaskState {
    #[serde(default)]
    pub active: Vec<Task>,
    #[serde(default)]
    pub finished: Vec<Task>,
}

/// User input for creating or editing a task, validated by the lifecycle operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub name: String,
    /// Due date as typed, must be `DD.MM.YYYY`.
    pub date: String,
    pub info: String,
    pub priority: Priority,
    pub recurrence: Option<Recurrence>,
}

impl TaskDraft {
    /// Draft pre-filled from an existing task, used as the base for edits.
    pub fn from_task(task: &Task) -> Self {
        TaskDraft {
            name: task.name.clone(),
            date: task.date.clone(),
            info: task.info.clone(),
            priority: task.priority,
            recurrence: task.recurrence,
        }
    }
}
