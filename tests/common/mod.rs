#![allow(dead_code)]

use chrono::NaiveDate;
use tasknote::models::{Priority, Recurrence, Task, TaskDraft};

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn task(name: &str, date: &str, priority: Priority) -> Task {
    Task {
        id: 0,
        name: name.into(),
        date: date.into(),
        info: String::new(),
        priority,
        created_date: "01.01.2024".into(),
        recurrence: None,
        finished_date: None,
    }
}

pub fn finished(name: &str, finished_on: Option<&str>) -> Task {
    Task {
        finished_date: finished_on.map(String::from),
        ..task(name, "01.01.2024", Priority::Green)
    }
}

pub fn draft(name: &str, date: &str) -> TaskDraft {
    TaskDraft {
        name: name.into(),
        date: date.into(),
        ..TaskDraft::default()
    }
}

pub fn recurring(name: &str, date: &str, recurrence: Recurrence) -> TaskDraft {
    TaskDraft {
        recurrence: Some(recurrence),
        ..draft(name, date)
    }
}
