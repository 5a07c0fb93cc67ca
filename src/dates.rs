use chrono::{Duration, Months, NaiveDate};

use crate::models::Recurrence;

/// Canonical on-disk date format (`DD.MM.YYYY`).
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Alternate format accepted when reading (`YYYY-MM-DD`).
pub const ISO_FORMAT: &str = "%Y-%m-%d";

/// Parses a date in `DD.MM.YYYY` or `YYYY-MM-DD`, in that order.
///
/// Returns `None` when neither format matches; callers decide whether that is fatal.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    [DATE_FORMAT, ISO_FORMAT]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

/// Parses a due date typed into a create/edit form. Only `DD.MM.YYYY` is accepted here.
pub fn parse_entry_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Adds `months` calendar months, clamping the day to the end of the target month.
///
/// `None` only when the result falls outside chrono's representable range.
pub fn add_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    }
}

/// Due date of the successor generated when a recurring task is completed.
pub fn next_due_date(due: NaiveDate, recurrence: Recurrence) -> Option<NaiveDate> {
    match recurrence {
        Recurrence::Daily => due.checked_add_signed(Duration::days(1)),
        Recurrence::Weekly => due.checked_add_signed(Duration::weeks(1)),
        Recurrence::Monthly => add_months(due, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_both_formats() {
        assert_eq!(parse_date("10.05.2024"), Some(ymd(2024, 5, 10)));
        assert_eq!(parse_date("2024-05-10"), Some(ymd(2024, 5, 10)));
        assert_eq!(parse_date(" 1.2.2024 "), Some(ymd(2024, 2, 1)));
    }

    #[test]
    fn rejects_garbage_softly() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("tomorrow"), None);
        assert_eq!(parse_date("31.02.2024"), None);
    }

    #[test]
    fn entry_date_only_accepts_dotted_form() {
        assert_eq!(parse_entry_date("10.05.2024"), Some(ymd(2024, 5, 10)));
        assert_eq!(parse_entry_date("2024-05-10"), None);
    }

    #[test]
    fn add_months_clamps_end_of_month() {
        assert_eq!(add_months(ymd(2023, 1, 31), 1), Some(ymd(2023, 2, 28)));
        assert_eq!(add_months(ymd(2024, 1, 31), 1), Some(ymd(2024, 2, 29)));
        assert_eq!(add_months(ymd(2024, 3, 31), 1), Some(ymd(2024, 4, 30)));
        assert_eq!(add_months(ymd(2024, 12, 15), 1), Some(ymd(2025, 1, 15)));
    }

    #[test]
    fn add_twelve_months_is_one_year() {
        assert_eq!(add_months(ymd(2023, 6, 9), 12), Some(ymd(2024, 6, 9)));
        assert_eq!(add_months(ymd(2024, 2, 29), 12), Some(ymd(2025, 2, 28)));
    }

    #[test]
    fn negative_months_go_backwards() {
        assert_eq!(add_months(ymd(2024, 3, 31), -1), Some(ymd(2024, 2, 29)));
    }

    #[test]
    fn successor_dates() {
        let due = ymd(2024, 5, 10);
        assert_eq!(next_due_date(due, Recurrence::Daily), Some(ymd(2024, 5, 11)));
        assert_eq!(next_due_date(due, Recurrence::Weekly), Some(ymd(2024, 5, 17)));
        assert_eq!(next_due_date(ymd(2024, 1, 31), Recurrence::Monthly), Some(ymd(2024, 2, 29)));
    }
}
