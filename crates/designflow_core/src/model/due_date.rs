//! Due-date display classification.
//!
//! Pure function of `(due_date, now)`. Day differences are counted in UTC
//! calendar days, so a due date later today is `Today` regardless of hour.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Human label for a due date relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDateLabel {
    Overdue,
    Today,
    Tomorrow,
    DayAfterTomorrow,
    /// Three to five days out.
    DaysLeft(i64),
    /// Further out than five days.
    Date(NaiveDate),
}

impl Display for DueDateLabel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overdue => write!(f, "overdue"),
            Self::Today => write!(f, "today"),
            Self::Tomorrow => write!(f, "tomorrow"),
            Self::DayAfterTomorrow => write!(f, "day after tomorrow"),
            Self::DaysLeft(days) => write!(f, "{days} days left"),
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

/// Display color bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DueDateTone {
    Red,
    Orange,
    Yellow,
    Green,
}

/// Classification result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueDateStatus {
    /// Calendar days from today to the due date; negative when overdue.
    pub diff_days: i64,
    pub label: DueDateLabel,
    pub tone: DueDateTone,
}

/// Classifies `due_ms` against `now_ms`.
///
/// Returns `None` when either timestamp is outside chrono's range.
pub fn classify_due_date(due_ms: i64, now_ms: i64) -> Option<DueDateStatus> {
    let due = DateTime::<Utc>::from_timestamp_millis(due_ms)?.date_naive();
    let today = DateTime::<Utc>::from_timestamp_millis(now_ms)?.date_naive();
    let diff_days = due.signed_duration_since(today).num_days();

    let label = match diff_days {
        d if d < 0 => DueDateLabel::Overdue,
        0 => DueDateLabel::Today,
        1 => DueDateLabel::Tomorrow,
        2 => DueDateLabel::DayAfterTomorrow,
        3..=5 => DueDateLabel::DaysLeft(diff_days),
        _ => DueDateLabel::Date(due),
    };
    let tone = match diff_days {
        d if d < 0 => DueDateTone::Red,
        0..=2 => DueDateTone::Orange,
        3..=5 => DueDateTone::Yellow,
        _ => DueDateTone::Green,
    };

    Some(DueDateStatus {
        diff_days,
        label,
        tone,
    })
}

#[cfg(test)]
mod tests {
    use super::{classify_due_date, DueDateLabel, DueDateTone};
    use crate::model::MS_PER_DAY;

    // 2024-03-10T09:00:00Z
    const NOW: i64 = 1_710_061_200_000;

    fn classify_in(days: i64) -> (DueDateLabel, DueDateTone) {
        let status = classify_due_date(NOW + days * MS_PER_DAY, NOW).unwrap();
        (status.label, status.tone)
    }

    #[test]
    fn labels_follow_day_difference() {
        assert_eq!(classify_in(-1), (DueDateLabel::Overdue, DueDateTone::Red));
        assert_eq!(classify_in(0), (DueDateLabel::Today, DueDateTone::Orange));
        assert_eq!(classify_in(1), (DueDateLabel::Tomorrow, DueDateTone::Orange));
        assert_eq!(
            classify_in(2),
            (DueDateLabel::DayAfterTomorrow, DueDateTone::Orange)
        );
        assert_eq!(classify_in(4), (DueDateLabel::DaysLeft(4), DueDateTone::Yellow));
        assert_eq!(classify_in(5), (DueDateLabel::DaysLeft(5), DueDateTone::Yellow));
        assert_eq!(classify_in(6).1, DueDateTone::Green);
    }

    #[test]
    fn far_dates_render_literally() {
        let status = classify_due_date(NOW + 10 * MS_PER_DAY, NOW).unwrap();
        assert_eq!(status.label.to_string(), "2024-03-20");
        assert_eq!(status.diff_days, 10);
    }

    #[test]
    fn same_calendar_day_counts_as_today() {
        // Earlier on the same UTC day is still today, not overdue.
        let status = classify_due_date(NOW - 60 * 60 * 1000, NOW).unwrap();
        assert_eq!(status.label, DueDateLabel::Today);
        assert_eq!(DueDateLabel::DaysLeft(3).to_string(), "3 days left");
    }
}
