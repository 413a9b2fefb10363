//! Due-Date and Window Arithmetic
//!
//! Converts a stage's relative due-date policy into an absolute date,
//! and sizes an assignment's window from its template's recurrence
//! interval. Overdue/upcoming badges and reminder scheduling both hang
//! off these functions, so the rules are exact:
//!
//! - `on_interval` — the window start.
//! - `before_interval` — start minus the offset, always in weeks.
//! - `after_interval` — start plus the offset in weeks; with no offset,
//!   the window end when there is one, else the start.
//! - `custom` — start shifted by offset in the given unit (negative =
//!   before); missing offset or unit falls back to the start.

use chrono::{DateTime, Duration, Months, Utc};

use appraisal_types::{
    DueDateKind, DueDateRule, DueDateUnit, IntervalKind, IntervalUnit, RecurrenceInterval,
};

/// Calendar-month shift, clamping on the (unreachable in practice)
/// chrono range edges.
pub fn shift_months(date: DateTime<Utc>, months: i64) -> DateTime<Utc> {
    if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
            .unwrap_or(date)
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs() as u32))
            .unwrap_or(date)
    }
}

/// Absolute due date for a stage, or `None` when the stage carries no
/// due-date rule.
pub fn stage_due_date(
    rule: Option<&DueDateRule>,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    let rule = rule?;
    let due = match rule.kind {
        DueDateKind::OnInterval => start,
        DueDateKind::BeforeInterval => start - Duration::weeks(rule.offset.unwrap_or(0)),
        DueDateKind::AfterInterval => match rule.offset {
            Some(weeks) => start + Duration::weeks(weeks),
            None => end.unwrap_or(start),
        },
        DueDateKind::Custom => match (rule.offset, rule.unit) {
            (Some(offset), Some(unit)) => shift_by_unit(start, offset, unit),
            _ => start,
        },
    };
    Some(due)
}

fn shift_by_unit(date: DateTime<Utc>, offset: i64, unit: DueDateUnit) -> DateTime<Utc> {
    match unit {
        DueDateUnit::Days => date + Duration::days(offset),
        DueDateUnit::Weeks => date + Duration::weeks(offset),
        DueDateUnit::Months => shift_months(date, offset),
    }
}

/// End of the assignment window that starts at `start`, per the
/// template's recurrence interval. `None` when a custom interval is
/// missing its value or unit.
pub fn interval_end(
    start: DateTime<Utc>,
    interval: &RecurrenceInterval,
) -> Option<DateTime<Utc>> {
    let end = match interval.kind {
        IntervalKind::Daily => start + Duration::days(1),
        IntervalKind::Weekly => start + Duration::weeks(1),
        IntervalKind::Biweekly => start + Duration::days(14),
        IntervalKind::Monthly => shift_months(start, 1),
        IntervalKind::Quarterly => shift_months(start, 3),
        IntervalKind::Biannually => shift_months(start, 6),
        IntervalKind::Annually => shift_months(start, 12),
        IntervalKind::Custom => match (interval.value, interval.unit) {
            (Some(value), Some(unit)) => match unit {
                IntervalUnit::Days => start + Duration::days(value),
                IntervalUnit::Weeks => start + Duration::weeks(value),
                IntervalUnit::Months => shift_months(start, value),
                IntervalUnit::Years => shift_months(start, value.saturating_mul(12)),
            },
            _ => return None,
        },
    };
    Some(end)
}

/// Start date for the assignment at `index` in an employee's assigned
/// list: now, pushed back one month per position, so multiple cycles
/// assigned to the same employee do not all start simultaneously.
pub fn staggered_start(now: DateTime<Utc>, index: usize) -> DateTime<Utc> {
    shift_months(now, -(index as i64))
}
