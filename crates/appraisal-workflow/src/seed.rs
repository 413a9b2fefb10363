//! Synthetic Completion History
//!
//! Fabricates plausible state for completed stages so a freshly
//! initialized store looks lived-in: completion dates spread across the
//! assignment window, completion attribution, and canned form answers.
//! Everything draws from the caller's RNG; nothing here is a business
//! rule.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use appraisal_types::{Employee, EvaluationForm, FieldType, FormValue, ReviewStage};

/// Completion date for surviving stage `index` of `count`: linearly
/// spread across `[start, end]`, or 1-day increments from the start
/// when the window is open-ended.
pub fn completion_date(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    index: usize,
    count: usize,
) -> DateTime<Utc> {
    match end {
        Some(end) if end > start && count > 0 => {
            let step = (end - start) / (count as i32 + 1);
            start + step * (index as i32 + 1)
        }
        _ => start + Duration::days(index as i64 + 1),
    }
}

/// Who gets credited with the completion.
///
/// The employee when they attend the stage; otherwise the internal
/// manager at the stage's first manager-level attendee (falling back to
/// the legacy `manager_level` field). Attribution resolves against the
/// employee's default chain; assignment-level overrides only affect
/// display-time resolution, not seeded history.
pub fn completed_by(stage: &ReviewStage, employee: &Employee) -> Option<String> {
    if stage.includes_employee() {
        return Some(employee.id.clone());
    }
    let level = stage
        .manager_level_attendees()
        .next()
        .or(stage.manager_level)?;
    employee
        .manager_at_level(level)
        .and_then(|slot| slot.employee_id.clone())
}

/// Canned answers for every field of a form.
///
/// Ratings land at 3–4 for self-evaluations and 3–5 for manager
/// evaluations; free-text fields get a paragraph keyed off the field
/// label; checkboxes pick 2–4 options.
pub fn synthetic_form_data(
    form: &EvaluationForm,
    self_evaluation: bool,
    rng: &mut impl Rng,
) -> BTreeMap<String, FormValue> {
    form.fields
        .iter()
        .map(|field| (field.id.clone(), synthetic_value(field, self_evaluation, rng)))
        .collect()
}

fn synthetic_value(
    field: &appraisal_types::FormField,
    self_evaluation: bool,
    rng: &mut impl Rng,
) -> FormValue {
    match field.field_type {
        FieldType::Rating => {
            let high = if self_evaluation { 4 } else { 5 };
            FormValue::Number(rng.gen_range(3..=high) as f64)
        }
        FieldType::Text | FieldType::Textarea => FormValue::Text(paragraph_for(&field.label)),
        FieldType::Checkbox => {
            let want = rng.gen_range(2..=4usize).min(field.options.len());
            let picks = field
                .options
                .choose_multiple(rng, want)
                .cloned()
                .collect::<Vec<_>>();
            FormValue::Selections(picks)
        }
        _ => FormValue::Text("Response".into()),
    }
}

fn paragraph_for(label: &str) -> String {
    let label = label.to_lowercase();
    let text = if label.contains("achievement") {
        "Delivered the migration ahead of schedule and picked up two incident \
         reviews outside my own area. The cross-team rollout went out with no \
         customer-visible downtime."
    } else if label.contains("challenge") {
        "Scope shifted twice mid-cycle, which made it hard to keep the original \
         timeline. Coordinating handoffs across time zones remains the biggest \
         source of friction."
    } else if label.contains("improvement") || label.contains("development") {
        "I want to get better at delegating earlier instead of absorbing \
         overflow work myself, and to spend more time on design review before \
         implementation starts."
    } else if label.contains("goal") {
        "Lead the next platform upgrade end to end, and mentor one junior \
         colleague through their first on-call rotation."
    } else if label.contains("feedback") {
        "Communication in the weekly syncs has been clear and the written \
         summaries make it easy to follow decisions. More advance notice on \
         priority changes would help."
    } else {
        "Response"
    };
    text.to_string()
}
