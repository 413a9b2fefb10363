//! Workflow Assignment Generation
//!
//! The central state-construction routine: for every employee × assigned
//! template it filters the template's stages by the employee's role,
//! computes the assignment window from the recurrence interval, seeds
//! completion state, and determines the active stage and lifecycle
//! status.
//!
//! Re-running generation fully replaces the assignment list; with the
//! same inputs, clock, and RNG seed the output is identical.
//!
//! Lookup failures follow the skip-don't-throw policy: an unknown
//! template id drops that (employee, template) pair with a warning, and
//! an unknown form id just leaves the stage without seeded answers.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, warn};

use appraisal_types::{
    AssignmentStatus, Employee, EmployeeStatus, EvaluationForm, StageCompletion,
    WorkflowAssignment, WorkflowTemplate,
};

use crate::{roles, schedule, seed};

// Demo-data flavor, not business rules: how often seeded history lands
// in each state.
pub const P_COMPLETED_WHEN_WINDOW_ELAPSED: f64 = 0.7;
pub const P_IN_PROGRESS_WHEN_STARTED: f64 = 0.8;
pub const P_STAGE_COMPLETED: f64 = 0.7;

/// Generate the full assignment list for a roster.
pub fn generate_assignments(
    employees: &[Employee],
    templates: &[WorkflowTemplate],
    forms: &[EvaluationForm],
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Vec<WorkflowAssignment> {
    let mut assignments = Vec::new();

    for employee in employees {
        for (index, workflow_id) in employee.assigned_workflow_ids.iter().enumerate() {
            let Some(template) = templates.iter().find(|t| t.id == *workflow_id) else {
                warn!(
                    employee = %employee.id,
                    template = %workflow_id,
                    "skipping assignment referencing unknown template"
                );
                continue;
            };

            if let Some(assignment) =
                generate_assignment(employee, index, template, forms, employees, now, rng)
            {
                assignments.push(assignment);
            }
        }
    }

    assignments
}

/// Generate one assignment for one (employee, template) pair.
///
/// Returns `None` when role filtering leaves no applicable stages — the
/// pair is skipped entirely rather than producing an empty assignment.
pub fn generate_assignment(
    employee: &Employee,
    index: usize,
    template: &WorkflowTemplate,
    forms: &[EvaluationForm],
    roster: &[Employee],
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Option<WorkflowAssignment> {
    let stages = roles::applicable_stages(template, employee, roster);
    if stages.is_empty() {
        debug!(
            employee = %employee.id,
            template = %template.id,
            "no applicable stages after role filtering"
        );
        return None;
    }

    let start_date = schedule::staggered_start(now, index);
    let end_date = schedule::interval_end(start_date, &template.interval);

    let mut status = match end_date {
        Some(end) if end < now => {
            if rng.gen_bool(P_COMPLETED_WHEN_WINDOW_ELAPSED) {
                AssignmentStatus::Completed
            } else {
                AssignmentStatus::InProgress
            }
        }
        _ if start_date <= now => {
            if rng.gen_bool(P_IN_PROGRESS_WHEN_STARTED) {
                AssignmentStatus::InProgress
            } else {
                AssignmentStatus::NotStarted
            }
        }
        _ => AssignmentStatus::NotStarted,
    };

    if employee.status == EmployeeStatus::Inactive && status != AssignmentStatus::Completed {
        status = AssignmentStatus::Cancelled;
    }

    let mut stage_completions: BTreeMap<String, StageCompletion> = BTreeMap::new();
    for (i, stage) in stages.iter().enumerate() {
        let is_last = i + 1 == stages.len();
        let completed = status == AssignmentStatus::Completed
            || (status == AssignmentStatus::InProgress
                && !is_last
                && rng.gen_bool(P_STAGE_COMPLETED));

        let completion = if completed {
            let mut completion = StageCompletion {
                completed: true,
                completed_date: Some(seed::completion_date(
                    start_date,
                    end_date,
                    i,
                    stages.len(),
                )),
                completed_by: seed::completed_by(stage, employee),
                form_data: BTreeMap::new(),
            };
            if let Some(form_id) = stage.evaluation_form_id.as_deref() {
                match forms.iter().find(|f| f.id == form_id) {
                    Some(form) => {
                        completion.form_data =
                            seed::synthetic_form_data(form, stage.includes_employee(), rng);
                    }
                    None => debug!(
                        stage = %stage.id,
                        form = %form_id,
                        "stage references unknown form; no answers seeded"
                    ),
                }
            }
            completion
        } else {
            StageCompletion::pending()
        };

        stage_completions.insert(stage.id.clone(), completion);
    }

    let current_stage_id = stages
        .iter()
        .find(|s| {
            stage_completions
                .get(&s.id)
                .is_some_and(|c| !c.completed)
        })
        .map(|s| s.id.clone());

    Some(WorkflowAssignment {
        id: WorkflowAssignment::composite_id(&employee.id, &template.id, index),
        workflow_template_id: template.id.clone(),
        employee_id: employee.id.clone(),
        status,
        start_date,
        end_date,
        current_stage_id,
        stage_completions,
        manager_overrides: vec![],
        meetings: vec![],
    })
}
