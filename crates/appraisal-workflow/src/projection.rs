//! Appraisal and Task Projections
//!
//! Read-only views folding a `WorkflowAssignment` + its template +
//! employee into the records the dashboard surfaces: one `Appraisal`
//! per assignment, one `Task` per (assignment, stage) pair, and the
//! per-role form-completion tally. Nothing here mutates state; views
//! are re-derived on demand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use appraisal_types::{
    AssignmentStatus, Employee, StageType, WorkflowAssignment, WorkflowTemplate,
};

use crate::{managers, schedule};

// ---------------------------------------------------------------------------
// Appraisal
// ---------------------------------------------------------------------------

/// Dashboard-facing lifecycle of an appraisal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppraisalStatus {
    Draft,
    InProgress,
    Completed,
    Cancelled,
}

impl AppraisalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for AppraisalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One-to-one projection of an assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appraisal {
    pub assignment_id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub template_id: String,
    pub template_name: String,
    pub status: AppraisalStatus,

    /// Mean of every numeric 1–5 answer across all stages; `None` when
    /// no such answers exist.
    pub overall_rating: Option<f64>,

    pub review_period: String,

    /// Deduplicated display names of the managers reviewing this cycle.
    pub reviewers: Vec<String>,

    pub comments: String,

    pub completed_stages: usize,
    pub total_stages: usize,
}

/// Project one assignment into an appraisal record.
///
/// Returns `None` when the template or employee cannot be resolved —
/// the referencing view is omitted rather than erroring.
pub fn project_appraisal(
    assignment: &WorkflowAssignment,
    templates: &[WorkflowTemplate],
    employees: &[Employee],
) -> Option<Appraisal> {
    let template = templates
        .iter()
        .find(|t| t.id == assignment.workflow_template_id)?;
    let employee = employees.iter().find(|e| e.id == assignment.employee_id)?;

    let (completed, total) = assignment.completion_counts();

    // Completion on the ground beats the recorded status: a cycle whose
    // every present stage is done projects as completed even when the
    // assignment record still says otherwise.
    let status = if assignment.all_stages_completed()
        && assignment.status != AssignmentStatus::Cancelled
    {
        AppraisalStatus::Completed
    } else {
        match assignment.status {
            AssignmentStatus::NotStarted => AppraisalStatus::Draft,
            AssignmentStatus::InProgress => AppraisalStatus::InProgress,
            AssignmentStatus::Completed => AppraisalStatus::Completed,
            AssignmentStatus::Cancelled => AppraisalStatus::Cancelled,
        }
    };

    Some(Appraisal {
        assignment_id: assignment.id.clone(),
        employee_id: employee.id.clone(),
        employee_name: employee.name.clone(),
        template_id: template.id.clone(),
        template_name: template.name.clone(),
        status,
        overall_rating: overall_rating(assignment),
        review_period: review_period(assignment),
        reviewers: reviewer_names(assignment, template, employee, employees),
        comments: comments_summary(assignment, template, completed, total),
        completed_stages: completed,
        total_stages: total,
    })
}

/// Mean of every numeric answer in the 1–5 band, across every stage.
/// Field-type-agnostic: any in-band number counts.
pub fn overall_rating(assignment: &WorkflowAssignment) -> Option<f64> {
    let ratings: Vec<f64> = assignment
        .stage_completions
        .values()
        .flat_map(|c| c.form_data.values())
        .filter_map(|v| v.rating_value())
        .collect();

    if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
    }
}

fn review_period(assignment: &WorkflowAssignment) -> String {
    let start = assignment.start_date.format("%b %d, %Y");
    match assignment.end_date {
        Some(end) => format!("{} – {}", start, end.format("%b %d, %Y")),
        None => format!("From {}", start),
    }
}

fn reviewer_names(
    assignment: &WorkflowAssignment,
    template: &WorkflowTemplate,
    employee: &Employee,
    roster: &[Employee],
) -> Vec<String> {
    let chain = managers::effective_managers(assignment, employee);
    let mut names = Vec::new();

    for stage in template.ordered_stages() {
        for level in stage.referenced_manager_levels() {
            let Some(slot) = managers::manager_at_level(chain, level) else {
                continue;
            };
            if let Some(name) = managers::display_name(slot, roster) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
    }

    names
}

fn comments_summary(
    assignment: &WorkflowAssignment,
    template: &WorkflowTemplate,
    completed: usize,
    total: usize,
) -> String {
    if total > 0 && completed == total {
        return format!("All {total} stages completed.");
    }

    let current_name = assignment
        .current_stage_id
        .as_deref()
        .and_then(|id| template.stage_by_id(id))
        .map(|s| s.name.clone());

    match current_name {
        Some(name) => format!("{completed} of {total} stages completed; currently at {name}."),
        None => format!("{completed} of {total} stages completed."),
    }
}

// ---------------------------------------------------------------------------
// Form-completion tally
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormCounts {
    pub completed: usize,
    pub total: usize,
}

/// Evaluation-form progress split by who fills the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormCompletionSummary {
    pub employee_forms: FormCounts,
    pub manager_forms: FormCounts,
}

/// Tally form completion across the template's evaluation stages.
///
/// A stage attended by both the employee and a manager level counts in
/// both tallies independently.
pub fn form_completion_by_role(
    assignment: &WorkflowAssignment,
    template: &WorkflowTemplate,
) -> FormCompletionSummary {
    let mut summary = FormCompletionSummary::default();

    for stage in &template.stages {
        if stage.stage_type != StageType::Evaluation || stage.evaluation_form_id.is_none() {
            continue;
        }
        let completed = assignment.is_stage_completed(&stage.id);

        if stage.includes_employee() {
            summary.employee_forms.total += 1;
            if completed {
                summary.employee_forms.completed += 1;
            }
        }
        if stage.has_manager_attendee() {
            summary.manager_forms.total += 1;
            if completed {
                summary.manager_forms.completed += 1;
            }
        }
    }

    summary
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Lifecycle of one (assignment, stage) pair on the task board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Overdue,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The unit the kanban board and task table operate on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// `<assignment id>-<stage id>`.
    pub id: String,
    pub assignment_id: String,
    pub stage_id: String,
    pub employee_id: String,
    pub workflow_template_id: String,
    pub name: String,
    pub description: String,
    pub stage_type: StageType,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub required: bool,
}

/// One task per stage present on the assignment, in stage order.
pub fn project_tasks(
    assignment: &WorkflowAssignment,
    template: &WorkflowTemplate,
    now: DateTime<Utc>,
) -> Vec<Task> {
    let mut tasks = Vec::new();

    for stage in template.ordered_stages() {
        let Some(completion) = assignment.completion(&stage.id) else {
            continue;
        };

        let due_date =
            schedule::stage_due_date(stage.due_date.as_ref(), assignment.start_date, assignment.end_date);

        let status = if assignment.status == AssignmentStatus::Cancelled {
            TaskStatus::Cancelled
        } else if completion.completed {
            TaskStatus::Completed
        } else if due_date.is_some_and(|due| due < now) {
            TaskStatus::Overdue
        } else if assignment.current_stage_id.as_deref() == Some(stage.id.as_str()) {
            TaskStatus::InProgress
        } else {
            TaskStatus::Pending
        };

        tasks.push(Task {
            id: format!("{}-{}", assignment.id, stage.id),
            assignment_id: assignment.id.clone(),
            stage_id: stage.id.clone(),
            employee_id: assignment.employee_id.clone(),
            workflow_template_id: template.id.clone(),
            name: stage.name.clone(),
            description: stage.description.clone(),
            stage_type: stage.stage_type,
            status,
            due_date,
            completed_date: completion.completed_date,
            required: stage.required,
        });
    }

    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use appraisal_types::{
        Attendee, DueDateRule, EmployeeStatus, FormValue, ManagerLevel, NotificationSettings,
        RecurrenceInterval, ReviewStage, StageCompletion,
    };
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap()
    }

    fn stage(
        id: &str,
        order: u32,
        stage_type: StageType,
        attendees: Vec<Attendee>,
        form: Option<&str>,
    ) -> ReviewStage {
        ReviewStage {
            id: id.into(),
            name: format!("Stage {id}"),
            description: String::new(),
            order,
            stage_type,
            evaluation_form_id: form.map(Into::into),
            manager_level: None,
            attendees,
            due_date: None,
            required: true,
            required_stage_ids: vec![],
            reminder_settings: None,
        }
    }

    fn template(stages: Vec<ReviewStage>) -> WorkflowTemplate {
        WorkflowTemplate {
            id: "tmpl-1".into(),
            name: "Quarterly Review".into(),
            description: String::new(),
            applicable_positions: vec![],
            applicable_departments: vec![],
            stages,
            interval: RecurrenceInterval::quarterly(),
            manager_levels: vec![1, 2],
            notification_settings: NotificationSettings::default(),
            is_active: true,
        }
    }

    fn employee(id: &str, name: &str, managers: Vec<ManagerLevel>) -> Employee {
        Employee {
            id: id.into(),
            name: name.into(),
            email: format!("{id}@corp.example"),
            department: "Engineering".into(),
            position: "Engineer".into(),
            status: EmployeeStatus::Active,
            hire_date: None,
            managers,
            assigned_workflow_ids: vec![],
        }
    }

    fn assignment(
        status: AssignmentStatus,
        completions: Vec<(&str, StageCompletion)>,
    ) -> WorkflowAssignment {
        let mut stage_completions = BTreeMap::new();
        for (id, c) in completions {
            stage_completions.insert(id.to_string(), c);
        }
        WorkflowAssignment {
            id: "assignment-e1-tmpl-1-0".into(),
            workflow_template_id: "tmpl-1".into(),
            employee_id: "e1".into(),
            status,
            start_date: now(),
            end_date: Some(Utc.with_ymd_and_hms(2024, 9, 15, 9, 0, 0).unwrap()),
            current_stage_id: None,
            stage_completions,
            manager_overrides: vec![],
            meetings: vec![],
        }
    }

    fn done(form_data: Vec<(&str, FormValue)>) -> StageCompletion {
        StageCompletion {
            completed: true,
            completed_date: Some(now()),
            completed_by: Some("e1".into()),
            form_data: form_data
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    #[test]
    fn completion_forces_completed_status() {
        let t = template(vec![
            stage("s1", 0, StageType::Evaluation, vec![Attendee::Employee], Some("f1")),
            stage("s2", 1, StageType::Meeting, vec![Attendee::Employee], None),
        ]);
        let roster = vec![employee("e1", "Ada Pierce", vec![])];
        let a = assignment(
            AssignmentStatus::InProgress,
            vec![("s1", done(vec![])), ("s2", done(vec![]))],
        );

        let appraisal = project_appraisal(&a, &[t], &roster).unwrap();
        assert_eq!(appraisal.status, AppraisalStatus::Completed);
        assert_eq!(appraisal.comments, "All 2 stages completed.");
    }

    #[test]
    fn cancelled_is_never_forced_to_completed() {
        let t = template(vec![stage(
            "s1",
            0,
            StageType::Meeting,
            vec![Attendee::Employee],
            None,
        )]);
        let roster = vec![employee("e1", "Ada Pierce", vec![])];
        let a = assignment(AssignmentStatus::Cancelled, vec![("s1", done(vec![]))]);

        let appraisal = project_appraisal(&a, &[t], &roster).unwrap();
        assert_eq!(appraisal.status, AppraisalStatus::Cancelled);
    }

    #[test]
    fn rating_mean_ignores_text_and_out_of_band_numbers() {
        let t = template(vec![
            stage("s1", 0, StageType::Evaluation, vec![Attendee::Employee], Some("f1")),
            stage("s2", 1, StageType::Evaluation, vec![Attendee::ManagerLevel(1)], Some("f2")),
        ]);
        let roster = vec![employee("e1", "Ada Pierce", vec![])];
        let a = assignment(
            AssignmentStatus::InProgress,
            vec![
                (
                    "s1",
                    done(vec![
                        ("q1", FormValue::Number(4.0)),
                        ("q2", FormValue::Text("text".into())),
                    ]),
                ),
                (
                    "s2",
                    done(vec![
                        ("q3", FormValue::Number(5.0)),
                        ("q4", FormValue::Number(12.0)),
                    ]),
                ),
            ],
        );

        let appraisal = project_appraisal(&a, &[t], &roster).unwrap();
        assert_eq!(appraisal.overall_rating, Some(4.5));
    }

    #[test]
    fn no_ratings_means_no_overall_rating() {
        let t = template(vec![stage(
            "s1",
            0,
            StageType::Meeting,
            vec![Attendee::Employee],
            None,
        )]);
        let roster = vec![employee("e1", "Ada Pierce", vec![])];
        let a = assignment(AssignmentStatus::InProgress, vec![("s1", done(vec![]))]);

        let appraisal = project_appraisal(&a, &[t], &roster).unwrap();
        assert_eq!(appraisal.overall_rating, None);
    }

    #[test]
    fn unresolvable_references_project_to_nothing() {
        let roster = vec![employee("e1", "Ada Pierce", vec![])];
        let a = assignment(AssignmentStatus::InProgress, vec![]);

        assert!(project_appraisal(&a, &[], &roster).is_none());
        assert!(project_appraisal(&a, &[template(vec![])], &[]).is_none());
    }

    #[test]
    fn reviewers_use_override_chain_and_dedup() {
        let t = template(vec![
            stage("s1", 0, StageType::Evaluation, vec![Attendee::ManagerLevel(1)], Some("f1")),
            stage("s2", 1, StageType::Meeting, vec![Attendee::ManagerLevel(1)], None),
        ]);
        let roster = vec![
            employee("e1", "Ada Pierce", vec![ManagerLevel::internal(1, "m-default")]),
            employee("m-default", "Default Manager", vec![]),
            employee("m-override", "Override Manager", vec![]),
        ];
        let mut a = assignment(AssignmentStatus::InProgress, vec![]);
        a.manager_overrides = vec![ManagerLevel::internal(1, "m-override")];

        let appraisal = project_appraisal(&a, &[t], &roster).unwrap();
        assert_eq!(appraisal.reviewers, vec!["Override Manager".to_string()]);
    }

    #[test]
    fn dual_attendee_stage_counts_in_both_tallies() {
        let t = template(vec![stage(
            "s1",
            0,
            StageType::Evaluation,
            vec![Attendee::Employee, Attendee::ManagerLevel(1)],
            Some("f1"),
        )]);
        let a = assignment(AssignmentStatus::InProgress, vec![("s1", done(vec![]))]);

        let summary = form_completion_by_role(&a, &t);
        assert_eq!(summary.employee_forms, FormCounts { completed: 1, total: 1 });
        assert_eq!(summary.manager_forms, FormCounts { completed: 1, total: 1 });
    }

    #[test]
    fn filtered_out_stage_counts_toward_total_only() {
        let t = template(vec![
            stage("s1", 0, StageType::Evaluation, vec![Attendee::Employee], Some("f1")),
            stage("s2", 1, StageType::Evaluation, vec![Attendee::ManagerLevel(1)], Some("f2")),
        ]);
        // only s1 survived filtering for this assignment
        let a = assignment(AssignmentStatus::InProgress, vec![("s1", done(vec![]))]);

        let summary = form_completion_by_role(&a, &t);
        assert_eq!(summary.employee_forms, FormCounts { completed: 1, total: 1 });
        assert_eq!(summary.manager_forms, FormCounts { completed: 0, total: 1 });
    }

    #[test]
    fn task_status_precedence() {
        let mut s1 = stage("s1", 0, StageType::Evaluation, vec![Attendee::Employee], Some("f1"));
        s1.due_date = Some(DueDateRule::before_interval(2)); // past due
        let mut s2 = stage("s2", 1, StageType::Meeting, vec![Attendee::Employee], None);
        s2.due_date = Some(DueDateRule::after_interval(4)); // future due
        let s3 = stage("s3", 2, StageType::Meeting, vec![Attendee::Employee], None);
        let t = template(vec![s1, s2, s3]);

        let mut a = assignment(
            AssignmentStatus::InProgress,
            vec![
                ("s1", StageCompletion::pending()),
                ("s2", StageCompletion::pending()),
                ("s3", StageCompletion::pending()),
            ],
        );
        a.current_stage_id = Some("s2".into());

        let tasks = project_tasks(&a, &t, now());
        let by_id: std::collections::HashMap<&str, TaskStatus> =
            tasks.iter().map(|t| (t.stage_id.as_str(), t.status)).collect();

        assert_eq!(by_id["s1"], TaskStatus::Overdue);
        assert_eq!(by_id["s2"], TaskStatus::InProgress);
        assert_eq!(by_id["s3"], TaskStatus::Pending);

        a.status = AssignmentStatus::Cancelled;
        let tasks = project_tasks(&a, &t, now());
        assert!(tasks.iter().all(|t| t.status == TaskStatus::Cancelled));
    }

    #[test]
    fn tasks_only_cover_present_stages() {
        let t = template(vec![
            stage("s1", 0, StageType::Meeting, vec![Attendee::Employee], None),
            stage("s2", 1, StageType::Approval, vec![Attendee::ManagerLevel(1)], None),
        ]);
        let a = assignment(AssignmentStatus::InProgress, vec![("s1", StageCompletion::pending())]);

        let tasks = project_tasks(&a, &t, now());
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].stage_id, "s1");
        assert_eq!(tasks[0].id, "assignment-e1-tmpl-1-0-s1");
    }
}
