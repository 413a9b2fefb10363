//! In-Memory Workflow Store
//!
//! Single owner of the demo data set: roster, template catalog, form
//! schemas, and the generated assignments. Consumers receive a
//! reference to the store instead of reaching for shared globals, and
//! every mutation goes through it so task views and assignment state
//! stay in sync.
//!
//! Regeneration fully replaces the assignment list. Anything that must
//! survive a regeneration (manager overrides entered against the
//! previous list) is reconciled **by assignment id**, never by array
//! position — ids are deterministic composites, positions are not.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use appraisal_types::{
    AssignmentStatus, Employee, EvaluationForm, FormValue, ManagerLevel, WorkflowAssignment,
    WorkflowTemplate,
};

use crate::generator::generate_assignments;
use crate::notifications::{self, Notification};
use crate::projection::{self, Appraisal, Task};
use crate::{roles, validate, WorkflowError};

pub struct WorkflowStore {
    employees: Vec<Employee>,
    templates: Vec<WorkflowTemplate>,
    forms: Vec<EvaluationForm>,
    assignments: Vec<WorkflowAssignment>,
    seed: u64,
}

impl WorkflowStore {
    /// Build an empty store over the given collections. Call
    /// [`WorkflowStore::initialize`] (or [`reset`](WorkflowStore::reset))
    /// to generate assignments.
    pub fn new(
        employees: Vec<Employee>,
        templates: Vec<WorkflowTemplate>,
        forms: Vec<EvaluationForm>,
        seed: u64,
    ) -> Self {
        Self {
            employees,
            templates,
            forms,
            assignments: Vec::new(),
            seed,
        }
    }

    /// Validating constructor: rejects structurally broken templates
    /// instead of seeding assignments from them.
    pub fn try_new(
        employees: Vec<Employee>,
        templates: Vec<WorkflowTemplate>,
        forms: Vec<EvaluationForm>,
        seed: u64,
    ) -> Result<Self, WorkflowError> {
        for template in &templates {
            let issues = validate::validate_template(template);
            if !issues.is_empty() {
                return Err(WorkflowError::InvalidTemplate {
                    id: template.id.clone(),
                    issues: validate::summarize(&issues),
                });
            }
        }
        Ok(Self::new(employees, templates, forms, seed))
    }

    /// (Re)generate the assignment list from the current roster and
    /// catalog. Idempotent for a fixed clock: the RNG is reseeded on
    /// every run.
    pub fn initialize(&mut self, now: DateTime<Utc>) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut fresh = generate_assignments(
            &self.employees,
            &self.templates,
            &self.forms,
            now,
            &mut rng,
        );

        // Carry admin-entered overrides across regeneration, by id.
        for assignment in &mut fresh {
            if let Some(previous) = self.assignments.iter().find(|a| a.id == assignment.id) {
                assignment.manager_overrides = previous.manager_overrides.clone();
            }
        }

        debug!(count = fresh.len(), "regenerated workflow assignments");
        self.assignments = fresh;
    }

    pub fn reset(&mut self, now: DateTime<Utc>) {
        self.initialize(now);
    }

    // -- accessors ----------------------------------------------------------

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn templates(&self) -> &[WorkflowTemplate] {
        &self.templates
    }

    pub fn forms(&self) -> &[EvaluationForm] {
        &self.forms
    }

    pub fn assignments(&self) -> &[WorkflowAssignment] {
        &self.assignments
    }

    pub fn employee(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn template(&self, id: &str) -> Option<&WorkflowTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn form(&self, id: &str) -> Option<&EvaluationForm> {
        self.forms.iter().find(|f| f.id == id)
    }

    pub fn assignment(&self, id: &str) -> Option<&WorkflowAssignment> {
        self.assignments.iter().find(|a| a.id == id)
    }

    // -- roster mutations ---------------------------------------------------

    /// Insert or replace one roster entry, then regenerate.
    pub fn upsert_employee(&mut self, employee: Employee, now: DateTime<Utc>) {
        match self.employees.iter_mut().find(|e| e.id == employee.id) {
            Some(existing) => *existing = employee,
            None => self.employees.push(employee),
        }
        self.initialize(now);
    }

    /// Replace the whole roster, then regenerate.
    pub fn replace_roster(&mut self, employees: Vec<Employee>, now: DateTime<Utc>) {
        self.employees = employees;
        self.initialize(now);
    }

    // -- assignment mutations -----------------------------------------------

    /// Set (or clear, with an empty list) the manager override chain on
    /// one assignment.
    pub fn set_manager_overrides(
        &mut self,
        assignment_id: &str,
        overrides: Vec<ManagerLevel>,
    ) -> Result<(), WorkflowError> {
        let assignment = self
            .assignments
            .iter_mut()
            .find(|a| a.id == assignment_id)
            .ok_or_else(|| WorkflowError::UnknownAssignment(assignment_id.to_string()))?;
        assignment.manager_overrides = overrides;
        Ok(())
    }

    /// Flip one stage's completion state and keep the assignment
    /// consistent: current stage re-derived, lifecycle status following
    /// the board.
    ///
    /// This is the single mutation path behind the kanban drag — the
    /// task view and the completion map can never disagree because the
    /// task view is always re-projected from here.
    pub fn set_stage_completion(
        &mut self,
        assignment_id: &str,
        stage_id: &str,
        completed: bool,
        completed_by: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), WorkflowError> {
        let index = self
            .assignments
            .iter()
            .position(|a| a.id == assignment_id)
            .ok_or_else(|| WorkflowError::UnknownAssignment(assignment_id.to_string()))?;

        let (employee_id, template_id) = {
            let a = &self.assignments[index];
            (a.employee_id.clone(), a.workflow_template_id.clone())
        };
        let employee = self
            .employee(&employee_id)
            .ok_or_else(|| WorkflowError::UnknownEmployee(employee_id.clone()))?;
        let template = self
            .template(&template_id)
            .ok_or_else(|| WorkflowError::UnknownTemplate(template_id.clone()))?;

        let ordered: Vec<String> = roles::applicable_stages(template, employee, &self.employees)
            .iter()
            .map(|s| s.id.clone())
            .collect();

        let assignment = &mut self.assignments[index];
        let completion = assignment
            .stage_completions
            .get_mut(stage_id)
            .ok_or_else(|| WorkflowError::StageNotPresent {
                assignment_id: assignment_id.to_string(),
                stage_id: stage_id.to_string(),
            })?;

        completion.completed = completed;
        completion.completed_date = completed.then_some(now);
        completion.completed_by = if completed { completed_by } else { None };

        let ordered_refs: Vec<&str> = ordered.iter().map(|s| s.as_str()).collect();
        assignment.recompute_current_stage(&ordered_refs);

        if assignment.status != AssignmentStatus::Cancelled {
            let (done, _) = assignment.completion_counts();
            assignment.status = if assignment.all_stages_completed() {
                AssignmentStatus::Completed
            } else if done > 0 {
                AssignmentStatus::InProgress
            } else if assignment.status == AssignmentStatus::Completed {
                // everything was un-done again
                AssignmentStatus::InProgress
            } else {
                assignment.status
            };
        }

        Ok(())
    }

    /// Record submitted form answers on a stage, checking every value
    /// against the referenced form's schema first.
    pub fn submit_form_answers(
        &mut self,
        assignment_id: &str,
        stage_id: &str,
        answers: BTreeMap<String, FormValue>,
    ) -> Result<(), WorkflowError> {
        let index = self
            .assignments
            .iter()
            .position(|a| a.id == assignment_id)
            .ok_or_else(|| WorkflowError::UnknownAssignment(assignment_id.to_string()))?;

        let template_id = self.assignments[index].workflow_template_id.clone();
        let template = self
            .template(&template_id)
            .ok_or_else(|| WorkflowError::UnknownTemplate(template_id.clone()))?;
        let stage = template
            .stage_by_id(stage_id)
            .ok_or_else(|| WorkflowError::StageNotPresent {
                assignment_id: assignment_id.to_string(),
                stage_id: stage_id.to_string(),
            })?;

        let form_id = stage.evaluation_form_id.as_deref().ok_or_else(|| {
            WorkflowError::InvalidSubmission(format!(
                "stage {stage_id} has no evaluation form attached"
            ))
        })?;
        let form = self
            .form(form_id)
            .ok_or_else(|| WorkflowError::UnknownForm(form_id.to_string()))?;

        let mut issues = Vec::new();
        for (field_id, value) in &answers {
            match form.field_by_id(field_id) {
                Some(field) => {
                    if let Err(issue) = validate::check_form_value(field, value) {
                        issues.push(issue);
                    }
                }
                None => issues.push(validate::ValidationError {
                    rule: "F5".to_string(),
                    message: format!("form {} has no field {}", form.id, field_id),
                }),
            }
        }
        if !issues.is_empty() {
            return Err(WorkflowError::InvalidSubmission(validate::summarize(&issues)));
        }

        let completion = self.assignments[index]
            .stage_completions
            .get_mut(stage_id)
            .ok_or_else(|| WorkflowError::StageNotPresent {
                assignment_id: assignment_id.to_string(),
                stage_id: stage_id.to_string(),
            })?;
        completion.form_data = answers;
        Ok(())
    }

    // -- derived views ------------------------------------------------------

    pub fn appraisals(&self) -> Vec<Appraisal> {
        self.assignments
            .iter()
            .filter_map(|a| projection::project_appraisal(a, &self.templates, &self.employees))
            .collect()
    }

    pub fn tasks(&self, now: DateTime<Utc>) -> Vec<Task> {
        self.assignments
            .iter()
            .filter_map(|a| {
                self.template(&a.workflow_template_id)
                    .map(|t| projection::project_tasks(a, t, now))
            })
            .flatten()
            .collect()
    }

    pub fn notifications(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        static_seed: Vec<Notification>,
    ) -> Vec<Notification> {
        notifications::generate_notifications(
            user_id,
            &self.employees,
            &self.templates,
            &self.assignments,
            now,
            static_seed,
        )
    }
}
