//! Workflow Assignments
//!
//! An assignment is one concrete instantiation of a review-cycle
//! template for one employee: its own time window, its own completion
//! state per surviving stage, and optionally its own manager chain
//! override.
//!
//! `stage_completions` only ever contains entries for stages that
//! survived role-based filtering for this employee — a stage filtered
//! out at generation time never appears here.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::employee::ManagerLevel;
use crate::form::FormValue;

/// Lifecycle of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    NotStarted,
    InProgress,
    Completed,
    Cancelled,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// No further progress possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Completion state of one stage within an assignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageCompletion {
    pub completed: bool,
    pub completed_date: Option<DateTime<Utc>>,

    /// Roster id of whoever completed the stage.
    pub completed_by: Option<String>,

    /// Submitted answers, keyed by form field id.
    #[serde(default)]
    pub form_data: BTreeMap<String, FormValue>,
}

impl StageCompletion {
    pub fn pending() -> Self {
        Self::default()
    }
}

/// A meeting scheduled under an assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// One instantiation of a template for one employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowAssignment {
    /// Deterministic composite id:
    /// `assignment-<employee_id>-<template_id>-<index>`.
    pub id: String,

    pub workflow_template_id: String,
    pub employee_id: String,

    pub status: AssignmentStatus,

    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,

    /// First unfinished stage (in stage order); `None` when everything
    /// present is complete.
    pub current_stage_id: Option<String>,

    /// Completion state per surviving stage id.
    #[serde(default)]
    pub stage_completions: BTreeMap<String, StageCompletion>,

    /// Non-empty list fully replaces the employee's default chain.
    #[serde(default)]
    pub manager_overrides: Vec<ManagerLevel>,

    #[serde(default)]
    pub meetings: Vec<Meeting>,
}

impl WorkflowAssignment {
    /// Deterministic id for one (employee, template, index) triple.
    pub fn composite_id(employee_id: &str, template_id: &str, index: usize) -> String {
        format!("assignment-{}-{}-{}", employee_id, template_id, index)
    }

    pub fn completion(&self, stage_id: &str) -> Option<&StageCompletion> {
        self.stage_completions.get(stage_id)
    }

    pub fn is_stage_completed(&self, stage_id: &str) -> bool {
        self.stage_completions
            .get(stage_id)
            .map(|c| c.completed)
            .unwrap_or(false)
    }

    /// `(completed, total)` over the stages present on this assignment.
    pub fn completion_counts(&self) -> (usize, usize) {
        let total = self.stage_completions.len();
        let completed = self
            .stage_completions
            .values()
            .filter(|c| c.completed)
            .count();
        (completed, total)
    }

    pub fn all_stages_completed(&self) -> bool {
        let (completed, total) = self.completion_counts();
        total > 0 && completed == total
    }

    /// Re-derive `current_stage_id` from completion state.
    ///
    /// `ordered_ids` must be the assignment's surviving stage ids in
    /// stage order; ids without a completion entry are ignored.
    pub fn recompute_current_stage(&mut self, ordered_ids: &[&str]) {
        self.current_stage_id = ordered_ids
            .iter()
            .find(|id| {
                self.stage_completions
                    .get(**id)
                    .is_some_and(|c| !c.completed)
            })
            .map(|id| id.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment_with(completions: &[(&str, bool)]) -> WorkflowAssignment {
        let mut stage_completions = BTreeMap::new();
        for (id, done) in completions {
            stage_completions.insert(
                id.to_string(),
                StageCompletion {
                    completed: *done,
                    ..StageCompletion::pending()
                },
            );
        }
        WorkflowAssignment {
            id: WorkflowAssignment::composite_id("emp-001", "tmpl-1", 0),
            workflow_template_id: "tmpl-1".into(),
            employee_id: "emp-001".into(),
            status: AssignmentStatus::InProgress,
            start_date: Utc::now(),
            end_date: None,
            current_stage_id: None,
            stage_completions,
            manager_overrides: vec![],
            meetings: vec![],
        }
    }

    #[test]
    fn composite_id_shape() {
        assert_eq!(
            WorkflowAssignment::composite_id("emp-7", "tmpl-annual", 2),
            "assignment-emp-7-tmpl-annual-2"
        );
    }

    #[test]
    fn completion_counting() {
        let a = assignment_with(&[("s1", true), ("s2", false), ("s3", true)]);
        assert_eq!(a.completion_counts(), (2, 3));
        assert!(!a.all_stages_completed());
        assert!(a.is_stage_completed("s1"));
        assert!(!a.is_stage_completed("s2"));
        assert!(!a.is_stage_completed("missing"));
    }

    #[test]
    fn current_stage_recomputation() {
        let mut a = assignment_with(&[("s1", true), ("s2", false), ("s3", false)]);
        a.recompute_current_stage(&["s1", "s2", "s3"]);
        assert_eq!(a.current_stage_id.as_deref(), Some("s2"));

        a.stage_completions.get_mut("s2").unwrap().completed = true;
        a.stage_completions.get_mut("s3").unwrap().completed = true;
        a.recompute_current_stage(&["s1", "s2", "s3"]);
        assert_eq!(a.current_stage_id, None);
    }

    #[test]
    fn empty_assignment_is_not_all_complete() {
        let a = assignment_with(&[]);
        assert!(!a.all_stages_completed());
    }
}
