//! Appraisal Domain Types
//!
//! Pure data structures for the performance-appraisal workflow system:
//! the employee roster, evaluation form schemas, review-cycle templates,
//! and the per-employee workflow assignments instantiated from them.
//!
//! This crate is the foundation layer. It carries no business logic
//! beyond small accessors and stays free of workspace dependencies so
//! the engine, projections, and any future transport layer can all share
//! one source of truth for the model.
//!
//! Derived views (appraisals, tasks, notifications) are *not* defined
//! here — they live next to the code that produces them in
//! `appraisal-workflow`.

pub mod assignment;
pub mod employee;
pub mod form;
pub mod template;

pub use assignment::{AssignmentStatus, Meeting, StageCompletion, WorkflowAssignment};
pub use employee::{Employee, EmployeeStatus, ManagerLevel};
pub use form::{EvaluationForm, FieldType, FormField, FormValue};
pub use template::{
    Attendee, AttendeeParseError, DueDateKind, DueDateRule, DueDateUnit, IntervalKind,
    IntervalUnit, NotificationSettings, RecurrenceInterval, ReminderSettings, ReviewStage,
    StageType, WorkflowTemplate,
};
