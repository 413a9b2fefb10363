//! Appraisal Workflow Engine
//!
//! Turns a roster of employees plus a catalog of review-cycle templates
//! into concrete, time-boxed workflow assignments, and derives the
//! employee-facing views from them: appraisals, task boards, and
//! notifications.
//!
//! The pipeline:
//!
//! ```text
//! Employee[] + WorkflowTemplate[] + EvaluationForm[]
//!         │ generator (role filter, window, seeded state)
//!         ▼
//! WorkflowAssignment[]  ──► projection (Appraisal / Task views)
//!         │
//!         └────────────────► notifications (due / overdue / blocked)
//! ```
//!
//! Everything is synchronous pure computation over in-memory data; the
//! [`store::WorkflowStore`] owns the collections and is the single
//! mutation path, so task views and assignment state cannot diverge.
//! Time and randomness are injected: callers pass `now` and an RNG, and
//! the demo path seeds a [`rand::rngs::StdRng`] so runs are
//! reproducible.

pub mod catalog;
pub mod demo;
pub mod generator;
pub mod managers;
pub mod notifications;
pub mod projection;
pub mod roles;
pub mod schedule;
pub mod seed;
pub mod store;
pub mod validate;

use thiserror::Error;

pub use catalog::{CatalogError, DemoCatalog};
pub use generator::generate_assignments;
pub use notifications::{Notification, NotificationKind, ReadMarkStore};
pub use projection::{
    Appraisal, AppraisalStatus, FormCompletionSummary, FormCounts, Task, TaskStatus,
};
pub use roles::RoleCategory;
pub use store::WorkflowStore;
pub use validate::ValidationError;

/// Errors surfaced by the store's hardened entry points.
///
/// The generator itself keeps the looser skip-don't-throw policy:
/// dangling references encountered mid-generation drop the referencing
/// unit and log, rather than failing the whole run.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("unknown workflow template: {0}")]
    UnknownTemplate(String),

    #[error("unknown employee: {0}")]
    UnknownEmployee(String),

    #[error("unknown evaluation form: {0}")]
    UnknownForm(String),

    #[error("unknown assignment: {0}")]
    UnknownAssignment(String),

    #[error("stage {stage_id} is not present on assignment {assignment_id}")]
    StageNotPresent {
        assignment_id: String,
        stage_id: String,
    },

    #[error("invalid template {id}: {issues}")]
    InvalidTemplate { id: String, issues: String },

    #[error("invalid form submission: {0}")]
    InvalidSubmission(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
