//! Built-In Demo Fixtures
//!
//! The synthetic data set the dashboard regenerates on every load: a
//! small roster spanning every role category, two review cycles, and
//! the evaluation forms they reference. Kept as a YAML catalog so the
//! fixtures go through exactly the same loader and validation as
//! user-supplied catalogs.

use chrono::{DateTime, Duration, Utc};

use crate::catalog::{load_catalog_from_bytes, CatalogError, DemoCatalog};
use crate::notifications::{Notification, NotificationKind};
use crate::store::WorkflowStore;

pub const DEMO_CATALOG_YAML: &str = r#"
employees:
  - id: emp-renata
    name: Renata Okafor
    email: renata.okafor@novagrid.example
    department: People
    position: VP People
    status: active
    hire_date: 2017-03-01
    assigned_workflow_ids: [tmpl-annual]

  - id: emp-mateo
    name: Mateo Lindqvist
    email: mateo.lindqvist@novagrid.example
    department: Engineering
    position: Engineering Director
    status: active
    hire_date: 2018-09-17
    managers:
      - level: 1
        employee_id: emp-renata
        is_evaluation_responsible: true
    assigned_workflow_ids: [tmpl-quarterly, tmpl-annual]

  - id: emp-idris
    name: Idris Beaumont
    email: idris.beaumont@novagrid.example
    department: Engineering
    position: Senior Engineer
    status: active
    hire_date: 2020-01-06
    managers:
      - level: 1
        employee_id: emp-mateo
        is_evaluation_responsible: true
      - level: 2
        employee_id: emp-renata
    assigned_workflow_ids: [tmpl-quarterly, tmpl-annual]

  - id: emp-sofia
    name: Sofia Marchetti
    email: sofia.marchetti@novagrid.example
    department: Design
    position: Product Designer
    status: active
    hire_date: 2021-05-10
    managers:
      - level: 1
        employee_id: emp-mateo
        is_evaluation_responsible: true
      - level: 2
        external_name: Hana Vogel
        external_email: hana.vogel@studiopartners.example
        is_external: true
    assigned_workflow_ids: [tmpl-quarterly]

  - id: emp-priya
    name: Priya Raghavan
    email: priya.raghavan@novagrid.example
    department: Engineering
    position: Engineer
    status: active
    hire_date: 2022-11-21
    managers:
      - level: 1
        employee_id: emp-mateo
        is_evaluation_responsible: true
    assigned_workflow_ids: [tmpl-quarterly]

  - id: emp-leon
    name: Leon Abramov
    email: leon.abramov@novagrid.example
    department: Engineering
    position: Engineer
    status: inactive
    hire_date: 2019-07-29
    managers:
      - level: 1
        employee_id: emp-mateo
    assigned_workflow_ids: [tmpl-quarterly]

templates:
  - id: tmpl-quarterly
    name: Quarterly Performance Review
    description: Self and manager evaluation with a sync meeting and sign-off.
    applicable_departments: [Engineering, Design]
    interval:
      kind: quarterly
    manager_levels: [1, 2]
    stages:
      - id: stage-self
        name: Self Evaluation
        description: The employee reflects on the past quarter.
        order: 0
        type: evaluation
        evaluation_form_id: form-self
        attendees: [employee]
        due_date:
          kind: before_interval
          offset: 2
        reminder_settings:
          days_before_due: 3
          repeat_daily_when_overdue: true
      - id: stage-manager
        name: Manager Evaluation
        description: The direct manager assesses the quarter.
        order: 1
        type: evaluation
        evaluation_form_id: form-manager
        attendees: [manager_level_1]
        due_date:
          kind: on_interval
      - id: stage-sync
        name: Review Meeting
        description: Evaluations are discussed face to face.
        order: 2
        type: meeting
        attendees: [employee, manager_level_1]
        due_date:
          kind: after_interval
          offset: 1
        required_stage_ids: [stage-self, stage-manager]
      - id: stage-signoff
        name: Final Sign-Off
        order: 3
        type: approval
        attendees: [manager_level_2]
        due_date:
          kind: after_interval
          offset: 2
        required_stage_ids: [stage-sync]

  - id: tmpl-annual
    name: Annual Development Review
    description: Goal setting and a peer review over a yearly window.
    interval:
      kind: annually
    manager_levels: [1]
    stages:
      - id: stage-goals
        name: Goal Setting
        order: 0
        type: evaluation
        evaluation_form_id: form-goals
        attendees: [employee]
        due_date:
          kind: before_interval
          offset: 4
      - id: stage-peer
        name: Calibration Review
        order: 1
        type: review
        attendees: [manager_level_1]
        due_date:
          kind: on_interval
      - id: stage-wrap
        name: Development Conversation
        order: 2
        type: meeting
        attendees: [employee, manager_level_1]
        due_date:
          kind: after_interval
          offset: 2
        required_stage_ids: [stage-goals]

forms:
  - id: form-self
    name: Quarterly Self Evaluation
    fields:
      - id: q-overall
        label: Overall rating for the quarter
        type: rating
        required: true
        min: 1
        max: 5
      - id: q-achievements
        label: Key achievements
        type: textarea
        required: true
        placeholder: What went well this quarter?
      - id: q-challenges
        label: Biggest challenges
        type: textarea
      - id: q-development
        label: Development areas
        type: textarea
      - id: q-strengths
        label: Strengths shown this quarter
        type: checkbox
        options: [Delivery, Mentoring, Quality, Ownership, Initiative, Collaboration]

  - id: form-manager
    name: Quarterly Manager Evaluation
    fields:
      - id: m-performance
        label: Performance rating
        type: rating
        required: true
        min: 1
        max: 5
      - id: m-feedback
        label: Feedback for the employee
        type: textarea
        required: true
      - id: m-goals
        label: Goals for next quarter
        type: textarea

  - id: form-goals
    name: Annual Goal Setting
    fields:
      - id: g-goals
        label: Goals for the coming year
        type: textarea
        required: true
      - id: g-confidence
        label: Confidence in reaching them
        type: rating
        min: 1
        max: 5
      - id: g-support
        label: Support needed
        type: textarea
"#;

/// Parse and validate the built-in catalog. Returns the catalog and its
/// canonical hash.
pub fn demo_catalog() -> Result<(DemoCatalog, String), CatalogError> {
    load_catalog_from_bytes(DEMO_CATALOG_YAML.as_bytes())
}

/// A fully seeded store over the built-in catalog.
pub fn demo_store(seed: u64, now: DateTime<Utc>) -> Result<WorkflowStore, CatalogError> {
    let (catalog, _hash) = demo_catalog()?;
    let mut store = WorkflowStore::new(catalog.employees, catalog.templates, catalog.forms, seed);
    store.initialize(now);
    Ok(store)
}

/// The static notifications merged ahead of the dynamically derived
/// feed for every user.
pub fn static_notifications(user_id: &str, now: DateTime<Utc>) -> Vec<Notification> {
    vec![
        Notification {
            id: "notif-static-welcome".into(),
            user_id: user_id.to_string(),
            kind: NotificationKind::AssignmentCreated,
            title: "Welcome to the review dashboard".into(),
            message: "Your review cycles, tasks, and evaluations live here.".into(),
            assignment_id: None,
            stage_id: None,
            created_at: now - Duration::days(3),
            read: false,
        },
        Notification {
            id: "notif-static-cycle-kickoff".into(),
            user_id: user_id.to_string(),
            kind: NotificationKind::AssignmentCreated,
            title: "Review season has started".into(),
            message: "Quarterly review cycles are now underway across the company.".into(),
            assignment_id: None,
            stage_id: None,
            created_at: now - Duration::days(1),
            read: false,
        },
    ]
}
