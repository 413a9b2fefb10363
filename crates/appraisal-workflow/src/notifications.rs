//! Notification Generation
//!
//! Scans the assignments a user is involved in — as the employee or as
//! an effective manager — and emits alerts for upcoming, overdue,
//! dependency-blocked, and just-completed stages, plus a heads-up for
//! assignments created today. Static demo notifications are merged in
//! ahead of the dynamic ones; the final list is newest-first.
//!
//! Notifications are regenerated from scratch on every scan, so ids are
//! deterministic composites and read state lives in a separate
//! [`ReadMarkStore`] keyed per user.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use appraisal_types::{Employee, StageType, WorkflowAssignment, WorkflowTemplate};

use crate::{managers, schedule};

/// How far ahead an evaluation due date counts as "coming up".
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    EvaluationDue,
    EvaluationCompleted,
    StageOverdue,
    StageBlocked,
    StageCompleted,
    AssignmentCreated,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EvaluationDue => "evaluation_due",
            Self::EvaluationCompleted => "evaluation_completed",
            Self::StageOverdue => "stage_overdue",
            Self::StageBlocked => "stage_blocked",
            Self::StageCompleted => "stage_completed",
            Self::AssignmentCreated => "assignment_created",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Deterministic composite id — stable across regeneration so read
    /// marks keep applying.
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub assignment_id: Option<String>,
    pub stage_id: Option<String>,
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub read: bool,
}

/// Generate the notification feed for one user.
///
/// `static_seed` is merged in before the dynamically derived entries;
/// the combined list comes back sorted newest-first.
pub fn generate_notifications(
    user_id: &str,
    employees: &[Employee],
    templates: &[WorkflowTemplate],
    assignments: &[WorkflowAssignment],
    now: DateTime<Utc>,
    static_seed: Vec<Notification>,
) -> Vec<Notification> {
    let mut feed = static_seed;

    for assignment in assignments {
        let Some(employee) = employees.iter().find(|e| e.id == assignment.employee_id) else {
            continue;
        };

        let chain = managers::effective_managers(assignment, employee);
        let involved = assignment.employee_id == user_id
            || chain
                .iter()
                .any(|m| m.employee_id.as_deref() == Some(user_id));
        if !involved {
            continue;
        }

        let Some(template) = templates
            .iter()
            .find(|t| t.id == assignment.workflow_template_id)
        else {
            continue;
        };

        scan_assignment(user_id, assignment, template, employee, now, &mut feed);
    }

    feed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    feed
}

fn scan_assignment(
    user_id: &str,
    assignment: &WorkflowAssignment,
    template: &WorkflowTemplate,
    employee: &Employee,
    now: DateTime<Utc>,
    feed: &mut Vec<Notification>,
) {
    for stage in template.ordered_stages() {
        let Some(completion) = assignment.completion(&stage.id) else {
            continue;
        };

        let stage_notification = |kind: NotificationKind, title: String, message: String, at| {
            Notification {
                id: format!("notif-{}-{}-{}", assignment.id, stage.id, kind.as_str()),
                user_id: user_id.to_string(),
                kind,
                title,
                message,
                assignment_id: Some(assignment.id.clone()),
                stage_id: Some(stage.id.clone()),
                created_at: at,
                read: false,
            }
        };

        if completion.completed {
            let completed_at = completion.completed_date.unwrap_or(now);
            if template.notification_settings.notify_on_stage_completed
                && same_day(completed_at, now)
            {
                let kind = if stage.stage_type == StageType::Evaluation {
                    NotificationKind::EvaluationCompleted
                } else {
                    NotificationKind::StageCompleted
                };
                feed.push(stage_notification(
                    kind,
                    format!("{} completed", stage.name),
                    format!(
                        "{} was completed today for {}.",
                        stage.name, employee.name
                    ),
                    completed_at,
                ));
            }
            continue;
        }

        let blocked = !stage.required_stage_ids.is_empty()
            && stage
                .required_stage_ids
                .iter()
                .any(|id| !assignment.is_stage_completed(id));
        if blocked {
            feed.push(stage_notification(
                NotificationKind::StageBlocked,
                format!("{} is waiting on earlier stages", stage.name),
                format!(
                    "{} for {} cannot start until its required stages are completed.",
                    stage.name, employee.name
                ),
                now,
            ));
        }

        let due = schedule::stage_due_date(
            stage.due_date.as_ref(),
            assignment.start_date,
            assignment.end_date,
        );
        if let Some(due) = due {
            if due < now {
                feed.push(stage_notification(
                    NotificationKind::StageOverdue,
                    format!("{} is overdue", stage.name),
                    format!(
                        "{} for {} was due {}.",
                        stage.name,
                        employee.name,
                        due.format("%b %d, %Y")
                    ),
                    due,
                ));
            } else if stage.stage_type == StageType::Evaluation
                && due <= now + Duration::days(UPCOMING_WINDOW_DAYS)
            {
                feed.push(stage_notification(
                    NotificationKind::EvaluationDue,
                    format!("{} due soon", stage.name),
                    format!(
                        "{} for {} is due {}.",
                        stage.name,
                        employee.name,
                        due.format("%b %d, %Y")
                    ),
                    now,
                ));
            }
        }
    }

    if template.notification_settings.notify_on_assignment
        && assignment.status == appraisal_types::AssignmentStatus::NotStarted
        && same_day(assignment.start_date, now)
    {
        feed.push(Notification {
            id: format!("notif-{}-created", assignment.id),
            user_id: user_id.to_string(),
            kind: NotificationKind::AssignmentCreated,
            title: format!("{} assigned", template.name),
            message: format!("{} was assigned to {} today.", template.name, employee.name),
            assignment_id: Some(assignment.id.clone()),
            stage_id: None,
            created_at: now,
            read: false,
        });
    }
}

fn same_day(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.date_naive() == b.date_naive()
}

// ---------------------------------------------------------------------------
// Read marks
// ---------------------------------------------------------------------------

/// Per-user read state for an otherwise regenerated feed.
///
/// Entries are JSON arrays of notification ids stored under
/// `read-notifications-<user_id>` — the payload shape a browser
/// localStorage implementation keeps, so raw payloads round-trip
/// unchanged. Only ids are persisted, never notification content.
#[derive(Debug, Clone, Default)]
pub struct ReadMarkStore {
    entries: HashMap<String, String>,
}

impl ReadMarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn storage_key(user_id: &str) -> String {
        format!("read-notifications-{user_id}")
    }

    pub fn read_ids(&self, user_id: &str) -> Vec<String> {
        self.entries
            .get(&Self::storage_key(user_id))
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    pub fn is_read(&self, user_id: &str, notification_id: &str) -> bool {
        self.read_ids(user_id).iter().any(|id| id == notification_id)
    }

    pub fn mark_read(&mut self, user_id: &str, notification_id: &str) {
        let mut ids = self.read_ids(user_id);
        if !ids.iter().any(|id| id == notification_id) {
            ids.push(notification_id.to_string());
            let payload = serde_json::to_string(&ids).unwrap_or_else(|_| "[]".into());
            self.entries.insert(Self::storage_key(user_id), payload);
        }
    }

    /// Flip the `read` flag on a freshly generated feed.
    pub fn apply(&self, user_id: &str, feed: &mut [Notification]) {
        let ids = self.read_ids(user_id);
        for notification in feed {
            if ids.iter().any(|id| *id == notification.id) {
                notification.read = true;
            }
        }
    }

    /// Raw stored payload, for persistence round-trips.
    pub fn raw(&self, user_id: &str) -> Option<&str> {
        self.entries.get(&Self::storage_key(user_id)).map(|s| s.as_str())
    }

    /// Restore a previously exported payload.
    pub fn restore_raw(&mut self, user_id: &str, payload: impl Into<String>) {
        self.entries.insert(Self::storage_key(user_id), payload.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appraisal_types::{
        AssignmentStatus, Attendee, DueDateRule, EmployeeStatus, ManagerLevel,
        NotificationSettings, RecurrenceInterval, ReviewStage, StageCompletion,
    };
    use chrono::TimeZone;
    use std::collections::BTreeMap;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap()
    }

    fn stage(id: &str, order: u32, stage_type: StageType, due: Option<DueDateRule>) -> ReviewStage {
        ReviewStage {
            id: id.into(),
            name: format!("Stage {id}"),
            description: String::new(),
            order,
            stage_type,
            evaluation_form_id: None,
            manager_level: None,
            attendees: vec![Attendee::Employee],
            due_date: due,
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
            manager_levels: vec![1],
            notification_settings: NotificationSettings::default(),
            is_active: true,
        }
    }

    fn employee(id: &str, managers: Vec<ManagerLevel>) -> Employee {
        Employee {
            id: id.into(),
            name: format!("Employee {id}"),
            email: format!("{id}@corp.example"),
            department: "Engineering".into(),
            position: "Engineer".into(),
            status: EmployeeStatus::Active,
            hire_date: None,
            managers,
            assigned_workflow_ids: vec![],
        }
    }

    fn assignment(completions: Vec<(&str, StageCompletion)>) -> WorkflowAssignment {
        let mut stage_completions = BTreeMap::new();
        for (id, c) in completions {
            stage_completions.insert(id.to_string(), c);
        }
        WorkflowAssignment {
            id: "assignment-e1-tmpl-1-0".into(),
            workflow_template_id: "tmpl-1".into(),
            employee_id: "e1".into(),
            status: AssignmentStatus::InProgress,
            start_date: now(),
            end_date: Some(Utc.with_ymd_and_hms(2024, 9, 15, 9, 0, 0).unwrap()),
            current_stage_id: Some("s1".into()),
            stage_completions,
            manager_overrides: vec![],
            meetings: vec![],
        }
    }

    #[test]
    fn only_involved_users_get_notifications() {
        let t = template(vec![stage(
            "s1",
            0,
            StageType::Evaluation,
            Some(DueDateRule::on_interval()),
        )]);
        let roster = vec![
            employee("e1", vec![ManagerLevel::internal(1, "m1")]),
            employee("m1", vec![]),
            employee("stranger", vec![]),
        ];
        let a = assignment(vec![("s1", StageCompletion::pending())]);
        let assignments = vec![a];

        let for_employee =
            generate_notifications("e1", &roster, &[t.clone()], &assignments, now(), vec![]);
        let for_manager =
            generate_notifications("m1", &roster, &[t.clone()], &assignments, now(), vec![]);
        let for_stranger =
            generate_notifications("stranger", &roster, &[t], &assignments, now(), vec![]);

        assert!(!for_employee.is_empty());
        assert!(!for_manager.is_empty());
        assert!(for_stranger.is_empty());
    }

    #[test]
    fn upcoming_window_is_seven_days_inclusive() {
        // due exactly now + 7 days
        let rule = DueDateRule::after_interval(1);
        let t = template(vec![stage("s1", 0, StageType::Evaluation, Some(rule))]);
        let roster = vec![employee("e1", vec![])];
        let a = assignment(vec![("s1", StageCompletion::pending())]);

        let feed = generate_notifications("e1", &roster, &[t], &[a], now(), vec![]);
        assert!(feed
            .iter()
            .any(|n| n.kind == NotificationKind::EvaluationDue));

        // one day past the window: nothing due-soon
        let rule = DueDateRule::custom(8, appraisal_types::DueDateUnit::Days);
        let t = template(vec![stage("s1", 0, StageType::Evaluation, Some(rule))]);
        let a = assignment(vec![("s1", StageCompletion::pending())]);
        let feed = generate_notifications("e1", &roster, &[t], &[a], now(), vec![]);
        assert!(feed.is_empty());
    }

    #[test]
    fn overdue_and_blocked_stages_alert() {
        let mut blocked = stage("s2", 1, StageType::Meeting, None);
        blocked.required_stage_ids = vec!["s1".into()];
        let t = template(vec![
            stage("s1", 0, StageType::Evaluation, Some(DueDateRule::before_interval(1))),
            blocked,
        ]);
        let roster = vec![employee("e1", vec![])];
        let a = assignment(vec![
            ("s1", StageCompletion::pending()),
            ("s2", StageCompletion::pending()),
        ]);

        let feed = generate_notifications("e1", &roster, &[t], &[a], now(), vec![]);
        assert!(feed.iter().any(|n| n.kind == NotificationKind::StageOverdue));
        assert!(feed.iter().any(|n| n.kind == NotificationKind::StageBlocked));
    }

    #[test]
    fn completions_today_split_by_stage_type() {
        let t = template(vec![
            stage("s1", 0, StageType::Evaluation, None),
            stage("s2", 1, StageType::Meeting, None),
        ]);
        let roster = vec![employee("e1", vec![])];
        let done_today = StageCompletion {
            completed: true,
            completed_date: Some(now() - Duration::hours(2)),
            completed_by: Some("e1".into()),
            form_data: BTreeMap::new(),
        };
        let done_last_week = StageCompletion {
            completed_date: Some(now() - Duration::days(7)),
            ..done_today.clone()
        };

        let a = assignment(vec![("s1", done_today), ("s2", done_last_week)]);
        let feed = generate_notifications("e1", &roster, &[t], &[a], now(), vec![]);

        assert!(feed
            .iter()
            .any(|n| n.kind == NotificationKind::EvaluationCompleted));
        // older completion stays quiet
        assert!(!feed.iter().any(|n| n.kind == NotificationKind::StageCompleted));
    }

    #[test]
    fn assignment_created_today_alerts_once() {
        let t = template(vec![stage("s1", 0, StageType::Meeting, None)]);
        let roster = vec![employee("e1", vec![])];
        let mut a = assignment(vec![("s1", StageCompletion::pending())]);
        a.status = AssignmentStatus::NotStarted;

        let feed = generate_notifications("e1", &roster, &[t], &[a], now(), vec![]);
        let created: Vec<_> = feed
            .iter()
            .filter(|n| n.kind == NotificationKind::AssignmentCreated)
            .collect();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].id, "notif-assignment-e1-tmpl-1-0-created");
    }

    #[test]
    fn muted_template_settings_suppress_courtesy_notifications() {
        let mut t = template(vec![
            stage("s1", 0, StageType::Evaluation, None),
            stage("s2", 1, StageType::Meeting, None),
        ]);
        t.notification_settings.notify_on_stage_completed = false;
        t.notification_settings.notify_on_assignment = false;
        let roster = vec![employee("e1", vec![])];

        let done_today = StageCompletion {
            completed: true,
            completed_date: Some(now()),
            completed_by: Some("e1".into()),
            form_data: BTreeMap::new(),
        };
        let mut a = assignment(vec![("s1", done_today), ("s2", StageCompletion::pending())]);
        a.status = AssignmentStatus::NotStarted;

        let feed = generate_notifications("e1", &roster, &[t], &[a], now(), vec![]);
        assert!(feed.is_empty());
    }

    #[test]
    fn feed_is_sorted_newest_first_with_static_seed() {
        let t = template(vec![stage(
            "s1",
            0,
            StageType::Evaluation,
            Some(DueDateRule::before_interval(1)),
        )]);
        let roster = vec![employee("e1", vec![])];
        let a = assignment(vec![("s1", StageCompletion::pending())]);

        let static_seed = vec![Notification {
            id: "notif-static-welcome".into(),
            user_id: "e1".into(),
            kind: NotificationKind::AssignmentCreated,
            title: "Welcome".into(),
            message: "Your review space is ready.".into(),
            assignment_id: None,
            stage_id: None,
            created_at: now() + Duration::hours(1),
            read: false,
        }];

        let feed = generate_notifications("e1", &roster, &[t], &[a], now(), static_seed);
        assert!(feed.len() >= 2);
        assert_eq!(feed[0].id, "notif-static-welcome");
        assert!(feed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn read_marks_survive_regeneration() {
        let t = template(vec![stage(
            "s1",
            0,
            StageType::Evaluation,
            Some(DueDateRule::before_interval(1)),
        )]);
        let roster = vec![employee("e1", vec![])];
        let a = assignment(vec![("s1", StageCompletion::pending())]);

        let mut feed = generate_notifications("e1", &roster, &[t.clone()], &[a.clone()], now(), vec![]);
        let mut marks = ReadMarkStore::new();
        marks.mark_read("e1", &feed[0].id);
        marks.apply("e1", &mut feed);
        assert!(feed[0].read);

        // regenerate: same deterministic id, mark still applies
        let mut feed2 = generate_notifications("e1", &roster, &[t], &[a], now(), vec![]);
        assert!(!feed2[0].read);
        marks.apply("e1", &mut feed2);
        assert!(feed2[0].read);
    }

    #[test]
    fn read_mark_payload_is_a_json_id_array() {
        let mut marks = ReadMarkStore::new();
        marks.mark_read("e1", "notif-a");
        marks.mark_read("e1", "notif-b");
        marks.mark_read("e1", "notif-a");

        assert_eq!(
            marks.raw("e1"),
            Some(r#"["notif-a","notif-b"]"#)
        );
        assert_eq!(ReadMarkStore::storage_key("e1"), "read-notifications-e1");

        let mut restored = ReadMarkStore::new();
        restored.restore_raw("e1", marks.raw("e1").unwrap_or("[]"));
        assert!(restored.is_read("e1", "notif-b"));
        assert!(!restored.is_read("e1", "notif-c"));
    }
}
