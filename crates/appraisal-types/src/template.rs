//! Review-Cycle Templates
//!
//! A template is the reusable definition of a review cycle: its ordered
//! stages, who attends each stage, how due dates are derived from the
//! cycle window, and the recurrence interval that sizes that window.
//!
//! Templates are instantiated into per-employee assignments by the
//! generator; editing a template never retroactively changes assignments
//! already generated from it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Stage type
// ---------------------------------------------------------------------------

/// The kind of work one stage represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageType {
    Evaluation,
    Meeting,
    Review,
    Approval,
}

impl StageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Evaluation => "evaluation",
            Self::Meeting => "meeting",
            Self::Review => "review",
            Self::Approval => "approval",
        }
    }
}

impl std::fmt::Display for StageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Attendees
// ---------------------------------------------------------------------------

/// Who takes part in a stage.
///
/// Serialized as the wire tokens `"employee"` and `"manager_level_N"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Attendee {
    /// The employee the assignment belongs to.
    Employee,
    /// The manager at the given rung of the effective chain.
    ManagerLevel(u8),
}

/// Failure to parse an attendee token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown attendee token: {0:?}")]
pub struct AttendeeParseError(pub String);

impl std::fmt::Display for Attendee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Employee => write!(f, "employee"),
            Self::ManagerLevel(level) => write!(f, "manager_level_{}", level),
        }
    }
}

impl std::str::FromStr for Attendee {
    type Err = AttendeeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "employee" {
            return Ok(Self::Employee);
        }
        if let Some(level) = s.strip_prefix("manager_level_") {
            if let Ok(level) = level.parse::<u8>() {
                return Ok(Self::ManagerLevel(level));
            }
        }
        Err(AttendeeParseError(s.to_string()))
    }
}

impl From<Attendee> for String {
    fn from(a: Attendee) -> Self {
        a.to_string()
    }
}

impl TryFrom<String> for Attendee {
    type Error = AttendeeParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ---------------------------------------------------------------------------
// Due-date policy
// ---------------------------------------------------------------------------

/// How a stage's due date relates to the assignment window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueDateKind {
    /// Offset weeks before the window start.
    BeforeInterval,
    /// Exactly the window start.
    OnInterval,
    /// Offset weeks after the window start.
    AfterInterval,
    /// Start shifted by `offset` in `unit` (negative = before).
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueDateUnit {
    Days,
    Weeks,
    Months,
}

/// A stage's relative due-date policy. Absent rule = no due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDateRule {
    pub kind: DueDateKind,
    pub offset: Option<i64>,
    pub unit: Option<DueDateUnit>,
}

impl DueDateRule {
    pub fn on_interval() -> Self {
        Self {
            kind: DueDateKind::OnInterval,
            offset: None,
            unit: None,
        }
    }

    pub fn before_interval(weeks: i64) -> Self {
        Self {
            kind: DueDateKind::BeforeInterval,
            offset: Some(weeks),
            unit: None,
        }
    }

    pub fn after_interval(weeks: i64) -> Self {
        Self {
            kind: DueDateKind::AfterInterval,
            offset: Some(weeks),
            unit: None,
        }
    }

    pub fn custom(offset: i64, unit: DueDateUnit) -> Self {
        Self {
            kind: DueDateKind::Custom,
            offset: Some(offset),
            unit: Some(unit),
        }
    }
}

// ---------------------------------------------------------------------------
// Recurrence interval
// ---------------------------------------------------------------------------

/// How often a review cycle recurs. Governs both assignment staggering
/// and the window used to derive the assignment end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Biannually,
    Annually,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalUnit {
    Days,
    Weeks,
    Months,
    Years,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceInterval {
    pub kind: IntervalKind,
    /// Only meaningful for `custom`.
    pub value: Option<i64>,
    /// Only meaningful for `custom`.
    pub unit: Option<IntervalUnit>,
}

impl RecurrenceInterval {
    pub fn of(kind: IntervalKind) -> Self {
        Self {
            kind,
            value: None,
            unit: None,
        }
    }

    pub fn quarterly() -> Self {
        Self::of(IntervalKind::Quarterly)
    }

    pub fn monthly() -> Self {
        Self::of(IntervalKind::Monthly)
    }

    pub fn annually() -> Self {
        Self::of(IntervalKind::Annually)
    }

    pub fn custom(value: i64, unit: IntervalUnit) -> Self {
        Self {
            kind: IntervalKind::Custom,
            value: Some(value),
            unit: Some(unit),
        }
    }
}

// ---------------------------------------------------------------------------
// Reminder / notification settings
// ---------------------------------------------------------------------------

/// Per-stage reminder policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSettings {
    /// Days before the due date to start reminding.
    pub days_before_due: u32,

    /// Keep reminding every day once overdue.
    #[serde(default)]
    pub repeat_daily_when_overdue: bool,
}

/// Template-level notification policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub notify_on_assignment: bool,
    pub notify_on_stage_completed: bool,
    pub remind_before_due_days: u32,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            notify_on_assignment: true,
            notify_on_stage_completed: true,
            remind_before_due_days: 7,
        }
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// One unit of work in a review cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewStage {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Position within the template. Unique and dense per template.
    pub order: u32,

    #[serde(rename = "type")]
    pub stage_type: StageType,

    /// Form filled during this stage (evaluation stages).
    pub evaluation_form_id: Option<String>,

    /// Legacy single-level reference kept for older templates; prefer a
    /// manager-level attendee.
    pub manager_level: Option<u8>,

    #[serde(default)]
    pub attendees: Vec<Attendee>,

    pub due_date: Option<DueDateRule>,

    #[serde(default = "default_required")]
    pub required: bool,

    /// Stage ids (same template) that must complete before this stage.
    #[serde(default)]
    pub required_stage_ids: Vec<String>,

    pub reminder_settings: Option<ReminderSettings>,
}

fn default_required() -> bool {
    true
}

impl ReviewStage {
    pub fn includes_employee(&self) -> bool {
        self.attendees.contains(&Attendee::Employee)
    }

    /// Manager levels named by the attendee list.
    pub fn manager_level_attendees(&self) -> impl Iterator<Item = u8> + '_ {
        self.attendees.iter().filter_map(|a| match a {
            Attendee::ManagerLevel(level) => Some(*level),
            Attendee::Employee => None,
        })
    }

    pub fn has_manager_attendee(&self) -> bool {
        self.manager_level_attendees().next().is_some()
    }

    /// Manager levels this stage references: attendees plus the legacy
    /// `manager_level` field.
    pub fn referenced_manager_levels(&self) -> Vec<u8> {
        let mut levels: Vec<u8> = self.manager_level_attendees().collect();
        if let Some(legacy) = self.manager_level {
            if !levels.contains(&legacy) {
                levels.push(legacy);
            }
        }
        levels
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// Reusable definition of a review cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Positions this cycle applies to (empty = all).
    #[serde(default)]
    pub applicable_positions: Vec<String>,

    /// Departments this cycle applies to (empty = all).
    #[serde(default)]
    pub applicable_departments: Vec<String>,

    pub stages: Vec<ReviewStage>,

    pub interval: RecurrenceInterval,

    /// Manager levels the cycle involves (empty = unconstrained).
    #[serde(default)]
    pub manager_levels: Vec<u8>,

    #[serde(default)]
    pub notification_settings: NotificationSettings,

    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl WorkflowTemplate {
    pub fn stage_by_id(&self, id: &str) -> Option<&ReviewStage> {
        self.stages.iter().find(|s| s.id == id)
    }

    /// Stages sorted by their `order` field.
    pub fn ordered_stages(&self) -> Vec<&ReviewStage> {
        let mut stages: Vec<&ReviewStage> = self.stages.iter().collect();
        stages.sort_by_key(|s| s.order);
        stages
    }
}
