//! Employee Roster Types
//!
//! An employee carries an ordered approval chain (`managers`, level 1 =
//! most immediate) and the ids of the review-cycle templates assigned to
//! them. A manager slot is either an internal reference to another
//! roster entry or an external contact, never both.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Whether an employee is currently employed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One rung of an approval/review chain.
///
/// Owned by the employee (the default chain) or by a workflow assignment
/// (an override, same shape). Internal slots set `employee_id`; external
/// slots set `is_external` plus the contact fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerLevel {
    /// Rank in the chain, 1 = primary manager.
    pub level: u8,

    /// Roster id of an internal manager.
    pub employee_id: Option<String>,

    /// Display name for an external contact.
    pub external_name: Option<String>,

    /// Email for an external contact.
    pub external_email: Option<String>,

    /// Marks the slot as an external contact.
    #[serde(default)]
    pub is_external: bool,

    /// Whether this manager signs off the evaluation outcome.
    #[serde(default)]
    pub is_evaluation_responsible: bool,
}

impl ManagerLevel {
    /// Internal slot pointing at another roster entry.
    pub fn internal(level: u8, employee_id: impl Into<String>) -> Self {
        Self {
            level,
            employee_id: Some(employee_id.into()),
            external_name: None,
            external_email: None,
            is_external: false,
            is_evaluation_responsible: false,
        }
    }

    /// External contact slot.
    pub fn external(level: u8, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            level,
            employee_id: None,
            external_name: Some(name.into()),
            external_email: Some(email.into()),
            is_external: true,
            is_evaluation_responsible: false,
        }
    }

    pub fn with_evaluation_responsible(mut self) -> Self {
        self.is_evaluation_responsible = true;
        self
    }

    /// A slot counts as filled when it references someone — internal id
    /// or external name. Empty placeholder rows are ignored everywhere.
    pub fn is_filled(&self) -> bool {
        self.employee_id.is_some() || self.external_name.is_some()
    }
}

/// One roster entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub status: EmployeeStatus,

    pub hire_date: Option<NaiveDate>,

    /// Default approval chain, ordered by `level` (1 = primary).
    /// At most one slot per level value.
    #[serde(default)]
    pub managers: Vec<ManagerLevel>,

    /// Review-cycle template ids assigned to this employee. The position
    /// in this list staggers the generated assignment start dates.
    #[serde(default)]
    pub assigned_workflow_ids: Vec<String>,
}

impl Employee {
    pub fn manager_at_level(&self, level: u8) -> Option<&ManagerLevel> {
        self.managers.iter().find(|m| m.level == level)
    }

    /// Number of filled manager slots (placeholders excluded).
    pub fn filled_manager_count(&self) -> usize {
        self.managers.iter().filter(|m| m.is_filled()).count()
    }
}
