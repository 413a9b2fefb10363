//! Role Classification
//!
//! Places an employee in the management hierarchy and decides which
//! stage types a review cycle may ask of them. Someone with nobody above
//! them is never handed a self-evaluation form; someone who manages
//! others never needs third-party approval — they are the approving
//! tier. This table is a fixed business rule, not derived data.

use serde::{Deserialize, Serialize};

use appraisal_types::{Employee, ReviewStage, StageType, WorkflowTemplate};

/// Coarse position in the management hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleCategory {
    NoManagers,
    OneManager,
    TwoManagers,
    ManagesOthers,
}

impl RoleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoManagers => "no_managers",
            Self::OneManager => "one_manager",
            Self::TwoManagers => "two_managers",
            Self::ManagesOthers => "manages_others",
        }
    }
}

impl std::fmt::Display for RoleCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classify an employee against the full roster.
///
/// Managing others takes priority over the employee's own manager
/// count; only filled manager slots count (empty placeholders are
/// ignored).
pub fn classify(employee: &Employee, roster: &[Employee]) -> RoleCategory {
    let manages_others = roster.iter().any(|other| {
        other.id != employee.id
            && other
                .managers
                .iter()
                .any(|m| m.employee_id.as_deref() == Some(employee.id.as_str()))
    });
    if manages_others {
        return RoleCategory::ManagesOthers;
    }

    match employee.filled_manager_count() {
        0 => RoleCategory::NoManagers,
        1 => RoleCategory::OneManager,
        _ => RoleCategory::TwoManagers,
    }
}

/// The stage-type permission table.
pub fn is_stage_type_allowed(stage_type: StageType, category: RoleCategory) -> bool {
    match category {
        RoleCategory::NoManagers => matches!(
            stage_type,
            StageType::Meeting | StageType::Review | StageType::Approval
        ),
        RoleCategory::OneManager | RoleCategory::TwoManagers => {
            matches!(stage_type, StageType::Evaluation | StageType::Meeting)
        }
        RoleCategory::ManagesOthers => matches!(
            stage_type,
            StageType::Evaluation | StageType::Meeting | StageType::Review
        ),
    }
}

/// The template's stages that apply to this employee, in stage order.
///
/// A stage excluded here never appears in the generated assignment's
/// completion map — it is invisible to the employee, not merely hidden.
pub fn applicable_stages<'a>(
    template: &'a WorkflowTemplate,
    employee: &Employee,
    roster: &[Employee],
) -> Vec<&'a ReviewStage> {
    let category = classify(employee, roster);
    template
        .ordered_stages()
        .into_iter()
        .filter(|stage| is_stage_type_allowed(stage.stage_type, category))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use appraisal_types::{EmployeeStatus, ManagerLevel};

    fn employee(id: &str, managers: Vec<ManagerLevel>) -> Employee {
        Employee {
            id: id.into(),
            name: id.into(),
            email: format!("{id}@corp.example"),
            department: "Engineering".into(),
            position: "Engineer".into(),
            status: EmployeeStatus::Active,
            hire_date: None,
            managers,
            assigned_workflow_ids: vec![],
        }
    }

    #[test]
    fn manager_count_classification() {
        let roster = vec![employee("solo", vec![])];
        assert_eq!(classify(&roster[0], &roster), RoleCategory::NoManagers);

        let one = employee("one", vec![ManagerLevel::internal(1, "boss")]);
        assert_eq!(classify(&one, &[one.clone()]), RoleCategory::OneManager);

        let two = employee(
            "two",
            vec![
                ManagerLevel::internal(1, "boss"),
                ManagerLevel::external(2, "Ext Advisor", "ext@partners.example"),
            ],
        );
        assert_eq!(classify(&two, &[two.clone()]), RoleCategory::TwoManagers);
    }

    #[test]
    fn placeholder_slots_do_not_count() {
        let placeholder = ManagerLevel {
            level: 1,
            employee_id: None,
            external_name: None,
            external_email: None,
            is_external: false,
            is_evaluation_responsible: false,
        };
        let e = employee("ghost", vec![placeholder]);
        assert_eq!(classify(&e, &[e.clone()]), RoleCategory::NoManagers);
    }

    #[test]
    fn being_referenced_wins_over_own_manager_count() {
        let lead = employee("lead", vec![ManagerLevel::internal(1, "vp")]);
        let report = employee("report", vec![ManagerLevel::internal(1, "lead")]);
        let roster = vec![lead.clone(), report];

        assert_eq!(classify(&lead, &roster), RoleCategory::ManagesOthers);
    }

    #[test]
    fn permission_table() {
        use RoleCategory::*;
        use StageType::*;

        let cases = [
            (NoManagers, Evaluation, false),
            (NoManagers, Meeting, true),
            (NoManagers, Review, true),
            (NoManagers, Approval, true),
            (OneManager, Evaluation, true),
            (OneManager, Meeting, true),
            (OneManager, Review, false),
            (OneManager, Approval, false),
            (TwoManagers, Evaluation, true),
            (TwoManagers, Meeting, true),
            (TwoManagers, Review, false),
            (TwoManagers, Approval, false),
            (ManagesOthers, Evaluation, true),
            (ManagesOthers, Meeting, true),
            (ManagesOthers, Review, true),
            (ManagesOthers, Approval, false),
        ];
        for (category, stage_type, expected) in cases {
            assert_eq!(
                is_stage_type_allowed(stage_type, category),
                expected,
                "{category} / {stage_type}"
            );
        }
    }
}
