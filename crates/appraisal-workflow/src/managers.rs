//! Effective-Manager Resolution
//!
//! The manager chain actually in force for one assignment. An override
//! on the assignment replaces the employee's default chain wholesale —
//! there is no per-level merge.

use appraisal_types::{Employee, ManagerLevel, WorkflowAssignment};

/// The chain governing this assignment.
///
/// A non-empty `manager_overrides` fully replaces `employee.managers`;
/// levels absent from the override are *not* inherited from the default
/// chain.
pub fn effective_managers<'a>(
    assignment: &'a WorkflowAssignment,
    employee: &'a Employee,
) -> &'a [ManagerLevel] {
    if assignment.manager_overrides.is_empty() {
        &employee.managers
    } else {
        &assignment.manager_overrides
    }
}

pub fn manager_at_level(chain: &[ManagerLevel], level: u8) -> Option<&ManagerLevel> {
    chain.iter().find(|m| m.level == level)
}

/// Display name for a chain slot: roster name for internal managers,
/// the external contact name otherwise. `None` for unresolvable slots.
pub fn display_name(slot: &ManagerLevel, roster: &[Employee]) -> Option<String> {
    if let Some(id) = slot.employee_id.as_deref() {
        return roster.iter().find(|e| e.id == id).map(|e| e.name.clone());
    }
    slot.external_name.clone()
}

/// The manager who signs off the evaluation outcome. Lowest level wins
/// when several slots carry the flag.
pub fn evaluation_responsible(chain: &[ManagerLevel]) -> Option<&ManagerLevel> {
    chain
        .iter()
        .filter(|m| m.is_evaluation_responsible && m.is_filled())
        .min_by_key(|m| m.level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use appraisal_types::{AssignmentStatus, EmployeeStatus};
    use chrono::Utc;

    fn employee_with_chain(chain: Vec<ManagerLevel>) -> Employee {
        Employee {
            id: "emp-001".into(),
            name: "Ada Pierce".into(),
            email: "ada@corp.example".into(),
            department: "Engineering".into(),
            position: "Engineer".into(),
            status: EmployeeStatus::Active,
            hire_date: None,
            managers: chain,
            assigned_workflow_ids: vec![],
        }
    }

    fn assignment(overrides: Vec<ManagerLevel>) -> WorkflowAssignment {
        WorkflowAssignment {
            id: "assignment-emp-001-tmpl-1-0".into(),
            workflow_template_id: "tmpl-1".into(),
            employee_id: "emp-001".into(),
            status: AssignmentStatus::InProgress,
            start_date: Utc::now(),
            end_date: None,
            current_stage_id: None,
            stage_completions: Default::default(),
            manager_overrides: overrides,
            meetings: vec![],
        }
    }

    #[test]
    fn override_replaces_chain_wholesale() {
        let employee = employee_with_chain(vec![
            ManagerLevel::internal(1, "emp-Y"),
            ManagerLevel::internal(2, "emp-Z"),
        ]);
        let a = assignment(vec![ManagerLevel::internal(1, "emp-X")]);

        let effective = effective_managers(&a, &employee);
        assert_eq!(effective.len(), 1);
        assert_eq!(effective[0].employee_id.as_deref(), Some("emp-X"));
        // level 2 default is NOT inherited
        assert!(manager_at_level(effective, 2).is_none());
    }

    #[test]
    fn empty_override_falls_back_to_default_chain() {
        let employee = employee_with_chain(vec![ManagerLevel::internal(1, "emp-Y")]);
        let a = assignment(vec![]);

        let effective = effective_managers(&a, &employee);
        assert_eq!(effective[0].employee_id.as_deref(), Some("emp-Y"));
    }

    #[test]
    fn display_names_resolve_internal_and_external() {
        let boss = Employee {
            id: "emp-Y".into(),
            name: "Yusuf Grant".into(),
            email: "yusuf@corp.example".into(),
            department: "Engineering".into(),
            position: "Director".into(),
            status: EmployeeStatus::Active,
            hire_date: None,
            managers: vec![],
            assigned_workflow_ids: vec![],
        };
        let roster = vec![boss];

        let internal = ManagerLevel::internal(1, "emp-Y");
        let external = ManagerLevel::external(2, "Freya Holt", "freya@partners.example");
        let dangling = ManagerLevel::internal(3, "emp-gone");

        assert_eq!(display_name(&internal, &roster).as_deref(), Some("Yusuf Grant"));
        assert_eq!(display_name(&external, &roster).as_deref(), Some("Freya Holt"));
        assert_eq!(display_name(&dangling, &roster), None);
    }

    #[test]
    fn evaluation_responsible_prefers_lowest_level() {
        let chain = vec![
            ManagerLevel::internal(2, "emp-B").with_evaluation_responsible(),
            ManagerLevel::internal(1, "emp-A").with_evaluation_responsible(),
            ManagerLevel::internal(3, "emp-C"),
        ];
        assert_eq!(
            evaluation_responsible(&chain).and_then(|m| m.employee_id.as_deref()),
            Some("emp-A")
        );
        assert!(evaluation_responsible(&[]).is_none());
    }
}
