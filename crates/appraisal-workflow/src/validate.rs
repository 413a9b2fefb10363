//! Template, Form, and Roster Validation
//!
//! Structural checks run when a catalog is loaded or a template is
//! saved from the admin surface. Each check returns all violations
//! found, tagged with a stable rule code, rather than stopping at the
//! first problem.
//!
//! These rules back the generator's invariants: a stage with no
//! attendees would break attendee-based routing, and a dependency
//! cycle in `required_stage_ids` would deadlock dependency gating.

use std::collections::HashSet;

use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;

use appraisal_types::{
    Employee, EvaluationForm, FieldType, FormField, FormValue, IntervalKind, StageType,
    WorkflowTemplate,
};

/// One rule violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub rule: String,
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)
    }
}

/// Join violations into one line, for error payloads.
pub fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate a template. Returns all violations found.
pub fn validate_template(template: &WorkflowTemplate) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // V1: stage ids unique
    let mut seen: HashSet<&str> = HashSet::new();
    for stage in &template.stages {
        if !seen.insert(stage.id.as_str()) {
            errors.push(ValidationError::new(
                "V1",
                format!("duplicate stage id: {}", stage.id),
            ));
        }
    }

    // V2: order values unique and dense (0- or 1-based)
    let mut orders: Vec<u32> = template.stages.iter().map(|s| s.order).collect();
    orders.sort_unstable();
    let unique = orders.windows(2).all(|w| w[0] != w[1]);
    let dense = orders
        .first()
        .zip(orders.last())
        .map(|(first, last)| {
            (*first == 0 || *first == 1) && last - first + 1 == orders.len() as u32
        })
        .unwrap_or(true);
    if !unique || !dense {
        errors.push(ValidationError::new(
            "V2",
            format!("stage order values must be unique and dense, got {orders:?}"),
        ));
    }

    // V3: required_stage_ids reference stages in this template
    for stage in &template.stages {
        for required in &stage.required_stage_ids {
            if template.stage_by_id(required).is_none() {
                errors.push(ValidationError::new(
                    "V3",
                    format!(
                        "stage {} requires unknown stage {}",
                        stage.id, required
                    ),
                ));
            }
        }
    }

    // V4: no dependency cycles
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for stage in &template.stages {
        graph.add_node(stage.id.as_str());
        for required in &stage.required_stage_ids {
            graph.add_edge(required.as_str(), stage.id.as_str(), ());
        }
    }
    if is_cyclic_directed(&graph) {
        errors.push(ValidationError::new(
            "V4",
            format!("stage dependencies form a cycle in template {}", template.id),
        ));
    }

    for stage in &template.stages {
        // V5: evaluation stages carry a form
        if stage.stage_type == StageType::Evaluation && stage.evaluation_form_id.is_none() {
            errors.push(ValidationError::new(
                "V5",
                format!("evaluation stage {} has no evaluation form", stage.id),
            ));
        }

        // V6: attendee routing needs at least one attendee
        if stage.attendees.is_empty() {
            errors.push(ValidationError::new(
                "V6",
                format!("stage {} has no attendees", stage.id),
            ));
        }

        // V7: manager-level attendees stay within the template's levels
        if !template.manager_levels.is_empty() {
            for level in stage.manager_level_attendees() {
                if !template.manager_levels.contains(&level) {
                    errors.push(ValidationError::new(
                        "V7",
                        format!(
                            "stage {} references manager level {} outside the template's levels",
                            stage.id, level
                        ),
                    ));
                }
            }
        }

        // V8: custom due-date rules need offset and unit
        if let Some(rule) = &stage.due_date {
            if rule.kind == appraisal_types::DueDateKind::Custom
                && (rule.offset.is_none() || rule.unit.is_none())
            {
                errors.push(ValidationError::new(
                    "V8",
                    format!("stage {} has a custom due-date rule missing offset or unit", stage.id),
                ));
            }
        }
    }

    // V8: custom intervals need value and unit
    if template.interval.kind == IntervalKind::Custom
        && (template.interval.value.is_none() || template.interval.unit.is_none())
    {
        errors.push(ValidationError::new(
            "V8",
            format!("template {} has a custom interval missing value or unit", template.id),
        ));
    }

    errors
}

/// Validate a form schema.
pub fn validate_form(form: &EvaluationForm) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // F1: field ids unique
    let mut seen: HashSet<&str> = HashSet::new();
    for field in &form.fields {
        if !seen.insert(field.id.as_str()) {
            errors.push(ValidationError::new(
                "F1",
                format!("duplicate field id: {}", field.id),
            ));
        }
    }

    for field in &form.fields {
        // F2: choice fields need options
        if matches!(field.field_type, FieldType::Dropdown | FieldType::Checkbox)
            && field.options.is_empty()
        {
            errors.push(ValidationError::new(
                "F2",
                format!("{} field {} has no options", field.field_type, field.id),
            ));
        }

        // F3: bounds must be ordered
        if let (Some(min), Some(max)) = (field.min, field.max) {
            if min >= max {
                errors.push(ValidationError::new(
                    "F3",
                    format!("field {} has min {} >= max {}", field.id, min, max),
                ));
            }
        }
    }

    errors
}

/// Validate a roster entry's manager chain.
pub fn validate_employee(employee: &Employee) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // E1: at most one slot per level
    let mut seen: HashSet<u8> = HashSet::new();
    for slot in &employee.managers {
        if !seen.insert(slot.level) {
            errors.push(ValidationError::new(
                "E1",
                format!("employee {} has duplicate manager level {}", employee.id, slot.level),
            ));
        }
    }

    // E2: internal xor external
    for slot in &employee.managers {
        let internal = slot.employee_id.is_some();
        let external = slot.is_external || slot.external_name.is_some();
        if internal && external {
            errors.push(ValidationError::new(
                "E2",
                format!(
                    "employee {} manager level {} is both internal and external",
                    employee.id, slot.level
                ),
            ));
        }
    }

    errors
}

/// Check a submitted answer against its field's type.
pub fn check_form_value(field: &FormField, value: &FormValue) -> Result<(), ValidationError> {
    if value.is_compatible_with(field.field_type) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "F4",
            format!(
                "value for field {} is not compatible with type {}",
                field.id, field.field_type
            ),
        ))
    }
}
