use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::catalog::{CatalogError, TemplateCatalog};
use super::config::LookupFallback;
use super::domain::{EmployeeId, ShiftType};
use super::repository::{RepositoryError, ReviewRepository};

/// Static mapping of (department, shift) to the template names that must be
/// completed before the shift workflow opens. Carried in configuration so
/// department semantics are not hard-coded in logic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GateConfig {
    pub requirements: BTreeMap<String, Vec<String>>,
}

impl GateConfig {
    /// The stock restaurant mapping shipped with the service.
    pub fn standard() -> Self {
        let mut requirements = BTreeMap::new();
        requirements.insert(
            Self::slot("boh", ShiftType::Opening),
            vec!["BOH Morning Line Review".to_string()],
        );
        requirements.insert(
            Self::slot("boh", ShiftType::Closing),
            vec!["BOH Closing Line Review".to_string()],
        );
        requirements.insert(
            Self::slot("foh", ShiftType::Opening),
            vec!["FOH Opening Line Review".to_string()],
        );
        requirements.insert(
            Self::slot("foh", ShiftType::Transition),
            vec!["FOH Transition Handoff Review".to_string()],
        );
        Self { requirements }
    }

    fn slot(department: &str, shift: ShiftType) -> String {
        format!("{}:{}", department.trim().to_ascii_lowercase(), shift.label())
    }

    pub fn required_templates(&self, department: &str, shift: ShiftType) -> &[String] {
        self.requirements
            .get(&Self::slot(department, shift))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Admission decision for one employee, department, and shift on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateOutcome {
    pub workflow_allowed: bool,
    pub incomplete_reviews: Vec<String>,
    pub message: String,
}

/// Error raised when the gate cannot consult its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("no template named '{0}' in the catalog")]
    UnknownTemplate(String),
}

/// Compute the still-incomplete required reviews for `date` and the
/// admit/deny decision. A slot with no configured requirements always
/// admits; that is a normal outcome, not an error.
pub fn evaluate<R, C>(
    repository: &R,
    catalog: &C,
    config: &GateConfig,
    fallback: LookupFallback,
    employee_id: &EmployeeId,
    department: &str,
    shift: ShiftType,
    date: NaiveDate,
) -> Result<GateOutcome, GateError>
where
    R: ReviewRepository,
    C: TemplateCatalog,
{
    let required = config.required_templates(department, shift);
    let mut incomplete = Vec::new();

    for name in required {
        let template = match catalog.template_by_name(name)? {
            Some(template) => template,
            None => match fallback {
                LookupFallback::Permissive => {
                    warn!(template = %name, %department, "required template missing from catalog; skipping");
                    continue;
                }
                LookupFallback::Strict => return Err(GateError::UnknownTemplate(name.clone())),
            },
        };

        let completed = repository.completed_instance(&template.id, employee_id, date)?;
        if completed.is_none() {
            incomplete.push(name.clone());
        }
    }

    let workflow_allowed = incomplete.is_empty();
    let message = if workflow_allowed {
        format!(
            "All required reviews are complete for the {} {} shift.",
            department,
            shift.label()
        )
    } else {
        format!(
            "Complete the following reviews before starting the {} {} shift workflow: {}.",
            department,
            shift.label(),
            incomplete.join(", ")
        )
    };

    Ok(GateOutcome {
        workflow_allowed,
        incomplete_reviews: incomplete,
        message,
    })
}
