use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for review templates owned by the catalog provider.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TemplateId(pub String);

/// Identifier wrapper for staff members.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EmployeeId(pub String);

/// Identifier wrapper for a single rated category within a template.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub String);

/// Identifier wrapper for a review instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub String);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shift segment a review is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    Opening,
    Closing,
    Transition,
}

impl ShiftType {
    pub fn label(&self) -> &'static str {
        match self {
            ShiftType::Opening => "opening",
            ShiftType::Closing => "closing",
            ShiftType::Transition => "transition",
        }
    }
}

/// Records whether a worker completed the review or the system drove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMethod {
    Manual,
    System,
}

impl CompletionMethod {
    pub fn label(&self) -> &'static str {
        match self {
            CompletionMethod::Manual => "manual",
            CompletionMethod::System => "system",
        }
    }
}

/// Lifecycle state of a review instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Completed,
}

impl ReviewStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Completed => "completed",
        }
    }
}

/// Role resolved from the staff directory; any known role grants review access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Line,
    ShiftLead,
    Manager,
}

impl StaffRole {
    pub fn label(&self) -> &'static str {
        match self {
            StaffRole::Line => "line",
            StaffRole::ShiftLead => "shift_lead",
            StaffRole::Manager => "manager",
        }
    }
}

/// One rated category as declared by the catalog provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCategory {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub max_rating: u16,
}

/// Template definition with its ordered categories. Immutable from the
/// engine's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewTemplate {
    pub id: TemplateId,
    pub name: String,
    pub categories: Vec<ReviewCategory>,
}

/// Natural unique key for a review instance. At most one instance exists per
/// key regardless of how many submissions race on first creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceKey {
    pub template_id: TemplateId,
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub shift: ShiftType,
}

/// The unit of lifecycle tracking: one employee's one template for one
/// date/shift, with derived aggregates refreshed on every submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewInstance {
    pub id: InstanceId,
    pub key: InstanceKey,
    pub status: ReviewStatus,
    pub completion_method: CompletionMethod,
    /// Deadline after which edits require a manager override. Fixed at
    /// creation to creation time plus the configured update window.
    pub locked_at: DateTime<Utc>,
    pub total_score: u32,
    pub max_possible_score: u32,
    pub percentage: f32,
    pub requires_manager_followup: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One response per (instance, category) pair. Overwriting an existing
/// response is an update, never a second create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewResponse {
    pub instance_id: InstanceId,
    pub category_id: CategoryId,
    pub rating: u16,
    pub notes: Option<String>,
    pub photos: Vec<String>,
    pub completed_by: EmployeeId,
    pub completed_at: DateTime<Utc>,
}

/// Incoming per-category payload within a submission batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResponseInput {
    pub category_id: CategoryId,
    pub rating: u16,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// A full submission request for one instance quadruple. Every category the
/// template defines is expected to arrive in one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSubmission {
    pub template_id: TemplateId,
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub shift: ShiftType,
    #[serde(default = "default_completion_method")]
    pub completion_method: CompletionMethod,
    #[serde(default)]
    pub manager_override: bool,
    pub responses: Vec<CategoryResponseInput>,
}

fn default_completion_method() -> CompletionMethod {
    CompletionMethod::Manual
}

/// Point-in-time copy of a response's mutable fields, kept in the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseSnapshot {
    pub rating: u16,
    pub notes: Option<String>,
    pub photos: Vec<String>,
}

/// Discriminator kept for forward compatibility with other audit sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    ResponseUpdated,
}

impl UpdateType {
    pub fn label(&self) -> &'static str {
        match self {
            UpdateType::ResponseUpdated => "response_updated",
        }
    }
}

/// Append-only audit entry written when an existing response is overwritten.
/// Never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewUpdateRecord {
    pub instance_id: InstanceId,
    pub category_id: CategoryId,
    pub updated_by: EmployeeId,
    pub update_type: UpdateType,
    pub previous_value: ResponseSnapshot,
    pub new_value: ResponseSnapshot,
    pub manager_override: bool,
    pub recorded_at: DateTime<Utc>,
}
