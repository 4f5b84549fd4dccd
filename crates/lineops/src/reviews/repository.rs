use chrono::{DateTime, NaiveDate, Utc};

use super::domain::{
    CompletionMethod, EmployeeId, InstanceId, InstanceKey, ReviewInstance, ReviewResponse,
    ReviewUpdateRecord, StaffRole, TemplateId,
};
use super::notify::ReviewNotification;
use super::scoring::ScoringContext;

/// Everything one submission writes, applied as a single atomic unit.
///
/// Implementations must upsert the responses, append the audit records,
/// recompute the instance aggregate via `scoring::aggregate` over the full
/// merged response set, and stamp the instance completed — all inside one
/// transaction, so a partial failure never leaves a completed instance with
/// an inconsistent score.
#[derive(Debug, Clone)]
pub struct SubmissionWrite {
    pub instance_id: InstanceId,
    pub responses: Vec<ReviewResponse>,
    pub audits: Vec<ReviewUpdateRecord>,
    pub scoring: ScoringContext,
    pub completion_method: CompletionMethod,
    pub submitted_at: DateTime<Utc>,
}

/// Storage abstraction so the engine can be exercised in isolation.
///
/// The backing store must enforce uniqueness on the instance quadruple
/// (template, employee, date, shift); `create_instance` reports a duplicate
/// as `Conflict` rather than failing hard, and callers re-read and continue
/// against the winner.
pub trait ReviewRepository: Send + Sync {
    fn create_instance(&self, instance: ReviewInstance) -> Result<ReviewInstance, RepositoryError>;
    fn fetch_instance(&self, key: &InstanceKey) -> Result<Option<ReviewInstance>, RepositoryError>;
    fn fetch_responses(
        &self,
        instance_id: &InstanceId,
    ) -> Result<Vec<ReviewResponse>, RepositoryError>;
    fn persist_submission(&self, write: SubmissionWrite)
        -> Result<ReviewInstance, RepositoryError>;
    fn update_records(
        &self,
        instance_id: &InstanceId,
    ) -> Result<Vec<ReviewUpdateRecord>, RepositoryError>;
    /// Completed instance for (template, employee, date) across any shift,
    /// as the workflow gate checks completion per day.
    fn completed_instance(
        &self,
        template_id: &TemplateId,
        employee_id: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<ReviewInstance>, RepositoryError>;
    fn instances_for_day(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Vec<ReviewInstance>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("instance already exists for this template, employee, date, and shift")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Staff lookup boundary. The manager roster is always fetched fresh per
/// notification decision, never cached by the engine.
pub trait StaffDirectory: Send + Sync {
    fn role_of(&self, employee_id: &EmployeeId) -> Result<Option<StaffRole>, DirectoryError>;
    fn managers(&self) -> Result<Vec<EmployeeId>, DirectoryError>;
}

/// Staff directory failure.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("staff directory unavailable: {0}")]
    Unavailable(String),
}

/// Outbound alert hook. Delivery is advisory; errors never fail a
/// submission.
pub trait NotificationPublisher: Send + Sync {
    fn publish(&self, notification: ReviewNotification) -> Result<(), PublishError>;
}

/// Alert dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}
