//! Review validation and completion-locking engine.
//!
//! One review instance exists per (template, employee, date, shift)
//! quadruple. Submissions pass the update-window state machine, are scored
//! by full recomputation over the response set, audited on every overwrite,
//! and may fan a notification out to the manager roster. The workflow gate
//! blocks shift-workflow entry until the day's required reviews complete.

pub(crate) mod audit;
pub mod catalog;
mod config;
pub mod domain;
pub mod gate;
pub mod notify;
pub mod repository;
pub mod router;
pub(crate) mod scoring;
pub mod service;
pub mod window;

#[cfg(test)]
mod tests;

pub use catalog::{category_maxes, CatalogError, TemplateCatalog};
pub use config::{EngineConfig, LookupFallback};
pub use domain::{
    CategoryId, CategoryResponseInput, CompletionMethod, EmployeeId, InstanceId, InstanceKey,
    ResponseSnapshot, ReviewCategory, ReviewInstance, ReviewResponse, ReviewStatus,
    ReviewSubmission, ReviewTemplate, ReviewUpdateRecord, ShiftType, StaffRole, TemplateId,
    UpdateType,
};
pub use gate::{GateConfig, GateError, GateOutcome};
pub use notify::{
    NotificationKind, NotificationMetadata, NotificationPriority, ReviewNotification,
};
pub use repository::{
    DirectoryError, NotificationPublisher, PublishError, RepositoryError, ReviewRepository,
    StaffDirectory, SubmissionWrite,
};
pub use router::review_router;
pub use scoring::{aggregate, ScoreSummary, ScoringContext};
pub use service::{
    AccessDecision, ReviewService, ReviewServiceError, ReviewStatusView, SubmissionOutcome,
    TemplateDayView,
};
pub use window::{WindowExpired, WindowState};
