use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::audit;
use super::catalog::{self, CatalogError, TemplateCatalog};
use super::config::{EngineConfig, LookupFallback};
use super::domain::{
    CategoryId, EmployeeId, InstanceId, InstanceKey, ReviewInstance, ReviewResponse, ReviewStatus,
    ReviewSubmission, ReviewTemplate, ShiftType, StaffRole, TemplateId,
};
use super::gate::{self, GateError, GateOutcome};
use super::notify;
use super::repository::{
    DirectoryError, NotificationPublisher, RepositoryError, ReviewRepository, StaffDirectory,
    SubmissionWrite,
};
use super::scoring::{self, ScoringContext};
use super::window::{self, WindowExpired, WindowState};

/// Service composing the repository, catalog, staff directory, and
/// notification publisher behind the engine's operation surface.
pub struct ReviewService<R, C, S, N> {
    repository: Arc<R>,
    catalog: Arc<C>,
    staff: Arc<S>,
    notifier: Arc<N>,
    config: EngineConfig,
}

static INSTANCE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_instance_id() -> InstanceId {
    let id = INSTANCE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    InstanceId(format!("rev-{id:06}"))
}

/// Verdict of the per-user access check that replaced the legacy shared
/// secret: any staff member the directory knows may open the review UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub granted: bool,
    pub role: Option<StaffRole>,
}

/// Read-only preview of one instance quadruple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewStatusView {
    pub review_instance: Option<ReviewInstance>,
    pub template: ReviewTemplate,
    /// Whether an edit would be admitted right now with no override implied.
    pub can_update: bool,
}

/// Successful submission result returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionOutcome {
    pub review_instance_id: InstanceId,
    pub total_score: u32,
    pub max_possible_score: u32,
    pub percentage: f32,
    pub requires_manager_followup: bool,
}

/// One row of the checklist-of-reviews view: a template merged with its
/// completion instance for the day, if started.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateDayView {
    pub template: ReviewTemplate,
    pub instance: Option<ReviewInstance>,
}

impl<R, C, S, N> ReviewService<R, C, S, N>
where
    R: ReviewRepository + 'static,
    C: TemplateCatalog + 'static,
    S: StaffDirectory + 'static,
    N: NotificationPublisher + 'static,
{
    pub fn new(
        repository: Arc<R>,
        catalog: Arc<C>,
        staff: Arc<S>,
        notifier: Arc<N>,
        config: EngineConfig,
    ) -> Self {
        Self {
            repository,
            catalog,
            staff,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Per-user access check. A denial is a result, never an error.
    pub fn authorize_access(
        &self,
        employee_id: &EmployeeId,
    ) -> Result<AccessDecision, ReviewServiceError> {
        let role = self.staff.role_of(employee_id)?;
        Ok(AccessDecision {
            granted: role.is_some(),
            role,
        })
    }

    /// Read-only status for one quadruple, including the window verdict.
    pub fn review_status(
        &self,
        key: &InstanceKey,
        now: DateTime<Utc>,
    ) -> Result<ReviewStatusView, ReviewServiceError> {
        let template = self
            .catalog
            .template(&key.template_id)?
            .ok_or_else(|| ReviewServiceError::UnknownTemplate(key.template_id.clone()))?;

        let review_instance = self.repository.fetch_instance(key)?;
        let can_update = review_instance
            .as_ref()
            .map(|instance| WindowState::of(instance.locked_at, now).is_open())
            .unwrap_or(true);

        Ok(ReviewStatusView {
            review_instance,
            template,
            can_update,
        })
    }

    /// Submit a full batch of category responses for one quadruple.
    ///
    /// Resolves (or creates) the instance, runs the window check once,
    /// audits every overwrite, persists the batch plus refreshed aggregates
    /// atomically, and then decides outside the write whether to alert the
    /// manager roster.
    pub fn submit(
        &self,
        submission: ReviewSubmission,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, ReviewServiceError> {
        let (template, category_maxes) = self.resolve_template(&submission.template_id)?;
        self.validate_ratings(&submission, &category_maxes)?;

        let (instance, existed_before) = self.resolve_instance(&submission, now)?;

        if existed_before {
            window::admit(instance.locked_at, now, submission.manager_override)?;
        }

        let existing: BTreeMap<CategoryId, ReviewResponse> = self
            .repository
            .fetch_responses(&instance.id)?
            .into_iter()
            .map(|response| (response.category_id.clone(), response))
            .collect();

        let mut responses = Vec::with_capacity(submission.responses.len());
        let mut audits = Vec::new();
        for input in &submission.responses {
            if let Some(current) = existing.get(&input.category_id) {
                audits.push(audit::overwrite_record(
                    current,
                    input,
                    &submission.employee_id,
                    submission.manager_override,
                    now,
                ));
            }
            responses.push(ReviewResponse {
                instance_id: instance.id.clone(),
                category_id: input.category_id.clone(),
                rating: input.rating,
                notes: input.notes.clone(),
                photos: input.photos.clone(),
                completed_by: submission.employee_id.clone(),
                completed_at: now,
            });
        }

        let scoring_ctx = ScoringContext {
            category_maxes,
            fallback_max_rating: self.config.fallback_max_rating,
            critical_rating: self.config.critical_rating,
            pass_threshold_percent: self.config.pass_threshold_percent,
        };

        // Summary over the merged set, for the notification decision. The
        // repository recomputes the authoritative aggregate inside its own
        // write so racing submissions cannot leave a stale total behind.
        let mut merged = existing;
        for response in &responses {
            merged.insert(response.category_id.clone(), response.clone());
        }
        let merged: Vec<ReviewResponse> = merged.into_values().collect();
        let summary = scoring::aggregate(&merged, &scoring_ctx);

        let updated = self.repository.persist_submission(SubmissionWrite {
            instance_id: instance.id.clone(),
            responses,
            audits,
            scoring: scoring_ctx,
            completion_method: submission.completion_method,
            submitted_at: now,
        })?;

        info!(
            instance = %updated.id,
            employee = %submission.employee_id,
            percentage = updated.percentage,
            followup = updated.requires_manager_followup,
            correction = existed_before,
            "review submission persisted"
        );

        if let Some(kind) = notify::decide(existed_before, &summary) {
            self.fan_out(kind, &submission.employee_id, &updated, &template, &summary);
        }

        Ok(SubmissionOutcome {
            review_instance_id: updated.id,
            total_score: updated.total_score,
            max_possible_score: updated.max_possible_score,
            percentage: updated.percentage,
            requires_manager_followup: updated.requires_manager_followup,
        })
    }

    /// Admission check for a shift workflow on `date`.
    pub fn check_workflow_requirements(
        &self,
        employee_id: &EmployeeId,
        department: &str,
        shift: ShiftType,
        date: NaiveDate,
    ) -> Result<GateOutcome, ReviewServiceError> {
        let outcome = gate::evaluate(
            self.repository.as_ref(),
            self.catalog.as_ref(),
            &self.config.gate,
            self.config.lookup_fallback,
            employee_id,
            department,
            shift,
            date,
        )?;
        Ok(outcome)
    }

    /// Every catalog template merged with the employee's instance for `date`.
    pub fn daily_overview(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Vec<TemplateDayView>, ReviewServiceError> {
        let templates = self.catalog.templates()?;
        let instances = self.repository.instances_for_day(employee_id, date)?;

        Ok(templates
            .into_iter()
            .map(|template| {
                let instance = instances
                    .iter()
                    .find(|instance| instance.key.template_id == template.id)
                    .cloned();
                TemplateDayView { template, instance }
            })
            .collect())
    }

    fn resolve_template(
        &self,
        template_id: &TemplateId,
    ) -> Result<(Option<ReviewTemplate>, BTreeMap<CategoryId, u16>), ReviewServiceError> {
        match self.catalog.template(template_id)? {
            Some(template) => {
                let maxes = catalog::category_maxes(&template);
                Ok((Some(template), maxes))
            }
            None => match self.config.lookup_fallback {
                LookupFallback::Permissive => {
                    warn!(template = %template_id, "template missing from catalog; scoring against fallback ceilings");
                    Ok((None, BTreeMap::new()))
                }
                LookupFallback::Strict => {
                    Err(ReviewServiceError::UnknownTemplate(template_id.clone()))
                }
            },
        }
    }

    fn validate_ratings(
        &self,
        submission: &ReviewSubmission,
        category_maxes: &BTreeMap<CategoryId, u16>,
    ) -> Result<(), ReviewServiceError> {
        for input in &submission.responses {
            let max = match category_maxes.get(&input.category_id) {
                Some(max) => *max,
                None if self.config.lookup_fallback == LookupFallback::Strict => {
                    return Err(ReviewServiceError::UnknownCategory {
                        category_id: input.category_id.clone(),
                        template_id: submission.template_id.clone(),
                    });
                }
                None => self.config.fallback_max_rating,
            };

            if input.rating < 1 || input.rating > max {
                return Err(ReviewServiceError::RatingOutOfRange {
                    category_id: input.category_id.clone(),
                    rating: input.rating,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Get-or-create the instance for the submission's quadruple. A loser of
    /// the creation race re-reads the winner's row and proceeds against it.
    fn resolve_instance(
        &self,
        submission: &ReviewSubmission,
        now: DateTime<Utc>,
    ) -> Result<(ReviewInstance, bool), ReviewServiceError> {
        let key = InstanceKey {
            template_id: submission.template_id.clone(),
            employee_id: submission.employee_id.clone(),
            date: submission.date,
            shift: submission.shift,
        };

        if let Some(existing) = self.repository.fetch_instance(&key)? {
            return Ok((existing, true));
        }

        let candidate = ReviewInstance {
            id: next_instance_id(),
            key: key.clone(),
            status: ReviewStatus::Pending,
            completion_method: submission.completion_method,
            locked_at: now + self.config.update_window(),
            total_score: 0,
            max_possible_score: 0,
            percentage: 0.0,
            requires_manager_followup: false,
            created_at: now,
            updated_at: now,
        };

        match self.repository.create_instance(candidate) {
            Ok(created) => Ok((created, false)),
            Err(RepositoryError::Conflict) => {
                let winner = self
                    .repository
                    .fetch_instance(&key)?
                    .ok_or(RepositoryError::NotFound)?;
                Ok((winner, true))
            }
            Err(other) => Err(other.into()),
        }
    }

    /// Notify every manager on the roster. Advisory only: roster and
    /// transport failures are logged and swallowed, so a submission never
    /// fails because of its notification.
    fn fan_out(
        &self,
        kind: notify::NotificationKind,
        sender: &EmployeeId,
        instance: &ReviewInstance,
        template: &Option<ReviewTemplate>,
        summary: &scoring::ScoreSummary,
    ) {
        let template_name = template
            .as_ref()
            .map(|template| template.name.clone())
            .unwrap_or_else(|| instance.key.template_id.0.clone());

        let roster = match self.staff.managers() {
            Ok(roster) => roster,
            Err(err) => {
                warn!(error = %err, "manager roster unavailable; skipping notifications");
                return;
            }
        };

        for manager in roster {
            let notification = notify::build(
                kind,
                manager.clone(),
                sender,
                &instance.id,
                &template_name,
                summary,
            );
            if let Err(err) = self.notifier.publish(notification) {
                warn!(recipient = %manager, error = %err, "review notification dropped");
            }
        }
    }
}

/// Error raised by the review service.
#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error(transparent)]
    WindowExpired(#[from] WindowExpired),
    #[error("no template '{0}' in the catalog")]
    UnknownTemplate(TemplateId),
    #[error("no category '{category_id}' in template '{template_id}'")]
    UnknownCategory {
        category_id: CategoryId,
        template_id: TemplateId,
    },
    #[error("rating {rating} for category '{category_id}' is outside 1..={max}")]
    RatingOutOfRange {
        category_id: CategoryId,
        rating: u16,
        max: u16,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Gate(#[from] GateError),
}
