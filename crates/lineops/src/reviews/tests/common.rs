use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, Utc};

use crate::reviews::catalog::{CatalogError, TemplateCatalog};
use crate::reviews::domain::{
    CategoryId, CategoryResponseInput, CompletionMethod, EmployeeId, InstanceId, InstanceKey,
    ReviewCategory, ReviewInstance, ReviewResponse, ReviewStatus, ReviewSubmission,
    ReviewTemplate, ReviewUpdateRecord, ShiftType, StaffRole, TemplateId,
};
use crate::reviews::notify::ReviewNotification;
use crate::reviews::repository::{
    DirectoryError, NotificationPublisher, PublishError, RepositoryError, ReviewRepository,
    StaffDirectory, SubmissionWrite,
};
use crate::reviews::scoring;
use crate::reviews::service::ReviewService;
use crate::reviews::EngineConfig;

#[derive(Default)]
pub(super) struct MemoryStore {
    instances: HashMap<InstanceId, ReviewInstance>,
    by_key: HashMap<InstanceKey, InstanceId>,
    responses: HashMap<InstanceId, BTreeMap<CategoryId, ReviewResponse>>,
    updates: HashMap<InstanceId, Vec<ReviewUpdateRecord>>,
}

/// Mutex-guarded store enforcing the quadruple uniqueness constraint and
/// applying each submission write as one atomic unit.
#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    inner: Arc<Mutex<MemoryStore>>,
}

impl ReviewRepository for MemoryRepository {
    fn create_instance(&self, instance: ReviewInstance) -> Result<ReviewInstance, RepositoryError> {
        let mut store = self.inner.lock().expect("repository mutex poisoned");
        if store.by_key.contains_key(&instance.key) {
            return Err(RepositoryError::Conflict);
        }
        store
            .by_key
            .insert(instance.key.clone(), instance.id.clone());
        store.instances.insert(instance.id.clone(), instance.clone());
        Ok(instance)
    }

    fn fetch_instance(&self, key: &InstanceKey) -> Result<Option<ReviewInstance>, RepositoryError> {
        let store = self.inner.lock().expect("repository mutex poisoned");
        Ok(store
            .by_key
            .get(key)
            .and_then(|id| store.instances.get(id))
            .cloned())
    }

    fn fetch_responses(
        &self,
        instance_id: &InstanceId,
    ) -> Result<Vec<ReviewResponse>, RepositoryError> {
        let store = self.inner.lock().expect("repository mutex poisoned");
        Ok(store
            .responses
            .get(instance_id)
            .map(|map| map.values().cloned().collect())
            .unwrap_or_default())
    }

    fn persist_submission(
        &self,
        write: SubmissionWrite,
    ) -> Result<ReviewInstance, RepositoryError> {
        let mut store = self.inner.lock().expect("repository mutex poisoned");
        if !store.instances.contains_key(&write.instance_id) {
            return Err(RepositoryError::NotFound);
        }

        let map = store.responses.entry(write.instance_id.clone()).or_default();
        for response in write.responses {
            map.insert(response.category_id.clone(), response);
        }
        let merged: Vec<ReviewResponse> = map.values().cloned().collect();
        let summary = scoring::aggregate(&merged, &write.scoring);

        store
            .updates
            .entry(write.instance_id.clone())
            .or_default()
            .extend(write.audits);

        let instance = store
            .instances
            .get_mut(&write.instance_id)
            .expect("presence checked above");
        instance.status = ReviewStatus::Completed;
        instance.completion_method = write.completion_method;
        instance.total_score = summary.total_score;
        instance.max_possible_score = summary.max_possible_score;
        instance.percentage = summary.percentage;
        instance.requires_manager_followup = summary.requires_manager_followup;
        instance.updated_at = write.submitted_at;
        Ok(instance.clone())
    }

    fn update_records(
        &self,
        instance_id: &InstanceId,
    ) -> Result<Vec<ReviewUpdateRecord>, RepositoryError> {
        let store = self.inner.lock().expect("repository mutex poisoned");
        Ok(store.updates.get(instance_id).cloned().unwrap_or_default())
    }

    fn completed_instance(
        &self,
        template_id: &TemplateId,
        employee_id: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Option<ReviewInstance>, RepositoryError> {
        let store = self.inner.lock().expect("repository mutex poisoned");
        Ok(store
            .instances
            .values()
            .find(|instance| {
                instance.status == ReviewStatus::Completed
                    && instance.key.template_id == *template_id
                    && instance.key.employee_id == *employee_id
                    && instance.key.date == date
            })
            .cloned())
    }

    fn instances_for_day(
        &self,
        employee_id: &EmployeeId,
        date: NaiveDate,
    ) -> Result<Vec<ReviewInstance>, RepositoryError> {
        let store = self.inner.lock().expect("repository mutex poisoned");
        Ok(store
            .instances
            .values()
            .filter(|instance| {
                instance.key.employee_id == *employee_id && instance.key.date == date
            })
            .cloned()
            .collect())
    }
}

/// Repository stub reporting every call as unavailable.
pub(super) struct UnavailableRepository;

impl ReviewRepository for UnavailableRepository {
    fn create_instance(&self, _: ReviewInstance) -> Result<ReviewInstance, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn fetch_instance(&self, _: &InstanceKey) -> Result<Option<ReviewInstance>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn fetch_responses(&self, _: &InstanceId) -> Result<Vec<ReviewResponse>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn persist_submission(&self, _: SubmissionWrite) -> Result<ReviewInstance, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn update_records(&self, _: &InstanceId) -> Result<Vec<ReviewUpdateRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn completed_instance(
        &self,
        _: &TemplateId,
        _: &EmployeeId,
        _: NaiveDate,
    ) -> Result<Option<ReviewInstance>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }

    fn instances_for_day(
        &self,
        _: &EmployeeId,
        _: NaiveDate,
    ) -> Result<Vec<ReviewInstance>, RepositoryError> {
        Err(RepositoryError::Unavailable("store offline".to_string()))
    }
}

#[derive(Clone)]
pub(super) struct MemoryCatalog {
    templates: Vec<ReviewTemplate>,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self {
            templates: vec![boh_template(), foh_template()],
        }
    }
}

impl TemplateCatalog for MemoryCatalog {
    fn template(&self, id: &TemplateId) -> Result<Option<ReviewTemplate>, CatalogError> {
        Ok(self
            .templates
            .iter()
            .find(|template| template.id == *id)
            .cloned())
    }

    fn template_by_name(&self, name: &str) -> Result<Option<ReviewTemplate>, CatalogError> {
        Ok(self
            .templates
            .iter()
            .find(|template| template.name == name)
            .cloned())
    }

    fn templates(&self) -> Result<Vec<ReviewTemplate>, CatalogError> {
        Ok(self.templates.clone())
    }
}

#[derive(Clone)]
pub(super) struct MemoryStaff {
    roles: HashMap<EmployeeId, StaffRole>,
}

impl Default for MemoryStaff {
    fn default() -> Self {
        let mut roles = HashMap::new();
        roles.insert(EmployeeId("emp-1".to_string()), StaffRole::Line);
        roles.insert(EmployeeId("lead-1".to_string()), StaffRole::ShiftLead);
        roles.insert(EmployeeId("mgr-1".to_string()), StaffRole::Manager);
        roles.insert(EmployeeId("mgr-2".to_string()), StaffRole::Manager);
        Self { roles }
    }
}

impl StaffDirectory for MemoryStaff {
    fn role_of(&self, employee_id: &EmployeeId) -> Result<Option<StaffRole>, DirectoryError> {
        Ok(self.roles.get(employee_id).copied())
    }

    fn managers(&self) -> Result<Vec<EmployeeId>, DirectoryError> {
        let mut managers: Vec<EmployeeId> = self
            .roles
            .iter()
            .filter(|(_, role)| **role == StaffRole::Manager)
            .map(|(id, _)| id.clone())
            .collect();
        managers.sort();
        Ok(managers)
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAlerts {
    events: Arc<Mutex<Vec<ReviewNotification>>>,
}

impl NotificationPublisher for MemoryAlerts {
    fn publish(&self, notification: ReviewNotification) -> Result<(), PublishError> {
        let mut guard = self.events.lock().expect("alert mutex poisoned");
        guard.push(notification);
        Ok(())
    }
}

impl MemoryAlerts {
    pub(super) fn events(&self) -> Vec<ReviewNotification> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

/// Publisher stub failing every dispatch.
pub(super) struct FailingAlerts;

impl NotificationPublisher for FailingAlerts {
    fn publish(&self, _: ReviewNotification) -> Result<(), PublishError> {
        Err(PublishError::Transport("alert channel offline".to_string()))
    }
}

/// Directory whose roster lookup always fails; role lookups still answer.
pub(super) struct OfflineRosterStaff;

impl StaffDirectory for OfflineRosterStaff {
    fn role_of(&self, _: &EmployeeId) -> Result<Option<StaffRole>, DirectoryError> {
        Ok(Some(StaffRole::Line))
    }

    fn managers(&self) -> Result<Vec<EmployeeId>, DirectoryError> {
        Err(DirectoryError::Unavailable("roster sync down".to_string()))
    }
}

pub(super) fn boh_template() -> ReviewTemplate {
    ReviewTemplate {
        id: TemplateId("tpl-boh-morning".to_string()),
        name: "BOH Morning Line Review".to_string(),
        categories: vec![
            category("clean", "Cleanliness", 5),
            category("prep", "Prep Readiness", 5),
            category("safety", "Food Safety", 5),
        ],
    }
}

pub(super) fn foh_template() -> ReviewTemplate {
    ReviewTemplate {
        id: TemplateId("tpl-foh-open".to_string()),
        name: "FOH Opening Line Review".to_string(),
        categories: vec![
            category("floor", "Dining Floor", 5),
            category("host", "Host Stand", 5),
        ],
    }
}

fn category(id: &str, name: &str, max_rating: u16) -> ReviewCategory {
    ReviewCategory {
        id: CategoryId(id.to_string()),
        name: name.to_string(),
        description: format!("{name} walkthrough"),
        max_rating,
    }
}

pub(super) fn engine_config() -> EngineConfig {
    EngineConfig::default()
}

pub(super) type MemoryService =
    ReviewService<MemoryRepository, MemoryCatalog, MemoryStaff, MemoryAlerts>;

pub(super) fn build_service(
    config: EngineConfig,
) -> (Arc<MemoryService>, MemoryRepository, MemoryAlerts) {
    let repository = MemoryRepository::default();
    let alerts = MemoryAlerts::default();
    let service = Arc::new(ReviewService::new(
        Arc::new(repository.clone()),
        Arc::new(MemoryCatalog::default()),
        Arc::new(MemoryStaff::default()),
        Arc::new(alerts.clone()),
        config,
    ));
    (service, repository, alerts)
}

pub(super) fn review_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).expect("valid date")
}

pub(super) fn shift_start() -> DateTime<Utc> {
    "2024-01-10T08:00:00Z".parse().expect("valid timestamp")
}

pub(super) fn submission(ratings: &[(&str, u16)]) -> ReviewSubmission {
    ReviewSubmission {
        template_id: TemplateId("tpl-boh-morning".to_string()),
        employee_id: EmployeeId("emp-1".to_string()),
        date: review_date(),
        shift: ShiftType::Opening,
        completion_method: CompletionMethod::Manual,
        manager_override: false,
        responses: ratings
            .iter()
            .map(|(category, rating)| CategoryResponseInput {
                category_id: CategoryId(category.to_string()),
                rating: *rating,
                notes: None,
                photos: Vec::new(),
            })
            .collect(),
    }
}
