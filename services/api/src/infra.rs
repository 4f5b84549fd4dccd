use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use lineops::reviews::{
    aggregate, CatalogError, CategoryId, DirectoryError, EmployeeId, InstanceId, InstanceKey,
    NotificationPublisher, PublishError, RepositoryError, ReviewCategory, ReviewInstance,
    ReviewNotification, ReviewRepository, ReviewResponse, ReviewStatus, ReviewTemplate,
    ReviewUpdateRecord, StaffDirectory, StaffRole, SubmissionWrite, TemplateCatalog, TemplateId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct ReviewStore {
    instances: HashMap<InstanceId, ReviewInstance>,
    by_key: HashMap<InstanceKey, InstanceId>,
    responses: HashMap<InstanceId, BTreeMap<CategoryId, ReviewResponse>>,
    updates: HashMap<InstanceId, Vec<ReviewUpdateRecord>>,
}

/// Mutex-guarded store standing in for the hosted relational backend. The
/// single lock gives each submission write the same atomicity a database
/// transaction would, and `by_key` plays the quadruple uniqueness index.
#[derive(Default, Clone)]
pub(crate) struct InMemoryReviewRepository {
    inner: Arc<Mutex<ReviewStore>>,
}

impl ReviewRepository for InMemoryReviewRepository {
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
        // Recompute from the full merged set inside the same critical
        // section as the upserts; interleaved submissions can never leave a
        // stale total behind.
        let merged: Vec<ReviewResponse> = map.values().cloned().collect();
        let summary = aggregate(&merged, &write.scoring);

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

/// Static template fixture standing in for the external catalog provider.
#[derive(Clone)]
pub(crate) struct StaticCatalog {
    templates: Vec<ReviewTemplate>,
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self {
            templates: vec![
                template(
                    "tpl-boh-morning",
                    "BOH Morning Line Review",
                    &[
                        ("clean", "Cleanliness"),
                        ("prep", "Prep Readiness"),
                        ("safety", "Food Safety"),
                    ],
                ),
                template(
                    "tpl-boh-closing",
                    "BOH Closing Line Review",
                    &[
                        ("breakdown", "Station Breakdown"),
                        ("storage", "Cold Storage"),
                        ("sanitation", "Sanitation"),
                    ],
                ),
                template(
                    "tpl-foh-open",
                    "FOH Opening Line Review",
                    &[("floor", "Dining Floor"), ("host", "Host Stand")],
                ),
                template(
                    "tpl-foh-transition",
                    "FOH Transition Handoff Review",
                    &[("handoff", "Shift Handoff"), ("restock", "Service Restock")],
                ),
            ],
        }
    }
}

fn template(id: &str, name: &str, categories: &[(&str, &str)]) -> ReviewTemplate {
    ReviewTemplate {
        id: TemplateId(id.to_string()),
        name: name.to_string(),
        categories: categories
            .iter()
            .map(|(category_id, category_name)| ReviewCategory {
                id: CategoryId(category_id.to_string()),
                name: category_name.to_string(),
                description: format!("{category_name} walkthrough"),
                max_rating: 5,
            })
            .collect(),
    }
}

impl TemplateCatalog for StaticCatalog {
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

/// Seeded roster standing in for the employee administration system.
#[derive(Clone)]
pub(crate) struct StaticStaffDirectory {
    roles: HashMap<EmployeeId, StaffRole>,
}

impl Default for StaticStaffDirectory {
    fn default() -> Self {
        let mut roles = HashMap::new();
        roles.insert(EmployeeId("emp-1".to_string()), StaffRole::Line);
        roles.insert(EmployeeId("emp-2".to_string()), StaffRole::Line);
        roles.insert(EmployeeId("lead-1".to_string()), StaffRole::ShiftLead);
        roles.insert(EmployeeId("mgr-1".to_string()), StaffRole::Manager);
        Self { roles }
    }
}

impl StaffDirectory for StaticStaffDirectory {
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

/// Records decided notifications and logs them; delivery transport lives
/// outside this service.
#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationPublisher {
    events: Arc<Mutex<Vec<ReviewNotification>>>,
}

impl NotificationPublisher for InMemoryNotificationPublisher {
    fn publish(&self, notification: ReviewNotification) -> Result<(), PublishError> {
        info!(
            kind = notification.kind.label(),
            recipient = %notification.recipient,
            priority = notification.priority.label(),
            "review notification queued"
        );
        let mut guard = self.events.lock().expect("alert mutex poisoned");
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryNotificationPublisher {
    pub(crate) fn events(&self) -> Vec<ReviewNotification> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}
