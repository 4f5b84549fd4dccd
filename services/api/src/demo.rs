use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate, Utc};
use clap::Args;

use crate::infra::{
    InMemoryNotificationPublisher, InMemoryReviewRepository, StaticCatalog, StaticStaffDirectory,
};
use lineops::error::AppError;
use lineops::reviews::{
    CategoryId, CategoryResponseInput, CompletionMethod, EmployeeId, EngineConfig,
    ReviewRepository, ReviewService, ReviewSubmission, ShiftType, TemplateId,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Review date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub(crate) date: Option<NaiveDate>,
    /// Employee submitting the demo review
    #[arg(long, default_value = "emp-1")]
    pub(crate) employee: String,
}

/// Walk one review through its lifecycle against the in-memory adapters:
/// submit a low score, correct it inside the window, and show the workflow
/// gate flipping from blocked to admitted.
pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let employee = EmployeeId(args.employee);

    let repository = InMemoryReviewRepository::default();
    let alerts = InMemoryNotificationPublisher::default();
    let service = ReviewService::new(
        Arc::new(repository.clone()),
        Arc::new(StaticCatalog::default()),
        Arc::new(StaticStaffDirectory::default()),
        Arc::new(alerts.clone()),
        EngineConfig::default(),
    );

    let access = service.authorize_access(&employee)?;
    println!(
        "access check for {}: granted={} role={:?}",
        employee, access.granted, access.role
    );

    let gate_before =
        service.check_workflow_requirements(&employee, "boh", ShiftType::Opening, date)?;
    println!("gate before submission: {}", gate_before.message);

    let now = Utc::now();
    let outcome = service.submit(demo_submission(&employee, date, &[5, 4, 1]), now)?;
    println!(
        "submitted {}: {}/{} ({:.1}%) follow-up={}",
        outcome.review_instance_id,
        outcome.total_score,
        outcome.max_possible_score,
        outcome.percentage,
        outcome.requires_manager_followup
    );

    let corrected = service.submit(
        demo_submission(&employee, date, &[5, 5, 3]),
        now + Duration::hours(1),
    )?;
    println!(
        "corrected {}: {}/{} ({:.1}%)",
        corrected.review_instance_id,
        corrected.total_score,
        corrected.max_possible_score,
        corrected.percentage
    );

    let records = repository.update_records(&corrected.review_instance_id);
    if let Ok(records) = records {
        for record in records {
            println!(
                "audit: {} {} -> {} (override={})",
                record.category_id,
                record.previous_value.rating,
                record.new_value.rating,
                record.manager_override
            );
        }
    }

    for event in alerts.events() {
        println!(
            "notification [{}] to {}: {} - {}",
            event.priority.label(),
            event.recipient,
            event.title,
            event.message
        );
    }

    let gate_after =
        service.check_workflow_requirements(&employee, "boh", ShiftType::Opening, date)?;
    println!("gate after correction: {}", gate_after.message);

    Ok(())
}

fn demo_submission(employee: &EmployeeId, date: NaiveDate, ratings: &[u16]) -> ReviewSubmission {
    let categories = ["clean", "prep", "safety"];
    ReviewSubmission {
        template_id: TemplateId("tpl-boh-morning".to_string()),
        employee_id: employee.clone(),
        date,
        shift: ShiftType::Opening,
        completion_method: CompletionMethod::Manual,
        manager_override: false,
        responses: categories
            .iter()
            .zip(ratings)
            .map(|(category, rating)| CategoryResponseInput {
                category_id: CategoryId(category.to_string()),
                rating: *rating,
                notes: None,
                photos: Vec::new(),
            })
            .collect(),
    }
}
